use crate::utils::error::{GuardError, Result};
use crate::utils::validation::Validate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 伺服器啟動後就不能再修改的設定；要變更只能產生新的值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebServerConfig {
    port: u16,
    ssl_enabled: bool,
    root_dir: PathBuf,
}

impl WebServerConfig {
    pub fn new(port: u16, ssl_enabled: bool, root_dir: impl Into<PathBuf>) -> Result<Arc<Self>> {
        let config = Self {
            port,
            ssl_enabled,
            root_dir: root_dir.into(),
        };
        config.validate()?;
        Ok(Arc::new(config))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn ssl_enabled(&self) -> bool {
        self.ssl_enabled
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn with_port(&self, port: u16) -> Result<Arc<Self>> {
        Self::new(port, self.ssl_enabled, self.root_dir.clone())
    }
}

impl Validate for WebServerConfig {
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(GuardError::invalid("port", self.port, "Port must be non-zero"));
        }
        if !self.root_dir.is_absolute() {
            return Err(GuardError::invalid(
                "root_dir",
                self.root_dir.display(),
                "Root directory must be an absolute path",
            ));
        }
        Ok(())
    }
}
