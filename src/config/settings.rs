use crate::utils::error::{GuardError, Result};
use crate::utils::validation::{validate_positive_number, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

const LOG_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var regex"));

/// 執行期設定；檔案中缺少的欄位個別採用預設值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    #[serde(alias = "timeout")]
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub log_level: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retry_attempts: 3,
            log_level: "INFO".to_string(),
        }
    }
}

impl RuntimeSettings {
    /// 依副檔名選擇格式：`.toml` 用 TOML，其餘視為 JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// 頂層必須是 JSON object；陣列等其他型別會被拒絕而不是依位置對應欄位
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        if !value.is_object() {
            return Err(GuardError::TypeMismatch {
                field: "settings".to_string(),
                expected: "a JSON object".to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// 永遠不會失敗：讀不到、解析失敗或驗證失敗都退回預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let loaded = Self::from_file(path).and_then(|settings| {
            settings.validate()?;
            Ok(settings)
        });

        match loaded {
            Ok(settings) => {
                tracing::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(GuardError::IoError(e)) => {
                tracing::warn!(
                    "⚠️ Configuration file {} not readable ({}). Using default configs.",
                    path.display(),
                    e
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Configuration file {} rejected ({}). Using default configs.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

impl Validate for RuntimeSettings {
    fn validate(&self) -> Result<()> {
        validate_positive_number("timeout_seconds", self.timeout_seconds as usize, 1)?;
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_uppercase().as_str()) {
            return Err(GuardError::invalid(
                "log_level",
                &self.log_level,
                format!("Expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }
        Ok(())
    }
}

/// 替換 `${VAR}`；未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_RE
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}
