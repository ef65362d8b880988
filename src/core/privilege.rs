use crate::core::sanitize::generate_api_key;
use crate::utils::error::{GuardError, Result};
use serde_json::Value;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const UNPRIVILEGED_UID: u32 = 1000;

/// 以唯讀模式開啟設定檔
pub fn read_config_minimal<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GuardError::invalid(
            "config",
            path.display(),
            "The configuration file does not exist",
        ),
        ErrorKind::PermissionDenied => GuardError::PrivilegeError {
            message: format!(
                "Insufficient permissions to read the configuration file {}",
                path.display()
            ),
        },
        _ => GuardError::IoError(e),
    })?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    tracing::debug!("Config file {} successfully read", path.display());
    Ok(content)
}

/// 以 root 身份執行時將有效 UID 降為 `target_uid`，回傳是否真的降權
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn drop_privileges(target_uid: u32) -> Result<bool> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        tracing::debug!("Already running unprivileged (euid {})", euid);
        return Ok(false);
    }

    // SAFETY: seteuid only reads its integer argument; failure is reported via the return code.
    let rc = unsafe { libc::seteuid(target_uid as libc::uid_t) };
    if rc != 0 {
        return Err(GuardError::PrivilegeError {
            message: format!(
                "seteuid({}) failed: {}",
                target_uid,
                std::io::Error::last_os_error()
            ),
        });
    }

    tracing::info!("🔒 Privileges dropped, running as uid {}", target_uid);
    Ok(true)
}

#[cfg(not(unix))]
pub fn drop_privileges(_target_uid: u32) -> Result<bool> {
    Ok(false)
}

fn write_and_read_back(contents: &str) -> Result<String> {
    // 檔案在 drop 時自動刪除
    let mut temp = NamedTempFile::new()?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.seek(SeekFrom::Start(0))?;

    let mut read_back = String::new();
    temp.read_to_string(&mut read_back)?;
    Ok(read_back)
}

/// 敏感的上傳內容只暫存在安全的暫存檔中處理
pub fn process_upload(uploaded_text: &str) -> Result<String> {
    let content = write_and_read_back(uploaded_text)?;
    Ok(content.chars().rev().collect())
}

/// 產生短期使用的憑證並透過暫存檔交給下游，回傳 `api_key=<key>` 這一行
pub fn with_temporary_credentials() -> Result<String> {
    let api_key = generate_api_key(16);
    let content = write_and_read_back(&format!("api_key={}\n", api_key))?;

    let credentials = content.lines().next().unwrap_or_default().trim().to_string();
    tracing::debug!("Temporary credentials prepared ({} chars)", credentials.len());
    Ok(credentials)
}

pub fn cache_and_process(data: &Value) -> Result<Value> {
    let content = write_and_read_back(&serde_json::to_string(data)?)?;
    Ok(serde_json::from_str(&content)?)
}
