use crate::utils::error::{GuardError, NetworkError, Result};
use std::io::ErrorKind;
use std::path::Path;

pub const SIMULATED_CONNECT_TIMEOUT_SECS: u64 = 5;

pub fn divide(numerator: f64, denominator: f64) -> Result<f64> {
    if denominator == 0.0 {
        return Err(GuardError::invalid(
            "denominator",
            denominator,
            "Cannot divide by zero",
        ));
    }
    Ok(numerator / denominator)
}

/// 讀取文字檔，將常見的 IO 失敗轉成具體的錯誤說明
pub fn read_file_content<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if path.is_dir() {
        return Err(GuardError::invalid(
            "path",
            path.display(),
            "The specified path is a directory, not a file",
        ));
    }

    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GuardError::invalid("path", path.display(), "The file does not exist"),
        ErrorKind::PermissionDenied => GuardError::PrivilegeError {
            message: format!("Insufficient permissions to read {}", path.display()),
        },
        _ => GuardError::IoError(e),
    })
}

/// 模擬連線：特定名稱會觸發對應的網路錯誤
pub fn connect_to_server(server: &str) -> std::result::Result<(), NetworkError> {
    match server {
        "server_unreachable" => Err(NetworkError::ServerUnreachable {
            server: server.to_string(),
        }),
        "connection_timeout" => Err(NetworkError::ConnectionTimeout {
            server: server.to_string(),
            timeout_secs: SIMULATED_CONNECT_TIMEOUT_SECS,
        }),
        _ => {
            tracing::info!("Successfully connected to server {}", server);
            Ok(())
        }
    }
}

/// 回傳給使用者看的結果描述，示範先比對特定錯誤、最後才比對通用錯誤
pub fn describe_connection_attempt(server: &str) -> String {
    let message = match connect_to_server(server) {
        Ok(()) => "Connection successful.".to_string(),
        Err(e @ NetworkError::ServerUnreachable { .. }) => format!("Error: {}", e),
        Err(e @ NetworkError::ConnectionTimeout { .. }) => format!("Error: {}", e),
        Err(NetworkError::Other { .. }) => "A general network error occurred.".to_string(),
    };
    tracing::debug!("Attempt to connect to server {} has completed.", server);
    message
}

/// 低階的權限錯誤會被包成設定失敗，原因保留在 `source()`
pub fn configure_system(path: &str) -> Result<()> {
    check_path_access(path).map_err(|e| GuardError::ConfigurationFailed {
        message: "System configuration failed".to_string(),
        source: Box::new(e),
    })
}

fn check_path_access(path: &str) -> std::io::Result<()> {
    if path == "/forbidden" {
        return Err(std::io::Error::new(
            ErrorKind::PermissionDenied,
            "Access to the path is forbidden.",
        ));
    }
    Ok(())
}
