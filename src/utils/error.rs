use thiserror::Error;

/// 網路相關錯誤的階層：呼叫端可以針對單一變體處理，也可以整體視為 `NetworkError`。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Cannot connect to server {server}. Server is unreachable.")]
    ServerUnreachable { server: String },

    #[error("Connection to server {server} timed out after {timeout_secs} seconds.")]
    ConnectionTimeout { server: String, timeout_secs: u64 },

    #[error("Network error while talking to {server}: {message}")]
    Other { server: String, message: String },
}

impl NetworkError {
    pub fn server(&self) -> &str {
        match self {
            NetworkError::ServerUnreachable { server }
            | NetworkError::ConnectionTimeout { server, .. }
            | NetworkError::Other { server, .. } => server,
        }
    }
}

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Type error for '{field}': expected {expected}")]
    TypeMismatch { field: String, expected: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Contract violated: {message}")]
    ContractViolation { message: String },

    #[error("Operation '{operation}' timed out after {seconds:.1}s")]
    TimeoutError { operation: String, seconds: f64 },

    #[error("{message}")]
    ConfigurationFailed {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Access denied: '{requested}' escapes base directory '{base}'")]
    PathTraversal { base: String, requested: String },

    #[error("Command '{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Privilege operation failed: {message}")]
    PrivilegeError { message: String },
}

pub type Result<T> = std::result::Result<T, GuardError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Storage,
    Contract,
    Security,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl GuardError {
    pub fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        GuardError::InvalidValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        GuardError::ContractViolation {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GuardError::TypeMismatch { .. }
            | GuardError::InvalidValueError { .. }
            | GuardError::MissingFieldError { .. }
            | GuardError::SerializationError(_)
            | GuardError::TomlError(_) => ErrorCategory::Input,
            GuardError::HttpError(_) | GuardError::Network(_) | GuardError::TimeoutError { .. } => {
                ErrorCategory::Network
            }
            GuardError::IoError(_) | GuardError::DatabaseError(_) => ErrorCategory::Storage,
            GuardError::ContractViolation { .. } => ErrorCategory::Contract,
            GuardError::PathTraversal { .. } | GuardError::PrivilegeError { .. } => {
                ErrorCategory::Security
            }
            GuardError::ConfigurationFailed { .. } | GuardError::CommandFailed { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Contract => ErrorSeverity::High,
            ErrorCategory::Security | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定 CLI 的結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GuardError::TypeMismatch { .. } => "Check the type of the provided value",
            GuardError::InvalidValueError { .. } => "Correct the value and try again",
            GuardError::MissingFieldError { .. } => "Add the missing field to the input",
            GuardError::SerializationError(_) | GuardError::TomlError(_) => {
                "Make sure the file is valid JSON/TOML"
            }
            GuardError::HttpError(_) | GuardError::Network(_) => {
                "Check network connectivity and the target URL"
            }
            GuardError::TimeoutError { .. } => "Increase the timeout or retry later",
            GuardError::IoError(_) => "Check that the path exists and is accessible",
            GuardError::DatabaseError(_) => "Check the database file and schema",
            GuardError::ContractViolation { .. } => "Fix the caller so preconditions hold",
            GuardError::PathTraversal { .. } => "Use a path inside the allowed directory",
            GuardError::PrivilegeError { .. } => "Run with the required permissions",
            GuardError::ConfigurationFailed { .. } => "Inspect the underlying cause below",
            GuardError::CommandFailed { .. } => "Check the command and its arguments",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Storage => format!("Storage problem: {}", self),
            ErrorCategory::Contract => format!("Internal check failed: {}", self),
            ErrorCategory::Security => format!("Refused for safety: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

/// 將錯誤與其所有 source 依序展開
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}
