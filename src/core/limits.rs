use crate::core::sanitize::split_command_line;
use crate::utils::error::{GuardError, Result};
use crate::utils::validation::validate_timeout;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed { status: ExitStatus, stdout: String },
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReadOutcome {
    Content(String),
    NotFound,
    TimedOut,
}

/// 逾時回傳固定字串，其他失敗則回傳錯誤
pub async fn fetch_text(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<String> {
    validate_timeout("timeout", timeout)?;
    let outcome = async {
        let response = client.get(url).timeout(timeout).send().await?;
        response.text().await
    }
    .await;

    match outcome {
        Ok(text) => Ok(text),
        Err(e) if e.is_timeout() => {
            tracing::warn!("⏱️ Request to {} timed out after {:?}", url, timeout);
            Ok("Request timed out".to_string())
        }
        Err(e) => Err(e.into()),
    }
}

/// 不經 shell 執行指令；逾時就終止子行程
pub async fn run_with_timeout(command_line: &str, timeout: Duration) -> Result<CommandOutcome> {
    validate_timeout("timeout", timeout)?;
    let argv = split_command_line(command_line)?;
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| GuardError::invalid("command", command_line, "Command is empty"))?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdout_pipe = child.stdout.take();
    let run = async {
        let mut stdout = Vec::new();
        if let Some(pipe) = stdout_pipe.as_mut() {
            pipe.read_to_end(&mut stdout).await?;
        }
        let status = child.wait().await?;
        Ok::<_, std::io::Error>((status, stdout))
    };

    match tokio::time::timeout(timeout, run).await {
        Ok(result) => {
            let (status, stdout) = result?;
            Ok(CommandOutcome::Completed {
                status,
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
            })
        }
        Err(_) => {
            tracing::warn!("⏱️ Command '{}' timed out after {:?}", command_line, timeout);
            Ok(CommandOutcome::TimedOut)
        }
    }
}

pub async fn read_file_with_timeout<P: AsRef<Path>>(
    path: P,
    timeout: Duration,
) -> Result<FileReadOutcome> {
    validate_timeout("timeout", timeout)?;
    match tokio::time::timeout(timeout, tokio::fs::read_to_string(path.as_ref())).await {
        Ok(Ok(content)) => Ok(FileReadOutcome::Content(content)),
        Ok(Err(e)) if e.kind() == ErrorKind::NotFound => Ok(FileReadOutcome::NotFound),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => {
            tracing::warn!(
                "⏱️ Reading {} timed out after {:?}",
                path.as_ref().display(),
                timeout
            );
            Ok(FileReadOutcome::TimedOut)
        }
    }
}

/// 讀取檔案前先檢查大小，超過預算就拒絕
pub fn bounded_read<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(GuardError::invalid(
            "file",
            path.display(),
            format!("{} bytes exceeds the limit of {} bytes", size, max_bytes),
        ));
    }

    let mut data = Vec::with_capacity(size as usize);
    let file = std::fs::File::open(path)?;
    // 檔案可能在檢查後變大，讀取時仍然設上限
    std::io::Read::read_to_end(&mut std::io::Read::take(file, max_bytes + 1), &mut data)?;
    if data.len() as u64 > max_bytes {
        return Err(GuardError::invalid(
            "file",
            path.display(),
            format!("grew beyond the limit of {} bytes", max_bytes),
        ));
    }
    Ok(data)
}

pub fn memory_limit_bytes(memory_in_mb: u64) -> u64 {
    memory_in_mb.saturating_mul(1024 * 1024)
}

/// 以 `RLIMIT_AS` 限制整個行程的位址空間（soft 與 hard 相同）
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn set_memory_limit(memory_in_mb: u64) -> Result<()> {
    let bytes = memory_limit_bytes(memory_in_mb) as libc::rlim_t;
    let limit = libc::rlimit {
        rlim_cur: bytes,
        rlim_max: bytes,
    };

    // SAFETY: `limit` is a valid, initialized rlimit that outlives the call.
    let rc = unsafe { libc::setrlimit(libc::RLIMIT_AS, &limit) };
    if rc != 0 {
        return Err(GuardError::PrivilegeError {
            message: format!(
                "setrlimit(RLIMIT_AS, {} MB) failed: {}",
                memory_in_mb,
                std::io::Error::last_os_error()
            ),
        });
    }

    tracing::info!("🧱 Memory limit set to {} MB", memory_in_mb);
    Ok(())
}

#[cfg(not(unix))]
pub fn set_memory_limit(_memory_in_mb: u64) -> Result<()> {
    Err(GuardError::PrivilegeError {
        message: "Memory limits are only supported on Unix".to_string(),
    })
}
