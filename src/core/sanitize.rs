use crate::utils::error::{GuardError, Result};
use rand::RngCore;
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use strict_path::{PathBoundary, StrictPathError};
use subtle::ConstantTimeEq;

pub const DEFAULT_API_KEY_BYTES: usize = 20;

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 將使用者提供的相對路徑限制在 `base` 之內
///
/// `base` 必須是已存在的目錄；路徑會先正規化並解析 symlink 再檢查邊界，
/// `..` 跳出 `base`、指向外部的 symlink 或絕對路徑一律拒絕。
pub fn resolve_within<B: AsRef<Path>>(base: B, user_path: &str) -> Result<PathBuf> {
    let base = base.as_ref();
    let traversal = || GuardError::PathTraversal {
        base: base.display().to_string(),
        requested: user_path.to_string(),
    };

    if user_path.contains('\0') {
        return Err(GuardError::invalid(
            "path",
            user_path.escape_default(),
            "Path contains null bytes",
        ));
    }

    let requested = Path::new(user_path.trim());
    if requested
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
    {
        return Err(traversal());
    }

    let boundary: PathBoundary = PathBoundary::try_new(base).map_err(boundary_error)?;
    match boundary.strict_join(requested) {
        Ok(path) => Ok(path.unstrict()),
        Err(StrictPathError::PathEscapesBoundary { .. }) => Err(traversal()),
        Err(e) => Err(boundary_error(e)),
    }
}

fn boundary_error(error: StrictPathError) -> GuardError {
    match error {
        StrictPathError::InvalidRestriction { source, .. }
        | StrictPathError::PathResolutionError { source, .. } => GuardError::IoError(source),
        other => GuardError::invalid("path", other.to_string(), "Path cannot be resolved"),
    }
}

/// 類似 shell 的斷詞：支援單引號、雙引號與反斜線跳脫
pub fn split_command_line(line: &str) -> Result<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\' | '$' | '`')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => break,
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                        in_word = true;
                    }
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if quote != Quote::None {
        return Err(GuardError::invalid("command", line, "No closing quotation"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// 使用參數陣列呼叫 `ls -l`，使用者輸入不會被 shell 解讀
pub fn list_file(user_input: &str) -> Result<String> {
    let output = Command::new("ls").arg("-l").arg("--").arg(user_input).output()?;
    if !output.status.success() {
        return Err(GuardError::CommandFailed {
            command: format!("ls -l {}", user_input),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// 以作業系統的安全亂數產生器產生十六進位 API key
pub fn generate_api_key(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rngs::OsRng.fill_bytes(&mut buf);

    let mut key = String::with_capacity(bytes * 2);
    for b in &buf {
        let _ = write!(key, "{:02x}", b);
    }
    key
}

/// 比較秘密值時不因第一個不同的位元組而提早結束
pub fn constant_time_eq(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
