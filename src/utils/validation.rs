use crate::utils::error::{GuardError, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

// 只接受 ASCII 的字母、數字與底線
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?-u:\w){5,15}$").expect("username regex"));

static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("state regex"));

static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("zip regex"));

static FACEBOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?facebook\.com/[a-zA-Z0-9(.?)]").expect("facebook regex")
});

static TWITTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?twitter\.com/[a-zA-Z0-9(.?)]").expect("twitter regex")
});

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(GuardError::invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(GuardError::invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(GuardError::invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GuardError::invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(GuardError::invalid(
            field_name,
            path.escape_default(),
            "Path contains null bytes",
        ));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(GuardError::invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// 逾時為零會讓每個操作立即失敗
pub fn validate_timeout(field_name: &str, timeout: Duration) -> Result<()> {
    if timeout.is_zero() {
        return Err(GuardError::invalid(
            field_name,
            format!("{:?}", timeout),
            "Timeout must be greater than zero",
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| GuardError::MissingFieldError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GuardError::invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(GuardError::invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// 至少 8 字元，且包含大寫、小寫、數字與特殊字元（底線也算特殊字元）
pub fn is_valid_password(password: &str) -> bool {
    let criteria: [fn(&str) -> bool; 5] = [
        |s| s.chars().count() >= 8,
        |s| s.chars().any(char::is_uppercase),
        |s| s.chars().any(char::is_lowercase),
        |s| s.chars().any(|c| c.is_ascii_digit()),
        |s| s.chars().any(|c| !c.is_alphanumeric()),
    ];

    criteria.iter().all(|criterion| criterion(password))
}

pub fn is_valid_state_code(state: &str) -> bool {
    STATE_RE.is_match(state)
}

pub fn is_valid_zip_code(zip_code: &str) -> bool {
    ZIP_RE.is_match(zip_code)
}

/// 未知的社群網站不做格式檢查
pub fn is_valid_social_link(network: &str, url: &str) -> bool {
    match network {
        "facebook" => FACEBOOK_RE.is_match(url),
        "twitter" => TWITTER_RE.is_match(url),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoint", "https://example.com").is_ok());
        assert!(validate_url("endpoint", "http://example.com").is_ok());
        assert!(validate_url("endpoint", "").is_err());
        assert!(validate_url("endpoint", "invalid-url").is_err());
        assert!(validate_url("endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output", "./out").is_ok());
        assert!(validate_path("output", "").is_err());
        assert!(validate_path("output", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("workers", 5, 1).is_ok());
        assert!(validate_positive_number("workers", 0, 1).is_err());
    }

    #[test]
    fn test_validate_timeout() {
        assert!(validate_timeout("timeout", Duration::from_millis(1)).is_ok());
        assert!(matches!(
            validate_timeout("timeout", Duration::ZERO),
            Err(GuardError::InvalidValueError { ref field, .. }) if field == "timeout"
        ));
    }

    #[test]
    fn test_validate_range_is_inclusive() {
        assert!(validate_range("age", 18, 18, 120).is_ok());
        assert!(validate_range("age", 120, 18, 120).is_ok());
        assert!(validate_range("age", 17, 18, 120).is_err());
        assert!(validate_range("age", 121, 18, 120).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(3);
        assert_eq!(*validate_required_field("n", &present).unwrap(), 3);

        let missing: Option<i32> = None;
        assert!(matches!(
            validate_required_field("n", &missing),
            Err(GuardError::MissingFieldError { .. })
        ));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("john.doe@example.com"));
        assert!(is_valid_email("user+tag@mail.example.org"));
        assert!(!is_valid_email("john.doe@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john doe@example.com"));
    }

    #[test]
    fn test_username_format() {
        assert!(is_valid_username("validUser_123"));
        assert!(is_valid_username("abcde"));
        assert!(!is_valid_username("abcd"));
        assert!(!is_valid_username("a_very_long_username"));
        assert!(!is_valid_username("bad-name"));
        assert!(!is_valid_username("ünïcode"));
    }

    #[test]
    fn test_password_strength() {
        assert!(is_valid_password("Passw0rd!"));
        assert!(is_valid_password("Passw0rd_"));
        assert!(!is_valid_password("Pa0!"));
        assert!(!is_valid_password("password1!"));
        assert!(!is_valid_password("PASSWORD1!"));
        assert!(!is_valid_password("Password!!"));
        assert!(!is_valid_password("Password11"));
    }

    #[test]
    fn test_address_parts() {
        assert!(is_valid_state_code("NY"));
        assert!(!is_valid_state_code("ny"));
        assert!(!is_valid_state_code("NYC"));
        assert!(is_valid_zip_code("12345"));
        assert!(!is_valid_zip_code("1234"));
        assert!(!is_valid_zip_code("12a45"));
    }

    #[test]
    fn test_social_links() {
        assert!(is_valid_social_link(
            "facebook",
            "https://www.facebook.com/validUser_123"
        ));
        assert!(is_valid_social_link("twitter", "twitter.com/someone"));
        assert!(!is_valid_social_link("twitter", "https://evil.com/twitter.com/x"));
        assert!(is_valid_social_link("mastodon", "anything"));
    }
}
