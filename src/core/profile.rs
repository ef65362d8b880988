use crate::domain::model::{Address, NewUser, UserProfile};
use crate::utils::error::{GuardError, Result};
use crate::utils::validation::{
    is_valid_email, is_valid_password, is_valid_social_link, is_valid_state_code,
    is_valid_username, is_valid_zip_code, validate_non_empty_string, validate_range, Validate,
};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static MISSING_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^missing field `([^`]+)`").expect("missing field regex"));

const BASIC_REQUIRED_KEYS: [&str; 3] = ["username", "age", "email"];

/// 將使用者輸入轉成正整數；無法解析視為型別錯誤，非正數視為值錯誤
pub fn process_positive_integer(raw: &str) -> Result<i64> {
    let number: i64 = raw.trim().parse().map_err(|_| GuardError::TypeMismatch {
        field: "number".to_string(),
        expected: "an integer".to_string(),
    })?;

    if number <= 0 {
        return Err(GuardError::invalid(
            "number",
            number,
            "The number must be positive",
        ));
    }

    tracing::debug!("Processing number: {}", number);
    Ok(number)
}

/// 驗證未定型的 JSON 個人資料：先檢查形狀與必要欄位，再檢查型別與值
pub fn validate_basic_profile(profile: &Value) -> Result<()> {
    let obj = profile.as_object().ok_or_else(|| GuardError::TypeMismatch {
        field: "profile".to_string(),
        expected: "a JSON object".to_string(),
    })?;

    for key in BASIC_REQUIRED_KEYS {
        if !obj.contains_key(key) {
            return Err(GuardError::MissingFieldError {
                field: key.to_string(),
            });
        }
    }

    let username = obj["username"]
        .as_str()
        .ok_or_else(|| GuardError::TypeMismatch {
            field: "username".to_string(),
            expected: "a string".to_string(),
        })?;
    if username.is_empty() {
        return Err(GuardError::invalid(
            "username",
            username,
            "Username cannot be empty",
        ));
    }

    let age = obj["age"].as_i64().ok_or_else(|| GuardError::TypeMismatch {
        field: "age".to_string(),
        expected: "an integer".to_string(),
    })?;
    validate_range("age", age, 18, 120)?;

    match obj["email"].as_str() {
        Some(email) if is_valid_email(email) => {}
        other => {
            return Err(GuardError::invalid(
                "email",
                other.unwrap_or_default(),
                "Invalid email address",
            ))
        }
    }

    tracing::debug!("User profile for '{}' is valid", username);
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> Result<()> {
    if !is_valid_username(&user.username) {
        return Err(GuardError::invalid(
            "username",
            &user.username,
            "5-15 letters, digits or underscores",
        ));
    }
    if !is_valid_password(&user.password) {
        // 不把密碼本身放進錯誤訊息
        return Err(GuardError::invalid(
            "password",
            "<redacted>",
            "at least 8 characters with upper, lower, digit and special character",
        ));
    }
    if !is_valid_email(&user.email) {
        return Err(GuardError::invalid("email", &user.email, "Invalid email"));
    }
    validate_range("age", user.age, 18, 100)
}

pub fn validate_address(index: usize, address: &Address) -> Result<()> {
    let field = |name: &str| format!("addresses[{}].{}", index, name);

    validate_non_empty_string(&field("street"), &address.street)?;
    validate_non_empty_string(&field("city"), &address.city)?;
    if !is_valid_state_code(&address.state) {
        return Err(GuardError::invalid(
            &field("state"),
            &address.state,
            "two uppercase letters",
        ));
    }
    if !is_valid_zip_code(&address.zip_code) {
        return Err(GuardError::invalid(
            &field("zip_code"),
            &address.zip_code,
            "five digits",
        ));
    }
    Ok(())
}

pub fn validate_full_profile(profile: &UserProfile) -> Result<()> {
    validate_new_user(&profile.account)?;

    for (index, address) in profile.addresses.iter().enumerate() {
        validate_address(index, address)?;
    }

    if let Some(links) = &profile.social_media {
        for (network, url) in links {
            if !is_valid_social_link(network, url) {
                return Err(GuardError::invalid(
                    &format!("social_media.{}", network),
                    url,
                    "Invalid social media link",
                ));
            }
        }
    }

    tracing::info!(
        "✅ Profile for '{}' is valid. Proceeding with account creation.",
        profile.account.username
    );
    Ok(())
}

impl Validate for UserProfile {
    fn validate(&self) -> Result<()> {
        validate_full_profile(self)
    }
}

/// 解析 JSON 個人資料
///
/// 缺少必要欄位回傳 `MissingFieldError`，資料型別不符回傳 `TypeMismatch`，
/// 其餘（語法錯誤、內容截斷）保留為 `SerializationError`。
pub fn parse_profile(json: &str) -> Result<UserProfile> {
    serde_json::from_str(json).map_err(|e| match e.classify() {
        serde_json::error::Category::Data => {
            let message = e.to_string();
            match MISSING_FIELD_RE.captures(&message) {
                Some(caps) => GuardError::MissingFieldError {
                    field: caps[1].to_string(),
                },
                None => GuardError::TypeMismatch {
                    field: "profile".to_string(),
                    expected: message,
                },
            }
        }
        _ => GuardError::SerializationError(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn valid_user() -> NewUser {
        NewUser {
            username: "validUser_123".to_string(),
            password: "Passw0rd!".to_string(),
            email: "user@example.com".to_string(),
            age: 25,
        }
    }

    fn valid_profile() -> UserProfile {
        UserProfile {
            account: valid_user(),
            addresses: vec![Address {
                street: "123 Main St".to_string(),
                city: "Anytown".to_string(),
                state: "NY".to_string(),
                zip_code: "12345".to_string(),
            }],
            social_media: Some(BTreeMap::from([
                (
                    "facebook".to_string(),
                    "https://www.facebook.com/validUser_123".to_string(),
                ),
                (
                    "twitter".to_string(),
                    "https://twitter.com/validUser_123".to_string(),
                ),
            ])),
        }
    }

    #[test]
    fn test_process_positive_integer() {
        assert_eq!(process_positive_integer(" 42 ").unwrap(), 42);
        assert!(matches!(
            process_positive_integer("forty-two"),
            Err(GuardError::TypeMismatch { .. })
        ));
        assert!(matches!(
            process_positive_integer("0"),
            Err(GuardError::InvalidValueError { .. })
        ));
        assert!(process_positive_integer("-3").is_err());
    }

    #[test]
    fn test_basic_profile_accepts_valid() {
        let profile = json!({"username": "john_doe", "age": 25, "email": "john.doe@example.com"});
        assert!(validate_basic_profile(&profile).is_ok());
    }

    #[test]
    fn test_basic_profile_rejections() {
        assert!(matches!(
            validate_basic_profile(&json!(["not", "an", "object"])),
            Err(GuardError::TypeMismatch { .. })
        ));

        match validate_basic_profile(&json!({"username": "john", "age": 25})) {
            Err(GuardError::MissingFieldError { field }) => assert_eq!(field, "email"),
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(
            validate_basic_profile(&json!({"username": 7, "age": 25, "email": "a@b.co"})),
            Err(GuardError::TypeMismatch { .. })
        ));
        assert!(validate_basic_profile(&json!({"username": "", "age": 25, "email": "a@b.co"})).is_err());
        assert!(matches!(
            validate_basic_profile(&json!({"username": "j", "age": "25", "email": "a@b.co"})),
            Err(GuardError::TypeMismatch { .. })
        ));
        assert!(validate_basic_profile(&json!({"username": "j", "age": 17, "email": "a@b.co"})).is_err());
        assert!(validate_basic_profile(&json!({"username": "j", "age": 121, "email": "a@b.co"})).is_err());
        assert!(validate_basic_profile(&json!({"username": "j", "age": 30, "email": "nope"})).is_err());
    }

    #[test]
    fn test_new_user_age_upper_bound_is_100() {
        let mut user = valid_user();
        user.age = 100;
        assert!(validate_new_user(&user).is_ok());
        user.age = 101;
        assert!(validate_new_user(&user).is_err());
    }

    #[test]
    fn test_new_user_error_does_not_leak_password() {
        let mut user = valid_user();
        user.password = "weakpass".to_string();
        let err = validate_new_user(&user).unwrap_err();
        assert!(!err.to_string().contains("weakpass"));
    }

    #[test]
    fn test_full_profile_accepts_valid() {
        assert!(valid_profile().validate().is_ok());
    }

    #[test]
    fn test_full_profile_reports_bad_address_field() {
        let mut profile = valid_profile();
        profile.addresses.push(Address {
            street: "1 Side St".to_string(),
            city: "Othertown".to_string(),
            state: "ny".to_string(),
            zip_code: "54321".to_string(),
        });

        match validate_full_profile(&profile) {
            Err(GuardError::InvalidValueError { field, .. }) => {
                assert_eq!(field, "addresses[1].state")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_full_profile_rejects_bad_social_link() {
        let mut profile = valid_profile();
        profile.social_media = Some(BTreeMap::from([(
            "twitter".to_string(),
            "https://example.com/someone".to_string(),
        )]));
        assert!(validate_full_profile(&profile).is_err());
    }

    #[test]
    fn test_parse_profile_type_mismatch() {
        let err = parse_profile(
            r#"{"username":"validUser_123","password":"Passw0rd!","email":"user@example.com","age":"old"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GuardError::TypeMismatch { .. }));

        let err = parse_profile("{not json").unwrap_err();
        assert!(matches!(err, GuardError::SerializationError(_)));
    }

    #[test]
    fn test_parse_profile_missing_field() {
        let err = parse_profile(r#"{"username":"validUser_123","email":"user@example.com","age":30}"#)
            .unwrap_err();
        match err {
            GuardError::MissingFieldError { field } => assert_eq!(field, "password"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = parse_profile(
            r#"{"username":"validUser_123","password":"Passw0rd!","email":"user@example.com","age":30,
                "addresses":[{"street":"1 Main St","city":"Anytown","state":"NY"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GuardError::MissingFieldError { ref field } if field == "zip_code"
        ));
        assert_eq!(err.recovery_suggestion(), "Add the missing field to the input");
    }
}
