use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;
use url::Url;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub age: i64,
}

// 密碼不可出現在日誌中
impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("age", &self.age)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub account: NewUser,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub social_media: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates(pub i64, pub i64);

impl Coordinates {
    /// 不修改原值，回傳新的座標；溢位時回傳 `None`
    pub fn translated(self, dx: i64, dy: i64) -> Option<Self> {
        Some(Coordinates(self.0.checked_add(dx)?, self.1.checked_add(dy)?))
    }
}

/// 建立後不可變更的商品資料，只提供讀取方法
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    id: u64,
    name: String,
    price: f64,
}

impl Product {
    pub fn new(id: u64, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn with_price(&self, price: f64) -> Self {
        Self {
            price,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Inventory {
    items: BTreeSet<String>,
}

impl Inventory {
    pub fn contains(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn with_item(&self, item: impl Into<String>) -> Self {
        let mut items = self.items.clone();
        items.insert(item.into());
        Self { items }
    }
}

impl<S: Into<String>> FromIterator<S> for Inventory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TitleOutcome {
    Title(String),
    HttpStatus(u16),
    MissingTitle,
    TimedOut,
    Failed(String),
}

impl fmt::Display for TitleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleOutcome::Title(title) => write!(f, "{}", title),
            TitleOutcome::HttpStatus(status) => write!(f, "Failed to fetch (HTTP {})", status),
            TitleOutcome::MissingTitle => write!(f, "No <title> element"),
            TitleOutcome::TimedOut => write!(f, "Request timed out"),
            TitleOutcome::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageTitle {
    pub url: Url,
    pub outcome: TitleOutcome,
}

impl PageTitle {
    pub fn title(&self) -> Option<&str> {
        match &self.outcome {
            TitleOutcome::Title(title) => Some(title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed: Duration,
    pub pages: Vec<PageTitle>,
}

impl ScrapeReport {
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().filter_map(PageTitle::title)
    }

    pub fn failures(&self) -> usize {
        self.pages.iter().filter(|p| p.title().is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_debug_redacts_password() {
        let user = NewUser {
            username: "validUser_123".to_string(),
            password: "Passw0rd!".to_string(),
            email: "user@example.com".to_string(),
            age: 25,
        };
        let rendered = format!("{:?}", user);
        assert!(!rendered.contains("Passw0rd!"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_profile_deserializes_flattened_account() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "username": "validUser_123",
            "password": "Passw0rd!",
            "email": "user@example.com",
            "age": 30,
            "addresses": [
                {"street": "123 Main St", "city": "Anytown", "state": "NY", "zip_code": "12345"}
            ]
        }))
        .unwrap();

        assert_eq!(profile.account.age, 30);
        assert_eq!(profile.addresses.len(), 1);
        assert!(profile.social_media.is_none());
    }

    #[test]
    fn test_product_updates_produce_new_values() {
        let laptop = Product::new(1, "Laptop", 999.99);
        let discounted = laptop.with_price(899.99);

        assert_eq!(laptop.price(), 999.99);
        assert_eq!(discounted.price(), 899.99);
        assert_eq!(discounted.name(), "Laptop");
    }

    #[test]
    fn test_inventory_is_persistent() {
        let inventory: Inventory = ["apple", "banana", "orange"].into_iter().collect();
        let extended = inventory.with_item("pear");

        assert!(!inventory.contains("pear"));
        assert!(extended.contains("pear"));
        assert_eq!(inventory.len(), 3);
        assert_eq!(extended.len(), 4);
    }

    #[test]
    fn test_coordinates_are_copied() {
        let origin = Coordinates(10, 20);
        let moved = origin.translated(5, 0);
        assert_eq!(origin, Coordinates(10, 20));
        assert_eq!(moved, Some(Coordinates(15, 20)));
    }

    #[test]
    fn test_coordinates_overflow_is_rejected() {
        assert_eq!(Coordinates(i64::MAX, 0).translated(1, 0), None);
        assert_eq!(Coordinates(0, i64::MIN).translated(0, -1), None);
        assert_eq!(
            Coordinates(i64::MAX, 0).translated(-1, 0),
            Some(Coordinates(i64::MAX - 1, 0))
        );
    }
}
