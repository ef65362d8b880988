pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, server::WebServerConfig, settings::RuntimeSettings};
pub use crate::core::failsafe::SafeApiClient;
pub use crate::core::titles::{ScraperConfig, TitleScraper};
pub use crate::core::user_store::SqliteUserStore;
pub use crate::utils::error::{GuardError, NetworkError, Result};
