pub mod contracts;
pub mod failsafe;
pub mod limits;
pub mod privilege;
pub mod profile;
pub mod recovery;
pub mod sanitize;
pub mod titles;
pub mod user_store;

pub use crate::domain::model::{PageTitle, ScrapeReport, TitleOutcome};
pub use crate::domain::ports::{Storage, UserRepository};
pub use crate::utils::error::Result;
