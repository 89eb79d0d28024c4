pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod panel;
pub mod progress;
pub mod scrapers;
pub mod session;
pub mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::Config;
pub use error::{Result, ScrapeError};
pub use models::Listing;
