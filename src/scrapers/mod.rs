pub mod auth;
pub mod browser;
pub mod card;
pub mod page;
pub mod strategies;
pub mod traits;
pub mod types;

pub use auth::{login, Credentials};
pub use browser::{ChromePage, ChromeSession};
pub use page::{Page, Waiter};
pub use strategies::{extract_favorites, DirectCards, GenericLinks, GroupedLists};
pub use traits::ExtractionStrategy;
pub use types::MarkupRules;
