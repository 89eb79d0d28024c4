use crate::error::Result;
use crate::models::Listing;
use crate::progress::Progress;
use crate::scrapers::page::{Page, Waiter};
use crate::scrapers::types::MarkupRules;

/// Shared inputs of one extraction pass
pub struct PassContext<'a> {
    pub rules: &'a MarkupRules,
    pub waiter: Waiter,
    pub progress: &'a mut dyn Progress,
}

/// One way of recovering favorites from the dashboard markup.
/// Strategies are tried in a fixed order until one yields records.
pub trait ExtractionStrategy {
    /// Scrape records starting from the page the tab is on.
    ///
    /// An empty result means "not applicable here"; errors abort the run.
    fn extract(&self, page: &mut dyn Page, ctx: &mut PassContext<'_>) -> Result<Vec<Listing>>;

    /// Get the name of the strategy for logs
    fn name(&self) -> &'static str;
}
