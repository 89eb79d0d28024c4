use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::Config;

/// The one browser tab a run drives.
///
/// `ChromePage` implements this over headless Chrome; tests use an
/// in-memory site. All calls block.
pub trait Page {
    fn navigate(&mut self, url: &str) -> Result<()>;

    fn current_url(&self) -> String;

    /// Rendered HTML of the current document
    fn content(&self) -> Result<String>;

    /// Replace the value of the input matching `selector`
    fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    fn click(&mut self, selector: &str) -> Result<()>;

    fn has_element(&self, selector: &str) -> Result<bool>;
}

/// Bounded polling for page state
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.page_timeout, config.poll_interval)
    }

    /// Poll `condition` until it returns true or the timeout elapses.
    ///
    /// Returns `Ok(false)` on timeout. Errors from the condition end the
    /// wait immediately.
    pub fn until(&self, mut condition: impl FnMut() -> Result<bool>) -> Result<bool> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if condition()? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(self.interval);
        }
    }

    pub fn for_element(&self, page: &dyn Page, selector: &str) -> Result<bool> {
        self.until(|| page.has_element(selector))
    }
}
