use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info};

use crate::scrapers::page::Page;

/// A Chrome process and the one tab a run drives.
///
/// Chrome is shut down when this is dropped, whatever state the run ended in.
pub struct ChromeSession {
    browser: Browser,
    page: ChromePage,
}

impl ChromeSession {
    /// Launch Chrome, visible or headless
    pub fn launch(headless: bool, page_timeout: Duration) -> Result<Self> {
        info!("Launching Chrome (headless: {headless})...");

        let options = LaunchOptions::default_builder()
            .headless(headless)
            .sandbox(false)
            .window_size(Some((1280, 900)))
            .idle_browser_timeout(Duration::from_secs(600))
            .args(vec![
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
            ])
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        let tab = browser.new_tab().context("Failed to open a browser tab")?;
        tab.set_default_timeout(page_timeout);

        Ok(Self {
            browser,
            page: ChromePage { tab },
        })
    }

    pub fn page(&mut self) -> &mut ChromePage {
        &mut self.page
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        debug!(
            "Closing Chrome ({} tabs open)",
            self.browser.get_tabs().lock().map(|tabs| tabs.len()).unwrap_or(0)
        );
    }
}

/// `Page` over a headless_chrome tab
pub struct ChromePage {
    tab: Arc<Tab>,
}

impl Page for ChromePage {
    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {url}");
        self.tab.navigate_to(url)?;
        self.tab
            .wait_until_navigated()
            .with_context(|| format!("Page failed to load: {url}"))?;
        Ok(())
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn content(&self) -> Result<String> {
        self.tab.get_content().context("Failed to get page content")
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        let input = self
            .tab
            .find_element(selector)
            .with_context(|| format!("No input matches {selector}"))?;
        input.call_js_fn("function() { this.value = ''; }", vec![], false)?;
        input.click()?;
        input.type_into(value)?;
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.tab
            .find_element(selector)
            .with_context(|| format!("Nothing to click at {selector}"))?
            .click()?;
        Ok(())
    }

    fn has_element(&self, selector: &str) -> Result<bool> {
        // The tab's element lookup errors on "not found"; querying the DOM
        // directly separates that from a broken tab.
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let result = self.tab.evaluate(&script, false)?;
        Ok(result
            .value
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }
}
