// In-memory stand-in for the browser tab.
//
// FakeSite maps URLs to HTML and follows navigations, form fills and the
// login submit redirect, so whole runs can be driven without Chrome.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use scraper::{Html, Selector};

use crate::config::Config;
use crate::scrapers::page::Page;

pub const BASE_URL: &str = "https://www.spacemarket.com";

pub const LOGIN_FORM: &str = r#"
<html><body>
  <form action="/login" method="post">
    <input name="email" type="email">
    <input name="password" type="password">
    <input type="submit" value="ログイン">
  </form>
</body></html>
"#;

/// Absolute URL on the fake site
pub fn site(path: &str) -> String {
    format!("{BASE_URL}{path}")
}

/// Config with waits short enough for tests
pub fn test_config(output_dir: &std::path::Path) -> Config {
    Config {
        output_dir: output_dir.to_path_buf(),
        base_url: BASE_URL.to_string(),
        page_timeout: std::time::Duration::from_millis(60),
        poll_interval: std::time::Duration::from_millis(5),
        ..Config::default()
    }
}

/// URL→HTML browser double. Navigating to an unregistered URL fails.
pub struct FakeSite {
    pages: HashMap<String, String>,
    current: String,
    visits: Vec<String>,
    filled: Vec<(String, String)>,
    after_submit: Option<String>,
}

impl Default for FakeSite {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSite {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            current: "about:blank".to_string(),
            visits: Vec::new(),
            filled: Vec::new(),
            after_submit: None,
        }
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Put the tab on `url` without recording a visit
    pub fn start_at(mut self, url: &str) -> Self {
        self.current = url.to_string();
        self
    }

    /// Where a click on a submit button lands. Without one the tab stays put,
    /// which is what a rejected login looks like.
    pub fn redirect_after_submit(mut self, url: &str) -> Self {
        self.after_submit = Some(url.to_string());
        self
    }

    /// Every URL the tab landed on, in order
    pub fn visits(&self) -> &[String] {
        &self.visits
    }

    pub fn filled(&self) -> &[(String, String)] {
        &self.filled
    }

    fn require(&self, selector: &str) -> Result<()> {
        if self.has_element(selector)? {
            Ok(())
        } else {
            bail!("no element matches {selector} on {}", self.current)
        }
    }
}

impl Page for FakeSite {
    fn navigate(&mut self, url: &str) -> Result<()> {
        if !self.pages.contains_key(url) {
            bail!("net::ERR_NAME_NOT_RESOLVED at {url}");
        }
        self.current = url.to_string();
        self.visits.push(url.to_string());
        Ok(())
    }

    fn current_url(&self) -> String {
        self.current.clone()
    }

    fn content(&self) -> Result<String> {
        self.pages
            .get(&self.current)
            .cloned()
            .ok_or_else(|| anyhow!("nothing loaded at {}", self.current))
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        self.require(selector)?;
        self.filled.push((selector.to_string(), value.to_string()));
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.require(selector)?;
        if selector.contains("submit") {
            if let Some(target) = self.after_submit.clone() {
                self.current = target.clone();
                self.visits.push(target);
            }
        }
        Ok(())
    }

    fn has_element(&self, selector: &str) -> Result<bool> {
        let Some(html) = self.pages.get(&self.current) else {
            return Ok(false);
        };
        let selector = Selector::parse(selector).map_err(|e| anyhow!("bad selector: {e}"))?;
        Ok(Html::parse_document(html).select(&selector).next().is_some())
    }
}
