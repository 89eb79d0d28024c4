use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Runtime settings for the control panel and the scrape worker.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Where exported workbooks are written and served from
    pub output_dir: PathBuf,
    /// Site root; login and favorites paths are joined onto it
    pub base_url: String,
    /// Upper bound for every condition-based wait
    pub page_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            output_dir: PathBuf::from("static"),
            base_url: "https://www.spacemarket.com".to_string(),
            page_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl Config {
    /// Read `SPACEMARKET_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();

        if let Some(host) = lookup("SPACEMARKET_HOST") {
            cfg.host = host;
        }
        if let Some(port) = lookup("SPACEMARKET_PORT") {
            cfg.port = port
                .parse()
                .with_context(|| format!("invalid SPACEMARKET_PORT: {port}"))?;
        }
        if let Some(dir) = lookup("SPACEMARKET_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("SPACEMARKET_BASE_URL") {
            cfg.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("SPACEMARKET_PAGE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("invalid SPACEMARKET_PAGE_TIMEOUT_SECS: {secs}"))?;
            cfg.page_timeout = Duration::from_secs(secs);
        }

        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Absolute URL for a site path such as `/login`
    pub fn site_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
