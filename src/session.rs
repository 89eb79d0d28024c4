use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use chrono::Local;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::export::{export_file_name, write_workbook};
use crate::progress::Progress;
use crate::scrapers::{extract_favorites, login, ChromeSession, Credentials, MarkupRules, Page, Waiter};
use crate::status::StatusWriter;

/// A start request accepted by the control panel
#[derive(Debug, Clone)]
pub struct Job {
    pub credentials: Credentials,
    pub headless: bool,
}

/// The workbook a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub path: PathBuf,
    pub file_name: String,
    pub count: usize,
}

/// Launch Chrome and run the whole job in it.
///
/// Blocks until done. Chrome is closed before this returns, on success and
/// on every error.
pub fn run(job: &Job, config: &Config, progress: &mut dyn Progress) -> Result<Export> {
    progress.log("Starting browser...");
    let mut session = ChromeSession::launch(job.headless, config.page_timeout)
        .map_err(|e| ScrapeError::Setup(format!("{e:#}")))?;

    let result = run_on_page(
        session.page(),
        &job.credentials,
        config,
        &MarkupRules::default(),
        progress,
    );

    drop(session);
    info!("Browser closed");
    result
}

/// Log in, open the favorites dashboard, extract and export, all in an
/// already open tab.
pub fn run_on_page(
    page: &mut dyn Page,
    credentials: &Credentials,
    config: &Config,
    rules: &MarkupRules,
    progress: &mut dyn Progress,
) -> Result<Export> {
    let waiter = Waiter::from_config(config);

    login(
        page,
        &config.site_url(&rules.login_path),
        credentials,
        rules,
        waiter,
        progress,
    )?;

    progress.log("Opening favorites page...");
    let favorites_url = config.site_url(&rules.favorites_path);
    page.navigate(&favorites_url)
        .map_err(|e| ScrapeError::Navigation(format!("{favorites_url}: {e:#}")))?;
    waiter
        .for_element(page, &rules.container_selector())
        .map_err(|e| ScrapeError::Navigation(format!("{favorites_url}: {e:#}")))?;

    progress.log("Collecting favorites...");
    let listings = extract_favorites(page, rules, waiter, progress)?;
    info!("Collected {} favorites", listings.len());

    progress.log("Writing Excel file...");
    let file_name = export_file_name(Local::now());
    let path = write_workbook(&listings, &config.output_dir.join(&file_name))?;

    Ok(Export {
        path,
        file_name,
        count: listings.len(),
    })
}

/// Starts a job in the background, reporting through the given writer
pub trait JobRunner: Send + Sync {
    fn start(&self, job: Job, writer: StatusWriter) -> anyhow::Result<()>;
}

/// Runs each job on its own worker thread with a real browser
pub struct BrowserRunner {
    config: Arc<Config>,
}

impl BrowserRunner {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl JobRunner for BrowserRunner {
    fn start(&self, job: Job, mut writer: StatusWriter) -> anyhow::Result<()> {
        let config = Arc::clone(&self.config);

        thread::Builder::new()
            .name("scrape-worker".to_string())
            .spawn(move || match run(&job, &config, &mut writer) {
                Ok(export) => {
                    info!("✅ Scrape finished: {} ({} rows)", export.path.display(), export.count);
                    writer.succeed(format!("/download/{}", export.file_name), export.count);
                }
                Err(err) => {
                    error!("Scrape failed: {err}");
                    writer.fail(&err);
                }
            })?;

        Ok(())
    }
}
