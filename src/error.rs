use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Terminal failure of a scrape run. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser setup failed: {0}")]
    Setup(String),

    #[error("login failed: {0}")]
    Authentication(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("data collection failed: {0}")]
    Extraction(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl From<rust_xlsxwriter::XlsxError> for ScrapeError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ScrapeError::Export(err.to_string())
    }
}
