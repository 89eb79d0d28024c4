use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;
use crate::progress::Progress;

/// What the control panel shows about the current or last run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub is_running: bool,
    /// Percent, 0..=100
    pub progress: u8,
    pub message: String,
    pub total: usize,
    pub current: usize,
    pub error: Option<String>,
    pub download_url: Option<String>,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self {
            is_running: false,
            progress: 0,
            message: "Waiting...".to_string(),
            total: 0,
            current: 0,
            error: None,
            download_url: None,
        }
    }
}

/// Shared status record. Clones are cheap handles to the same state.
///
/// The panel reads snapshots; only the `StatusWriter` handed out by
/// `try_begin` changes it, and at most one writer exists at a time.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<JobStatus>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> JobStatus {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Claim the board for a new run.
    ///
    /// Returns `None` and leaves the state untouched if a run is active.
    pub fn try_begin(&self) -> Option<StatusWriter> {
        let mut status = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if status.is_running {
            return None;
        }

        *status = JobStatus {
            is_running: true,
            message: "Preparing...".to_string(),
            ..JobStatus::default()
        };

        Some(StatusWriter {
            inner: Arc::clone(&self.inner),
        })
    }
}

/// Exclusive write access for the one active run.
///
/// Dropping it marks the run finished, so the board never stays stuck in
/// the running state even if the worker panics.
#[derive(Debug)]
pub struct StatusWriter {
    inner: Arc<RwLock<JobStatus>>,
}

impl StatusWriter {
    fn update(&self, f: impl FnOnce(&mut JobStatus)) {
        let mut status = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *status);
    }

    pub fn succeed(self, download_url: String, count: usize) {
        self.update(|status| {
            status.progress = 100;
            status.message = format!("Done! Saved {count} spaces. Click download.");
            status.download_url = Some(download_url);
        });
    }

    pub fn fail(self, err: &ScrapeError) {
        self.update(|status| {
            status.message = "An error occurred".to_string();
            status.error = Some(err.to_string());
        });
    }
}

impl Progress for StatusWriter {
    fn log(&mut self, msg: &str) {
        self.update(|status| status.message = msg.to_string());
    }

    fn begin(&mut self, total: usize) {
        self.update(|status| {
            status.total = total;
            status.current = 0;
            status.progress = 0;
        });
    }

    fn item_done(&mut self, current: usize) {
        self.update(|status| {
            status.current = current;
            if status.total > 0 {
                status.progress = (current.min(status.total) * 100 / status.total) as u8;
            }
        });
    }
}

impl Drop for StatusWriter {
    fn drop(&mut self) {
        self.update(|status| status.is_running = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_board_reports_waiting() {
        let board = StatusBoard::new();
        let status = board.snapshot();
        assert!(!status.is_running);
        assert_eq!(status.message, "Waiting...");
        assert_eq!(status.error, None);
    }

    #[test]
    fn second_begin_is_rejected_without_touching_state() {
        let board = StatusBoard::new();
        let mut writer = board.try_begin().unwrap();
        writer.begin(4);
        writer.item_done(1);
        writer.log("Processing favorite list 1/4...");
        let before = board.snapshot();

        assert!(board.try_begin().is_none());
        assert_eq!(board.snapshot(), before);
        assert_eq!(before.progress, 25);
        assert!(before.is_running);
    }

    #[test]
    fn finishing_frees_the_board() {
        let board = StatusBoard::new();
        board
            .try_begin()
            .unwrap()
            .succeed("/download/a.xlsx".into(), 3);

        let status = board.snapshot();
        assert!(!status.is_running);
        assert_eq!(status.progress, 100);
        assert_eq!(status.download_url.as_deref(), Some("/download/a.xlsx"));

        let writer = board.try_begin().unwrap();
        let fresh = board.snapshot();
        assert_eq!(fresh.download_url, None);
        assert_eq!(fresh.message, "Preparing...");
        drop(writer);
    }

    #[test]
    fn failure_keeps_message_and_error() {
        let board = StatusBoard::new();
        board
            .try_begin()
            .unwrap()
            .fail(&ScrapeError::Authentication("still on the login page".into()));

        let status = board.snapshot();
        assert!(!status.is_running);
        assert_eq!(status.message, "An error occurred");
        assert_eq!(
            status.error.as_deref(),
            Some("login failed: still on the login page")
        );
    }

    #[test]
    fn new_phase_restarts_the_bar() {
        let board = StatusBoard::new();
        let mut writer = board.try_begin().unwrap();
        writer.begin(2);
        writer.item_done(2);
        assert_eq!(board.snapshot().progress, 100);

        writer.begin(5);
        let status = board.snapshot();
        assert_eq!(status.progress, 0);
        assert_eq!(status.current, 0);
        assert_eq!(status.total, 5);
    }

    #[test]
    fn dropped_writer_stops_running() {
        let board = StatusBoard::new();
        let writer = board.try_begin().unwrap();
        drop(writer);
        assert!(!board.snapshot().is_running);
    }
}
