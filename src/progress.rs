/// Progress reporting for a scrape run. The worker calls these at phase
/// boundaries; the status board implements it for the control panel.
pub trait Progress {
    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A counted phase starts with `total` items.
    fn begin(&mut self, _total: usize) {}

    /// `current` items (1-based) of the phase are done.
    fn item_done(&mut self, _current: usize) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Keeps every message; handy for asserting on what a run reported.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub messages: Vec<String>,
    pub totals: Vec<usize>,
    pub last_done: usize,
}

#[cfg(any(test, feature = "test-support"))]
impl Progress for RecordingProgress {
    fn log(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn begin(&mut self, total: usize) {
        self.totals.push(total);
        self.last_done = 0;
    }

    fn item_done(&mut self, current: usize) {
        self.last_done = current;
    }
}
