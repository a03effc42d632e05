// Outcome Sink - Last resolved outcome, for presentation layers to poll

use std::sync::Mutex;

/// Records the most recently resolved task outcome
///
/// Presentation layers poll this instead of wiring a callback into every
/// registration site.
#[derive(Debug, Default)]
pub struct OutcomeSink {
    last: Mutex<Option<bool>>,
}

impl OutcomeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved outcome
    pub fn record(&self, success: bool) {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(success);
        }
    }

    /// Get the last resolved outcome, if any task has resolved yet
    pub fn last(&self) -> Option<bool> {
        self.last.lock().ok().and_then(|last| *last)
    }

    /// Forget the recorded outcome
    pub fn clear(&self) {
        if let Ok(mut last) = self.last.lock() {
            *last = None;
        }
    }
}
