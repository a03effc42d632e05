// Tick Clock - Shared view of the ledger's latest observed tick
// Owns the background poll loop; the monitor subscribes to tick advances

use crate::ledger::LedgerClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// ============================================================================
// CLOCK CONFIG
// ============================================================================

/// Configuration for the tick clock
#[derive(Clone, Debug)]
pub struct ClockConfig {
    /// How often to poll the ledger for its current tick
    pub poll_interval: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl ClockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

// ============================================================================
// TICK CLOCK
// ============================================================================

/// Publishes the latest observed ledger tick to subscribers
///
/// The published value is monotonically non-decreasing: a stale poll result
/// can never roll the clock backwards. A failed poll leaves the previous
/// value in place and is retried on the next interval; poll failures are
/// never surfaced to individual monitoring tasks.
pub struct TickClock {
    config: ClockConfig,
    tx: watch::Sender<u64>,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TickClock {
    /// Create a new clock at tick 0, not yet polling
    pub fn new(config: ClockConfig) -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            config,
            tx,
            poll_handle: Mutex::new(None),
        }
    }

    /// Get the most recently observed tick
    ///
    /// The value is a snapshot and may be stale by up to the poll interval.
    pub fn latest(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Subscribe to tick advances
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Publish a newly observed tick
    ///
    /// Values at or below the current tick are ignored, so callers that
    /// already know a fresh tick (e.g. from a broadcast response) can feed
    /// it in without risking a rollback. Returns true if the clock advanced.
    pub fn publish(&self, tick: u64) -> bool {
        self.tx.send_if_modified(|current| {
            if tick > *current {
                *current = tick;
                true
            } else {
                false
            }
        })
    }

    /// Check if the background poll loop is active
    pub fn is_running(&self) -> bool {
        self.poll_handle
            .lock()
            .map(|guard| guard.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Start the background poll loop if it is not already running
    ///
    /// Must be called from within a tokio runtime. Idempotent.
    pub fn ensure_running(self: &Arc<Self>, client: Arc<dyn LedgerClient>) {
        let Ok(mut guard) = self.poll_handle.lock() else {
            return;
        };
        if guard.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let clock = Arc::clone(self);
        *guard = Some(tokio::spawn(async move {
            loop {
                match client.tick_info().await {
                    Ok(info) => {
                        if clock.publish(info.tick) {
                            debug!(tick = info.tick, epoch = info.epoch, "tick advanced");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "tick poll failed, keeping previous value");
                    }
                }
                tokio::time::sleep(clock.config.poll_interval).await;
            }
        }));
    }

    /// Stop the background poll loop
    ///
    /// The last observed tick stays readable; only polling stops. Idempotent.
    pub fn stop(&self) {
        if let Ok(mut guard) = self.poll_handle.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for TickClock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_is_monotonic() {
        let clock = TickClock::new(ClockConfig::default());

        assert!(clock.publish(10));
        assert!(!clock.publish(10));
        assert!(!clock.publish(5));
        assert!(clock.publish(11));
        assert_eq!(clock.latest(), 11);
    }

    #[test]
    fn test_subscribers_observe_advances() {
        let clock = TickClock::new(ClockConfig::default());
        let rx = clock.subscribe();

        clock.publish(42);
        assert_eq!(*rx.borrow(), 42);
    }
}
