// Ledger Client - Query interface to the ledger's public endpoints
// The monitoring core only ever talks to the ledger through this trait

use crate::ledger::{FinalizedTx, TickEventBundle, TickInfo};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

// ============================================================================
// LEDGER ERRORS
// ============================================================================

/// Errors returned by ledger queries
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Query timed out")]
    Timeout,

    #[error("Invalid event data: {0}")]
    InvalidEventData(String),
}

impl LedgerError {
    /// Check if the query can be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QueryFailed(_) | Self::Timeout)
    }
}

// ============================================================================
// LEDGER CLIENT TRAIT
// ============================================================================

/// Abstract query interface to a tick-based ledger
///
/// Transaction broadcast and signing are deliberately absent: callers
/// broadcast out of band and hand the resulting transaction id to the
/// monitor.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Get the current tick and epoch
    async fn tick_info(&self) -> Result<TickInfo, LedgerError>;

    /// Get the ordered list of transactions finalized in a tick
    async fn finalized_txs(&self, tick: u64) -> Result<Vec<FinalizedTx>, LedgerError>;

    /// Get the event bundle for a tick, or None if not yet available
    async fn tick_events(&self, tick: u64) -> Result<Option<TickEventBundle>, LedgerError>;
}

// ============================================================================
// MOCK LEDGER CLIENT
// ============================================================================

/// Mock implementation of LedgerClient for testing
///
/// Tick, finalized lists, and bundles are all scriptable; failure counters
/// make the first N calls of a query fail before succeeding.
pub struct MockLedgerClient {
    tick: AtomicU64,
    epoch: u32,
    finalized: Mutex<HashMap<u64, Vec<FinalizedTx>>>,
    bundles: Mutex<HashMap<u64, TickEventBundle>>,
    tick_failures: AtomicUsize,
    list_failures: AtomicUsize,
    bundle_absences: AtomicUsize,
    tick_queries: AtomicUsize,
    list_queries: AtomicUsize,
    bundle_queries: AtomicUsize,
}

impl MockLedgerClient {
    /// Create a new mock client at tick 0
    pub fn new() -> Self {
        Self {
            tick: AtomicU64::new(0),
            epoch: 1,
            finalized: Mutex::new(HashMap::new()),
            bundles: Mutex::new(HashMap::new()),
            tick_failures: AtomicUsize::new(0),
            list_failures: AtomicUsize::new(0),
            bundle_absences: AtomicUsize::new(0),
            tick_queries: AtomicUsize::new(0),
            list_queries: AtomicUsize::new(0),
            bundle_queries: AtomicUsize::new(0),
        }
    }

    /// Set the starting tick
    pub fn with_tick(self, tick: u64) -> Self {
        self.tick.store(tick, Ordering::SeqCst);
        self
    }

    /// Set the epoch reported alongside the tick
    pub fn with_epoch(mut self, epoch: u32) -> Self {
        self.epoch = epoch;
        self
    }

    /// Script the finalized transaction list for a tick
    pub fn with_finalized_txs(self, tick: u64, txs: Vec<FinalizedTx>) -> Self {
        if let Ok(mut map) = self.finalized.lock() {
            map.insert(tick, txs);
        }
        self
    }

    /// Script the event bundle for a tick
    pub fn with_bundle(self, bundle: TickEventBundle) -> Self {
        if let Ok(mut map) = self.bundles.lock() {
            map.insert(bundle.tick(), bundle);
        }
        self
    }

    /// Fail the first N tick queries
    pub fn with_tick_failures(self, n: usize) -> Self {
        self.tick_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Fail the first N finalized-list queries
    pub fn with_list_failures(self, n: usize) -> Self {
        self.list_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Return an absent bundle for the first N event queries, even when one
    /// is scripted
    pub fn with_bundle_absences(self, n: usize) -> Self {
        self.bundle_absences.store(n, Ordering::SeqCst);
        self
    }

    /// Advance the reported tick (lower values are ignored)
    pub fn set_tick(&self, tick: u64) {
        self.tick.fetch_max(tick, Ordering::SeqCst);
    }

    /// Number of tick queries served so far
    pub fn tick_queries(&self) -> usize {
        self.tick_queries.load(Ordering::SeqCst)
    }

    /// Number of finalized-list queries served so far
    pub fn list_queries(&self) -> usize {
        self.list_queries.load(Ordering::SeqCst)
    }

    /// Number of event bundle queries served so far
    pub fn bundle_queries(&self) -> usize {
        self.bundle_queries.load(Ordering::SeqCst)
    }

    fn consume_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn tick_info(&self) -> Result<TickInfo, LedgerError> {
        self.tick_queries.fetch_add(1, Ordering::SeqCst);
        if Self::consume_failure(&self.tick_failures) {
            return Err(LedgerError::QueryFailed("mock tick failure".to_string()));
        }
        Ok(TickInfo::new(self.tick.load(Ordering::SeqCst), self.epoch))
    }

    async fn finalized_txs(&self, tick: u64) -> Result<Vec<FinalizedTx>, LedgerError> {
        self.list_queries.fetch_add(1, Ordering::SeqCst);
        if Self::consume_failure(&self.list_failures) {
            return Err(LedgerError::QueryFailed("mock list failure".to_string()));
        }
        let map = self
            .finalized
            .lock()
            .map_err(|_| LedgerError::QueryFailed("mock state poisoned".to_string()))?;
        Ok(map.get(&tick).cloned().unwrap_or_default())
    }

    async fn tick_events(&self, tick: u64) -> Result<Option<TickEventBundle>, LedgerError> {
        self.bundle_queries.fetch_add(1, Ordering::SeqCst);
        if Self::consume_failure(&self.bundle_absences) {
            return Ok(None);
        }
        let map = self
            .bundles
            .lock()
            .map_err(|_| LedgerError::QueryFailed("mock state poisoned".to_string()))?;
        Ok(map.get(&tick).cloned())
    }
}
