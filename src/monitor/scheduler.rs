// Transaction Monitor - Drives in-flight tasks against ledger progress
// One evaluation loop, independent per-task strategy checks, at-most-once
// callback invocation guarded by removal-before-callback

use crate::clock::TickClock;
use crate::decoder::decode_contract_logs;
use crate::ledger::{LedgerClient, TickEventBundle};
use crate::monitor::registry::{TaskRegistry, TaskView};
use crate::monitor::sink::OutcomeSink;
use crate::monitor::task::{FailureReason, StrategyKind, TaskId, TaskSpec};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// ============================================================================
// MONITOR ERROR
// ============================================================================

/// Errors surfaced to callers of the monitor
#[derive(Debug, Clone, Error)]
pub enum MonitorError {
    #[error("Task id already registered: {0}")]
    DuplicateTask(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// MONITOR CONFIG
// ============================================================================

/// Configuration for the transaction monitor
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Ticks past the target after which a pending task fails unconditionally
    pub timeout_ticks: u64,
    /// Extra ticks past the target before log-based evaluation starts,
    /// allowing log propagation
    pub grace_ticks: u64,
    /// How many times to ask for an event bundle before giving up
    pub bundle_fetch_attempts: u32,
    /// Spacing between bundle fetch attempts
    pub bundle_retry_delay: Duration,
    /// Contract index whose log entries decide log-based outcomes
    pub contract_index: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_ticks: 10,
            grace_ticks: 2,
            bundle_fetch_attempts: 10,
            bundle_retry_delay: Duration::from_millis(500),
            contract_index: 0,
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_ticks(mut self, ticks: u64) -> Self {
        self.timeout_ticks = ticks;
        self
    }

    pub fn with_grace_ticks(mut self, ticks: u64) -> Self {
        self.grace_ticks = ticks;
        self
    }

    pub fn with_bundle_fetch_attempts(mut self, attempts: u32) -> Self {
        self.bundle_fetch_attempts = attempts;
        self
    }

    pub fn with_bundle_retry_delay(mut self, delay: Duration) -> Self {
        self.bundle_retry_delay = delay;
        self
    }

    pub fn with_contract_index(mut self, index: u32) -> Self {
        self.contract_index = index;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.bundle_fetch_attempts == 0 {
            return Err(MonitorError::InvalidConfig(
                "bundle_fetch_attempts cannot be 0".to_string(),
            ));
        }
        if self.grace_ticks >= self.timeout_ticks {
            return Err(MonitorError::InvalidConfig(
                "grace_ticks must be < timeout_ticks".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// MONITOR STATS
// ============================================================================

/// Statistics about monitor activity
#[derive(Clone, Debug, Default)]
pub struct MonitorStats {
    pub tasks_registered: u64,
    pub tasks_succeeded: u64,
    pub tasks_failed: u64,
    pub tasks_timed_out: u64,
    pub tasks_cancelled: u64,
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Terminal outcome of one task, decided by its strategy or the timeout
enum Resolution {
    Success,
    Failure(FailureReason),
}

// ============================================================================
// TRANSACTION MONITOR
// ============================================================================

/// The transaction monitor
///
/// Cheap to clone; all clones share one registry, clock subscription, and
/// result sink. The clock poll loop and the evaluation loop run only while
/// at least one task is pending.
#[derive(Clone)]
pub struct TxMonitor {
    inner: Arc<MonitorInner>,
}

impl std::fmt::Debug for TxMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxMonitor").finish_non_exhaustive()
    }
}

struct MonitorInner {
    client: Arc<dyn LedgerClient>,
    clock: Arc<TickClock>,
    config: MonitorConfig,
    registry: TaskRegistry,
    sink: OutcomeSink,
    stats: Mutex<MonitorStats>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TxMonitor {
    /// Create a monitor over an injected clock and ledger client
    ///
    /// Rejects an invalid configuration up front.
    pub fn new(
        client: Arc<dyn LedgerClient>,
        clock: Arc<TickClock>,
        config: MonitorConfig,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(MonitorInner {
                client,
                clock,
                config,
                registry: TaskRegistry::new(),
                sink: OutcomeSink::new(),
                stats: Mutex::new(MonitorStats::default()),
                loop_handle: Mutex::new(None),
            }),
        })
    }

    /// Register a new monitoring task
    ///
    /// Fails synchronously if the task id is already registered. Ensures the
    /// clock poll loop and the evaluation loop are running. Must be called
    /// from within a tokio runtime.
    pub fn start_monitoring(
        &self,
        task_id: impl Into<TaskId>,
        spec: TaskSpec,
    ) -> Result<(), MonitorError> {
        let task_id = task_id.into();
        debug!(
            task_id = %task_id,
            target_tick = spec.target_tick,
            strategy = %spec.strategy_kind(),
            "registering monitoring task"
        );

        self.inner.registry.insert(task_id, spec.into())?;
        self.inner.stats().tasks_registered += 1;

        self.inner.clock.ensure_running(Arc::clone(&self.inner.client));
        self.ensure_loop();
        Ok(())
    }

    /// Remove a task unconditionally, without invoking its callbacks
    ///
    /// Idempotent: stopping an absent or already-resolved id is a no-op.
    pub fn stop_monitoring(&self, task_id: &str) {
        if self.inner.registry.take(task_id).is_some() {
            debug!(task_id, "monitoring task cancelled");
            self.inner.stats().tasks_cancelled += 1;
            self.inner.teardown_if_idle();
        }
    }

    /// Check if any task is pending
    pub fn is_monitoring(&self) -> bool {
        !self.inner.registry.is_empty()
    }

    /// Check if a specific task is still pending
    pub fn is_task_pending(&self, task_id: &str) -> bool {
        self.inner.registry.contains(task_id)
    }

    /// Number of pending tasks
    pub fn pending_tasks(&self) -> usize {
        self.inner.registry.len()
    }

    /// Last resolved outcome across all tasks, if any
    pub fn last_outcome(&self) -> Option<bool> {
        self.inner.sink.last()
    }

    /// Latest tick observed from the ledger
    pub fn latest_tick(&self) -> u64 {
        self.inner.clock.latest()
    }

    /// Snapshot of monitor statistics
    pub fn stats(&self) -> MonitorStats {
        self.inner.stats().clone()
    }

    /// Spawn the evaluation loop if it is not already running
    fn ensure_loop(&self) {
        let mut guard = self
            .inner
            .loop_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if guard.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let mut ticks = inner.clock.subscribe();
        *guard = Some(tokio::spawn(async move {
            // watch only ever moves forward, so ticks presented to tasks are
            // monotonically non-decreasing even when intermediate values are
            // skipped
            while ticks.changed().await.is_ok() {
                let tick = *ticks.borrow_and_update();
                MonitorInner::evaluate_all(&inner, tick);
            }
        }));
    }
}

impl MonitorInner {
    fn stats(&self) -> MutexGuard<'_, MonitorStats> {
        self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Kick off one independent evaluation per pending task
    ///
    /// Tasks already mid-evaluation are skipped; nothing here blocks the
    /// loop, and one task's fetch error never affects another's evaluation.
    fn evaluate_all(inner: &Arc<MonitorInner>, tick: u64) {
        for task_id in inner.registry.task_ids() {
            if let Some(view) = inner.registry.begin_evaluation(&task_id) {
                let inner = Arc::clone(inner);
                tokio::spawn(async move {
                    inner.evaluate(view, tick).await;
                });
            }
        }
    }

    async fn evaluate(self: Arc<Self>, view: TaskView, tick: u64) {
        // The guard clears the busy flag on every exit path, so even a
        // checker that panics leaves the task eligible for the next tick
        let _busy = self.registry.evaluation_guard(&view.task_id);
        if let Some(resolution) = self.evaluate_strategy(&view, tick).await {
            self.resolve(&view.task_id, resolution);
        }
    }

    async fn evaluate_strategy(&self, view: &TaskView, tick: u64) -> Option<Resolution> {
        // Timeout takes precedence over further strategy evaluation
        if tick > view.target_tick + self.config.timeout_ticks {
            return Some(Resolution::Failure(FailureReason::Timeout));
        }

        match view.kind {
            StrategyKind::Predicate => {
                if tick <= view.target_tick {
                    return None;
                }
                let checker = view.checker.as_ref()?;
                if checker().await {
                    Some(Resolution::Success)
                } else {
                    None
                }
            }

            StrategyKind::FinalizedList => {
                if tick <= view.target_tick {
                    return None;
                }
                // Without a hash there is nothing to test membership of;
                // the task rides out to the timeout
                let tx_hash = view.tx_hash.as_deref()?;
                match self.client.finalized_txs(view.target_tick).await {
                    Ok(txs) => {
                        if txs.iter().any(|tx| tx.tx_id() == tx_hash) {
                            Some(Resolution::Success)
                        } else {
                            Some(Resolution::Failure(FailureReason::NotFinalized))
                        }
                    }
                    Err(e) => {
                        warn!(
                            task_id = %view.task_id,
                            error = %e,
                            "finalized list fetch failed, retrying on next tick"
                        );
                        None
                    }
                }
            }

            StrategyKind::LogBased => {
                if tick <= view.target_tick + self.config.grace_ticks {
                    return None;
                }
                let Some(bundle) = self.fetch_bundle_with_retry(view.target_tick).await else {
                    return Some(Resolution::Failure(FailureReason::BundleUnavailable));
                };

                let logs = decode_contract_logs(&bundle, self.config.contract_index);
                let relevant: Vec<_> = match view.tx_hash.as_deref() {
                    Some(hash) => logs.into_iter().filter(|l| l.tx_id() == hash).collect(),
                    None => logs,
                };

                // Last entry in emission order is authoritative
                match relevant.last() {
                    None => Some(Resolution::Failure(FailureReason::NoLogFound)),
                    Some(last) if last.is_success() => Some(Resolution::Success),
                    Some(last) => Some(Resolution::Failure(FailureReason::Rejected(
                        last.log_type(),
                    ))),
                }
            }
        }
    }

    /// Fetch a tick's event bundle, retrying while it is not yet available
    async fn fetch_bundle_with_retry(&self, tick: u64) -> Option<TickEventBundle> {
        for attempt in 1..=self.config.bundle_fetch_attempts {
            match self.client.tick_events(tick).await {
                Ok(Some(bundle)) => return Some(bundle),
                Ok(None) => {
                    debug!(tick, attempt, "event bundle not yet available");
                }
                Err(e) => {
                    warn!(tick, attempt, error = %e, "event bundle fetch failed");
                }
            }
            if attempt < self.config.bundle_fetch_attempts {
                tokio::time::sleep(self.config.bundle_retry_delay).await;
            }
        }
        None
    }

    /// Resolve a task: remove it from the registry, then invoke exactly one
    /// callback
    ///
    /// The removal is the guard: if another path (cancellation, a concurrent
    /// resolution) already took the task, there is nothing left to invoke.
    fn resolve(&self, task_id: &str, resolution: Resolution) {
        let Some(task) = self.registry.take(task_id) else {
            return;
        };

        match resolution {
            Resolution::Success => {
                info!(task_id, "task resolved: success");
                self.stats().tasks_succeeded += 1;
                self.sink.record(true);
                self.teardown_if_idle();
                (task.on_success)();
            }
            Resolution::Failure(reason) => {
                info!(task_id, reason = %reason, "task resolved: failure");
                {
                    let mut stats = self.stats();
                    stats.tasks_failed += 1;
                    if reason == FailureReason::Timeout {
                        stats.tasks_timed_out += 1;
                    }
                }
                self.sink.record(false);
                self.teardown_if_idle();
                (task.on_failure)(reason);
            }
        }
    }

    /// Stop the clock and the evaluation loop once the registry drains
    ///
    /// Idle polling is avoided; a later registration restarts both.
    fn teardown_if_idle(&self) {
        if !self.registry.is_empty() {
            return;
        }
        self.clock.stop();
        let mut guard = self.loop_handle.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }
}
