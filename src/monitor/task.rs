// Monitoring Task - One registered, in-flight confirmation request
// Strategy selection is per task, tagged at registration time

use crate::decoder::LogType;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

// ============================================================================
// CALLBACK TYPES
// ============================================================================

/// Caller-chosen identifier for a monitoring task, unique within the registry
pub type TaskId = String;

/// Future returned by a predicate checker
pub type CheckFuture = Pin<Box<dyn Future<Output = bool> + Send>>;

/// Caller-supplied asynchronous predicate deciding success
///
/// Must be side-effect-free: the monitor may invoke it once per tick advance
/// until it returns true or the task times out.
pub type Checker = Arc<dyn Fn() -> CheckFuture + Send + Sync>;

/// Single-use callback invoked when a task resolves successfully
pub type SuccessCallback = Box<dyn FnOnce() + Send>;

/// Single-use callback invoked when a task resolves as failed
pub type FailureCallback = Box<dyn FnOnce(FailureReason) + Send>;

// ============================================================================
// STRATEGY
// ============================================================================

/// Verification policy deciding a task's outcome
pub enum Strategy {
    /// Delegate resolution to a caller-supplied predicate, evaluated
    /// repeatedly once the target tick has passed
    Predicate { checker: Checker },
    /// Test membership of the transaction hash in the tick's finalized
    /// transaction list
    FinalizedList,
    /// Inspect the decoded contract log entries for the target tick;
    /// the last entry for the transaction wins
    LogBased,
}

impl Strategy {
    /// Build a predicate strategy from an async closure
    pub fn predicate<F, Fut>(checker: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self::Predicate {
            checker: Arc::new(move || Box::pin(checker())),
        }
    }

    /// Get the strategy kind
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Predicate { .. } => StrategyKind::Predicate,
            Self::FinalizedList => StrategyKind::FinalizedList,
            Self::LogBased => StrategyKind::LogBased,
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Strategy::{}", self.kind())
    }
}

/// Discriminant of a strategy, without its payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    Predicate,
    FinalizedList,
    LogBased,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate => write!(f, "predicate"),
            Self::FinalizedList => write!(f, "finalized-list"),
            Self::LogBased => write!(f, "log-based"),
        }
    }
}

// ============================================================================
// FAILURE REASON
// ============================================================================

/// Why a task resolved as failed
///
/// `Timeout`, `BundleUnavailable` and `NoLogFound` signal absence of
/// evidence; `Rejected` carries evidence of rejection with the decoded
/// diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The ledger advanced past the timeout window without resolution
    Timeout,
    /// The transaction was absent from the finalized list for its tick
    NotFinalized,
    /// No event bundle could be obtained after all retries
    BundleUnavailable,
    /// The bundle contained no log entries for the transaction
    NoLogFound,
    /// The contract logged a failure outcome
    Rejected(LogType),
}

impl FailureReason {
    /// Human-readable diagnostic for this failure
    pub fn message(&self) -> String {
        match self {
            Self::Timeout => "Transaction not confirmed before timeout".to_string(),
            Self::NotFinalized => "Transaction missing from finalized list".to_string(),
            Self::BundleUnavailable => "Event bundle unavailable".to_string(),
            Self::NoLogFound => "No contract log found for transaction".to_string(),
            Self::Rejected(log_type) => log_type.message(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::NotFinalized => write!(f, "not-finalized"),
            Self::BundleUnavailable => write!(f, "bundle-unavailable"),
            Self::NoLogFound => write!(f, "no-log-found"),
            Self::Rejected(log_type) => write!(f, "rejected:{}", log_type),
        }
    }
}

// ============================================================================
// TASK SPEC
// ============================================================================

/// Everything the caller supplies when registering a task
///
/// Callbacks default to no-ops; exactly one of them fires exactly once when
/// the task resolves.
pub struct TaskSpec {
    pub(crate) target_tick: u64,
    pub(crate) tx_hash: Option<String>,
    pub(crate) strategy: Strategy,
    pub(crate) on_success: SuccessCallback,
    pub(crate) on_failure: FailureCallback,
}

impl TaskSpec {
    /// Create a spec for a transaction expected at or after `target_tick`
    pub fn new(target_tick: u64, strategy: Strategy) -> Self {
        Self {
            target_tick,
            tx_hash: None,
            strategy,
            on_success: Box::new(|| {}),
            on_failure: Box::new(|_| {}),
        }
    }

    /// Attach the ledger-assigned transaction identifier
    pub fn with_tx_hash(mut self, tx_hash: &str) -> Self {
        self.tx_hash = Some(tx_hash.to_string());
        self
    }

    /// Set the success callback
    pub fn on_success(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_success = Box::new(callback);
        self
    }

    /// Set the failure callback
    pub fn on_failure(mut self, callback: impl FnOnce(FailureReason) + Send + 'static) -> Self {
        self.on_failure = Box::new(callback);
        self
    }

    /// Get the target tick
    pub fn target_tick(&self) -> u64 {
        self.target_tick
    }

    /// Get the transaction hash, if set
    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    /// Get the strategy kind
    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("target_tick", &self.target_tick)
            .field("tx_hash", &self.tx_hash)
            .field("strategy", &self.strategy)
            .finish()
    }
}

// ============================================================================
// MONITORING TASK
// ============================================================================

/// Registry-owned state of one in-flight task
///
/// `target_tick` is fixed at creation; only the monitor mutates a task after
/// registration, and resolution removes it from the registry before either
/// callback runs.
pub(crate) struct MonitoringTask {
    pub(crate) target_tick: u64,
    pub(crate) tx_hash: Option<String>,
    pub(crate) strategy: Strategy,
    pub(crate) on_success: SuccessCallback,
    pub(crate) on_failure: FailureCallback,
    /// Set while an evaluation for this task is in flight
    pub(crate) busy: bool,
}

impl From<TaskSpec> for MonitoringTask {
    fn from(spec: TaskSpec) -> Self {
        Self {
            target_tick: spec.target_tick,
            tx_hash: spec.tx_hash,
            strategy: spec.strategy,
            on_success: spec.on_success,
            on_failure: spec.on_failure,
            busy: false,
        }
    }
}
