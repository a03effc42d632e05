// Monitor module - WHO IS STILL WAITING
// Task registry, verification strategies, the scheduler, and the result sink

mod chain;
mod registry;
mod scheduler;
mod sink;
mod task;

pub use scheduler::{MonitorConfig, MonitorError, MonitorStats, TxMonitor};
pub use sink::OutcomeSink;
pub use task::{
    CheckFuture, Checker, FailureCallback, FailureReason, Strategy, StrategyKind,
    SuccessCallback, TaskId, TaskSpec,
};
