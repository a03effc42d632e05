// Task Chaining - Sequential composition of dependent monitoring tasks
// Replaces nested completion-callback pyramids with an explicit two-step
// registration: the follow-up task is built and registered only after the
// first task resolves successfully

use crate::monitor::scheduler::{MonitorError, TxMonitor};
use crate::monitor::task::{SuccessCallback, TaskId, TaskSpec};
use tracing::warn;

impl TxMonitor {
    /// Register `first`, then on its success build and register a dependent
    /// task
    ///
    /// The typical shape is "transfer rights, then create the resource that
    /// needs them": the second step's target tick and hash are usually not
    /// known until the first step has confirmed, so `next` is deferred until
    /// then. A failure of the first task aborts the chain; its own failure
    /// callback still fires.
    pub fn start_chained<N>(
        &self,
        first_id: impl Into<TaskId>,
        first: TaskSpec,
        next: N,
    ) -> Result<(), MonitorError>
    where
        N: FnOnce() -> (TaskId, TaskSpec) + Send + 'static,
    {
        let monitor = self.clone();
        let first_success = first.on_success;

        let chained: SuccessCallback = Box::new(move || {
            first_success();
            let (next_id, next_spec) = next();
            if let Err(e) = monitor.start_monitoring(next_id.clone(), next_spec) {
                warn!(task_id = %next_id, error = %e, "chained task registration failed");
            }
        });

        self.start_monitoring(
            first_id,
            TaskSpec {
                on_success: chained,
                ..first
            },
        )
    }
}
