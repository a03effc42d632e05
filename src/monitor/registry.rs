// Task Registry - Exclusive owner of all in-flight monitoring tasks
// Removal-before-callback is the at-most-once resolution guard

use crate::monitor::scheduler::MonitorError;
use crate::monitor::task::{Checker, MonitoringTask, Strategy, StrategyKind, TaskId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// TASK VIEW
// ============================================================================

/// Immutable snapshot of a task handed to one evaluation pass
///
/// Carries everything a strategy needs without holding the registry lock
/// across an await point.
pub(crate) struct TaskView {
    pub(crate) task_id: TaskId,
    pub(crate) target_tick: u64,
    pub(crate) tx_hash: Option<String>,
    pub(crate) kind: StrategyKind,
    pub(crate) checker: Option<Checker>,
}

// ============================================================================
// TASK REGISTRY
// ============================================================================

/// Mutex-guarded map of task id to in-flight task
pub(crate) struct TaskRegistry {
    tasks: Mutex<HashMap<TaskId, MonitoringTask>>,
}

impl TaskRegistry {
    pub(crate) fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, MonitoringTask>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new task; rejects duplicate identifiers synchronously
    pub(crate) fn insert(&self, task_id: TaskId, task: MonitoringTask) -> Result<(), MonitorError> {
        let mut tasks = self.lock();
        if tasks.contains_key(&task_id) {
            return Err(MonitorError::DuplicateTask(task_id));
        }
        tasks.insert(task_id, task);
        Ok(())
    }

    /// Remove a task and hand its callbacks to the caller
    ///
    /// Idempotent: removing an absent id returns None, and only the caller
    /// that receives the task may invoke its callbacks. This is what keeps
    /// resolution at-most-once under concurrent re-evaluation.
    pub(crate) fn take(&self, task_id: &str) -> Option<MonitoringTask> {
        self.lock().remove(task_id)
    }

    /// Check if a task id is registered
    pub(crate) fn contains(&self, task_id: &str) -> bool {
        self.lock().contains_key(task_id)
    }

    /// Number of pending tasks
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no tasks are pending
    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot the ids of all pending tasks
    pub(crate) fn task_ids(&self) -> Vec<TaskId> {
        self.lock().keys().cloned().collect()
    }

    /// Mark a task busy and snapshot it for evaluation
    ///
    /// Returns None if the task is gone or an evaluation for it is already
    /// in flight, so rapid tick advances never overlap on one task.
    pub(crate) fn begin_evaluation(&self, task_id: &str) -> Option<TaskView> {
        let mut tasks = self.lock();
        let task = tasks.get_mut(task_id)?;
        if task.busy {
            return None;
        }
        task.busy = true;

        let checker = match &task.strategy {
            Strategy::Predicate { checker } => Some(checker.clone()),
            _ => None,
        };
        Some(TaskView {
            task_id: task_id.to_string(),
            target_tick: task.target_tick,
            tx_hash: task.tx_hash.clone(),
            kind: task.strategy.kind(),
            checker,
        })
    }

    /// Clear the busy flag after an evaluation that did not resolve
    pub(crate) fn finish_evaluation(&self, task_id: &str) {
        if let Some(task) = self.lock().get_mut(task_id) {
            task.busy = false;
        }
    }

    /// Hand out a guard that clears the busy flag when dropped
    pub(crate) fn evaluation_guard<'a>(&'a self, task_id: &'a str) -> EvaluationGuard<'a> {
        EvaluationGuard {
            registry: self,
            task_id,
        }
    }
}

// ============================================================================
// EVALUATION GUARD
// ============================================================================

/// Clears a task's busy flag on drop
///
/// Held across an evaluation so the flag is released on every exit path,
/// including an unwind out of a caller-supplied checker. A task that resolved
/// is already out of the registry, so the clear is a no-op there.
pub(crate) struct EvaluationGuard<'a> {
    registry: &'a TaskRegistry,
    task_id: &'a str,
}

impl Drop for EvaluationGuard<'_> {
    fn drop(&mut self) {
        self.registry.finish_evaluation(self.task_id);
    }
}
