use std::time::Instant;

use serde_json::Value;

use super::types::{TaskResult, TaskStatus};

/// Folds per-step outcomes into a single `TaskResult`.
///
/// Only the first recorded error is kept. The result is the payload of the
/// last successful step, which is not the last step of the plan when the walk
/// halted early.
#[derive(Debug)]
pub struct PlanAggregator {
    task_id: String,
    total_steps: usize,
    steps_completed: usize,
    last_result: Option<Value>,
    error: Option<String>,
    started: Instant,
}

impl PlanAggregator {
    pub fn new(task_id: impl Into<String>, total_steps: usize) -> Self {
        Self {
            task_id: task_id.into(),
            total_steps,
            steps_completed: 0,
            last_result: None,
            error: None,
            started: Instant::now(),
        }
    }

    pub fn record_success(&mut self, result: Value) {
        if self.steps_completed < self.total_steps {
            self.steps_completed += 1;
        }
        self.last_result = Some(result);
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }

    pub fn finish(self) -> TaskResult {
        let status = if self.error.is_none() && self.steps_completed == self.total_steps {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };

        TaskResult {
            task_id: self.task_id,
            status,
            result: self.last_result,
            error: self.error,
            execution_time_ms: self.started.elapsed().as_millis() as u64,
            steps_completed: self.steps_completed,
            total_steps: self.total_steps,
        }
    }
}
