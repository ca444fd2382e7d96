use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::TaskStatus;

/// Summary of one plan execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,

    pub status: TaskStatus,

    /// Result of the last step that completed
    #[serde(default)]
    pub result: Option<Value>,

    /// First failure reason, naming the offending step
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub execution_time_ms: u64,

    #[serde(default)]
    pub steps_completed: usize,

    #[serde(default)]
    pub total_steps: usize,
}

impl TaskResult {
    /// Failure that happened before a plan existed. `task_id` may be empty.
    pub fn failed(task_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Failed,
            result: None,
            error: Some(error.into()),
            execution_time_ms: 0,
            steps_completed: 0,
            total_steps: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// State of a job on the remote backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    Timeout,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteJobResult {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl RemoteJobResult {
    pub fn running(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Running,
            result: None,
            error: None,
            duration_ms: 0,
        }
    }

    pub fn completed(job_id: impl Into<String>, result: Value, duration: Duration) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Completed,
            result: Some(result),
            error: None,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn failed(job_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Failed,
            result: None,
            error: Some(error.into()),
            duration_ms: 0,
        }
    }

    pub fn timed_out(job_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Timeout,
            result: None,
            error: Some(format!("Job timed out after {}s", timeout.as_secs_f64())),
            duration_ms: timeout.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_task_result_shape() {
        let result = TaskResult::failed("", "planner crashed");
        assert_eq!(result.task_id, "");
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("planner crashed"));
        assert!(!result.is_success());
    }

    #[test]
    fn test_timeout_message_names_budget() {
        let r = RemoteJobResult::timed_out("job-1", Duration::from_secs(300));
        assert_eq!(r.status, JobStatus::Timeout);
        assert_eq!(r.error.as_deref(), Some("Job timed out after 300s"));
        assert!(r.status.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_task_result_json_uses_snake_case_status() {
        let result = TaskResult::failed("t1", "x");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["total_steps"], 0);
    }
}
