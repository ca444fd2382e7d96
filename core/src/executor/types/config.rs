use std::time::Duration;

use crate::config::ExecutorConfig;

/// Execution options for the step scheduler.
#[derive(Debug, Clone)]
pub struct ExecutionOpts {
    /// Wait budget handed to the job runner for each scripted step
    pub job_timeout: Duration,
}

impl Default for ExecutionOpts {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(300),
        }
    }
}

impl ExecutionOpts {
    pub fn from_config(cfg: &ExecutorConfig) -> Self {
        Self {
            job_timeout: Duration::from_secs(cfg.job_timeout_secs),
        }
    }
}
