use std::sync::Arc;

use anyhow::Result;

use conductor_core::api::{AppConfig, ExecutionOpts, JobRunner, Orchestrator, StepScheduler};

use crate::windmill::WindmillClient;

pub fn build_job_runner(cfg: &AppConfig) -> Result<Arc<dyn JobRunner>> {
    Ok(Arc::new(WindmillClient::new(&cfg.windmill)?))
}

pub fn build_scheduler(cfg: &AppConfig, runner: Arc<dyn JobRunner>) -> StepScheduler {
    StepScheduler::new(runner, ExecutionOpts::from_config(&cfg.executor))
}

/// Runner, scheduler and agents wired from one config.
pub fn build_orchestrator(cfg: &AppConfig) -> Result<Orchestrator> {
    let runner = build_job_runner(cfg)?;
    tracing::debug!(
        target: "conductor.factory",
        runner = runner.name(),
        base_url = %cfg.windmill.base_url,
        workspace = %cfg.windmill.workspace,
        "job runner ready"
    );
    Ok(Orchestrator::new(build_scheduler(cfg, runner)))
}
