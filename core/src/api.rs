//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `conductor_core::api` instead of reaching into internal modules.

pub use crate::agents::{
    classify, Agent, AgentKind, AgentMessage, Coordinator, ExecutorAgent, Orchestrator, Planner,
    Skill, TaskAcknowledgement, TaskRequest,
};
pub use crate::config::{
    load_default, load_from_path, AppConfig, ExecutorConfig, LoggingConfig, ServerConfig,
    WindmillConfig,
};
pub use crate::error::{CliError, ExecutorError};
pub use crate::executor::{
    ExecutionOpts, ExecutionPlan, ExecutionStep, JobRunner, JobStatus, PlanAggregator,
    PlanOutcome, RemoteJobResult, StepScheduler, TaskResult, TaskStatus,
};
