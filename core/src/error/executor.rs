use thiserror::Error;

use crate::executor::types::TaskStatus;

/// Errors raised while validating or walking an execution plan.
///
/// The `Display` output of `DependenciesNotMet` and `StepFailed` is what ends
/// up in `TaskResult::error`.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Step {0} dependencies not met")]
    DependenciesNotMet(u32),

    #[error("Step {step} failed: {cause}")]
    StepFailed { step: u32, cause: String },

    #[error("Invalid status transition for step {step}: {from} -> {to}")]
    InvalidTransition {
        step: u32,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Duplicate step number: {0}")]
    DuplicateStep(u32),

    #[error("Step numbers must be positive")]
    ZeroStepNumber,

    #[error("No execution plan provided")]
    MissingPlan,

    #[error("Invalid plan payload: {0}")]
    PlanPayload(#[from] serde_json::Error),
}

impl ExecutorError {
    pub fn step_failed(step: u32, cause: impl ToString) -> Self {
        Self::StepFailed {
            step,
            cause: cause.to_string(),
        }
    }

    /// Stable code used in structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DependenciesNotMet(_) => "DEPENDENCY_ERROR",
            Self::StepFailed { .. } => "STEP_FAILED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::DuplicateStep(_) | Self::ZeroStepNumber => "VALIDATION_ERROR",
            Self::MissingPlan | Self::PlanPayload(_) => "PLAN_ERROR",
        }
    }
}
