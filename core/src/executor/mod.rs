//! Plan execution engine
//!
//! ```text
//! ExecutionPlan
//!   ↓
//! StepScheduler::execute()   steps in declared order, one at a time
//!   ├─ dependency check      against results of this run only
//!   ├─ input preparation     step_<id>_result injection
//!   └─ dispatch              JobRunner::submit(wait) or passthrough
//!   ↓
//! PlanAggregator::finish() → TaskResult
//! ```

mod aggregate;
mod scheduler;
pub mod traits;
pub mod types;

pub use aggregate::PlanAggregator;
pub use scheduler::{PlanOutcome, StepScheduler};
pub use traits::JobRunner;
pub use types::{
    ExecutionOpts, ExecutionPlan, ExecutionStep, JobStatus, RemoteJobResult, TaskResult,
    TaskStatus,
};
