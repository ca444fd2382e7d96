use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ExecutorError;
use crate::executor::types::{ExecutionPlan, TaskStatus};
use crate::executor::StepScheduler;

use super::message::{AgentKind, AgentMessage};

/// Runs the plan carried in `context["plan"]` and reports back to the coordinator.
#[derive(Clone)]
pub struct ExecutorAgent {
    scheduler: Arc<StepScheduler>,
}

impl ExecutorAgent {
    pub fn new(scheduler: Arc<StepScheduler>) -> Self {
        Self { scheduler }
    }

    pub fn scheduler(&self) -> &Arc<StepScheduler> {
        &self.scheduler
    }

    pub async fn process(&self, message: AgentMessage) -> AgentMessage {
        let plan = match extract_plan(&message) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(target: "conductor.agents", agent = "executor", error = %err, "cannot execute");
                let mut context = Map::new();
                context.insert("error".into(), Value::from(err.to_string()));
                return reply(format!("Error: {}", err), context);
            }
        };

        tracing::info!(
            target: "conductor.agents",
            agent = "executor",
            task_id = %plan.task_id,
            steps = plan.steps.len(),
            "executing plan"
        );

        let outcome = self.scheduler.execute(plan).await;
        let verdict = if outcome.result.status == TaskStatus::Completed {
            "completed"
        } else {
            "failed"
        };

        let mut context = Map::new();
        match serde_json::to_value(&outcome.result) {
            Ok(result) => {
                context.insert("result".into(), result);
            }
            Err(err) => {
                context.insert("error".into(), Value::from(err.to_string()));
            }
        }
        reply(format!("Plan execution {}", verdict), context)
    }
}

fn extract_plan(message: &AgentMessage) -> Result<ExecutionPlan, ExecutorError> {
    let raw = message.context.get("plan").ok_or(ExecutorError::MissingPlan)?;
    let plan: ExecutionPlan = serde_json::from_value(raw.clone())?;
    plan.validate()?;
    Ok(plan)
}

fn reply(content: String, context: Map<String, Value>) -> AgentMessage {
    AgentMessage::new(AgentKind::Executor, AgentKind::Coordinator, content).with_context(context)
}
