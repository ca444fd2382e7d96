//! Agent roles: coordinator, planner and executor.
//!
//! The set of roles is closed, so they are variants of [`Agent`] rather than
//! trait objects. Messages are routed by their `to_agent` tag.

mod coordinator;
mod executor;
mod message;
mod orchestrator;
mod planner;
pub mod skills;

use serde_json::{Map, Value};

pub use coordinator::{Coordinator, TaskAcknowledgement};
pub use executor::ExecutorAgent;
pub use message::{AgentKind, AgentMessage, TaskRequest};
pub use orchestrator::Orchestrator;
pub use planner::{script_for, Planner, SKILL_SCRIPTS};
pub use skills::{classify, Skill};

pub enum Agent {
    Coordinator(Coordinator),
    Planner(Planner),
    Executor(ExecutorAgent),
}

impl Agent {
    pub fn kind(&self) -> AgentKind {
        match self {
            Self::Coordinator(_) => AgentKind::Coordinator,
            Self::Planner(_) => AgentKind::Planner,
            Self::Executor(_) => AgentKind::Executor,
        }
    }

    /// Handle one message. Failures come back as a message to the coordinator
    /// carrying `context["error"]`.
    pub async fn process(&self, message: AgentMessage) -> AgentMessage {
        match self {
            Self::Coordinator(coordinator) => coordinator.process(message),
            Self::Planner(planner) => planner.process(message).unwrap_or_else(|err| {
                tracing::error!(target: "conductor.agents", agent = "planner", error = %err, "planning failed");
                let mut context = Map::new();
                context.insert("error".into(), Value::from(err.to_string()));
                AgentMessage::new(
                    AgentKind::Planner,
                    AgentKind::Coordinator,
                    format!("Error: {}", err),
                )
                .with_context(context)
            }),
            Self::Executor(executor) => executor.process(message).await,
        }
    }
}
