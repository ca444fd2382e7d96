use std::sync::Arc;

use serde_json::{Map, Value};

use crate::executor::types::TaskResult;
use crate::executor::{JobRunner, StepScheduler};

use super::coordinator::{Coordinator, TaskAcknowledgement};
use super::executor::ExecutorAgent;
use super::message::{preview, AgentKind, AgentMessage, TaskRequest};
use super::planner::Planner;
use super::Agent;

/// Owns one instance of each agent and runs requests through them.
///
/// Built once at startup and shared by handle.
pub struct Orchestrator {
    coordinator: Agent,
    planner: Agent,
    executor: Agent,
    scheduler: Arc<StepScheduler>,
}

impl Orchestrator {
    pub fn new(scheduler: StepScheduler) -> Self {
        let scheduler = Arc::new(scheduler);
        Self {
            coordinator: Agent::Coordinator(Coordinator),
            planner: Agent::Planner(Planner),
            executor: Agent::Executor(ExecutorAgent::new(scheduler.clone())),
            scheduler,
        }
    }

    pub fn agent(&self, kind: AgentKind) -> &Agent {
        match kind {
            AgentKind::Coordinator => &self.coordinator,
            AgentKind::Planner => &self.planner,
            AgentKind::Executor => &self.executor,
        }
    }

    pub fn agents(&self) -> [&Agent; 3] {
        [&self.coordinator, &self.planner, &self.executor]
    }

    pub fn runner(&self) -> &Arc<dyn JobRunner> {
        self.scheduler.runner()
    }

    pub async fn route(&self, message: AgentMessage) -> AgentMessage {
        self.agent(message.to_agent).process(message).await
    }

    /// coordinator → planner → executor. Always yields a `TaskResult`.
    pub async fn run_task(&self, request: TaskRequest) -> TaskResult {
        tracing::info!(
            target: "conductor.agents",
            user_id = %request.user_id,
            content_preview = %preview(&request.content, 100),
            "task received"
        );

        let ack = Coordinator.handle_task_request(&request);

        let mut context = Map::new();
        context.insert("user_id".into(), Value::from(request.user_id.clone()));
        context.insert("session_id".into(), Value::from(request.session_id.clone()));
        context.insert("detected_skill".into(), Value::from(ack.skill.as_str()));
        context.insert(
            "conversation_id".into(),
            Value::from(request.conversation_id.clone()),
        );
        context.extend(request.context);

        let to_planner =
            AgentMessage::new(AgentKind::Coordinator, AgentKind::Planner, request.content)
                .with_context(context);

        let to_executor = self.route(to_planner).await;
        if to_executor.to_agent != AgentKind::Executor {
            return failure_from(&ack, &to_executor);
        }

        let finished = self.route(to_executor).await;
        match finished.context.get("result") {
            Some(raw) => serde_json::from_value::<TaskResult>(raw.clone())
                .unwrap_or_else(|e| TaskResult::failed(ack.task_id.clone(), e.to_string())),
            None => failure_from(&ack, &finished),
        }
    }

    pub async fn run_script(&self, script_path: &str, args: Map<String, Value>) -> TaskResult {
        tracing::info!(target: "conductor.agents", script = %script_path, "direct script execution");
        self.scheduler.execute_single_script(script_path, args).await
    }
}

fn failure_from(ack: &TaskAcknowledgement, message: &AgentMessage) -> TaskResult {
    let error = message
        .context_str("error")
        .map(str::to_string)
        .unwrap_or_else(|| message.content.clone());
    tracing::error!(target: "conductor.agents", task_id = %ack.task_id, error = %error, "task execution failed");
    TaskResult::failed(ack.task_id.clone(), error)
}
