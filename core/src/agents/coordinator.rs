use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::executor::types::TaskStatus;

use super::message::{preview, AgentKind, AgentMessage, TaskRequest};
use super::skills::{self, Skill};

/// Acknowledgement returned once a request has been routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAcknowledgement {
    pub task_id: String,
    pub user_id: String,
    pub skill: Skill,
    pub status: TaskStatus,
    pub message: String,
}

/// Entry point for task requests: detects the skill and hands off to the planner.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinator;

impl Coordinator {
    pub fn classify(&self, text: &str) -> Skill {
        skills::classify(text)
    }

    pub fn handle_task_request(&self, request: &TaskRequest) -> TaskAcknowledgement {
        tracing::info!(
            target: "conductor.agents",
            agent = "coordinator",
            user_id = %request.user_id,
            content_preview = %preview(&request.content, 100),
            "task request received"
        );

        let skill = skills::resolve(request.skill.as_deref(), &request.content);
        TaskAcknowledgement {
            task_id: format!("task_{}", request.session_id),
            user_id: request.user_id.clone(),
            skill,
            status: TaskStatus::Planning,
            message: format!("Task received, using {} skill", skill),
        }
    }

    pub fn process(&self, message: AgentMessage) -> AgentMessage {
        let skill = self.classify(&message.content);
        tracing::info!(
            target: "conductor.agents",
            agent = "coordinator",
            from = %message.from_agent,
            skill = %skill,
            "delegating to planner"
        );

        let mut context = message.context;
        context.insert("detected_skill".into(), Value::from(skill.as_str()));
        context.insert(
            "original_request".into(),
            Value::from(message.content.clone()),
        );

        AgentMessage::new(AgentKind::Coordinator, AgentKind::Planner, message.content)
            .with_context(context)
    }
}
