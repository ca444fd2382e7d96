use serde_json::{Map, Value};

use crate::error::ExecutorError;
use crate::executor::types::{ExecutionPlan, ExecutionStep};

use super::message::{preview, AgentKind, AgentMessage};
use super::skills::Skill;

/// Remote scripts available to each skill, keyed by action name.
pub const SKILL_SCRIPTS: &[(Skill, &[(&str, &str)])] = &[
    (
        Skill::SocialMedia,
        &[
            ("create_post", "f/openanalyst/social/create_post"),
            ("schedule_post", "f/openanalyst/social/schedule_post"),
            ("analyze_engagement", "f/openanalyst/social/analyze_engagement"),
        ],
    ),
    (
        Skill::Analytics,
        &[
            ("fetch_metrics", "f/openanalyst/analytics/fetch_metrics"),
            ("generate_report", "f/openanalyst/analytics/generate_report"),
            ("create_dashboard", "f/openanalyst/analytics/create_dashboard"),
        ],
    ),
    (
        Skill::Workflow,
        &[
            ("create_flow", "f/openanalyst/workflow/create_flow"),
            ("schedule_flow", "f/openanalyst/workflow/schedule_flow"),
        ],
    ),
    (
        Skill::Core,
        &[
            ("send_message", "f/openanalyst/core/send_ws_message"),
            ("log_activity", "f/openanalyst/core/log_activity"),
        ],
    ),
];

pub fn script_for(skill: Skill, action: &str) -> Option<&'static str> {
    SKILL_SCRIPTS
        .iter()
        .find(|(s, _)| *s == skill)
        .and_then(|(_, scripts)| scripts.iter().find(|(name, _)| *name == action))
        .map(|(_, path)| *path)
}

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Builds execution plans from the skill table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner;

impl Planner {
    /// Deterministic given the skill table: same inputs, same steps.
    pub fn build(&self, skill: Skill, request: &str, user_id: &str) -> ExecutionPlan {
        let lowered = request.to_lowercase();
        let mut steps: Vec<ExecutionStep> = Vec::new();

        match skill {
            Skill::SocialMedia => {
                if mentions_any(&lowered, &["create", "post", "tweet", "write"]) {
                    steps.push(
                        ExecutionStep::new(1, "Generate social media content")
                            .with_script_opt(script_for(skill, "create_post"))
                            .with_param("content_request", request)
                            .with_param("user_id", user_id),
                    );
                }
                if mentions_any(&lowered, &["schedule", "later", "tomorrow"]) {
                    let deps = if steps.is_empty() { vec![] } else { vec![1] };
                    steps.push(
                        ExecutionStep::new(steps.len() as u32 + 1, "Schedule the post")
                            .with_script_opt(script_for(skill, "schedule_post"))
                            .with_param("user_id", user_id)
                            .depends_on(deps),
                    );
                }
            }
            Skill::Analytics => {
                steps.push(
                    ExecutionStep::new(1, "Fetch metrics data")
                        .with_script_opt(script_for(skill, "fetch_metrics"))
                        .with_param("query", request)
                        .with_param("user_id", user_id),
                );
                if lowered.contains("report") {
                    steps.push(
                        ExecutionStep::new(2, "Generate report")
                            .with_script_opt(script_for(skill, "generate_report"))
                            .with_param("user_id", user_id)
                            .depends_on([1]),
                    );
                }
            }
            // Workflow has no log_activity script, so this step is a passthrough there.
            Skill::Workflow | Skill::Core => {
                steps.push(
                    ExecutionStep::new(1, "Process request")
                        .with_script_opt(script_for(skill, "log_activity"))
                        .with_param("action", "task_processed")
                        .with_param("content", request)
                        .with_param("user_id", user_id),
                );
            }
        }

        ExecutionPlan::new(user_id, request)
            .with_skill(skill.as_str())
            .with_steps(steps)
    }

    pub fn process(&self, message: AgentMessage) -> Result<AgentMessage, ExecutorError> {
        let skill = message
            .context_str("detected_skill")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Skill::Core);
        let user_id = message.context_str("user_id").unwrap_or("unknown").to_string();

        tracing::info!(
            target: "conductor.agents",
            agent = "planner",
            skill = %skill,
            request = %preview(&message.content, 100),
            "creating plan"
        );

        let plan = self.build(skill, &message.content, &user_id);
        tracing::info!(
            target: "conductor.agents",
            agent = "planner",
            task_id = %plan.task_id,
            steps = plan.steps.len(),
            "plan created"
        );

        let content = format!("Execute plan with {} steps", plan.steps.len());
        let mut context: Map<String, Value> = message.context;
        context.insert("plan".into(), serde_json::to_value(&plan)?);

        Ok(AgentMessage::new(AgentKind::Planner, AgentKind::Executor, content).with_context(context))
    }
}

impl ExecutionStep {
    fn with_script_opt(mut self, script_path: Option<&str>) -> Self {
        self.script_path = script_path.map(str::to_string);
        self
    }
}
