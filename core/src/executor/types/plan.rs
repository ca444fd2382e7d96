use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::agents::AgentKind;
use crate::error::ExecutorError;

use super::status::TaskStatus;

/// One unit of work within a plan, optionally bound to a remote script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub step_number: u32,
    pub description: String,
    #[serde(default)]
    pub agent: AgentKind,
    /// Remote script to run. `None` makes the step a passthrough.
    #[serde(default)]
    pub script_path: Option<String>,
    #[serde(default)]
    pub input_params: Map<String, Value>,
    #[serde(default)]
    pub depends_on: Vec<u32>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionStep {
    pub fn new(step_number: u32, description: impl Into<String>) -> Self {
        Self {
            step_number,
            description: description.into(),
            agent: AgentKind::Executor,
            script_path: None,
            input_params: Map::new(),
            depends_on: Vec::new(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn with_script(mut self, script_path: impl Into<String>) -> Self {
        self.script_path = Some(script_path.into());
        self
    }

    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.input_params = params;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input_params.insert(key.into(), value.into());
        self
    }

    pub fn depends_on(mut self, deps: impl IntoIterator<Item = u32>) -> Self {
        self.depends_on = deps.into_iter().collect();
        self
    }

    pub fn is_passthrough(&self) -> bool {
        self.script_path.is_none()
    }

    pub(crate) fn mark_executing(&mut self) -> Result<(), ExecutorError> {
        self.advance(TaskStatus::Executing)
    }

    pub(crate) fn mark_completed(&mut self, result: Value) -> Result<(), ExecutorError> {
        self.advance(TaskStatus::Completed)?;
        self.result = Some(result);
        Ok(())
    }

    pub(crate) fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), ExecutorError> {
        self.advance(TaskStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    fn advance(&mut self, next: TaskStatus) -> Result<(), ExecutorError> {
        if !self.status.can_advance_to(next) {
            return Err(ExecutorError::InvalidTransition {
                step: self.step_number,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// An ordered sequence of steps representing one task's execution.
///
/// Step order is execution order. Dependencies are validated when a step is
/// reached, never used to reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub task_id: String,
    pub user_id: String,
    pub original_request: String,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub steps: Vec<ExecutionStep>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl ExecutionPlan {
    pub fn new(user_id: impl Into<String>, original_request: impl Into<String>) -> Self {
        Self {
            task_id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            original_request: original_request.into(),
            skill: None,
            steps: Vec::new(),
            created_at: Utc::now(),
            status: TaskStatus::Pending,
        }
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    pub fn with_steps(mut self, steps: Vec<ExecutionStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Check step numbering. Dependency ordering is left to the scheduler.
    pub fn validate(&self) -> Result<(), ExecutorError> {
        let mut seen = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if step.step_number == 0 {
                return Err(ExecutorError::ZeroStepNumber);
            }
            if !seen.insert(step.step_number) {
                return Err(ExecutorError::DuplicateStep(step.step_number));
            }
        }
        Ok(())
    }
}
