use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Coordinator,
    Planner,
    #[default]
    Executor,
}

impl AgentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Planner => "planner",
            Self::Executor => "executor",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message passed between agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub from_agent: AgentKind,
    pub to_agent: AgentKind,
    pub content: String,
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(from_agent: AgentKind, to_agent: AgentKind, content: impl Into<String>) -> Self {
        Self {
            from_agent,
            to_agent,
            content: content.into(),
            context: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

/// Incoming task request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub user_id: String,
    pub session_id: String,
    pub content: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Explicit skill; detected from `content` when absent.
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Preview of at most `limit` characters, for logs.
pub(crate) fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
