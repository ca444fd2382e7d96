use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    SocialMedia,
    Analytics,
    Workflow,
    Core,
}

impl Skill {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SocialMedia => "social_media",
            Self::Analytics => "analytics",
            Self::Workflow => "workflow",
            Self::Core => "core",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "social_media" => Ok(Self::SocialMedia),
            "analytics" => Ok(Self::Analytics),
            "workflow" => Ok(Self::Workflow),
            "core" => Ok(Self::Core),
            other => Err(format!("unknown skill: {}", other)),
        }
    }
}

/// Keyword table in priority order: the first skill with a matching keyword wins.
pub const SKILL_KEYWORDS: &[(Skill, &[&str])] = &[
    (
        Skill::SocialMedia,
        &["post", "tweet", "linkedin", "instagram", "facebook", "social"],
    ),
    (
        Skill::Analytics,
        &["analyze", "metrics", "report", "dashboard", "statistics", "data"],
    ),
    (
        Skill::Workflow,
        &["automate", "schedule", "workflow", "flow", "pipeline"],
    ),
    (Skill::Core, &["help", "general", "question", "explain"]),
];

/// Substring match against the keyword table. Total: falls back to `Core`.
pub fn classify(text: &str) -> Skill {
    let lowered = text.to_lowercase();
    SKILL_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(skill, _)| *skill)
        .unwrap_or(Skill::Core)
}

/// Resolve an explicit skill tag. Unknown tags are treated as `Core`.
pub fn resolve(explicit: Option<&str>, text: &str) -> Skill {
    match explicit {
        Some(tag) => tag.parse().unwrap_or_else(|e: String| {
            tracing::debug!(target: "conductor.agents", error = %e, "falling back to core skill");
            Skill::Core
        }),
        None => classify(text),
    }
}
