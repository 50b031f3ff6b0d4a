//! Domain types shared by every component: the closed-set `Intent` and
//! `AgentKey` enums, and the inbound agent-notification payload shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of classifiable intents. `classify` never produces a
/// value outside this set — even a garbage LLM reply falls back to
/// `AgentChat` via the Tier-3 keyword fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    CreateTask,
    BoardStatus,
    MeetingSync,
    Calendar,
    Drive,
    AgentChat,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CreateTask => "create-task",
            Intent::BoardStatus => "board-status",
            Intent::MeetingSync => "meeting-sync",
            Intent::Calendar => "calendar",
            Intent::Drive => "drive",
            Intent::AgentChat => "agent-chat",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create-task" | "create_task" => Ok(Intent::CreateTask),
            "board-status" | "board_status" => Ok(Intent::BoardStatus),
            "meeting-sync" | "meeting_sync" => Ok(Intent::MeetingSync),
            "calendar" => Ok(Intent::Calendar),
            "drive" => Ok(Intent::Drive),
            "agent-chat" | "agent_chat" => Ok(Intent::AgentChat),
            other => Err(format!("unknown intent: {other}")),
        }
    }
}

/// The closed set of downstream worker agents, each mapped to a base URL
/// via configuration (default ports 10001–10004, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKey {
    ProductOwner,
    Developer,
    Reviewer,
    ScrumMaster,
}

impl AgentKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKey::ProductOwner => "product-owner",
            AgentKey::Developer => "developer",
            AgentKey::Reviewer => "reviewer",
            AgentKey::ScrumMaster => "scrum-master",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            AgentKey::ProductOwner => 10001,
            AgentKey::Developer => 10002,
            AgentKey::Reviewer => 10003,
            AgentKey::ScrumMaster => 10004,
        }
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgentKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product-owner" | "product_owner" => Ok(AgentKey::ProductOwner),
            "developer" => Ok(AgentKey::Developer),
            "reviewer" => Ok(AgentKey::Reviewer),
            "scrum-master" | "scrum_master" => Ok(AgentKey::ScrumMaster),
            other => Err(format!("unknown agent key: {other}")),
        }
    }
}

/// Payload of `POST /api/agent-notify` — the format downstream agents use
/// to push an unsolicited message into a channel/thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentNotification {
    pub channel: String,
    pub text: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub blocks: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TaskStatus {
    ToDo,
    Working,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "ToDo",
            TaskStatus::Working => "Working",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Produced by the task-extractor LLM call; passed through the preview
/// engine; consumed by the product-owner agent on confirmation (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedTask {
    pub name: String,
    pub description: String,
    pub assignee: String,
    pub priority: Priority,
    pub status: TaskStatus,
}

/// A single action item surfaced by the meeting-notes LLM call (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub deadline: Option<String>,
}

/// Meeting Analysis (§3) -- the structured output of the meeting-notes LLM
/// call, serialized whole into preview message metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingAnalysis {
    pub summary: String,
    #[serde(rename = "action-items", alias = "action_items")]
    pub action_items: Vec<ActionItem>,
    pub decisions: Vec<String>,
    #[serde(default, rename = "suggested-board-id", alias = "suggested_board_id")]
    pub suggested_board_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_round_trips() {
        for intent in [
            Intent::CreateTask,
            Intent::BoardStatus,
            Intent::MeetingSync,
            Intent::Calendar,
            Intent::Drive,
            Intent::AgentChat,
        ] {
            assert_eq!(Intent::from_str(intent.as_str()).unwrap(), intent);
        }
    }

    #[test]
    fn intent_rejects_garbage() {
        assert!(Intent::from_str("teleport-to-mars").is_err());
    }

    #[test]
    fn agent_key_default_ports_match_spec() {
        assert_eq!(AgentKey::ProductOwner.default_port(), 10001);
        assert_eq!(AgentKey::Developer.default_port(), 10002);
        assert_eq!(AgentKey::Reviewer.default_port(), 10003);
        assert_eq!(AgentKey::ScrumMaster.default_port(), 10004);
    }
}
