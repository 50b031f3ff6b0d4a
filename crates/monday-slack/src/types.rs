//! Wiring-layer types that don't belong in `monday-core` because nothing
//! downstream of Slack needs them.

use serde::{Deserialize, Serialize};

/// A board summary as surfaced to the task-preview/edit modal's board
/// selector. There is no dedicated board-listing component in this
/// system (§GLOSSARY has no "Board API"); the product-owner agent is the
/// system of record for boards, so the list is obtained by asking it a
/// one-shot natural-language question and parsing a JSON array out of the
/// reply. A failure to parse yields an empty list rather than an error —
/// the preview still renders, just without a populated selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSummary {
    pub id: String,
    pub name: String,
}

/// `event_payload` for a `task_preview` message's metadata (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPreviewPayload {
    pub task: monday_core::types::ExtractedTask,
    pub channel: String,
    pub thread_ts: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub boards: Vec<BoardSummary>,
    #[serde(default)]
    pub users: Vec<(String, String)>,
}

/// `event_payload` for a `meeting_preview` message's metadata (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingPreviewPayload {
    pub subject_id: String,
    pub event_id: String,
    pub title: String,
    pub channel: String,
    pub analysis: monday_core::types::MeetingAnalysis,
}
