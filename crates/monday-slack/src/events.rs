//! Inbound Slack Events API payload shapes — only the fields the dispatch
//! layer actually reads (§4.6).

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SlackEnvelope {
    #[serde(rename = "url_verification")]
    UrlVerification { challenge: String },
    #[serde(rename = "event_callback")]
    EventCallback {
        event: MessageEvent,
        #[serde(default)]
        team_id: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// Covers both `app_mention` and `message` events — Slack's schema for
/// these two overlaps almost entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub text: String,
    pub channel: String,
    #[serde(default)]
    pub channel_type: Option<String>,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

impl MessageEvent {
    pub fn is_direct_message(&self) -> bool {
        self.thread_ts.is_none() && self.channel_type.as_deref() == Some("im")
    }
}

/// Interactive payload posted to the actions/view-submission endpoint —
/// the `payload=<json>` form field, already parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    #[serde(rename = "type")]
    pub interaction_type: String,
    pub user: InteractionUser,
    #[serde(default)]
    pub actions: Vec<BlockAction>,
    #[serde(default)]
    pub message: Option<InteractionMessage>,
    #[serde(default)]
    pub channel: Option<InteractionChannel>,
    #[serde(default)]
    pub view: Option<ViewSubmission>,
    #[serde(default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub trigger_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionChannel {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockAction {
    pub action_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionMessage {
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageMetadata {
    pub event_type: String,
    pub event_payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewSubmission {
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    pub state: ViewState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewState {
    pub values: Value,
}
