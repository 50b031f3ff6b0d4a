//! Thin wrapper over the subset of the Slack Web API this gateway calls.
//! Mirrors `monday-a2a`'s client shape: a single `reqwest::Client`, one
//! `post` helper that all public methods funnel through, typed errors
//! surfaced rather than swallowed (unlike A2A, Slack call failures are not
//! a "never throws" contract — callers decide how to degrade).

use serde_json::{json, Value};
use tracing::warn;

use crate::error::{Result, SlackError};

const API_BASE: &str = "https://slack.com/api";

pub struct SlackClient {
    http: reqwest::Client,
    bot_token: String,
}

#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub ts: String,
    pub channel: String,
}

impl SlackClient {
    pub fn new(bot_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
        }
    }

    /// `auth.test` — resolves the bot's own user id, cached once by the
    /// caller for loop-suppression (§4.6).
    pub async fn auth_test(&self) -> Result<String> {
        let body = self.post("auth.test", &json!({})).await?;
        body.get("user_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| SlackError::Api("auth.test missing user_id".into()))
    }

    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: Option<&Value>,
        thread_ts: Option<&str>,
        metadata: Option<Value>,
    ) -> Result<PostedMessage> {
        let mut payload = json!({ "channel": channel, "text": text });
        if let Some(blocks) = blocks {
            payload["blocks"] = blocks.clone();
        }
        if let Some(thread_ts) = thread_ts {
            payload["thread_ts"] = json!(thread_ts);
        }
        if let Some(metadata) = metadata {
            payload["metadata"] = metadata;
        }
        let body = self.post("chat.postMessage", &payload).await?;
        Ok(PostedMessage {
            ts: body.get("ts").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            channel: body
                .get("channel")
                .and_then(|v| v.as_str())
                .unwrap_or(channel)
                .to_string(),
        })
    }

    pub async fn post_ephemeral(&self, channel: &str, user: &str, text: &str, thread_ts: Option<&str>) -> Result<()> {
        let mut payload = json!({ "channel": channel, "user": user, "text": text });
        if let Some(thread_ts) = thread_ts {
            payload["thread_ts"] = json!(thread_ts);
        }
        self.post("chat.postEphemeral", &payload).await?;
        Ok(())
    }

    pub async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
        blocks: Option<&Value>,
        metadata: Option<Value>,
    ) -> Result<()> {
        let mut payload = json!({ "channel": channel, "ts": ts, "text": text });
        if let Some(blocks) = blocks {
            payload["blocks"] = blocks.clone();
        }
        if let Some(metadata) = metadata {
            payload["metadata"] = metadata;
        }
        self.post("chat.update", &payload).await?;
        Ok(())
    }

    pub async fn open_view(&self, trigger_id: &str, view: Value) -> Result<()> {
        self.post("views.open", &json!({ "trigger_id": trigger_id, "view": view }))
            .await?;
        Ok(())
    }

    /// `users.list` — paginated, but the directory cache only needs one
    /// page's worth in practice; callers page themselves via `cursor` if
    /// ever needed. Returns `(id, display_name)` pairs.
    pub async fn users_list(&self) -> Result<Vec<(String, String)>> {
        let body = self.post("users.list", &json!({"limit": 200})).await?;
        let members = body
            .get("members")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(members
            .into_iter()
            .filter_map(|m| {
                let id = m.get("id")?.as_str()?.to_string();
                let profile = m.get("profile");
                let name = profile
                    .and_then(|p| p.get("display_name"))
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .or_else(|| m.get("real_name").and_then(|v| v.as_str()))
                    .or_else(|| m.get("name").and_then(|v| v.as_str()))
                    .unwrap_or(&id)
                    .to_string();
                Some((id, name))
            })
            .collect())
    }

    /// Up to `limit` most recent messages in `channel`, newest first.
    pub async fn conversations_history(&self, channel: &str, limit: u32) -> Result<Vec<Value>> {
        let body = self
            .post(
                "conversations.history",
                &json!({ "channel": channel, "limit": limit }),
            )
            .await?;
        Ok(body
            .get("messages")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    async fn post(&self, method: &str, payload: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(format!("{API_BASE}/{method}"))
            .bearer_auth(&self.bot_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| SlackError::Transport(e.to_string()))?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SlackError::Transport(e.to_string()))?;

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| SlackError::Transport(format!("invalid JSON from Slack: {e}")))?;

        let ok = body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
        if !ok {
            let err = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown_error")
                .to_string();
            warn!(method, error = %err, "Slack API call failed");
            return Err(SlackError::Api(err));
        }

        Ok(body)
    }
}

/// `true` when a Slack API error string is the `missing_scope` sentinel
/// (§4.6 step 1's fallback trigger).
pub fn is_missing_scope(err: &SlackError) -> bool {
    matches!(err, SlackError::Api(code) if code == "missing_scope")
}
