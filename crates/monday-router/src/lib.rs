//! Intent Router (C3): a two-tier (really three-tier) keyword-then-LLM
//! classifier returning `(Intent, AgentKey)`.

use std::str::FromStr;

use monday_core::types::{AgentKey, Intent};
use monday_llm::{strip_code_fences, ChatRequest, LlmClient, Message};
use tracing::{debug, warn};

/// Tier-1 deterministic keyword pre-filter. Ordered; first match wins.
/// Exact phrase table from §4.3.
const TIER1_RULES: &[(&[&str], Intent, AgentKey)] = &[
    (
        &[
            "create a task",
            "create task",
            "make a task",
            "add a task",
            "new task",
        ],
        Intent::CreateTask,
        AgentKey::ProductOwner,
    ),
    (
        &["board status", "sprint status", "standup", "stand-up"],
        Intent::BoardStatus,
        AgentKey::ScrumMaster,
    ),
    (
        &["sync meeting", "meeting sync", "sync meetings"],
        Intent::MeetingSync,
        AgentKey::ProductOwner,
    ),
    (
        &[
            "calendar",
            "schedule",
            "what's on my",
            "my agenda",
            "my meetings today",
            "book a meeting",
        ],
        Intent::Calendar,
        AgentKey::ProductOwner,
    ),
    (
        &[
            "find the file",
            "search drive",
            "google drive",
            "my drive",
            "find the doc",
            "find document",
        ],
        Intent::Drive,
        AgentKey::ProductOwner,
    ),
];

/// Tier-3 broader fallback keywords — also invoked whenever Tier-2 fails
/// (network error, invalid JSON, intent outside the closed set).
const TIER3_RULES: &[(&[&str], Intent, AgentKey)] = &[(
    &["status", "blocked", "summary"],
    Intent::BoardStatus,
    AgentKey::ScrumMaster,
)];

const DEFAULT_CLASSIFICATION: (Intent, AgentKey) = (Intent::AgentChat, AgentKey::ProductOwner);

fn tier1(text: &str) -> Option<(Intent, AgentKey)> {
    let lower = text.to_lowercase();
    for (phrases, intent, agent) in TIER1_RULES {
        if phrases.iter().any(|p| lower.contains(p)) {
            return Some((*intent, *agent));
        }
    }
    None
}

fn tier3(text: &str) -> (Intent, AgentKey) {
    let lower = text.to_lowercase();
    for (phrases, intent, agent) in TIER3_RULES {
        if phrases.iter().any(|p| lower.contains(p)) {
            return (*intent, *agent);
        }
    }
    DEFAULT_CLASSIFICATION
}

const TIER2_SYSTEM_PROMPT: &str = "You are an intent classifier for a workspace chat assistant. \
Given a user message, respond with a single JSON object of the shape \
{\"intent\": <intent>, \"agentKey\": <agentKey>} and nothing else. \
\n\nValid intent values: create-task, board-status, meeting-sync, calendar, drive, agent-chat. \
\nValid agentKey values: product-owner, developer, reviewer, scrum-master. \
\nRespond with JSON only, no markdown fences, no commentary.";

#[derive(serde::Deserialize)]
struct Tier2Reply {
    intent: String,
    #[serde(rename = "agentKey")]
    agent_key: String,
}

/// `classify(text) → {intent, agentKey}` (§4.3). Stateless and pure modulo
/// the LLM call; always returns a value from the closed set (property 10).
pub async fn classify(text: &str, llm: &LlmClient) -> (Intent, AgentKey) {
    if let Some(hit) = tier1(text) {
        debug!(intent = %hit.0, agent = %hit.1, tier = 1, "classified via keyword pre-filter");
        return hit;
    }

    match tier2(text, llm).await {
        Some(hit) => {
            debug!(intent = %hit.0, agent = %hit.1, tier = 2, "classified via LLM");
            hit
        }
        None => {
            let hit = tier3(text);
            debug!(intent = %hit.0, agent = %hit.1, tier = 3, "classified via fallback keywords");
            hit
        }
    }
}

async fn tier2(text: &str, llm: &LlmClient) -> Option<(Intent, AgentKey)> {
    let request = ChatRequest {
        system: Some(TIER2_SYSTEM_PROMPT.to_string()),
        messages: vec![Message::user(text)],
        tools: vec![],
        max_tokens: 128,
    };

    let response = match llm.chat(request).await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "tier-2 LLM classify call failed");
            return None;
        }
    };

    let cleaned = strip_code_fences(&response.text);
    let reply: Tier2Reply = match serde_json::from_str(cleaned) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, reply = %cleaned, "tier-2 reply was not parseable JSON");
            return None;
        }
    };

    let intent = Intent::from_str(&reply.intent).ok()?;
    let agent = AgentKey::from_str(&reply.agent_key).ok()?;
    Some((intent, agent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tier1_bypasses_llm_entirely() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/v1/messages").expect(0).create_async().await;

        let llm = LlmClient::new("key".into(), server.url(), "model".into());
        let (intent, agent) = classify("create a task from this conversation", &llm).await;

        assert_eq!(intent, Intent::CreateTask);
        assert_eq!(agent, AgentKey::ProductOwner);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn board_status_keywords_route_to_scrum_master() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/v1/messages").expect(0).create_async().await;
        let llm = LlmClient::new("key".into(), server.url(), "model".into());

        let (intent, agent) = classify("what's our standup looking like", &llm).await;
        assert_eq!(intent, Intent::BoardStatus);
        assert_eq!(agent, AgentKey::ScrumMaster);
    }

    #[tokio::test]
    async fn tier2_failure_falls_back_to_tier3() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(500)
            .create_async()
            .await;
        let llm = LlmClient::new("key".into(), server.url(), "model".into());

        let (intent, agent) = classify("I think we're blocked on something", &llm).await;
        assert_eq!(intent, Intent::BoardStatus);
        assert_eq!(agent, AgentKey::ScrumMaster);
    }

    #[tokio::test]
    async fn garbage_llm_reply_still_closes_over_valid_intent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[{"type":"text","text":"not json at all"}]}"#)
            .create_async()
            .await;
        let llm = LlmClient::new("key".into(), server.url(), "model".into());

        let (intent, _agent) = classify("random chit chat with no keywords", &llm).await;
        assert_eq!(intent, Intent::AgentChat);
    }
}
