//! `agent-chat` intent handler (§4.7).

use monday_a2a::extract_text;
use monday_render::{agent_response_blocks, error_blocks, no_response_blocks, warning_blocks, Rendered};
use monday_sessions::types::ThreadSession;
use tracing::warn;

use crate::context::SlackContext;
use crate::events::MessageEvent;
use crate::intents::HISTORY_FETCH_LIMIT;

const MAX_CONTEXT_MESSAGES: usize = 15;

pub async fn handle(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str, message_text: &str, session: &ThreadSession) {
    let prompt = compose_prompt(ctx, &event.channel, message_text).await;
    let agent_url = ctx.agents().url_for(session.agent_key);

    let response = ctx
        .a2a
        .send_message(agent_url, &prompt, Some(&session.context_id))
        .await;

    let rendered: Rendered = if let Some(error) = &response.error {
        if error.code == -32000 {
            warning_blocks(&format!("Could not reach {}…", session.agent_key))
        } else {
            error_blocks(&error.message)
        }
    } else if let Some(task) = &response.result {
        agent_response_blocks(&extract_text(task))
    } else {
        no_response_blocks()
    };

    if let Err(e) = ctx
        .client
        .post_message(&event.channel, &rendered.text, Some(&rendered.blocks), Some(thread_ts), None)
        .await
    {
        warn!(error = %e, "failed to post agent-chat response");
    }
}

async fn compose_prompt(ctx: &SlackContext, channel: &str, message_text: &str) -> String {
    let history = ctx
        .client
        .conversations_history(channel, HISTORY_FETCH_LIMIT)
        .await
        .unwrap_or_default();

    let recent: Vec<String> = history
        .iter()
        .rev()
        .filter(|m| m.get("bot_id").is_none() && m.get("subtype").is_none())
        .filter_map(|m| m.get("text").and_then(|t| t.as_str()))
        .map(|t| format!("- {t}"))
        .rev()
        .take(MAX_CONTEXT_MESSAGES)
        .collect();

    if recent.is_empty() {
        format!("User request: {message_text}")
    } else {
        format!(
            "Recent Slack channel messages for context:\n{}\n\nUser request: {message_text}",
            recent.join("\n")
        )
    }
}
