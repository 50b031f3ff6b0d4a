//! `create-task` intent handler (§4.7, §4.8).

use monday_core::types::ExtractedTask;
use monday_llm::{strip_code_fences, ChatRequest, Message};
use monday_render::task_preview_blocks;
use serde_json::json;
use tracing::warn;

use crate::boards::fetch_boards;
use crate::context::SlackContext;
use crate::events::MessageEvent;
use crate::types::TaskPreviewPayload;

const HISTORY_LIMIT: u32 = 20;

const TASK_EXTRACTOR_SYSTEM_PROMPT: &str = "You extract a single actionable task from a Slack \
conversation transcript. Respond with a single JSON object of the shape \
{\"name\": string, \"description\": string, \"assignee\": string, \
\"priority\": \"Low\"|\"Medium\"|\"High\"|\"Critical\", \
\"status\": \"ToDo\"|\"Working\"|\"InProgress\"|\"Done\"}. \
Respond with JSON only, no markdown fences, no commentary.";

pub async fn handle(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str, message_text: &str) {
    let transcript = build_transcript(ctx, &event.channel, message_text).await;

    let (extraction, boards, users) = tokio::join!(
        extract_task(ctx, &transcript),
        load_boards(ctx),
        load_users(ctx),
    );

    let task = match extraction {
        Ok(task) => task,
        Err(e) => {
            warn!(error = %e, "task extraction failed");
            if let Err(e) = ctx
                .client
                .post_message(
                    &event.channel,
                    "I couldn't extract a task from this conversation.",
                    None,
                    Some(thread_ts),
                    None,
                )
                .await
            {
                warn!(error = %e, "failed to post task-extraction failure notice");
            }
            return;
        }
    };

    let rendered = task_preview_blocks(&task);
    let payload = TaskPreviewPayload {
        task,
        channel: event.channel.clone(),
        thread_ts: Some(thread_ts.to_string()),
        user_id: event.user.clone().unwrap_or_default(),
        boards,
        users,
    };
    let metadata = json!({
        "event_type": "task_preview",
        "event_payload": payload,
    });

    if let Err(e) = ctx
        .client
        .post_message(&event.channel, &rendered.text, Some(&rendered.blocks), Some(thread_ts), Some(metadata))
        .await
    {
        warn!(error = %e, "failed to post task preview");
    }
}

async fn build_transcript(ctx: &SlackContext, channel: &str, triggering_text: &str) -> String {
    let history = ctx
        .client
        .conversations_history(channel, HISTORY_LIMIT)
        .await
        .unwrap_or_default();

    let mut lines: Vec<String> = Vec::new();
    for message in history.iter().rev().filter(|m| m.get("bot_id").is_none()) {
        let author = message.get("user").and_then(|v| v.as_str()).unwrap_or("unknown");
        let name = ctx.directory.resolve(&ctx.client, author).await;
        if let Some(text) = message.get("text").and_then(|v| v.as_str()) {
            lines.push(format!("{name}: {text}"));
        }
    }

    if !looks_imperative(triggering_text) {
        lines.push(format!("requester: {triggering_text}"));
    }

    lines.join("\n")
}

fn looks_imperative(text: &str) -> bool {
    text.trim().to_ascii_lowercase().starts_with("create")
}

async fn extract_task(ctx: &SlackContext, transcript: &str) -> Result<ExtractedTask, String> {
    let response = ctx
        .llm
        .chat(ChatRequest {
            system: Some(TASK_EXTRACTOR_SYSTEM_PROMPT.to_string()),
            messages: vec![Message::user(transcript)],
            tools: vec![],
            max_tokens: 1024,
        })
        .await
        .map_err(|e| e.to_string())?;

    serde_json::from_str(strip_code_fences(&response.text)).map_err(|e| e.to_string())
}

async fn load_boards(ctx: &SlackContext) -> Vec<crate::types::BoardSummary> {
    if let Some(boards) = ctx.board_cache.get() {
        return boards;
    }
    let boards = fetch_boards(&ctx.a2a, &ctx.agents().product_owner_url).await;
    ctx.board_cache.set(boards.clone());
    boards
}

async fn load_users(ctx: &SlackContext) -> Vec<(String, String)> {
    if let Some(users) = ctx.user_list_cache.get() {
        return users;
    }
    let users = ctx.client.users_list().await.unwrap_or_default();
    ctx.user_list_cache.set(users.clone());
    users
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imperative_trigger_is_detected() {
        assert!(looks_imperative("create a task for the login bug"));
        assert!(looks_imperative("  Create a ticket"));
    }

    #[test]
    fn conversational_trigger_is_not_imperative() {
        assert!(!looks_imperative("can someone fix the login bug?"));
    }
}
