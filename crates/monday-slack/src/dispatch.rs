//! Mention / DM / threaded-reply dispatch (C6, §4.6).

use monday_core::types::Intent;
use monday_sessions::types::ThreadSession;
use tracing::{info, warn};

use crate::client::PostedMessage;
use crate::context::SlackContext;
use crate::events::MessageEvent;
use crate::intents;
use crate::mentions;

/// Entry point for every inbound `app_mention`/`message` event.
pub async fn handle_event(ctx: &SlackContext, event: MessageEvent) {
    if is_loop(&event, &ctx.bot_user_id) {
        return;
    }

    match event.event_type.as_str() {
        "app_mention" => handle_mention_or_dm(ctx, event).await,
        "message" if event.is_direct_message() => handle_mention_or_dm(ctx, event).await,
        "message" if event.thread_ts.is_some() => handle_threaded_reply(ctx, event).await,
        _ => {}
    }
}

/// Loop-suppression rules (§4.6): any one match drops the event silently.
fn is_loop(event: &MessageEvent, bot_user_id: &str) -> bool {
    if event.bot_id.is_some() {
        return true;
    }
    if event.user.as_deref() == Some(bot_user_id) {
        return true;
    }
    if event.subtype.is_some() {
        return true;
    }
    false
}

/// Shared flow for a fresh mention or DM — both start a new (or reused)
/// thread root and go through classification (§4.6 steps 1-7).
async fn handle_mention_or_dm(ctx: &SlackContext, event: MessageEvent) {
    let text = mentions::normalize(&event.text, &ctx.bot_user_id, &ctx.client, &ctx.directory).await;
    let thread_ts = event.thread_ts.clone().unwrap_or_else(|| event.ts.clone());

    if text.is_empty() {
        if let Err(e) = ctx
            .client
            .post_message(&event.channel, "Hey! How can I help?", None, Some(&thread_ts), None)
            .await
        {
            warn!(error = %e, "failed to post empty-text greeting");
        }
        return;
    }

    let loading: Option<PostedMessage> = match ctx
        .client
        .post_ephemeral(&event.channel, event.user.as_deref().unwrap_or(""), "Working on it…", Some(&thread_ts))
        .await
    {
        Ok(()) => None,
        Err(e) => {
            warn!(error = %e, "failed to post ephemeral loading block");
            None
        }
    };
    let _ = loading;

    let (intent, agent_key) = monday_router::classify(&text, &ctx.llm).await;

    let thread_key = format!("{}:{}", event.channel, thread_ts);
    let session = ctx.sessions.get_or_create_context(&thread_key, agent_key, intent);

    info!(thread_key, %intent, %agent_key, "dispatching classified event");
    dispatch_intent(ctx, &event, &thread_ts, &text, &session).await;
}

/// Continuation of a tracked thread (§4.6 threaded-reply event).
async fn handle_threaded_reply(ctx: &SlackContext, event: MessageEvent) {
    let Some(thread_ts) = event.thread_ts.clone() else {
        return;
    };
    if event.text.trim().is_empty() {
        return;
    }

    let thread_key = format!("{}:{}", event.channel, thread_ts);
    let Some(session) = ctx.sessions.get(&thread_key) else {
        return;
    };

    let is_dm = event.channel_type.as_deref() == Some("im");
    let continues = is_dm || session.intent == Some(Intent::AgentChat);
    if !continues {
        return;
    }

    let text = mentions::normalize(&event.text, &ctx.bot_user_id, &ctx.client, &ctx.directory).await;
    intents::agent_chat::handle(ctx, &event, &thread_ts, &text, &session).await;
}

async fn dispatch_intent(
    ctx: &SlackContext,
    event: &MessageEvent,
    thread_ts: &str,
    text: &str,
    session: &ThreadSession,
) {
    match session.intent.unwrap_or(Intent::AgentChat) {
        Intent::AgentChat => intents::agent_chat::handle(ctx, event, thread_ts, text, session).await,
        Intent::BoardStatus => intents::board_status::handle(ctx, event, thread_ts).await,
        Intent::CreateTask => intents::create_task::handle(ctx, event, thread_ts, text).await,
        Intent::MeetingSync => intents::meeting_sync::handle(ctx, event, thread_ts).await,
        Intent::Calendar => intents::tool_loop::handle_calendar(ctx, event, thread_ts, text).await,
        Intent::Drive => intents::tool_loop::handle_drive(ctx, event, thread_ts, text).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_event() -> MessageEvent {
        MessageEvent {
            event_type: "message".to_string(),
            user: Some("U123".to_string()),
            bot_id: None,
            text: "hello".to_string(),
            channel: "C1".to_string(),
            channel_type: None,
            ts: "1700000000.000001".to_string(),
            thread_ts: None,
            subtype: None,
        }
    }

    #[test]
    fn bot_id_present_is_a_loop() {
        let mut event = base_event();
        event.bot_id = Some("B1".to_string());
        assert!(is_loop(&event, "U_BOT"));
    }

    #[test]
    fn own_user_id_is_a_loop() {
        let mut event = base_event();
        event.user = Some("U_BOT".to_string());
        assert!(is_loop(&event, "U_BOT"));
    }

    #[test]
    fn subtype_present_is_a_loop() {
        let mut event = base_event();
        event.subtype = Some("message_changed".to_string());
        assert!(is_loop(&event, "U_BOT"));
    }

    #[test]
    fn ordinary_message_is_not_a_loop() {
        let event = base_event();
        assert!(!is_loop(&event, "U_BOT"));
    }
}
