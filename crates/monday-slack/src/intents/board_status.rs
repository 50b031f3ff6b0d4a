//! `board-status` intent handler (§4.7) — single-shot, no `contextId`.

use monday_a2a::extract_text;
use monday_render::{error_blocks, no_response_blocks, status_dashboard_blocks, warning_blocks, Rendered};
use tracing::warn;

use crate::context::SlackContext;
use crate::events::MessageEvent;

const PROMPT: &str = "Give me the current board status summary.";

pub async fn handle(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str) {
    let response = ctx
        .a2a
        .send_message(&ctx.config.agents.scrum_master_url, PROMPT, None)
        .await;

    let rendered: Rendered = if let Some(error) = &response.error {
        if error.code == -32000 {
            warning_blocks("Could not reach scrum-master…")
        } else {
            error_blocks(&error.message)
        }
    } else if let Some(task) = &response.result {
        status_dashboard_blocks(&extract_text(task))
    } else {
        no_response_blocks()
    };

    if let Err(e) = ctx
        .client
        .post_message(&event.channel, &rendered.text, Some(&rendered.blocks), Some(thread_ts), None)
        .await
    {
        warn!(error = %e, "failed to post board-status response");
    }
}
