//! `meeting-sync` intent handler (§4.7) — reactive trigger for the same
//! `MeetingSyncService.checkRecentMeetings` the orchestrator (C10) drives
//! on a timer.

use monday_render::connect_link_blocks;
use tracing::warn;

use crate::context::SlackContext;
use crate::events::MessageEvent;

pub async fn handle(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str) {
    let Some(subject_id) = event.user.clone() else {
        return;
    };

    let Some(oauth) = &ctx.oauth else {
        post_not_configured(ctx, event, thread_ts).await;
        return;
    };

    if !oauth.is_connected(&subject_id) {
        let rendered = connect_link_blocks(&oauth.connect_url(&subject_id));
        if let Err(e) = ctx
            .client
            .post_message(&event.channel, &rendered.text, Some(&rendered.blocks), Some(thread_ts), None)
            .await
        {
            warn!(error = %e, "failed to post connect-link prompt");
        }
        return;
    }

    match ctx.meeting_sync.check_recent_meetings(&subject_id).await {
        Ok(counts) => {
            let text = format!(
                "Checked recent meetings: {} found, {} transcripts, {} previews posted, {} skipped, {} errors.",
                counts.found, counts.transcripts_found, counts.previews_posted, counts.skipped, counts.errors
            );
            if let Err(e) = ctx
                .client
                .post_message(&event.channel, &text, None, Some(thread_ts), None)
                .await
            {
                warn!(error = %e, "failed to post meeting-sync summary");
            }
        }
        Err(e) => {
            warn!(error = %e, "meeting-sync check failed");
            let _ = ctx
                .client
                .post_message(
                    &event.channel,
                    "Checking recent meetings failed. Please try again shortly.",
                    None,
                    Some(thread_ts),
                    None,
                )
                .await;
        }
    }
}

async fn post_not_configured(ctx: &SlackContext, event: &MessageEvent, thread_ts: &str) {
    let _ = ctx
        .client
        .post_message(
            &event.channel,
            "Google integration isn't configured for this workspace.",
            None,
            Some(thread_ts),
            None,
        )
        .await;
}
