//! `SlackPreviewPoster` — the `monday_meetingsync::PreviewPoster`
//! implementation that lets `MeetingSyncService` stay ignorant of Slack
//! (§4.7 meeting-sync, §4.10).

use std::sync::Arc;

use async_trait::async_trait;
use monday_core::types::MeetingAnalysis;
use monday_meetingsync::{MeetingSyncError, PreviewPoster};
use serde_json::json;

use crate::client::SlackClient;
use crate::types::MeetingPreviewPayload;

/// Previews generated off the background timer have no originating
/// Slack thread — they're posted to the configured notification channel
/// (§4 `SlackConfig::notification_channel_id`).
pub struct SlackPreviewPoster {
    client: Arc<SlackClient>,
    notification_channel_id: String,
}

impl SlackPreviewPoster {
    pub fn new(client: Arc<SlackClient>, notification_channel_id: String) -> Self {
        Self {
            client,
            notification_channel_id,
        }
    }
}

#[async_trait]
impl PreviewPoster for SlackPreviewPoster {
    async fn post_meeting_preview(
        &self,
        subject_id: &str,
        event_id: &str,
        title: &str,
        analysis: &MeetingAnalysis,
    ) -> monday_meetingsync::Result<()> {
        let rendered = monday_render::meeting_notes_preview_blocks(title, analysis);
        let payload = MeetingPreviewPayload {
            subject_id: subject_id.to_string(),
            event_id: event_id.to_string(),
            title: title.to_string(),
            channel: self.notification_channel_id.clone(),
            analysis: analysis.clone(),
        };
        let metadata = json!({
            "event_type": "meeting_preview",
            "event_payload": payload,
        });

        self.client
            .post_message(&self.notification_channel_id, &rendered.text, Some(&rendered.blocks), None, Some(metadata))
            .await
            .map_err(|e| MeetingSyncError::Poster(e.to_string()))?;

        Ok(())
    }
}
