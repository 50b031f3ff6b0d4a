use std::sync::Arc;

use chrono::{Duration, Utc};
use monday_core::types::MeetingAnalysis;
use monday_llm::{strip_code_fences, ChatRequest, LlmClient, Message};
use monday_oauth::OAuthBroker;
use monday_stores::{MeetingRecord, MeetingStatus, MeetingStore};
use tracing::{instrument, warn};

use crate::error::{MeetingSyncError, Result};
use crate::types::{PreviewPoster, SyncCounts};

const MEETING_NOTES_SYSTEM_PROMPT: &str = "You analyze meeting transcripts. Given the raw \
transcript text, respond with a single JSON object of the shape \
{\"summary\": string, \"action-items\": [{\"title\": string, \"description\": string, \
\"assignee\": string|null, \"priority\": \"Low\"|\"Medium\"|\"High\"|\"Critical\"|null, \
\"deadline\": string|null}], \"decisions\": [string], \"suggested-board-id\": string|null}. \
Respond with JSON only, no markdown fences, no commentary.";

/// `MeetingSyncService.checkRecentMeetings` (§4.7, §4.10) — shared between
/// the reactive meeting-sync intent handler and the timer-driven
/// orchestrator.
pub struct MeetingSyncService {
    oauth: Option<Arc<OAuthBroker>>,
    meetings: Arc<MeetingStore>,
    llm: Arc<LlmClient>,
    poster: Arc<dyn PreviewPoster>,
}

impl MeetingSyncService {
    /// `oauth` is `None` when the deployment never wired up Google OAuth
    /// (§4 `OAuthConfig`) — every method then reports `NotConfigured`
    /// instead of the orchestrator/handlers needing their own guard.
    pub fn new(
        oauth: Option<Arc<OAuthBroker>>,
        meetings: Arc<MeetingStore>,
        llm: Arc<LlmClient>,
        poster: Arc<dyn PreviewPoster>,
    ) -> Self {
        Self {
            oauth,
            meetings,
            llm,
            poster,
        }
    }

    #[instrument(skip(self))]
    pub async fn check_recent_meetings(&self, subject_id: &str) -> Result<SyncCounts> {
        let oauth = self.oauth.as_ref().ok_or(MeetingSyncError::NotConfigured)?;
        let client = oauth.get_client(subject_id).await?;

        let now = Utc::now();
        let window_start = now - Duration::minutes(20);
        let events = client
            .list_events(&window_start.to_rfc3339(), &now.to_rfc3339())
            .await?;

        let mut counts = SyncCounts::default();
        let with_conference: Vec<_> = events
            .into_iter()
            .filter(|e| e.conference_data.is_some())
            .collect();
        counts.found = with_conference.len() as u32;

        for event in with_conference {
            if self.meetings.is_processed(&event.id)? {
                counts.skipped += 1;
                continue;
            }

            let title = event.summary.clone().unwrap_or_else(|| event.id.clone());

            let files = match client.find_files_by_name_prefix(&title).await {
                Ok(files) => files,
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "transcript search failed");
                    counts.errors += 1;
                    continue;
                }
            };

            let Some(file) = files.first() else {
                warn!(event_id = %event.id, "no transcript found for meeting");
                counts.errors += 1;
                continue;
            };
            counts.transcripts_found += 1;

            let text = match client.export_doc_text(&file.id).await {
                Ok(t) => t,
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "transcript export failed");
                    counts.errors += 1;
                    continue;
                }
            };

            let analysis = match self.analyze(&text).await {
                Ok(a) => a,
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "meeting-notes analysis failed");
                    counts.errors += 1;
                    continue;
                }
            };

            if analysis.action_items.is_empty() {
                self.meetings.insert(&MeetingRecord {
                    event_id: event.id.clone(),
                    title,
                    processed_at: now.to_rfc3339(),
                    status: MeetingStatus::Dismissed,
                    task_ids: None,
                })?;
                continue;
            }

            self.meetings.insert(&MeetingRecord {
                event_id: event.id.clone(),
                title: title.clone(),
                processed_at: now.to_rfc3339(),
                status: MeetingStatus::Pending,
                task_ids: None,
            })?;

            match self
                .poster
                .post_meeting_preview(subject_id, &event.id, &title, &analysis)
                .await
            {
                Ok(()) => counts.previews_posted += 1,
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "posting meeting preview failed");
                    counts.errors += 1;
                }
            }
        }

        Ok(counts)
    }

    /// Whether a specific event already has a meeting-store record,
    /// regardless of status — the orchestrator's per-timer cancellation
    /// signal, since `check_recent_meetings` handles a whole scan window
    /// at once and its aggregate counts don't identify which event they
    /// belong to.
    pub fn is_event_processed(&self, event_id: &str) -> Result<bool> {
        Ok(self.meetings.is_processed(event_id)?)
    }

    /// Pre-authenticated Google client for `subject_id`, used by the
    /// orchestrator to list today's remaining events directly (§4.10
    /// step 1). Returns `None` and logs on any OAuth failure rather than
    /// propagating — the refresh pass skips subjects that aren't connected.
    pub async fn oauth_client(&self, subject_id: &str) -> Option<monday_oauth::GoogleClient> {
        let oauth = self.oauth.as_ref()?;
        match oauth.get_client(subject_id).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(subject_id, error = %e, "meeting-sync refresh: no usable Google client");
                None
            }
        }
    }

    async fn analyze(&self, transcript: &str) -> Result<MeetingAnalysis> {
        let response = self
            .llm
            .chat(ChatRequest {
                system: Some(MEETING_NOTES_SYSTEM_PROMPT.to_string()),
                messages: vec![Message::user(transcript)],
                tools: vec![],
                max_tokens: 2048,
            })
            .await
            .map_err(|e| MeetingSyncError::Llm(e.to_string()))?;

        let cleaned = strip_code_fences(&response.text);
        serde_json::from_str(cleaned).map_err(|e| MeetingSyncError::Llm(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_notes_prompt_mentions_closed_priority_set() {
        assert!(MEETING_NOTES_SYSTEM_PROMPT.contains("Critical"));
        assert!(MEETING_NOTES_SYSTEM_PROMPT.contains("action-items"));
    }

    #[test]
    fn sync_counts_default_is_all_zero() {
        let counts = SyncCounts::default();
        assert_eq!(counts.found, 0);
        assert_eq!(counts.previews_posted, 0);
    }
}
