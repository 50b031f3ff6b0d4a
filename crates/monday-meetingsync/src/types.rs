use async_trait::async_trait;
use monday_core::types::MeetingAnalysis;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Return value of `checkRecentMeetings` (§4.7).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SyncCounts {
    pub found: u32,
    pub transcripts_found: u32,
    pub previews_posted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Posts a meeting-notes preview to the messaging platform and persists its
/// metadata. Implemented by the wiring layer (monday-slack), which owns the
/// platform client and the rendering library — this crate only knows it
/// needs *a* preview posted, not how.
#[async_trait]
pub trait PreviewPoster: Send + Sync {
    async fn post_meeting_preview(
        &self,
        subject_id: &str,
        event_id: &str,
        title: &str,
        analysis: &MeetingAnalysis,
    ) -> Result<()>;
}
