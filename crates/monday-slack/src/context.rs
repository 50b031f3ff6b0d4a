//! Shared state for everything downstream of a dispatched Slack event.
//! Analogous to `monday-gateway`'s `AppState`, but scoped to exactly the
//! collaborators the Slack-specific handlers need — `monday-gateway`
//! assembles one of these alongside the scheduler and meeting-sync
//! orchestrator.

use std::sync::Arc;

use monday_a2a::A2aClient;
use monday_core::config::{AgentsConfig, MondayConfig};
use monday_llm::LlmClient;
use monday_meetingsync::MeetingSyncService;
use monday_oauth::OAuthBroker;
use monday_sessions::SessionStore;
use monday_stores::MeetingStore;

use crate::cache::TtlCache;
use crate::client::SlackClient;
use crate::directory::UserDirectory;
use crate::types::BoardSummary;

pub struct SlackContext {
    pub config: MondayConfig,
    pub client: Arc<SlackClient>,
    pub bot_user_id: String,
    pub directory: UserDirectory,
    pub sessions: Arc<SessionStore>,
    pub a2a: Arc<A2aClient>,
    pub llm: Arc<LlmClient>,
    pub oauth: Option<Arc<OAuthBroker>>,
    pub meetings: Arc<MeetingStore>,
    pub meeting_sync: Arc<MeetingSyncService>,
    pub board_cache: TtlCache<Vec<BoardSummary>>,
    pub user_list_cache: TtlCache<Vec<(String, String)>>,
}

impl SlackContext {
    pub fn agents(&self) -> &AgentsConfig {
        &self.config.agents
    }
}
