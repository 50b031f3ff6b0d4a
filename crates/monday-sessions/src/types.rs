//! Thread-session value type (§3 "Thread-Session", §4.2).

use monday_core::types::{AgentKey, Intent};
use serde::{Deserialize, Serialize};

/// `{context-id, agent-key, intent?}` keyed by an opaque platform thread id.
///
/// Invariant: for a given thread key, `context_id` never changes once
/// assigned; `agent_key` never changes unless the thread's intent
/// transitions to `agent-chat` (enforced by [`super::manager::SessionStore::upsert`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSession {
    pub context_id: String,
    pub agent_key: AgentKey,
    pub intent: Option<Intent>,
}
