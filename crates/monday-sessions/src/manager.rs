use dashmap::DashMap;
use monday_core::types::{AgentKey, Intent};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::types::ThreadSession;

/// Thread-Session Store (C2). Purely in-memory — a process restart drops
/// all mappings (spec §1 Non-goal, §9 "ambient agent state").
///
/// Operations: `get`, `set`, `clear`, plus `get_or_create_context` which is
/// what the mention/DM handlers actually call (§4.6 step 6): it reuses the
/// thread's existing context id when present so the downstream agent sees
/// a stable conversation identity, and only changes `agent_key` when the
/// new intent is `agent-chat` (the one intent allowed to "take over" a
/// thread already bound to a single-shot preview intent).
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, ThreadSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    #[instrument(skip(self))]
    pub fn get(&self, thread_key: &str) -> Option<ThreadSession> {
        self.sessions.get(thread_key).map(|e| e.value().clone())
    }

    #[instrument(skip(self))]
    pub fn set(&self, thread_key: &str, session: ThreadSession) {
        self.sessions.insert(thread_key.to_string(), session);
    }

    #[instrument(skip(self))]
    pub fn clear(&self, thread_key: &str) {
        self.sessions.remove(thread_key);
    }

    /// Resolve (or create) the session for a thread after classification,
    /// preserving the context-id invariant: once assigned for a thread key
    /// it never changes (§3, property 3). `agent_key` is only overwritten
    /// when the newly classified intent is `agent-chat`.
    #[instrument(skip(self))]
    pub fn get_or_create_context(
        &self,
        thread_key: &str,
        classified_agent_key: AgentKey,
        classified_intent: Intent,
    ) -> ThreadSession {
        let mut entry = self
            .sessions
            .entry(thread_key.to_string())
            .or_insert_with(|| {
                debug!(thread_key, "creating new thread session");
                ThreadSession {
                    context_id: Uuid::new_v4().to_string(),
                    agent_key: classified_agent_key,
                    intent: Some(classified_intent),
                }
            });

        if classified_intent == Intent::AgentChat {
            entry.agent_key = classified_agent_key;
        }
        entry.intent = Some(classified_intent);
        entry.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_id_is_stable_across_upserts() {
        let store = SessionStore::new();
        let first = store.get_or_create_context("t1", AgentKey::ProductOwner, Intent::CreateTask);
        let second = store.get_or_create_context("t1", AgentKey::ScrumMaster, Intent::BoardStatus);
        assert_eq!(first.context_id, second.context_id);
    }

    #[test]
    fn agent_key_only_changes_on_agent_chat() {
        let store = SessionStore::new();
        store.get_or_create_context("t1", AgentKey::ProductOwner, Intent::CreateTask);
        let updated = store.get_or_create_context("t1", AgentKey::ScrumMaster, Intent::BoardStatus);
        assert_eq!(updated.agent_key, AgentKey::ProductOwner);

        let switched = store.get_or_create_context("t1", AgentKey::Developer, Intent::AgentChat);
        assert_eq!(switched.agent_key, AgentKey::Developer);
    }

    #[test]
    fn clear_removes_mapping() {
        let store = SessionStore::new();
        store.get_or_create_context("t1", AgentKey::ProductOwner, Intent::CreateTask);
        store.clear("t1");
        assert!(store.get("t1").is_none());
    }
}
