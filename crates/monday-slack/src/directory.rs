//! Workspace user directory (§4.6 step 1): opportunistic cache of
//! `<@U…>` id → display name, populated from a single `users.list` call on
//! first need. Falls back to the operator-supplied static map when the
//! bot token lacks the `users:read` scope.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use crate::client::{is_missing_scope, SlackClient};

pub struct UserDirectory {
    cache: DashMap<String, String>,
    static_map: HashMap<String, String>,
    loaded: AtomicBool,
}

impl UserDirectory {
    pub fn new(static_map: HashMap<String, String>) -> Self {
        Self {
            cache: DashMap::new(),
            static_map,
            loaded: AtomicBool::new(false),
        }
    }

    /// Resolve a single user id to a display name, loading the whole
    /// workspace roster on first miss. Never fails outright — an
    /// unresolvable id just falls back to the raw id.
    pub async fn resolve(&self, client: &SlackClient, user_id: &str) -> String {
        if let Some(name) = self.cache.get(user_id) {
            return name.clone();
        }
        if let Some(name) = self.static_map.get(user_id) {
            return name.clone();
        }

        if !self.loaded.load(Ordering::Acquire) {
            self.load(client).await;
        }

        self.cache
            .get(user_id)
            .map(|e| e.clone())
            .or_else(|| self.static_map.get(user_id).cloned())
            .unwrap_or_else(|| user_id.to_string())
    }

    async fn load(&self, client: &SlackClient) {
        match client.users_list().await {
            Ok(members) => {
                for (id, name) in members {
                    self.cache.insert(id, name);
                }
                self.loaded.store(true, Ordering::Release);
            }
            Err(e) if is_missing_scope(&e) => {
                // Static map is the permanent fallback; don't retry every call.
                self.loaded.store(true, Ordering::Release);
            }
            Err(_) => {
                // Transient failure — leave `loaded` false so the next
                // mention resolution retries.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_map_resolves_without_any_client_call() {
        let mut map = HashMap::new();
        map.insert("U1".to_string(), "Alice".to_string());
        let dir = UserDirectory::new(map);
        assert!(dir.cache.is_empty());
        assert_eq!(dir.static_map.get("U1").unwrap(), "Alice");
    }
}
