use std::sync::Mutex;

use rusqlite::{params, OptionalExtension};
use tracing::instrument;

use crate::db;
use crate::error::{Result, StoreError};
use crate::types::{MeetingRecord, MeetingStatus, TokenRecord};

/// Token & Meeting Stores (C4), each a scoped `rusqlite` connection over a
/// local durable file. `Mutex<Connection>` serializes concurrent access,
/// matching how the rest of the corpus shares a single SQLite connection
/// across async tasks.
pub struct TokenStore {
    conn: Mutex<rusqlite::Connection>,
}

impl TokenStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = db::open(path)?;
        db::init_token_table(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    #[instrument(skip(self, record))]
    pub fn upsert(&self, record: &TokenRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO oauth_tokens (subject_id, access_token, refresh_token, expiry_epoch_ms, scope)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(subject_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expiry_epoch_ms = excluded.expiry_epoch_ms,
                scope = excluded.scope",
            params![
                record.subject_id,
                record.access_token,
                record.refresh_token,
                record.expiry_epoch_ms,
                record.scope,
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn get(&self, subject_id: &str) -> Result<Option<TokenRecord>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT subject_id, access_token, refresh_token, expiry_epoch_ms, scope
             FROM oauth_tokens WHERE subject_id = ?1",
            params![subject_id],
            |row| {
                Ok(TokenRecord {
                    subject_id: row.get(0)?,
                    access_token: row.get(1)?,
                    refresh_token: row.get(2)?,
                    expiry_epoch_ms: row.get(3)?,
                    scope: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(StoreError::from)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, subject_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM oauth_tokens WHERE subject_id = ?1",
            params![subject_id],
        )?;
        Ok(())
    }

    pub fn is_connected(&self, subject_id: &str) -> Result<bool> {
        Ok(self.get(subject_id)?.is_some())
    }

    /// Every subject with a live token record, used at startup to seed the
    /// meeting-sync orchestrator's background refresh roster.
    #[instrument(skip(self))]
    pub fn list_subject_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT subject_id FROM oauth_tokens")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}

pub struct MeetingStore {
    conn: Mutex<rusqlite::Connection>,
}

impl MeetingStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = db::open(path)?;
        db::init_meeting_table(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// True iff any row exists for `event_id`, regardless of status —
    /// `pending`, `approved`, and `dismissed` all count (§3, §4.8
    /// idempotency, property 5).
    #[instrument(skip(self))]
    pub fn is_processed(&self, event_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM meetings WHERE event_id = ?1",
                params![event_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    #[instrument(skip(self, record))]
    pub fn insert(&self, record: &MeetingRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let task_ids = record
            .task_ids
            .as_ref()
            .map(|ids| serde_json::to_string(ids).unwrap_or_default());
        conn.execute(
            "INSERT INTO meetings (event_id, title, processed_at, status, task_ids)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(event_id) DO NOTHING",
            params![
                record.event_id,
                record.title,
                record.processed_at,
                record.status.as_str(),
                task_ids,
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_status(&self, event_id: &str, status: MeetingStatus) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE meetings SET status = ?1 WHERE event_id = ?2",
            params![status.as_str(), event_id],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn get(&self, event_id: &str) -> Result<Option<MeetingRecord>> {
        use std::str::FromStr;
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT event_id, title, processed_at, status, task_ids FROM meetings WHERE event_id = ?1",
            params![event_id],
            |row| {
                let status_str: String = row.get(3)?;
                let task_ids_str: Option<String> = row.get(4)?;
                Ok(MeetingRecord {
                    event_id: row.get(0)?,
                    title: row.get(1)?,
                    processed_at: row.get(2)?,
                    status: MeetingStatus::from_str(&status_str).unwrap_or(MeetingStatus::Pending),
                    task_ids: task_ids_str.and_then(|s| serde_json::from_str(&s).ok()),
                })
            },
        )
        .optional()
        .map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::mem::forget(dir);
        path.to_string_lossy().to_string()
    }

    #[test]
    fn token_upsert_replaces_all_fields() {
        let store = TokenStore::open(&temp_path("tokens.db")).unwrap();
        store
            .upsert(&TokenRecord {
                subject_id: "U1".into(),
                access_token: "a1".into(),
                refresh_token: "r1".into(),
                expiry_epoch_ms: 1000,
                scope: "calendar".into(),
            })
            .unwrap();
        store
            .upsert(&TokenRecord {
                subject_id: "U1".into(),
                access_token: "a2".into(),
                refresh_token: "r2".into(),
                expiry_epoch_ms: 2000,
                scope: "calendar drive".into(),
            })
            .unwrap();

        let rec = store.get("U1").unwrap().unwrap();
        assert_eq!(rec.access_token, "a2");
        assert_eq!(rec.refresh_token, "r2");
        assert_eq!(rec.expiry_epoch_ms, 2000);
    }

    #[test]
    fn meeting_is_processed_regardless_of_status() {
        let store = MeetingStore::open(&temp_path("meetings.db")).unwrap();
        assert!(!store.is_processed("evt-1").unwrap());

        store
            .insert(&MeetingRecord {
                event_id: "evt-1".into(),
                title: "Sync".into(),
                processed_at: "2026-01-01T00:00:00Z".into(),
                status: MeetingStatus::Pending,
                task_ids: None,
            })
            .unwrap();
        assert!(store.is_processed("evt-1").unwrap());

        store
            .set_status("evt-1", MeetingStatus::Dismissed)
            .unwrap();
        assert!(store.is_processed("evt-1").unwrap());
    }

    #[test]
    fn token_delete_removes_record() {
        let store = TokenStore::open(&temp_path("tokens.db")).unwrap();
        store
            .upsert(&TokenRecord {
                subject_id: "U1".into(),
                access_token: "a".into(),
                refresh_token: "r".into(),
                expiry_epoch_ms: 1,
                scope: "s".into(),
            })
            .unwrap();
        store.delete("U1").unwrap();
        assert!(!store.is_connected("U1").unwrap());
    }
}
