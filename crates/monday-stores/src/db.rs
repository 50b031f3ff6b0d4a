use rusqlite::{Connection, Result};

/// Open a connection in WAL/journaling mode so both stores survive a
/// crash (§4.4 "both use WAL/journaling mode to survive crashes").
pub fn open(path: &str) -> Result<Connection> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(conn)
}

/// Initialise the token-store table. Idempotent.
pub fn init_token_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS oauth_tokens (
            subject_id      TEXT PRIMARY KEY NOT NULL,
            access_token    TEXT NOT NULL,
            refresh_token   TEXT NOT NULL,
            expiry_epoch_ms INTEGER NOT NULL,
            scope           TEXT NOT NULL
        );",
    )
}

/// Initialise the meeting-store table. Idempotent.
pub fn init_meeting_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS meetings (
            event_id     TEXT PRIMARY KEY NOT NULL,
            title        TEXT NOT NULL,
            processed_at TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'pending',
            task_ids     TEXT
        );",
    )
}
