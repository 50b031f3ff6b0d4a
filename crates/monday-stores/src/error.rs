use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("no token record for subject {subject_id}")]
    NotConnected { subject_id: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
