use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeetingSyncError {
    #[error(transparent)]
    OAuth(#[from] monday_oauth::OAuthError),

    #[error(transparent)]
    Store(#[from] monday_stores::StoreError),

    #[error("meeting-notes LLM call failed: {0}")]
    Llm(String),

    #[error("posting the meeting preview failed: {0}")]
    Poster(String),

    #[error("Google integration isn't configured for this workspace")]
    NotConfigured,
}

pub type Result<T> = std::result::Result<T, MeetingSyncError>;
