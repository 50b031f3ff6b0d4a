use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("Slack API error: {0}")]
    Api(String),

    #[error(transparent)]
    OAuth(#[from] monday_oauth::OAuthError),

    #[error(transparent)]
    MeetingSync(#[from] monday_meetingsync::MeetingSyncError),

    #[error(transparent)]
    Store(#[from] monday_stores::StoreError),

    #[error("LLM call failed: {0}")]
    Llm(String),

    #[error("invalid preview metadata: {0}")]
    InvalidMetadata(String),

    #[error("request signature verification failed: {0}")]
    InvalidSignature(String),
}

pub type Result<T> = std::result::Result<T, SlackError>;
