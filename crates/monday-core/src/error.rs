use thiserror::Error;

/// Error taxonomy for the gateway, mirroring the abstract kinds every
/// component ultimately reduces to at its boundary with the handler layer.
///
/// Components keep their own typed errors (`OAuthError`, `SchedulerError`,
/// `StoreError`, ...) for callers that need to match specific variants;
/// this enum is what crosses into the gateway/logging layer.
#[derive(Debug, Error)]
pub enum MondayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote agent error ({code}): {message}")]
    RemoteAgent { code: i64, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("LLM reply could not be parsed: {0}")]
    LlmParse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("scheduled job error: {0}")]
    Job(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MondayError {
    /// Short wire-facing code, used in log lines and HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            MondayError::Transport(_) => "TRANSPORT_ERROR",
            MondayError::RemoteAgent { .. } => "REMOTE_AGENT_ERROR",
            MondayError::InvalidInput(_) => "INVALID_INPUT",
            MondayError::Auth(_) => "AUTH_ERROR",
            MondayError::LlmParse(_) => "LLM_PARSE_ERROR",
            MondayError::Config(_) => "CONFIG_ERROR",
            MondayError::Job(_) => "JOB_ERROR",
            MondayError::Database(_) => "DATABASE_ERROR",
            MondayError::Serialization(_) => "SERIALIZATION_ERROR",
            MondayError::Io(_) => "IO_ERROR",
            MondayError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, MondayError>;
