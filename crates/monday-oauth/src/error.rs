use thiserror::Error;

/// Error taxonomy for the OAuth broker (§4.5, §7 `AuthError`).
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("state parameter is malformed")]
    InvalidState,

    #[error("token exchange did not return both access and refresh tokens")]
    MissingTokens,

    #[error("no account connected for subject {0}")]
    NotConnected(String),

    #[error("transport error talking to the OAuth provider: {0}")]
    Transport(String),

    #[error(transparent)]
    Store(#[from] monday_stores::StoreError),
}

pub type Result<T> = std::result::Result<T, OAuthError>;
