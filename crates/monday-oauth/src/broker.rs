use tracing::{info, instrument, warn};

use monday_stores::{TokenRecord, TokenStore};

use crate::error::{OAuthError, Result};
use crate::google_client::{self, GoogleClient};
use crate::state;

pub struct OAuthBrokerConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub signing_secret: String,
}

/// OAuth Broker (C5): authorization-code flow, HMAC-signed state, token
/// refresh, revocation.
pub struct OAuthBroker {
    config: OAuthBrokerConfig,
    tokens: TokenStore,
    http: reqwest::Client,
}

impl OAuthBroker {
    pub fn new(config: OAuthBrokerConfig, tokens: TokenStore) -> Self {
        Self {
            config,
            tokens,
            http: reqwest::Client::new(),
        }
    }

    /// Build the URL to send a not-yet-connected user to.
    pub fn connect_url(&self, subject_id: &str) -> String {
        let state = state::sign(subject_id, &self.config.signing_secret);
        google_client::build_consent_url(&self.config.client_id, &self.config.redirect_uri, &state)
    }

    pub fn is_connected(&self, subject_id: &str) -> bool {
        self.tokens.is_connected(subject_id).unwrap_or(false)
    }

    /// `handleCallback(code, state)` (§4.5).
    #[instrument(skip(self, code))]
    pub async fn handle_callback(&self, code: &str, state: &str) -> Result<String> {
        let subject_id = state::verify(state, &self.config.signing_secret)?;

        let exchange = google_client::exchange_code(
            &self.http,
            &self.config.client_id,
            &self.config.client_secret,
            &self.config.redirect_uri,
            code,
        )
        .await?;

        self.tokens.upsert(&TokenRecord {
            subject_id: subject_id.clone(),
            access_token: exchange.access_token,
            refresh_token: exchange.refresh_token,
            expiry_epoch_ms: exchange.expiry_epoch_ms,
            scope: exchange.scope,
        })?;

        info!(subject_id = %subject_id, "oauth connection established");
        Ok(subject_id)
    }

    /// `getClient(subject-id)` (§4.5): loads credentials, refreshing
    /// synchronously if the access token has expired.
    #[instrument(skip(self))]
    pub async fn get_client(&self, subject_id: &str) -> Result<GoogleClient> {
        let mut record = self
            .tokens
            .get(subject_id)?
            .ok_or_else(|| OAuthError::NotConnected(subject_id.to_string()))?;

        let now_ms = chrono::Utc::now().timestamp_millis();
        if record.expiry_epoch_ms < now_ms {
            let refreshed = google_client::refresh_token(
                &self.http,
                &self.config.client_id,
                &self.config.client_secret,
                &record.refresh_token,
            )
            .await?;

            record.access_token = refreshed.access_token;
            record.expiry_epoch_ms = refreshed.expiry_epoch_ms;
            self.tokens.upsert(&record)?;
            info!(subject_id, "refreshed expired access token");
        }

        Ok(GoogleClient::new(record.access_token))
    }

    /// Best-effort revoke, then unconditional delete (§4.5).
    #[instrument(skip(self))]
    pub async fn disconnect(&self, subject_id: &str) -> Result<()> {
        if let Some(record) = self.tokens.get(subject_id)? {
            google_client::revoke(&self.http, &record.access_token).await;
        } else {
            warn!(subject_id, "disconnect called with no existing record");
        }
        self.tokens.delete(subject_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> TokenStore {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.db");
        std::mem::forget(dir);
        TokenStore::open(&path.to_string_lossy()).unwrap()
    }

    fn broker() -> OAuthBroker {
        OAuthBroker::new(
            OAuthBrokerConfig {
                client_id: "id".into(),
                client_secret: "secret".into(),
                redirect_uri: "https://example.com/cb".into(),
                signing_secret: "sign".into(),
            },
            temp_store(),
        )
    }

    #[tokio::test]
    async fn tampered_state_fails_with_invalid_state() {
        let broker = broker();
        let result = broker.handle_callback("code", "U12345:ffff").await;
        assert!(matches!(result, Err(OAuthError::InvalidState)));
        assert!(!broker.is_connected("U12345"));
    }

    #[tokio::test]
    async fn get_client_without_record_fails_not_connected() {
        let broker = broker();
        let result = broker.get_client("ghost").await;
        assert!(matches!(result, Err(OAuthError::NotConnected(_))));
    }
}
