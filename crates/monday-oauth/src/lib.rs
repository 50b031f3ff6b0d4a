//! OAuth Broker (C5): authorization-code flow with HMAC-signed state,
//! token refresh, and revocation.

pub mod broker;
pub mod error;
pub mod google_client;
pub mod state;

pub use broker::{OAuthBroker, OAuthBrokerConfig};
pub use error::OAuthError;
pub use google_client::GoogleClient;
