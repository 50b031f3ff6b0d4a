//! `GET /api/google/callback` (§4.5, §6): completes the authorization-code
//! exchange. Any validation failure — tampered state, expired code, missing
//! OAuth config — is a flat HTTP 400 with a retry instruction (property S3:
//! the token store is left unchanged and `isConnected` stays false).

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::{Html, IntoResponse}};
use serde::Deserialize;
use tracing::warn;

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

pub async fn callback_handler(State(state): State<Arc<AppState>>, query: axum::extract::Query<CallbackQuery>) -> impl IntoResponse {
    let Some(oauth) = &state.slack.oauth else {
        return retry_response("Google integration isn't configured for this workspace.");
    };

    let (Some(code), Some(query_state)) = (&query.code, &query.state) else {
        return retry_response("Missing code or state parameter.");
    };

    match oauth.handle_callback(code, query_state).await {
        Ok(subject_id) => {
            let body = format!(
                "<html><body><h1>Connected</h1><p>Your Google account is now linked for {subject_id}. You can close this tab.</p></body></html>"
            );
            (StatusCode::OK, Html(body)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "google oauth callback failed");
            retry_response("Authorization failed or was tampered with. Please try connecting again from Slack.")
        }
    }
}

fn retry_response(message: &str) -> axum::response::Response {
    let body = format!("<html><body><h1>Connection failed</h1><p>{message}</p></body></html>");
    (StatusCode::BAD_REQUEST, Html(body)).into_response()
}
