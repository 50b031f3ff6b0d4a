//! `POST /api/agent-notify`: gated behind the same `X-API-Key` shared
//! secret as outbound A2A calls, posts `{channel, text, thread_ts?,
//! blocks?}` on behalf of an upstream agent.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use monday_core::types::AgentNotification;
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::app::AppState;

pub async fn agent_notify_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(notification): Json<AgentNotification>,
) -> impl IntoResponse {
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "ok": false, "error": "unauthorized" }))).into_response();
    }

    let result = state
        .slack
        .client
        .post_message(&notification.channel, &notification.text, notification.blocks.as_ref(), notification.thread_ts.as_deref(), None)
        .await;

    match result {
        Ok(_) => Json(json!({ "ok": true })).into_response(),
        Err(e) => {
            warn!(error = %e, "agent-notify post failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ok": false, "error": e.to_string() }))).into_response()
        }
    }
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    authorized_key(&state.agent_notify_api_key, headers)
}

fn authorized_key(api_key: &str, headers: &HeaderMap) -> bool {
    headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .map(|actual| {
            let actual = actual.as_bytes();
            let expected = api_key.as_bytes();
            actual.len() == expected.len() && actual.ct_eq(expected).unwrap_u8() == 1
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", value.parse().unwrap());
        headers
    }

    #[test]
    fn valid_api_key_authorizes() {
        assert!(authorized_key("secret-key", &header("secret-key")));
    }

    #[test]
    fn wrong_api_key_rejected() {
        assert!(!authorized_key("secret-key", &header("wrong-key")));
    }

    #[test]
    fn missing_header_rejected() {
        assert!(!authorized_key("secret-key", &HeaderMap::new()));
    }
}
