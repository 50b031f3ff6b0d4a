//! Slack Events API and interactive-component webhooks (§4 inbound
//! platform events) — both verified with `monday_slack::signature`'s v0
//! HMAC scheme before any body parsing happens.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use monday_slack::events::InteractionPayload;
use monday_slack::{signature, SlackEnvelope};
use serde_json::json;
use tracing::warn;

use crate::app::AppState;

fn verify_request(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), StatusCode> {
    let timestamp = headers
        .get("X-Slack-Request-Timestamp")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let signature_header = headers
        .get("X-Slack-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    signature::verify(&state.slack.config.slack.signing_secret, timestamp, signature_header, body, Utc::now().timestamp()).map_err(
        |e| {
            warn!(error = %e, "slack signature verification failed");
            StatusCode::UNAUTHORIZED
        },
    )
}

/// `POST /slack/events`: URL-verification handshake, then `event_callback`
/// dispatch. Acknowledged immediately — `handle_event` runs detached so
/// Slack's 3-second ack window is never at risk.
pub async fn events_handler(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    if verify_request(&state, &headers, &body).is_err() {
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let envelope: SlackEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "failed to parse slack event envelope");
            return (StatusCode::BAD_REQUEST, "malformed payload").into_response();
        }
    };

    match envelope {
        SlackEnvelope::UrlVerification { challenge } => Json(json!({ "challenge": challenge })).into_response(),
        SlackEnvelope::EventCallback { event, .. } => {
            let ctx = state.slack.clone();
            tokio::spawn(async move { monday_slack::handle_event(&ctx, event).await });
            StatusCode::OK.into_response()
        }
        SlackEnvelope::Other => StatusCode::OK.into_response(),
    }
}

/// `POST /slack/interactions`: block actions and view submissions, posted
/// as `application/x-www-form-urlencoded` with a single `payload` field.
pub async fn interactions_handler(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    if verify_request(&state, &headers, &body).is_err() {
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let Some(payload_json) = extract_payload_field(&body) else {
        return (StatusCode::BAD_REQUEST, "missing payload field").into_response();
    };

    let payload: InteractionPayload = match serde_json::from_str(&payload_json) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "failed to parse interaction payload");
            return (StatusCode::BAD_REQUEST, "malformed payload").into_response();
        }
    };

    let ctx = state.slack.clone();
    match payload.interaction_type.as_str() {
        "block_actions" => {
            tokio::spawn(async move { monday_slack::handle_block_action(&ctx, payload).await });
        }
        "view_submission" => {
            tokio::spawn(async move { monday_slack::handle_view_submission(&ctx, payload).await });
        }
        other => warn!(interaction_type = other, "unrecognized interaction type"),
    }

    StatusCode::OK.into_response()
}

fn extract_payload_field(body: &[u8]) -> Option<String> {
    let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
    fields.into_iter().find(|(key, _)| key == "payload").map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_payload_field_from_form_body() {
        let body = b"payload=%7B%22type%22%3A%22block_actions%22%7D";
        let payload = extract_payload_field(body).unwrap();
        assert_eq!(payload, r#"{"type":"block_actions"}"#);
    }

    #[test]
    fn missing_payload_field_returns_none() {
        assert!(extract_payload_field(b"foo=bar").is_none());
    }
}
