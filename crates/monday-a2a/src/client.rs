use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::{A2aResponse, JsonRpcRequest, Task};
use monday_core::config::A2A_REQUEST_TIMEOUT_SECS;

/// JSON-RPC 2.0 client for the agent-to-agent protocol (C1).
///
/// Every public method is infallible in the Rust sense — it always
/// returns `A2aResponse`, never `Result`. Transport failures (connect
/// error, timeout, non-2xx, non-JSON body) are converted into a synthetic
/// `error.code = -32000` response rather than propagated, matching the
/// "client never throws to its caller" contract (§4.1).
pub struct A2aClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl A2aClient {
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(A2A_REQUEST_TIMEOUT_SECS))
            .build()
            .expect("reqwest client builder should not fail with no custom TLS config");
        Self { http, api_key }
    }

    /// `sendMessage(agentBaseUrl, text, contextId?) → Response` (§4.1).
    ///
    /// When `context_id` is `Some`, `params.configuration.context_id` is
    /// set; when `None`, the `configuration` key is omitted entirely. This
    /// is how new-conversation vs. continuation is signaled to the
    /// downstream agent (property 1).
    pub async fn send_message(
        &self,
        agent_base_url: &str,
        text: &str,
        context_id: Option<&str>,
    ) -> A2aResponse {
        let message_id = Uuid::new_v4().to_string();
        let message = json!({
            "role": "user",
            "parts": [{ "type": "text", "text": text }],
            "messageId": message_id,
        });

        let mut params = json!({ "message": message });
        if let Some(ctx) = context_id {
            params["configuration"] = json!({ "context_id": ctx });
        }

        self.call(agent_base_url, "message/send", params).await
    }

    /// `getTask(agentBaseUrl, taskId) → Response` (§4.1).
    pub async fn get_task(&self, agent_base_url: &str, task_id: &str) -> A2aResponse {
        let params = json!({ "id": task_id });
        self.call(agent_base_url, "task/get", params).await
    }

    async fn call(
        &self,
        agent_base_url: &str,
        method: &'static str,
        params: serde_json::Value,
    ) -> A2aResponse {
        let id = Uuid::new_v4().to_string();
        let correlation_id = Uuid::new_v4().to_string();

        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: id.clone(),
            method,
            params,
        };

        let mut req = self
            .http
            .post(agent_base_url)
            .header("Content-Type", "application/json")
            .header("X-Correlation-ID", &correlation_id)
            .json(&body);

        if let Some(key) = &self.api_key {
            req = req.header("X-API-Key", key);
        }

        info!(
            target: "monday_a2a",
            method,
            correlation_id = %correlation_id,
            url = agent_base_url,
            "sending A2A request"
        );

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(target: "monday_a2a", error = %e, method, "A2A transport error");
                return A2aResponse::transport_error(id, format!("transport error: {e}"));
            }
        };

        let status = resp.status();
        let bytes = match resp.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(target: "monday_a2a", error = %e, method, "A2A body read error");
                return A2aResponse::transport_error(id, format!("failed to read response body: {e}"));
            }
        };

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            warn!(target: "monday_a2a", %status, method, "A2A non-2xx response");
            return A2aResponse::transport_error(
                id,
                format!("agent responded with HTTP {status}: {text}"),
            );
        }

        match serde_json::from_slice::<A2aResponse>(&bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(target: "monday_a2a", error = %e, method, "A2A response did not parse as JSON-RPC");
                A2aResponse::transport_error(id, format!("invalid JSON-RPC response: {e}"))
            }
        }
    }
}

/// Convenience accessor mirroring §4.1's `extractText(task)` helper.
pub fn extract_text(task: &Task) -> String {
    crate::types::extract_text(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn context_id_present_sets_configuration() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"params":{"configuration":{"context_id":"ctx-1"}}}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":"x","result":{"id":"t1","status":{"state":"completed"}}}"#)
            .create_async()
            .await;

        let client = A2aClient::new(None);
        let resp = client.send_message(&server.url(), "hi", Some("ctx-1")).await;

        mock.assert_async().await;
        assert!(resp.error.is_none());
        assert!(resp.result.is_some());
    }

    #[tokio::test]
    async fn context_id_absent_omits_configuration() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::Function(|body: &[u8]| {
                !String::from_utf8_lossy(body).contains("configuration")
            }))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":"x","result":{"id":"t1","status":{"state":"submitted"}}}"#)
            .create_async()
            .await;

        let client = A2aClient::new(None);
        let resp = client.send_message(&server.url(), "hi", None).await;

        mock.assert_async().await;
        assert!(resp.error.is_none());
    }

    #[tokio::test]
    async fn transport_failure_never_throws() {
        // Nothing listening on this port.
        let client = A2aClient::new(None);
        let resp = client
            .send_message("http://127.0.0.1:1", "hi", None)
            .await;
        assert_eq!(resp.error.as_ref().unwrap().code, -32000);
        assert!(resp.result.is_none());
    }

    #[tokio::test]
    async fn rpc_error_is_passed_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":"x","error":{"code":-32001,"message":"agent busy"}}"#)
            .create_async()
            .await;

        let client = A2aClient::new(None);
        let resp = client.send_message(&server.url(), "hi", None).await;
        assert_eq!(resp.error.unwrap().code, -32001);
    }
}
