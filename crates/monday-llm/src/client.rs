use serde_json::{json, Value};
use tracing::warn;

use crate::types::{ChatRequest, ChatResponse, LlmError, Message, Result, Role, ToolCall};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Minimal Anthropic Messages API client. Only the request/response
/// contract this gateway needs (system/messages/tools in, text/tool_use
/// blocks out) is modeled — the provider surface itself is an external
/// collaborator (spec §1).
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                json!({
                    "role": role_str(m.role),
                    "content": m.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": if request.max_tokens == 0 { 1024 } else { request.max_tokens },
            "messages": messages,
        });

        if let Some(system) = &request.system {
            body["system"] = json!(system);
        }
        if !request.tools.is_empty() {
            body["tools"] = json!(request
                .tools
                .iter()
                .map(|t| json!({
                    "name": t.name,
                    "description": t.description,
                    "input_schema": t.input_schema,
                }))
                .collect::<Vec<_>>());
        }

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).to_string();
            warn!(%status, body = %text, "LLM provider returned non-2xx");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: Value = serde_json::from_slice(&bytes)
            .map_err(|e| LlmError::Transport(format!("invalid JSON from provider: {e}")))?;

        Ok(parse_response(&parsed))
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn parse_response(value: &Value) -> ChatResponse {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    if let Some(blocks) = value.get("content").and_then(|c| c.as_array()) {
        for block in blocks {
            match block.get("type").and_then(|t| t.as_str()) {
                Some("text") => {
                    if let Some(t) = block.get("text").and_then(|t| t.as_str()) {
                        text.push_str(t);
                    }
                }
                Some("tool_use") => {
                    tool_calls.push(ToolCall {
                        id: block
                            .get("id")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        name: block
                            .get("name")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        input: block.get("input").cloned().unwrap_or(Value::Null),
                    });
                }
                _ => {}
            }
        }
    }

    ChatResponse { text, tool_calls }
}

/// Strip markdown code fences from a reply before attempting JSON parse
/// (§4.3 tier 2).
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("```").unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chat_parses_text_and_tool_use_blocks() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"content":[{"type":"text","text":"hello "},{"type":"tool_use","id":"t1","name":"list_events","input":{}}]}"#,
            )
            .create_async()
            .await;

        let client = LlmClient::new("key".into(), server.url(), "model".into());
        let response = client
            .chat(ChatRequest {
                system: None,
                messages: vec![Message::user("hi")],
                tools: vec![],
                max_tokens: 100,
            })
            .await
            .unwrap();

        assert_eq!(response.text, "hello ");
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "list_events");
    }

    #[test]
    fn strip_code_fences_removes_json_fence() {
        let input = "```json\n{\"intent\":\"calendar\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"intent\":\"calendar\"}");
    }
}
