//! Wire types for the agent-to-agent JSON-RPC 2.0 protocol (§4.1, GLOSSARY).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'static str,
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorBody {
    pub code: i64,
    pub message: String,
}

/// `{jsonrpc, id, result?: Task, error?: {code, message}}`.
///
/// Callers branch on `.error` vs `.result` — this type never represents a
/// thrown exception; see [`crate::client::A2aClient`] for the never-throws
/// contract.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct A2aResponse {
    pub jsonrpc: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorBody>,
}

impl A2aResponse {
    /// Build a synthetic transport-failure response — `error.code = -32000`.
    /// The client falls back to this whenever the HTTP call itself failed
    /// (connect error, timeout, non-JSON body): it never throws to its
    /// caller (§4.1, property 2).
    pub fn transport_error(id: String, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcErrorBody {
                code: -32000,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Failed,
    Canceled,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
        }
    }
}

/// A single part of a message. Both `type` and `kind` text discriminators
/// are accepted on the way in for forward/backward compatibility (§4.1).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessagePart {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind_type: Some("text".to_string()),
            kind: None,
            text: Some(text.into()),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind_type.as_deref() == Some("text") || self.kind.as_deref() == Some("text")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskMessage {
    pub role: String,
    pub parts: Vec<MessagePart>,
    #[serde(rename = "messageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default)]
    pub message: Option<TaskMessage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "contextId", alias = "context_id", default)]
    pub context_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub history: Option<Vec<TaskMessage>>,
}

/// Returns the first text part of `status.message`, accepting either the
/// `type` or `kind` discriminator; falls back to a fixed literal when no
/// text part is present (§4.1, property 11).
pub fn extract_text(task: &Task) -> String {
    if let Some(message) = &task.status.message {
        for part in &message.parts {
            if part.is_text() {
                if let Some(text) = &part.text {
                    return text.clone();
                }
            }
        }
    }
    format!(
        "[Agent task {} is {}]",
        task.id,
        task.status.state.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_parts(parts: Vec<MessagePart>) -> Task {
        Task {
            id: "task-1".to_string(),
            context_id: None,
            status: TaskStatus {
                state: TaskState::Completed,
                message: Some(TaskMessage {
                    role: "agent".to_string(),
                    parts,
                    message_id: None,
                }),
            },
            history: None,
        }
    }

    #[test]
    fn extract_text_prefers_first_text_part() {
        let task = task_with_parts(vec![MessagePart::text("hello world")]);
        assert_eq!(extract_text(&task), "hello world");
    }

    #[test]
    fn extract_text_accepts_kind_discriminator() {
        let part = MessagePart {
            kind_type: None,
            kind: Some("text".to_string()),
            text: Some("via kind".to_string()),
        };
        let task = task_with_parts(vec![part]);
        assert_eq!(extract_text(&task), "via kind");
    }

    #[test]
    fn extract_text_falls_back_when_no_message() {
        let task = Task {
            id: "task-9".to_string(),
            context_id: None,
            status: TaskStatus {
                state: TaskState::Working,
                message: None,
            },
            history: None,
        };
        assert_eq!(extract_text(&task), "[Agent task task-9 is working]");
    }
}
