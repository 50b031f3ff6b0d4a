//! Minimal LLM client used by the intent router, task extractor, meeting
//! analysis, and the calendar/drive bounded tool-use loops.

pub mod client;
pub mod types;

pub use client::{strip_code_fences, LlmClient};
pub use types::{ChatRequest, ChatResponse, LlmError, Message, Role, ToolCall, ToolDefinition};
