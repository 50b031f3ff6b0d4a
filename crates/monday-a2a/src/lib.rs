//! Agent-to-agent JSON-RPC 2.0 client (C1). Wraps `message/send` and
//! `task/get`, propagating context ids and never throwing on transport
//! failure — see [`client::A2aClient`].

pub mod client;
pub mod types;

pub use client::{extract_text, A2aClient};
pub use types::{A2aResponse, Task, TaskState};
