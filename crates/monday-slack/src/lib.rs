//! Slack Adapter (C6), Intent Handlers (C7), and Interactive Preview
//! Engine (C8): mention/DM/threaded-reply dispatch, the six intent
//! handlers, block-action and view-submission routing, and the built-in
//! scheduled-job bodies, all wired around a single `SlackContext`.

pub mod boards;
pub mod cache;
pub mod client;
pub mod context;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod intents;
pub mod interactions;
pub mod jobs;
pub mod mentions;
pub mod modals;
pub mod preview;
pub mod signature;
pub mod types;

pub use client::{is_missing_scope, PostedMessage, SlackClient};
pub use context::SlackContext;
pub use dispatch::handle_event;
pub use error::{Result, SlackError};
pub use events::SlackEnvelope;
pub use interactions::{handle_block_action, handle_view_submission};
pub use preview::SlackPreviewPoster;
