//! Meeting-Sync Orchestrator (C10) and the shared `MeetingSyncService`
//! (§4.7, §4.10): event-driven, not cron-periodic, so it lives apart from
//! the Scheduled-Job Runtime.

pub mod error;
pub mod orchestrator;
pub mod service;
pub mod types;

pub use error::{MeetingSyncError, Result};
pub use orchestrator::MeetingSyncOrchestrator;
pub use service::MeetingSyncService;
pub use types::{PreviewPoster, SyncCounts};
