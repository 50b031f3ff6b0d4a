//! Scheduled-Job Runtime (C9): a fixed, code-registered job roster driven
//! by cron expressions, with per-job overlap guarding and consecutive
//! failure tracking.
//!
//! The built-in jobs (standup, stale-task sweep, weekly summary) wrap the
//! scrum-master agent with fixed prompts; their `execute` closures are
//! assembled by the wiring layer, which owns the A2A client and the
//! rendering/notification callbacks this crate deliberately knows nothing
//! about.

pub mod engine;
pub mod error;
pub mod schedule;
pub mod types;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use types::{Job, JobExecuteFn, JobOutcome, JobRuntimeState, JobStatus};
