use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Result of one job execution (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub success: bool,
    pub posted: bool,
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn ok(posted: bool) -> Self {
        Self {
            success: true,
            posted,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            posted: false,
            error: Some(error.into()),
        }
    }
}

pub type JobExecuteFn = Arc<dyn Fn() -> BoxFuture<'static, JobOutcome> + Send + Sync>;

/// A registered job (§4.9): `{id, name, cronExpression, enabled, execute}`.
/// Built at startup from code, not persisted — the runtime holds a fixed
/// roster rather than a user-editable job table.
#[derive(Clone)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub cron_expression: String,
    pub enabled: bool,
    pub execute: JobExecuteFn,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("cron_expression", &self.cron_expression)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Per-job runtime state (§4.9): `{running, lastRun, lastResult,
/// consecutiveFailures}`.
#[derive(Debug, Clone, Default)]
pub struct JobRuntimeState {
    pub running: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub last_result: Option<JobOutcome>,
    pub consecutive_failures: u32,
    pub next_run: Option<DateTime<Utc>>,
}

/// Snapshot returned by `getStatus()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: String,
    pub name: String,
    pub cron_expression: String,
    pub enabled: bool,
    pub running: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub last_result: Option<JobOutcome>,
    pub consecutive_failures: u32,
}
