use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The provided cron expression does not parse.
    #[error("invalid cron expression {expression:?}: {reason}")]
    InvalidCron { expression: String, reason: String },

    /// No job with the given ID was registered.
    #[error("job not found: {id}")]
    JobNotFound { id: String },

    /// The configured timezone name is not a recognized IANA zone.
    #[error("invalid timezone {0:?}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
