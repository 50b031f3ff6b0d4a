use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    error::{Result, SchedulerError},
    schedule::{compute_next_run, parse_cron},
    types::{Job, JobOutcome, JobRuntimeState, JobStatus},
};

struct RegisteredJob {
    job: Job,
    schedule: Option<CronSchedule>,
    state: JobRuntimeState,
}

/// Scheduled-Job Runtime (C9). Holds a fixed, code-registered job roster
/// and drives a 1-second polling loop with a per-job overlap guard.
pub struct SchedulerEngine {
    tz: Tz,
    jobs: Arc<Mutex<HashMap<String, RegisteredJob>>>,
    stop: CancellationToken,
}

impl SchedulerEngine {
    /// `timezone` must be an IANA zone name, default `Asia/Jerusalem` (§6).
    pub fn new(timezone: &str) -> Result<Self> {
        let tz = Tz::from_str(timezone)
            .map_err(|_| SchedulerError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self {
            tz,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            stop: CancellationToken::new(),
        })
    }

    /// Register a job. Validates the cron expression eagerly if the job is
    /// enabled — the caller is expected to treat `Err` as a fatal startup
    /// error for enabled jobs.
    pub fn register(&self, job: Job) -> Result<()> {
        let schedule = if job.enabled {
            Some(parse_cron(&job.cron_expression)?)
        } else {
            None
        };

        let next_run = schedule
            .as_ref()
            .and_then(|s| compute_next_run(s, self.tz, Utc::now()));

        info!(job_id = %job.id, name = %job.name, enabled = job.enabled, "job registered");

        let mut jobs = self.jobs.lock().unwrap();
        jobs.insert(
            job.id.clone(),
            RegisteredJob {
                job,
                schedule,
                state: JobRuntimeState {
                    next_run,
                    ..Default::default()
                },
            },
        );
        Ok(())
    }

    /// Run the 1-second poll loop until `stop_all()` is called or `shutdown`
    /// is cancelled (process-wide fan-out, §5 graceful shutdown).
    pub async fn start_all(&self, shutdown: CancellationToken) {
        info!("scheduler engine started");
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                _ = self.stop.cancelled() => {
                    info!("scheduler engine stopped");
                    break;
                }
                _ = shutdown.cancelled() => {
                    info!("scheduler engine shutting down");
                    break;
                }
            }
        }
    }

    pub fn stop_all(&self) {
        self.stop.cancel();
    }

    pub fn get_status(&self) -> Vec<JobStatus> {
        let jobs = self.jobs.lock().unwrap();
        let mut statuses: Vec<JobStatus> = jobs
            .values()
            .map(|reg| JobStatus {
                id: reg.job.id.clone(),
                name: reg.job.name.clone(),
                cron_expression: reg.job.cron_expression.clone(),
                enabled: reg.job.enabled,
                running: reg.state.running,
                last_run: reg.state.last_run,
                next_run: reg.state.next_run,
                last_result: reg.state.last_result.clone(),
                consecutive_failures: reg.state.consecutive_failures,
            })
            .collect();
        statuses.sort_by(|a, b| a.id.cmp(&b.id));
        statuses
    }

    fn tick(&self) {
        let now = Utc::now();
        let mut due = Vec::new();
        {
            let mut jobs = self.jobs.lock().unwrap();
            for reg in jobs.values_mut() {
                if !reg.job.enabled {
                    continue;
                }
                let Some(next_run) = reg.state.next_run else {
                    continue;
                };
                if next_run > now {
                    continue;
                }
                if reg.state.running {
                    warn!(job_id = %reg.job.id, "tick skipped: job already running");
                    continue;
                }
                reg.state.running = true;
                if let Some(schedule) = &reg.schedule {
                    reg.state.next_run = compute_next_run(schedule, self.tz, now);
                }
                due.push(reg.job.clone());
            }
        }

        for job in due {
            self.spawn_execution(job, now);
        }
    }

    fn spawn_execution(&self, job: Job, started: chrono::DateTime<Utc>) {
        let jobs = self.jobs.clone();
        let id = job.id.clone();
        info!(job_id = %id, name = %job.name, "executing job");
        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe((job.execute)()).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(job_id = %id, "job execute panicked");
                    JobOutcome::failed("job execute panicked")
                }
            };

            if !outcome.success {
                if let Some(reason) = &outcome.error {
                    error!(job_id = %id, error = %reason, "job execution failed");
                }
            }

            let mut jobs = jobs.lock().unwrap();
            if let Some(reg) = jobs.get_mut(&id) {
                reg.state.running = false;
                reg.state.last_run = Some(started);
                reg.state.consecutive_failures = if outcome.success {
                    0
                } else {
                    reg.state.consecutive_failures + 1
                };
                reg.state.last_result = Some(outcome);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_job(id: &str, cron: &str, counter: Arc<AtomicUsize>, success: bool) -> Job {
        Job {
            id: id.to_string(),
            name: id.to_string(),
            cron_expression: cron.to_string(),
            enabled: true,
            execute: Arc::new(move || {
                let counter = counter.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    JobOutcome {
                        success,
                        posted: success,
                        error: if success { None } else { Some("boom".into()) },
                    }
                })
            }),
        }
    }

    #[test]
    fn disabled_job_is_never_scheduled() {
        let engine = SchedulerEngine::new("UTC").unwrap();
        engine
            .register(Job {
                id: "j1".into(),
                name: "disabled".into(),
                cron_expression: "not even parsed".into(),
                enabled: false,
                execute: Arc::new(|| Box::pin(async { JobOutcome::ok(false) })),
            })
            .unwrap();
        let status = &engine.get_status()[0];
        assert!(status.next_run.is_none());
    }

    #[test]
    fn invalid_cron_for_enabled_job_is_rejected() {
        let engine = SchedulerEngine::new("UTC").unwrap();
        let result = engine.register(Job {
            id: "j2".into(),
            name: "bad".into(),
            cron_expression: "garbage".into(),
            enabled: true,
            execute: Arc::new(|| Box::pin(async { JobOutcome::ok(false) })),
        });
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn due_job_executes_and_resets_failure_counter() {
        let engine = Arc::new(SchedulerEngine::new("UTC").unwrap());
        let counter = Arc::new(AtomicUsize::new(0));
        engine
            .register(counting_job("every-sec", "* * * * * *", counter.clone(), true))
            .unwrap();

        let shutdown = CancellationToken::new();
        let engine_clone = engine.clone();
        let shutdown_clone = shutdown.clone();
        let handle = tokio::spawn(async move { engine_clone.start_all(shutdown_clone).await });

        tokio::time::advance(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;

        shutdown.cancel();
        let _ = handle.await;

        assert!(counter.load(Ordering::SeqCst) >= 1);
        let status = &engine.get_status()[0];
        assert_eq!(status.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_failures_increments_then_resets() {
        let engine = Arc::new(SchedulerEngine::new("UTC").unwrap());
        let counter = Arc::new(AtomicUsize::new(0));
        engine
            .register(counting_job("flaky", "* * * * * *", counter.clone(), false))
            .unwrap();

        let shutdown = CancellationToken::new();
        let engine_clone = engine.clone();
        let shutdown_clone = shutdown.clone();
        let handle = tokio::spawn(async move { engine_clone.start_all(shutdown_clone).await });

        tokio::time::advance(Duration::from_millis(2500)).await;
        tokio::task::yield_now().await;

        shutdown.cancel();
        let _ = handle.await;

        let status = &engine.get_status()[0];
        assert!(status.consecutive_failures >= 1);
    }
}
