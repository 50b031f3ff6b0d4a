use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::service::MeetingSyncService;

const FIRST_ATTEMPT_DELAY_MINS: i64 = 2;
const RETRY_DELAY_MINS: i64 = 15;
const REFRESH_INTERVAL_SECS: u64 = 3600;

struct EventTimers {
    cancel: CancellationToken,
    first: JoinHandle<()>,
    retry: JoinHandle<()>,
}

/// Meeting-Sync Orchestrator (C10): schedules a first-attempt and a retry
/// timer per not-yet-processed event with conference data, keyed by
/// event id so a background refresh never double-schedules.
pub struct MeetingSyncOrchestrator {
    service: Arc<MeetingSyncService>,
    subjects: Vec<String>,
    timers: Arc<Mutex<HashMap<String, EventTimers>>>,
    refresh_handle: Mutex<Option<JoinHandle<()>>>,
    stop: CancellationToken,
}

impl MeetingSyncOrchestrator {
    pub fn new(service: Arc<MeetingSyncService>, subjects: Vec<String>) -> Self {
        Self {
            service,
            subjects,
            timers: Arc::new(Mutex::new(HashMap::new())),
            refresh_handle: Mutex::new(None),
            stop: CancellationToken::new(),
        }
    }

    /// Schedule timers for today's remaining conference-bearing events, then
    /// start the hourly background refresh.
    pub async fn start(&self) {
        for subject in &self.subjects {
            self.schedule_for_subject(subject).await;
        }

        let service = self.service.clone();
        let subjects = self.subjects.clone();
        let timers = self.timers.clone();
        let stop = self.stop.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(StdDuration::from_secs(REFRESH_INTERVAL_SECS));
            interval.tick().await; // skip the immediate first tick
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        for subject in &subjects {
                            schedule_for_subject_static(&service, &timers, &stop, subject).await;
                        }
                    }
                    _ = stop.cancelled() => break,
                }
            }
        });
        *self.refresh_handle.lock().unwrap() = Some(handle);
    }

    async fn schedule_for_subject(&self, subject: &str) {
        schedule_for_subject_static(&self.service, &self.timers, &self.stop, subject).await;
    }

    /// Deterministically cancel every outstanding timer.
    pub fn stop(&self) {
        self.stop.cancel();
        let mut timers = self.timers.lock().unwrap();
        for (_, pair) in timers.drain() {
            pair.cancel.cancel();
            pair.first.abort();
            pair.retry.abort();
        }
        if let Some(handle) = self.refresh_handle.lock().unwrap().take() {
            handle.abort();
        }
        info!("meeting-sync orchestrator stopped");
    }
}

async fn schedule_for_subject_static(
    service: &Arc<MeetingSyncService>,
    timers: &Arc<Mutex<HashMap<String, EventTimers>>>,
    stop: &CancellationToken,
    subject: &str,
) {
    let client = match service_client(service, subject).await {
        Some(c) => c,
        None => return,
    };

    let now = Utc::now();
    let end_of_day = now
        .date_naive()
        .and_hms_opt(23, 59, 59)
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
        .unwrap_or(now);

    let events = match client
        .list_events(&now.to_rfc3339(), &end_of_day.to_rfc3339())
        .await
    {
        Ok(events) => events,
        Err(e) => {
            warn!(subject_id = %subject, error = %e, "meeting-sync refresh: calendar fetch failed");
            return;
        }
    };

    for event in events.into_iter().filter(|e| e.conference_data.is_some()) {
        let end = match event.end.as_ref().and_then(|t| t.date_time.as_ref()) {
            Some(dt) => dt,
            None => continue,
        };
        let end_time: DateTime<Utc> = match DateTime::parse_from_rfc3339(end) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => continue,
        };

        let mut timers_guard = timers.lock().unwrap();
        if timers_guard.contains_key(&event.id) {
            continue;
        }

        let cancel = CancellationToken::new();
        let first_deadline = end_time + Duration::minutes(FIRST_ATTEMPT_DELAY_MINS);
        let retry_deadline = end_time + Duration::minutes(RETRY_DELAY_MINS);

        let first = spawn_timer(
            service.clone(),
            timers.clone(),
            stop.clone(),
            cancel.clone(),
            subject.to_string(),
            event.id.clone(),
            first_deadline,
            false,
        );
        let retry = spawn_timer(
            service.clone(),
            timers.clone(),
            stop.clone(),
            cancel.clone(),
            subject.to_string(),
            event.id.clone(),
            retry_deadline,
            true,
        );

        timers_guard.insert(
            event.id.clone(),
            EventTimers {
                cancel,
                first,
                retry,
            },
        );
    }
}

async fn service_client(
    service: &Arc<MeetingSyncService>,
    subject: &str,
) -> Option<monday_oauth::GoogleClient> {
    // Connectivity is validated by delegating the actual listing to the
    // service's own broker on each scheduling pass.
    service.oauth_client(subject).await
}

#[allow(clippy::too_many_arguments)]
fn spawn_timer(
    service: Arc<MeetingSyncService>,
    timers: Arc<Mutex<HashMap<String, EventTimers>>>,
    stop: CancellationToken,
    cancel: CancellationToken,
    subject: String,
    event_id: String,
    deadline: DateTime<Utc>,
    is_retry: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let now = Utc::now();
        let delay = (deadline - now).to_std().unwrap_or(StdDuration::ZERO);

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => return,
            _ = stop.cancelled() => return,
        }

        if cancel.is_cancelled() {
            return;
        }

        if let Err(e) = service.check_recent_meetings(&subject).await {
            warn!(subject_id = %subject, event_id = %event_id, error = %e, "meeting-sync check failed");
        }

        // `check_recent_meetings` scans the whole window and reports
        // aggregate counts, not which event they belong to — ask the store
        // about this timer's own event_id instead of trusting the counts.
        match service.is_event_processed(&event_id) {
            Ok(true) => {
                info!(subject_id = %subject, event_id = %event_id, "meeting preview posted, cancelling sibling timer");
                cancel.cancel();
            }
            Ok(false) if is_retry => {
                info!(subject_id = %subject, event_id = %event_id, "retry exhausted, giving up");
                cancel.cancel();
            }
            Ok(false) => {
                info!(subject_id = %subject, event_id = %event_id, "first attempt produced no preview, leaving retry pending");
            }
            Err(e) => {
                warn!(subject_id = %subject, event_id = %event_id, error = %e, "failed to check meeting processed status");
                if is_retry {
                    cancel.cancel();
                }
            }
        }

        if cancel.is_cancelled() {
            timers.lock().unwrap().remove(&event_id);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadlines_are_two_and_fifteen_minutes_after_end() {
        let end = Utc::now();
        let first = end + Duration::minutes(FIRST_ATTEMPT_DELAY_MINS);
        let retry = end + Duration::minutes(RETRY_DELAY_MINS);
        assert_eq!((first - end).num_minutes(), 2);
        assert_eq!((retry - end).num_minutes(), 15);
    }
}
