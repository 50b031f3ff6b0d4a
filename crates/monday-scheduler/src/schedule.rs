use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;

use crate::error::{Result, SchedulerError};

/// Parse and validate a cron expression. Called eagerly at startup for every
/// enabled job — an invalid expression here is a fatal configuration error
/// (§6 exit code 1), not a runtime one.
pub fn parse_cron(expression: &str) -> Result<Schedule> {
    Schedule::from_str(expression).map_err(|e| SchedulerError::InvalidCron {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

/// Compute the next fire time strictly after `after`, evaluated in `tz`.
pub fn compute_next_run(schedule: &Schedule, tz: Tz, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let after_local = after.with_timezone(&tz);
    schedule.after(&after_local).next().map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_malformed_expression() {
        assert!(parse_cron("not a cron expression").is_err());
    }

    #[test]
    fn computes_next_daily_fire() {
        // Every day at 09:00:00.
        let schedule = parse_cron("0 0 9 * * *").unwrap();
        let tz: Tz = "UTC".parse().unwrap();
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let next = compute_next_run(&schedule, tz, from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap());
    }
}
