use chrono::Utc;
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

use crate::services::delivery::{JobSender, PollJob};

#[derive(Debug, thiserror::Error)]
#[error("Invalid cron expression {expression}: {message}")]
pub struct ScheduleError {
    pub expression: String,
    pub message: String,
}

/// Whole-minute or whole-hour cadence for a poll interval, in the
/// seconds-first syntax of the `cron` crate. Sub-minute precision is dropped.
pub fn cron_expression(poll_interval: Duration) -> String {
    let minutes = (poll_interval.as_millis() / 60_000).max(1);

    if minutes >= 60 {
        let hours = minutes / 60;
        if hours >= 24 {
            "0 0 0 * * *".to_string()
        } else {
            format!("0 0 */{} * * *", hours)
        }
    } else {
        format!("0 */{} * * * *", minutes)
    }
}

pub fn build_schedule(poll_interval: Duration) -> Result<Schedule, ScheduleError> {
    let expression = cron_expression(poll_interval);
    Schedule::from_str(&expression).map_err(|e| ScheduleError {
        expression,
        message: e.to_string(),
    })
}

/// Push a scheduled job at every tick until the queue closes
pub async fn run_schedule(schedule: Schedule, jobs: JobSender) {
    loop {
        let Some(next) = schedule.upcoming(Utc).next() else {
            tracing::warn!("Schedule has no upcoming ticks, stopping");
            return;
        };

        let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        if jobs.send(PollJob::Scheduled).await.is_err() {
            tracing::debug!("Job queue closed, stopping schedule");
            return;
        }
    }
}

/// Queue the forced first poll after `delay`
pub async fn run_startup_poll(delay: Duration, jobs: JobSender) {
    tokio::time::sleep(delay).await;
    if jobs.send(PollJob::Startup).await.is_err() {
        tracing::debug!("Job queue closed before the startup poll");
    }
}
