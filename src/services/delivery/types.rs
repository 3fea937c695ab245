use chrono::{DateTime, Utc};
use std::fmt;

use crate::services::delivery::StatusSink;
use crate::services::status::ServerStatus;

/// Fixed-window accounting for the broadcast sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateWindow {
    /// Start of the current 60s window; `None` until the first check
    pub window_start: Option<DateTime<Utc>>,
    pub messages_sent_in_window: u32,
    pub last_send_time: Option<DateTime<Utc>>,
}

impl RateWindow {
    /// Account for a confirmed send
    pub fn record_send(&mut self, now: DateTime<Utc>) {
        if self.window_start.is_none() {
            self.window_start = Some(now);
        }
        self.messages_sent_in_window += 1;
        self.last_send_time = Some(now);
    }
}

/// Monitoring state for the single target. Lives only in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryState {
    pub last_delivered: Option<ServerStatus>,
    pub window: RateWindow,
}

/// A unit of work on the job queue
pub enum PollJob {
    /// Forced poll shortly after startup
    Startup,
    /// Recurring poll from the cron schedule
    Scheduled,
    /// Command invocation; answered on the requester's sink only, never broadcast
    OnDemand(Box<dyn StatusSink>),
}

impl PollJob {
    /// Forced jobs skip change detection, but not the rate limiter
    pub fn is_forced(&self) -> bool {
        matches!(self, Self::Startup)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Scheduled => "scheduled",
            Self::OnDemand(_) => "on-demand",
        }
    }
}

impl fmt::Debug for PollJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoChange,
    RateLimited,
    MonitoringDisabled,
}

/// How a cycle ended
#[derive(Debug)]
pub enum CycleOutcome {
    Delivered,
    /// On-demand job answered; broadcast state untouched
    Replied,
    Skipped(SkipReason),
    Failed(DeliveryError),
}

impl CycleOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Sink rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        SinkError::Network(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(&'static str),
    #[error("Sink failure: {0}")]
    Sink(#[from] SinkError),
}
