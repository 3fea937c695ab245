use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::MonitorConfig;
use crate::services::delivery::{
    detect_change, CycleOutcome, DeliveryError, DeliveryState, PollJob, SkipReason, StatusSink,
    WindowRateLimiter,
};
use crate::services::presentation::Presenter;
use crate::services::status::{normalize, ServerStatus, StatusQuery};

/// Runs poll cycles: query, normalize, decide, deliver.
///
/// Queries run without holding the state lock, so a slow scheduled query never
/// blocks an on-demand reply. Deciding, sending and committing happen under
/// one lock, which keeps the window counters exact. On-demand replies never
/// take the lock.
pub struct DeliveryScheduler {
    config: MonitorConfig,
    presenter: Presenter,
    query: Arc<dyn StatusQuery>,
    broadcast: Option<Arc<dyn StatusSink>>,
    limiter: WindowRateLimiter,
    state: Mutex<DeliveryState>,
}

impl DeliveryScheduler {
    pub fn new(
        config: MonitorConfig,
        presenter: Presenter,
        query: Arc<dyn StatusQuery>,
        broadcast: Option<Arc<dyn StatusSink>>,
    ) -> Self {
        let limiter = WindowRateLimiter::new(config.rate_limit.clone());
        Self {
            config,
            presenter,
            query,
            broadcast,
            limiter,
            state: Mutex::new(DeliveryState::default()),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Single query attempt; failures come back as an offline status
    pub async fn poll(&self) -> ServerStatus {
        let target = &self.config.target;
        let outcome = self
            .query
            .query(&target.host, target.port, self.config.query_timeout)
            .await;

        if let Err(e) = &outcome {
            tracing::debug!("Status query to {} failed: {}", target.address(), e);
        }

        normalize(outcome)
    }

    pub async fn run_cycle(&self, job: PollJob) -> CycleOutcome {
        tracing::info!("🔄 Running {} server status check", job.label());

        let forced = job.is_forced();
        let status = self.poll().await;
        let checked_at = Utc::now();

        if let PollJob::OnDemand(reply) = &job {
            return self.reply(reply.as_ref(), &status, checked_at).await;
        }

        if !self.config.enabled {
            tracing::debug!("Monitoring disabled, not broadcasting");
            return CycleOutcome::Skipped(SkipReason::MonitoringDisabled);
        }

        self.deliver(status, forced, checked_at).await
    }

    /// Answer the requester directly. Not rate limited and never recorded in
    /// the broadcast state.
    async fn reply(&self, sink: &dyn StatusSink, status: &ServerStatus, checked_at: DateTime<Utc>) -> CycleOutcome {
        let message = self.presenter.render(status, checked_at);
        match sink.send(&message).await {
            Ok(()) => {
                tracing::info!("💬 Replied to {} - Server: {}", sink.describe(), status.summary());
                CycleOutcome::Replied
            }
            Err(e) => {
                tracing::error!("❌ Failed to reply to {}: {}", sink.describe(), e);
                CycleOutcome::Failed(DeliveryError::Sink(e))
            }
        }
    }

    /// Broadcast path: change detection, rate limit, send, commit
    pub async fn deliver(&self, status: ServerStatus, forced: bool, now: DateTime<Utc>) -> CycleOutcome {
        let Some(sink) = &self.broadcast else {
            tracing::error!("❌ Monitoring channel not configured, skipping broadcast");
            return CycleOutcome::Failed(DeliveryError::ConfigurationMissing("MONITOR_CHANNEL_ID"));
        };

        let mut state = self.state.lock().await;

        let Some(reason) = detect_change(
            state.last_delivered.as_ref(),
            &status,
            &self.config.triggers,
            forced,
        ) else {
            tracing::debug!("No material change ({}), skipping broadcast", status.summary());
            return CycleOutcome::Skipped(SkipReason::NoChange);
        };

        let acquisition = self.limiter.try_acquire(&state.window, now);
        if !acquisition.allowed {
            state.window = acquisition.window;
            tracing::info!("⏳ Rate limit reached, skipping status update ({:?})", acquisition.denial);
            return CycleOutcome::Skipped(SkipReason::RateLimited);
        }

        let message = self.presenter.render(&status, now);
        if let Err(e) = sink.send(&message).await {
            tracing::error!("❌ Error sending status update to {}: {}", sink.describe(), e);
            return CycleOutcome::Failed(DeliveryError::Sink(e));
        }

        state.window = acquisition.window;
        state.window.record_send(now);
        tracing::info!(
            "📡 Status update sent - Server: {} ({:?}, {} in window)",
            status.summary(),
            reason,
            state.window.messages_sent_in_window
        );
        state.last_delivered = Some(status);

        CycleOutcome::Delivered
    }

    pub async fn snapshot(&self) -> DeliveryState {
        self.state.lock().await.clone()
    }
}
