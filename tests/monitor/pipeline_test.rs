use chrono::{TimeDelta, Utc};
use std::sync::Arc;

use crate::common::{monitor_config, scheduler_with, FakeQuery, RecordingSink, Scripted};
use mc_status_relay::config::RateLimitConfig;
use mc_status_relay::services::delivery::{
    CycleOutcome, DeliveryError, DeliveryState, PollJob, SkipReason,
};
use mc_status_relay::services::presentation::Severity;
use mc_status_relay::services::status::{OfflineReason, ServerStatus};

#[tokio::test]
async fn player_count_change_is_delivered() {
    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(3), Scripted::Online(5)]));
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(monitor_config(), query, Some(sink.clone()));

    assert!(scheduler.run_cycle(PollJob::Startup).await.is_delivered());
    assert!(scheduler.run_cycle(PollJob::Scheduled).await.is_delivered());

    let state = scheduler.snapshot().await;
    assert_eq!(state.last_delivered.as_ref().and_then(|s| s.players_online()), Some(5));
    assert_eq!(state.window.messages_sent_in_window, 2);

    let messages = sink.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].field("👥 Players Online").unwrap().value, "5/20");
}

#[tokio::test]
async fn identical_status_is_not_redelivered() {
    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(3)]));
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(monitor_config(), query.clone(), Some(sink.clone()));

    assert!(scheduler.run_cycle(PollJob::Scheduled).await.is_delivered());
    let second = scheduler.run_cycle(PollJob::Scheduled).await;

    assert!(matches!(second, CycleOutcome::Skipped(SkipReason::NoChange)));
    assert_eq!(query.calls(), 2);
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn timeout_is_reported_as_restarting() {
    let query = Arc::new(FakeQuery::new(vec![Scripted::Timeout]));
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(monitor_config(), query, Some(sink.clone()));

    match scheduler.poll().await {
        ServerStatus::Offline(offline) => {
            assert_eq!(offline.reason, OfflineReason::Restarting);
            assert!(offline.raw_error.contains("timed out"));
        }
        other => panic!("expected offline status, got {:?}", other),
    }

    assert!(scheduler.run_cycle(PollJob::Startup).await.is_delivered());
    assert_eq!(sink.messages()[0].severity, Severity::Restarting);
}

#[tokio::test]
async fn status_flip_is_delivered() {
    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(3), Scripted::Refused]));
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(monitor_config(), query, Some(sink.clone()));

    scheduler.run_cycle(PollJob::Scheduled).await;
    let outcome = scheduler.run_cycle(PollJob::Scheduled).await;

    assert!(outcome.is_delivered());
    let last = sink.messages().pop().unwrap();
    assert_eq!(last.severity, Severity::Offline);
    assert_eq!(last.field("❗ Status").unwrap().value, "Offline");
}

#[tokio::test]
async fn player_trigger_can_be_disabled() {
    let mut config = monitor_config();
    config.triggers.on_player_count_change = false;

    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(3), Scripted::Online(5)]));
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(config, query, Some(sink.clone()));

    scheduler.run_cycle(PollJob::Scheduled).await;
    let outcome = scheduler.run_cycle(PollJob::Scheduled).await;

    assert!(matches!(outcome, CycleOutcome::Skipped(SkipReason::NoChange)));
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn sink_failure_leaves_state_untouched() {
    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(3), Scripted::Online(5)]));
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(monitor_config(), query, Some(sink.clone()));

    assert!(scheduler.run_cycle(PollJob::Scheduled).await.is_delivered());
    let before = scheduler.snapshot().await;

    sink.set_failing(true);
    let failed = scheduler.run_cycle(PollJob::Scheduled).await;
    assert!(matches!(failed, CycleOutcome::Failed(DeliveryError::Sink(_))));
    assert_eq!(scheduler.snapshot().await, before);

    // The same change is retried on the next cycle
    sink.set_failing(false);
    assert!(scheduler.run_cycle(PollJob::Scheduled).await.is_delivered());
    let after = scheduler.snapshot().await;
    assert_eq!(after.last_delivered.and_then(|s| s.players_online()), Some(5));
    assert_eq!(after.window.messages_sent_in_window, 2);
}

#[tokio::test]
async fn rate_limit_blocks_forced_broadcasts() {
    let mut config = monitor_config();
    config.rate_limit = RateLimitConfig {
        max_messages_per_minute: 1,
        min_spacing: std::time::Duration::ZERO,
    };

    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(3), Scripted::Online(4)]));
    let sink = RecordingSink::new();
    let scheduler = scheduler_with(config, query, Some(sink.clone()));

    let t0 = Utc::now();
    let first = scheduler.poll().await;
    let second = scheduler.poll().await;

    assert!(scheduler.deliver(first, true, t0).await.is_delivered());

    let denied = scheduler.deliver(second.clone(), true, t0 + TimeDelta::seconds(30)).await;
    assert!(matches!(denied, CycleOutcome::Skipped(SkipReason::RateLimited)));
    assert_eq!(sink.count(), 1);

    // A fresh window admits the pending change
    let admitted = scheduler.deliver(second, false, t0 + TimeDelta::seconds(61)).await;
    assert!(admitted.is_delivered());
    assert_eq!(sink.count(), 2);
}

#[tokio::test]
async fn spacing_applies_within_a_window() {
    let mut config = monitor_config();
    config.rate_limit.min_spacing = std::time::Duration::from_secs(30);

    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(1)]));
    let scheduler = scheduler_with(config, query, Some(RecordingSink::new()));
    let status = scheduler.poll().await;

    let t0 = Utc::now();
    assert!(scheduler.deliver(status.clone(), true, t0).await.is_delivered());

    let too_soon = scheduler.deliver(status.clone(), true, t0 + TimeDelta::seconds(10)).await;
    assert!(matches!(too_soon, CycleOutcome::Skipped(SkipReason::RateLimited)));

    assert!(scheduler.deliver(status, true, t0 + TimeDelta::seconds(31)).await.is_delivered());
}

#[tokio::test]
async fn on_demand_reply_ignores_exhausted_budget() {
    let mut config = monitor_config();
    config.rate_limit.max_messages_per_minute = 1;

    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(3), Scripted::Online(7)]));
    let broadcast = RecordingSink::new();
    let reply = RecordingSink::new();
    let scheduler = scheduler_with(config, query, Some(broadcast.clone()));

    assert!(scheduler.run_cycle(PollJob::Startup).await.is_delivered());

    let outcome = scheduler.run_cycle(PollJob::OnDemand(Box::new(reply.clone()))).await;

    assert!(matches!(outcome, CycleOutcome::Replied));
    assert_eq!(reply.count(), 1);
    assert_eq!(reply.messages()[0].title, "🖥️ Test Server");
    assert_eq!(reply.messages()[0].field("👥 Players Online").unwrap().value, "7/20");
    assert_eq!(broadcast.count(), 1);
}

#[tokio::test]
async fn on_demand_leaves_broadcast_untouched() {
    let mut config = monitor_config();
    config.rate_limit.min_spacing = std::time::Duration::from_secs(30);

    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(3), Scripted::Refused]));
    let broadcast = RecordingSink::new();
    let reply = RecordingSink::new();
    let scheduler = scheduler_with(config, query, Some(broadcast.clone()));

    let outcome = scheduler.run_cycle(PollJob::OnDemand(Box::new(reply.clone()))).await;

    assert!(matches!(outcome, CycleOutcome::Replied));
    assert_eq!(reply.count(), 1);
    assert_eq!(broadcast.count(), 0);
    assert_eq!(scheduler.snapshot().await, DeliveryState::default());

    // No spacing or window was consumed, so the next real change goes straight out
    assert!(scheduler.run_cycle(PollJob::Scheduled).await.is_delivered());
    assert_eq!(broadcast.count(), 1);
    assert_eq!(broadcast.messages()[0].severity, Severity::Offline);
}

#[tokio::test]
async fn missing_channel_aborts_broadcast_only() {
    let mut config = monitor_config();
    config.channel_id = None;

    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(2)]));
    let reply = RecordingSink::new();
    let scheduler = scheduler_with(config, query, None);

    let startup = scheduler.run_cycle(PollJob::Startup).await;
    let on_demand = scheduler.run_cycle(PollJob::OnDemand(Box::new(reply.clone()))).await;

    assert!(matches!(
        startup,
        CycleOutcome::Failed(DeliveryError::ConfigurationMissing(_))
    ));
    assert!(matches!(on_demand, CycleOutcome::Replied));
    assert_eq!(reply.count(), 1);
    assert!(scheduler.snapshot().await.last_delivered.is_none());
}

#[tokio::test]
async fn disabled_monitoring_still_answers_requests() {
    let mut config = monitor_config();
    config.enabled = false;

    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(2)]));
    let broadcast = RecordingSink::new();
    let reply = RecordingSink::new();
    let scheduler = scheduler_with(config, query, Some(broadcast.clone()));

    let scheduled = scheduler.run_cycle(PollJob::Scheduled).await;
    let on_demand = scheduler.run_cycle(PollJob::OnDemand(Box::new(reply.clone()))).await;

    assert!(matches!(scheduled, CycleOutcome::Skipped(SkipReason::MonitoringDisabled)));
    assert!(matches!(on_demand, CycleOutcome::Replied));
    assert_eq!(broadcast.count(), 0);
    assert_eq!(reply.count(), 1);
}

#[tokio::test]
async fn failed_reply_is_reported_without_broadcasting() {
    let query = Arc::new(FakeQuery::new(vec![Scripted::Online(2)]));
    let broadcast = RecordingSink::new();
    let reply = RecordingSink::new();
    reply.set_failing(true);
    let scheduler = scheduler_with(monitor_config(), query, Some(broadcast.clone()));

    let outcome = scheduler.run_cycle(PollJob::OnDemand(Box::new(reply.clone()))).await;

    assert!(matches!(outcome, CycleOutcome::Failed(DeliveryError::Sink(_))));
    assert_eq!(broadcast.count(), 0);
    assert_eq!(reply.count(), 0);
    assert_eq!(scheduler.snapshot().await, DeliveryState::default());
}
