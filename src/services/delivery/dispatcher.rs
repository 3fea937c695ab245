use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::services::delivery::{CycleOutcome, DeliveryScheduler, PollJob};

pub type JobSender = mpsc::Sender<PollJob>;
pub type JobReceiver = mpsc::Receiver<PollJob>;

pub fn job_queue(capacity: usize) -> (JobSender, JobReceiver) {
    mpsc::channel(capacity)
}

/// Single consumer of the job queue. Each job runs as its own task so that
/// on-demand requests are not stuck behind an outstanding scheduled query.
pub struct JobDispatcher {
    scheduler: Arc<DeliveryScheduler>,
    jobs: JobReceiver,
}

impl JobDispatcher {
    pub fn new(scheduler: Arc<DeliveryScheduler>, jobs: JobReceiver) -> Self {
        Self { scheduler, jobs }
    }

    /// Run until every sender is dropped, then drain in-flight cycles.
    /// Returns the number of cycles that finished.
    pub async fn run(mut self) -> usize {
        let mut in_flight = JoinSet::new();
        let mut finished = 0;

        loop {
            tokio::select! {
                job = self.jobs.recv() => match job {
                    Some(job) => {
                        let scheduler = self.scheduler.clone();
                        in_flight.spawn(async move { scheduler.run_cycle(job).await });
                    }
                    None => break,
                },
                Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                    Self::record(result);
                    finished += 1;
                }
            }
        }

        while let Some(result) = in_flight.join_next().await {
            Self::record(result);
            finished += 1;
        }

        tracing::info!("Job queue closed after {} poll cycles", finished);
        finished
    }

    fn record(result: Result<CycleOutcome, JoinError>) {
        match result {
            Ok(CycleOutcome::Delivered) | Ok(CycleOutcome::Replied) => {}
            Ok(CycleOutcome::Skipped(reason)) => tracing::debug!("Poll cycle skipped: {:?}", reason),
            Ok(CycleOutcome::Failed(e)) => tracing::warn!("Poll cycle failed: {}", e),
            Err(e) if e.is_panic() => {
                tracing::error!("❌ Poll cycle panicked, treating it as skipped: {}", e)
            }
            Err(e) => tracing::error!("❌ Poll cycle task was cancelled: {}", e),
        }
    }
}
