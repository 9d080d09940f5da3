//! Asynchronous completion of submitted documents.
//!
//! `submit` never blocks on processing: it pushes the submission id onto a
//! channel and returns. A single worker task drains the channel, simulates
//! the processing step, and delivers a terminal outcome back through the
//! [`CompletionHandler`] seam. Delivery is exactly-once effective: the
//! handler treats an already-terminal submission as a no-op, and only
//! infrastructure failures are retried.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::domain::{SubmissionId, SubmissionStatus};

/// Backoff between retries of a failed terminal write.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Seam through which the lifecycle engine hands work to the runner.
pub trait CompletionScheduler: Send + Sync {
    fn schedule(&self, id: SubmissionId) -> Result<(), ScheduleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("completion worker is no longer running")]
    WorkerGone,
}

/// Terminal outcome the simulated processing step reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Complete,
    Reject,
}

impl CompletionOutcome {
    pub const fn terminal_status(self) -> SubmissionStatus {
        match self {
            CompletionOutcome::Complete => SubmissionStatus::Completed,
            CompletionOutcome::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// How the worker simulates processing: an artificial delay and a fixed
/// outcome, both configuration decisions external to the lifecycle rules.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingPolicy {
    pub delay: Duration,
    pub outcome: CompletionOutcome,
}

/// Seam through which the runner reports outcomes back to the engine.
///
/// Implementations must be idempotent: resolving a submission that is
/// already terminal returns `Ok` without changing state.
pub trait CompletionHandler: Send + Sync {
    fn resolve(&self, id: &SubmissionId, outcome: CompletionOutcome) -> Result<(), ResolveError>;
}

/// Failure classification the worker uses to decide whether to retry.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Infrastructure failure; the terminal write must eventually land, so
    /// the worker retries it.
    #[error("retryable completion failure: {0}")]
    Retryable(String),
    /// Logic error (e.g. submission never left `UPLOADED`); retrying cannot
    /// help and the delivery is dropped.
    #[error("fatal completion failure: {0}")]
    Fatal(String),
}

/// Cloneable scheduling handle backed by an unbounded channel.
#[derive(Clone)]
pub struct CompletionRunner {
    sender: UnboundedSender<SubmissionId>,
}

impl CompletionRunner {
    /// Create the handle and the receiver half the worker will drain.
    pub fn channel() -> (Self, UnboundedReceiver<SubmissionId>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl CompletionScheduler for CompletionRunner {
    fn schedule(&self, id: SubmissionId) -> Result<(), ScheduleError> {
        self.sender.send(id).map_err(|_| ScheduleError::WorkerGone)
    }
}

/// Spawn the worker task draining scheduled submissions.
///
/// The worker owns no lock shared with readers; concurrent `get_status`
/// calls observe `PROCESSING` until the terminal write lands.
pub fn spawn_worker<H>(
    mut receiver: UnboundedReceiver<SubmissionId>,
    handler: Arc<H>,
    policy: ProcessingPolicy,
) -> JoinHandle<()>
where
    H: CompletionHandler + 'static,
{
    tokio::spawn(async move {
        while let Some(id) = receiver.recv().await {
            if !policy.delay.is_zero() {
                tokio::time::sleep(policy.delay).await;
            }
            deliver(handler.as_ref(), &id, policy.outcome).await;
        }
        debug!("completion channel closed, worker exiting");
    })
}

async fn deliver<H: CompletionHandler>(handler: &H, id: &SubmissionId, outcome: CompletionOutcome) {
    loop {
        match handler.resolve(id, outcome) {
            Ok(()) => {
                let status = outcome.terminal_status();
                info!(submission_id = %id, %status, "submission resolved");
                return;
            }
            Err(ResolveError::Retryable(message)) => {
                warn!(submission_id = %id, %message, "terminal write failed, retrying");
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
            Err(ResolveError::Fatal(message)) => {
                error!(submission_id = %id, %message, "dropping completion");
                return;
            }
        }
    }
}
