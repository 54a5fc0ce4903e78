//! Bounded, observable polling of asynchronous jobs.
//!
//! The server executes long-running operations in the background and
//! exposes only a point-in-time status endpoint. [`JobPoller`] turns that
//! into a bounded, cancellable, observable sequence: it fetches the
//! status, reports every observation through `on_status_change`, stops on
//! the first terminal state, and gives up with a synthetic timeout
//! failure once the attempt budget is spent.
//!
//! Polling never produces an `Err`: transport and decode failures during
//! an attempt are converted into a terminal `FAILURE` status carrying the
//! error's message, so callers always branch on
//! [`JobState`](crate::types::JobState), never on a rejected future.
//! A transport blip therefore ends the whole poll -- callers that need
//! certainty about the job's real outcome refetch server state instead of
//! trusting the poll result alone.
//!
//! Polls for one job id are strictly sequential: attempt N+1 is not
//! issued until attempt N's response was processed and the configured
//! delay elapsed. Distinct job ids share nothing and may be polled
//! concurrently.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::constants::{
    DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL, POLL_CANCELLED_MESSAGE,
    POLL_TIMEOUT_MESSAGE,
};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::types::{JobId, JobState, JobStatus};

/// Observer invoked with job statuses as they are seen.
pub type StatusCallback = Box<dyn FnMut(&JobStatus) + Send>;

/// Tuning for one polling run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use garrison_client::poller::PollOptions;
///
/// let options = PollOptions::default()
///     .with_interval(Duration::from_millis(100))
///     .with_max_attempts(10);
/// assert_eq!(options.max_attempts, 10);
/// assert!(options.cancel.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between two status fetches.
    pub interval: std::time::Duration,

    /// Number of non-terminal statuses tolerated before polling gives up
    /// with a synthetic timeout failure.
    pub max_attempts: u32,

    /// Cancels the poll early: a cancelled token short-circuits before
    /// the next fetch and resolves `{ABORTED, "Job polling cancelled"}`.
    pub cancel: Option<CancellationToken>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            cancel: None,
        }
    }
}

impl PollOptions {
    /// Sets the delay between fetches.
    pub fn with_interval(mut self, interval: std::time::Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Polls job statuses through a [`Gateway`].
///
/// Stateless apart from the gateway handle: one poller can drive any
/// number of jobs, concurrently and independently.
#[derive(Clone)]
pub struct JobPoller {
    gateway: Arc<dyn Gateway>,
}

impl JobPoller {
    /// Creates a poller over the given gateway.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Fetches the job's current status once, without polling.
    ///
    /// # Errors
    ///
    /// Propagates the gateway error -- unlike [`poll`](Self::poll), a
    /// single check does not convert failures into statuses.
    pub async fn status(&self, job_id: &JobId) -> Result<JobStatus> {
        self.gateway.job_status(job_id).await
    }

    /// Polls until the job reaches a terminal state, the attempt budget
    /// runs out, or the cancellation token fires.
    ///
    /// `on_status_change` is invoked once per fetched status, in order,
    /// including the first fetch and terminal statuses. `on_complete` is
    /// invoked exactly once, with the same status this method returns.
    /// Synthesized outcomes (timeout, transport failure, cancellation)
    /// reach `on_complete` but not `on_status_change`, since no status
    /// was fetched for them.
    pub async fn poll(
        &self,
        job_id: &JobId,
        options: PollOptions,
        mut on_status_change: Option<StatusCallback>,
        mut on_complete: Option<StatusCallback>,
    ) -> JobStatus {
        let mut attempts: u32 = 0;

        let outcome = loop {
            if let Some(cancel) = &options.cancel {
                if cancel.is_cancelled() {
                    tracing::debug!(job = %job_id, "poll cancelled");
                    break JobStatus::new(JobState::Aborted, POLL_CANCELLED_MESSAGE);
                }
            }

            let status = match self.gateway.job_status(job_id).await {
                Ok(status) => status,
                Err(err) => {
                    tracing::debug!(job = %job_id, %err, "poll attempt failed");
                    break JobStatus::failure(err.to_string());
                }
            };

            if let Some(callback) = on_status_change.as_mut() {
                callback(&status);
            }

            if status.state.is_terminal() {
                tracing::debug!(job = %job_id, state = %status.state, "job finished");
                break status;
            }

            attempts += 1;
            if attempts >= options.max_attempts {
                tracing::warn!(
                    job = %job_id,
                    attempts,
                    "giving up on job after exhausting poll attempts"
                );
                break JobStatus::failure(POLL_TIMEOUT_MESSAGE);
            }

            match &options.cancel {
                // Wake early on cancellation; the loop top turns it into
                // the ABORTED outcome.
                Some(cancel) => {
                    tokio::select! {
                        () = tokio::time::sleep(options.interval) => {}
                        () = cancel.cancelled() => {}
                    }
                }
                None => tokio::time::sleep(options.interval).await,
            }
        };

        if let Some(callback) = on_complete.as_mut() {
            callback(&outcome);
        }
        outcome
    }
}

impl std::fmt::Debug for JobPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPoller").finish_non_exhaustive()
    }
}
