//! Job identity and status types for asynchronous server-side operations.
//!
//! Long-running operations (mod downloads, uninstalls, schedule runs) are
//! accepted by the server with an opaque job id and executed in the
//! background. The client observes them only through repeated status
//! fetches -- see [`JobPoller`](crate::poller::JobPoller).
//!
//! # Serialization
//!
//! Statuses travel as `{ "status": "...", "message": "..." }` with the
//! state spelled in SCREAMING_SNAKE_CASE, matching the worker queue's
//! native state names. A job-accepted response carries the job id in its
//! `status` field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a server-side asynchronous job.
///
/// No semantics beyond identity: the id is minted by the server when an
/// operation is accepted and discarded by the client once polling reaches
/// a terminal state.
///
/// # Examples
///
/// ```
/// use garrison_client::types::JobId;
///
/// let id = JobId::new("7f3a2c");
/// assert_eq!(id.as_str(), "7f3a2c");
/// assert_eq!(id.to_string(), "7f3a2c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps a raw job id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id as returned by the server.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Lifecycle state of an asynchronous job.
///
/// The terminal set is exactly {`Success`, `Succeeded`, `Failure`,
/// `Failed`, `Aborted`}; once a poll observes one of these, no further
/// polling happens for that job. `Retry` and `Revoked` are non-terminal
/// continuation states: a retrying job keeps consuming the same attempt
/// budget, and a revoked job polls until the budget runs out.
///
/// # Examples
///
/// ```
/// use garrison_client::types::JobState;
///
/// assert!(!JobState::Pending.is_terminal());
/// assert!(!JobState::Revoked.is_terminal());
/// assert!(JobState::Success.is_terminal());
/// assert!(JobState::Aborted.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Accepted but not yet started.
    Pending,
    /// Actively executing.
    Running,
    /// Failed transiently; the worker will retry it.
    Retry,
    /// Cancellation was requested server-side. Not part of the terminal
    /// set: a revoked job polls until the attempt budget is exhausted.
    Revoked,
    /// Finished successfully (terminal).
    Success,
    /// Finished successfully, alternative spelling used by some task
    /// types (terminal).
    Succeeded,
    /// Finished unsuccessfully (terminal).
    Failure,
    /// Finished unsuccessfully, alternative spelling (terminal).
    Failed,
    /// Aborted before completion (terminal).
    Aborted,
}

impl JobState {
    /// Returns `true` if no further polling is meaningful for this state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Succeeded | Self::Failure | Self::Failed | Self::Aborted
        )
    }

    /// Returns `true` for the successful terminal spellings.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Succeeded)
    }

    /// Returns `true` for the unsuccessful terminal spellings.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failure | Self::Failed | Self::Aborted)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Retry => "RETRY",
            Self::Revoked => "REVOKED",
            Self::Success => "SUCCESS",
            Self::Succeeded => "SUCCEEDED",
            Self::Failure => "FAILURE",
            Self::Failed => "FAILED",
            Self::Aborted => "ABORTED",
        };
        f.write_str(s)
    }
}

/// A point-in-time observation of a job's state.
///
/// # Examples
///
/// ```
/// use garrison_client::types::{JobState, JobStatus};
///
/// let status: JobStatus = serde_json::from_str(
///     r#"{"status": "RUNNING", "message": "downloading"}"#,
/// ).unwrap();
/// assert_eq!(status.state, JobState::Running);
/// assert_eq!(status.message, "downloading");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Current lifecycle state.
    #[serde(rename = "status")]
    pub state: JobState,

    /// Human-readable progress or outcome description.
    #[serde(default)]
    pub message: String,
}

impl JobStatus {
    /// Builds a status with the given state and message.
    pub fn new(state: JobState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }

    /// Builds a terminal `FAILURE` status. Used for synthesized outcomes
    /// (poll timeout, transport failure during a poll attempt).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(JobState::Failure, message)
    }
}

/// Acknowledgement that the server accepted a long-running operation.
///
/// The wire shape carries the job id in the `status` field.
///
/// # Examples
///
/// ```
/// use garrison_client::types::JobAccepted;
///
/// let accepted: JobAccepted = serde_json::from_str(
///     r#"{"status": "job-42", "message": "Download queued"}"#,
/// ).unwrap();
/// assert_eq!(accepted.job_id.as_str(), "job-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAccepted {
    /// The id to poll for this operation's outcome.
    #[serde(rename = "status")]
    pub job_id: JobId,

    /// Human-readable acknowledgement.
    #[serde(default)]
    pub message: String,
}
