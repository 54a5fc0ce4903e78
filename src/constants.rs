//! Shared constants for polling cadence, timeouts, and messages.

use std::time::Duration;

/// Default delay between two status polls for the same job.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default maximum number of poll attempts before a synthetic timeout
/// failure is produced (60 attempts x 2s interval ~= 2 minutes).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

/// Message carried by the synthetic status produced when polling gives up.
pub const POLL_TIMEOUT_MESSAGE: &str = "Job polling timed out";

/// Message carried by the synthetic status produced when a poll is
/// cancelled through its cancellation token.
pub const POLL_CANCELLED_MESSAGE: &str = "Job polling cancelled";

/// Default per-request timeout for the HTTP gateway.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Fallback message when neither the response body nor the HTTP status
/// yields anything human-readable.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Cache key prefix for mod preview images in the resource cache.
pub const MOD_IMAGE_KEY_PREFIX: &str = "mod-";
