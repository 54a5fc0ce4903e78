//! Error types for gateway, store, and cache operations.
//!
//! Everything that can fail in this crate funnels into [`Error`], so
//! mutation failures, transport failures, and decode failures all get the
//! same user-visible treatment through the reporting seam
//! ([`ErrorSink`](crate::report::ErrorSink)). Job polling is the one
//! exception: poll failures are converted into terminal
//! [`JobStatus`](crate::types::JobStatus) values rather than errors, so
//! callers of [`JobPoller::poll`](crate::poller::JobPoller::poll) always
//! get a resolved outcome.

use thiserror::Error;

use crate::constants::UNKNOWN_ERROR_MESSAGE;

/// Result type for gateway, store, and cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client.
///
/// # Examples
///
/// ```
/// use garrison_client::Error;
///
/// let err = Error::Api {
///     status: 404,
///     message: "Resource not found".to_string(),
/// };
/// assert_eq!(err.status(), Some(404));
/// assert_eq!(err.to_string(), "Resource not found");
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a non-success HTTP status.
    ///
    /// `message` is the server's own `{message}`/`{error}` body when one
    /// was present, otherwise a canned per-status message.
    #[error("{message}")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// Human-readable description of the failure.
        message: String,
    },

    /// The request never produced an HTTP response (DNS, connect,
    /// timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response arrived but its body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The gateway was misconfigured (bad base URL, unbuildable client).
    #[error("configuration error: {0}")]
    Config(String),

    /// A secondary resource load step (e.g. an image decode probe)
    /// failed after the resource was materialized in the cache.
    #[error("resource load failed for '{key}': {message}")]
    ResourceLoad {
        /// The cache key of the resource.
        key: String,
        /// Description of the load failure.
        message: String,
    },
}

impl Error {
    /// The HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for failures where retrying the same request might
    /// succeed (transport-level problems and 5xx/429 responses).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => matches!(status, 429 | 500 | 502 | 503),
            _ => false,
        }
    }
}

/// Canned human-readable message for an HTTP status, used when the server
/// does not provide one in the response body.
pub(crate) fn http_error_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request - please check your input",
        401 => "Authentication required",
        403 => "Permission denied",
        404 => "Resource not found",
        409 => "Conflict - resource already exists",
        422 => "Validation error - please check your input",
        429 => "Too many requests - please try again later",
        500 => "Server error - please try again later",
        502 => "Service unavailable - please try again later",
        503 => "Service temporarily unavailable",
        _ => UNKNOWN_ERROR_MESSAGE,
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            let status = status.as_u16();
            Self::Api {
                status,
                message: http_error_message(status).to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}
