//! The error-reporting and notification seam.
//!
//! Every mutation failure and background fetch failure in this crate goes
//! through a single [`ErrorSink`], so all failures get uniform
//! user-visible treatment (the UI renders a transient notification, the
//! log gets a debug entry). Nothing is ever thrown across an async
//! boundary where no one would catch it.
//!
//! [`TracingSink`] is the default and logs through `tracing`.
//! [`ChannelSink`] forwards every event into an unbounded channel so a UI
//! can render toasts and tests can assert exactly-once reporting.

use std::fmt;

use tokio::sync::mpsc;

use crate::error::Error;

/// Severity of a non-error notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational ("Download requested").
    Info,
    /// A completed action worth confirming.
    Success,
}

/// A transient, user-facing notification.
///
/// # Examples
///
/// ```
/// use garrison_client::report::{Notice, NoticeLevel};
///
/// let notice = Notice::info("Download requested").with_detail("ACE");
/// assert_eq!(notice.level, NoticeLevel::Info);
/// assert_eq!(notice.detail.as_deref(), Some("ACE"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Short headline.
    pub message: String,
    /// Optional second line.
    pub detail: Option<String>,
}

impl Notice {
    /// An informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            detail: None,
        }
    }

    /// A success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            detail: None,
        }
    }

    /// Attaches a detail line.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => f.write_str(&self.message),
        }
    }
}

/// Where failures and notices are funneled.
///
/// Implementations must not panic and must not block: they are called
/// from inside mutation and polling paths.
pub trait ErrorSink: Send + Sync {
    /// Reports a failure with a short context label (e.g. `"mods"`,
    /// `"reorder collection mod"`). Called exactly once per failure.
    fn report(&self, context: &str, error: &Error);

    /// Emits a transient notification.
    fn notify(&self, notice: Notice);
}

/// Default sink: logs reports at `error` level and notices at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, context: &str, error: &Error) {
        tracing::error!(context, status = ?error.status(), "{error}");
    }

    fn notify(&self, notice: Notice) {
        tracing::info!(level = ?notice.level, "{notice}");
    }
}

/// An event observed by a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// A reported failure.
    Report {
        /// The context label passed to `report`.
        context: String,
        /// The error's display message.
        message: String,
        /// The error's HTTP status, if any.
        status: Option<u16>,
    },
    /// An emitted notification.
    Notice(Notice),
}

/// Sink that forwards every event into an unbounded channel.
///
/// # Examples
///
/// ```
/// use garrison_client::report::{ChannelSink, ErrorSink, Notice, SinkEvent};
///
/// let (sink, mut events) = ChannelSink::new();
/// sink.notify(Notice::info("Download requested"));
/// match events.try_recv().unwrap() {
///     SinkEvent::Notice(notice) => assert_eq!(notice.message, "Download requested"),
///     other => panic!("unexpected event: {other:?}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver for its events.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ErrorSink for ChannelSink {
    fn report(&self, context: &str, error: &Error) {
        // A dropped receiver just means no one is listening anymore.
        let _ = self.tx.send(SinkEvent::Report {
            context: context.to_string(),
            message: error.to_string(),
            status: error.status(),
        });
    }

    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(SinkEvent::Notice(notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_captures_reports_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.report(
            "mods",
            &Error::Api {
                status: 500,
                message: "Server error - please try again later".to_string(),
            },
        );
        sink.notify(Notice::success("Saved"));

        match rx.try_recv().unwrap() {
            SinkEvent::Report {
                context, status, ..
            } => {
                assert_eq!(context, "mods");
                assert_eq!(status, Some(500));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.try_recv().unwrap() {
            SinkEvent::Notice(notice) => assert_eq!(notice.level, NoticeLevel::Success),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn report_after_receiver_dropped_does_not_panic() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.report("schedules", &Error::Transport("gone".into()));
        sink.notify(Notice::info("still fine"));
    }

    #[test]
    fn notice_display_includes_detail() {
        let notice = Notice::info("Download requested").with_detail("ACE");
        assert_eq!(notice.to_string(), "Download requested: ACE");
        assert_eq!(Notice::success("Saved").to_string(), "Saved");
    }
}
