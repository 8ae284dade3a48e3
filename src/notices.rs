//! Transient notices — the editor's toast surface.
//!
//! The session emits a [`Notice`] for every outcome a host would toast:
//! load/save/delete failures and successful mutations. Notices travel over
//! a bounded flume channel; emission is fire-and-forget, so a host that
//! never drains (or has dropped) the receiver cannot stall or fail an
//! editing operation.

use chrono::{DateTime, Utc};

/// How a host should style a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// One transient, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub when: DateTime<Utc>,
}

impl Notice {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            when: Utc::now(),
        }
    }
}

/// Sending half of the notice channel, held by the session.
#[derive(Debug, Clone)]
pub struct NoticeBus {
    tx: flume::Sender<Notice>,
}

impl NoticeBus {
    /// Creates a bounded notice channel. When the buffer is full the oldest
    /// unread notices are simply lost, matching toast semantics.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, flume::Receiver<Notice>) {
        let (tx, rx) = flume::bounded(capacity);
        (Self { tx }, rx)
    }

    /// Emits an informational notice.
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Notice::new(Severity::Info, message));
    }

    /// Emits an error notice.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Notice::new(Severity::Error, message));
    }

    fn emit(&self, notice: Notice) {
        // Full buffer or dropped receiver both discard the notice.
        let _ = self.tx.try_send(notice);
    }
}
