//! # User Notifications
//!
//! Subsystems report user-facing outcomes as notifications instead of writing
//! to the terminal themselves. The runtime decides how to render them.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Default number of notifications retained by a [`NotificationLog`].
pub const DEFAULT_LOG_CAPACITY: usize = 64;

/// Severity and intent of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Something went wrong and the user should act.
    Error,
    /// Informational; no action required.
    Hint,
    /// An operation started and has not settled yet.
    Pending,
    /// An operation settled successfully.
    Success,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NotificationKind::Error => "error",
            NotificationKind::Hint => "hint",
            NotificationKind::Pending => "pending",
            NotificationKind::Success => "success",
        };
        write!(f, "{}", label)
    }
}

/// A single user-facing message emitted by a subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique id, used by renderers to deduplicate and dismiss.
    pub id: Uuid,
    /// Severity and intent.
    pub kind: NotificationKind,
    /// Stable machine-readable code (e.g. "transactionSent").
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl Notification {
    /// Build a notification of the given kind with a fresh id.
    pub fn new(kind: NotificationKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an error notification.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, code, message)
    }

    /// Shorthand for a hint notification.
    pub fn hint(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Hint, code, message)
    }

    /// Shorthand for a pending notification.
    pub fn pending(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Pending, code, message)
    }

    /// Shorthand for a success notification.
    pub fn success(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, code, message)
    }
}

/// A bounded, append-only log of notifications.
///
/// When the log is full the oldest entry is evicted. Renderers read the log;
/// subsystems only push.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationLog {
    /// Create an empty log with the given capacity (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a notification, evicting the oldest entry if full.
    pub fn push(&mut self, notification: Notification) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(notification);
    }

    /// The most recent notification, if any.
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Number of retained notifications.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been pushed yet (or everything was evicted).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}
