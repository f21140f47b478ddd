//! User-facing notification channel.
//!
//! # Responsibility
//! - Carry one human-readable notification per completed user action.
//! - Keep presentation (toast rendering) outside the core crate.
//!
//! # Invariants
//! - Every failed operation produces exactly one notification at the
//!   boundary that caught the failure; layers above must not re-report.

use log::{error, info};
use std::sync::Mutex;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Outbound notification sink a rendering shell subscribes to.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink: forwards notifications to the structured log stream.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("event=notify module=notify level=success message={message}");
    }

    fn error(&self, message: &str) {
        error!("event=notify module=notify level=error message={message}");
    }
}

/// In-memory sink buffering notifications for inspection.
///
/// Used by tests and by shells that render their own notification center.
#[derive(Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all buffered notifications in arrival order.
    pub fn entries(&self) -> Vec<Notice> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Drains and returns all buffered notifications.
    pub fn take(&self) -> Vec<Notice> {
        self.entries
            .lock()
            .map(|mut entries| std::mem::take(&mut *entries))
            .unwrap_or_default()
    }

    /// Returns only the error messages, in arrival order.
    pub fn error_messages(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|notice| notice.level == NoticeLevel::Error)
            .map(|notice| notice.message)
            .collect()
    }

    fn push(&self, level: NoticeLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(Notice {
                level,
                message: message.to_string(),
            });
        }
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(NoticeLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(NoticeLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::{Notifier, NoticeLevel, RecordingNotifier};

    #[test]
    fn recording_notifier_preserves_arrival_order() {
        let notifier = RecordingNotifier::new();
        notifier.success("Contact created successfully");
        notifier.error("Failed to delete contact");

        let entries = notifier.take();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, NoticeLevel::Success);
        assert_eq!(entries[1].level, NoticeLevel::Error);
        assert!(notifier.entries().is_empty());
    }
}
