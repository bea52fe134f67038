// ── User notifications ──
//
// Transient messages for the user (upload finished, recovery failed, ...).
// Published on a broadcast channel; renderers decide how to show them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;
use tracing::debug;

const NOTIFICATION_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single transient message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    /// How long a renderer should keep a notification on screen.
    pub const DISPLAY_DURATION: Duration = Duration::from_secs(3);

    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    /// Whether the notification has outlived [`DISPLAY_DURATION`](Self::DISPLAY_DURATION)
    /// at time `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.at)
            .to_std()
            .is_ok_and(|age| age >= Self::DISPLAY_DURATION)
    }
}

/// Fan-out publisher for [`Notification`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Arc<Notification>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.tx.subscribe()
    }

    /// Publish a notification. Dropped silently when nobody listens.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        let notification = Notification::new(level, message);
        debug!(level = %notification.level, message = %notification.message, "notification");
        let _ = self.tx.send(Arc::new(notification));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_published_notifications() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("Upload completed");
        notifier.error("Error: disk unreadable");

        let first = rx.try_recv().expect("first notification");
        assert_eq!(first.level, NotificationLevel::Success);
        assert_eq!(first.message, "Upload completed");
        let second = rx.try_recv().expect("second notification");
        assert_eq!(second.level, NotificationLevel::Error);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        Notifier::new().info("nobody listening");
    }

    #[test]
    fn notifications_expire_after_display_duration() {
        let n = Notification::new(NotificationLevel::Info, "hello");
        assert!(!n.is_expired(n.at));
        assert!(!n.is_expired(n.at + chrono::Duration::milliseconds(2999)));
        assert!(n.is_expired(n.at + chrono::Duration::seconds(3)));
    }
}
