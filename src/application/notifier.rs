// Notification side channel - transient user-facing messages
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);

    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.notify(NotificationLevel::Success, message);
    }
}

/// Keeps the most recent notifications for the UI to poll
#[derive(Default)]
pub struct NotificationCenter {
    inner: Mutex<NotificationLog>,
}

#[derive(Default)]
struct NotificationLog {
    next_id: u64,
    entries: VecDeque<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications with an id greater than `since`, oldest first
    pub fn since(&self, since: Option<u64>) -> Vec<Notification> {
        let log = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        log.entries
            .iter()
            .filter(|n| since.is_none_or(|s| n.id > s))
            .cloned()
            .collect()
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Error => tracing::warn!(notification = %message, "User notified"),
            _ => tracing::info!(notification = %message, "User notified"),
        }

        let mut log = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        log.next_id += 1;
        let id = log.next_id;
        log.entries.push_back(Notification {
            id,
            level,
            message: message.to_string(),
            created_at: Utc::now(),
        });
        while log.entries.len() > MAX_NOTIFICATIONS {
            log.entries.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_filters_by_id() {
        let center = NotificationCenter::new();
        center.error("first");
        center.success("second");

        let all = center.since(None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].level, NotificationLevel::Error);

        let newer = center.since(Some(all[0].id));
        assert_eq!(newer.len(), 1);
        assert_eq!(newer[0].message, "second");
    }

    #[test]
    fn test_log_is_bounded() {
        let center = NotificationCenter::new();
        for i in 0..(MAX_NOTIFICATIONS + 10) {
            center.error(&format!("failure {}", i));
        }

        let all = center.since(None);
        assert_eq!(all.len(), MAX_NOTIFICATIONS);
        assert_eq!(all[0].message, "failure 10");
    }
}
