//! Toast notifications emitted by the relay.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Default on-screen time for info, success and warning toasts.
pub const DEFAULT_NOTIFICATION_MS: u64 = 5000;

/// Default on-screen time for error toasts.
pub const DEFAULT_ERROR_NOTIFICATION_MS: u64 = 8000;

/// Type of notification to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// Informational message.
    #[default]
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier for this notification.
    pub id: u64,
    /// The notification type.
    pub notification_type: NotificationType,
    /// The main message to display.
    pub message: String,
    /// Optional title/heading for the notification.
    pub title: Option<String>,
    /// Duration in milliseconds before auto-dismiss (None = manual dismiss only).
    pub duration_ms: Option<u64>,
}

impl Notification {
    /// Create a new notification with a unique ID.
    #[must_use]
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);

        let duration_ms = match notification_type {
            NotificationType::Error => DEFAULT_ERROR_NOTIFICATION_MS,
            _ => DEFAULT_NOTIFICATION_MS,
        };

        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            notification_type,
            message: message.into(),
            title: None,
            duration_ms: Some(duration_ms),
        }
    }

    /// Create an info notification.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Info, message)
    }

    /// Create a success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Success, message)
    }

    /// Create a warning notification.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Warning, message)
    }

    /// Create an error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Error, message)
    }

    /// Set the title for this notification.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the duration for this notification.
    #[must_use]
    pub const fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Make this notification persist until manually dismissed.
    #[must_use]
    pub const fn persistent(mut self) -> Self {
        self.duration_ms = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = Notification::info("a");
        let b = Notification::info("b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_errors_stay_longer() {
        assert_eq!(
            Notification::error("boom").duration_ms,
            Some(DEFAULT_ERROR_NOTIFICATION_MS)
        );
        assert_eq!(
            Notification::warning("careful").duration_ms,
            Some(DEFAULT_NOTIFICATION_MS)
        );
    }

    #[test]
    fn test_builders() {
        let n = Notification::success("done")
            .with_title("Sync")
            .with_duration(1200);
        assert_eq!(n.title.as_deref(), Some("Sync"));
        assert_eq!(n.duration_ms, Some(1200));
        assert_eq!(n.persistent().duration_ms, None);
    }

    #[test]
    fn test_type_display_matches_css_suffix() {
        assert_eq!(NotificationType::Warning.to_string(), "warning");
        assert_eq!(NotificationType::Error.to_string(), "error");
    }
}
