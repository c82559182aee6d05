//! Relay configuration.
//!
//! Holds the remote command names, the push event names the relay
//! subscribes to, the request timeout and toast durations. The backend
//! serves it as JSON; every field falls back to its default when absent.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::notification::{DEFAULT_ERROR_NOTIFICATION_MS, DEFAULT_NOTIFICATION_MS};
use crate::state::OperationKind;

/// Default timeout for preview and start requests.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Names of the remote request/response commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommandNames {
    /// Command returning the sync preview summary.
    pub preview: String,
    /// Command starting the sync; progress then arrives as push events.
    pub start: String,
    /// Command starting a library scan.
    pub scan: String,
    /// Command exporting the iPod's tracks back to disk.
    pub export: String,
}

impl Default for CommandNames {
    fn default() -> Self {
        Self {
            preview: "sync_preview".to_string(),
            start: "start_sync".to_string(),
            scan: "scan_library".to_string(),
            export: "export_ipod".to_string(),
        }
    }
}

impl CommandNames {
    /// Command starting an operation of `kind`.
    #[must_use]
    pub fn start_command(&self, kind: OperationKind) -> &str {
        match kind {
            OperationKind::Scan => &self.scan,
            OperationKind::Sync => &self.start,
            OperationKind::Export => &self.export,
        }
    }
}

/// Wire names of the push events the relay subscribes to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventNames {
    /// Scan progress.
    pub scan_progress: String,
    /// Scan finished.
    pub scan_complete: String,
    /// Sync progress.
    pub sync_progress: String,
    /// Sync finished (successfully or not).
    pub sync_complete: String,
    /// Export progress.
    pub export_progress: String,
    /// Export finished.
    pub export_complete: String,
    /// Export aborted with an error.
    pub export_error: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            scan_progress: "scan_progress".to_string(),
            scan_complete: "scan_complete".to_string(),
            sync_progress: "sync_progress".to_string(),
            sync_complete: "sync_complete".to_string(),
            export_progress: "export_progress".to_string(),
            export_complete: "export_complete".to_string(),
            export_error: "export_error".to_string(),
        }
    }
}

impl EventNames {
    /// All subscribed event names, in subscription order.
    #[must_use]
    pub fn all(&self) -> [&str; 7] {
        [
            self.scan_progress.as_str(),
            self.scan_complete.as_str(),
            self.sync_progress.as_str(),
            self.sync_complete.as_str(),
            self.export_progress.as_str(),
            self.export_complete.as_str(),
            self.export_error.as_str(),
        ]
    }
}

/// How long toasts stay on screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationDurations {
    /// Info, success and warning toasts.
    pub default_ms: u64,
    /// Error toasts.
    pub error_ms: u64,
}

impl Default for NotificationDurations {
    fn default() -> Self {
        Self {
            default_ms: DEFAULT_NOTIFICATION_MS,
            error_ms: DEFAULT_ERROR_NOTIFICATION_MS,
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayConfig {
    /// Remote command names.
    #[serde(default)]
    pub commands: CommandNames,
    /// Push event names.
    #[serde(default)]
    pub events: EventNames,
    /// Timeout applied to every request/response call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Toast durations.
    #[serde(default)]
    pub notifications: NotificationDurations,
}

const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            commands: CommandNames::default(),
            events: EventNames::default(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            notifications: NotificationDurations::default(),
        }
    }
}

impl RelayConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Parse and validate a configuration served as JSON.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value).map_err(|e| Error::Configuration {
            message: format!("Failed to parse relay config: {e}"),
        })?;
        config.validate()?;
        debug!(
            "Relay config: timeout {} ms, start command {}",
            config.request_timeout_ms, config.commands.start
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: String| Error::Configuration { message };

        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms must be greater than zero".to_string()));
        }
        if self.commands.preview.is_empty()
            || OperationKind::ALL
                .into_iter()
                .any(|kind| self.commands.start_command(kind).is_empty())
        {
            return Err(invalid("command names must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for name in self.events.all() {
            if name.is_empty() {
                return Err(invalid("event names must not be empty".to_string()));
            }
            if !seen.insert(name) {
                return Err(invalid(format!("duplicate event name: {name}")));
            }
        }
        Ok(())
    }
}
