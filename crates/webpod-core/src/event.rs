//! Push events delivered by the server and their wire payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::EventNames;
use crate::error::{Error, Result};
use crate::state::OperationKind;

/// Stage of an operation an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPhase {
    /// Intermediate progress.
    Progress,
    /// The operation finished (successfully or not).
    Complete,
    /// The operation aborted.
    Error,
}

/// One decoded push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Operation the event belongs to.
    pub kind: OperationKind,
    /// Stage reported.
    pub phase: EventPhase,
    /// Items processed so far (scanned, copied, exported).
    pub current: u64,
    /// Items to process; zero means unknown.
    pub total: u64,
    /// File or track currently processed.
    pub label: Option<String>,
    /// Outcome carried by `sync_complete`.
    pub success: Option<bool>,
    /// Error message carried by failures.
    pub error: Option<String>,
    /// Items skipped (export).
    pub skipped: u64,
    /// Items that failed (export).
    pub errors: u64,
    /// Server-assigned generation, when the server tags its events.
    pub generation: Option<u64>,
}

impl ProgressEvent {
    /// A progress event.
    #[must_use]
    pub const fn progress(kind: OperationKind, current: u64, total: u64, label: Option<String>) -> Self {
        Self {
            kind,
            phase: EventPhase::Progress,
            current,
            total,
            label,
            success: None,
            error: None,
            skipped: 0,
            errors: 0,
            generation: None,
        }
    }

    /// A completion event with no counters set.
    #[must_use]
    pub fn complete(kind: OperationKind) -> Self {
        Self {
            phase: EventPhase::Complete,
            ..Self::progress(kind, 0, 0, None)
        }
    }

    /// An error event carrying `message`.
    #[must_use]
    pub fn failed(kind: OperationKind, message: impl Into<String>) -> Self {
        Self {
            phase: EventPhase::Error,
            error: Some(message.into()),
            ..Self::progress(kind, 0, 0, None)
        }
    }

    /// Tag the event with a server generation.
    #[must_use]
    pub const fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Decode a push message received under `event` with a JSON payload.
    pub fn decode(names: &EventNames, event: &str, payload: serde_json::Value) -> Result<Self> {
        if event == names.scan_progress {
            let p: ScanProgressPayload = parse(event, payload)?;
            Ok(Self::progress(
                OperationKind::Scan,
                p.scanned.unwrap_or(0),
                p.total.unwrap_or(0),
                p.current_file,
            )
            .tagged(p.generation))
        } else if event == names.scan_complete {
            let p: ScanCompletePayload = parse(event, payload)?;
            let total_tracks = p.total_tracks.unwrap_or(0);
            Ok(Self {
                current: total_tracks,
                total: total_tracks,
                ..Self::complete(OperationKind::Scan)
            }
            .tagged(p.generation))
        } else if event == names.sync_progress {
            let p: TrackProgressPayload = parse(event, payload)?;
            Ok(Self::progress(
                OperationKind::Sync,
                p.copied.or(p.exported).unwrap_or(0),
                p.total.unwrap_or(0),
                p.track,
            )
            .tagged(p.generation))
        } else if event == names.sync_complete {
            let p: SyncCompletePayload = parse(event, payload)?;
            Ok(Self {
                success: Some(p.success.unwrap_or(false)),
                error: p.error,
                ..Self::complete(OperationKind::Sync)
            }
            .tagged(p.generation))
        } else if event == names.export_progress {
            let p: TrackProgressPayload = parse(event, payload)?;
            Ok(Self::progress(
                OperationKind::Export,
                p.exported.or(p.copied).unwrap_or(0),
                p.total.unwrap_or(0),
                p.track,
            )
            .tagged(p.generation))
        } else if event == names.export_complete {
            let p: ExportCompletePayload = parse(event, payload)?;
            let exported = p.exported.unwrap_or(0);
            Ok(Self {
                current: exported,
                total: exported,
                skipped: p.skipped.unwrap_or(0),
                errors: p.errors.unwrap_or(0),
                success: Some(true),
                ..Self::complete(OperationKind::Export)
            }
            .tagged(p.generation))
        } else if event == names.export_error {
            let p: ErrorPayload = parse(event, payload)?;
            Ok(Self::failed(
                OperationKind::Export,
                p.message.unwrap_or_else(|| "unknown error".to_string()),
            )
            .tagged(p.generation))
        } else {
            Err(Error::UnknownEvent(event.to_string()))
        }
    }

    const fn tagged(mut self, generation: Option<u64>) -> Self {
        self.generation = generation;
        self
    }
}

fn parse<T: DeserializeOwned>(event: &str, payload: serde_json::Value) -> Result<T> {
    // Some emitters send no payload at all for terminal events.
    let payload = if payload.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        payload
    };
    serde_json::from_value(payload).map_err(|source| Error::MalformedPayload {
        event: event.to_string(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct ScanProgressPayload {
    #[serde(default)]
    scanned: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    current_file: Option<String>,
    #[serde(default)]
    generation: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ScanCompletePayload {
    #[serde(default)]
    total_tracks: Option<u64>,
    #[serde(default)]
    generation: Option<u64>,
}

/// Shared by sync and export progress; each reads its own counter first.
#[derive(Debug, Deserialize)]
struct TrackProgressPayload {
    #[serde(default)]
    copied: Option<u64>,
    #[serde(default)]
    exported: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    track: Option<String>,
    #[serde(default)]
    generation: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SyncCompletePayload {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    generation: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ExportCompletePayload {
    #[serde(default)]
    exported: Option<u64>,
    #[serde(default)]
    skipped: Option<u64>,
    #[serde(default)]
    errors: Option<u64>,
    #[serde(default)]
    generation: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    generation: Option<u64>,
}
