//! `WebPod` Core Library
//!
//! This crate holds the client-side state behind WebPod's iPod operations:
//! - The sync preview flow (preview, confirm, start)
//! - Progress reconciliation for library scans, syncs and exports
//! - Decoding of the server's push events
//! - A plain-data view of the indicator, triggers and preview dialog
//! - Relay configuration served by the backend
//!
//! The [`ProgressRelay`] performs no I/O: every input returns the
//! [`Effect`]s to perform. [`RelayDriver`] runs those effects against a
//! [`RelayService`] and a [`RelaySurface`].
//!
//! # Error Handling
//!
//! Fallible operations return [`Result`] with the crate-wide [`Error`].
//!
//! ```rust,ignore
//! use webpod_core::{EventNames, ProgressEvent, Result};
//!
//! fn decode(name: &str, payload: serde_json::Value) -> Result<ProgressEvent> {
//!     ProgressEvent::decode(&EventNames::default(), name, payload)
//! }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod notification;
pub mod preview;
pub mod progress;
pub mod relay;
pub mod state;
pub mod view;

pub use config::{
    CommandNames, DEFAULT_REQUEST_TIMEOUT_MS, EventNames, NotificationDurations, RelayConfig,
};
pub use driver::{ReadySignal, ReadyWaiter, RelayDriver, RelayService, RelaySurface, ready_channel};
pub use error::{Error, RequestError, Result};
pub use event::{EventPhase, ProgressEvent};
pub use notification::{
    DEFAULT_ERROR_NOTIFICATION_MS, DEFAULT_NOTIFICATION_MS, Notification, NotificationType,
};
pub use preview::{PendingTrack, PreviewSummary};
pub use progress::{ProgressSnapshot, effective_total, percent, short_name};
pub use relay::{DeviceStatus, Effect, LibraryView, ProgressRelay, RefreshTarget};
pub use state::{Admission, OperationKind, OperationSlot, OperationState, SlotPhase};
pub use view::{
    CAPACITY_WARNING, ExportTriggerView, IndicatorView, PreviewDialogView, RelayView,
    SCAN_IDLE_CAPTION, SCAN_RUNNING_CAPTION, ScanTriggerView, SyncTriggerView, TrackRow,
};
