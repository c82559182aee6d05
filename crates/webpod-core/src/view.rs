//! Plain-data projection of everything the relay shows on screen.
//!
//! The UI renders a [`RelayView`] and nothing else; it never reads relay
//! internals. A fresh view is produced after every relay transition.

use serde::{Deserialize, Serialize};

use crate::preview::{PendingTrack, PreviewSummary};
use crate::progress::ProgressSnapshot;
use crate::state::OperationState;

/// Caption of the scan trigger when no scan is running.
pub const SCAN_IDLE_CAPTION: &str = "Scan Library";

/// Caption of the scan trigger while a scan is running.
pub const SCAN_RUNNING_CAPTION: &str = "Scanning...";

/// Warning shown in the preview dialog when the tracks do not fit.
pub const CAPACITY_WARNING: &str = "Not enough free space on the iPod for these tracks.";

/// The shared progress indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorView {
    /// Whether the indicator is shown.
    pub visible: bool,
    /// Fill width, 0 to 100.
    pub percent: u8,
    /// Inline text.
    pub text: String,
    /// Hover text (full file path or track identifier).
    pub detail: Option<String>,
}

impl IndicatorView {
    pub(crate) fn showing(snapshot: &ProgressSnapshot) -> Self {
        Self {
            visible: true,
            percent: snapshot.percent,
            text: snapshot.text.clone(),
            detail: snapshot.detail.clone(),
        }
    }

    /// CSS width of the fill bar.
    #[must_use]
    pub fn fill_width(&self) -> String {
        format!("{}%", self.percent)
    }
}

/// The sync trigger button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTriggerView {
    /// Whether the button is disabled.
    pub disabled: bool,
    /// Whether the button pulses to signal pending changes.
    pub pulse: bool,
}

/// The library scan button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTriggerView {
    /// Whether the button is disabled.
    pub disabled: bool,
    /// Button caption.
    pub caption: String,
}

impl Default for ScanTriggerView {
    fn default() -> Self {
        Self {
            disabled: false,
            caption: SCAN_IDLE_CAPTION.to_string(),
        }
    }
}

/// The export-from-iPod button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTriggerView {
    /// Whether the button is disabled.
    pub disabled: bool,
}

/// One row of the pending-track table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRow {
    /// Track title.
    pub title: String,
    /// Track artist.
    pub artist: String,
    /// Album name.
    pub album: String,
    /// Formatted size, e.g. `"4.2 MB"`.
    pub size: String,
}

impl From<&PendingTrack> for TrackRow {
    fn from(track: &PendingTrack) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            size: track.formatted_size(),
        }
    }
}

/// The sync preview dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewDialogView {
    /// Whether the dialog is shown.
    pub open: bool,
    /// Summary paragraphs.
    pub summary_lines: Vec<String>,
    /// Capacity warning, present when the tracks do not fit.
    pub warning: Option<String>,
    /// Whether the confirm button is disabled.
    pub confirm_disabled: bool,
    /// Pending tracks.
    pub tracks: Vec<TrackRow>,
}

impl PreviewDialogView {
    pub(crate) fn showing(summary: &PreviewSummary) -> Self {
        Self {
            open: true,
            summary_lines: vec![summary.copy_line(), summary.free_space_line()],
            warning: (!summary.will_fit).then(|| CAPACITY_WARNING.to_string()),
            confirm_disabled: !summary.will_fit,
            tracks: summary.pending_tracks.iter().map(TrackRow::from).collect(),
        }
    }
}

/// Everything the relay shows, rendered in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayView {
    /// Current in-flight state.
    pub state: OperationState,
    /// Shared progress indicator.
    pub indicator: IndicatorView,
    /// Sync trigger.
    pub sync_trigger: SyncTriggerView,
    /// Scan trigger.
    pub scan_trigger: ScanTriggerView,
    /// Export trigger.
    pub export_trigger: ExportTriggerView,
    /// Preview dialog.
    pub preview: PreviewDialogView,
}
