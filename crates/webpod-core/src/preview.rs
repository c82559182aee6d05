//! Sync preview summary returned by the preview command.

use serde::{Deserialize, Serialize};

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// A track waiting to be copied to the iPod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTrack {
    /// Track title.
    #[serde(default)]
    pub title: String,
    /// Track artist.
    #[serde(default)]
    pub artist: String,
    /// Album name.
    #[serde(default)]
    pub album: String,
    /// File size in bytes.
    #[serde(default)]
    pub size_bytes: u64,
}

impl PendingTrack {
    /// Size as shown in the preview table, e.g. `"4.2 MB"`.
    #[must_use]
    pub fn formatted_size(&self) -> String {
        format!("{:.1} MB", self.size_bytes as f64 / BYTES_PER_MIB)
    }
}

/// What a sync would do, as reported by the server before it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSummary {
    /// Number of tracks to copy.
    pub track_count: u64,
    /// Total size of the tracks to copy, in MB.
    pub total_size_mb: f64,
    /// Free space on the iPod, in MB.
    pub free_mb: f64,
    /// Whether the tracks fit in the free space.
    pub will_fit: bool,
    /// Tracks to copy, in server order.
    #[serde(default)]
    pub pending_tracks: Vec<PendingTrack>,
}

impl PreviewSummary {
    /// Whether there is nothing to sync.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.track_count == 0
    }

    /// First summary line, e.g. `"12 track(s) to copy (48.5 MB)"`.
    ///
    /// Sizes print as the server sent them.
    #[must_use]
    pub fn copy_line(&self) -> String {
        format!("{} track(s) to copy ({} MB)", self.track_count, self.total_size_mb)
    }

    /// Second summary line, e.g. `"iPod free space: 1024 MB"`.
    #[must_use]
    pub fn free_space_line(&self) -> String {
        format!("iPod free space: {} MB", self.free_mb)
    }
}
