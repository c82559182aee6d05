//! Percentage and label computation for progress events.

use serde::{Deserialize, Serialize};

use crate::state::OperationKind;

/// What the shared indicator shows for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Operation the snapshot belongs to.
    pub kind: OperationKind,
    /// Fill width, 0 to 100.
    pub percent: u8,
    /// Inline text, e.g. `"Syncing: 37/120 - Song.mp3"`.
    pub text: String,
    /// Full file/track identifier, shown on hover only.
    pub detail: Option<String>,
}

impl ProgressSnapshot {
    /// Snapshot for an operation whose first progress event has not arrived yet.
    #[must_use]
    pub fn starting(kind: OperationKind) -> Self {
        Self {
            kind,
            percent: 0,
            text: format!("{}...", kind.participle()),
            detail: None,
        }
    }

    /// Build the snapshot for a progress update.
    #[must_use]
    pub fn from_counts(kind: OperationKind, current: u64, total: u64, item: Option<&str>) -> Self {
        let item = item.filter(|s| !s.is_empty());
        let total = effective_total(total);

        let mut text = format!("{}: {current}/{total}", kind.participle());
        if let Some(item) = item {
            text.push_str(" - ");
            text.push_str(short_name(item));
        }

        Self {
            kind,
            percent: percent(current, total),
            text,
            detail: item.map(str::to_string),
        }
    }
}

/// Totals of zero are treated as one so progress never divides by zero.
#[must_use]
pub const fn effective_total(total: u64) -> u64 {
    if total == 0 { 1 } else { total }
}

/// `round(100 * current / total)` clamped to `[0, 100]`, rounding halves up.
#[must_use]
pub fn percent(current: u64, total: u64) -> u8 {
    let total = u128::from(effective_total(total));
    let scaled = (u128::from(current) * 200 + total) / (total * 2);
    scaled.min(100) as u8
}

/// Last non-empty path segment of a file or track identifier.
#[must_use]
pub fn short_name(identifier: &str) -> &str {
    identifier
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(identifier)
}
