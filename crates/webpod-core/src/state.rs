//! Per-operation in-flight state with generation guards.
//!
//! Each operation kind owns one [`OperationSlot`]. A slot is opened with a
//! generation number and settled by a terminal event; a settled generation
//! can never be revived by a late or duplicated event, while a later run of
//! the same kind opens a fresh one.

use serde::{Deserialize, Serialize};

/// The server-side operations whose progress the relay displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Library scan.
    Scan,
    /// Copy of pending tracks to the iPod.
    Sync,
    /// Export of iPod tracks back to disk.
    Export,
}

impl OperationKind {
    /// All kinds, in display priority order.
    pub const ALL: [Self; 3] = [Self::Scan, Self::Sync, Self::Export];

    /// Capitalized verb used in labels and messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Scan => "Scan",
            Self::Sync => "Sync",
            Self::Export => "Export",
        }
    }

    /// Present participle used in progress labels ("Syncing").
    #[must_use]
    pub const fn participle(self) -> &'static str {
        match self {
            Self::Scan => "Scanning",
            Self::Sync => "Syncing",
            Self::Export => "Exporting",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Scan => 0,
            Self::Sync => 1,
            Self::Export => 2,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::Sync => write!(f, "sync"),
            Self::Export => write!(f, "export"),
        }
    }
}

/// Observable in-flight state of the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    /// Nothing running.
    #[default]
    Idle,
    /// A library scan is running.
    Scanning,
    /// A sync is running.
    Syncing,
    /// An export is running.
    Exporting,
}

impl From<OperationKind> for OperationState {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Scan => Self::Scanning,
            OperationKind::Sync => Self::Syncing,
            OperationKind::Export => Self::Exporting,
        }
    }
}

/// Lifecycle of a single operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotPhase {
    /// Never ran since the relay started.
    #[default]
    Idle,
    /// Running under the given local generation.
    Running(u64),
    /// Last run settled under the given local generation.
    Settled(u64),
}

/// Outcome of offering an event to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The event belongs to the running local generation.
    Accepted(u64),
    /// The event is late or duplicated and must be ignored.
    Stale,
}

/// Counters a run has reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Reached {
    current: u64,
    total: u64,
}

impl Reached {
    fn record(&mut self, current: u64, total: u64) {
        self.current = self.current.max(current);
        if total > 0 {
            self.total = total;
        }
    }

    /// A report that adds nothing to a finished run of the same size.
    const fn covers(self, current: u64, total: u64) -> bool {
        total == self.total && current >= self.current
    }
}

/// In-flight state of one operation kind.
///
/// Local generations number runs as the relay sees them. Server tags are
/// tracked separately: a run opened locally adopts the first tag the server
/// reports for it, and only settled tags are compared against later ones.
#[derive(Debug, Clone, Default)]
pub struct OperationSlot {
    phase: SlotPhase,
    /// Highest local generation ever opened.
    latest: u64,
    /// Server tag of the running generation.
    running_tag: Option<u64>,
    /// Highest server tag that has settled.
    settled_tag: Option<u64>,
    /// Counters of the running or last settled run.
    reached: Reached,
}

impl OperationSlot {
    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SlotPhase {
        self.phase
    }

    /// Whether an operation of this kind is in flight.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, SlotPhase::Running(_))
    }

    /// Generation of the running operation, if any.
    #[must_use]
    pub const fn running_generation(&self) -> Option<u64> {
        match self.phase {
            SlotPhase::Running(generation) => Some(generation),
            _ => None,
        }
    }

    /// Open a new local generation.
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.phase = SlotPhase::Running(self.latest);
        self.running_tag = None;
        self.reached = Reached::default();
        self.latest
    }

    /// Offer a progress event reporting `current` of `total` items.
    ///
    /// Untagged progress for a settled slot starts a new run unless it
    /// repeats counters the settled run already reached.
    pub fn admit_progress(&mut self, tag: Option<u64>, current: u64, total: u64) -> Admission {
        let admission = match tag {
            Some(tag) => self.admit_tagged(tag),
            None => match self.phase {
                SlotPhase::Running(generation) => Admission::Accepted(generation),
                SlotPhase::Settled(_) if self.reached.covers(current, total) => Admission::Stale,
                SlotPhase::Idle | SlotPhase::Settled(_) => Admission::Accepted(self.begin()),
            },
        };
        if let Admission::Accepted(_) = admission {
            self.reached.record(current, total);
        }
        admission
    }

    /// Offer a terminal event; an accepted terminal settles the slot.
    ///
    /// An untagged terminal for a settled slot is a duplicate delivery.
    pub fn admit_terminal(&mut self, tag: Option<u64>, current: u64, total: u64) -> Admission {
        let admission = match tag {
            Some(tag) => self.admit_tagged(tag),
            None => match self.phase {
                SlotPhase::Running(generation) => Admission::Accepted(generation),
                SlotPhase::Idle => Admission::Accepted(self.begin()),
                SlotPhase::Settled(_) => Admission::Stale,
            },
        };
        if let Admission::Accepted(generation) = admission {
            self.reached.record(current, total);
            self.settle(generation);
        }
        admission
    }

    /// Settle `generation` if it is the running one. Returns whether it was.
    pub fn settle_if_running(&mut self, generation: u64) -> bool {
        if self.running_generation() == Some(generation) {
            self.settle(generation);
            true
        } else {
            false
        }
    }

    fn admit_tagged(&mut self, tag: u64) -> Admission {
        if self.settled_tag.is_some_and(|settled| tag <= settled) {
            return Admission::Stale;
        }
        match (self.phase, self.running_tag) {
            (SlotPhase::Running(_), Some(running)) if tag < running => Admission::Stale,
            (SlotPhase::Running(generation), Some(running)) if tag == running => {
                Admission::Accepted(generation)
            }
            (SlotPhase::Running(generation), None) => {
                self.running_tag = Some(tag);
                Admission::Accepted(generation)
            }
            _ => {
                let generation = self.begin();
                self.running_tag = Some(tag);
                Admission::Accepted(generation)
            }
        }
    }

    fn settle(&mut self, generation: u64) {
        if let Some(tag) = self.running_tag.take() {
            self.settled_tag = Some(self.settled_tag.map_or(tag, |settled| settled.max(tag)));
        }
        self.phase = SlotPhase::Settled(generation);
    }
}
