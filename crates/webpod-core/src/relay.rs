//! The progress relay: sync preview flow and progress reconciliation.
//!
//! [`ProgressRelay`] is a sans-IO controller. Every input (user action,
//! request outcome, push event) is a method call that updates plain state
//! and returns the [`Effect`]s the caller must perform. What the user sees
//! is always [`ProgressRelay::view`], a pure function of that state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{NotificationDurations, RelayConfig};
use crate::event::{EventPhase, ProgressEvent};
use crate::notification::{Notification, NotificationType};
use crate::preview::PreviewSummary;
use crate::progress::ProgressSnapshot;
use crate::state::{Admission, OperationKind, OperationSlot, OperationState};
use crate::view::{
    ExportTriggerView, IndicatorView, PreviewDialogView, RelayView, SCAN_IDLE_CAPTION,
    SCAN_RUNNING_CAPTION, ScanTriggerView, SyncTriggerView,
};

/// Whether an iPod is connected and usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// An iPod is connected.
    pub connected: bool,
    /// The connected model is supported by libgpod.
    pub supported: bool,
}

impl DeviceStatus {
    /// A connected, supported iPod.
    pub const READY: Self = Self {
        connected: true,
        supported: true,
    };

    /// Whether a sync can target this device.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        self.connected && self.supported
    }
}

/// Library view the user is currently looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryView {
    /// Album grid.
    Albums,
    /// Track table.
    Tracks,
    /// Any view that does not list library content.
    #[default]
    Other,
}

/// A cached view owned by another component that must be reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshTarget {
    /// Tracks stored on the iPod.
    DeviceTracks,
    /// Playlists stored on the iPod.
    DevicePlaylists,
    /// Library album grid.
    LibraryAlbums,
    /// Library track table.
    LibraryTracks,
}

/// Side effect requested by the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch the sync preview; answer with `on_preview_received` or `on_preview_failed`.
    FetchPreview,
    /// Send the start request for the sync opened under `generation`; answer
    /// with `on_start_acknowledged` or `on_start_failed`.
    StartSync {
        /// Generation the optimistic sync state was opened with.
        generation: u64,
    },
    /// Send the start request for the scan or export opened under
    /// `generation`; answer a failure with `on_launch_failed`.
    Launch {
        /// Operation to start.
        kind: OperationKind,
        /// Generation the optimistic state was opened with.
        generation: u64,
    },
    /// Show a toast.
    Notify(Notification),
    /// Reload a view owned by another component.
    Refresh(RefreshTarget),
}

#[derive(Debug, Clone, Default)]
enum PreviewFlow {
    #[default]
    Closed,
    Loading,
    Open(PreviewSummary),
}

/// Controller owning all relay state.
#[derive(Debug, Clone, Default)]
pub struct ProgressRelay {
    durations: NotificationDurations,
    device: DeviceStatus,
    library_view: LibraryView,
    channel_ready: bool,
    changes_pending: bool,
    slots: [OperationSlot; 3],
    snapshots: [Option<ProgressSnapshot>; 3],
    /// Operation whose progress the shared indicator currently shows.
    focus: Option<OperationKind>,
    preview: PreviewFlow,
}

impl ProgressRelay {
    /// Create a relay using the toast durations from `config`.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            durations: config.notifications,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current in-flight state. When several operations run, the one the
    /// indicator shows wins.
    #[must_use]
    pub fn state(&self) -> OperationState {
        self.focus
            .filter(|kind| self.is_running(*kind))
            .or_else(|| OperationKind::ALL.into_iter().find(|kind| self.is_running(*kind)))
            .map_or(OperationState::Idle, OperationState::from)
    }

    /// Whether an operation of `kind` is in flight.
    #[must_use]
    pub fn is_running(&self, kind: OperationKind) -> bool {
        self.slot(kind).is_running()
    }

    /// In-flight state of `kind`.
    #[must_use]
    pub const fn slot(&self, kind: OperationKind) -> &OperationSlot {
        &self.slots[kind.index()]
    }

    /// Last known device status.
    #[must_use]
    pub const fn device_status(&self) -> DeviceStatus {
        self.device
    }

    /// Library view currently shown.
    #[must_use]
    pub const fn library_view(&self) -> LibraryView {
        self.library_view
    }

    /// Summary shown by the open preview dialog.
    #[must_use]
    pub const fn preview(&self) -> Option<&PreviewSummary> {
        match &self.preview {
            PreviewFlow::Open(summary) => Some(summary),
            _ => None,
        }
    }

    /// Whether a preview fetch is outstanding.
    #[must_use]
    pub const fn is_loading_preview(&self) -> bool {
        matches!(self.preview, PreviewFlow::Loading)
    }

    /// Whether push events are being received.
    #[must_use]
    pub const fn is_channel_ready(&self) -> bool {
        self.channel_ready
    }

    // -------------------------------------------------------------------------
    // Context owned by other components
    // -------------------------------------------------------------------------

    /// Record that push-event listeners are registered.
    pub fn mark_channel_ready(&mut self) {
        if !self.channel_ready {
            info!("Push channel ready");
        }
        self.channel_ready = true;
    }

    /// Update the device status. Losing the device closes the preview.
    pub fn set_device_status(&mut self, status: DeviceStatus) {
        if self.device != status {
            debug!(
                "Device status: connected={} supported={}",
                status.connected, status.supported
            );
        }
        self.device = status;
        if !status.is_usable() && !matches!(self.preview, PreviewFlow::Closed) {
            debug!("Device no longer usable, closing sync preview");
            self.preview = PreviewFlow::Closed;
        }
    }

    /// Update the library view currently shown.
    pub fn set_library_view(&mut self, view: LibraryView) {
        self.library_view = view;
    }

    /// Flag library changes that have not been synced yet.
    pub fn mark_changes_pending(&mut self, pending: bool) {
        self.changes_pending = pending;
    }

    fn begin(&mut self, kind: OperationKind) -> u64 {
        let generation = self.slots[kind.index()].begin();
        self.snapshots[kind.index()] = Some(ProgressSnapshot::starting(kind));
        self.focus = Some(kind);
        info!("{} started (generation {})", kind.verb(), generation);
        generation
    }

    // -------------------------------------------------------------------------
    // Sync flow
    // -------------------------------------------------------------------------

    /// The user pressed the sync trigger.
    pub fn request_start(&mut self) -> Vec<Effect> {
        if let Some(reason) = self.start_blocker() {
            debug!("Sync request refused: {}", reason);
            return vec![self.notify(Notification::warning(reason))];
        }

        if !matches!(self.preview, PreviewFlow::Closed) {
            debug!("Sync preview already loading or open");
            return vec![];
        }

        self.preview = PreviewFlow::Loading;
        vec![Effect::FetchPreview]
    }

    fn start_blocker(&self) -> Option<&'static str> {
        if !self.channel_ready {
            Some("Waiting for the server connection")
        } else if self.is_running(OperationKind::Sync) {
            Some("Sync already in progress")
        } else if self.is_running(OperationKind::Scan) {
            Some("Wait for the current scan to finish")
        } else if self.is_running(OperationKind::Export) {
            Some("Wait for the current export to finish")
        } else if !self.device.connected {
            Some("No iPod connected")
        } else if !self.device.supported {
            Some("This iPod model is not supported by libgpod")
        } else {
            None
        }
    }

    /// The preview fetch returned.
    pub fn on_preview_received(&mut self, summary: PreviewSummary) -> Vec<Effect> {
        if !self.is_loading_preview() {
            debug!("Dropping preview that is no longer awaited");
            return vec![];
        }

        if summary.is_empty() {
            self.preview = PreviewFlow::Closed;
            return vec![self.notify(Notification::info("Nothing to sync"))];
        }

        if !summary.will_fit {
            warn!(
                "Sync would not fit: {} MB needed, {} MB free",
                summary.total_size_mb, summary.free_mb
            );
        }
        self.preview = PreviewFlow::Open(summary);
        vec![]
    }

    /// The preview fetch failed.
    pub fn on_preview_failed(&mut self, error: impl std::fmt::Display) -> Vec<Effect> {
        if !self.is_loading_preview() {
            return vec![];
        }
        warn!("Failed to load sync preview: {}", error);
        self.preview = PreviewFlow::Closed;
        vec![self.notify(Notification::error("Failed to load sync preview"))]
    }

    /// The user dismissed the preview dialog.
    pub fn on_cancel(&mut self) {
        if matches!(self.preview, PreviewFlow::Open(_)) {
            debug!("Sync preview cancelled");
            self.preview = PreviewFlow::Closed;
        }
    }

    /// The user confirmed the preview.
    pub fn on_confirm(&mut self) -> Vec<Effect> {
        match &self.preview {
            PreviewFlow::Open(summary) if summary.will_fit => {}
            PreviewFlow::Open(_) => {
                warn!("Confirm ignored: tracks do not fit on the iPod");
                return vec![];
            }
            _ => return vec![],
        }

        self.preview = PreviewFlow::Closed;
        self.changes_pending = false;
        let generation = self.begin(OperationKind::Sync);
        vec![Effect::StartSync { generation }]
    }

    /// The server accepted the start request.
    pub fn on_start_acknowledged(&mut self, generation: u64) -> Vec<Effect> {
        debug!("Start request for generation {} acknowledged", generation);
        if self.is_running(OperationKind::Sync) {
            vec![self.notify(Notification::info("Sync started"))]
        } else {
            vec![]
        }
    }

    /// The start request failed; roll back the optimistic sync state.
    pub fn on_start_failed(&mut self, generation: u64, error: impl std::fmt::Display) -> Vec<Effect> {
        self.on_launch_failed(OperationKind::Sync, generation, error)
    }

    // -------------------------------------------------------------------------
    // Scans and exports
    // -------------------------------------------------------------------------

    /// The user pressed the scan trigger.
    pub fn request_scan(&mut self) -> Vec<Effect> {
        self.request_launch(OperationKind::Scan)
    }

    /// The user asked to export the iPod's tracks.
    pub fn request_export(&mut self) -> Vec<Effect> {
        self.request_launch(OperationKind::Export)
    }

    fn request_launch(&mut self, kind: OperationKind) -> Vec<Effect> {
        if let Some(reason) = self.launch_blocker(kind) {
            debug!("{} request refused: {}", kind.verb(), reason);
            return vec![self.notify(Notification::warning(reason))];
        }
        let generation = self.begin(kind);
        vec![Effect::Launch { kind, generation }]
    }

    fn launch_blocker(&self, kind: OperationKind) -> Option<String> {
        if !self.channel_ready {
            Some("Waiting for the server connection".to_string())
        } else if self.is_running(kind) {
            Some(format!("{} already in progress", kind.verb()))
        } else if self.is_running(OperationKind::Sync) {
            Some("Wait for the current sync to finish".to_string())
        } else if kind == OperationKind::Export && !self.device.connected {
            Some("No iPod connected".to_string())
        } else if kind == OperationKind::Export && !self.device.supported {
            Some("This iPod model is not supported by libgpod".to_string())
        } else {
            None
        }
    }

    /// A start request failed; roll back the state opened under `generation`.
    pub fn on_launch_failed(
        &mut self,
        kind: OperationKind,
        generation: u64,
        error: impl std::fmt::Display,
    ) -> Vec<Effect> {
        if !self.slots[kind.index()].settle_if_running(generation) {
            debug!(
                "Start failure for {} generation {} arrived after the {} moved on",
                kind, generation, kind
            );
            return vec![];
        }

        warn!("Failed to start {}: {}", kind, error);
        self.clear_progress(kind);
        vec![self.notify(Notification::error(format!("Failed to start {kind}: {error}")))]
    }

    // -------------------------------------------------------------------------
    // Push events
    // -------------------------------------------------------------------------

    /// Route a decoded push event.
    pub fn on_push_event(&mut self, event: ProgressEvent) -> Vec<Effect> {
        match event.phase {
            EventPhase::Progress => {
                self.on_progress_event(&event);
                vec![]
            }
            EventPhase::Complete => self.on_complete_event(&event),
            EventPhase::Error => self.on_error_event(&event),
        }
    }

    /// Update the indicator from a progress event.
    pub fn on_progress_event(&mut self, event: &ProgressEvent) {
        let kind = event.kind;
        let slot = &mut self.slots[kind.index()];
        if slot.admit_progress(event.generation, event.current, event.total) == Admission::Stale {
            debug!("Dropping stale {} progress {}/{}", kind, event.current, event.total);
            return;
        }

        self.snapshots[kind.index()] = Some(ProgressSnapshot::from_counts(
            kind,
            event.current,
            event.total,
            event.label.as_deref(),
        ));
        self.focus = Some(kind);
    }

    /// Settle an operation that finished.
    pub fn on_complete_event(&mut self, event: &ProgressEvent) -> Vec<Effect> {
        let kind = event.kind;
        let slot = &mut self.slots[kind.index()];
        if slot.admit_terminal(event.generation, event.current, event.total) == Admission::Stale {
            debug!("Dropping duplicate {} completion", kind);
            return vec![];
        }
        self.clear_progress(kind);

        match kind {
            OperationKind::Scan => {
                info!("Scan complete: {} tracks", event.total);
                let mut effects = vec![self.notify(Notification::success(format!(
                    "Scan complete: {} tracks found",
                    event.total
                )))];
                match self.library_view {
                    LibraryView::Albums => effects.push(Effect::Refresh(RefreshTarget::LibraryAlbums)),
                    LibraryView::Tracks => effects.push(Effect::Refresh(RefreshTarget::LibraryTracks)),
                    LibraryView::Other => {}
                }
                effects
            }
            OperationKind::Sync => {
                let notification = if event.success.unwrap_or(false) {
                    info!("Sync complete");
                    Notification::success("Sync complete")
                } else {
                    let reason = event.error.as_deref().unwrap_or("unknown error");
                    warn!("Sync failed: {}", reason);
                    Notification::error(format!("Sync failed: {reason}"))
                };
                let mut effects = vec![self.notify(notification)];
                if self.device.connected {
                    effects.push(Effect::Refresh(RefreshTarget::DeviceTracks));
                    effects.push(Effect::Refresh(RefreshTarget::DevicePlaylists));
                }
                effects
            }
            OperationKind::Export => {
                info!(
                    "Export complete: {} exported, {} skipped, {} errors",
                    event.current, event.skipped, event.errors
                );
                let mut message = format!("Export complete: {} tracks exported", event.current);
                if event.skipped > 0 {
                    message.push_str(&format!(", {} skipped", event.skipped));
                }
                if event.errors > 0 {
                    message.push_str(&format!(", {} errors", event.errors));
                }
                vec![self.notify(Notification::success(message))]
            }
        }
    }

    /// Settle an operation that aborted.
    pub fn on_error_event(&mut self, event: &ProgressEvent) -> Vec<Effect> {
        let kind = event.kind;
        let slot = &mut self.slots[kind.index()];
        if slot.admit_terminal(event.generation, event.current, event.total) == Admission::Stale {
            debug!("Dropping duplicate {} error", kind);
            return vec![];
        }
        self.clear_progress(kind);

        let message = event.error.as_deref().unwrap_or("unknown error");
        warn!("{} error: {}", kind.verb(), message);
        vec![self.notify(Notification::error(format!("{} error: {message}", kind.verb())))]
    }

    fn clear_progress(&mut self, kind: OperationKind) {
        self.snapshots[kind.index()] = None;
        if self.focus == Some(kind) {
            self.focus = OperationKind::ALL
                .into_iter()
                .find(|other| self.is_running(*other) && self.snapshots[other.index()].is_some());
        }
    }

    fn notify(&self, notification: Notification) -> Effect {
        let duration_ms = match notification.notification_type {
            NotificationType::Error => self.durations.error_ms,
            _ => self.durations.default_ms,
        };
        Effect::Notify(notification.with_duration(duration_ms))
    }

    // -------------------------------------------------------------------------
    // Projection
    // -------------------------------------------------------------------------

    /// Everything the user sees.
    #[must_use]
    pub fn view(&self) -> RelayView {
        let indicator = self
            .focus
            .and_then(|kind| self.snapshots[kind.index()].as_ref())
            .map(IndicatorView::showing)
            .unwrap_or_default();

        let sync_disabled = !self.device.is_usable() || self.is_running(OperationKind::Sync);
        let scanning = self.is_running(OperationKind::Scan);
        let exporting = self.is_running(OperationKind::Export);

        RelayView {
            state: self.state(),
            indicator,
            sync_trigger: SyncTriggerView {
                disabled: sync_disabled,
                pulse: self.changes_pending && !sync_disabled,
            },
            scan_trigger: ScanTriggerView {
                disabled: scanning,
                caption: (if scanning {
                    SCAN_RUNNING_CAPTION
                } else {
                    SCAN_IDLE_CAPTION
                })
                .to_string(),
            },
            export_trigger: ExportTriggerView {
                disabled: exporting
                    || !self.device.is_usable()
                    || self.is_running(OperationKind::Sync),
            },
            preview: match &self.preview {
                PreviewFlow::Open(summary) => PreviewDialogView::showing(summary),
                _ => PreviewDialogView::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_relay() -> ProgressRelay {
        let mut relay = ProgressRelay::new(&RelayConfig::default());
        relay.mark_channel_ready();
        relay.set_device_status(DeviceStatus::READY);
        relay
    }

    fn summary(track_count: u64, will_fit: bool) -> PreviewSummary {
        PreviewSummary {
            track_count,
            total_size_mb: 12.0,
            free_mb: 500.0,
            will_fit,
            pending_tracks: vec![],
        }
    }

    fn messages(effects: &[Effect]) -> Vec<(NotificationType, String)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Notify(n) => Some((n.notification_type, n.message.clone())),
                _ => None,
            })
            .collect()
    }

    fn confirmed_relay() -> (ProgressRelay, u64) {
        let mut relay = ready_relay();
        relay.request_start();
        relay.on_preview_received(summary(3, true));
        let effects = relay.on_confirm();
        let Some(Effect::StartSync { generation }) = effects.first().cloned() else {
            unreachable!("confirm must start the sync");
        };
        (relay, generation)
    }

    #[test]
    fn test_request_start_fetches_preview() {
        let mut relay = ready_relay();
        assert_eq!(relay.request_start(), vec![Effect::FetchPreview]);
        assert!(relay.is_loading_preview());
        // A second press while loading does nothing.
        assert!(relay.request_start().is_empty());
    }

    #[test]
    fn test_request_start_without_device_warns() {
        let mut relay = ProgressRelay::default();
        relay.mark_channel_ready();
        let effects = relay.request_start();
        assert_eq!(
            messages(&effects),
            vec![(NotificationType::Warning, "No iPod connected".to_string())]
        );
        assert!(!relay.is_loading_preview());
        assert_eq!(relay.state(), OperationState::Idle);
    }

    #[test]
    fn test_request_start_unsupported_model_warns() {
        let mut relay = ProgressRelay::default();
        relay.mark_channel_ready();
        relay.set_device_status(DeviceStatus {
            connected: true,
            supported: false,
        });
        let effects = relay.request_start();
        assert_eq!(
            messages(&effects)[0].1,
            "This iPod model is not supported by libgpod"
        );
    }

    #[test]
    fn test_request_start_before_channel_ready_warns() {
        let mut relay = ProgressRelay::default();
        relay.set_device_status(DeviceStatus::READY);
        let effects = relay.request_start();
        assert_eq!(messages(&effects)[0].0, NotificationType::Warning);
        assert!(!relay.is_loading_preview());
    }

    #[test]
    fn test_request_start_while_scanning_warns() {
        let mut relay = ready_relay();
        relay.request_scan();
        let effects = relay.request_start();
        assert_eq!(messages(&effects)[0].1, "Wait for the current scan to finish");
        assert_eq!(relay.state(), OperationState::Scanning);
    }

    #[test]
    fn test_request_start_while_syncing_warns() {
        let (mut relay, _) = confirmed_relay();
        let effects = relay.request_start();
        assert_eq!(messages(&effects)[0].1, "Sync already in progress");
    }

    #[test]
    fn test_empty_preview_reports_nothing_to_do() {
        let mut relay = ready_relay();
        relay.request_start();
        let effects = relay.on_preview_received(summary(0, true));
        assert_eq!(
            messages(&effects),
            vec![(NotificationType::Info, "Nothing to sync".to_string())]
        );
        assert!(!relay.view().preview.open);
        assert_eq!(relay.state(), OperationState::Idle);
    }

    #[test]
    fn test_capacity_guard() {
        let mut relay = ready_relay();
        relay.request_start();
        relay.on_preview_received(summary(3, false));
        assert!(relay.view().preview.confirm_disabled);
        assert!(relay.on_confirm().is_empty());
        assert_eq!(relay.state(), OperationState::Idle);
        assert!(relay.view().preview.open);

        relay.on_cancel();
        relay.request_start();
        relay.on_preview_received(summary(3, true));
        assert!(!relay.view().preview.confirm_disabled);
    }

    #[test]
    fn test_preview_failure_leaves_state_unchanged() {
        let mut relay = ready_relay();
        relay.request_start();
        let effects = relay.on_preview_failed("connection refused");
        assert_eq!(
            messages(&effects),
            vec![(NotificationType::Error, "Failed to load sync preview".to_string())]
        );
        assert_eq!(relay.state(), OperationState::Idle);
        assert!(!relay.view().preview.open);
    }

    #[test]
    fn test_confirm_starts_sync() {
        let (relay, generation) = confirmed_relay();
        assert_eq!(generation, 1);
        assert_eq!(relay.state(), OperationState::Syncing);
        let view = relay.view();
        assert!(!view.preview.open);
        assert!(view.indicator.visible);
        assert_eq!(view.indicator.percent, 0);
        assert_eq!(view.indicator.text, "Syncing...");
        assert!(view.sync_trigger.disabled);
    }

    #[test]
    fn test_confirm_clears_pulse() {
        let mut relay = ready_relay();
        relay.mark_changes_pending(true);
        assert!(relay.view().sync_trigger.pulse);
        relay.request_start();
        relay.on_preview_received(summary(1, true));
        relay.on_confirm();
        assert!(!relay.view().sync_trigger.pulse);
    }

    #[test]
    fn test_start_failure_rolls_back() {
        let (mut relay, generation) = confirmed_relay();
        let effects = relay.on_start_failed(generation, "503");
        assert_eq!(relay.state(), OperationState::Idle);
        let view = relay.view();
        assert!(!view.indicator.visible);
        assert!(!view.sync_trigger.disabled);
        assert_eq!(messages(&effects)[0].1, "Failed to start sync: 503");
    }

    #[test]
    fn test_start_failure_after_completion_is_ignored() {
        let (mut relay, generation) = confirmed_relay();
        let mut done = ProgressEvent::complete(OperationKind::Sync);
        done.success = Some(true);
        relay.on_push_event(done);
        assert!(relay.on_start_failed(generation, "late").is_empty());
    }

    #[test]
    fn test_sync_progress_updates_indicator() {
        let (mut relay, _) = confirmed_relay();
        relay.on_push_event(ProgressEvent::progress(
            OperationKind::Sync,
            37,
            120,
            Some("Song.mp3".to_string()),
        ));
        let view = relay.view();
        assert_eq!(view.indicator.text, "Syncing: 37/120 - Song.mp3");
        assert_eq!(view.indicator.percent, 31);
    }

    #[test]
    fn test_sync_complete_returns_to_idle_and_refreshes() {
        let (mut relay, _) = confirmed_relay();
        let mut done = ProgressEvent::complete(OperationKind::Sync);
        done.success = Some(true);
        let effects = relay.on_push_event(done);
        assert_eq!(relay.state(), OperationState::Idle);
        assert!(!relay.view().indicator.visible);
        assert_eq!(messages(&effects)[0], (NotificationType::Success, "Sync complete".to_string()));
        assert!(effects.contains(&Effect::Refresh(RefreshTarget::DeviceTracks)));
        assert!(effects.contains(&Effect::Refresh(RefreshTarget::DevicePlaylists)));
    }

    #[test]
    fn test_sync_complete_without_device_skips_refresh() {
        let (mut relay, _) = confirmed_relay();
        relay.set_device_status(DeviceStatus::default());
        let effects = relay.on_push_event(ProgressEvent {
            success: Some(false),
            error: Some("iPod ejected".to_string()),
            ..ProgressEvent::complete(OperationKind::Sync)
        });
        assert_eq!(messages(&effects)[0].1, "Sync failed: iPod ejected");
        assert!(!effects.iter().any(|e| matches!(e, Effect::Refresh(_))));
        assert!(relay.view().sync_trigger.disabled);
    }

    #[test]
    fn test_sync_failure_without_message() {
        let (mut relay, _) = confirmed_relay();
        let effects = relay.on_push_event(ProgressEvent::complete(OperationKind::Sync));
        assert_eq!(messages(&effects)[0].1, "Sync failed: unknown error");
    }

    #[test]
    fn test_repeated_progress_does_not_revive_indicator() {
        let (mut relay, _) = confirmed_relay();
        relay.on_push_event(ProgressEvent::progress(OperationKind::Sync, 120, 120, None));
        relay.on_push_event(ProgressEvent {
            success: Some(true),
            ..ProgressEvent::complete(OperationKind::Sync)
        });
        relay.on_push_event(ProgressEvent::progress(OperationKind::Sync, 120, 120, None));
        assert!(!relay.view().indicator.visible);
        assert_eq!(relay.state(), OperationState::Idle);
    }

    #[test]
    fn test_second_export_reopens_indicator() {
        let mut relay = ready_relay();
        relay.on_push_event(ProgressEvent::progress(OperationKind::Export, 1, 4, None));
        relay.on_push_event(ProgressEvent::complete(OperationKind::Export));

        relay.on_push_event(ProgressEvent::progress(OperationKind::Export, 1, 3, None));
        assert_eq!(relay.state(), OperationState::Exporting);
        assert!(relay.view().indicator.visible);

        let effects = relay.on_push_event(ProgressEvent {
            current: 3,
            ..ProgressEvent::complete(OperationKind::Export)
        });
        assert_eq!(messages(&effects)[0].1, "Export complete: 3 tracks exported");
        assert_eq!(relay.state(), OperationState::Idle);
    }

    #[test]
    fn test_second_scan_disables_trigger_again() {
        let mut relay = ready_relay();
        relay.on_push_event(ProgressEvent::progress(OperationKind::Scan, 10, 10, None));
        relay.on_push_event(ProgressEvent {
            current: 10,
            total: 10,
            ..ProgressEvent::complete(OperationKind::Scan)
        });
        assert!(!relay.view().scan_trigger.disabled);

        relay.on_push_event(ProgressEvent::progress(OperationKind::Scan, 1, 10, None));
        let view = relay.view();
        assert_eq!(view.state, OperationState::Scanning);
        assert!(view.scan_trigger.disabled);
        assert_eq!(view.indicator.text, "Scanning: 1/10");
    }

    #[test]
    fn test_tagged_sync_after_failed_start() {
        let (mut relay, generation) = confirmed_relay();
        relay.on_start_failed(generation, "503");

        relay.request_start();
        relay.on_preview_received(summary(3, true));
        relay.on_confirm();
        relay.on_push_event(ProgressEvent::progress(OperationKind::Sync, 1, 3, None).with_generation(1));
        assert_eq!(relay.view().indicator.text, "Syncing: 1/3");

        let effects = relay.on_push_event(ProgressEvent {
            success: Some(true),
            ..ProgressEvent::complete(OperationKind::Sync).with_generation(1)
        });
        assert_eq!(messages(&effects)[0].1, "Sync complete");
        assert_eq!(relay.state(), OperationState::Idle);
    }

    #[test]
    fn test_duplicate_completion_notifies_once() {
        let mut relay = ready_relay();
        relay.request_export();
        let done = ProgressEvent {
            current: 10,
            skipped: 2,
            errors: 1,
            ..ProgressEvent::complete(OperationKind::Export)
        };
        let first = relay.on_push_event(done.clone());
        assert_eq!(
            messages(&first)[0].1,
            "Export complete: 10 tracks exported, 2 skipped, 1 errors"
        );
        assert!(relay.on_push_event(done).is_empty());
    }

    #[test]
    fn test_export_message_omits_zero_counts() {
        let mut relay = ready_relay();
        let effects = relay.on_push_event(ProgressEvent {
            current: 4,
            ..ProgressEvent::complete(OperationKind::Export)
        });
        assert_eq!(messages(&effects)[0].1, "Export complete: 4 tracks exported");
    }

    #[test]
    fn test_export_error() {
        let mut relay = ready_relay();
        relay.on_push_event(ProgressEvent::progress(OperationKind::Export, 1, 5, None));
        assert_eq!(relay.state(), OperationState::Exporting);
        let effects = relay.on_push_event(ProgressEvent::failed(OperationKind::Export, "disk full"));
        assert_eq!(
            messages(&effects),
            vec![(NotificationType::Error, "Export error: disk full".to_string())]
        );
        assert_eq!(relay.state(), OperationState::Idle);
        assert!(!relay.view().indicator.visible);
    }

    #[test]
    fn test_scan_flow_refreshes_visible_library_view() {
        let mut relay = ready_relay();
        relay.set_library_view(LibraryView::Albums);
        relay.on_push_event(ProgressEvent::progress(
            OperationKind::Scan,
            3,
            10,
            Some("/a/b/c/track.flac".to_string()),
        ));
        let view = relay.view();
        assert!(view.scan_trigger.disabled);
        assert_eq!(view.indicator.text, "Scanning: 3/10 - track.flac");
        assert_eq!(view.indicator.detail.as_deref(), Some("/a/b/c/track.flac"));

        let effects = relay.on_push_event(ProgressEvent {
            total: 812,
            ..ProgressEvent::complete(OperationKind::Scan)
        });
        assert_eq!(messages(&effects)[0].1, "Scan complete: 812 tracks found");
        assert!(effects.contains(&Effect::Refresh(RefreshTarget::LibraryAlbums)));
        let view = relay.view();
        assert!(!view.scan_trigger.disabled);
        assert_eq!(view.scan_trigger.caption, SCAN_IDLE_CAPTION);
    }

    #[test]
    fn test_scan_complete_on_other_view_refreshes_nothing() {
        let mut relay = ready_relay();
        let effects = relay.on_push_event(ProgressEvent::complete(OperationKind::Scan));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Refresh(_))));
    }

    #[test]
    fn test_indicator_falls_back_to_other_running_operation() {
        let mut relay = ready_relay();
        relay.on_push_event(ProgressEvent::progress(OperationKind::Scan, 5, 10, None));
        relay.on_push_event(ProgressEvent::progress(OperationKind::Export, 1, 4, None));
        assert_eq!(relay.state(), OperationState::Exporting);

        relay.on_push_event(ProgressEvent::complete(OperationKind::Export));
        let view = relay.view();
        assert!(view.indicator.visible);
        assert_eq!(view.indicator.text, "Scanning: 5/10");
        assert_eq!(view.state, OperationState::Scanning);
    }

    #[test]
    fn test_device_loss_closes_preview() {
        let mut relay = ready_relay();
        relay.request_start();
        relay.on_preview_received(summary(2, true));
        relay.set_device_status(DeviceStatus::default());
        assert!(!relay.view().preview.open);
        assert!(relay.on_confirm().is_empty());
    }

    #[test]
    fn test_request_scan_launches_and_disables_trigger() {
        let mut relay = ready_relay();
        let effects = relay.request_scan();
        assert_eq!(
            effects,
            vec![Effect::Launch {
                kind: OperationKind::Scan,
                generation: 1
            }]
        );
        let view = relay.view();
        assert!(view.scan_trigger.disabled);
        assert_eq!(view.scan_trigger.caption, SCAN_RUNNING_CAPTION);

        let again = relay.request_scan();
        assert_eq!(
            messages(&again),
            vec![(NotificationType::Warning, "Scan already in progress".to_string())]
        );
    }

    #[test]
    fn test_export_needs_usable_device() {
        let mut relay = ready_relay();
        relay.set_device_status(DeviceStatus::default());
        assert!(relay.view().export_trigger.disabled);
        let effects = relay.request_export();
        assert_eq!(messages(&effects)[0].1, "No iPod connected");
        assert_eq!(relay.state(), OperationState::Idle);
    }

    #[test]
    fn test_export_waits_for_sync() {
        let (mut relay, _) = confirmed_relay();
        assert!(relay.view().export_trigger.disabled);
        let effects = relay.request_export();
        assert_eq!(messages(&effects)[0].1, "Wait for the current sync to finish");
    }

    #[test]
    fn test_launch_failure_rolls_back_export() {
        let mut relay = ready_relay();
        let Some(Effect::Launch { generation, .. }) = relay.request_export().first().cloned() else {
            unreachable!("export must launch");
        };
        assert_eq!(relay.state(), OperationState::Exporting);
        assert!(relay.view().export_trigger.disabled);

        let effects = relay.on_launch_failed(OperationKind::Export, generation, "no space");
        assert_eq!(messages(&effects)[0].1, "Failed to start export: no space");
        assert_eq!(relay.state(), OperationState::Idle);
        assert!(!relay.view().export_trigger.disabled);
        assert!(relay.on_launch_failed(OperationKind::Export, generation, "again").is_empty());
    }

    #[test]
    fn test_notifications_use_configured_durations() {
        let mut config = RelayConfig::default();
        config.notifications.error_ms = 42;
        let mut relay = ProgressRelay::new(&config);
        relay.mark_channel_ready();
        relay.set_device_status(DeviceStatus::READY);
        relay.request_start();
        let effects = relay.on_preview_failed("boom");
        let Some(Effect::Notify(n)) = effects.first() else {
            unreachable!("failure must notify");
        };
        assert_eq!(n.duration_ms, Some(42));
    }
}
