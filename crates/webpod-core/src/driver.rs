//! Async driver wiring the relay to a remote service and a render surface.
//!
//! The driver owns a [`ProgressRelay`] behind a `RefCell`. Every
//! entry point applies one transition, renders the resulting view once, and
//! then performs the effects. The relay is never borrowed across an await,
//! so push events delivered while a request is outstanding are applied
//! immediately.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::{Error, RequestError, Result};
use crate::event::ProgressEvent;
use crate::notification::Notification;
use crate::preview::PreviewSummary;
use crate::relay::{DeviceStatus, Effect, LibraryView, ProgressRelay, RefreshTarget};
use crate::state::{OperationKind, OperationState};
use crate::view::RelayView;

/// Request/response calls to the server.
///
/// Implementations enforce `timeout` and report an elapsed timeout as
/// [`RequestError::TimedOut`].
pub trait RelayService {
    /// Ask the server what a sync would copy.
    fn fetch_preview(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = std::result::Result<PreviewSummary, RequestError>>;

    /// Ask the server to start the sync.
    fn start_sync(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = std::result::Result<(), RequestError>>;

    /// Ask the server to start a scan or an export.
    fn launch(
        &self,
        kind: OperationKind,
        timeout: Duration,
    ) -> impl Future<Output = std::result::Result<(), RequestError>>;
}

/// Where the relay's output goes.
#[cfg_attr(test, mockall::automock)]
pub trait RelaySurface {
    /// Draw the current view.
    fn render(&self, view: &RelayView);

    /// Show a toast.
    fn notify(&self, notification: Notification);

    /// Reload a view owned by another component.
    fn refresh(&self, target: RefreshTarget);
}

/// Fired once all push-event listeners are registered.
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<bool>,
}

impl ReadySignal {
    /// Mark the push channel as ready.
    pub fn fire(self) {
        self.tx.send_replace(true);
    }
}

/// Awaits a [`ReadySignal`].
#[derive(Debug)]
pub struct ReadyWaiter {
    rx: watch::Receiver<bool>,
}

impl ReadyWaiter {
    /// Wait for the signal. Fails if it was dropped without firing.
    pub async fn wait(mut self) -> Result<()> {
        self.rx
            .wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| Error::ChannelClosed)
    }
}

/// Create a connected readiness pair.
#[must_use]
pub fn ready_channel() -> (ReadySignal, ReadyWaiter) {
    let (tx, rx) = watch::channel(false);
    (ReadySignal { tx }, ReadyWaiter { rx })
}

enum Request {
    Preview,
    Start { generation: u64 },
    Launch { kind: OperationKind, generation: u64 },
}

/// Drives a [`ProgressRelay`] against a service and a surface.
pub struct RelayDriver<S, U> {
    relay: RefCell<ProgressRelay>,
    service: S,
    surface: U,
    config: RelayConfig,
}

impl<S: RelayService, U: RelaySurface> RelayDriver<S, U> {
    /// Create a driver. Nothing is rendered until the first transition or
    /// an explicit [`Self::render`].
    pub fn new(config: RelayConfig, service: S, surface: U) -> Self {
        Self {
            relay: RefCell::new(ProgressRelay::new(&config)),
            service,
            surface,
            config,
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Current projection of the relay state.
    pub fn view(&self) -> RelayView {
        self.relay.borrow().view()
    }

    /// Current in-flight state.
    pub fn state(&self) -> OperationState {
        self.relay.borrow().state()
    }

    /// Draw the current view without a transition.
    pub fn render(&self) {
        let view = self.view();
        self.surface.render(&view);
    }

    /// Wait for the push channel, then accept sync requests.
    pub async fn attach(&self, waiter: ReadyWaiter) -> Result<()> {
        waiter.wait().await?;
        let effects = self.apply(|relay| {
            relay.mark_channel_ready();
            Vec::new()
        });
        self.settle(effects);
        Ok(())
    }

    /// The user pressed the sync trigger.
    pub async fn request_start(&self) {
        let effects = self.apply(ProgressRelay::request_start);
        let requests = self.emit(effects);
        self.send(requests).await;
    }

    /// The user confirmed the preview.
    pub async fn confirm(&self) {
        let effects = self.apply(ProgressRelay::on_confirm);
        let requests = self.emit(effects);
        self.send(requests).await;
    }

    /// The user dismissed the preview.
    pub fn cancel(&self) {
        self.apply(|relay| {
            relay.on_cancel();
            Vec::new()
        });
    }

    /// The user pressed the scan trigger.
    pub async fn request_scan(&self) {
        let effects = self.apply(ProgressRelay::request_scan);
        let requests = self.emit(effects);
        self.send(requests).await;
    }

    /// The user asked to export the iPod's tracks.
    pub async fn request_export(&self) {
        let effects = self.apply(ProgressRelay::request_export);
        let requests = self.emit(effects);
        self.send(requests).await;
    }

    /// Decode and apply a push event. Undecodable events are logged and dropped.
    pub fn handle_push(&self, name: &str, payload: serde_json::Value) {
        match ProgressEvent::decode(&self.config.events, name, payload) {
            Ok(event) => self.handle_event(event),
            Err(e) => warn!("Dropping push event {}: {}", name, e),
        }
    }

    /// Apply an already decoded push event.
    pub fn handle_event(&self, event: ProgressEvent) {
        let effects = self.apply(|relay| relay.on_push_event(event));
        self.settle(effects);
    }

    /// Update the device status.
    pub fn set_device_status(&self, status: DeviceStatus) {
        self.apply(|relay| {
            relay.set_device_status(status);
            Vec::new()
        });
    }

    /// Update the library view currently shown.
    pub fn set_library_view(&self, view: LibraryView) {
        self.relay.borrow_mut().set_library_view(view);
    }

    /// Flag library changes that have not been synced yet.
    pub fn mark_changes_pending(&self, pending: bool) {
        self.apply(|relay| {
            relay.mark_changes_pending(pending);
            Vec::new()
        });
    }

    fn apply<F>(&self, transition: F) -> Vec<Effect>
    where
        F: FnOnce(&mut ProgressRelay) -> Vec<Effect>,
    {
        let (effects, view) = {
            let mut relay = self.relay.borrow_mut();
            let effects = transition(&mut *relay);
            (effects, relay.view())
        };
        self.surface.render(&view);
        effects
    }

    /// Perform the effects that need no I/O and return the requests to send.
    fn emit(&self, effects: Vec<Effect>) -> VecDeque<Request> {
        let mut requests = VecDeque::new();
        for effect in effects {
            match effect {
                Effect::Notify(notification) => self.surface.notify(notification),
                Effect::Refresh(target) => self.surface.refresh(target),
                Effect::FetchPreview => requests.push_back(Request::Preview),
                Effect::StartSync { generation } => requests.push_back(Request::Start { generation }),
                Effect::Launch { kind, generation } => {
                    requests.push_back(Request::Launch { kind, generation });
                }
            }
        }
        requests
    }

    fn settle(&self, effects: Vec<Effect>) {
        let requests = self.emit(effects);
        if !requests.is_empty() {
            debug!("Dropping {} request(s) raised outside a user action", requests.len());
        }
    }

    async fn send(&self, mut requests: VecDeque<Request>) {
        let timeout = self.config.request_timeout();
        while let Some(request) = requests.pop_front() {
            let effects = match request {
                Request::Preview => match self.service.fetch_preview(timeout).await {
                    Ok(summary) => {
                        debug!("Preview received: {} track(s)", summary.track_count);
                        self.apply(|relay| relay.on_preview_received(summary))
                    }
                    Err(e) => self.apply(|relay| relay.on_preview_failed(&e)),
                },
                Request::Start { generation } => match self.service.start_sync(timeout).await {
                    Ok(()) => {
                        info!("Sync start acknowledged");
                        self.apply(|relay| relay.on_start_acknowledged(generation))
                    }
                    Err(e) => self.apply(|relay| relay.on_start_failed(generation, &e)),
                },
                Request::Launch { kind, generation } => {
                    match self.service.launch(kind, timeout).await {
                        Ok(()) => {
                            info!("{} start acknowledged", kind.verb());
                            Vec::new()
                        }
                        Err(e) => self.apply(|relay| relay.on_launch_failed(kind, generation, &e)),
                    }
                }
            };
            requests.extend(self.emit(effects));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationType;
    use mockall::predicate::eq;

    #[derive(Default)]
    struct ScriptedService {
        previews: RefCell<VecDeque<std::result::Result<PreviewSummary, RequestError>>>,
        starts: RefCell<VecDeque<std::result::Result<(), RequestError>>>,
        launches: RefCell<Vec<OperationKind>>,
        refuse_launch: Option<RequestError>,
    }

    impl RelayService for ScriptedService {
        async fn fetch_preview(
            &self,
            _timeout: Duration,
        ) -> std::result::Result<PreviewSummary, RequestError> {
            self.previews
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(RequestError::Transport("no scripted preview".to_string())))
        }

        async fn start_sync(&self, _timeout: Duration) -> std::result::Result<(), RequestError> {
            self.starts
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(RequestError::Transport("no scripted start".to_string())))
        }

        async fn launch(
            &self,
            kind: OperationKind,
            _timeout: Duration,
        ) -> std::result::Result<(), RequestError> {
            self.launches.borrow_mut().push(kind);
            self.refuse_launch.clone().map_or(Ok(()), Err)
        }
    }

    fn summary(track_count: u64) -> PreviewSummary {
        PreviewSummary {
            track_count,
            total_size_mb: 8.0,
            free_mb: 64.0,
            will_fit: true,
            pending_tracks: vec![],
        }
    }

    fn quiet_surface() -> MockRelaySurface {
        let mut surface = MockRelaySurface::new();
        surface.expect_render().return_const(());
        surface
    }

    async fn attached(
        service: ScriptedService,
        surface: MockRelaySurface,
    ) -> RelayDriver<ScriptedService, MockRelaySurface> {
        let driver = RelayDriver::new(RelayConfig::default(), service, surface);
        let (signal, waiter) = ready_channel();
        signal.fire();
        driver.attach(waiter).await.expect("attach");
        driver.set_device_status(DeviceStatus::READY);
        driver
    }

    #[tokio::test]
    async fn test_dropped_signal_reports_channel_closed() {
        let (signal, waiter) = ready_channel();
        drop(signal);
        assert!(matches!(waiter.wait().await, Err(Error::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_full_sync_flow() {
        let service = ScriptedService::default();
        service.previews.borrow_mut().push_back(Ok(summary(2)));
        service.starts.borrow_mut().push_back(Ok(()));

        let mut surface = quiet_surface();
        surface
            .expect_notify()
            .withf(|n| n.message == "Sync started" && n.notification_type == NotificationType::Info)
            .times(1)
            .return_const(());
        surface
            .expect_refresh()
            .with(eq(RefreshTarget::DeviceTracks))
            .times(1)
            .return_const(());
        surface
            .expect_refresh()
            .with(eq(RefreshTarget::DevicePlaylists))
            .times(1)
            .return_const(());
        surface
            .expect_notify()
            .withf(|n| n.message == "Sync complete")
            .times(1)
            .return_const(());

        let driver = attached(service, surface).await;
        driver.request_start().await;
        assert!(driver.view().preview.open);

        driver.confirm().await;
        assert_eq!(driver.state(), OperationState::Syncing);

        driver.handle_push(
            "sync_progress",
            serde_json::json!({"copied": 1, "total": 2, "track": "a.mp3"}),
        );
        assert_eq!(driver.view().indicator.percent, 50);

        driver.handle_push("sync_complete", serde_json::json!({"success": true}));
        assert_eq!(driver.state(), OperationState::Idle);
    }

    #[tokio::test]
    async fn test_timed_out_start_rolls_back() {
        let service = ScriptedService::default();
        service.previews.borrow_mut().push_back(Ok(summary(1)));
        service.starts.borrow_mut().push_back(Err(RequestError::TimedOut {
            operation: "start_sync".to_string(),
            timeout_ms: 30_000,
        }));

        let mut surface = quiet_surface();
        surface
            .expect_notify()
            .withf(|n| n.message == "Failed to start sync: start_sync timed out after 30000 ms")
            .times(1)
            .return_const(());

        let driver = attached(service, surface).await;
        driver.request_start().await;
        driver.confirm().await;

        assert_eq!(driver.state(), OperationState::Idle);
        assert!(!driver.view().indicator.visible);
        assert!(!driver.view().sync_trigger.disabled);
    }

    #[tokio::test]
    async fn test_request_before_ready_warns() {
        let mut surface = quiet_surface();
        surface
            .expect_notify()
            .withf(|n| n.notification_type == NotificationType::Warning)
            .times(1)
            .return_const(());

        let driver = RelayDriver::new(RelayConfig::default(), ScriptedService::default(), surface);
        driver.set_device_status(DeviceStatus::READY);
        driver.request_start().await;
        assert!(!driver.view().preview.open);
    }

    #[tokio::test]
    async fn test_scan_request_reaches_service() {
        let mut surface = quiet_surface();
        surface.expect_notify().times(0);
        let driver = attached(ScriptedService::default(), surface).await;

        driver.request_scan().await;
        assert_eq!(driver.state(), OperationState::Scanning);
        assert_eq!(*driver.service.launches.borrow(), vec![OperationKind::Scan]);
    }

    #[tokio::test]
    async fn test_refused_export_rolls_back() {
        let service = ScriptedService {
            refuse_launch: Some(RequestError::Rejected("iPod busy".to_string())),
            ..ScriptedService::default()
        };
        let mut surface = quiet_surface();
        surface
            .expect_notify()
            .withf(|n| n.message == "Failed to start export: Request rejected: iPod busy")
            .times(1)
            .return_const(());

        let driver = attached(service, surface).await;
        driver.request_export().await;
        assert_eq!(driver.state(), OperationState::Idle);
        assert!(!driver.view().export_trigger.disabled);
    }

    #[test]
    fn test_unknown_push_event_is_dropped() {
        let mut surface = MockRelaySurface::new();
        surface.expect_render().times(0);
        surface.expect_notify().times(0);

        let driver = RelayDriver::new(RelayConfig::default(), ScriptedService::default(), surface);
        driver.handle_push("volume_changed", serde_json::json!({}));
        driver.handle_push("sync_progress", serde_json::json!({"copied": "many"}));
        assert_eq!(driver.state(), OperationState::Idle);
    }

    #[test]
    fn test_every_transition_renders_once() {
        let mut surface = MockRelaySurface::new();
        surface.expect_render().times(3).return_const(());

        let driver = RelayDriver::new(RelayConfig::default(), ScriptedService::default(), surface);
        driver.mark_changes_pending(true);
        driver.handle_event(ProgressEvent::progress(OperationKind::Scan, 1, 4, None));
        driver.set_device_status(DeviceStatus::default());
        assert_eq!(driver.state(), OperationState::Scanning);
    }
}
