//! Main application component.

use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use webpod_core::{
    DEFAULT_REQUEST_TIMEOUT_MS, DeviceStatus, RelayConfig, RelayDriver, RelayView, ready_channel,
};

use crate::components::{
    ExportButton, LibraryNav, NotificationProvider, ProgressIndicator, ScanButton, SyncButton,
    SyncPreviewDialog, use_notifications,
};
use crate::handle::RelayHandle;
use crate::surface::{RefreshSignals, SignalSurface};
use crate::tauri_api::{self, TauriService, device_events, event_payload};

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    let config = RwSignal::new(None::<RelayConfig>);

    spawn_local(async move {
        let timeout = Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS);
        let loaded = match tauri_api::relay_config(timeout).await {
            Ok(loaded) => loaded,
            Err(e) => {
                leptos::logging::warn!("Using default relay config: {}", e);
                RelayConfig::default()
            }
        };
        config.set(Some(loaded));
    });

    view! {
        <style>{include_str!("../styles/main.css")}</style>
        <NotificationProvider>
            {move || config.get().map(|config| view! { <AppContent config=config /> })}
        </NotificationProvider>
    }
}

/// Inner application content with access to notification context.
#[component]
fn AppContent(
    /// Relay configuration served by the backend.
    config: RelayConfig,
) -> impl IntoView {
    let notifications = use_notifications();
    let relay_view = RwSignal::new(RelayView::default());
    let refresh = RefreshSignals::new();
    provide_context(refresh);

    let service = TauriService::new(config.commands.clone());
    let surface = SignalSurface::new(relay_view, notifications, refresh);
    let relay = RelayHandle::new(RelayDriver::new(config, service, surface));
    provide_context(relay);

    // Register push listeners once, then open the relay for sync requests.
    Effect::new(move || {
        let driver = relay.driver();
        driver.render();

        let (signal, waiter) = ready_channel();

        let attaching = Rc::clone(&driver);
        spawn_local(async move {
            match attaching.attach(waiter).await {
                Ok(()) => leptos::logging::log!("Progress relay ready"),
                Err(e) => leptos::logging::error!("Progress relay not ready: {}", e),
            }
        });

        spawn_local(async move {
            let names: Vec<String> = driver
                .config()
                .events
                .all()
                .into_iter()
                .map(str::to_string)
                .collect();

            for name in names {
                let handler = Rc::clone(&driver);
                let event_name = name.clone();
                if let Err(e) = tauri_api::listen_to_event(&name, move |event| {
                    handler.handle_push(&event_name, event_payload(&event));
                })
                .await
                {
                    // Dropping the signal leaves the relay refusing sync requests.
                    leptos::logging::error!("Failed to listen to {}: {}", name, e);
                    return;
                }
            }

            if let Err(e) = tauri_api::listen_to_event(device_events::DEVICE_CONNECTED, move |event| {
                match serde_json::from_value::<DeviceStatus>(event_payload(&event)) {
                    Ok(status) => relay.set_device_status(status),
                    Err(e) => leptos::logging::error!("Bad device payload: {}", e),
                }
            })
            .await
            {
                leptos::logging::error!("Failed to listen to device connections: {}", e);
            }

            if let Err(e) = tauri_api::listen_to_event(device_events::DEVICE_DISCONNECTED, move |_| {
                relay.set_device_status(DeviceStatus::default());
            })
            .await
            {
                leptos::logging::error!("Failed to listen to device disconnections: {}", e);
            }

            if let Err(e) = tauri_api::listen_to_event(device_events::LIBRARY_CHANGED, move |_| {
                relay.mark_changes_pending(true);
            })
            .await
            {
                leptos::logging::error!("Failed to listen to library changes: {}", e);
            }

            signal.fire();
        });
    });

    view! {
        <div class="app" data-testid="app">
            <header class="app-header">
                <h1 class="app-title">"WebPod"</h1>
                <LibraryNav />
                <div class="app-actions">
                    <ScanButton
                        trigger=Signal::derive(move || relay_view.get().scan_trigger)
                        on_click=Callback::new(move |()| relay.request_scan())
                    />
                    <ExportButton
                        trigger=Signal::derive(move || relay_view.get().export_trigger)
                        on_click=Callback::new(move |()| relay.request_export())
                    />
                    <SyncButton
                        trigger=Signal::derive(move || relay_view.get().sync_trigger)
                        on_click=Callback::new(move |()| relay.request_start())
                    />
                </div>
            </header>
            <ProgressIndicator indicator=Signal::derive(move || relay_view.get().indicator) />
            <SyncPreviewDialog
                preview=Signal::derive(move || relay_view.get().preview)
                on_confirm=Callback::new(move |()| relay.confirm())
                on_cancel=Callback::new(move |()| relay.cancel())
            />
        </div>
    }
}
