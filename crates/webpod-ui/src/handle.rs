//! Context handle giving components access to the relay.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use webpod_core::{DeviceStatus, LibraryView, RelayDriver};

use crate::surface::SignalSurface;
use crate::tauri_api::TauriService;

/// The relay driver as wired in the app.
pub type Driver = RelayDriver<TauriService, SignalSurface>;

/// Handle to the app's relay driver.
///
/// Provided as context by the app; components that start operations or
/// own library views reach the relay through it.
#[derive(Clone, Copy)]
pub struct RelayHandle {
    driver: StoredValue<Rc<Driver>, LocalStorage>,
}

impl RelayHandle {
    /// Wrap a driver for the current reactive owner.
    #[must_use]
    pub fn new(driver: Driver) -> Self {
        Self {
            driver: StoredValue::new_local(Rc::new(driver)),
        }
    }

    /// Shared driver, for tasks that outlive a single call.
    #[must_use]
    pub fn driver(&self) -> Rc<Driver> {
        self.driver.get_value()
    }

    /// Open the sync preview.
    pub fn request_start(&self) {
        let driver = self.driver();
        spawn_local(async move {
            driver.request_start().await;
        });
    }

    /// Confirm the open sync preview.
    pub fn confirm(&self) {
        let driver = self.driver();
        spawn_local(async move {
            driver.confirm().await;
        });
    }

    /// Dismiss the sync preview.
    pub fn cancel(&self) {
        self.driver.with_value(|driver| driver.cancel());
    }

    /// Start a library scan.
    pub fn request_scan(&self) {
        let driver = self.driver();
        spawn_local(async move {
            driver.request_scan().await;
        });
    }

    /// Export the iPod's tracks.
    pub fn request_export(&self) {
        let driver = self.driver();
        spawn_local(async move {
            driver.request_export().await;
        });
    }

    /// Record which library view is on screen.
    pub fn set_library_view(&self, view: LibraryView) {
        self.driver.with_value(|driver| driver.set_library_view(view));
    }

    /// Flag library changes that are not on the iPod yet.
    pub fn mark_changes_pending(&self, pending: bool) {
        self.driver
            .with_value(|driver| driver.mark_changes_pending(pending));
    }

    /// Update the device status.
    pub fn set_device_status(&self, status: DeviceStatus) {
        self.driver.with_value(|driver| driver.set_device_status(status));
    }
}

/// Hook to access the relay handle.
///
/// # Panics
/// Panics if called outside of the app content.
pub fn use_relay() -> RelayHandle {
    expect_context::<RelayHandle>()
}
