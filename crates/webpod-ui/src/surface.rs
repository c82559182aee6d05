//! Relay surface backed by Leptos signals.

use leptos::prelude::*;
use webpod_core::{Notification, RefreshTarget, RelaySurface, RelayView};

use crate::components::NotificationContext;

/// Reload counters for views owned by other components.
///
/// Each counter is bumped when the relay asks for its view to be reloaded;
/// owners track it in an effect.
#[derive(Clone, Copy)]
pub struct RefreshSignals {
    /// iPod track list.
    pub device_tracks: RwSignal<u32>,
    /// iPod playlists.
    pub device_playlists: RwSignal<u32>,
    /// Library album grid.
    pub library_albums: RwSignal<u32>,
    /// Library track table.
    pub library_tracks: RwSignal<u32>,
}

impl RefreshSignals {
    /// Create counters starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            device_tracks: RwSignal::new(0),
            device_playlists: RwSignal::new(0),
            library_albums: RwSignal::new(0),
            library_tracks: RwSignal::new(0),
        }
    }

    /// Counter for `target`.
    #[must_use]
    pub const fn counter(&self, target: RefreshTarget) -> RwSignal<u32> {
        match target {
            RefreshTarget::DeviceTracks => self.device_tracks,
            RefreshTarget::DevicePlaylists => self.device_playlists,
            RefreshTarget::LibraryAlbums => self.library_albums,
            RefreshTarget::LibraryTracks => self.library_tracks,
        }
    }
}

impl Default for RefreshSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes relay output into the app's signals.
#[derive(Clone, Copy)]
pub struct SignalSurface {
    view: RwSignal<RelayView>,
    notifications: NotificationContext,
    refresh: RefreshSignals,
}

impl SignalSurface {
    /// Create a surface writing into the given signals.
    #[must_use]
    pub const fn new(
        view: RwSignal<RelayView>,
        notifications: NotificationContext,
        refresh: RefreshSignals,
    ) -> Self {
        Self {
            view,
            notifications,
            refresh,
        }
    }
}

impl RelaySurface for SignalSurface {
    fn render(&self, view: &RelayView) {
        self.view.set(view.clone());
    }

    fn notify(&self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn refresh(&self, target: RefreshTarget) {
        leptos::logging::log!("Refreshing {:?}", target);
        self.refresh.counter(target).update(|count| *count = count.wrapping_add(1));
    }
}
