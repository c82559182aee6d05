//! Sync, library scan and iPod export trigger buttons.

use leptos::prelude::*;
use webpod_core::{ExportTriggerView, ScanTriggerView, SyncTriggerView};

/// Starts the sync flow. Pulses while there are unsynced library changes.
#[component]
pub fn SyncButton(
    /// Enabled/pulse state.
    trigger: Signal<SyncTriggerView>,
    /// Callback when clicked.
    on_click: Callback<()>,
) -> impl IntoView {
    view! {
        <button
            id="sync-btn"
            class="btn btn-primary"
            class:btn-pulse=move || trigger.get().pulse
            disabled=move || trigger.get().disabled
            on:click=move |_| on_click.run(())
            data-testid="sync-button"
        >
            "Sync"
        </button>
    }
}

/// The library scan button. Its caption follows any running scan.
#[component]
pub fn ScanButton(
    /// Enabled state and caption.
    trigger: Signal<ScanTriggerView>,
    /// Callback when clicked.
    on_click: Callback<()>,
) -> impl IntoView {
    view! {
        <button
            id="scan-btn"
            class="btn btn-secondary"
            disabled=move || trigger.get().disabled
            on:click=move |_| on_click.run(())
            data-testid="scan-button"
        >
            {move || trigger.get().caption}
        </button>
    }
}

/// Copies the iPod's tracks back into the library.
#[component]
pub fn ExportButton(
    /// Enabled state.
    trigger: Signal<ExportTriggerView>,
    /// Callback when clicked.
    on_click: Callback<()>,
) -> impl IntoView {
    view! {
        <button
            id="export-btn"
            class="btn btn-secondary"
            disabled=move || trigger.get().disabled
            on:click=move |_| on_click.run(())
            data-testid="export-button"
        >
            "Export from iPod"
        </button>
    }
}
