//! Confirmation dialog listing what a sync will copy.

use leptos::prelude::*;
use webpod_core::{PreviewDialogView, TrackRow};

/// Modal dialog showing the sync preview.
///
/// Confirm stays disabled and a warning is shown when the pending tracks do
/// not fit on the iPod.
#[component]
pub fn SyncPreviewDialog(
    /// What the dialog shows.
    preview: Signal<PreviewDialogView>,
    /// Callback when the user confirms.
    on_confirm: Callback<()>,
    /// Callback when the user cancels.
    on_cancel: Callback<()>,
) -> impl IntoView {
    view! {
        <div
            class="sync-preview-overlay"
            class:visible=move || preview.get().open
            on:click=move |_| on_cancel.run(())
            data-testid="sync-preview-dialog"
        >
            <div
                class="sync-preview-modal"
                role="dialog"
                aria-modal="true"
                on:click=move |e: web_sys::MouseEvent| e.stop_propagation()
            >
                <h2 class="sync-preview-title">"Sync Preview"</h2>

                <div class="sync-preview-summary" data-testid="sync-preview-summary">
                    {move || {
                        preview
                            .get()
                            .summary_lines
                            .into_iter()
                            .map(|line| view! { <p>{line}</p> })
                            .collect_view()
                    }}
                </div>

                {move || preview.get().warning.map(|warning| view! {
                    <div class="sync-preview-warning" data-testid="sync-preview-warning">
                        {warning}
                    </div>
                })}

                <div class="sync-preview-tracks">
                    <table class="sync-preview-table">
                        <thead>
                            <tr>
                                <th>"Title"</th>
                                <th>"Artist"</th>
                                <th>"Album"</th>
                                <th>"Size"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {move || {
                                preview
                                    .get()
                                    .tracks
                                    .into_iter()
                                    .map(|track| view! { <PendingTrackRow track=track /> })
                                    .collect_view()
                            }}
                        </tbody>
                    </table>
                </div>

                <div class="sync-preview-actions">
                    <button
                        class="btn btn-ghost"
                        on:click=move |_| on_cancel.run(())
                        data-testid="sync-preview-cancel"
                    >
                        "Cancel"
                    </button>
                    <button
                        class="btn btn-primary"
                        disabled=move || preview.get().confirm_disabled
                        on:click=move |_| on_confirm.run(())
                        data-testid="sync-preview-confirm"
                    >
                        "Sync"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn PendingTrackRow(
    /// The row to display.
    track: TrackRow,
) -> impl IntoView {
    view! {
        <tr>
            <td>{track.title}</td>
            <td>{track.artist}</td>
            <td>{track.album}</td>
            <td class="track-size">{track.size}</td>
        </tr>
    }
}
