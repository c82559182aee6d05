//! The shared progress indicator for scans, syncs and exports.

use leptos::prelude::*;
use webpod_core::IndicatorView;

/// Progress bar with inline text. The full file path shows on hover.
#[component]
pub fn ProgressIndicator(
    /// What the indicator shows.
    indicator: Signal<IndicatorView>,
) -> impl IntoView {
    view! {
        <div
            class="progress-container"
            class:hidden=move || !indicator.get().visible
            data-testid="progress-container"
        >
            <div class="progress-bar" data-testid="progress-bar">
                <div
                    class="progress-fill"
                    style=move || format!("width: {}", indicator.get().fill_width())
                    data-testid="progress-fill"
                ></div>
            </div>
            <span
                class="progress-text"
                title=move || {
                    let current = indicator.get();
                    current.detail.unwrap_or(current.text)
                }
                data-testid="progress-text"
            >
                {move || indicator.get().text}
            </span>
        </div>
    }
}
