//! Tabs switching between the library views.

use leptos::prelude::*;
use webpod_core::LibraryView;

use crate::handle::use_relay;

const TABS: [(LibraryView, &str); 3] = [
    (LibraryView::Albums, "Albums"),
    (LibraryView::Tracks, "Tracks"),
    (LibraryView::Other, "iPod"),
];

/// Library view tabs. The selected view is what a finished scan reloads.
#[component]
pub fn LibraryNav() -> impl IntoView {
    let relay = use_relay();
    let current = RwSignal::new(LibraryView::Other);

    let select = move |view: LibraryView| {
        current.set(view);
        relay.set_library_view(view);
    };

    view! {
        <nav class="library-nav" data-testid="library-nav">
            {TABS
                .into_iter()
                .map(|(view, label)| {
                    view! {
                        <button
                            class="btn btn-ghost"
                            class:active=move || current.get() == view
                            on:click=move |_| select(view)
                        >
                            {label}
                        </button>
                    }
                })
                .collect_view()}
        </nav>
    }
}
