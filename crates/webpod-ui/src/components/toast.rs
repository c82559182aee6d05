//! Toast stack for relay notifications.
//!
//! Toasts are pushed by the relay surface and dismissed either by the user
//! or after the duration the relay attached to them.

use leptos::prelude::*;
use leptos::task::spawn_local;
use webpod_core::{Notification, NotificationType};

/// Shared handle to the toast stack.
#[derive(Clone, Copy)]
pub struct NotificationContext {
    /// Toasts currently shown, oldest first.
    pub notifications: ReadSignal<Vec<Notification>>,
    set_notifications: WriteSignal<Vec<Notification>>,
}

impl NotificationContext {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        let (notifications, set_notifications) = signal::<Vec<Notification>>(vec![]);
        Self {
            notifications,
            set_notifications,
        }
    }

    /// Show a toast, scheduling its dismissal when it has a duration.
    pub fn push(&self, notification: Notification) {
        let id = notification.id;
        let duration_ms = notification.duration_ms;
        let set_notifications = self.set_notifications;

        self.set_notifications.update(|notifications| {
            notifications.push(notification);
        });

        if let Some(duration) = duration_ms {
            spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(u32::try_from(duration).unwrap_or(u32::MAX))
                    .await;
                set_notifications.update(|notifications| {
                    notifications.retain(|n| n.id != id);
                });
            });
        }
    }

    /// Remove a toast by ID.
    pub fn dismiss(&self, id: u64) {
        self.set_notifications.update(|notifications| {
            notifications.retain(|n| n.id != id);
        });
    }
}

impl Default for NotificationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the toast stack.
#[component]
pub fn ToastContainer() -> impl IntoView {
    let ctx = expect_context::<NotificationContext>();

    view! {
        <div class="toast-container" data-testid="toast-container">
            <For
                each=move || ctx.notifications.get()
                key=|notification| notification.id
                children=move |notification| {
                    let id = notification.id;
                    view! {
                        <Toast
                            notification=notification
                            on_dismiss=Callback::new(move |()| {
                                ctx.dismiss(id);
                            })
                        />
                    }
                }
            />
        </div>
    }
}

#[component]
fn Toast(
    /// The notification to display.
    notification: Notification,
    /// Callback when the toast is dismissed.
    on_dismiss: Callback<()>,
) -> impl IntoView {
    let notification_type = notification.notification_type;
    let has_title = notification.title.is_some();

    view! {
        <div
            class=format!("toast toast-{notification_type}")
            role="alert"
            aria-live="polite"
            data-testid="toast"
            data-toast-type=notification_type.to_string()
        >
            <div class="toast-icon">
                {match notification_type {
                    NotificationType::Info => view! {
                        <svg viewBox="0 0 24 24" width="20" height="20" fill="currentColor">
                            <path d="M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm1 15h-2v-6h2v6zm0-8h-2V7h2v2z"/>
                        </svg>
                    }.into_any(),
                    NotificationType::Success => view! {
                        <svg viewBox="0 0 24 24" width="20" height="20" fill="currentColor">
                            <path d="M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm-2 15l-5-5 1.41-1.41L10 14.17l7.59-7.59L19 8l-9 9z"/>
                        </svg>
                    }.into_any(),
                    NotificationType::Warning => view! {
                        <svg viewBox="0 0 24 24" width="20" height="20" fill="currentColor">
                            <path d="M1 21h22L12 2 1 21zm12-3h-2v-2h2v2zm0-4h-2v-4h2v4z"/>
                        </svg>
                    }.into_any(),
                    NotificationType::Error => view! {
                        <svg viewBox="0 0 24 24" width="20" height="20" fill="currentColor">
                            <path d="M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm1 15h-2v-2h2v2zm0-4h-2V7h2v6z"/>
                        </svg>
                    }.into_any(),
                }}
            </div>
            <div class="toast-content">
                {notification.title.clone().map(|title| view! {
                    <div class="toast-title">{title}</div>
                })}
                <div class="toast-message" class:has-title=has_title>
                    {notification.message}
                </div>
            </div>
            <button
                class="toast-dismiss btn btn-ghost btn-icon"
                on:click=move |_| on_dismiss.run(())
                aria-label="Dismiss notification"
                data-testid="toast-dismiss"
            >
                "×"
            </button>
        </div>
    }
}

/// Provides the toast stack to its children and renders it.
#[component]
pub fn NotificationProvider(
    /// Child components that can access the notification context.
    children: Children,
) -> impl IntoView {
    let ctx = NotificationContext::new();
    provide_context(ctx);

    view! {
        {children()}
        <ToastContainer />
    }
}

/// Hook to access the toast stack.
///
/// # Panics
/// Panics if called outside of a `NotificationProvider`.
pub fn use_notifications() -> NotificationContext {
    expect_context::<NotificationContext>()
}
