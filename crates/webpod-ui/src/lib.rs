//! `WebPod` UI - Leptos-based user interface.
//!
//! This crate renders the progress relay from `webpod-core`: the sync, scan
//! and export triggers, the library view tabs, the sync preview dialog, the
//! shared progress indicator and the toast stack.

// Pass by value suggestions for small types like bool - not always clearer
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod app;
pub mod components;
pub mod handle;
pub mod surface;
pub mod tauri_api;

pub use app::App;
pub use handle::{RelayHandle, use_relay};
pub use surface::{RefreshSignals, SignalSurface};
pub use tauri_api::TauriService;
