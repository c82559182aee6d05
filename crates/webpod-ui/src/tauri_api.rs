//! Tauri API bindings for WASM.
//!
//! This module wraps the Tauri `invoke` and `listen` functions and exposes
//! the sync commands as a [`RelayService`].

use std::pin::pin;
use std::time::Duration;

use futures_util::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use webpod_core::{
    CommandNames, OperationKind, PreviewSummary, RelayConfig, RelayService, RequestError,
};

#[wasm_bindgen]
extern "C" {
    /// The global Tauri invoke function (Tauri 2.x API).
    #[wasm_bindgen(js_namespace = ["window", "__TAURI__", "core"], js_name = invoke, catch)]
    fn tauri_invoke(cmd: &str, args: JsValue) -> Result<js_sys::Promise, JsValue>;

    /// Listen to Tauri events (Tauri 2.x API).
    #[wasm_bindgen(js_namespace = ["window", "__TAURI__", "event"], js_name = listen, catch)]
    fn tauri_listen(
        event: &str,
        handler: &Closure<dyn Fn(JsValue)>,
    ) -> Result<js_sys::Promise, JsValue>;
}

/// Event names for device-related events.
pub mod device_events {
    /// Event emitted when an iPod is connected. Payload: `{connected, supported}`.
    pub const DEVICE_CONNECTED: &str = "device-connected";
    /// Event emitted when the iPod is disconnected.
    pub const DEVICE_DISCONNECTED: &str = "device-disconnected";
    /// Event emitted when the library gains tracks not yet on the iPod.
    pub const LIBRARY_CHANGED: &str = "library-changed";
}

/// Command serving the relay configuration.
const RELAY_CONFIG_COMMAND: &str = "get_relay_config";

/// Arguments for commands that take none.
#[derive(Serialize)]
struct NoArgs {}

/// Listen to a Tauri event.
///
/// Returns a closure that can be called to stop listening.
pub async fn listen_to_event<F>(event: &str, handler: F) -> Result<js_sys::Function, String>
where
    F: Fn(JsValue) + 'static,
{
    if !is_tauri_available() {
        return Err("Tauri API not available".to_string());
    }

    let closure = Closure::new(handler);
    let promise = tauri_listen(event, &closure).map_err(|e| {
        e.as_string()
            .unwrap_or_else(|| "Failed to listen to event".to_string())
    })?;

    // Keep the closure alive
    closure.forget();

    let unlisten = JsFuture::from(promise).await.map_err(|e| {
        e.as_string()
            .unwrap_or_else(|| "Failed to set up event listener".to_string())
    })?;

    Ok(unlisten.unchecked_into())
}

/// Extract the JSON payload of a Tauri event. Missing payloads become `null`.
pub fn event_payload(event: &JsValue) -> serde_json::Value {
    js_sys::Reflect::get(event, &JsValue::from_str("payload"))
        .ok()
        .and_then(|payload| serde_wasm_bindgen::from_value(payload).ok())
        .unwrap_or(serde_json::Value::Null)
}

/// Check if the Tauri API is available.
fn is_tauri_available() -> bool {
    web_sys::window().is_some_and(|window| {
        js_sys::Reflect::get(&window, &JsValue::from_str("__TAURI__"))
            .is_ok_and(|tauri| !tauri.is_undefined())
    })
}

/// Call a Tauri command with the given arguments.
async fn invoke<T: DeserializeOwned>(cmd: &str, args: impl Serialize) -> Result<T, RequestError> {
    if !is_tauri_available() {
        let msg = "Tauri API not available - are you running in a Tauri app?";
        leptos::logging::error!("{}", msg);
        return Err(RequestError::Transport(msg.to_string()));
    }

    let args_value = serde_wasm_bindgen::to_value(&args)
        .map_err(|e| RequestError::Transport(format!("Failed to serialize args: {e}")))?;

    leptos::logging::log!("Invoking {}", cmd);

    let promise = tauri_invoke(cmd, args_value).map_err(|e| {
        RequestError::Transport(
            e.as_string()
                .unwrap_or_else(|| "Failed to invoke Tauri command".to_string()),
        )
    })?;

    let result = JsFuture::from(promise).await.map_err(|e| {
        let msg = e
            .as_string()
            .unwrap_or_else(|| "Unknown error from Tauri command".to_string());
        leptos::logging::error!("{} failed: {}", cmd, msg);
        RequestError::Rejected(msg)
    })?;

    serde_wasm_bindgen::from_value(result).map_err(|e| {
        let msg = format!("Failed to deserialize result: {e}");
        leptos::logging::error!("{} failed: {}", cmd, msg);
        RequestError::Transport(msg)
    })
}

/// Call a Tauri command, giving up after `timeout`.
async fn invoke_with_timeout<T: DeserializeOwned>(
    cmd: &str,
    args: impl Serialize,
    timeout: Duration,
) -> Result<T, RequestError> {
    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    let call = pin!(invoke::<T>(cmd, args));
    let timer = pin!(TimeoutFuture::new(
        u32::try_from(timeout_ms).unwrap_or(u32::MAX)
    ));

    match select(call, timer).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => {
            leptos::logging::warn!("{} timed out after {} ms", cmd, timeout_ms);
            Err(RequestError::TimedOut {
                operation: cmd.to_string(),
                timeout_ms,
            })
        }
    }
}

/// Fetch the relay configuration from the backend.
pub async fn relay_config(timeout: Duration) -> Result<RelayConfig, RequestError> {
    let value: serde_json::Value =
        invoke_with_timeout(RELAY_CONFIG_COMMAND, NoArgs {}, timeout).await?;
    RelayConfig::from_value(value).map_err(|e| RequestError::Rejected(e.to_string()))
}

/// The sync, scan and export commands served by the Tauri backend.
#[derive(Debug, Clone)]
pub struct TauriService {
    commands: CommandNames,
}

impl TauriService {
    /// Create a service calling the given command names.
    #[must_use]
    pub const fn new(commands: CommandNames) -> Self {
        Self { commands }
    }
}

impl RelayService for TauriService {
    async fn fetch_preview(&self, timeout: Duration) -> Result<PreviewSummary, RequestError> {
        invoke_with_timeout(&self.commands.preview, NoArgs {}, timeout).await
    }

    async fn start_sync(&self, timeout: Duration) -> Result<(), RequestError> {
        // The acknowledgement body carries nothing the relay needs.
        invoke_with_timeout::<serde_json::Value>(&self.commands.start, NoArgs {}, timeout)
            .await
            .map(|_| ())
    }

    async fn launch(&self, kind: OperationKind, timeout: Duration) -> Result<(), RequestError> {
        let command = self.commands.start_command(kind);
        invoke_with_timeout::<serde_json::Value>(command, NoArgs {}, timeout)
            .await
            .map(|_| ())
    }
}
