//! Error types for WebPod core operations.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in WebPod core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A push event arrived under a name the relay does not subscribe to.
    #[error("Unknown push event: {0}")]
    UnknownEvent(String),

    /// A push event payload could not be decoded.
    #[error("Malformed payload for {event}: {source}")]
    MalformedPayload {
        /// Wire name of the event.
        event: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A request to the remote service failed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The push channel readiness signal was dropped before firing.
    #[error("Push channel closed before it became ready")]
    ChannelClosed,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a request/response call to the remote service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// No response arrived within the configured timeout.
    #[error("{operation} timed out after {timeout_ms} ms")]
    TimedOut {
        /// Name of the remote command.
        operation: String,
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The request could not be delivered or the response could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with an error.
    #[error("Request rejected: {0}")]
    Rejected(String),
}
