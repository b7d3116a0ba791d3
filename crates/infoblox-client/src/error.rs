//! Infoblox client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Infoblox WAPI
#[derive(Debug, Error)]
pub enum InfobloxError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response without a structured WAPI error body
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// WAPI returned a structured application-level error
    #[error("WAPI error: {0}")]
    Api(String),

    /// Address space exhaustion reported by the appliance, or every probed
    /// candidate in an allocation batch answered the liveness check
    #[error("no IP address available: {0}")]
    NoIpAvailable(String),

    /// A lookup returned zero matches
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller supplied a malformed address or network specifier
    #[error("bad input parameter: {0}")]
    BadInput(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
