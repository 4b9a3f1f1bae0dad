//! Error types for KME client operations

use thiserror::Error;

/// Result type alias for KME client operations.
pub type KmeResult<T> = Result<T, KmeClientError>;

/// Errors raised while talking to the KME listener.
#[derive(Error, Debug)]
pub enum KmeClientError {
    /// The listener URL was not a valid URL.
    #[error("Invalid KME listener URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// HTTP transport failure (connect, timeout, TLS).
    #[error("KME transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON-RPC.
    #[error("Invalid KME response: {0}")]
    InvalidResponse(String),

    /// The KME answered with a JSON-RPC error object.
    #[error("KME error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// JSON serialisation/deserialisation error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
