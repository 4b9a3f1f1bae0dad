//! Error types for enclave capability operations

use thiserror::Error;

/// Result type alias for enclave operations.
pub type EnclaveResult<T> = Result<T, EnclaveError>;

/// Errors surfaced by the trusted enclave capability.
#[derive(Error, Debug)]
pub enum EnclaveError {
    /// Capability was used before the enclave session was initialized.
    #[error("Enclave not initialized")]
    NotInitialized,

    /// Random nonce generation inside the enclave failed.
    #[error("Nonce generation failed: {0}")]
    NonceGeneration(String),

    /// The enclave could not carry out a cryptographic operation.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Signup-data creation inside the enclave failed.
    #[error("Signup data creation failed: {0}")]
    SignupFailed(String),

    /// A work order was submitted for an enclave type this enclave does
    /// not serve.
    #[error("Unknown enclave type: {0}")]
    UnknownEnclaveType(String),

    /// Work-order execution inside the enclave faulted.
    #[error("Work order execution failed: {0}")]
    ExecutionFailed(String),

    /// The operation is not available on this build.
    #[error("Operation not supported on this build: {0}")]
    Unsupported(String),

    /// JSON serialisation/deserialisation error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnclaveError {
    /// Helper for creating an execution failure with a message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::ExecutionFailed(message.into())
    }

    /// Helper for creating a crypto error with a message.
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }
}
