//! Error types for the worker core

use thiserror::Error;
use wpe_enclave::EnclaveError;
use wpe_kme_client::KmeClientError;

use crate::registry::RegistryError;

/// Result type alias for worker core operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors raised by signup, registration and the boot sequence.
///
/// Every variant here is terminal for the worker: a process that cannot
/// complete signup and registration must not serve work orders. Per-request
/// execution failures never surface as `ManagerError` to the dispatch loop;
/// they are converted into response envelopes instead.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// The KME produced no response to the verification key request.
    #[error("No response from KME for unique verification key request")]
    NoKmeResponse,

    /// The verification key response did not split into exactly three
    /// space-delimited fields.
    #[error("Malformed KME verification key response: expected 3 fields, got {0}")]
    MalformedKmeResponse(usize),

    /// The unique verification key signature did not verify.
    #[error("Failed to verify unique verification key signature")]
    SignatureVerification,

    /// The KME rejected the work-order processor registration.
    #[error("Work-order processor registration rejected by KME")]
    Registration,

    /// Lifecycle hooks were driven out of their mandated order.
    #[error("Boot sequence violation: {0}")]
    BootOrder(String),

    /// Fault inside the trusted enclave capability.
    #[error("Enclave error: {0}")]
    Enclave(#[from] EnclaveError),

    /// Fault in the KME client.
    #[error("KME client error: {0}")]
    Kme(#[from] KmeClientError),

    /// Fault in the worker-identity registry delegate.
    #[error("Worker registry error: {0}")]
    Registry(#[from] RegistryError),
}
