//! Capability traits crossed by the trust boundary
//!
//! Untrusted orchestration code only ever talks to the enclave through these
//! traits. The signup path uses [`EnclaveCapability`]; the execution path
//! uses [`WorkOrderExecution`]. Both are object safe so test builds can
//! substitute deterministic stubs or spies.

use crate::error::EnclaveResult;
use crate::signup::SignupData;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enclave flavors known to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnclaveType {
    /// Key Management Enclave
    Kme,
    /// Work Order Processor Enclave
    Wpe,
    /// Standalone enclave serving both roles
    Singleton,
}

impl fmt::Display for EnclaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnclaveType::Kme => write!(f, "KME"),
            EnclaveType::Wpe => write!(f, "WPE"),
            EnclaveType::Singleton => write!(f, "SINGLETON"),
        }
    }
}

/// Signup-path operations executed inside the TEE boundary.
///
/// Implementations must treat every `generate_nonce` call as a fresh draw;
/// callers rely on nonces never being cached or reused across signup
/// attempts.
pub trait EnclaveCapability: Send + Sync {
    /// Generate `len` random bytes inside the enclave.
    fn generate_nonce(&self, len: usize) -> EnclaveResult<Vec<u8>>;

    /// Verify `signature` over `key` with the enclave's verification key.
    ///
    /// Returns `Ok(false)` for a well-formed but invalid signature; `Err`
    /// is reserved for faults in the verification itself.
    fn verify_signature(&self, key: &str, signature: &str) -> EnclaveResult<bool>;

    /// Create signup data binding `unique_key` to this enclave's
    /// measurement. Callers must only pass keys whose signature has already
    /// been verified.
    fn create_signup_data(&self, unique_key: &str) -> EnclaveResult<SignupData>;
}

/// One typed work order bound for the enclave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnclaveWorkOrder {
    /// Enclave flavor the order is addressed to
    pub enclave_type: EnclaveType,
    /// The original JSON-formatted request
    pub request_json: String,
    /// Preprocessed payload produced by the KME requester
    pub preprocessed: serde_json::Value,
}

impl EnclaveWorkOrder {
    /// Build a work order addressed to this WPE.
    pub fn new(
        enclave_type: EnclaveType,
        request_json: impl Into<String>,
        preprocessed: serde_json::Value,
    ) -> Self {
        Self {
            enclave_type,
            request_json: request_json.into(),
            preprocessed,
        }
    }
}

/// Execution-path operation: route one preprocessed work order into the TEE.
pub trait WorkOrderExecution: Send + Sync {
    /// Execute the work order and return the enclave's JSON response.
    ///
    /// A success payload and an enclave-reported error envelope are both
    /// ordinary `Ok` values; `Err` means the execution itself faulted.
    fn execute(&self, request: &EnclaveWorkOrder) -> EnclaveResult<serde_json::Value>;
}
