//! SGX hardware enclave binding
//!
//! Placeholder for the real SGX binding. Until the hardware integration
//! lands, every operation fails closed rather than pretending to attest.

use crate::capability::{EnclaveCapability, EnclaveWorkOrder, WorkOrderExecution};
use crate::error::{EnclaveError, EnclaveResult};
use crate::signup::SignupData;
use tracing::warn;

/// Hardware-backed enclave session.
pub struct HardwareEnclave;

impl EnclaveCapability for HardwareEnclave {
    fn generate_nonce(&self, _len: usize) -> EnclaveResult<Vec<u8>> {
        warn!("SGX hardware nonce generation not implemented");
        Err(EnclaveError::Unsupported(
            "sgx-hw nonce generation".to_string(),
        ))
    }

    fn verify_signature(&self, _key: &str, _signature: &str) -> EnclaveResult<bool> {
        warn!("SGX hardware signature verification not implemented");
        Err(EnclaveError::Unsupported(
            "sgx-hw signature verification".to_string(),
        ))
    }

    fn create_signup_data(&self, _unique_key: &str) -> EnclaveResult<SignupData> {
        warn!("SGX hardware signup not implemented");
        Err(EnclaveError::Unsupported("sgx-hw signup".to_string()))
    }
}

impl WorkOrderExecution for HardwareEnclave {
    fn execute(&self, _request: &EnclaveWorkOrder) -> EnclaveResult<serde_json::Value> {
        warn!("SGX hardware work-order execution not implemented");
        Err(EnclaveError::Unsupported("sgx-hw execution".to_string()))
    }
}
