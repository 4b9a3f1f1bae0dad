//! Simulation enclave
//!
//! Deterministic software implementation of the enclave capability for
//! builds without TEE hardware. Measurements, keys and signatures are
//! derived from SHA-256 over fixed domain tags, so collaborating test
//! doubles (for example a stub KME) can produce artifacts this enclave
//! accepts.

use crate::capability::{EnclaveCapability, EnclaveType, EnclaveWorkOrder, WorkOrderExecution};
use crate::error::{EnclaveError, EnclaveResult};
use crate::identity::ExtendedMeasurement;
use crate::signup::{SignupData, SignupProofData};
use base64::{engine::general_purpose, Engine as _};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

const MEASUREMENT_TAG: &[u8] = b"wpe-sim-enclave-v1";
const SIGNING_TAG: &[u8] = b"wpe-sim-unique-key-signature-v1";
const ENCRYPTION_KEY_TAG: &[u8] = b"wpe-sim-encryption-key-v1";
const REPORT_SIGNING_TAG: &[u8] = b"wpe-sim-report-signature-v1";

/// Lifecycle state of the simulated enclave session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnclaveState {
    Created,
    Ready,
}

/// Software enclave used for development and tests.
pub struct SimulationEnclave {
    enclave_id: String,
    base_name: String,
    state: RwLock<EnclaveState>,
}

impl SimulationEnclave {
    /// Create a simulated enclave session for `enclave_id`.
    pub fn new(enclave_id: impl Into<String>, base_name: impl Into<String>) -> Self {
        Self {
            enclave_id: enclave_id.into(),
            base_name: base_name.into(),
            state: RwLock::new(EnclaveState::Created),
        }
    }

    /// Initialize the enclave session.
    pub fn initialize(&self) -> EnclaveResult<()> {
        let mut state = self.state.write();
        *state = EnclaveState::Ready;
        info!(enclave_id = %self.enclave_id, "simulation enclave initialized");
        Ok(())
    }

    /// Whether the session has been initialized.
    pub fn is_ready(&self) -> bool {
        *self.state.read() == EnclaveState::Ready
    }

    fn ensure_ready(&self) -> EnclaveResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(EnclaveError::NotInitialized)
        }
    }

    /// Deterministic code measurement for this simulated enclave.
    pub fn measurement(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(MEASUREMENT_TAG);
        hasher.update(self.enclave_id.as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }

    /// Identity of the enclave binary as reported at signup.
    pub fn extended_measurement(&self) -> ExtendedMeasurement {
        ExtendedMeasurement::new(self.base_name.clone(), self.measurement())
    }

    /// The simulated KME-side signature over a unique verification key.
    ///
    /// A stub KME uses this to issue key/signature pairs the simulated
    /// verification accepts.
    pub fn sign_unique_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(SIGNING_TAG);
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn sign_report(report: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(REPORT_SIGNING_TAG);
        hasher.update(report.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl EnclaveCapability for SimulationEnclave {
    fn generate_nonce(&self, len: usize) -> EnclaveResult<Vec<u8>> {
        self.ensure_ready()?;
        let mut nonce = vec![0u8; len];
        OsRng.fill_bytes(&mut nonce);
        debug!(len, "nonce generated in simulation enclave");
        Ok(nonce)
    }

    fn verify_signature(&self, key: &str, signature: &str) -> EnclaveResult<bool> {
        self.ensure_ready()?;
        Ok(signature == Self::sign_unique_key(key))
    }

    fn create_signup_data(&self, unique_key: &str) -> EnclaveResult<SignupData> {
        self.ensure_ready()?;

        let measurement = self.extended_measurement();
        let report_body = json!({
            "enclave_type": EnclaveType::Wpe.to_string(),
            "measurement": measurement.measurement_hex(),
            "verification_key": unique_key,
        })
        .to_string();
        let verification_report = general_purpose::STANDARD.encode(report_body);
        let proof = SignupProofData {
            signature: Self::sign_report(&verification_report),
            verification_report,
        };

        let mut hasher = Sha256::new();
        hasher.update(ENCRYPTION_KEY_TAG);
        hasher.update(self.enclave_id.as_bytes());
        let encryption_key = hex::encode(hasher.finalize());

        Ok(SignupData {
            verification_key: unique_key.to_string(),
            encryption_key,
            proof_data: serde_json::to_string(&proof)?,
            extended_measurement: measurement,
        })
    }
}

impl WorkOrderExecution for SimulationEnclave {
    fn execute(&self, request: &EnclaveWorkOrder) -> EnclaveResult<serde_json::Value> {
        self.ensure_ready()?;

        if request.enclave_type != EnclaveType::Wpe {
            return Err(EnclaveError::UnknownEnclaveType(
                request.enclave_type.to_string(),
            ));
        }

        let parsed: serde_json::Value = serde_json::from_str(&request.request_json)
            .map_err(|e| EnclaveError::execution(format!("malformed work order: {}", e)))?;
        let work_order_id = parsed
            .get("work_order_id")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        Ok(json!({
            "result": {
                "work_order_id": work_order_id,
                "enclave_type": EnclaveType::Wpe.to_string(),
                "out_data": [],
            }
        }))
    }
}
