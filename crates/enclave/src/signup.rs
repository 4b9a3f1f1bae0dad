//! Signup data produced inside the enclave

use crate::identity::ExtendedMeasurement;
use serde::{Deserialize, Serialize};

/// Attestation material embedded in [`SignupData::proof_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignupProofData {
    /// Attestation verification report for the enclave
    pub verification_report: String,
    /// Signature over the verification report
    pub signature: String,
}

/// Proof material binding a verification key to this enclave's measurement.
///
/// Created once at signup inside the TEE; read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupData {
    /// The KME-issued unique verification key the signup data is bound to
    pub verification_key: String,
    /// Worker public encryption key used to address work orders to this
    /// worker
    pub encryption_key: String,
    /// Opaque enclave-signed attestation blob (JSON-encoded
    /// [`SignupProofData`])
    pub proof_data: String,
    /// Identity of the enclave binary that produced this signup data
    pub extended_measurement: ExtendedMeasurement,
}

impl SignupData {
    /// Decode the structured proof material out of `proof_data`.
    pub fn decode_proof(&self) -> Result<SignupProofData, serde_json::Error> {
        serde_json::from_str(&self.proof_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_data_round_trips() {
        let proof = SignupProofData {
            verification_report: "report".to_string(),
            signature: "sig".to_string(),
        };
        let signup = SignupData {
            verification_key: "key".to_string(),
            encryption_key: "enc".to_string(),
            proof_data: serde_json::to_string(&proof).unwrap(),
            extended_measurement: ExtendedMeasurement::new("wpe", [0u8; 32]),
        };

        assert_eq!(signup.decode_proof().unwrap(), proof);
    }

    #[test]
    fn malformed_proof_data_is_an_error() {
        let signup = SignupData {
            verification_key: "key".to_string(),
            encryption_key: "enc".to_string(),
            proof_data: "not json".to_string(),
            extended_measurement: ExtendedMeasurement::new("wpe", [0u8; 32]),
        };
        assert!(signup.decode_proof().is_err());
    }
}
