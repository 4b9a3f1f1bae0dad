//! Mock collaborators shared by the unit tests

use async_trait::async_trait;
use mockall::mock;
use wpe_enclave::{
    EnclaveCapability, EnclaveResult, EnclaveWorkOrder, ExtendedMeasurement, SignupData,
    WorkOrderExecution,
};
use wpe_kme_client::{KmeRequester, KmeResult};

mock! {
    pub Enclave {}

    impl EnclaveCapability for Enclave {
        fn generate_nonce(&self, len: usize) -> EnclaveResult<Vec<u8>>;
        fn verify_signature(&self, key: &str, signature: &str) -> EnclaveResult<bool>;
        fn create_signup_data(&self, unique_key: &str) -> EnclaveResult<SignupData>;
    }
}

mock! {
    pub Execution {}

    impl WorkOrderExecution for Execution {
        fn execute(&self, request: &EnclaveWorkOrder) -> EnclaveResult<serde_json::Value>;
    }
}

mock! {
    pub Requester {}

    #[async_trait]
    impl KmeRequester for Requester {
        async fn request_unique_verification_key(&self, nonce: &[u8]) -> KmeResult<Option<String>>;
        async fn register_processor(
            &self,
            verification_key: &str,
            encryption_key: &str,
            proof_data: &str,
            measurement: &str,
        ) -> KmeResult<bool>;
        async fn preprocess_work_order(
            &self,
            request_json: &str,
            encryption_key: &str,
        ) -> KmeResult<serde_json::Value>;
    }
}

/// Signup data as a cooperating enclave would produce it for `unique_key`.
pub fn sample_signup_data(unique_key: &str) -> SignupData {
    SignupData {
        verification_key: unique_key.to_string(),
        encryption_key: "aa".repeat(32),
        proof_data: r#"{"verification_report":"d2JlLXByb29m","signature":"00ff"}"#.to_string(),
        extended_measurement: ExtendedMeasurement::new("wpe", [0x11u8; 32]),
    }
}
