//! Registration flow
//!
//! Registers a signed-up worker with the KME and records the
//! worker-identity mapping. Failure is fatal for the process: an
//! unregistered worker must not serve work orders.

use crate::error::{ManagerError, ManagerResult};
use crate::registry::WorkerRegistry;
use crate::signup::SignupOutcome;
use std::sync::Arc;
use tracing::{error, info};
use wpe_enclave::EnclaveIdentity;
use wpe_kme_client::KmeRequester;

/// Registers the worker with the KME on boot.
pub struct RegistrationFlow {
    requester: Arc<dyn KmeRequester>,
    registry: Arc<dyn WorkerRegistry>,
    worker_id: String,
    identity: EnclaveIdentity,
}

impl RegistrationFlow {
    pub fn new(
        requester: Arc<dyn KmeRequester>,
        registry: Arc<dyn WorkerRegistry>,
        worker_id: impl Into<String>,
        identity: EnclaveIdentity,
    ) -> Self {
        Self {
            requester,
            registry,
            worker_id: worker_id.into(),
            identity,
        }
    }

    /// Register the signed-up worker; on success record the
    /// worker-identity mapping.
    pub async fn register(&self, outcome: &SignupOutcome) -> ManagerResult<()> {
        let signup = &outcome.signup_data;
        let registered = self
            .requester
            .register_processor(
                &outcome.verification_key,
                &signup.encryption_key,
                &signup.proof_data,
                &signup.extended_measurement.measurement_hex(),
            )
            .await?;

        if !registered {
            error!("WPE registration failed, cannot proceed further");
            return Err(ManagerError::Registration);
        }

        info!(worker_id = %self.worker_id, identity = %self.identity,
            "WPE registration successful");
        self.registry
            .update_worker_map(&self.worker_id, &self.identity)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryWorkerRegistry;
    use crate::signup::SignupOutcome;
    use crate::test_support::{sample_signup_data, MockRequester};

    fn outcome() -> SignupOutcome {
        SignupOutcome {
            signup_data: sample_signup_data("abcKEY"),
            verification_key: "abcKEY".to_string(),
            verification_key_signature: "sigABC".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_registration_writes_worker_mapping() {
        let mut requester = MockRequester::new();
        requester
            .expect_register_processor()
            .withf(|key, encryption_key, proof_data, measurement| {
                key == "abcKEY"
                    && encryption_key == "aa".repeat(32)
                    && proof_data == r#"{"verification_report":"d2JlLXByb29m","signature":"00ff"}"#
                    && measurement == "11".repeat(32)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(true));

        let registry = Arc::new(InMemoryWorkerRegistry::new());
        let identity = EnclaveIdentity::derive("wpe-enclave-test");
        let flow = RegistrationFlow::new(
            Arc::new(requester),
            registry.clone(),
            "worker-1",
            identity.clone(),
        );

        flow.register(&outcome()).await.unwrap();
        assert_eq!(registry.lookup("worker-1"), Some(identity));
    }

    #[tokio::test]
    async fn rejected_registration_is_fatal_and_writes_nothing() {
        let mut requester = MockRequester::new();
        requester
            .expect_register_processor()
            .times(1)
            .returning(|_, _, _, _| Ok(false));

        let registry = Arc::new(InMemoryWorkerRegistry::new());
        let flow = RegistrationFlow::new(
            Arc::new(requester),
            registry.clone(),
            "worker-1",
            EnclaveIdentity::derive("wpe-enclave-test"),
        );

        let result = flow.register(&outcome()).await;
        assert!(matches!(result, Err(ManagerError::Registration)));
        assert_eq!(registry.lookup("worker-1"), None);
    }

    #[tokio::test]
    async fn transport_failure_during_registration_writes_nothing() {
        let mut requester = MockRequester::new();
        requester
            .expect_register_processor()
            .times(1)
            .returning(|_, _, _, _| {
                Err(wpe_kme_client::KmeClientError::InvalidResponse(
                    "connection reset".to_string(),
                ))
            });

        let registry = Arc::new(InMemoryWorkerRegistry::new());
        let flow = RegistrationFlow::new(
            Arc::new(requester),
            registry.clone(),
            "worker-1",
            EnclaveIdentity::derive("wpe-enclave-test"),
        );

        let result = flow.register(&outcome()).await;
        assert!(matches!(result, Err(ManagerError::Kme(_))));
        assert_eq!(registry.lookup("worker-1"), None);
    }
}
