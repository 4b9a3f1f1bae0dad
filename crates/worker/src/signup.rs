//! Signup coordination
//!
//! Drives the signup protocol in its mandated order: fresh nonce, unique
//! verification key exchange, signature verification, signup-data creation.
//! There are no retries at this layer; reusing a nonce or proceeding past a
//! failed verification would leak or mis-trust cryptographic material, so
//! every failure is terminal.

use crate::error::{ManagerError, ManagerResult};
use std::sync::Arc;
use tracing::{error, info};
use wpe_enclave::{EnclaveCapability, EnclaveType, SignupData};
use wpe_kme_client::KmeRequester;

/// Nonce length for the verification key exchange, in bytes.
pub const VERIFICATION_KEY_NONCE_LENGTH: usize = 32;

/// Everything produced by a successful signup.
///
/// The verification key and its signature are held only until registration
/// completes; they are never persisted.
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    /// Signup data created inside the enclave
    pub signup_data: SignupData,
    /// The KME-issued unique verification key, verified before use
    pub verification_key: String,
    /// Signature over the verification key
    pub verification_key_signature: String,
}

/// Orchestrates signup against the enclave capability and the KME.
pub struct SignupCoordinator {
    enclave: Arc<dyn EnclaveCapability>,
    requester: Arc<dyn KmeRequester>,
}

impl SignupCoordinator {
    /// Bind a coordinator to an initialized enclave session and a KME
    /// requester.
    pub fn new(enclave: Arc<dyn EnclaveCapability>, requester: Arc<dyn KmeRequester>) -> Self {
        Self { enclave, requester }
    }

    /// Run the signup protocol once and return its outcome.
    pub async fn create_signup_data(&self) -> ManagerResult<SignupOutcome> {
        info!(enclave_type = %EnclaveType::Wpe, "opening signup session");

        // Nonce must be fresh per signup attempt
        let nonce = self
            .enclave
            .generate_nonce(VERIFICATION_KEY_NONCE_LENGTH)?;
        info!(nonce = %hex::encode(&nonce), "nonce generated by requester WPE");

        let response = self
            .requester
            .request_unique_verification_key(&nonce)
            .await?;
        let response = response.ok_or_else(|| {
            error!("failed to get unique verification key from KME");
            ManagerError::NoKmeResponse
        })?;

        // Response contains result, verification_key and
        // verification_key_signature delimited by ' '
        let fields: Vec<&str> = response.split(' ').collect();
        if fields.len() != 3 {
            error!(
                fields = fields.len(),
                "malformed unique verification key response"
            );
            return Err(ManagerError::MalformedKmeResponse(fields.len()));
        }
        let verification_key = fields[1];
        let verification_key_signature = fields[2];

        if !self
            .enclave
            .verify_signature(verification_key, verification_key_signature)?
        {
            error!("failed to verify unique verification key signature");
            return Err(ManagerError::SignatureVerification);
        }

        // Only a verified key may be bound into signup data
        let signup_data = self.enclave.create_signup_data(verification_key)?;
        info!(proof_data = %signup_data.proof_data, "WPE signup data created");

        Ok(SignupOutcome {
            signup_data,
            verification_key: verification_key.to_string(),
            verification_key_signature: verification_key_signature.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_signup_data, MockEnclave, MockRequester};
    use mockall::predicate::eq;

    fn coordinator(enclave: MockEnclave, requester: MockRequester) -> SignupCoordinator {
        SignupCoordinator::new(Arc::new(enclave), Arc::new(requester))
    }

    fn enclave_with_nonce(nonce: Vec<u8>) -> MockEnclave {
        let mut enclave = MockEnclave::new();
        enclave
            .expect_generate_nonce()
            .with(eq(VERIFICATION_KEY_NONCE_LENGTH))
            .times(1)
            .returning(move |_| Ok(nonce.clone()));
        enclave
    }

    #[tokio::test]
    async fn signup_completes_in_order_on_valid_response() {
        let mut enclave = enclave_with_nonce(vec![0u8; 32]);
        enclave
            .expect_verify_signature()
            .with(eq("abcKEY"), eq("sigABC"))
            .times(1)
            .returning(|_, _| Ok(true));
        enclave
            .expect_create_signup_data()
            .with(eq("abcKEY"))
            .times(1)
            .returning(|key| Ok(sample_signup_data(key)));

        let mut requester = MockRequester::new();
        requester
            .expect_request_unique_verification_key()
            .withf(|nonce| nonce == [0u8; 32])
            .times(1)
            .returning(|_| Ok(Some("ok abcKEY sigABC".to_string())));

        let outcome = coordinator(enclave, requester)
            .create_signup_data()
            .await
            .unwrap();

        assert_eq!(outcome.verification_key, "abcKEY");
        assert_eq!(outcome.verification_key_signature, "sigABC");
        assert_eq!(outcome.signup_data.verification_key, "abcKEY");
    }

    #[tokio::test]
    async fn no_kme_response_is_terminal() {
        let mut enclave = enclave_with_nonce(vec![1u8; 32]);
        // Neither verification nor signup-data creation may run
        enclave.expect_verify_signature().times(0);
        enclave.expect_create_signup_data().times(0);

        let mut requester = MockRequester::new();
        requester
            .expect_request_unique_verification_key()
            .times(1)
            .returning(|_| Ok(None));

        let result = coordinator(enclave, requester).create_signup_data().await;
        assert!(matches!(result, Err(ManagerError::NoKmeResponse)));
    }

    #[tokio::test]
    async fn malformed_response_field_counts_are_rejected() {
        for (response, expected_fields) in [
            ("", 1),
            ("ok", 1),
            ("ok abcKEY", 2),
            ("ok abcKEY sigABC extra", 4),
        ] {
            let mut enclave = enclave_with_nonce(vec![2u8; 32]);
            enclave.expect_verify_signature().times(0);
            enclave.expect_create_signup_data().times(0);

            let response = response.to_string();
            let mut requester = MockRequester::new();
            requester
                .expect_request_unique_verification_key()
                .times(1)
                .returning(move |_| Ok(Some(response.clone())));

            let result = coordinator(enclave, requester).create_signup_data().await;
            match result {
                Err(ManagerError::MalformedKmeResponse(n)) => assert_eq!(n, expected_fields),
                other => panic!("expected malformed response error, got {:?}", other.err()),
            }
        }
    }

    #[tokio::test]
    async fn failed_signature_verification_stops_signup() {
        let mut enclave = enclave_with_nonce(vec![3u8; 32]);
        enclave
            .expect_verify_signature()
            .times(1)
            .returning(|_, _| Ok(false));
        enclave.expect_create_signup_data().times(0);

        let mut requester = MockRequester::new();
        requester
            .expect_request_unique_verification_key()
            .times(1)
            .returning(|_| Ok(Some("ok abcKEY forged".to_string())));

        let result = coordinator(enclave, requester).create_signup_data().await;
        assert!(matches!(result, Err(ManagerError::SignatureVerification)));
    }

    #[tokio::test]
    async fn nonce_is_requested_fresh_per_attempt() {
        let mut enclave = MockEnclave::new();
        let mut draws = 0u8;
        enclave
            .expect_generate_nonce()
            .times(2)
            .returning(move |len| {
                draws += 1;
                Ok(vec![draws; len])
            });
        enclave.expect_verify_signature().times(0);
        enclave.expect_create_signup_data().times(0);

        let mut requester = MockRequester::new();
        let mut seen: Vec<Vec<u8>> = Vec::new();
        requester
            .expect_request_unique_verification_key()
            .times(2)
            .returning(move |nonce| {
                assert!(!seen.contains(&nonce.to_vec()), "nonce reused across attempts");
                seen.push(nonce.to_vec());
                Ok(None)
            });

        let coordinator = coordinator(enclave, requester);
        assert!(coordinator.create_signup_data().await.is_err());
        assert!(coordinator.create_signup_data().await.is_err());
    }
}
