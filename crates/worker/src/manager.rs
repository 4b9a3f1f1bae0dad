//! Enclave manager composition
//!
//! [`WorkOrderProcessorEnclaveManager`] wires the signup coordinator, the
//! registration flow and the work-order executor behind the three lifecycle
//! hooks the external pool lifecycle manager drives, in this order:
//! `create_signup_data`, `on_boot`, then repeated `execute_in_enclave`
//! calls. Boot state is write-once; after registration it is read-only, so
//! the execution entry point is safe to invoke repeatedly even if the host
//! parallelizes dispatch.

use crate::envelope::error_response;
use crate::error::{ManagerError, ManagerResult};
use crate::executor::WorkOrderExecutor;
use crate::registration::RegistrationFlow;
use crate::registry::WorkerRegistry;
use crate::signup::{SignupCoordinator, SignupOutcome};
use crate::status::WorkOrderStatus;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::OnceLock;
use tracing::info;
use wpe_enclave::{EnclaveCapability, EnclaveIdentity, SignupData, WorkOrderExecution};
use wpe_kme_client::KmeRequester;

/// Lifecycle hooks expected by the external pool lifecycle manager.
///
/// The caller must drive the hooks in order: `create_signup_data`, then
/// `on_boot`, then any number of `execute_in_enclave` calls.
#[async_trait]
pub trait WorkOrderProcessor: Send + Sync {
    /// Run the signup protocol and produce this worker's signup data.
    async fn create_signup_data(&self) -> ManagerResult<SignupData>;

    /// Register the signed-up worker with the KME.
    async fn on_boot(&self) -> ManagerResult<()>;

    /// Execute one work-order request; always returns a response envelope.
    async fn execute_in_enclave(&self, request_json: &str) -> serde_json::Value;

    /// Run the two boot hooks in their mandated order.
    async fn boot(&self) -> ManagerResult<()> {
        self.create_signup_data().await?;
        self.on_boot().await
    }
}

/// Manager handling work-order processing in a worker pool setup.
pub struct WorkOrderProcessorEnclaveManager {
    worker_id: String,
    identity: EnclaveIdentity,
    signup: SignupCoordinator,
    registration: RegistrationFlow,
    requester: Arc<dyn KmeRequester>,
    execution: Arc<dyn WorkOrderExecution>,
    outcome: OnceLock<SignupOutcome>,
    executor: OnceLock<WorkOrderExecutor>,
}

impl WorkOrderProcessorEnclaveManager {
    /// Compose a manager from its injected collaborators.
    ///
    /// The worker identity digest is derived from `enclave_id` here,
    /// exactly once for the process lifetime.
    pub fn new(
        worker_id: impl Into<String>,
        enclave_id: &str,
        enclave: Arc<dyn EnclaveCapability>,
        execution: Arc<dyn WorkOrderExecution>,
        requester: Arc<dyn KmeRequester>,
        registry: Arc<dyn WorkerRegistry>,
    ) -> Self {
        let worker_id = worker_id.into();
        let identity = EnclaveIdentity::derive(enclave_id);
        info!(worker_id = %worker_id, identity = %identity, "WPE enclave manager created");

        Self {
            signup: SignupCoordinator::new(enclave, Arc::clone(&requester)),
            registration: RegistrationFlow::new(
                Arc::clone(&requester),
                registry,
                worker_id.clone(),
                identity.clone(),
            ),
            worker_id,
            identity,
            requester,
            execution,
            outcome: OnceLock::new(),
            executor: OnceLock::new(),
        }
    }

    /// The identity digest this worker registers under.
    pub fn identity(&self) -> &EnclaveIdentity {
        &self.identity
    }

    /// The logical worker id within the pool.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Whether registration has completed and work orders are accepted.
    pub fn is_registered(&self) -> bool {
        self.executor.get().is_some()
    }
}

#[async_trait]
impl WorkOrderProcessor for WorkOrderProcessorEnclaveManager {
    async fn create_signup_data(&self) -> ManagerResult<SignupData> {
        if self.outcome.get().is_some() {
            return Err(ManagerError::BootOrder(
                "signup data already created".to_string(),
            ));
        }
        let outcome = self.signup.create_signup_data().await?;
        let signup_data = outcome.signup_data.clone();
        // First writer wins; the guard above makes a second writer an error
        // before reaching here in single-threaded boot
        let _ = self.outcome.set(outcome);
        Ok(signup_data)
    }

    async fn on_boot(&self) -> ManagerResult<()> {
        let outcome = self.outcome.get().ok_or_else(|| {
            ManagerError::BootOrder("on_boot called before signup data was created".to_string())
        })?;
        if self.executor.get().is_some() {
            return Err(ManagerError::BootOrder(
                "worker already registered".to_string(),
            ));
        }

        self.registration.register(outcome).await?;

        let executor = WorkOrderExecutor::new(
            Arc::clone(&self.requester),
            Arc::clone(&self.execution),
            outcome.signup_data.encryption_key.clone(),
        );
        let _ = self.executor.set(executor);
        Ok(())
    }

    async fn execute_in_enclave(&self, request_json: &str) -> serde_json::Value {
        match self.executor.get() {
            Some(executor) => executor.execute_in_enclave(request_json).await,
            None => error_response(
                WorkOrderStatus::Failed,
                "work order received before registration completed",
            ),
        }
    }
}
