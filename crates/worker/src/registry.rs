//! Worker-identity registry delegate

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use wpe_enclave::EnclaveIdentity;

/// Errors raised by a worker registry backend.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The backing store rejected or failed the write.
    #[error("Registry storage error: {0}")]
    Storage(String),
}

/// Delegate recording which enclave identity serves a logical worker id.
///
/// Registration writes through this trait exactly once per process; the
/// mapping makes the worker discoverable to clients submitting work orders.
/// Persistent storage is owned by the surrounding platform, not this core.
pub trait WorkerRegistry: Send + Sync {
    /// Record `identity` as the processor behind `worker_id`.
    fn update_worker_map(
        &self,
        worker_id: &str,
        identity: &EnclaveIdentity,
    ) -> Result<(), RegistryError>;

    /// Look up the identity registered for `worker_id`.
    fn lookup(&self, worker_id: &str) -> Option<EnclaveIdentity>;
}

/// Process-local registry used by the node binary and tests.
#[derive(Default)]
pub struct InMemoryWorkerRegistry {
    map: RwLock<HashMap<String, EnclaveIdentity>>,
}

impl InMemoryWorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkerRegistry for InMemoryWorkerRegistry {
    fn update_worker_map(
        &self,
        worker_id: &str,
        identity: &EnclaveIdentity,
    ) -> Result<(), RegistryError> {
        self.map
            .write()
            .insert(worker_id.to_string(), identity.clone());
        Ok(())
    }

    fn lookup(&self, worker_id: &str) -> Option<EnclaveIdentity> {
        self.map.read().get(worker_id).cloned()
    }
}
