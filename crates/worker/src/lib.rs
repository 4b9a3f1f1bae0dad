//! WPE worker core
//!
//! The trust-sensitive state machine between untrusted orchestration code
//! and the trusted enclave of a work-order processor:
//!
//! - [`SignupCoordinator`]: nonce generation, verification-key retrieval,
//!   signature verification and signup-data creation, in a fixed order with
//!   no retries
//! - [`RegistrationFlow`]: registration with the KME and the worker-identity
//!   mapping write
//! - [`WorkOrderExecutor`]: preprocessing and enclave execution of one work
//!   order, with every failure converted into a response envelope
//! - [`WorkOrderProcessorEnclaveManager`]: composition of the above behind
//!   the lifecycle hooks the pool lifecycle manager drives
//!
//! Signup and registration happen exactly once per process lifetime,
//! strictly before any work-order execution; the manager's write-once boot
//! state enforces that ordering.

pub mod envelope;
pub mod error;
pub mod executor;
pub mod manager;
pub mod registration;
pub mod registry;
pub mod signup;
pub mod status;

pub use envelope::error_response;
pub use error::{ManagerError, ManagerResult};
pub use executor::WorkOrderExecutor;
pub use manager::{WorkOrderProcessor, WorkOrderProcessorEnclaveManager};
pub use registration::RegistrationFlow;
pub use registry::{InMemoryWorkerRegistry, RegistryError, WorkerRegistry};
pub use signup::{SignupCoordinator, SignupOutcome};
pub use status::WorkOrderStatus;

#[cfg(test)]
pub(crate) mod test_support;
