//! WPE Trusted Enclave Capability
//!
//! This crate defines the boundary between untrusted orchestration code and
//! the trusted execution environment of a Work Order Processor Enclave:
//! - Nonce generation, signature verification and signup-data creation for
//!   the signup protocol
//! - Work-order execution routed into the enclave
//! - Worker identity and measurement types shared across the platform
//!
//! # Features
//!
//! - `simulation` (default): Run in simulation mode without real TEE hardware
//! - `sgx-hw`: Enable real Intel SGX hardware support
//!
//! Production and test builds supply different implementations of the same
//! capability traits, so the signup and execution logic upstream never
//! depends on real trusted hardware.

pub mod capability;
pub mod error;
pub mod identity;
pub mod signup;

#[cfg(feature = "sgx-hw")]
pub mod hardware;
#[cfg(feature = "simulation")]
pub mod simulation;

pub use capability::{EnclaveCapability, EnclaveType, EnclaveWorkOrder, WorkOrderExecution};
pub use error::{EnclaveError, EnclaveResult};
pub use identity::{EnclaveIdentity, ExtendedMeasurement, MEASUREMENT_SIZE};
pub use signup::{SignupData, SignupProofData};

#[cfg(feature = "simulation")]
pub use simulation::SimulationEnclave;
