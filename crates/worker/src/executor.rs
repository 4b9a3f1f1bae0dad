//! Work-order execution
//!
//! Bridges one raw work-order request into the enclave and back. The entry
//! point is total: every failure path, including panics out of the
//! execution capability, comes back to the caller as a response envelope so
//! one bad work order never takes the worker process down.

use crate::envelope::{self, error_response};
use crate::error::{ManagerError, ManagerResult};
use crate::status::WorkOrderStatus;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;
use wpe_enclave::{EnclaveError, EnclaveType, EnclaveWorkOrder, WorkOrderExecution};
use wpe_kme_client::KmeRequester;

/// Executes work orders against the enclave.
pub struct WorkOrderExecutor {
    requester: Arc<dyn KmeRequester>,
    execution: Arc<dyn WorkOrderExecution>,
    encryption_key: String,
}

impl WorkOrderExecutor {
    /// Bind an executor to the KME requester, the enclave execution
    /// capability, and this worker's encryption key.
    pub fn new(
        requester: Arc<dyn KmeRequester>,
        execution: Arc<dyn WorkOrderExecution>,
        encryption_key: impl Into<String>,
    ) -> Self {
        Self {
            requester,
            execution,
            encryption_key: encryption_key.into(),
        }
    }

    /// Submit one work-order request and return the response envelope.
    ///
    /// Never fails to its caller: faults are converted into
    /// `{"error": {"code": .., "message": ..}}` envelopes.
    pub async fn execute_in_enclave(&self, request_json: &str) -> serde_json::Value {
        match self.try_execute(request_json).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "failed to execute work order");
                let (status, message) = classify(&e);
                error_response(status, &message)
            }
        }
    }

    async fn try_execute(&self, request_json: &str) -> ManagerResult<serde_json::Value> {
        let preprocessed = self
            .requester
            .preprocess_work_order(request_json, &self.encryption_key)
            .await?;
        if envelope::is_error(&preprocessed) {
            // Payload was not decryptable or well-formed for this worker;
            // skip execution and hand the error back unchanged
            error!("failed to preprocess work order at WPE");
            return Ok(preprocessed);
        }

        let order = EnclaveWorkOrder::new(EnclaveType::Wpe, request_json, preprocessed);
        let execution = Arc::clone(&self.execution);
        match catch_unwind(AssertUnwindSafe(move || execution.execute(&order))) {
            Ok(result) => Ok(result?),
            Err(panic) => Err(ManagerError::Enclave(EnclaveError::ExecutionFailed(
                panic_message(panic),
            ))),
        }
    }
}

/// Map a fault to the envelope status and message.
///
/// Enclave-type mismatches get their own status rather than being folded
/// into generic failures.
fn classify(error: &ManagerError) -> (WorkOrderStatus, String) {
    match error {
        ManagerError::Enclave(EnclaveError::UnknownEnclaveType(enclave_type)) => (
            WorkOrderStatus::InvalidWorkload,
            format!("unknown enclave type: {}", enclave_type),
        ),
        ManagerError::Enclave(EnclaveError::ExecutionFailed(message)) => {
            (WorkOrderStatus::Failed, message.clone())
        }
        other => (WorkOrderStatus::Failed, other.to_string()),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "work order execution panicked".to_string()
    }
}
