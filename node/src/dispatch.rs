//! Work-order intake and dispatch
//!
//! Stand-in for the external pool scheduler: one JSON work order per line
//! on stdin, one response envelope per line on stdout. Work orders are
//! dispatched strictly one at a time; a failing work order produces an
//! error envelope and the loop keeps serving.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{error, info};
use wpe_worker::WorkOrderProcessor;

/// Serve work orders until stdin closes or a shutdown signal arrives.
pub async fn run(manager: Arc<dyn WorkOrderProcessor>) -> Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping work-order dispatch");
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let request = line.trim();
                        if request.is_empty() {
                            continue;
                        }
                        let response = manager.execute_in_enclave(request).await;
                        stdout.write_all(response.to_string().as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;
                    }
                    Ok(None) => {
                        info!("Work-order intake closed, stopping dispatch");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to read work order from intake");
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
