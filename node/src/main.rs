//! WPE Worker Node - Work Order Processor Enclave Manager
//!
//! This is the main entry point for the WPE worker node. It establishes the
//! enclave's cryptographic identity, registers the worker with the Key
//! Management Enclave, and then serves work orders until shutdown.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use wpe_config::{WpeConfig, DEFAULT_CONFIG_FILE};
use wpe_enclave::SimulationEnclave;
use wpe_kme_client::HttpKmeClient;
use wpe_worker::{
    InMemoryWorkerRegistry, WorkOrderProcessor, WorkOrderProcessorEnclaveManager,
};

mod dispatch;

#[tokio::main]
async fn main() {
    let matches = Command::new("wpe-node")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Work Order Processor Enclave worker node")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .num_args(1..),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Configuration folder")
                .num_args(1..),
        )
        .arg(
            Arg::new("kme-listener-url")
                .long("kme-listener-url")
                .value_name("URL")
                .help("KME listener url for requests to KME"),
        )
        .arg(
            Arg::new("worker-id")
                .long("worker-id")
                .value_name("ID")
                .help("Id of worker in plain text"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log verbosity (error, warn, info, debug, trace)"),
        )
        .get_matches();

    // Configuration failures are fatal before the core is constructed
    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    let log_level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| config.logging.level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    info!("Starting WPE worker node");
    info!(worker_id = %config.worker.id, kme_listener = %config.kme_listener.url,
        "node configuration loaded");

    if let Err(e) = run_node(config).await {
        error!("WPE worker node failed: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(matches: &ArgMatches) -> Result<WpeConfig> {
    let files: Vec<String> = matches
        .get_many::<String>("config")
        .map(|values| values.cloned().collect())
        .unwrap_or_else(|| vec![DEFAULT_CONFIG_FILE.to_string()]);
    let search_paths: Vec<PathBuf> = matches
        .get_many::<String>("config-dir")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_else(WpeConfig::default_search_paths);

    let mut config =
        WpeConfig::load(&files, &search_paths).context("Failed to load configuration")?;
    config.apply_overrides(
        matches.get_one::<String>("kme-listener-url").cloned(),
        matches.get_one::<String>("worker-id").cloned(),
    );
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run_node(config: WpeConfig) -> Result<()> {
    // Instantiating the enclave session initializes the TEE
    let enclave = Arc::new(SimulationEnclave::new(
        config.enclave.id.clone(),
        config.enclave.base_name.clone(),
    ));
    enclave
        .initialize()
        .context("Failed to initialize enclave session")?;

    let requester = Arc::new(
        HttpKmeClient::new(
            &config.kme_listener.url,
            Duration::from_secs(config.kme_listener.connect_timeout_secs),
        )
        .context("Failed to create KME client")?,
    );
    let registry = Arc::new(InMemoryWorkerRegistry::new());

    let manager = Arc::new(WorkOrderProcessorEnclaveManager::new(
        config.worker.id.clone(),
        &config.enclave.id,
        enclave.clone(),
        enclave,
        requester,
        registry,
    ));

    // Signup and registration run exactly once, before any work order
    info!("Booting WPE enclave manager");
    manager
        .boot()
        .await
        .context("WPE boot sequence failed, cannot serve work orders")?;
    info!("WPE enclave manager booted, accepting work orders");

    dispatch::run(manager).await
}
