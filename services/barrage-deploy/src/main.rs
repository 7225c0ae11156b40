//! Deployment rehearsal driver
//!
//! Loads a deployment configuration, runs the full coordinator against the
//! in-memory provisioner, and prints the aggregated report. A failed gate
//! or rejected request exits nonzero; a partially provisioned fleet is
//! never reported as success.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use barrage_core::config::DeployConfig;
use barrage_core::logging;
use barrage_orchestrator::{FleetCoordinator, InMemoryProvisioner};

struct Args {
    config_path: Option<PathBuf>,
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;

    if args.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    let config = match &args.config_path {
        Some(path) => DeployConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DeployConfig::default_config(),
    };

    info!(
        workers = config.deployment.worker_count,
        instance_class = %config.deployment.instance_class,
        "starting deployment rehearsal"
    );

    let api = Arc::new(InMemoryProvisioner::new());
    let coordinator = FleetCoordinator::new(api, config);

    match coordinator.deploy().await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "deployment failed");
            std::process::exit(1);
        }
    }
}

fn parse_args(args: Vec<String>) -> anyhow::Result<Args> {
    let mut config_path = None;
    let mut json_logs = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .context("--config was provided without a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--log-json" => json_logs = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Args {
        config_path,
        json_logs,
    })
}
