//! Test utilities for coordinator integration tests

use std::sync::Arc;

use barrage_core::config::DeployConfig;
use barrage_orchestrator::{FleetCoordinator, InMemoryProvisioner, StepExecutor};

/// Rehearsal configuration with ceilings short enough for tests
pub fn rehearsal_config(worker_count: u32) -> DeployConfig {
    let mut config = DeployConfig::default_config();
    config.deployment.worker_count = worker_count;
    config.deployment.keypair_name = Some("ansible-orch-key".to_string());
    config.gate.worker_timeout_secs = 5;
    config.gate.controller_timeout_secs = 5;
    config
}

/// Coordinator plus its provisioner, for post-deploy inspection
pub fn rehearsal(
    config: DeployConfig,
) -> (FleetCoordinator, Arc<InMemoryProvisioner>) {
    let api = Arc::new(InMemoryProvisioner::new());
    (FleetCoordinator::new(api.clone(), config), api)
}

/// Same, with a custom step executor for failure injection
pub fn rehearsal_with_executor(
    config: DeployConfig,
    executor: Arc<dyn StepExecutor>,
) -> (FleetCoordinator, Arc<InMemoryProvisioner>) {
    let api = Arc::new(InMemoryProvisioner::with_executor(executor));
    (FleetCoordinator::new(api.clone(), config), api)
}
