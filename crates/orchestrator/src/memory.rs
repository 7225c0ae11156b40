//! In-memory provisioner
//!
//! Reference implementation of the [`ProvisioningApi`] boundary used by the
//! rehearsal service and the test suite. Fleets live in process memory;
//! instance bootstraps run as independent tasks and report through the
//! fleet's signal feed.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use barrage_domain::{
    AccessGrant, FleetRole, FleetSpec, HealthSignal, PortSpec, Step, StepKind,
};

use crate::gate::{GateReport, HealthGate};
use crate::provider::{FleetHandle, PathSource, ProvisioningApi, ProvisioningError};
use crate::sequencer::{run_sequence, StepError, StepExecutor};

/// Executor that completes every step immediately
///
/// Stands in for the instance-side init system during rehearsal runs.
#[derive(Debug, Default)]
pub struct SimulatedStepExecutor;

#[async_trait]
impl StepExecutor for SimulatedStepExecutor {
    async fn execute(&self, step: &Step) -> Result<(), StepError> {
        debug!(kind = ?step.kind, payload = ?step.payload, "simulated step");
        Ok(())
    }
}

/// Executor that fails the first step of a chosen kind
///
/// Used to drive unhealthy-fleet scenarios in tests.
#[derive(Debug)]
pub struct FailingStepExecutor {
    /// Step kind that fails
    pub fail_kind: StepKind,
}

#[async_trait]
impl StepExecutor for FailingStepExecutor {
    async fn execute(&self, step: &Step) -> Result<(), StepError> {
        if step.kind == self.fail_kind {
            return Err(StepError(format!("{:?} rejected by executor", step.kind)));
        }
        Ok(())
    }
}

struct FleetRecord {
    spec: FleetSpec,
    handle: FleetHandle,
    launched: u32,
    signal_tx: mpsc::Sender<HealthSignal>,
    feed: Option<mpsc::Receiver<HealthSignal>>,
}

/// In-process provisioning API
///
/// One fleet per role; a re-request against the same identity reconciles
/// instead of creating duplicates. When a spec leaves `desired_count`
/// unset, the current (externally managed) capacity wins.
pub struct InMemoryProvisioner {
    executor: Arc<dyn StepExecutor>,
    fleets: Mutex<HashMap<FleetRole, FleetRecord>>,
    keypairs: Mutex<BTreeSet<String>>,
    grants: Mutex<Vec<(String, AccessGrant)>>,
    paths: Mutex<Vec<(PathSource, String, PortSpec)>>,
    rejected_roles: Mutex<BTreeSet<FleetRole>>,
    created_fleets: AtomicU32,
}

impl InMemoryProvisioner {
    /// Provisioner whose instances bootstrap successfully
    pub fn new() -> Self {
        Self::with_executor(Arc::new(SimulatedStepExecutor))
    }

    /// Provisioner with a custom step executor
    pub fn with_executor(executor: Arc<dyn StepExecutor>) -> Self {
        Self {
            executor,
            fleets: Mutex::new(HashMap::new()),
            keypairs: Mutex::new(BTreeSet::new()),
            grants: Mutex::new(Vec::new()),
            paths: Mutex::new(Vec::new()),
            rejected_roles: Mutex::new(BTreeSet::new()),
            created_fleets: AtomicU32::new(0),
        }
    }

    /// Make every future request for `role` fail with a rejection
    pub fn reject_role(&self, role: FleetRole) {
        self.rejected_roles.lock().unwrap().insert(role);
    }

    /// Fleets created so far (reconciliations excluded)
    pub fn created_fleet_count(&self) -> u32 {
        self.created_fleets.load(Ordering::SeqCst)
    }

    /// Live handle for a role, if the fleet exists
    pub fn handle(&self, role: FleetRole) -> Option<FleetHandle> {
        self.fleets
            .lock()
            .unwrap()
            .get(&role)
            .map(|r| r.handle.clone())
    }

    /// Instances currently in the fleet
    pub fn instance_count(&self, role: FleetRole) -> usize {
        self.handle(role).map_or(0, |h| h.instance_ids.len())
    }

    /// Grants attached to a fleet
    pub fn grants_for(&self, fleet_id: &str) -> Vec<AccessGrant> {
        self.grants
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == fleet_id)
            .map(|(_, g)| g.clone())
            .collect()
    }

    /// Opened network paths as (source, target fleet, ports)
    pub fn network_paths(&self) -> Vec<(PathSource, String, PortSpec)> {
        self.paths.lock().unwrap().clone()
    }

    /// Whether a keypair credential exists
    pub fn has_keypair(&self, name: &str) -> bool {
        self.keypairs.lock().unwrap().contains(name)
    }

    /// Number of stored keypair credentials
    pub fn keypair_count(&self) -> usize {
        self.keypairs.lock().unwrap().len()
    }

    fn launch_instance(
        &self,
        instance_id: String,
        spec: &FleetSpec,
        tx: mpsc::Sender<HealthSignal>,
    ) {
        let steps = spec.bootstrap_steps.clone();
        let role = spec.role;
        let executor = Arc::clone(&self.executor);

        tokio::spawn(async move {
            let signal = match run_sequence(executor.as_ref(), &steps).await {
                Ok(()) => HealthSignal::success(instance_id.as_str(), role),
                Err(failure) => {
                    warn!(instance = %instance_id, error = %failure, "instance bootstrap aborted");
                    HealthSignal::failure(instance_id.as_str(), role)
                }
            };
            // The receiver is gone once the deployment has already failed
            let _ = tx.send(signal).await;
        });
    }
}

impl Default for InMemoryProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProvisioningApi for InMemoryProvisioner {
    async fn request_fleet(&self, spec: &FleetSpec) -> Result<FleetHandle, ProvisioningError> {
        spec.validate()
            .map_err(|e| ProvisioningError::Rejected(e.to_string()))?;

        if self.rejected_roles.lock().unwrap().contains(&spec.role) {
            return Err(ProvisioningError::Rejected(format!(
                "{} fleet rejected by provider",
                spec.role
            )));
        }

        let mut fleets = self.fleets.lock().unwrap();
        match fleets.entry(spec.role) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                match spec.desired_count {
                    // No desired count: an externally managed capacity wins
                    None => {
                        debug!(
                            fleet = %record.handle.fleet_id,
                            capacity = record.handle.capacity,
                            "desired count unset, keeping externally managed capacity"
                        );
                    }
                    Some(desired) if desired == record.handle.capacity => {
                        debug!(fleet = %record.handle.fleet_id, "fleet already at desired capacity");
                    }
                    Some(desired) if desired > record.handle.capacity => {
                        let grow = desired - record.handle.capacity;
                        for _ in 0..grow {
                            record.launched += 1;
                            let id = format!("{}-i-{:04}", spec.role, record.launched);
                            record.handle.instance_ids.push(id.clone());
                            self.launch_instance(id, spec, record.signal_tx.clone());
                        }
                        record.handle.capacity = desired;
                        info!(fleet = %record.handle.fleet_id, added = grow, "fleet scaled up");
                    }
                    Some(desired) => {
                        record.handle.instance_ids.truncate(desired as usize);
                        record.handle.capacity = desired;
                        info!(fleet = %record.handle.fleet_id, capacity = desired, "fleet scaled down");
                    }
                }
                record.spec = spec.clone();
                Ok(record.handle.clone())
            }
            Entry::Vacant(vacant) => {
                let capacity = spec.expected_instance_count();
                let fleet_id = format!("fleet-{}", spec.role);
                let (tx, rx) = mpsc::channel((spec.max_count as usize).max(1));

                let mut handle = FleetHandle {
                    fleet_id: fleet_id.clone(),
                    role: spec.role,
                    instance_ids: Vec::with_capacity(capacity as usize),
                    capacity,
                };

                let mut launched = 0;
                for _ in 0..capacity {
                    launched += 1;
                    let id = format!("{}-i-{:04}", spec.role, launched);
                    handle.instance_ids.push(id.clone());
                    self.launch_instance(id, spec, tx.clone());
                }

                info!(fleet = %fleet_id, capacity, "fleet created");
                self.created_fleets.fetch_add(1, Ordering::SeqCst);

                vacant.insert(FleetRecord {
                    spec: spec.clone(),
                    handle: handle.clone(),
                    launched,
                    signal_tx: tx,
                    feed: Some(rx),
                });

                Ok(handle)
            }
        }
    }

    async fn attach_policy(
        &self,
        handle: &FleetHandle,
        grant: &AccessGrant,
    ) -> Result<(), ProvisioningError> {
        if self.handle(handle.role).map(|h| h.fleet_id) != Some(handle.fleet_id.clone()) {
            return Err(ProvisioningError::UnknownFleet(handle.fleet_id.clone()));
        }

        self.grants
            .lock()
            .unwrap()
            .push((handle.fleet_id.clone(), grant.clone()));
        Ok(())
    }

    async fn open_network_path(
        &self,
        source: PathSource,
        target: &FleetHandle,
        ports: PortSpec,
    ) -> Result<(), ProvisioningError> {
        if self.handle(target.role).map(|h| h.fleet_id) != Some(target.fleet_id.clone()) {
            return Err(ProvisioningError::UnknownFleet(target.fleet_id.clone()));
        }

        debug!(fleet = %target.fleet_id, %ports, "network path opened");
        self.paths
            .lock()
            .unwrap()
            .push((source, target.fleet_id.clone(), ports));
        Ok(())
    }

    async fn ensure_keypair(&self, name: &str) -> Result<(), ProvisioningError> {
        let mut keypairs = self.keypairs.lock().unwrap();
        if keypairs.contains(name) {
            info!(keypair = name, "keypair already exists, nothing to do");
            return Ok(());
        }

        keypairs.insert(name.to_string());
        info!(keypair = name, "keypair created and stored as scoped secret");
        Ok(())
    }

    async fn wait_for_signals(
        &self,
        handle: &FleetHandle,
        expected: u32,
        ceiling: Duration,
    ) -> Result<GateReport, ProvisioningError> {
        let feed = {
            let mut fleets = self.fleets.lock().unwrap();
            let record = fleets
                .get_mut(&handle.role)
                .filter(|r| r.handle.fleet_id == handle.fleet_id)
                .ok_or_else(|| ProvisioningError::UnknownFleet(handle.fleet_id.clone()))?;

            record
                .feed
                .take()
                .ok_or_else(|| ProvisioningError::SignalFeedConsumed(handle.fleet_id.clone()))?
        };

        Ok(HealthGate::new(handle.role, expected).wait(feed, ceiling).await)
    }
}
