//! Fleet coordinator
//!
//! Top-level orchestration: plan, provision both fleets concurrently, gate
//! on health, then link access. Failures aggregate into one
//! [`FleetError`]; a timed-out gate cancels the sibling fleet's wait.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use barrage_core::config::DeployConfig;
use barrage_domain::{AccessGrant, FleetSpec};

use crate::error::FleetError;
use crate::gate::{GateReport, GateState};
use crate::planner::plan_fleets;
use crate::policy::link_fleets;
use crate::provider::{FleetHandle, ProvisioningApi};

/// Outcome of a successful deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentReport {
    /// Worker fleet handle
    pub worker: FleetHandle,
    /// Controller fleet handle
    pub controller: FleetHandle,
    /// Worker gate outcome
    pub worker_gate: GateReport,
    /// Controller gate outcome
    pub controller_gate: GateReport,
    /// Access grants issued by the policy linker
    pub grants: Vec<AccessGrant>,
}

/// Single parameterized deployment coordinator
pub struct FleetCoordinator {
    api: Arc<dyn ProvisioningApi>,
    config: DeployConfig,
}

impl FleetCoordinator {
    /// Create a coordinator over a provisioning API
    pub fn new(api: Arc<dyn ProvisioningApi>, config: DeployConfig) -> Self {
        Self { api, config }
    }

    /// Run one deployment to completion
    ///
    /// Plans capacity, requests both fleets concurrently, blocks on both
    /// health gates (first failure cancels the sibling wait), then links
    /// access between the fleets. Never reports a partially provisioned
    /// fleet as success.
    pub async fn deploy(&self) -> Result<DeploymentReport, FleetError> {
        let plan = plan_fleets(
            &self.config.deployment,
            &self.config.capacity,
            &self.config.access,
        )?;

        info!(
            workers = plan.worker.expected_instance_count(),
            instance_class = %plan.worker.instance_class,
            "deployment planned"
        );

        // No ordering dependency between the two requests until the policy
        // link step, which needs both handles.
        let (worker, controller) = tokio::try_join!(
            request(self.api.as_ref(), &plan.worker),
            request(self.api.as_ref(), &plan.controller),
        )?;

        let (worker_gate, controller_gate) = tokio::try_join!(
            self.await_gate(
                &worker,
                plan.worker.expected_instance_count(),
                Duration::from_secs(self.config.gate.worker_timeout_secs),
            ),
            self.await_gate(
                &controller,
                plan.controller.expected_instance_count(),
                Duration::from_secs(self.config.gate.controller_timeout_secs),
            ),
        )?;

        let grants = link_fleets(
            self.api.as_ref(),
            &worker,
            &controller,
            &self.config.access,
            self.config.deployment.keypair_name.as_deref(),
        )
        .await?;

        info!(
            worker = %worker.fleet_id,
            controller = %controller.fleet_id,
            grants = grants.len(),
            "deployment complete"
        );

        Ok(DeploymentReport {
            worker,
            controller,
            worker_gate,
            controller_gate,
            grants,
        })
    }

    async fn await_gate(
        &self,
        handle: &FleetHandle,
        expected: u32,
        ceiling: Duration,
    ) -> Result<GateReport, FleetError> {
        let report = self.api.wait_for_signals(handle, expected, ceiling).await?;

        if report.state == GateState::Healthy {
            Ok(report)
        } else {
            Err(FleetError::GateTimeout {
                role: report.role,
                ceiling_secs: ceiling.as_secs(),
                healthy: report.healthy,
                expected: report.expected,
            })
        }
    }
}

async fn request(
    api: &dyn ProvisioningApi,
    spec: &FleetSpec,
) -> Result<FleetHandle, FleetError> {
    Ok(api.request_fleet(spec).await?)
}
