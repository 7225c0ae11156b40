//! Access policy linker
//!
//! Runs once both fleet handles exist. Issues exactly three links:
//! a read-only describe grant so the controller can enumerate workers, a
//! secret grant scoped to one exact credential identifier, and the network
//! paths (controller reaches workers on everything, the outside reaches the
//! controller on one administrative port only).

use tracing::info;

use barrage_core::config::AccessConfig;
use barrage_domain::{AccessGrant, Action, FleetRole, PortSpec, ResourceScope};

use crate::error::FleetError;
use crate::provider::{FleetHandle, PathSource, ProvisioningApi};

/// Link the two fleets with least-privilege grants and network paths
///
/// Returns the grants that were attached. When `keypair_name` is `None` the
/// secret grant is skipped entirely; no wildcard fallback exists for secret
/// retrieval.
pub async fn link_fleets(
    api: &dyn ProvisioningApi,
    worker: &FleetHandle,
    controller: &FleetHandle,
    access: &AccessConfig,
    keypair_name: Option<&str>,
) -> Result<Vec<AccessGrant>, FleetError> {
    let mut grants = Vec::new();

    // Controller enumerates workers for inventory discovery: describe only,
    // wildcard scope is acceptable for this single read-only action.
    let describe = AccessGrant::new(
        FleetRole::Controller,
        FleetRole::Worker,
        [Action::DescribeInstances].into_iter().collect(),
        ResourceScope::Wildcard,
    )?;
    api.attach_policy(controller, &describe).await?;
    grants.push(describe);

    if let Some(name) = keypair_name {
        api.ensure_keypair(name).await?;

        // The credential grant is pinned to the exact identifier
        let secret = AccessGrant::new(
            FleetRole::Controller,
            FleetRole::Worker,
            [Action::GetSecret].into_iter().collect(),
            ResourceScope::Exact(name.to_string()),
        )?;
        api.attach_policy(controller, &secret).await?;
        grants.push(secret);
    } else {
        info!("no keypair configured, skipping secret grant");
    }

    // Controller talks to workers on everything
    api.open_network_path(
        PathSource::Fleet(controller.fleet_id.clone()),
        worker,
        PortSpec::AllTraffic,
    )
    .await?;

    // The outside reaches the controller on the administrative port only
    api.open_network_path(
        PathSource::External,
        controller,
        PortSpec::Tcp(access.admin_port),
    )
    .await?;

    info!(
        grants = grants.len(),
        admin_port = access.admin_port,
        "fleets linked"
    );

    Ok(grants)
}
