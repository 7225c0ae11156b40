//! Capacity planning
//!
//! Pure translation of operator parameters into two validated fleet specs.
//! Bad input is rejected here, before any remote call is issued.

use thiserror::Error;

use barrage_core::config::{AccessConfig, CapacityBounds, DeployParams};
use barrage_domain::{DomainError, FleetRole, FleetSpec, MachineImageRef, RoleTag, Step};

/// Instance class every controller launches with
pub const CONTROLLER_INSTANCE_CLASS: &str = "t3a.medium";

/// Destination directory for the orchestration playbooks on the controller
const PLAYBOOK_DIR: &str = "/home/ec2-user/ansible";

/// Planner rejection, raised before any provisioning request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidCapacity {
    /// Requested worker count is outside the configured bounds
    #[error("worker count {requested} outside [0, {max}]")]
    WorkerCountOutOfRange { requested: u32, max: u32 },

    /// Instance class is not recognized by the target provisioning API
    #[error("unrecognized instance class: {0}")]
    UnrecognizedInstanceClass(String),

    /// A planned spec violated a fleet invariant
    #[error("invalid fleet spec: {0}")]
    Spec(#[from] DomainError),
}

/// The two fleet specs a deployment is composed of
#[derive(Debug, Clone, PartialEq)]
pub struct FleetPlan {
    /// Operator-scaled load generation fleet
    pub worker: FleetSpec,
    /// Single orchestration controller
    pub controller: FleetSpec,
}

/// Plan worker and controller fleets from operator parameters
///
/// Pure function: validates bounds and instance class, then emits a worker
/// spec `{min: 0, desired: worker_count, max: max_workers}` and a controller
/// spec fixed at one machine, each with its bootstrap sequence attached.
pub fn plan_fleets(
    params: &DeployParams,
    bounds: &CapacityBounds,
    access: &AccessConfig,
) -> Result<FleetPlan, InvalidCapacity> {
    if params.worker_count > bounds.max_workers {
        return Err(InvalidCapacity::WorkerCountOutOfRange {
            requested: params.worker_count,
            max: bounds.max_workers,
        });
    }

    validate_instance_class(&params.instance_class, bounds)?;

    let image = MachineImageRef::new(params.machine_image.clone());
    let role_tag = RoleTag::new(access.role_tag_name.clone(), access.role_tag_value.clone());

    let worker = FleetSpec::new(
        FleetRole::Worker,
        params.instance_class.clone(),
        0,
        bounds.max_workers,
        Some(params.worker_count),
        image.clone(),
        worker_bootstrap(&params.container_image),
        Some(role_tag.clone()),
    )?;

    let controller = FleetSpec::new(
        FleetRole::Controller,
        CONTROLLER_INSTANCE_CLASS,
        1,
        1,
        Some(1),
        image,
        controller_bootstrap(&role_tag),
        None,
    )?;

    Ok(FleetPlan { worker, controller })
}

/// Worker bootstrap: container runtime install, enable, image pull
///
/// Order is significant; every step is safe to re-run on replacement.
fn worker_bootstrap(container_image: &str) -> Vec<Step> {
    vec![
        Step::package_install("docker"),
        Step::service_enable("docker"),
        Step::shell(["docker", "pull", container_image]),
    ]
}

/// Controller bootstrap: orchestration tooling, playbooks, inventory discovery
fn controller_bootstrap(role_tag: &RoleTag) -> Vec<Step> {
    vec![
        Step::package_install("ansible"),
        Step::package_install("boto3"),
        Step::package_install("botocore"),
        Step::asset_upload("ansible/", PLAYBOOK_DIR),
        Step::shell(["ansible-galaxy", "collection", "install", "amazon.aws"]),
        Step::shell([
            "bash".to_string(),
            format!("{PLAYBOOK_DIR}/generate_config.sh"),
            role_tag.name.clone(),
            role_tag.value.clone(),
        ]),
    ]
}

/// Shape check: `family.size`, family drawn from the recognized set
fn validate_instance_class(class: &str, bounds: &CapacityBounds) -> Result<(), InvalidCapacity> {
    let rejected = || InvalidCapacity::UnrecognizedInstanceClass(class.to_string());

    let (family, size) = class.split_once('.').ok_or_else(rejected)?;
    if size.is_empty() || !size.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(rejected());
    }
    if !bounds.instance_families.iter().any(|f| f == family) {
        return Err(rejected());
    }

    Ok(())
}
