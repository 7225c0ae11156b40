//! Failure propagation across the coordinator

use std::sync::Arc;

use barrage_domain::{FleetRole, StepKind};
use barrage_orchestrator::{FailingStepExecutor, FleetError, InvalidCapacity, ProvisioningError};

use crate::test_utils::{rehearsal, rehearsal_config, rehearsal_with_executor};

#[tokio::test]
async fn test_out_of_range_worker_count_never_reaches_the_provider() {
    let (coordinator, api) = rehearsal(rehearsal_config(21));

    let err = coordinator.deploy().await.unwrap_err();

    assert!(matches!(
        err,
        FleetError::Capacity(InvalidCapacity::WorkerCountOutOfRange {
            requested: 21,
            max: 20
        })
    ));
    assert_eq!(api.created_fleet_count(), 0);
    assert_eq!(api.keypair_count(), 0);
}

#[tokio::test]
async fn test_unrecognized_instance_class_never_reaches_the_provider() {
    let mut config = rehearsal_config(2);
    config.deployment.instance_class = "warp9.galactic".to_string();
    let (coordinator, api) = rehearsal(config);

    let err = coordinator.deploy().await.unwrap_err();

    assert!(matches!(
        err,
        FleetError::Capacity(InvalidCapacity::UnrecognizedInstanceClass(_))
    ));
    assert_eq!(api.created_fleet_count(), 0);
}

#[tokio::test]
async fn test_provider_rejection_surfaces_unretried() {
    let (coordinator, api) = rehearsal(rehearsal_config(2));
    api.reject_role(FleetRole::Worker);

    let err = coordinator.deploy().await.unwrap_err();

    assert!(matches!(
        err,
        FleetError::Provisioning(ProvisioningError::Rejected(_))
    ));
}

#[tokio::test]
async fn test_unhealthy_workers_abort_before_any_grant_is_linked() {
    let mut config = rehearsal_config(3);
    config.gate.worker_timeout_secs = 1;

    let (coordinator, api) = rehearsal_with_executor(
        config,
        Arc::new(FailingStepExecutor {
            fail_kind: StepKind::ServiceEnable,
        }),
    );

    let err = coordinator.deploy().await.unwrap_err();

    match err {
        FleetError::GateTimeout {
            role,
            healthy,
            expected,
            ..
        } => {
            assert_eq!(role, FleetRole::Worker);
            assert_eq!(healthy, 0);
            assert_eq!(expected, 3);
        }
        other => panic!("expected gate timeout, got {other:?}"),
    }

    // Aggregated failure: no access was linked, no secret was created
    let controller = api.handle(FleetRole::Controller).unwrap();
    assert!(api.grants_for(&controller.fleet_id).is_empty());
    assert!(api.network_paths().is_empty());
    assert_eq!(api.keypair_count(), 0);
}

#[tokio::test]
async fn test_unhealthy_controller_aborts_even_with_healthy_workers() {
    let mut config = rehearsal_config(2);
    config.gate.controller_timeout_secs = 1;

    // Only the controller bootstrap uploads assets
    let (coordinator, _api) = rehearsal_with_executor(
        config,
        Arc::new(FailingStepExecutor {
            fail_kind: StepKind::AssetUpload,
        }),
    );

    let err = coordinator.deploy().await.unwrap_err();

    assert!(matches!(
        err,
        FleetError::GateTimeout {
            role: FleetRole::Controller,
            ..
        }
    ));
}
