//! Provisioning API boundary
//!
//! The coordinator's only external interface. Everything behind it
//! (template rendering, network layout, lifecycle signals) belongs to the
//! infrastructure provider; everything in front of it passes explicit
//! handles, never inferred dependencies.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use barrage_domain::{AccessGrant, FleetRole, FleetSpec, PortSpec};

use crate::gate::GateReport;

/// Identity of a live fleet, owned by the coordinator for the lifetime of
/// the deployment operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetHandle {
    /// Provider-assigned fleet identifier
    pub fleet_id: String,
    /// Role of the fleet
    pub role: FleetRole,
    /// Instances currently part of the fleet
    pub instance_ids: Vec<String>,
    /// Current capacity as reconciled by the provider
    pub capacity: u32,
}

/// Source side of a network path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSource {
    /// Another fleet, by identifier
    Fleet(String),
    /// Anywhere outside the deployment
    External,
}

/// Remote rejection surfaced by the provisioning API
///
/// Never retried automatically; the coordinator reports it to the operator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    /// The provider rejected the request
    #[error("provisioning request rejected: {0}")]
    Rejected(String),

    /// The referenced fleet does not exist
    #[error("unknown fleet: {0}")]
    UnknownFleet(String),

    /// The provider does not support the requested instance class
    #[error("unsupported instance class: {0}")]
    UnsupportedInstanceClass(String),

    /// The fleet's signal feed was already consumed
    #[error("signal feed for fleet {0} already consumed")]
    SignalFeedConsumed(String),
}

/// Asynchronous boundary to the infrastructure provider
///
/// `request_fleet` must be idempotent: re-invoking with an unchanged spec
/// against an existing fleet of the same identity reconciles to the desired
/// state without creating duplicate resources. When the spec leaves
/// `desired_count` unset, a current count managed by an external autoscaler
/// takes precedence over the static spec.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// Create or reconcile a fleet matching `spec`
    async fn request_fleet(&self, spec: &FleetSpec) -> Result<FleetHandle, ProvisioningError>;

    /// Attach a permission grant to a fleet
    async fn attach_policy(
        &self,
        handle: &FleetHandle,
        grant: &AccessGrant,
    ) -> Result<(), ProvisioningError>;

    /// Open a network path toward `target`
    async fn open_network_path(
        &self,
        source: PathSource,
        target: &FleetHandle,
        ports: PortSpec,
    ) -> Result<(), ProvisioningError>;

    /// Create the named keypair credential if it does not already exist
    ///
    /// Idempotent: an existing keypair of the same name is left untouched.
    async fn ensure_keypair(&self, name: &str) -> Result<(), ProvisioningError>;

    /// Block until `expected` instances of the fleet report bootstrap
    /// success, or until `ceiling` elapses
    ///
    /// The outcome is carried in the report's gate state; exceeding the
    /// ceiling is reported, never silently continued.
    async fn wait_for_signals(
        &self,
        handle: &FleetHandle,
        expected: u32,
        ceiling: Duration,
    ) -> Result<GateReport, ProvisioningError>;
}
