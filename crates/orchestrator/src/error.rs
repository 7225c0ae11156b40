//! Deployment error taxonomy
//!
//! Every failure path aggregates into a single [`FleetError`]; a deployment
//! never reports a partially provisioned fleet as success.

use thiserror::Error;

use barrage_domain::{BootstrapFailure, DomainError, FleetRole};

use crate::planner::InvalidCapacity;
use crate::provider::ProvisioningError;

/// Aggregated deployment failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FleetError {
    /// Planner rejected the operator parameters; no remote call was made
    #[error(transparent)]
    Capacity(#[from] InvalidCapacity),

    /// A planned value violated a domain invariant
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The provisioning API rejected a request
    #[error("provisioning failed: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// A bootstrap step failed on an instance
    #[error(transparent)]
    Bootstrap(#[from] BootstrapFailure),

    /// A health gate ceiling elapsed; terminal for the whole deployment
    #[error("{role} fleet health gate timed out after {ceiling_secs}s ({healthy}/{expected} healthy)")]
    GateTimeout {
        /// Fleet whose gate expired
        role: FleetRole,
        /// Ceiling that elapsed, in seconds
        ceiling_secs: u64,
        /// Instances that had reported success
        healthy: u32,
        /// Instances the gate expected
        expected: u32,
    },
}
