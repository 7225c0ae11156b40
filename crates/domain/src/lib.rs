//! Domain model for the Barrage fleet coordinator
//!
//! This crate contains pure domain logic with no I/O dependencies:
//! - Fleet specifications and capacity invariants
//! - Ordered bootstrap step sequences
//! - Capability-scoped access grants
//! - Per-instance health signals

pub mod access;
pub mod bootstrap;
pub mod error;
pub mod fleet;
pub mod signal;

pub use access::{AccessGrant, Action, PortSpec, ResourceScope};
pub use bootstrap::{BootstrapFailure, Step, StepKind};
pub use error::{DomainError, Result};
pub use fleet::{FleetRole, FleetSpec, MachineImageRef, RoleTag};
pub use signal::HealthSignal;
