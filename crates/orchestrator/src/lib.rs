//! Barrage fleet bootstrap coordinator
//!
//! One parameterized orchestration, not three near-duplicate stacks:
//! - Capacity planning with validated bounds
//! - Idempotent fleet provisioning behind the [`ProvisioningApi`] boundary
//! - Strictly ordered per-instance bootstrap sequencing
//! - Health gating with bounded per-role ceilings
//! - Least-privilege access linking between controller and worker fleets
//!
//! Worker and controller fleets are requested concurrently; the access
//! policy linker only runs once both fleet handles exist. A timed-out
//! health gate cancels the sibling fleet's in-flight wait and fails the
//! whole deployment.

pub mod coordinator;
pub mod error;
pub mod gate;
pub mod memory;
pub mod planner;
pub mod policy;
pub mod provider;
pub mod sequencer;

pub use coordinator::{DeploymentReport, FleetCoordinator};
pub use error::FleetError;
pub use gate::{GateReport, GateState, HealthGate};
pub use memory::{FailingStepExecutor, InMemoryProvisioner, SimulatedStepExecutor};
pub use planner::{plan_fleets, FleetPlan, InvalidCapacity};
pub use policy::link_fleets;
pub use provider::{FleetHandle, PathSource, ProvisioningApi, ProvisioningError};
pub use sequencer::{run_sequence, StepError, StepExecutor};
