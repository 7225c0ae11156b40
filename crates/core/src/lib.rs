//! Core infrastructure for the Barrage fleet coordinator.
//!
//! This crate provides the ambient pieces shared by every Barrage
//! component: deployment configuration loading, the core error type, and
//! structured logging initialization.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AccessConfig, CapacityBounds, DeployConfig, DeployParams, GateConfig};
pub use error::{CoreError, Result};
