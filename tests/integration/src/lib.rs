//! Integration tests for the Barrage fleet coordinator
//!
//! This test suite validates:
//! - The full deploy flow against the in-memory provisioner
//! - Idempotent re-deployment of an existing pair of fleets
//! - Gate timeout and provisioning failure propagation
//! - Least-privilege invariants on every issued grant

pub mod test_utils;

#[cfg(test)]
mod deployment_flow_tests;

#[cfg(test)]
mod failure_path_tests;
