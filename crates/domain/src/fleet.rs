//! Fleet specifications
//!
//! A fleet is a named, independently-scaled group of homogeneous machines.
//! Specs are validated at construction and immutable once planned.

use serde::{Deserialize, Serialize};

use crate::bootstrap::Step;
use crate::error::{DomainError, Result};

/// Role a fleet plays in a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FleetRole {
    /// Load-generating worker fleet, scaled by the operator
    Worker,
    /// Single orchestration controller
    Controller,
}

impl FleetRole {
    /// Stable lowercase name used in fleet identifiers and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            FleetRole::Worker => "worker",
            FleetRole::Controller => "controller",
        }
    }
}

impl std::fmt::Display for FleetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named reference to a machine image, shared read-only by both fleets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineImageRef {
    /// Image name as known to the provisioning API
    pub name: String,
}

impl MachineImageRef {
    /// Create an image reference
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Tag applied to launched instances for inventory discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTag {
    /// Tag key
    pub name: String,
    /// Tag value
    pub value: String,
}

impl RoleTag {
    /// Create a role tag
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Desired shape of one fleet
///
/// Capacity invariant: `min_count <= desired_count <= max_count` whenever
/// `desired_count` is given. A controller fleet is fixed at exactly one
/// machine. Both are enforced by [`FleetSpec::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSpec {
    /// Role of the fleet
    pub role: FleetRole,
    /// Instance class launched for every member
    pub instance_class: String,
    /// Lower capacity bound
    pub min_count: u32,
    /// Upper capacity bound
    pub max_count: u32,
    /// Target capacity; `None` leaves scaling to an external autoscaler
    pub desired_count: Option<u32>,
    /// Machine image every member boots from
    pub image: MachineImageRef,
    /// Ordered bootstrap sequence run on every launched instance
    pub bootstrap_steps: Vec<Step>,
    /// Tag applied to launched instances, used for inventory discovery
    pub role_tag: Option<RoleTag>,
}

impl FleetSpec {
    /// Create a validated fleet spec
    pub fn new(
        role: FleetRole,
        instance_class: impl Into<String>,
        min_count: u32,
        max_count: u32,
        desired_count: Option<u32>,
        image: MachineImageRef,
        bootstrap_steps: Vec<Step>,
        role_tag: Option<RoleTag>,
    ) -> Result<Self> {
        let spec = Self {
            role,
            instance_class: instance_class.into(),
            min_count,
            max_count,
            desired_count,
            image,
            bootstrap_steps,
            role_tag,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the capacity invariants without consuming the spec
    pub fn validate(&self) -> Result<()> {
        if self.instance_class.is_empty() {
            return Err(DomainError::InvalidSpec(
                "instance class must not be empty".to_string(),
            ));
        }

        if self.min_count > self.max_count {
            return Err(DomainError::InvalidSpec(format!(
                "min_count {} exceeds max_count {}",
                self.min_count, self.max_count
            )));
        }

        if let Some(desired) = self.desired_count {
            if desired < self.min_count || desired > self.max_count {
                return Err(DomainError::InvalidSpec(format!(
                    "desired_count {} outside [{}, {}]",
                    desired, self.min_count, self.max_count
                )));
            }
        }

        if self.role == FleetRole::Controller
            && (self.min_count != 1 || self.max_count != 1 || self.desired_count != Some(1))
        {
            return Err(DomainError::InvalidSpec(
                "controller fleet is fixed at exactly one machine".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of instances the health gate expects to report
    ///
    /// `desired_count` when set, otherwise `min_count` (scaling left to an
    /// external autoscaler).
    pub fn expected_instance_count(&self) -> u32 {
        self.desired_count.unwrap_or(self.min_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::Step;

    fn image() -> MachineImageRef {
        MachineImageRef::new("amazon-linux-2")
    }

    #[test]
    fn test_worker_spec_valid_range() {
        let spec = FleetSpec::new(
            FleetRole::Worker,
            "c5.large",
            0,
            20,
            Some(5),
            image(),
            vec![Step::package_install("docker")],
            Some(RoleTag::new("role", "loadgen-node")),
        )
        .unwrap();

        assert_eq!(spec.expected_instance_count(), 5);
        assert_eq!(spec.bootstrap_steps.len(), 1);
    }

    #[test]
    fn test_desired_above_max_rejected() {
        let result = FleetSpec::new(
            FleetRole::Worker,
            "c5.large",
            0,
            20,
            Some(21),
            image(),
            Vec::new(),
            None,
        );

        assert!(matches!(result, Err(DomainError::InvalidSpec(_))));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let result = FleetSpec::new(
            FleetRole::Worker,
            "c5.large",
            10,
            5,
            None,
            image(),
            Vec::new(),
            None,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_controller_fixed_at_one() {
        let result = FleetSpec::new(
            FleetRole::Controller,
            "t3a.medium",
            1,
            2,
            Some(1),
            image(),
            Vec::new(),
            None,
        );
        assert!(result.is_err());

        let spec = FleetSpec::new(
            FleetRole::Controller,
            "t3a.medium",
            1,
            1,
            Some(1),
            image(),
            Vec::new(),
            None,
        )
        .unwrap();
        assert_eq!(spec.expected_instance_count(), 1);
    }

    #[test]
    fn test_unset_desired_falls_back_to_min() {
        let spec = FleetSpec::new(
            FleetRole::Worker,
            "c5.large",
            2,
            20,
            None,
            image(),
            Vec::new(),
            None,
        )
        .unwrap();

        assert_eq!(spec.expected_instance_count(), 2);
    }

    #[test]
    fn test_empty_instance_class_rejected() {
        let result =
            FleetSpec::new(FleetRole::Worker, "", 0, 20, None, image(), Vec::new(), None);
        assert!(result.is_err());
    }
}
