//! Capability-scoped access grants
//!
//! Grants are created once at fleet-composition time and immutable after.
//! Least privilege is enforced at construction: a wildcard resource scope is
//! only valid when every granted action is read-only.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::fleet::FleetRole;

/// Action a grant permits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Enumerate and describe fleet instances (read-only)
    DescribeInstances,
    /// Retrieve one stored secret by identifier
    GetSecret,
    /// Terminate fleet instances
    TerminateInstances,
}

impl Action {
    /// Whether the action can never mutate or disclose scoped material
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::DescribeInstances)
    }
}

/// Resource scope of a grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceScope {
    /// Exactly one resource, by identifier
    Exact(String),
    /// Every resource visible to the API
    Wildcard,
}

impl std::fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceScope::Exact(id) => f.write_str(id),
            ResourceScope::Wildcard => f.write_str("*"),
        }
    }
}

/// Immutable permission grant from one fleet role toward another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessGrant {
    subject_role: FleetRole,
    target_role: FleetRole,
    actions: BTreeSet<Action>,
    resource_scope: ResourceScope,
}

impl AccessGrant {
    /// Create a validated grant
    ///
    /// Rejects empty action sets, and wildcard scopes carrying any action
    /// that is not read-only.
    pub fn new(
        subject_role: FleetRole,
        target_role: FleetRole,
        actions: BTreeSet<Action>,
        resource_scope: ResourceScope,
    ) -> Result<Self> {
        if actions.is_empty() {
            return Err(DomainError::InvalidGrant(
                "grant carries no actions".to_string(),
            ));
        }

        if resource_scope == ResourceScope::Wildcard {
            if let Some(action) = actions.iter().find(|a| !a.is_read_only()) {
                return Err(DomainError::InvalidGrant(format!(
                    "wildcard scope not permitted for {action:?}"
                )));
            }
        }

        Ok(Self {
            subject_role,
            target_role,
            actions,
            resource_scope,
        })
    }

    /// Role the grant empowers
    pub fn subject_role(&self) -> FleetRole {
        self.subject_role
    }

    /// Role the grant reaches
    pub fn target_role(&self) -> FleetRole {
        self.target_role
    }

    /// Permitted actions
    pub fn actions(&self) -> &BTreeSet<Action> {
        &self.actions
    }

    /// Resource scope
    pub fn resource_scope(&self) -> &ResourceScope {
        &self.resource_scope
    }

    /// Whether the grant permits a given action
    pub fn permits(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

/// Port selection for a network path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortSpec {
    /// All ports, all protocols
    AllTraffic,
    /// A single TCP port
    Tcp(u16),
}

impl std::fmt::Display for PortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortSpec::AllTraffic => f.write_str("all-traffic"),
            PortSpec::Tcp(port) => write!(f, "tcp/{port}"),
        }
    }
}
