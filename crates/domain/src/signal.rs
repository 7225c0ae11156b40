//! Health signals
//!
//! Each instance produces exactly one signal at the end of its bootstrap
//! sequence; the health gate consumes each signal exactly once.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::fleet::FleetRole;

/// Bootstrap outcome reported by one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSignal {
    /// Reporting instance
    pub instance_id: String,
    /// Fleet the instance belongs to
    pub fleet_role: FleetRole,
    /// Whether the full bootstrap sequence completed
    pub success: bool,
    /// Emission time, Unix epoch milliseconds
    pub timestamp_ms: u64,
}

impl HealthSignal {
    /// Signal a completed bootstrap
    pub fn success(instance_id: impl Into<String>, fleet_role: FleetRole) -> Self {
        Self {
            instance_id: instance_id.into(),
            fleet_role,
            success: true,
            timestamp_ms: current_timestamp_ms(),
        }
    }

    /// Signal an aborted bootstrap
    pub fn failure(instance_id: impl Into<String>, fleet_role: FleetRole) -> Self {
        Self {
            instance_id: instance_id.into(),
            fleet_role,
            success: false,
            timestamp_ms: current_timestamp_ms(),
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}
