//! Configuration management for Barrage.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Full deployment configuration, usually loaded from a TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Operator-supplied deployment parameters
    #[serde(default)]
    pub deployment: DeployParams,
    /// Capacity bounds enforced by the planner
    #[serde(default)]
    pub capacity: CapacityBounds,
    /// Health gate ceilings
    #[serde(default)]
    pub gate: GateConfig,
    /// Access and network policy settings
    #[serde(default)]
    pub access: AccessConfig,
}

/// Operator-supplied deployment parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployParams {
    /// Instance class of worker nodes
    #[serde(default = "default_instance_class")]
    pub instance_class: String,
    /// Number of worker nodes to launch
    #[serde(default)]
    pub worker_count: u32,
    /// Container image the workers pull during bootstrap
    #[serde(default = "default_container_image")]
    pub container_image: String,
    /// Machine image both fleets boot from
    #[serde(default = "default_machine_image")]
    pub machine_image: String,
    /// Keypair credential the controller may retrieve; omit to skip the
    /// secret grant entirely
    #[serde(default)]
    pub keypair_name: Option<String>,
}

impl Default for DeployParams {
    fn default() -> Self {
        Self {
            instance_class: default_instance_class(),
            worker_count: 0,
            container_image: default_container_image(),
            machine_image: default_machine_image(),
            keypair_name: None,
        }
    }
}

/// Capacity bounds enforced by the planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityBounds {
    /// Most workers a single deployment may request
    #[serde(default = "default_max_workers")]
    pub max_workers: u32,
    /// Instance-class families the target provisioning API recognizes
    #[serde(default = "default_instance_families")]
    pub instance_families: Vec<String>,
}

impl Default for CapacityBounds {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            instance_families: default_instance_families(),
        }
    }
}

/// Health gate ceilings, per fleet role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Worker fleet ceiling in seconds
    #[serde(default = "default_worker_timeout_secs")]
    pub worker_timeout_secs: u64,
    /// Controller fleet ceiling in seconds
    #[serde(default = "default_controller_timeout_secs")]
    pub controller_timeout_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            worker_timeout_secs: default_worker_timeout_secs(),
            controller_timeout_secs: default_controller_timeout_secs(),
        }
    }
}

/// Access and network policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Only port opened from outside toward the controller
    #[serde(default = "default_admin_port")]
    pub admin_port: u16,
    /// Tag key applied to worker instances for inventory discovery
    #[serde(default = "default_role_tag_name")]
    pub role_tag_name: String,
    /// Tag value applied to worker instances
    #[serde(default = "default_role_tag_value")]
    pub role_tag_value: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admin_port: default_admin_port(),
            role_tag_name: default_role_tag_name(),
            role_tag_value: default_role_tag_value(),
        }
    }
}

impl DeployConfig {
    /// Load a configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Built-in defaults, matching an empty TOML document
    pub fn default_config() -> Self {
        Self {
            deployment: DeployParams::default(),
            capacity: CapacityBounds::default(),
            gate: GateConfig::default(),
            access: AccessConfig::default(),
        }
    }
}

fn default_instance_class() -> String {
    "c5.large".to_string()
}

fn default_container_image() -> String {
    "artilleryio/artillery".to_string()
}

fn default_machine_image() -> String {
    "amazon-linux-2".to_string()
}

fn default_max_workers() -> u32 {
    20
}

fn default_instance_families() -> Vec<String> {
    ["c5", "c5n", "m5", "t3", "t3a"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_worker_timeout_secs() -> u64 {
    300
}

fn default_controller_timeout_secs() -> u64 {
    420
}

fn default_admin_port() -> u16 {
    22
}

fn default_role_tag_name() -> String {
    "role".to_string()
}

fn default_role_tag_value() -> String {
    "loadgen-node".to_string()
}
