//! Bootstrap step sequences
//!
//! A bootstrap is the ordered list of initialization steps a machine runs
//! after launch before it is considered ready. Ordering is significant and
//! preserved exactly as declared; every step must be safe to re-run on
//! instance replacement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of bootstrap step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Install a package from the image's package manager
    PackageInstall,
    /// Enable and start a system service
    ServiceEnable,
    /// Run an arbitrary command (argv form)
    ShellCommand,
    /// Upload an asset directory onto the instance
    AssetUpload,
}

/// One bootstrap step with its payload
///
/// The payload is one or more strings; its meaning depends on the kind
/// (package name, service name, argv, source/destination pair).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// What the step does
    pub kind: StepKind,
    /// Step arguments, order-significant
    pub payload: Vec<String>,
}

impl Step {
    /// Install a package
    pub fn package_install(package: impl Into<String>) -> Self {
        Self {
            kind: StepKind::PackageInstall,
            payload: vec![package.into()],
        }
    }

    /// Enable and start a service
    pub fn service_enable(service: impl Into<String>) -> Self {
        Self {
            kind: StepKind::ServiceEnable,
            payload: vec![service.into()],
        }
    }

    /// Run a command given as argv
    pub fn shell<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: StepKind::ShellCommand,
            payload: argv.into_iter().map(Into::into).collect(),
        }
    }

    /// Upload an asset from a source path to a destination on the instance
    pub fn asset_upload(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            kind: StepKind::AssetUpload,
            payload: vec![source.into(), destination.into()],
        }
    }
}

/// Failure of one bootstrap step on one instance
///
/// Reported by the sequencer when a step fails; remaining steps are never
/// executed and the instance is marked unhealthy.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("bootstrap step {step_index} ({kind:?}) failed: {detail}")]
pub struct BootstrapFailure {
    /// Zero-based index of the failing step in the declared sequence
    pub step_index: usize,
    /// Kind of the failing step
    pub kind: StepKind,
    /// Executor-reported cause
    pub detail: String,
}
