//! Bootstrap script sequencer
//!
//! Runs a declared step list strictly in order on one instance. A failing
//! step aborts the sequence and reports which step broke; remaining steps
//! are never executed.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use barrage_domain::{BootstrapFailure, Step};

/// Executor-reported step failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct StepError(pub String);

/// Executes one bootstrap step on one instance
///
/// Implementations must be idempotent per step: a replacement instance
/// re-runs the full sequence from the top.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// Run a single step to completion
    async fn execute(&self, step: &Step) -> Result<(), StepError>;
}

/// Run `steps` in declared order, stopping at the first failure
///
/// On failure the returned [`BootstrapFailure`] names the zero-based index
/// and kind of the step that broke.
pub async fn run_sequence(
    executor: &dyn StepExecutor,
    steps: &[Step],
) -> Result<(), BootstrapFailure> {
    for (step_index, step) in steps.iter().enumerate() {
        debug!(step_index, kind = ?step.kind, "running bootstrap step");

        if let Err(err) = executor.execute(step).await {
            warn!(step_index, kind = ?step.kind, error = %err, "bootstrap step failed");
            return Err(BootstrapFailure {
                step_index,
                kind: step.kind,
                detail: err.0,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_domain::StepKind;
    use std::sync::Mutex;

    /// Records executed kinds; fails on a configured kind
    struct RecordingExecutor {
        fail_kind: Option<StepKind>,
        executed: Mutex<Vec<StepKind>>,
    }

    impl RecordingExecutor {
        fn new(fail_kind: Option<StepKind>) -> Self {
            Self {
                fail_kind,
                executed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StepExecutor for RecordingExecutor {
        async fn execute(&self, step: &Step) -> Result<(), StepError> {
            self.executed.lock().unwrap().push(step.kind);
            if self.fail_kind == Some(step.kind) {
                return Err(StepError("injected failure".to_string()));
            }
            Ok(())
        }
    }

    fn abc() -> Vec<Step> {
        vec![
            Step::package_install("docker"),
            Step::service_enable("docker"),
            Step::shell(["docker", "pull", "artilleryio/artillery"]),
        ]
    }

    #[tokio::test]
    async fn test_all_steps_run_in_order() {
        let executor = RecordingExecutor::new(None);
        run_sequence(&executor, &abc()).await.unwrap();

        assert_eq!(
            *executor.executed.lock().unwrap(),
            vec![
                StepKind::PackageInstall,
                StepKind::ServiceEnable,
                StepKind::ShellCommand
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_stops_sequence() {
        // B fails: C must never execute, and the report names index 1
        let executor = RecordingExecutor::new(Some(StepKind::ServiceEnable));
        let failure = run_sequence(&executor, &abc()).await.unwrap_err();

        assert_eq!(failure.step_index, 1);
        assert_eq!(failure.kind, StepKind::ServiceEnable);
        assert_eq!(
            *executor.executed.lock().unwrap(),
            vec![StepKind::PackageInstall, StepKind::ServiceEnable]
        );
    }

    #[tokio::test]
    async fn test_empty_sequence_succeeds() {
        let executor = RecordingExecutor::new(None);
        run_sequence(&executor, &[]).await.unwrap();
        assert!(executor.executed.lock().unwrap().is_empty());
    }
}
