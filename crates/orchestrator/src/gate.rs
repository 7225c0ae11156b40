//! Health gate
//!
//! Per-fleet aggregation point that blocks deployment completion until
//! every expected instance reports bootstrap success, with a bounded
//! ceiling. Signals are consumed exactly once; duplicates from one
//! instance are counted once; failure signals never satisfy the gate.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use barrage_domain::{FleetRole, HealthSignal};

/// Gate lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    /// Provisioning request issued, launch not yet confirmed
    Launching,
    /// Launch confirmed, collecting health signals
    AwaitingSignals,
    /// Every expected instance reported success
    Healthy,
    /// Ceiling elapsed before the fleet became healthy; terminal failure
    TimedOut,
}

impl GateState {
    /// Check if state is terminal (healthy or timed out)
    pub fn is_terminal(&self) -> bool {
        matches!(self, GateState::Healthy | GateState::TimedOut)
    }

    /// Check if transition to new state is valid
    pub fn can_transition_to(&self, new_state: GateState) -> bool {
        match (self, new_state) {
            (GateState::Launching, GateState::AwaitingSignals) => true,
            (GateState::Launching, GateState::TimedOut) => true,
            (GateState::AwaitingSignals, GateState::Healthy) => true,
            (GateState::AwaitingSignals, GateState::TimedOut) => true,
            // Terminal states cannot transition
            (GateState::Healthy, _) => false,
            (GateState::TimedOut, _) => false,
            _ => false,
        }
    }
}

/// Final outcome of one fleet's gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    /// Fleet the gate watched
    pub role: FleetRole,
    /// Terminal state reached
    pub state: GateState,
    /// Instances the gate expected to report
    pub expected: u32,
    /// Instances that reported success
    pub healthy: u32,
    /// Instances that reported a failed bootstrap
    pub failed: u32,
}

/// Signal aggregator for one fleet
#[derive(Debug)]
pub struct HealthGate {
    role: FleetRole,
    expected: u32,
    state: GateState,
    healthy: BTreeSet<String>,
    failed: BTreeSet<String>,
}

impl HealthGate {
    /// Create a gate in the `Launching` state
    pub fn new(role: FleetRole, expected: u32) -> Self {
        Self {
            role,
            expected,
            state: GateState::Launching,
            healthy: BTreeSet::new(),
            failed: BTreeSet::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Move to `AwaitingSignals` once the provider confirms launch
    ///
    /// A fleet expecting zero instances is healthy immediately.
    pub fn confirm_launch(&mut self) -> GateState {
        if self.state.can_transition_to(GateState::AwaitingSignals) {
            self.state = GateState::AwaitingSignals;
            if self.expected == 0 {
                self.state = GateState::Healthy;
            }
        }
        self.state
    }

    /// Feed one signal into the gate
    ///
    /// Signals for other fleets and repeat signals from a known instance
    /// are ignored. Returns the state after the observation.
    pub fn observe(&mut self, signal: &HealthSignal) -> GateState {
        if self.state != GateState::AwaitingSignals || signal.fleet_role != self.role {
            return self.state;
        }
        if self.healthy.contains(&signal.instance_id) || self.failed.contains(&signal.instance_id)
        {
            debug!(
                instance = %signal.instance_id,
                "duplicate health signal ignored"
            );
            return self.state;
        }

        if signal.success {
            self.healthy.insert(signal.instance_id.clone());
            if self.healthy.len() as u32 >= self.expected {
                self.state = GateState::Healthy;
            }
        } else {
            warn!(
                fleet = %self.role,
                instance = %signal.instance_id,
                "instance reported failed bootstrap"
            );
            self.failed.insert(signal.instance_id.clone());
        }

        self.state
    }

    /// Force the terminal `TimedOut` state if the gate is still open
    pub fn expire(&mut self) -> GateState {
        if self.state.can_transition_to(GateState::TimedOut) {
            self.state = GateState::TimedOut;
        }
        self.state
    }

    /// Consume the signal feed until the gate closes or `ceiling` elapses
    ///
    /// A feed that drains before the fleet is healthy can never satisfy the
    /// gate, so it reports `TimedOut` without waiting out the ceiling.
    pub async fn wait(
        mut self,
        mut feed: mpsc::Receiver<HealthSignal>,
        ceiling: Duration,
    ) -> GateReport {
        self.confirm_launch();

        if !self.state.is_terminal() {
            let within_ceiling = tokio::time::timeout(ceiling, async {
                while let Some(signal) = feed.recv().await {
                    if self.observe(&signal).is_terminal() {
                        break;
                    }
                }
            })
            .await;

            if within_ceiling.is_err() {
                warn!(
                    fleet = %self.role,
                    ceiling_secs = ceiling.as_secs(),
                    "health gate ceiling elapsed"
                );
            }
            self.expire();
        }

        if self.state == GateState::Healthy {
            info!(
                fleet = %self.role,
                healthy = self.healthy.len(),
                "fleet healthy"
            );
        }

        self.report()
    }

    /// Snapshot the gate into a report
    pub fn report(&self) -> GateReport {
        GateReport {
            role: self.role,
            state: self.state,
            expected: self.expected,
            healthy: self.healthy.len() as u32,
            failed: self.failed.len() as u32,
        }
    }
}
