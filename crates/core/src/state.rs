#![allow(missing_docs)]

//! Mutable per-run game state: actor resources, node status, and the audit log.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::topology::Topology;

/// Phase within a turn. A turn is exactly one attacker phase followed by one
/// defender phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Attacker,
    Defender,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnPhase::Attacker => write!(f, "attacker"),
            TurnPhase::Defender => write!(f, "defender"),
        }
    }
}

/// Originator of a log record. `System` covers phase markers, detection
/// pulses, and outcome announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Attacker,
    Defender,
    System,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Attacker => write!(f, "attacker"),
            Actor::Defender => write!(f, "defender"),
            Actor::System => write!(f, "system"),
        }
    }
}

/// Immutable audit-trail entry. The full ordered sequence is exported by UI
/// collaborators, typically as CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub turn: u32,
    pub phase: TurnPhase,
    pub actor: Actor,
    pub message: String,
}

/// Mutable status of a single node. Static attributes (value, baseline
/// exposure, adjacency) live in [`Topology`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    /// Current exposure; raised by recon, lowered by patching.
    pub exposure: f64,
    /// Defender-raised patch level, 0..=10. Reduces exploit success.
    pub patch_level: u32,
    pub compromised: bool,
    /// Isolation is monotonic: once cut off, a node stays cut off.
    pub isolated: bool,
    /// Attacker has hardened a persistent foothold here.
    pub persistent: bool,
    /// Defender decoy marker, informational only.
    pub honeypot: bool,
}

/// Attacker resources and foothold set. Footholds reference nodes by name;
/// they are resolved against the topology at action-resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackerState {
    pub funds: u32,
    pub skill: f64,
    pub influence: f64,
    /// Crew size; bounds the number of attacker actions per phase.
    pub members: u32,
    pub footholds: BTreeSet<String>,
    pub exfil_value: u32,
}

impl Default for AttackerState {
    fn default() -> Self {
        Self {
            funds: 50,
            skill: 5.0,
            influence: 1.0,
            members: 1,
            footholds: BTreeSet::new(),
            exfil_value: 0,
        }
    }
}

/// Defender resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderState {
    pub budget: u32,
    /// Global detection multiplier, 1.0..=3.0.
    pub monitoring: f64,
    /// Staff awareness, 1.0..=2.0. Dampens social-engineering success.
    pub awareness: f64,
    /// Base per-foothold eviction chance used by forensic sweeps.
    pub eviction: f64,
}

impl Default for DefenderState {
    fn default() -> Self {
        Self {
            budget: 60,
            monitoring: 1.0,
            awareness: 1.0,
            eviction: 0.4,
        }
    }
}

/// Terminal result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Attacker reached the exfiltration goal before the turn limit.
    AttackerGoal,
    /// Turn limit reached with the damage-threshold policy satisfied.
    AttackerDamage,
    /// Turn limit reached; defender contained the intrusion.
    DefenderHolds,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AttackerGoal => write!(f, "attacker wins (exfiltration goal reached)"),
            Outcome::AttackerDamage => write!(f, "attacker wins by damage"),
            Outcome::DefenderHolds => write!(f, "defender holds"),
        }
    }
}

/// Full mutable snapshot of a run. Created once per run and owned by a single
/// [`crate::Game`]; UI collaborators only ever see `&GameState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Turn counter, starts at 1 and only increases.
    pub turn: u32,
    pub phase: TurnPhase,
    pub attacker: AttackerState,
    pub defender: DefenderState,
    /// Per-node mutable status, keyed by node name.
    pub nodes: BTreeMap<String, NodeStatus>,
    /// Append-only audit trail.
    pub log: Vec<LogRecord>,
    /// Unset until the run reaches a terminal state.
    pub outcome: Option<Outcome>,
    /// Actions resolved so far in the current phase.
    pub actions_used: u32,
}

impl GameState {
    /// Fresh state for a new run over the given topology.
    pub(crate) fn new(topology: &Topology) -> Self {
        let nodes = topology
            .nodes()
            .map(|(name, spec)| {
                (
                    name.to_string(),
                    NodeStatus {
                        exposure: spec.exposure,
                        patch_level: 0,
                        compromised: false,
                        isolated: false,
                        persistent: false,
                        honeypot: false,
                    },
                )
            })
            .collect();

        Self {
            turn: 1,
            phase: TurnPhase::Attacker,
            attacker: AttackerState::default(),
            defender: DefenderState::default(),
            nodes,
            log: Vec::new(),
            outcome: None,
            actions_used: 0,
        }
    }

    /// Status lookup by node name.
    pub fn node(&self, name: &str) -> Option<&NodeStatus> {
        self.nodes.get(name)
    }

    pub(crate) fn node_mut(&mut self, name: &str) -> Option<&mut NodeStatus> {
        self.nodes.get_mut(name)
    }

    /// Append a record to the audit trail and return a reference to it.
    pub(crate) fn push_log(&mut self, actor: Actor, message: impl Into<String>) -> &LogRecord {
        let record = LogRecord {
            turn: self.turn,
            phase: self.phase,
            actor,
            message: message.into(),
        };
        self.log.push(record);
        self.log.last().expect("record just pushed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn fresh_state_matches_topology() {
        let config = GameConfig::default();
        let topology = Topology::from_config(&config).unwrap();
        let state = GameState::new(&topology);

        assert_eq!(state.turn, 1);
        assert_eq!(state.phase, TurnPhase::Attacker);
        assert_eq!(state.nodes.len(), 7);
        assert!(state.outcome.is_none());
        assert!(state.log.is_empty());

        let dmz = state.node("DMZ").unwrap();
        assert!(!dmz.compromised);
        assert!((dmz.exposure - 0.40).abs() < f64::EPSILON);
    }

    #[test]
    fn log_records_carry_current_turn_and_phase() {
        let config = GameConfig::default();
        let topology = Topology::from_config(&config).unwrap();
        let mut state = GameState::new(&topology);

        state.push_log(Actor::System, "==== Turn 1 ====");
        state.turn = 2;
        state.phase = TurnPhase::Defender;
        state.push_log(Actor::Defender, "Monitoring -> 1.30");

        assert_eq!(state.log.len(), 2);
        assert_eq!(state.log[0].turn, 1);
        assert_eq!(state.log[0].phase, TurnPhase::Attacker);
        assert_eq!(state.log[1].turn, 2);
        assert_eq!(state.log[1].phase, TurnPhase::Defender);
        assert_eq!(state.log[1].actor, Actor::Defender);
    }
}
