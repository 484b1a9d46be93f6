#![allow(missing_docs)]

//! Action catalogue and resolution rules.
//!
//! Resolution maps (action, actor state, target, RNG draws) to a state delta
//! plus a log message. Every precondition is checked before any mutation, so
//! a rejected action never partially applies. A failed *roll* is a normally
//! resolved action: it is logged and counts against the phase budget.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::rng::RngService;
use crate::state::{GameState, TurnPhase};
use crate::topology::Topology;

pub(crate) const RECRUIT_COST: u32 = 15;
pub(crate) const PATCH_COST: u32 = 8;
pub(crate) const MONITOR_COST: u32 = 6;
pub(crate) const AWARENESS_COST: u32 = 10;
pub(crate) const ISOLATE_COST: u32 = 12;
pub(crate) const HONEYPOT_COST: u32 = 7;
pub(crate) const FORENSIC_COST: u32 = 10;

const RECON_EXPOSURE_STEP: f64 = 0.05;
const MONITORING_CAP: f64 = 3.0;
const AWARENESS_CAP: f64 = 2.0;
const DETECTION_PULSE: f64 = 0.1;
const EXPOSURE_FLOOR: f64 = 0.05;
const PATCH_LEVEL_CAP: u32 = 10;

/// Success probability shared by all stochastic attacker actions:
/// base, scaled up by skill, damped by the target's patch level, capped so
/// no attempt is ever a sure thing.
fn success_chance(base: f64, skill: f64, patch_level: u32, modifier: f64) -> f64 {
    let skill_factor = 1.0 + skill / 10.0;
    let patch_factor = (1.0 - f64::from(patch_level) / 12.0).max(0.0);
    (base * skill_factor * modifier * patch_factor).clamp(0.0, 0.95)
}

/// Detection probability: base likelihood scaled by the defender's global
/// monitoring level and a per-action stealth modifier.
fn detection_chance(base: f64, monitoring: f64, stealth: f64) -> f64 {
    (base * monitoring * stealth).clamp(0.0, 0.99)
}

/// Discriminant of an [`Action`], used for listing and phase checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Recon,
    Social,
    Recruit,
    Exploit,
    Lateral,
    Exfiltrate,
    Harden,
    Patch,
    Monitor,
    Awareness,
    Isolate,
    Honeypot,
    Forensic,
}

impl ActionKind {
    /// Stable lower-case name used in errors and front ends.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Recon => "recon",
            ActionKind::Social => "social",
            ActionKind::Recruit => "recruit",
            ActionKind::Exploit => "exploit",
            ActionKind::Lateral => "lateral",
            ActionKind::Exfiltrate => "exfiltrate",
            ActionKind::Harden => "harden",
            ActionKind::Patch => "patch",
            ActionKind::Monitor => "monitor",
            ActionKind::Awareness => "awareness",
            ActionKind::Isolate => "isolate",
            ActionKind::Honeypot => "honeypot",
            ActionKind::Forensic => "forensic",
        }
    }

    /// Phase in which this action may be submitted.
    pub fn phase(self) -> TurnPhase {
        match self {
            ActionKind::Recon
            | ActionKind::Social
            | ActionKind::Recruit
            | ActionKind::Exploit
            | ActionKind::Lateral
            | ActionKind::Exfiltrate
            | ActionKind::Harden => TurnPhase::Attacker,
            ActionKind::Patch
            | ActionKind::Monitor
            | ActionKind::Awareness
            | ActionKind::Isolate
            | ActionKind::Honeypot
            | ActionKind::Forensic => TurnPhase::Defender,
        }
    }

    /// Whether submitting this action requires naming a target node.
    /// Lateral movement additionally names a source foothold.
    pub fn requires_target(self) -> bool {
        matches!(
            self,
            ActionKind::Exploit
                | ActionKind::Lateral
                | ActionKind::Exfiltrate
                | ActionKind::Harden
                | ActionKind::Patch
                | ActionKind::Isolate
                | ActionKind::Honeypot
        )
    }

    /// Catalogue of actions available in the given phase.
    pub fn for_phase(phase: TurnPhase) -> &'static [ActionKind] {
        match phase {
            TurnPhase::Attacker => &[
                ActionKind::Recon,
                ActionKind::Social,
                ActionKind::Recruit,
                ActionKind::Exploit,
                ActionKind::Lateral,
                ActionKind::Exfiltrate,
                ActionKind::Harden,
            ],
            TurnPhase::Defender => &[
                ActionKind::Patch,
                ActionKind::Monitor,
                ActionKind::Awareness,
                ActionKind::Isolate,
                ActionKind::Honeypot,
                ActionKind::Forensic,
            ],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Listing entry returned by [`crate::Game::valid_actions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub requires_target: bool,
}

/// A player request, with targets where the action takes them. Social
/// engineering always aims at the configured insider node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Recon,
    Social,
    Recruit,
    Exploit { target: String },
    Lateral { from: String, to: String },
    Exfiltrate { target: String },
    Harden { target: String },
    Patch { target: String },
    Monitor,
    Awareness,
    Isolate { target: String },
    Honeypot { target: String },
    Forensic,
}

impl Action {
    /// Discriminant of this request.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Recon => ActionKind::Recon,
            Action::Social => ActionKind::Social,
            Action::Recruit => ActionKind::Recruit,
            Action::Exploit { .. } => ActionKind::Exploit,
            Action::Lateral { .. } => ActionKind::Lateral,
            Action::Exfiltrate { .. } => ActionKind::Exfiltrate,
            Action::Harden { .. } => ActionKind::Harden,
            Action::Patch { .. } => ActionKind::Patch,
            Action::Monitor => ActionKind::Monitor,
            Action::Awareness => ActionKind::Awareness,
            Action::Isolate { .. } => ActionKind::Isolate,
            Action::Honeypot { .. } => ActionKind::Honeypot,
            Action::Forensic => ActionKind::Forensic,
        }
    }
}

/// Outcome of one resolved action before it is committed to the log.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub success: bool,
    /// A detected attacker action raises monitoring and gets a follow-up
    /// system record.
    pub detected: bool,
    pub message: String,
}

impl Resolution {
    fn quiet(success: bool, message: String) -> Self {
        Self {
            success,
            detected: false,
            message,
        }
    }
}

/// Resolve `action` against the current state, consuming RNG samples in the
/// documented order. Phase and budget checks happen in the controller; this
/// function owns target/resource preconditions and the state delta.
pub(crate) fn resolve(
    topology: &Topology,
    insider: &str,
    state: &mut GameState,
    rng: &mut RngService,
    action: &Action,
) -> Result<Resolution, EngineError> {
    match action {
        Action::Recon => Ok(recon(state)),
        Action::Social => social(topology, insider, state, rng),
        Action::Recruit => recruit(state),
        Action::Exploit { target } => exploit(topology, state, rng, target),
        Action::Lateral { from, to } => lateral(topology, state, rng, from, to),
        Action::Exfiltrate { target } => exfiltrate(topology, state, rng, target),
        Action::Harden { target } => harden(state, target),
        Action::Patch { target } => patch(topology, state, target),
        Action::Monitor => monitor(state),
        Action::Awareness => awareness(state),
        Action::Isolate { target } => isolate(topology, state, target),
        Action::Honeypot { target } => honeypot(topology, state, target),
        Action::Forensic => forensic(state, rng),
    }
}

fn require_node(topology: &Topology, name: &str) -> Result<(), EngineError> {
    if topology.contains(name) {
        Ok(())
    } else {
        Err(EngineError::InvalidTarget(format!("unknown node '{name}'")))
    }
}

fn require_funds(state: &GameState, cost: u32) -> Result<(), EngineError> {
    if state.attacker.funds < cost {
        return Err(EngineError::InsufficientResource {
            resource: "funds",
            needed: cost,
            available: state.attacker.funds,
        });
    }
    Ok(())
}

fn spend_budget(state: &mut GameState, cost: u32) -> Result<(), EngineError> {
    if state.defender.budget < cost {
        return Err(EngineError::InsufficientResource {
            resource: "budget",
            needed: cost,
            available: state.defender.budget,
        });
    }
    state.defender.budget -= cost;
    Ok(())
}

/// Detected attacker activity tightens monitoring.
fn detection_pulse(state: &mut GameState) {
    state.defender.monitoring = (state.defender.monitoring + DETECTION_PULSE).min(MONITORING_CAP);
}

// ---- attacker actions ----

fn recon(state: &mut GameState) -> Resolution {
    let mut bumped = 0usize;
    for status in state.nodes.values_mut() {
        status.exposure = (status.exposure + RECON_EXPOSURE_STEP).min(1.0);
        bumped += 1;
    }
    Resolution::quiet(
        true,
        format!("Recon sweep -> exposure +{RECON_EXPOSURE_STEP:.2} across {bumped} nodes"),
    )
}

fn social(
    topology: &Topology,
    insider: &str,
    state: &mut GameState,
    rng: &mut RngService,
) -> Result<Resolution, EngineError> {
    require_node(topology, insider)?;
    let status = state.node(insider).expect("validated above");
    if status.isolated {
        return Err(EngineError::InvalidTarget(format!(
            "insider node '{insider}' is isolated"
        )));
    }

    let base = 0.35 * state.attacker.influence;
    let p = success_chance(
        base,
        state.attacker.skill,
        status.patch_level,
        1.0 / state.defender.awareness,
    );
    let roll = rng.chance(p);
    if !roll.hit {
        return Ok(Resolution::quiet(
            false,
            format!("Social influence {insider} -> success=false (p={p:.2})"),
        ));
    }

    let dp = detection_chance(
        0.15,
        state.defender.monitoring,
        1.2 * state.defender.awareness,
    );
    let detected = rng.chance(dp).hit;
    if let Some(status) = state.node_mut(insider) {
        status.compromised = true;
    }
    state.attacker.footholds.insert(insider.to_string());
    if detected {
        detection_pulse(state);
    }
    Ok(Resolution {
        success: true,
        detected,
        message: format!(
            "Social influence {insider} -> success=true (p={p:.2}), detected={detected} (p={dp:.2})"
        ),
    })
}

fn recruit(state: &mut GameState) -> Result<Resolution, EngineError> {
    require_funds(state, RECRUIT_COST)?;
    state.attacker.funds -= RECRUIT_COST;
    state.attacker.members += 1;
    state.attacker.skill += 1.0;
    Ok(Resolution::quiet(
        true,
        format!(
            "Recruit -> members={}, skill={:.1} (funds -{RECRUIT_COST})",
            state.attacker.members, state.attacker.skill
        ),
    ))
}

fn exploit(
    topology: &Topology,
    state: &mut GameState,
    rng: &mut RngService,
    target: &str,
) -> Result<Resolution, EngineError> {
    require_node(topology, target)?;
    let status = state.node(target).expect("validated above");
    if status.isolated {
        return Err(EngineError::InvalidTarget(format!(
            "node '{target}' is isolated"
        )));
    }

    let adjacent = topology.is_adjacent_to_foothold(target, &state.attacker.footholds);
    let modifier = if adjacent { 1.3 } else { 1.0 };
    let p = success_chance(
        status.exposure,
        state.attacker.skill,
        status.patch_level,
        modifier,
    );
    let roll = rng.chance(p);
    if !roll.hit {
        return Ok(Resolution::quiet(
            false,
            format!("Exploit {target} -> success=false (p={p:.2}), adj={adjacent}"),
        ));
    }

    let value = topology.spec(target).expect("validated above").value;
    let dp = detection_chance(
        0.1 + f64::from(value) / 100.0,
        state.defender.monitoring,
        0.9,
    );
    let detected = rng.chance(dp).hit;
    if let Some(status) = state.node_mut(target) {
        status.compromised = true;
    }
    state.attacker.footholds.insert(target.to_string());
    if detected {
        detection_pulse(state);
    }
    Ok(Resolution {
        success: true,
        detected,
        message: format!(
            "Exploit {target} -> success=true (p={p:.2}), detected={detected} (p={dp:.2}), adj={adjacent}"
        ),
    })
}

fn lateral(
    topology: &Topology,
    state: &mut GameState,
    rng: &mut RngService,
    from: &str,
    to: &str,
) -> Result<Resolution, EngineError> {
    require_node(topology, from)?;
    require_node(topology, to)?;
    if !state.attacker.footholds.contains(from) {
        return Err(EngineError::InvalidTarget(format!(
            "source '{from}' is not a foothold"
        )));
    }
    if !topology.neighbors(from).iter().any(|n| n == to) {
        return Err(EngineError::InvalidTarget(format!(
            "'{to}' is not adjacent to '{from}'"
        )));
    }
    let status = state.node(to).expect("validated above");
    if status.isolated {
        return Err(EngineError::InvalidTarget(format!(
            "node '{to}' is isolated"
        )));
    }

    let base = 0.4 + status.exposure * 0.3;
    let p = success_chance(base, state.attacker.skill, status.patch_level, 1.0);
    let roll = rng.chance(p);
    if !roll.hit {
        return Ok(Resolution::quiet(
            false,
            format!("Lateral {from}->{to} -> success=false (p={p:.2})"),
        ));
    }

    let dp = detection_chance(0.12, state.defender.monitoring, 1.0);
    let detected = rng.chance(dp).hit;
    if let Some(status) = state.node_mut(to) {
        status.compromised = true;
    }
    state.attacker.footholds.insert(to.to_string());
    if detected {
        detection_pulse(state);
    }
    Ok(Resolution {
        success: true,
        detected,
        message: format!(
            "Lateral {from}->{to} -> success=true (p={p:.2}), detected={detected} (p={dp:.2})"
        ),
    })
}

fn exfiltrate(
    topology: &Topology,
    state: &mut GameState,
    rng: &mut RngService,
    target: &str,
) -> Result<Resolution, EngineError> {
    require_node(topology, target)?;
    if !state.attacker.footholds.contains(target) {
        return Err(EngineError::InvalidTarget(format!(
            "node '{target}' is not a foothold"
        )));
    }
    let status = state.node(target).expect("validated above");
    if status.isolated {
        return Err(EngineError::InvalidTarget(format!(
            "node '{target}' is isolated"
        )));
    }

    let patch_level = status.patch_level;
    let p = success_chance(0.5, state.attacker.skill, patch_level, 1.0);
    let roll = rng.chance(p);
    if !roll.hit {
        return Ok(Resolution::quiet(
            false,
            format!("Exfiltrate {target} -> success=false (p={p:.2})"),
        ));
    }

    let value = topology.spec(target).expect("validated above").value;
    // Exfiltration is the loudest action: strictly higher detection base
    // than exploiting the same node.
    let dp = detection_chance(
        0.25 + f64::from(value) / 100.0,
        state.defender.monitoring,
        1.0,
    );
    let detected = rng.chance(dp).hit;
    state.attacker.exfil_value += value;
    state.attacker.funds += value / 2;
    if detected {
        detection_pulse(state);
    }
    Ok(Resolution {
        success: true,
        detected,
        message: format!(
            "Exfiltrate {target} -> success=true (p={p:.2}), detected={detected} (p={dp:.2}), gained={value}"
        ),
    })
}

fn harden(state: &mut GameState, target: &str) -> Result<Resolution, EngineError> {
    if !state.attacker.footholds.contains(target) {
        return Err(EngineError::InvalidTarget(format!(
            "node '{target}' is not a foothold"
        )));
    }
    state.attacker.skill += 0.2;
    if let Some(status) = state.node_mut(target) {
        status.persistent = true;
    }
    Ok(Resolution::quiet(
        true,
        format!("Harden {target} -> persistence set (skill +0.2)"),
    ))
}

// ---- defender actions ----

fn patch(
    topology: &Topology,
    state: &mut GameState,
    target: &str,
) -> Result<Resolution, EngineError> {
    require_node(topology, target)?;
    spend_budget(state, PATCH_COST)?;
    let status = state.node_mut(target).expect("validated above");
    status.patch_level = (status.patch_level + 2).min(PATCH_LEVEL_CAP);
    status.exposure = (status.exposure - 0.15).max(EXPOSURE_FLOOR);
    let message = format!(
        "Patch {target} -> patch={}, exposure={:.2}",
        status.patch_level, status.exposure
    );
    Ok(Resolution::quiet(true, message))
}

fn monitor(state: &mut GameState) -> Result<Resolution, EngineError> {
    spend_budget(state, MONITOR_COST)?;
    state.defender.monitoring = (state.defender.monitoring + 0.3).min(MONITORING_CAP);
    Ok(Resolution::quiet(
        true,
        format!("Monitoring -> {:.2}", state.defender.monitoring),
    ))
}

fn awareness(state: &mut GameState) -> Result<Resolution, EngineError> {
    spend_budget(state, AWARENESS_COST)?;
    state.defender.awareness = (state.defender.awareness + 0.2).min(AWARENESS_CAP);
    Ok(Resolution::quiet(
        true,
        format!("Awareness campaign -> {:.2}", state.defender.awareness),
    ))
}

fn isolate(
    topology: &Topology,
    state: &mut GameState,
    target: &str,
) -> Result<Resolution, EngineError> {
    require_node(topology, target)?;
    spend_budget(state, ISOLATE_COST)?;
    let status = state.node_mut(target).expect("validated above");
    let was_compromised = status.compromised;
    status.isolated = true;
    status.compromised = false;
    state.attacker.footholds.remove(target);
    let message = if was_compromised {
        format!("Isolate {target} -> segment cut, compromise removed")
    } else {
        format!("Isolate {target} -> segment cut")
    };
    Ok(Resolution::quiet(true, message))
}

fn honeypot(
    topology: &Topology,
    state: &mut GameState,
    target: &str,
) -> Result<Resolution, EngineError> {
    require_node(topology, target)?;
    spend_budget(state, HONEYPOT_COST)?;
    if let Some(status) = state.node_mut(target) {
        status.honeypot = true;
    }
    Ok(Resolution::quiet(
        true,
        format!("Honeypot near {target} -> deployed"),
    ))
}

fn forensic(state: &mut GameState, rng: &mut RngService) -> Result<Resolution, EngineError> {
    spend_budget(state, FORENSIC_COST)?;
    let p = (state.defender.eviction * state.defender.monitoring).clamp(0.0, 0.9);

    // Each foothold is rolled independently, in name order, so the RNG
    // stream stays reproducible.
    let footholds: Vec<String> = state.attacker.footholds.iter().cloned().collect();
    let mut evicted = Vec::new();
    for name in footholds {
        if rng.chance(p).hit {
            if let Some(status) = state.node_mut(&name) {
                status.compromised = false;
            }
            state.attacker.footholds.remove(&name);
            evicted.push(name);
        }
    }

    if evicted.is_empty() {
        return Ok(Resolution::quiet(
            true,
            "Forensic -> no conclusive findings".to_string(),
        ));
    }
    state.attacker.funds = state.attacker.funds.saturating_sub(10);
    state.attacker.skill = (state.attacker.skill - 0.5).max(1.0);
    Ok(Resolution::quiet(
        true,
        format!(
            "Forensic -> evicted [{}] (attacker -10 funds, -0.5 skill)",
            evicted.join(", ")
        ),
    ))
}
