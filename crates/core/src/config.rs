//! Run configuration: topology definition, per-node baselines, and the
//! win/stop tunables. Deserializable so front ends can load a scenario file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Default exfiltration goal.
pub const DEFAULT_WIN_EXFIL: u32 = 100;
/// Default turn limit.
pub const DEFAULT_TURN_LIMIT: u32 = 14;
/// Default RNG seed; set `seed` to `None` for a non-reproducible run.
pub const DEFAULT_SEED: u64 = 42;

/// Static baseline attributes of a node. The node name is the key in
/// [`GameConfig::base_nodes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Zone membership, informational (e.g. "perimeter", "internal").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Payoff contributed to the exfiltration goal when drained.
    pub value: u32,
    /// Baseline exposure, 0.0..=1.0; drives exploit success and detection.
    pub exposure: f64,
}

impl NodeSpec {
    fn new(zone: &str, value: u32, exposure: f64) -> Self {
        Self {
            zone: Some(zone.to_string()),
            value,
            exposure,
        }
    }
}

/// Policy applied when the turn limit runs out before the attacker reaches
/// the exfiltration goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", content = "threshold", rename_all = "snake_case")]
pub enum TimeLimitPolicy {
    /// Defender wins on time-out regardless of partial attacker progress.
    #[default]
    DefenderHolds,
    /// Attacker wins on time-out if at least this much value was exfiltrated.
    /// A threshold of 50 reproduces the classic scenario's damage rule.
    DamageThreshold(u32),
}

/// Recognized options for a new run. [`GameConfig::default`] reproduces the
/// classic seven-node corporate network scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Directed adjacency: node name -> neighbor names.
    pub topology: BTreeMap<String, Vec<String>>,
    /// Per-node baseline attributes, keyed by node name.
    pub base_nodes: BTreeMap<String, NodeSpec>,
    /// Exfiltration goal ending the run with attacker victory.
    pub win_exfil: u32,
    /// Number of full turns before the time-limit policy applies.
    pub turn_limit: u32,
    /// RNG seed. `None` draws entropy from the OS; runs are then not
    /// reproducible.
    pub seed: Option<u64>,
    /// Node targeted by social-engineering attempts.
    pub insider: String,
    /// Tie-break policy at the turn limit.
    pub time_limit_policy: TimeLimitPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        let mut topology = BTreeMap::new();
        for (node, neighbors) in [
            ("Internet", vec!["Firewall"]),
            ("Firewall", vec!["Internet", "DMZ"]),
            ("DMZ", vec!["Firewall", "CorpLAN"]),
            ("CorpLAN", vec!["DMZ", "Admin", "Insider", "SIEM"]),
            ("Admin", vec!["CorpLAN"]),
            ("SIEM", vec!["CorpLAN"]),
            ("Insider", vec!["CorpLAN"]),
        ] {
            topology.insert(
                node.to_string(),
                neighbors.into_iter().map(str::to_string).collect(),
            );
        }

        let mut base_nodes = BTreeMap::new();
        base_nodes.insert("Internet".to_string(), NodeSpec::new("external", 0, 1.00));
        base_nodes.insert("Firewall".to_string(), NodeSpec::new("perimeter", 5, 0.20));
        base_nodes.insert("DMZ".to_string(), NodeSpec::new("perimeter", 10, 0.40));
        base_nodes.insert("CorpLAN".to_string(), NodeSpec::new("internal", 20, 0.60));
        base_nodes.insert("Admin".to_string(), NodeSpec::new("internal", 30, 0.30));
        base_nodes.insert("SIEM".to_string(), NodeSpec::new("internal", 15, 0.25));
        base_nodes.insert("Insider".to_string(), NodeSpec::new("internal", 8, 0.50));

        Self {
            topology,
            base_nodes,
            win_exfil: DEFAULT_WIN_EXFIL,
            turn_limit: DEFAULT_TURN_LIMIT,
            seed: Some(DEFAULT_SEED),
            insider: "Insider".to_string(),
            time_limit_policy: TimeLimitPolicy::default(),
        }
    }
}

impl GameConfig {
    /// Validate everything that is not covered by topology construction.
    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.base_nodes.is_empty() {
            return Err(EngineError::Configuration("no nodes defined".to_string()));
        }
        if self.win_exfil == 0 {
            return Err(EngineError::Configuration(
                "win_exfil must be at least 1".to_string(),
            ));
        }
        if self.turn_limit == 0 {
            return Err(EngineError::Configuration(
                "turn_limit must be at least 1".to_string(),
            ));
        }
        if !self.base_nodes.contains_key(&self.insider) {
            return Err(EngineError::Configuration(format!(
                "insider node '{}' is not in the node set",
                self.insider
            )));
        }
        for (name, spec) in &self.base_nodes {
            if !(0.0..=1.0).contains(&spec.exposure) {
                return Err(EngineError::Configuration(format!(
                    "node '{name}' exposure {} outside 0.0..=1.0",
                    spec.exposure
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.base_nodes.len(), 7);
        assert_eq!(config.win_exfil, 100);
        assert_eq!(config.turn_limit, 14);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.time_limit_policy, TimeLimitPolicy::DefenderHolds);
    }

    #[test]
    fn rejects_missing_insider() {
        let mut config = GameConfig::default();
        config.insider = "Mole".to_string();
        assert!(matches!(
            config.validate(),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_exposure() {
        let mut config = GameConfig::default();
        config.base_nodes.get_mut("DMZ").unwrap().exposure = 1.5;
        assert!(matches!(
            config.validate(),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn deserializes_partial_overrides() {
        let config: GameConfig =
            serde_json::from_str(r#"{"win_exfil": 60, "seed": null}"#).unwrap();
        assert_eq!(config.win_exfil, 60);
        assert_eq!(config.seed, None);
        assert_eq!(config.turn_limit, DEFAULT_TURN_LIMIT);
        config.validate().unwrap();
    }

    #[test]
    fn damage_threshold_policy_round_trips() {
        let mut config = GameConfig::default();
        config.time_limit_policy = TimeLimitPolicy::DamageThreshold(50);
        let raw = serde_json::to_string(&config).unwrap();
        let parsed: GameConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.time_limit_policy, TimeLimitPolicy::DamageThreshold(50));
    }
}
