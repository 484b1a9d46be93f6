//! Static network topology: the node set and its directed adjacency.
//!
//! Validated once at construction; read-only for the lifetime of a run. Only
//! node *status* (held in [`crate::GameState`]) mutates afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{GameConfig, NodeSpec};
use crate::error::EngineError;

/// Immutable node set plus adjacency relation.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: BTreeMap<String, NodeSpec>,
    adjacency: BTreeMap<String, Vec<String>>,
}

impl Topology {
    /// Build and validate a topology from a run configuration. Fails with
    /// [`EngineError::Configuration`] if an adjacency entry references a node
    /// absent from the node set.
    pub fn from_config(config: &GameConfig) -> Result<Self, EngineError> {
        for (name, neighbors) in &config.topology {
            if !config.base_nodes.contains_key(name) {
                return Err(EngineError::Configuration(format!(
                    "adjacency entry '{name}' is not in the node set"
                )));
            }
            for neighbor in neighbors {
                if !config.base_nodes.contains_key(neighbor) {
                    return Err(EngineError::Configuration(format!(
                        "edge {name} -> {neighbor} references an unknown node"
                    )));
                }
            }
        }

        Ok(Self {
            nodes: config.base_nodes.clone(),
            adjacency: config.topology.clone(),
        })
    }

    /// Whether the node exists at all.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Static attributes of a node.
    pub fn spec(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.get(name)
    }

    /// All nodes in name order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeSpec)> {
        self.nodes.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the topology has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adjacency lookup. Nodes without outgoing edges yield an empty slice.
    pub fn neighbors(&self, name: &str) -> &[String] {
        self.adjacency.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `a` and `b` share an edge in either direction.
    pub fn is_adjacent(&self, a: &str, b: &str) -> bool {
        self.neighbors(a).iter().any(|n| n == b) || self.neighbors(b).iter().any(|n| n == a)
    }

    /// True if any neighbor of `name` carries an attacker foothold.
    pub fn is_adjacent_to_foothold(&self, name: &str, footholds: &BTreeSet<String>) -> bool {
        self.neighbors(name).iter().any(|n| footholds.contains(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topology_builds() {
        let topology = Topology::from_config(&GameConfig::default()).unwrap();
        assert_eq!(topology.len(), 7);
        assert!(topology.contains("SIEM"));
        assert_eq!(topology.neighbors("Internet"), ["Firewall"]);
        assert_eq!(
            topology.neighbors("CorpLAN"),
            ["DMZ", "Admin", "Insider", "SIEM"]
        );
        assert!(topology.is_adjacent("DMZ", "CorpLAN"));
        assert!(!topology.is_adjacent("DMZ", "Admin"));
    }

    #[test]
    fn rejects_edge_to_unknown_node() {
        let mut config = GameConfig::default();
        config
            .topology
            .get_mut("DMZ")
            .unwrap()
            .push("Mainframe".to_string());
        let err = Topology::from_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn rejects_unknown_adjacency_key() {
        let mut config = GameConfig::default();
        config
            .topology
            .insert("Mainframe".to_string(), vec!["DMZ".to_string()]);
        assert!(Topology::from_config(&config).is_err());
    }

    #[test]
    fn foothold_adjacency() {
        let topology = Topology::from_config(&GameConfig::default()).unwrap();
        let mut footholds = BTreeSet::new();
        assert!(!topology.is_adjacent_to_foothold("CorpLAN", &footholds));
        footholds.insert("DMZ".to_string());
        assert!(topology.is_adjacent_to_foothold("CorpLAN", &footholds));
        assert!(!topology.is_adjacent_to_foothold("Admin", &footholds));
    }
}
