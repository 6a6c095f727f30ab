//! Resolve the effective configuration of a node from its ancestor chain.
//!
//! Ancestors are processed root to leaf. Each ancestor's overrides are merged
//! into the layers of the ancestors processed before it, then its own config
//! becomes a new layer. The queried node's overrides go last, so the most
//! specific node always wins for a given `(node, sid, valueID, segmentID)`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::diff::encode_diff;
use crate::error::Result;
use crate::merge::merge_groups;
use crate::tree::{ConfigNode, NodeOverride, NodeTree, RawNodeConfig};
use crate::value::{ConfigGroup, ConfigValue};

/// One node's groups as seen from the queried node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLayer {
    #[serde(rename = "nodeID")]
    pub node_id: String,
    pub groups: Vec<ConfigGroup>,
}

/// The effective configuration for editing one node: one layer per ancestor,
/// root first, then the node's own layer.
///
/// Every segment carries an explicit `changed` flag: `true` only where the
/// queried node itself overrides an ancestor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    #[serde(rename = "nodeID")]
    pub node_id: String,
    pub layers: Vec<ResolvedLayer>,
}

impl ResolvedConfig {
    pub fn layer(&self, node_id: &str) -> Option<&ResolvedLayer> {
        self.layers.iter().find(|l| l.node_id == node_id)
    }

    pub fn layer_mut(&mut self, node_id: &str) -> Option<&mut ResolvedLayer> {
        self.layers.iter_mut().find(|l| l.node_id == node_id)
    }

    /// The queried node's own layer.
    pub fn own_layer(&self) -> Option<&ResolvedLayer> {
        self.layers.last()
    }

    pub fn find_value(&self, node_id: &str, sid: &str, value_id: &str) -> Option<&ConfigValue> {
        self.layer(node_id)?
            .groups
            .iter()
            .find(|g| g.sid == sid)?
            .value(value_id)
    }

    /// Value of one segment of a top-level scalar.
    pub fn segment_value(
        &self,
        node_id: &str,
        sid: &str,
        value_id: &str,
        segment_id: &str,
    ) -> Option<&Value> {
        self.find_value(node_id, sid, value_id)?
            .as_scalar()?
            .segment(segment_id)
            .map(|s| &s.value)
    }

    /// The override records the queried node persists: the changed-only diff
    /// of every ancestor layer that has changes.
    pub fn to_overrides(&self) -> Vec<NodeOverride> {
        let ancestors = self.layers.len().saturating_sub(1);
        self.layers[..ancestors]
            .iter()
            .filter_map(|layer| {
                let changed_values = encode_diff(&layer.groups);
                (!changed_values.is_empty()).then(|| NodeOverride {
                    target_node_id: layer.node_id.clone(),
                    changed_values,
                })
            })
            .collect()
    }
}

/// Resolve the configuration visible when editing `node_id`.
///
/// Nodes without an entry in `raw_configs`, or whose stored strings are blank
/// or malformed, contribute empty configuration.
///
/// # Errors
/// Returns [`crate::ConfigError::UnknownNode`] or
/// [`crate::ConfigError::AncestryCycle`] from the tree walk.
pub fn resolve(
    node_id: &str,
    tree: &NodeTree,
    raw_configs: &HashMap<String, RawNodeConfig>,
) -> Result<ResolvedConfig> {
    let load = |id: &str| -> ConfigNode {
        raw_configs
            .get(id)
            .map(|raw| raw.to_node(id, tree.parent(id)))
            .unwrap_or_else(|| ConfigNode {
                node_id: id.to_string(),
                parent_id: tree.parent(id).map(str::to_string),
                ..ConfigNode::default()
            })
    };

    let mut chain = tree.ancestors(node_id)?;
    chain.reverse();
    let ancestors: Vec<ConfigNode> = chain.iter().map(|id| load(id)).collect();
    let node = load(node_id);

    Ok(resolve_nodes(&ancestors, &node))
}

/// Resolve from already-parsed snapshots: `ancestors` root first, `node` last.
pub fn resolve_nodes(ancestors: &[ConfigNode], node: &ConfigNode) -> ResolvedConfig {
    let mut layers: Vec<ResolvedLayer> = Vec::with_capacity(ancestors.len() + 1);

    for ancestor in ancestors {
        apply_overrides(&mut layers, &ancestor.override_config, false);
        layers.push(own_layer(ancestor));
    }
    apply_overrides(&mut layers, &node.override_config, true);
    layers.push(own_layer(node));

    ResolvedConfig {
        node_id: node.node_id.clone(),
        layers,
    }
}

fn own_layer(node: &ConfigNode) -> ResolvedLayer {
    let mut groups = node.own_config.clone();
    for group in &mut groups {
        group.mark_all(false);
    }
    ResolvedLayer {
        node_id: node.node_id.clone(),
        groups,
    }
}

fn apply_overrides(layers: &mut [ResolvedLayer], overrides: &[NodeOverride], changed: bool) {
    for record in overrides {
        match layers.iter_mut().find(|l| l.node_id == record.target_node_id) {
            Some(layer) => merge_groups(&mut layer.groups, &record.changed_values, changed),
            None => debug!(target = %record.target_node_id, "stale override target skipped"),
        }
    }
}
