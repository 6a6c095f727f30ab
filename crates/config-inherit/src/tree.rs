//! Node records, tolerant parsing of stored config strings, and the node arena.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, Result};
use crate::value::ConfigGroup;

/// Sparse values a node applies on top of one ancestor's config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOverride {
    #[serde(rename = "targetNodeID")]
    pub target_node_id: String,
    #[serde(rename = "changedValues", default)]
    pub changed_values: Vec<ConfigGroup>,
}

/// A category or entity node with its parsed configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigNode {
    #[serde(rename = "nodeID")]
    pub node_id: String,
    #[serde(rename = "parentID", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "ownConfig", default)]
    pub own_config: Vec<ConfigGroup>,
    #[serde(rename = "overrideConfig", default)]
    pub override_config: Vec<NodeOverride>,
}

/// The stored strings for one node, unparsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNodeConfig {
    /// JSON array of groups.
    #[serde(default)]
    pub config: String,
    /// JSON array of override records.
    #[serde(default)]
    pub overrides: String,
}

impl RawNodeConfig {
    pub fn new(config: impl Into<String>, overrides: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            overrides: overrides.into(),
        }
    }

    /// Parse into a node snapshot. Malformed strings yield empty lists.
    pub fn to_node(&self, node_id: &str, parent_id: Option<&str>) -> ConfigNode {
        ConfigNode {
            node_id: node_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            own_config: parse_groups(&self.config),
            override_config: parse_overrides(&self.overrides),
        }
    }
}

/// Strictly parse a stored group list. Blank input is an empty list.
pub fn try_parse_groups(raw: &str) -> Result<Vec<ConfigGroup>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Strictly parse a stored override list. Blank input is an empty list.
pub fn try_parse_overrides(raw: &str) -> Result<Vec<NodeOverride>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Parse a stored group list, treating malformed JSON as "no configuration".
pub fn parse_groups(raw: &str) -> Vec<ConfigGroup> {
    try_parse_groups(raw).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring malformed stored config");
        Vec::new()
    })
}

/// Parse a stored override list, treating malformed JSON as "no overrides".
pub fn parse_overrides(raw: &str) -> Vec<NodeOverride> {
    try_parse_overrides(raw).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring malformed stored overrides");
        Vec::new()
    })
}

/// A node's position in the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(rename = "nodeID")]
    pub node_id: String,
    #[serde(rename = "parentID", default)]
    pub parent_id: Option<String>,
}

/// Arena of parent links keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    parents: HashMap<String, Option<String>>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or move a node. An empty parent id marks a root.
    pub fn insert(&mut self, node_id: impl Into<String>, parent_id: Option<String>) {
        let parent_id = parent_id.filter(|p| !p.is_empty());
        self.parents.insert(node_id.into(), parent_id);
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.parents.contains_key(node_id)
    }

    pub fn parent(&self, node_id: &str) -> Option<&str> {
        self.parents.get(node_id)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Ancestors of `node_id`, nearest parent first, root last.
    ///
    /// A parent id that is not in the tree ends the chain there (the parent
    /// was removed).
    ///
    /// # Errors
    /// - [`ConfigError::UnknownNode`] if `node_id` itself is not in the tree.
    /// - [`ConfigError::AncestryCycle`] if the parent links loop.
    pub fn ancestors(&self, node_id: &str) -> Result<Vec<String>> {
        if !self.contains(node_id) {
            return Err(ConfigError::UnknownNode(node_id.to_string()));
        }

        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([node_id]);
        let mut current = node_id;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent) {
                return Err(ConfigError::AncestryCycle(node_id.to_string()));
            }
            if !self.contains(parent) {
                warn!(node = node_id, parent, "parent missing from tree, treating as root");
                break;
            }
            chain.push(parent.to_string());
            current = parent;
        }
        Ok(chain)
    }
}

impl FromIterator<TreeNode> for NodeTree {
    fn from_iter<I: IntoIterator<Item = TreeNode>>(iter: I) -> Self {
        let mut tree = NodeTree::new();
        for node in iter {
            tree.insert(node.node_id, node.parent_id);
        }
        tree
    }
}
