//! Error types for config resolution.

use thiserror::Error;

/// Errors that can occur while resolving or editing node configuration.
///
/// Stale override targets and type-mismatched overrides are not errors; they
/// are skipped during merging.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The queried node is not part of the tree.
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// Following parent links from the node revisits a node.
    #[error("Parent chain of node {0} contains a cycle")]
    AncestryCycle(String),

    /// An edit addressed a group or value that does not exist, or a map where
    /// a scalar was expected.
    #[error("No editable value at {0}")]
    ValueNotFound(String),

    /// Stored JSON was malformed (strict parsing only).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout config-inherit.
pub type Result<T> = std::result::Result<T, ConfigError>;
