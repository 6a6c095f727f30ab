//! # config-inherit
//!
//! Configuration inheritance for category trees of game entities.
//!
//! Every node declares its own groups of values and may override values of any
//! of its ancestors, per audience segment. [`resolve`] merges the chain root to
//! leaf into the configuration shown when editing a node; [`encode_diff`]
//! reduces an edited configuration to the changed segments that get stored.
//!
//! ## Quick start
//!
//! ```rust
//! use std::collections::HashMap;
//! use config_inherit::{resolve, NodeTree, RawNodeConfig};
//!
//! let mut tree = NodeTree::new();
//! tree.insert("root", None);
//! tree.insert("sword", Some("root".to_string()));
//!
//! let mut raw = HashMap::new();
//! raw.insert(
//!     "root".to_string(),
//!     RawNodeConfig::new(
//!         r#"[{"sid":"stats","values":[{"valueID":"damage","type":"number","segments":[{"segmentID":"everyone","value":10}]}]}]"#,
//!         "",
//!     ),
//! );
//! raw.insert(
//!     "sword".to_string(),
//!     RawNodeConfig::new(
//!         "",
//!         r#"[{"targetNodeID":"root","changedValues":[{"sid":"stats","values":[{"valueID":"damage","type":"number","segments":[{"segmentID":"everyone","value":25}]}]}]}]"#,
//!     ),
//! );
//!
//! let resolved = resolve("sword", &tree, &raw).unwrap();
//! let damage = resolved.segment_value("root", "stats", "damage", "everyone").unwrap();
//! assert_eq!(damage, 25);
//! ```
//!
//! ## Modules
//!
//! - [`value`]: groups, scalar/map values, segments (persisted JSON shape)
//! - [`tree`]: node records, tolerant parsing, parent-link arena
//! - [`merge`]: per-segment override merging and the edit primitive
//! - [`resolver`]: ancestor-chain resolution
//! - [`diff`]: changed-only encoding and its inverse
//! - [`error`]: Error types

pub mod diff;
pub mod error;
pub mod merge;
pub mod resolver;
pub mod tree;
pub mod value;

pub use diff::{decode_diff, encode_diff, encode_diff_json};
pub use error::ConfigError;
pub use merge::{merge_groups, set_segment};
pub use resolver::{resolve, resolve_nodes, ResolvedConfig, ResolvedLayer};
pub use tree::{
    parse_groups, parse_overrides, try_parse_groups, try_parse_overrides, ConfigNode,
    NodeOverride, NodeTree, RawNodeConfig, TreeNode,
};
pub use value::{ConfigGroup, ConfigValue, MapValue, ScalarValue, Segment, ValueType};
