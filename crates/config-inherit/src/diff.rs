//! Changed-only diffs of a configuration, for persistence.
//!
//! [`encode_diff`] keeps only segments marked `changed = true`, drops scalars
//! left without segments and groups left without values, and strips the
//! marker from what remains. Map values keep their position even when all of
//! their children were dropped; only maps that were empty to begin with go.
//! [`decode_diff`] lays a diff back over defaults for editing.

use crate::error::Result;
use crate::merge::merge_groups;
use crate::value::{ConfigGroup, ConfigValue, MapValue, ScalarValue};

/// Reduce a configuration to its explicitly changed segments.
pub fn encode_diff(groups: &[ConfigGroup]) -> Vec<ConfigGroup> {
    groups
        .iter()
        .filter_map(|group| {
            let values = encode_values(&group.values);
            (!values.is_empty()).then(|| ConfigGroup {
                sid: group.sid.clone(),
                values,
                extra: group.extra.clone(),
            })
        })
        .collect()
}

/// [`encode_diff`] serialized as the JSON string handed to persistence.
pub fn encode_diff_json(groups: &[ConfigGroup]) -> Result<String> {
    Ok(serde_json::to_string(&encode_diff(groups))?)
}

fn encode_values(values: &[ConfigValue]) -> Vec<ConfigValue> {
    values.iter().filter_map(encode_value).collect()
}

fn encode_value(value: &ConfigValue) -> Option<ConfigValue> {
    match value {
        ConfigValue::Scalar(scalar) => {
            let segments: Vec<_> = scalar
                .segments
                .iter()
                .filter(|s| s.is_changed())
                .map(|s| {
                    let mut kept = s.clone();
                    kept.changed = None;
                    kept
                })
                .collect();
            if segments.is_empty() {
                return None;
            }
            Some(ConfigValue::Scalar(ScalarValue {
                segments,
                ..scalar.clone()
            }))
        }
        ConfigValue::Map(map) => {
            if map.values.is_empty() {
                return None;
            }
            Some(ConfigValue::Map(MapValue {
                value_id: map.value_id.clone(),
                values: encode_values(&map.values),
                extra: map.extra.clone(),
            }))
        }
    }
}

/// Expand a persisted diff against `defaults`.
///
/// Defaults come back marked unchanged, every diff segment that lands on an
/// existing value is applied and marked changed. Diff entries with no
/// counterpart in `defaults` are dropped.
pub fn decode_diff(diff: &[ConfigGroup], defaults: &[ConfigGroup]) -> Vec<ConfigGroup> {
    let mut resolved = defaults.to_vec();
    for group in &mut resolved {
        group.mark_all(false);
    }
    merge_groups(&mut resolved, diff, true);
    resolved
}
