//! Per-segment merging of override values into a materialized config.
//!
//! Groups are matched by `sid`, values by `valueID`, segments by `segmentID`.
//! Scalars take the override's explicit segments; maps recurse. Anything that
//! does not line up (missing group, missing value, different type) is left
//! untouched.

use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::value::{ConfigGroup, ConfigValue};

/// Merge `overrides` into `target`, marking every replaced segment with `changed`.
pub fn merge_groups(target: &mut [ConfigGroup], overrides: &[ConfigGroup], changed: bool) {
    for override_group in overrides {
        match target.iter_mut().find(|g| g.sid == override_group.sid) {
            Some(group) => merge_values(&mut group.values, &override_group.values, changed),
            None => debug!(sid = %override_group.sid, "override for unknown group skipped"),
        }
    }
}

/// Merge override values into a value list, matching by `valueID`.
pub fn merge_values(target: &mut [ConfigValue], overrides: &[ConfigValue], changed: bool) {
    for override_value in overrides {
        let id = override_value.value_id();
        match target.iter_mut().find(|v| v.value_id() == id) {
            Some(value) => merge_value(value, override_value, changed),
            None => debug!(value = id, "override for unknown value skipped"),
        }
    }
}

fn merge_value(target: &mut ConfigValue, override_value: &ConfigValue, changed: bool) {
    match (target, override_value) {
        (ConfigValue::Scalar(t), ConfigValue::Scalar(o)) if t.value_type == o.value_type => {
            for segment in o.segments.iter().filter(|s| s.is_explicit()) {
                t.upsert_segment(&segment.segment_id, segment.value.clone(), changed);
            }
        }
        (ConfigValue::Map(t), ConfigValue::Map(o)) => {
            merge_values(&mut t.values, &o.values, changed);
        }
        (t, o) => debug!(
            value = o.value_id(),
            stored = t.value_type().as_str(),
            requested = o.value_type().as_str(),
            "type mismatch, override skipped"
        ),
    }
}

/// Set one segment of a scalar value as an explicit edit (`changed = true`).
///
/// `value_path` walks nested maps by `valueID`; its last element names the
/// scalar. A segment that does not exist yet is added.
///
/// # Errors
/// Returns [`ConfigError::ValueNotFound`] if the group or any path element is
/// missing, or the path ends on a map.
pub fn set_segment(
    groups: &mut [ConfigGroup],
    sid: &str,
    value_path: &[&str],
    segment_id: &str,
    value: Value,
) -> Result<()> {
    let not_found = || ConfigError::ValueNotFound(format!("{sid}/{}", value_path.join("/")));

    let group = groups.iter_mut().find(|g| g.sid == sid).ok_or_else(not_found)?;
    let (last, parents) = value_path.split_last().ok_or_else(not_found)?;

    let mut values = &mut group.values;
    for id in parents {
        match values.iter_mut().find(|v| v.value_id() == *id) {
            Some(ConfigValue::Map(map)) => values = &mut map.values,
            _ => return Err(not_found()),
        }
    }

    match values.iter_mut().find(|v| v.value_id() == *last) {
        Some(ConfigValue::Scalar(scalar)) => {
            scalar.upsert_segment(segment_id, value, true);
            Ok(())
        }
        _ => Err(not_found()),
    }
}
