//! Configuration value model.
//!
//! A stored value record carries either `segments` (every scalar type) or
//! nested `values` (type `map`), never both. [`ConfigValue`] makes that a
//! variant, so the shape follows the type by construction. Field names match
//! the persisted JSON exactly: `sid`, `valueID`, `type`, `segments`,
//! `segmentID`, `value`, `changed`, `values`. Unknown fields on groups and
//! values are carried through untouched.
//!
//! Ids are expected to be unique per level: `valueID` within a group or map,
//! `segmentID` within a scalar. Merging matches the first record with a given
//! id, so duplicates found while parsing are logged.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Type tag of a configuration value.
///
/// Unknown tags are kept verbatim in [`ValueType::Other`] so data written by a
/// newer editor still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueType {
    String,
    Number,
    Bool,
    Color,
    Image,
    Sound,
    Video,
    Any,
    Localized,
    Map,
    Other(String),
}

impl ValueType {
    pub fn as_str(&self) -> &str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Bool => "bool",
            ValueType::Color => "color",
            ValueType::Image => "image",
            ValueType::Sound => "sound",
            ValueType::Video => "video",
            ValueType::Any => "any",
            ValueType::Localized => "localized",
            ValueType::Map => "map",
            ValueType::Other(tag) => tag,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, ValueType::Map)
    }
}

impl From<String> for ValueType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "string" => ValueType::String,
            "number" => ValueType::Number,
            "bool" => ValueType::Bool,
            "color" => ValueType::Color,
            "image" => ValueType::Image,
            "sound" => ValueType::Sound,
            "video" => ValueType::Video,
            "any" => ValueType::Any,
            "localized" => ValueType::Localized,
            "map" => ValueType::Map,
            _ => ValueType::Other(tag),
        }
    }
}

impl From<ValueType> for String {
    fn from(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// One audience bucket's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "segmentID")]
    pub segment_id: String,
    #[serde(default)]
    pub value: Value,
    /// `Some(true)`: diverges from the inherited default. `Some(false)`:
    /// pass-through. `None`: no marker, as in persisted diffs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

impl Segment {
    pub fn new(segment_id: impl Into<String>, value: Value) -> Self {
        Self {
            segment_id: segment_id.into(),
            value,
            changed: None,
        }
    }

    pub fn changed(mut self, changed: bool) -> Self {
        self.changed = Some(changed);
        self
    }

    /// Marked as diverging from the inherited default.
    pub fn is_changed(&self) -> bool {
        self.changed == Some(true)
    }

    /// Carries a value to apply when merged as an override. Stored diffs have
    /// their marker stripped, so only an explicit `false` opts out.
    pub fn is_explicit(&self) -> bool {
        self.changed != Some(false)
    }
}

/// A non-map value: one entry per segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarValue {
    pub value_id: String,
    pub value_type: ValueType,
    pub segments: Vec<Segment>,
    pub extra: Map<String, Value>,
}

impl ScalarValue {
    pub fn segment(&self, segment_id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.segment_id == segment_id)
    }

    /// Replace (or add) a segment's value and set its marker.
    pub fn upsert_segment(&mut self, segment_id: &str, value: Value, changed: bool) {
        match self.segments.iter_mut().find(|s| s.segment_id == segment_id) {
            Some(segment) => {
                segment.value = value;
                segment.changed = Some(changed);
            }
            None => self
                .segments
                .push(Segment::new(segment_id, value).changed(changed)),
        }
    }
}

/// A `map` value: nested values, no segments.
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    pub value_id: String,
    pub values: Vec<ConfigValue>,
    pub extra: Map<String, Value>,
}

/// A configuration value, scalar or map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConfigValue", into = "RawConfigValue")]
pub enum ConfigValue {
    Scalar(ScalarValue),
    Map(MapValue),
}

impl ConfigValue {
    pub fn scalar(value_id: impl Into<String>, value_type: ValueType, segments: Vec<Segment>) -> Self {
        ConfigValue::Scalar(ScalarValue {
            value_id: value_id.into(),
            value_type,
            segments,
            extra: Map::new(),
        })
    }

    pub fn map(value_id: impl Into<String>, values: Vec<ConfigValue>) -> Self {
        ConfigValue::Map(MapValue {
            value_id: value_id.into(),
            values,
            extra: Map::new(),
        })
    }

    pub fn value_id(&self) -> &str {
        match self {
            ConfigValue::Scalar(s) => &s.value_id,
            ConfigValue::Map(m) => &m.value_id,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ConfigValue::Scalar(s) => s.value_type.clone(),
            ConfigValue::Map(_) => ValueType::Map,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            ConfigValue::Scalar(s) => Some(s),
            ConfigValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            ConfigValue::Map(m) => Some(m),
            ConfigValue::Scalar(_) => None,
        }
    }

    /// Switch the value's type.
    ///
    /// Scalar-to-scalar keeps the segments. Crossing the map boundary rebuilds
    /// the shape: a new map starts with no nested values, a new scalar with no
    /// segments.
    pub fn retype(self, value_type: ValueType) -> ConfigValue {
        match (self, value_type.is_map()) {
            (ConfigValue::Scalar(mut s), false) => {
                s.value_type = value_type;
                ConfigValue::Scalar(s)
            }
            (ConfigValue::Scalar(s), true) => ConfigValue::Map(MapValue {
                value_id: s.value_id,
                values: Vec::new(),
                extra: s.extra,
            }),
            (ConfigValue::Map(m), false) => ConfigValue::Scalar(ScalarValue {
                value_id: m.value_id,
                value_type,
                segments: Vec::new(),
                extra: m.extra,
            }),
            (map @ ConfigValue::Map(_), true) => map,
        }
    }

    /// Set every segment's marker, recursing into maps.
    pub fn mark_all(&mut self, changed: bool) {
        match self {
            ConfigValue::Scalar(s) => {
                for segment in &mut s.segments {
                    segment.changed = Some(changed);
                }
            }
            ConfigValue::Map(m) => {
                for value in &mut m.values {
                    value.mark_all(changed);
                }
            }
        }
    }
}

/// A named group of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigGroup {
    pub sid: String,
    #[serde(default, deserialize_with = "deserialize_values")]
    pub values: Vec<ConfigValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigGroup {
    pub fn new(sid: impl Into<String>, values: Vec<ConfigValue>) -> Self {
        Self {
            sid: sid.into(),
            values,
            extra: Map::new(),
        }
    }

    pub fn value(&self, value_id: &str) -> Option<&ConfigValue> {
        self.values.iter().find(|v| v.value_id() == value_id)
    }

    pub fn mark_all(&mut self, changed: bool) {
        for value in &mut self.values {
            value.mark_all(changed);
        }
    }
}

/// The record exactly as stored; both shape fields optional.
#[derive(Serialize, Deserialize)]
struct RawConfigValue {
    #[serde(rename = "valueID")]
    value_id: String,
    #[serde(rename = "type")]
    value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    segments: Option<Vec<Segment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<ConfigValue>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawConfigValue> for ConfigValue {
    fn from(raw: RawConfigValue) -> Self {
        if raw.value_type.is_map() {
            if raw.segments.is_some() {
                debug!(value = %raw.value_id, "dropping segments stored on a map value");
            }
            let values = raw.values.unwrap_or_default();
            log_duplicate_ids(&raw.value_id, values.iter().map(ConfigValue::value_id));
            ConfigValue::Map(MapValue {
                value_id: raw.value_id,
                values,
                extra: raw.extra,
            })
        } else {
            if raw.values.is_some() {
                debug!(value = %raw.value_id, "dropping nested values stored on a scalar value");
            }
            let segments = raw.segments.unwrap_or_default();
            log_duplicate_ids(&raw.value_id, segments.iter().map(|s| s.segment_id.as_str()));
            ConfigValue::Scalar(ScalarValue {
                value_id: raw.value_id,
                value_type: raw.value_type,
                segments,
                extra: raw.extra,
            })
        }
    }
}

fn deserialize_values<'de, D>(deserializer: D) -> Result<Vec<ConfigValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<ConfigValue>::deserialize(deserializer)?;
    log_duplicate_ids("<group>", values.iter().map(ConfigValue::value_id));
    Ok(values)
}

fn log_duplicate_ids<'a>(owner: &str, ids: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            debug!(owner, id, "duplicate id, only the first record takes overrides");
        }
    }
}

impl From<ConfigValue> for RawConfigValue {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Scalar(s) => RawConfigValue {
                value_id: s.value_id,
                value_type: s.value_type,
                segments: Some(s.segments),
                values: None,
                extra: s.extra,
            },
            ConfigValue::Map(m) => RawConfigValue {
                value_id: m.value_id,
                value_type: ValueType::Map,
                segments: None,
                values: Some(m.values),
                extra: m.extra,
            },
        }
    }
}
