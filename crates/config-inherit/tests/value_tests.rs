//! Tests for the stored value model, parsing, and the node tree.

use config_inherit::{
    merge_groups, parse_groups, parse_overrides, try_parse_groups, ConfigValue, NodeTree, Segment,
    TreeNode, ValueType,
};
use serde_json::json;

#[test]
fn parses_scalar_and_map_shapes() {
    let groups = parse_groups(
        r##"[{"sid":"g","values":[
            {"valueID":"a","type":"color","segments":[{"segmentID":"everyone","value":"#fff"}]},
            {"valueID":"m","type":"map","values":[]}
        ]}]"##,
    );
    assert_eq!(groups[0].values[0].value_type(), ValueType::Color);
    assert!(matches!(groups[0].values[1], ConfigValue::Map(_)));
}

#[test]
fn unknown_type_tag_round_trips() {
    let groups = parse_groups(
        r#"[{"sid":"g","values":[{"valueID":"a","type":"gradient","segments":[]}]}]"#,
    );
    assert_eq!(
        groups[0].values[0].value_type(),
        ValueType::Other("gradient".to_string())
    );
    let back = serde_json::to_value(&groups).unwrap();
    assert_eq!(back[0]["values"][0]["type"], json!("gradient"));
}

#[test]
fn shape_follows_type() {
    // Segments on a map and nested values on a scalar are dropped.
    let groups = parse_groups(
        r#"[{"sid":"g","values":[
            {"valueID":"m","type":"map","segments":[{"segmentID":"everyone","value":1}],"values":[]},
            {"valueID":"s","type":"number","values":[],"segments":[]}
        ]}]"#,
    );
    let back = serde_json::to_value(&groups).unwrap();
    assert!(back[0]["values"][0].get("segments").is_none());
    assert!(back[0]["values"][1].get("values").is_none());
}

#[test]
fn blank_and_malformed_strings_parse_to_nothing() {
    assert!(parse_groups("").is_empty());
    assert!(parse_groups("  \n").is_empty());
    assert!(parse_groups("{oops").is_empty());
    assert!(parse_overrides("not json").is_empty());
    assert!(try_parse_groups("{oops").is_err());
    assert!(try_parse_groups("").unwrap().is_empty());
}

#[test]
fn missing_segment_value_defaults_to_null() {
    let groups = parse_groups(
        r#"[{"sid":"g","values":[{"valueID":"a","type":"any","segments":[{"segmentID":"everyone"}]}]}]"#,
    );
    let a = groups[0].values[0].as_scalar().unwrap();
    assert_eq!(a.segments, vec![Segment::new("everyone", serde_json::Value::Null)]);
}

#[test]
fn retype_between_scalars_keeps_segments() {
    let value = ConfigValue::scalar(
        "v",
        ValueType::String,
        vec![Segment::new("everyone", json!("1"))],
    );
    let retyped = value.retype(ValueType::Localized);
    assert_eq!(retyped.value_type(), ValueType::Localized);
    assert_eq!(retyped.as_scalar().unwrap().segments.len(), 1);
}

#[test]
fn retype_across_map_boundary_resets_shape() {
    let value = ConfigValue::scalar(
        "v",
        ValueType::String,
        vec![Segment::new("everyone", json!("1"))],
    );
    let map = value.retype(ValueType::Map);
    assert!(map.as_map().unwrap().values.is_empty());

    let scalar = map.retype(ValueType::Bool);
    assert_eq!(scalar.value_type(), ValueType::Bool);
    assert!(scalar.as_scalar().unwrap().segments.is_empty());
}

#[test]
fn tree_from_records() {
    let tree: NodeTree = serde_json::from_value::<Vec<TreeNode>>(json!([
        {"nodeID": "root", "parentID": ""},
        {"nodeID": "weapons", "parentID": "root"},
        {"nodeID": "sword", "parentID": "weapons"}
    ]))
    .unwrap()
    .into_iter()
    .collect();

    assert_eq!(tree.len(), 3);
    assert!(tree.contains("sword"));
    assert_eq!(tree.parent("root"), None);
    assert_eq!(tree.ancestors("sword").unwrap(), vec!["weapons", "root"]);
}

#[test]
fn duplicate_ids_are_kept_and_only_the_first_takes_overrides() {
    let mut groups = parse_groups(
        r#"[{"sid":"g","values":[
            {"valueID":"v","type":"number","segments":[
                {"segmentID":"everyone","value":1},
                {"segmentID":"everyone","value":2}
            ]},
            {"valueID":"v","type":"number","segments":[{"segmentID":"everyone","value":3}]}
        ]}]"#,
    );
    assert_eq!(groups[0].values.len(), 2);
    assert_eq!(groups[0].values[0].as_scalar().unwrap().segments.len(), 2);

    let overrides = parse_groups(
        r#"[{"sid":"g","values":[{"valueID":"v","type":"number","segments":[{"segmentID":"everyone","value":9}]}]}]"#,
    );
    merge_groups(&mut groups, &overrides, true);

    let first = groups[0].values[0].as_scalar().unwrap();
    assert_eq!(first.segments[0].value, json!(9));
    assert_eq!(first.segments[1].value, json!(2));
    let second = groups[0].values[1].as_scalar().unwrap();
    assert_eq!(second.segments[0].value, json!(3));
}
