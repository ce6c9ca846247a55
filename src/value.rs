//! Serialization of form state to the minimal persisted value.
//!
//! The serializer emits only what the user actually populated: empty
//! branches disappear instead of serializing as `{}` or `[]`, and fields the
//! SDK always populates itself are suppressed even if form state happens to
//! carry text for them.

use serde_json::{Map, Value};

use crate::classify::TypeTag;
use crate::policy::AutoPopulationSource;
use crate::state::node::{FormStateNode, NodeBody};
use crate::validate::is_single_data_element_token;

/// Compute the persisted value of a subtree.
///
/// `None` means the subtree contributes nothing to the payload.
pub fn get_value(node: &FormStateNode) -> Option<Value> {
    // The runtime supplies these; the editor must never emit them.
    if node.auto_population == AutoPopulationSource::Always {
        return None;
    }

    if node.is_whole() {
        let trimmed = node.whole_value.trim();
        if trimmed.is_empty() {
            return None;
        }
        // The JSON editor's whole mode takes raw JSON as well as a token.
        if node.tag == TypeTag::ObjectJson
            && !is_single_data_element_token(trimmed)
            && let Ok(parsed) = serde_json::from_str::<Value>(trimmed)
        {
            return Some(parsed);
        }
        return Some(Value::String(node.whole_value.clone()));
    }

    match &node.body {
        NodeBody::Leaf => None,
        NodeBody::Properties(properties) => {
            let mut map = Map::new();
            for (name, child) in properties {
                if let Some(value) = get_value(child) {
                    map.insert(name.clone(), value);
                }
            }
            if map.is_empty() {
                None
            } else {
                Some(Value::Object(map))
            }
        }
        NodeBody::Items(items) => {
            let values: Vec<Value> = items.iter().filter_map(get_value).collect();
            if values.is_empty() {
                None
            } else {
                Some(Value::Array(values))
            }
        }
        NodeBody::Pairs(pairs) => {
            let expand = node.tag == TypeTag::ObjectJson && node.schema.expand_paths;
            let mut out = Value::Object(Map::new());
            let mut any = false;
            for pair in pairs {
                let key = pair.key.trim();
                if key.is_empty() {
                    continue;
                }
                any = true;
                let value = pair_value(&pair.value);
                if expand {
                    insert_path(&mut out, &parse_path(key), value);
                } else if let Value::Object(map) = &mut out {
                    map.insert(key.to_string(), value);
                }
            }
            if any { Some(out) } else { None }
        }
    }
}

/// Persisted value of one key/value row.
///
/// Tokens stay strings; anything that parses as JSON is emitted as the
/// parsed value so flattened numbers and booleans round-trip.
fn pair_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if is_single_data_element_token(trimmed) {
        return Value::String(raw.to_string());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(parsed) => parsed,
        Err(_) => Value::String(raw.to_string()),
    }
}

/// One step of a dot/bracket path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    Key(String),
    Index(usize),
}

/// Parse a dot/bracket path (`a.b[0].c`) into steps.
///
/// Malformed bracket syntax degrades to a literal key for that segment, so
/// expansion never fails outright.
pub(crate) fn parse_path(path: &str) -> Vec<Step> {
    let mut steps = Vec::new();
    for segment in path.split('.') {
        match parse_segment(segment) {
            Some(parsed) => steps.extend(parsed),
            None => steps.push(Step::Key(segment.to_string())),
        }
    }
    steps
}

fn parse_segment(segment: &str) -> Option<Vec<Step>> {
    let open = match segment.find('[') {
        Some(i) => i,
        None => return Some(vec![Step::Key(segment.to_string())]),
    };
    let (name, mut rest) = segment.split_at(open);
    let mut steps = Vec::new();
    if !name.is_empty() {
        steps.push(Step::Key(name.to_string()));
    }
    while let Some(inner) = rest.strip_prefix('[') {
        let close = inner.find(']')?;
        let index: usize = inner[..close].parse().ok()?;
        steps.push(Step::Index(index));
        rest = &inner[close + 1..];
    }
    if rest.is_empty() { Some(steps) } else { None }
}

/// Write `value` at `steps` inside `root`, creating containers on the way.
///
/// Arrays grow with null holes; an existing value of the wrong shape is
/// replaced rather than erroring.
fn insert_path(root: &mut Value, steps: &[Step], value: Value) {
    let Some((last, walk)) = steps.split_last() else {
        return;
    };
    let mut current = root;
    for step in walk {
        current = slot(current, step);
    }
    *slot(current, last) = value;
}

fn slot<'a>(current: &'a mut Value, step: &Step) -> &'a mut Value {
    match step {
        Step::Key(key) => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            match current {
                Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                _ => unreachable!("just replaced with an object"),
            }
        }
        Step::Index(index) => {
            if !current.is_array() {
                *current = Value::Array(Vec::new());
            }
            match current {
                Value::Array(items) => {
                    if items.len() <= *index {
                        items.resize(index + 1, Value::Null);
                    }
                    &mut items[*index]
                }
                _ => unreachable!("just replaced with an array"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FieldPolicies;
    use crate::schema::SchemaNode;
    use crate::state::build::build_form_state;
    use crate::state::edit::{set_pair_key, set_pair_value, set_whole_value};
    use crate::state::node::{IdGenerator, PopulationStrategy};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::rc::Rc;

    fn build_with(
        schema: serde_json::Value,
        previous: Option<serde_json::Value>,
        policies: &FieldPolicies,
    ) -> FormStateNode {
        let schema = Rc::new(SchemaNode::from_value(&schema).unwrap());
        let mut ids = IdGenerator::new();
        build_form_state(&schema, previous.as_ref(), policies, &mut ids)
    }

    fn build(schema: serde_json::Value, previous: Option<serde_json::Value>) -> FormStateNode {
        build_with(schema, previous, &FieldPolicies::empty())
    }

    #[test]
    fn empty_objects_are_omitted_not_emitted() {
        let root = build(
            json!({
                "type": "object",
                "properties": {
                    "vendor": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } }
                    }
                }
            }),
            None,
        );
        assert_eq!(get_value(&root), None);
    }

    #[test]
    fn populated_leaves_nest_into_objects() {
        let mut root = build(
            json!({
                "type": "object",
                "properties": {
                    "vendor": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } }
                    }
                }
            }),
            None,
        );
        let name_id = {
            let (_, vendor) = root.properties().next().unwrap();
            vendor.properties().next().unwrap().1.id
        };
        set_whole_value(&mut root, name_id, "Adobe").unwrap();
        assert_eq!(get_value(&root), Some(json!({ "vendor": { "name": "Adobe" } })));
    }

    #[test]
    fn whole_ancestor_supersedes_descendants() {
        let mut root = build(
            json!({
                "type": "object",
                "properties": {
                    "vendor": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } }
                    }
                }
            }),
            None,
        );
        let (vendor_id, name_id) = {
            let (_, vendor) = root.properties().next().unwrap();
            (vendor.id, vendor.properties().next().unwrap().1.id)
        };
        set_whole_value(&mut root, name_id, "Adobe").unwrap();
        crate::state::edit::set_population_strategy(
            &mut root,
            vendor_id,
            PopulationStrategy::Whole,
        )
        .unwrap();
        set_whole_value(&mut root, vendor_id, "%vendor%").unwrap();

        // The name text is superseded, not deleted from form state.
        assert_eq!(get_value(&root), Some(json!({ "vendor": "%vendor%" })));
        let (_, vendor) = root.properties().next().unwrap();
        assert_eq!(vendor.properties().next().unwrap().1.whole_value, "Adobe");
    }

    #[test]
    fn empty_arrays_are_omitted() {
        let root = build(
            json!({ "type": "array", "items": { "type": "string" } }),
            None,
        );
        assert_eq!(get_value(&root), None);
    }

    #[test]
    fn always_auto_populated_leaves_are_suppressed() {
        let mut root = build_with(
            json!({
                "type": "object",
                "properties": {
                    "timestamp": { "type": "string" },
                    "custom": { "type": "string" }
                }
            }),
            None,
            &FieldPolicies::xdm_defaults(),
        );
        // Should not normally occur: the editor disables these fields. The
        // serializer still refuses to emit them.
        if let NodeBody::Properties(properties) = &mut root.body {
            properties["timestamp"].whole_value = "sneaky".to_string();
            properties["custom"].whole_value = "kept".to_string();
        }
        assert_eq!(get_value(&root), Some(json!({ "custom": "kept" })));
    }

    #[test]
    fn pairs_expand_dot_and_bracket_paths() {
        let mut root = build(json!({ "type": "object/json" }), None);
        let id = root.id;
        set_pair_key(&mut root, id, 0, "a.b[1].c").unwrap();
        set_pair_value(&mut root, id, 0, "7").unwrap();
        assert_eq!(
            get_value(&root),
            Some(json!({ "a": { "b": [null, { "c": 7 }] } }))
        );
    }

    #[test]
    fn pairs_stay_flat_when_expansion_is_off() {
        let mut root = build(
            json!({ "type": "object/json", "expandPaths": false }),
            None,
        );
        let id = root.id;
        set_pair_key(&mut root, id, 0, "a.b").unwrap();
        set_pair_value(&mut root, id, 0, "%token%").unwrap();
        assert_eq!(get_value(&root), Some(json!({ "a.b": "%token%" })));
    }

    #[test]
    fn pairs_with_empty_keys_are_dropped() {
        let mut root = build(json!({ "type": "object/json" }), None);
        let id = root.id;
        set_pair_value(&mut root, id, 0, "orphan").unwrap();
        assert_eq!(get_value(&root), None);
    }

    #[test]
    fn json_whole_mode_emits_parsed_json() {
        let mut root = build(json!({ "type": "object/json" }), None);
        let id = root.id;
        crate::state::edit::set_population_strategy(&mut root, id, PopulationStrategy::Whole)
            .unwrap();
        set_whole_value(&mut root, id, r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(get_value(&root), Some(json!({ "a": [1, 2] })));

        set_whole_value(&mut root, id, "%blob%").unwrap();
        assert_eq!(get_value(&root), Some(json!("%blob%")));
    }

    #[test]
    fn malformed_bracket_paths_become_literal_keys() {
        assert_eq!(
            parse_path("a[x]"),
            vec![Step::Key("a[x]".to_string())]
        );
        assert_eq!(
            parse_path("a[0].b"),
            vec![
                Step::Key("a".to_string()),
                Step::Index(0),
                Step::Key("b".to_string())
            ]
        );
    }
}
