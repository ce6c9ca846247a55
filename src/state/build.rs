//! Form-state construction from a schema and previously persisted settings.
//!
//! The factory runs once per schema-load event and fully replaces any
//! previous tree. It adopts a persisted value into the new tree where the
//! value's shape matches the schema, and silently discards it where it does
//! not: settings may have been written through a raw API that bypassed the
//! editor, and robustness wins over strictness there.

use std::rc::Rc;

use log::debug;
use serde_json::Value;

use crate::classify::{TypeTag, classify};
use crate::policy::FieldPolicies;
use crate::schema::SchemaNode;
use crate::state::node::{
    FormStateNode, IdGenerator, KeyValuePair, NodeBody, PopulationStrategy,
};

/// Build a complete form-state tree.
///
/// `previous` is the persisted settings value for this subtree, when one
/// exists. The returned root is the sole owner of all nodes; the factory has
/// no side effects beyond handing out ids from `ids`.
pub fn build_form_state(
    schema: &Rc<SchemaNode>,
    previous: Option<&Value>,
    policies: &FieldPolicies,
    ids: &mut IdGenerator,
) -> FormStateNode {
    let root = build_node(schema, previous, None, "", schema.is_required, policies, ids);
    debug!(
        "built form state: {} nodes from schema {:?}",
        count_nodes(&root),
        schema.title.as_deref().unwrap_or("(untitled)")
    );
    root
}

fn build_node(
    schema: &Rc<SchemaNode>,
    previous: Option<&Value>,
    name: Option<&str>,
    path: &str,
    is_required: bool,
    policies: &FieldPolicies,
    ids: &mut IdGenerator,
) -> FormStateNode {
    let tag = classify(schema);
    let id = ids.next_id();
    let is_parts_supported = parts_supported(schema, tag);

    let body = match tag {
        TypeTag::Object => NodeBody::Properties(build_properties(
            schema, previous, path, policies, ids,
        )),
        TypeTag::Array => NodeBody::Items(build_items(schema, previous, path, policies, ids)),
        TypeTag::ObjectJson | TypeTag::ObjectAnalytics => {
            let expand = tag == TypeTag::ObjectJson && schema.expand_paths;
            NodeBody::Pairs(build_pairs(previous, expand, ids))
        }
        _ => NodeBody::Leaf,
    };

    // Strategy rule: a persisted string unambiguously means the user supplied
    // one value for the whole subtree. Anything else prefers parts when the
    // schema supports them. Persisted numbers and booleans are discarded;
    // there is no literal-constant editor for them outside boolean's own
    // control, so adopting them would create unreachable state.
    let (population_strategy, whole_value) = match previous {
        Some(Value::String(s)) => (PopulationStrategy::Whole, s.clone()),
        _ if is_parts_supported => (PopulationStrategy::Parts, String::new()),
        _ => (PopulationStrategy::Whole, String::new()),
    };

    FormStateNode {
        id,
        schema: Rc::clone(schema),
        tag,
        name: name.map(str::to_string),
        path: path.to_string(),
        population_strategy,
        whole_value,
        body,
        is_parts_supported,
        auto_population: policies.auto_population(path),
        is_always_disabled: policies.is_always_disabled(path),
        is_required,
        clear: false,
    }
}

/// Build a fresh, empty item for an array node.
///
/// Returns `None` when the array schema declares no item schema (parts mode
/// is unsupported there, so nothing can be pushed).
pub(crate) fn new_array_item(
    array_schema: &SchemaNode,
    array_path: &str,
    policies: &FieldPolicies,
    ids: &mut IdGenerator,
) -> Option<FormStateNode> {
    let item_schema = array_schema.items.as_ref()?;
    Some(build_node(
        item_schema, None, None, array_path, false, policies, ids,
    ))
}

fn parts_supported(schema: &SchemaNode, tag: TypeTag) -> bool {
    match tag {
        TypeTag::Object => schema
            .properties
            .as_ref()
            .is_some_and(|props| !props.is_empty()),
        TypeTag::Array => schema.items.is_some(),
        TypeTag::ObjectJson | TypeTag::ObjectAnalytics => true,
        _ => false,
    }
}

fn build_properties(
    schema: &SchemaNode,
    previous: Option<&Value>,
    path: &str,
    policies: &FieldPolicies,
    ids: &mut IdGenerator,
) -> indexmap::IndexMap<String, FormStateNode> {
    let Some(property_schemas) = &schema.properties else {
        return indexmap::IndexMap::new();
    };
    let previous_map = previous.and_then(Value::as_object);

    property_schemas
        .iter()
        .map(|(name, child_schema)| {
            let child_path = join_path(path, name);
            let child_previous = previous_map.and_then(|map| map.get(name));
            let child_required = child_schema.is_required || schema.requires_property(name);
            let child = build_node(
                child_schema,
                child_previous,
                Some(name),
                &child_path,
                child_required,
                policies,
                ids,
            );
            (name.clone(), child)
        })
        .collect()
}

fn build_items(
    schema: &SchemaNode,
    previous: Option<&Value>,
    path: &str,
    policies: &FieldPolicies,
    ids: &mut IdGenerator,
) -> Vec<FormStateNode> {
    let Some(item_schema) = &schema.items else {
        return Vec::new();
    };
    let Some(previous_items) = previous.and_then(Value::as_array) else {
        return Vec::new();
    };
    previous_items
        .iter()
        .map(|element| {
            // Array indices are omitted from policy paths, so items share
            // the parent's path.
            build_node(item_schema, Some(element), None, path, false, policies, ids)
        })
        .collect()
}

fn build_pairs(previous: Option<&Value>, expand: bool, ids: &mut IdGenerator) -> Vec<KeyValuePair> {
    let Some(previous_map) = previous.and_then(Value::as_object) else {
        // Start with one blank row so the editor has something to type into.
        return vec![KeyValuePair {
            id: ids.next_id(),
            key: String::new(),
            value: String::new(),
        }];
    };

    let mut pairs = Vec::new();
    if expand {
        for (key, value) in previous_map {
            flatten_into_pairs(key, value, &mut pairs, ids);
        }
    } else {
        for (key, value) in previous_map {
            pairs.push(KeyValuePair {
                id: ids.next_id(),
                key: key.clone(),
                value: pair_text(value),
            });
        }
    }
    if pairs.is_empty() {
        pairs.push(KeyValuePair {
            id: ids.next_id(),
            key: String::new(),
            value: String::new(),
        });
    }
    pairs
}

/// Flatten a nested value into dot/bracket keyed rows (`a.b[0].c`).
fn flatten_into_pairs(
    key: &str,
    value: &Value,
    pairs: &mut Vec<KeyValuePair>,
    ids: &mut IdGenerator,
) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (child_key, child) in map {
                flatten_into_pairs(&format!("{key}.{child_key}"), child, pairs, ids);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten_into_pairs(&format!("{key}[{index}]"), child, pairs, ids);
            }
        }
        Value::Object(_) | Value::Array(_) | Value::Null => {
            // Empty branches carry no information worth a row.
        }
        _ => pairs.push(KeyValuePair {
            id: ids.next_id(),
            key: key.to_string(),
            value: pair_text(value),
        }),
    }
}

/// Row text for a persisted value: strings verbatim, anything else as JSON.
fn pair_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn count_nodes(node: &FormStateNode) -> usize {
    1 + match &node.body {
        NodeBody::Properties(properties) => properties.values().map(count_nodes).sum(),
        NodeBody::Items(items) => items.iter().map(count_nodes).sum(),
        NodeBody::Pairs(pairs) => pairs.len(),
        NodeBody::Leaf => 0,
    }
}
