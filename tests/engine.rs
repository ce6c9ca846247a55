//! End-to-end properties of the form-state engine, exercised through the
//! public `FormEditor` surface.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use xdmform::{
    FieldPolicies, FormEditor, MetaTree, NodeId, PopulationAmount, PopulationStrategy,
    TouchedTree,
};

fn editor_for(schema: Value, previous: Option<Value>) -> FormEditor {
    FormEditor::new(&schema, previous.as_ref(), FieldPolicies::empty()).unwrap()
}

fn property_id(editor: &FormEditor, name: &str) -> NodeId {
    editor
        .root()
        .properties()
        .find(|(n, _)| *n == name)
        .unwrap_or_else(|| panic!("no property {name}"))
        .1
        .id
}

#[test]
fn serialization_round_trips_through_a_rebuild() {
    let schema = json!({
        "type": "object",
        "properties": {
            "vendor": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "site": { "type": "string" }
                }
            },
            "tags": { "type": "array", "items": { "type": "string" } },
            "data": { "type": "object/json" }
        }
    });

    let mut editor = editor_for(schema.clone(), None);
    let vendor_id = property_id(&editor, "vendor");
    let name_id = {
        let vendor = editor.node(vendor_id).unwrap();
        vendor.properties().next().unwrap().1.id
    };
    editor.set_whole_value(name_id, "Adobe").unwrap();
    let tags_id = property_id(&editor, "tags");
    let item = editor.push_item(tags_id).unwrap();
    editor.set_whole_value(item, "%tag%").unwrap();
    let data_id = property_id(&editor, "data");
    editor.set_pair_key(data_id, 0, "a.b[0]").unwrap();
    editor.set_pair_value(data_id, 0, "7").unwrap();

    let first = editor.value().unwrap();
    let rebuilt = editor_for(schema, Some(first.clone()));
    assert_eq!(rebuilt.value(), Some(first));
}

#[test]
fn nothing_populated_serializes_to_absence() {
    let editor = editor_for(
        json!({
            "type": "object",
            "properties": {
                "empty": {
                    "type": "object",
                    "properties": { "leaf": { "type": "string" } }
                }
            }
        }),
        None,
    );
    assert_eq!(editor.value(), None);
}

#[test]
fn strategy_switch_round_trip_preserves_entered_text() {
    let mut editor = editor_for(
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
    let vendor_id = property_id(&editor, "vendor");
    editor
        .set_population_strategy(vendor_id, PopulationStrategy::Whole)
        .unwrap();
    editor.set_whole_value(vendor_id, "%vendor%").unwrap();
    editor
        .set_population_strategy(vendor_id, PopulationStrategy::Parts)
        .unwrap();
    editor
        .set_population_strategy(vendor_id, PopulationStrategy::Whole)
        .unwrap();
    assert_eq!(editor.node(vendor_id).unwrap().whole_value, "%vendor%");
}

#[test]
fn required_fields_error_only_inside_populated_objects() {
    let schema = json!({
        "type": "object",
        "required": ["a"],
        "properties": {
            "a": { "type": "string" },
            "b": { "type": "string" }
        }
    });

    let editor = editor_for(schema.clone(), Some(json!({ "b": "populated" })));
    let errors = editor.validate().unwrap();
    assert!(errors.property("a").unwrap().value.is_some());

    let editor = editor_for(schema, None);
    assert!(editor.validate().is_none());
}

#[test]
fn arrays_reject_empty_items_but_vanish_when_empty() {
    let schema = json!({
        "type": "array",
        "items": { "type": "string" }
    });

    let mut editor = editor_for(schema.clone(), None);
    let root_id = editor.root().id;
    editor.push_item(root_id).unwrap();
    assert!(editor.validate().is_some());

    editor.remove_item(root_id, 0).unwrap();
    assert!(editor.validate().is_none());
    assert_eq!(editor.value(), None);
}

#[test]
fn tree_view_orders_properties_number_aware() {
    let editor = editor_for(
        json!({
            "type": "object",
            "properties": {
                "item10": { "type": "string" },
                "item1": { "type": "string" },
                "item2": { "type": "string" }
            }
        }),
        None,
    );
    let view = editor.project(None, None);
    let names: Vec<&str> = view.children.iter().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, vec!["item1", "item2", "item10"]);
}

#[test]
fn whole_ancestor_makes_descendants_inert_everywhere() {
    let mut editor = editor_for(
        json!({
            "type": "object",
            "properties": {
                "vendor": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "rating": { "type": "integer" }
                    }
                }
            }
        }),
        Some(json!({ "vendor": { "rating": "not an integer" } })),
    );

    // Parts mode: the bad literal and the missing required field both error.
    assert!(editor.validate().is_some());

    let vendor_id = property_id(&editor, "vendor");
    editor
        .set_population_strategy(vendor_id, PopulationStrategy::Whole)
        .unwrap();
    editor.set_whole_value(vendor_id, "%vendor%").unwrap();

    // Validation and serialization now use only the whole value.
    assert!(editor.validate().is_none());
    assert_eq!(editor.value(), Some(json!({ "vendor": "%vendor%" })));

    // Projection blanks and disables everything underneath.
    let view = editor.project(None, None);
    let vendor_view = &view.children[0];
    assert_eq!(vendor_view.population_amount, PopulationAmount::Full);
    for child in &vendor_view.children {
        assert_eq!(child.population_amount, PopulationAmount::Blank);
        assert!(child.disabled);
        assert!(child.info_tip.is_none());
    }
}

#[test]
fn vendor_name_scenario_from_empty_to_whole() {
    let mut editor = editor_for(
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

    let vendor_id = property_id(&editor, "vendor");
    let name_id = {
        let vendor = editor.node(vendor_id).unwrap();
        let name = vendor.properties().next().unwrap().1;
        assert!(name.is_whole());
        assert!(name.whole_value.is_empty());
        name.id
    };
    assert_eq!(
        editor.root().population_strategy,
        PopulationStrategy::Parts
    );

    editor.set_whole_value(name_id, "Adobe").unwrap();
    assert_eq!(editor.value(), Some(json!({ "vendor": { "name": "Adobe" } })));

    editor
        .set_population_strategy(vendor_id, PopulationStrategy::Whole)
        .unwrap();
    editor.set_whole_value(vendor_id, "%vendor%").unwrap();
    assert_eq!(editor.value(), Some(json!({ "vendor": "%vendor%" })));

    // The previously entered name survives in form state.
    assert_eq!(
        editor
            .node(vendor_id)
            .unwrap()
            .properties()
            .next()
            .unwrap()
            .1
            .whole_value,
        "Adobe"
    );
}

#[test]
fn touched_errors_flag_the_path_for_auto_expand() {
    let editor = editor_for(
        json!({
            "type": "object",
            "properties": {
                "vendor": {
                    "type": "object",
                    "properties": { "rating": { "type": "integer" } }
                }
            }
        }),
        Some(json!({ "vendor": { "rating": "bad" } })),
    );
    let errors = editor.validate().unwrap();

    let untouched = editor.project(Some(&errors), None);
    assert!(!untouched.contains_touched_error);

    let mut rating_touched = TouchedTree::default();
    let mut vendor_touched = TouchedTree::default();
    vendor_touched
        .properties
        .insert("rating".to_string(), MetaTree::leaf(true));
    rating_touched
        .properties
        .insert("vendor".to_string(), vendor_touched);

    let view = editor.project(Some(&errors), Some(&rating_touched));
    assert!(view.contains_touched_error);
    assert!(view.children[0].contains_touched_error);
    assert!(view.children[0].children[0].error.is_some());
}

#[test]
fn analytics_objects_serialize_flat_key_value_rows() {
    let schema = json!({
        "type": "object",
        "properties": { "analytics": { "type": "object/analytics" } }
    });

    // A previous object becomes flat rows, never expanded paths.
    let editor = editor_for(
        schema.clone(),
        Some(json!({ "analytics": { "eVar1": "value1", "prop5": "%p%" } })),
    );
    let analytics_id = property_id(&editor, "analytics");
    let keys: Vec<String> = editor
        .node(analytics_id)
        .unwrap()
        .pairs()
        .iter()
        .map(|p| p.key.clone())
        .collect();
    assert_eq!(keys, vec!["eVar1", "prop5"]);
    assert_eq!(
        editor.value(),
        Some(json!({ "analytics": { "eVar1": "value1", "prop5": "%p%" } }))
    );

    // Dotted keys stay literal map keys.
    let mut editor = editor_for(schema, None);
    let analytics_id = property_id(&editor, "analytics");
    editor.set_pair_key(analytics_id, 0, "page.name").unwrap();
    editor.set_pair_value(analytics_id, 0, "home").unwrap();
    assert_eq!(
        editor.value(),
        Some(json!({ "analytics": { "page.name": "home" } }))
    );
}

#[test]
fn analytics_whole_mode_takes_only_a_single_token() {
    let schema = json!({
        "type": "object",
        "properties": { "analytics": { "type": "object/analytics" } }
    });
    let mut editor = editor_for(schema, None);
    let analytics_id = property_id(&editor, "analytics");
    editor
        .set_population_strategy(analytics_id, PopulationStrategy::Whole)
        .unwrap();

    // Raw JSON is the JSON editor's privilege; here it is rejected.
    editor
        .set_whole_value(analytics_id, r#"{"eVar1": "x"}"#)
        .unwrap();
    let errors = editor.validate().unwrap();
    assert!(errors.property("analytics").unwrap().value.is_some());

    editor.set_whole_value(analytics_id, "%analytics%").unwrap();
    assert!(editor.validate().is_none());
}

#[test]
fn auto_populated_and_disabled_policies_flow_to_the_view() {
    let editor = FormEditor::new(
        &json!({
            "type": "object",
            "properties": {
                "_id": { "type": "string" },
                "eventType": { "type": "string" },
                "custom": { "type": "string" }
            }
        }),
        None,
        FieldPolicies::xdm_defaults(),
    )
    .unwrap();

    let view = editor.project(None, None);
    let child = |name: &str| {
        view.children
            .iter()
            .find(|c| c.display_name == name)
            .unwrap()
    };
    assert!(child("_id").disabled);
    assert_eq!(child("_id").population_amount, PopulationAmount::Full);
    assert!(child("eventType").info_tip.is_some());
    assert!(!child("custom").disabled);
    assert!(child("custom").info_tip.is_none());
}
