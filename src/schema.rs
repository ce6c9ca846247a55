//! JSON Schema parsing for the form-state engine.
//!
//! The engine consumes a JSON-Schema-like document supplied by an external
//! schema provider. Only the subset the editor cares about is retained:
//! `type`, `properties`, `items`, `enum`, titles and descriptions, required
//! markers, and the `expandPaths` extension flag. Unknown keywords are
//! ignored so that vendor schemas with extra metadata still load.

use std::rc::Rc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while turning a JSON document into a [`SchemaNode`] tree.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document is not valid JSON.
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but is not an object at the top level.
    #[error("schema root must be an object, got {actual}")]
    RootNotObject {
        /// Short description of what was found instead.
        actual: String,
    },
}

/// One node of the schema tree.
///
/// Recursive: `properties` maps property name to child schema, `items` holds
/// the element schema of an array. Property order is schema-declared order,
/// preserved by [`IndexMap`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaNode {
    /// Declared `type` keyword, when present. Extension tags `object/json`
    /// and `object/analytics` are recognized alongside the standard types.
    #[serde(rename = "type")]
    pub type_name: Option<String>,

    /// Child schemas of an object node, in schema-declared order.
    pub properties: Option<IndexMap<String, Rc<SchemaNode>>>,

    /// Element schema of an array node.
    pub items: Option<Rc<SchemaNode>>,

    /// Enum options. Presence makes the node an enum regardless of `type`.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,

    /// Human-readable title.
    pub title: Option<String>,

    /// Human-readable description.
    pub description: Option<String>,

    /// Standard JSON Schema required list; resolved onto child nodes when
    /// the form state is built.
    pub required: Vec<String>,

    /// Pre-resolved required marker on the node itself.
    #[serde(rename = "isRequired")]
    pub is_required: bool,

    /// Whether key/value pair keys of a JSON object editor are expanded as
    /// dot/bracket paths when serializing. Defaults to true.
    #[serde(rename = "expandPaths")]
    pub expand_paths: bool,
}

impl Default for SchemaNode {
    fn default() -> Self {
        SchemaNode {
            type_name: None,
            properties: None,
            items: None,
            enum_values: None,
            title: None,
            description: None,
            required: Vec::new(),
            is_required: false,
            expand_paths: true,
        }
    }
}

impl SchemaNode {
    /// Parse a schema from an in-memory JSON value.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        if !value.is_object() {
            return Err(SchemaError::RootNotObject {
                actual: json_kind(value).to_string(),
            });
        }
        Ok(SchemaNode::deserialize(value)?)
    }

    /// Parse a schema from JSON text.
    pub fn from_str(s: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(&value)
    }

    /// Enum options rendered as display strings.
    ///
    /// Non-string options (numbers, booleans) are stringified; null and
    /// structured options are skipped.
    pub fn enum_options(&self) -> Vec<String> {
        let Some(values) = &self.enum_values else {
            return Vec::new();
        };
        values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Whether `name` appears in this node's `required` list.
    pub fn requires_property(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Short description of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_object_schema() {
        let schema = SchemaNode::from_value(&json!({
            "type": "object",
            "title": "Root",
            "required": ["vendor"],
            "properties": {
                "vendor": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" }
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(schema.type_name.as_deref(), Some("object"));
        assert!(schema.requires_property("vendor"));
        let vendor = &schema.properties.as_ref().unwrap()["vendor"];
        assert!(vendor.properties.as_ref().unwrap().contains_key("name"));
    }

    #[test]
    fn property_order_is_declaration_order() {
        let schema = SchemaNode::from_str(
            r#"{"type":"object","properties":{"b":{},"a":{},"c":{}}}"#,
        )
        .unwrap();
        let names: Vec<&String> = schema.properties.as_ref().unwrap().keys().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn expand_paths_defaults_to_true() {
        let schema = SchemaNode::from_value(&json!({ "type": "object/json" })).unwrap();
        assert!(schema.expand_paths);

        let schema =
            SchemaNode::from_value(&json!({ "type": "object/json", "expandPaths": false }))
                .unwrap();
        assert!(!schema.expand_paths);
    }

    #[test]
    fn rejects_non_object_root() {
        let err = SchemaNode::from_value(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, SchemaError::RootNotObject { .. }));
    }

    #[test]
    fn unknown_keywords_are_ignored() {
        let schema = SchemaNode::from_value(&json!({
            "type": "string",
            "meta:xdmType": "string",
            "$id": "https://example.com/schema"
        }))
        .unwrap();
        assert_eq!(schema.type_name.as_deref(), Some("string"));
    }

    #[test]
    fn enum_options_stringify_scalars() {
        let schema = SchemaNode::from_value(&json!({
            "enum": ["a", 2, true, null, {"x": 1}]
        }))
        .unwrap();
        assert_eq!(schema.enum_options(), vec!["a", "2", "true"]);
    }
}
