//! Schema type classification.
//!
//! Maps a schema node to the closed set of editor types. Every downstream
//! walk (factory, projector, validator, serializer) matches exhaustively on
//! [`TypeTag`], so adding a tag surfaces every site that needs updating.

use serde::{Deserialize, Serialize};

use crate::schema::SchemaNode;

/// Logical kind of a schema node, as seen by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeTag {
    /// Object with individually edited properties.
    Object,
    /// Array of items sharing one element schema.
    Array,
    /// Boolean leaf.
    Boolean,
    /// Integer leaf.
    Integer,
    /// Floating-point leaf.
    Number,
    /// Free-form JSON object edited as key/value pairs.
    ObjectJson,
    /// Analytics configuration object edited as flat key/value pairs.
    ObjectAnalytics,
    /// String restricted to enum options.
    StringEnum,
    /// Plain string leaf. Also the fallback for unknown types.
    String,
}

impl TypeTag {
    /// Whether this tag carries child structure in parts mode.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            TypeTag::Object | TypeTag::Array | TypeTag::ObjectJson | TypeTag::ObjectAnalytics
        )
    }
}

/// Classify a schema node.
///
/// An `enum` keyword wins over the declared `type`; unknown or absent types
/// fall back to [`TypeTag::String`]. Total: never fails, never panics.
pub fn classify(schema: &SchemaNode) -> TypeTag {
    if schema.enum_values.is_some() {
        return TypeTag::StringEnum;
    }
    match schema.type_name.as_deref() {
        Some("object") => TypeTag::Object,
        Some("array") => TypeTag::Array,
        Some("boolean") => TypeTag::Boolean,
        Some("integer") => TypeTag::Integer,
        Some("number") => TypeTag::Number,
        Some("object/json") => TypeTag::ObjectJson,
        Some("object/analytics") => TypeTag::ObjectAnalytics,
        _ => TypeTag::String,
    }
}
