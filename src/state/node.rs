//! Form-state tree nodes.
//!
//! One [`FormStateNode`] exists per schema node the user can edit. Nodes are
//! mutable within a tree's lifetime, identified by process-unique ids, and
//! carry both population strategies side by side so switching between them
//! never discards input.

use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classify::TypeTag;
use crate::policy::AutoPopulationSource;
use crate::schema::SchemaNode;

/// Stable identity of a form-state node.
///
/// Ids are generated once at node creation and never reused within a tree.
/// They are the only stable key: array indices shift as items come and go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Monotonic id source, owned by the editor and threaded through builds.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// A generator starting at zero.
    pub fn new() -> Self {
        IdGenerator::default()
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// How the user populates a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PopulationStrategy {
    /// One value (typically a data element token) covers the whole subtree.
    Whole,
    /// The subtree is edited field by field.
    Parts,
}

/// One key/value row of a JSON object editor.
#[derive(Debug, Clone)]
pub struct KeyValuePair {
    /// Stable identity, same scheme as node ids.
    pub id: NodeId,
    /// Target path or flat key, depending on `expandPaths`.
    pub key: String,
    /// Raw value text; data element tokens and JSON literals both allowed.
    pub value: String,
}

impl KeyValuePair {
    /// A pair counts as populated once it has a key.
    pub fn is_populated(&self) -> bool {
        !self.key.trim().is_empty()
    }
}

/// Type-specific sub-state of a node.
#[derive(Debug, Clone)]
pub enum NodeBody {
    /// Scalar leaf; the value lives in `whole_value`.
    Leaf,
    /// Object properties, fixed for the schema's lifetime.
    Properties(IndexMap<String, FormStateNode>),
    /// Array items, created and removed by the user.
    Items(Vec<FormStateNode>),
    /// Key/value rows of a JSON or analytics object editor.
    Pairs(Vec<KeyValuePair>),
}

/// One editable unit of the configuration.
#[derive(Debug, Clone)]
pub struct FormStateNode {
    /// Process-unique id, stable across renders.
    pub id: NodeId,
    /// Schema node that produced this node.
    pub schema: Rc<SchemaNode>,
    /// Classified editor type.
    pub tag: TypeTag,
    /// Property name within the parent object, when there is one.
    pub name: Option<String>,
    /// Index-stripped dot path, the key into the field policy tables.
    pub path: String,
    /// Active population strategy. Scalar leaves are whole in effect.
    pub population_strategy: PopulationStrategy,
    /// Raw text entered in whole mode. Preserved across strategy switches.
    pub whole_value: String,
    /// Type-specific sub-state for parts mode.
    pub body: NodeBody,
    /// Whether the schema declares child structure to edit part by part.
    pub is_parts_supported: bool,
    /// Auto-population classification from the injected policy tables.
    pub auto_population: AutoPopulationSource,
    /// Whether the policy tables forbid editing this path outright.
    pub is_always_disabled: bool,
    /// Whether this node must end up populated.
    pub is_required: bool,
    /// Clear-transform marker, meaningful in update-existing-value mode.
    pub clear: bool,
}

impl FormStateNode {
    /// Whether the node behaves as whole-value for editing purposes.
    ///
    /// Scalar leaves are always whole in effect, whatever the stored
    /// strategy says.
    pub fn is_whole(&self) -> bool {
        !self.tag.is_structured() || self.population_strategy == PopulationStrategy::Whole
    }

    /// Whether this subtree currently carries user-supplied (or guaranteed
    /// SDK-supplied) data.
    ///
    /// Computed once per node per walk; parents consume the child result
    /// rather than re-deriving it, so bookkeeping cannot double-count.
    pub fn is_populated(&self) -> bool {
        if self.auto_population == AutoPopulationSource::Always {
            return true;
        }
        if self.is_whole() {
            return !self.whole_value.trim().is_empty();
        }
        match &self.body {
            NodeBody::Leaf => !self.whole_value.trim().is_empty(),
            NodeBody::Properties(properties) => properties.values().any(|c| c.is_populated()),
            NodeBody::Items(items) => items.iter().any(|c| c.is_populated()),
            NodeBody::Pairs(pairs) => pairs.iter().any(|p| p.is_populated()),
        }
    }

    /// Display label: schema title, else property name, else a 1-based
    /// `Item N` fallback supplied by the parent for array items.
    pub fn label(&self, item_index: Option<usize>) -> String {
        if let Some(title) = &self.schema.title
            && !title.is_empty()
        {
            return title.clone();
        }
        if let Some(name) = &self.name {
            return name.clone();
        }
        match item_index {
            Some(i) => format!("Item {}", i + 1),
            None => self.tag_label().to_string(),
        }
    }

    fn tag_label(&self) -> &'static str {
        match self.tag {
            TypeTag::Object | TypeTag::ObjectJson | TypeTag::ObjectAnalytics => "Object",
            TypeTag::Array => "Array",
            TypeTag::Boolean => "Boolean",
            TypeTag::Integer => "Integer",
            TypeTag::Number => "Number",
            TypeTag::StringEnum | TypeTag::String => "String",
        }
    }

    /// Iterate object properties, or nothing for other bodies.
    pub fn properties(&self) -> impl Iterator<Item = (&String, &FormStateNode)> {
        match &self.body {
            NodeBody::Properties(properties) => Some(properties.iter()),
            _ => None,
        }
        .into_iter()
        .flatten()
    }

    /// Array items, or an empty slice for other bodies.
    pub fn items(&self) -> &[FormStateNode] {
        match &self.body {
            NodeBody::Items(items) => items,
            _ => &[],
        }
    }

    /// Key/value pairs, or an empty slice for other bodies.
    pub fn pairs(&self) -> &[KeyValuePair] {
        match &self.body {
            NodeBody::Pairs(pairs) => pairs,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_generator_is_monotonic() {
        let mut ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
        assert_ne!(a, b);
    }

    #[test]
    fn pair_population_requires_a_key() {
        let pair = KeyValuePair {
            id: NodeId(0),
            key: "  ".to_string(),
            value: "something".to_string(),
        };
        assert!(!pair.is_populated());

        let pair = KeyValuePair {
            id: NodeId(1),
            key: "a.b".to_string(),
            value: String::new(),
        };
        assert!(pair.is_populated());
    }
}
