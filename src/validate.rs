//! Recursive form-state validation.
//!
//! Validation produces data, never exceptions: the result is an error tree
//! mirroring the form-state shape, or `None` when the whole tree is clean.
//! The renderer decides when to show an error (typically only once the
//! corresponding field has been touched).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::classify::TypeTag;
use crate::schema::SchemaNode;
use crate::state::node::{FormStateNode, NodeBody};

/// A side-channel tree mirroring form-state shape.
///
/// Used for validation errors (`MetaTree<String>`) and touched flags
/// (`MetaTree<bool>`). `value` annotates the node itself; `properties` and
/// `items` mirror the node's children. The shared shape keeps the recursive
/// correspondence between form state and its side channels explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTree<T> {
    /// Annotation on the node's own value field.
    pub value: Option<T>,
    /// Annotations on object properties, by name.
    pub properties: BTreeMap<String, MetaTree<T>>,
    /// Annotations on array items or key/value rows, by index.
    pub items: Vec<Option<MetaTree<T>>>,
}

impl<T> Default for MetaTree<T> {
    fn default() -> Self {
        MetaTree {
            value: None,
            properties: BTreeMap::new(),
            items: Vec::new(),
        }
    }
}

/// Validation errors keyed like form state.
pub type ErrorTree = MetaTree<String>;

/// Touched flags keyed like form state.
pub type TouchedTree = MetaTree<bool>;

impl<T> MetaTree<T> {
    /// A tree annotating only the node itself.
    pub fn leaf(value: T) -> Self {
        MetaTree {
            value: Some(value),
            ..MetaTree::default()
        }
    }

    /// Whether the tree carries no annotations at all.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.properties.values().all(MetaTree::is_empty)
            && self.items.iter().flatten().all(MetaTree::is_empty)
    }

    /// Annotation subtree for a property, when present.
    pub fn property(&self, name: &str) -> Option<&MetaTree<T>> {
        self.properties.get(name)
    }

    /// Annotation subtree for an item index, when present.
    pub fn item(&self, index: usize) -> Option<&MetaTree<T>> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// Store an item annotation, growing the list with empty slots.
    pub fn set_item(&mut self, index: usize, tree: MetaTree<T>) {
        if self.items.len() <= index {
            self.items.resize_with(index + 1, || None);
        }
        self.items[index] = Some(tree);
    }

    /// Drop the tree entirely when it annotates nothing.
    pub fn prune(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

static SINGLE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^%([^%]+)%$").expect("token pattern"));

/// Whether the string is exactly one data element token (`%name%`) with no
/// surrounding text.
pub fn is_single_data_element_token(s: &str) -> bool {
    SINGLE_TOKEN.is_match(s)
}

const MSG_REQUIRED: &str = "This is a required field and must be populated.";
const MSG_SINGLE_TOKEN: &str =
    "Please enter a single data element (for example, %my data element%).";
const MSG_JSON_OR_TOKEN: &str = "Please enter valid JSON or a single data element.";
const MSG_NUMBER: &str = "Please enter a number or a data element.";
const MSG_INTEGER: &str = "Please enter an integer or a data element.";
const MSG_BOOLEAN: &str = "Please enter true, false, or a data element.";
const MSG_ENUM: &str = "Please select a listed option or enter a data element.";
const MSG_EMPTY_ITEM: &str = "Items must not be empty. Populate or remove them.";
const MSG_PAIR_KEY: &str = "Please provide a key name.";

/// Validate a form-state tree.
///
/// Returns `None` when nothing in the subtree is in error. Total: never
/// panics for any tree built by this crate.
pub fn validate(root: &FormStateNode) -> Option<ErrorTree> {
    validate_node(root, true).prune()
}

fn validate_node(node: &FormStateNode, is_root: bool) -> ErrorTree {
    let mut out = ErrorTree::default();

    // Always-auto-populated nodes are the SDK's responsibility: they count
    // as satisfied and can never themselves be in error.
    if node.auto_population == crate::policy::AutoPopulationSource::Always {
        return out;
    }

    if node.is_whole() {
        let value = node.whole_value.trim();
        if value.is_empty() {
            if is_root && node.is_required {
                out.value = Some(MSG_REQUIRED.to_string());
            }
        } else if let Some(message) = whole_value_error(node.tag, value, &node.schema) {
            out.value = Some(message);
        }
        return out;
    }

    match &node.body {
        NodeBody::Properties(properties) => {
            // Required-ness is conditional on the object being non-empty in
            // the final payload: an all-empty object is omitted outright, so
            // nothing in it can be missing.
            let any_populated = properties.values().any(|c| c.is_populated());
            for (name, child) in properties {
                let mut child_tree = validate_node(child, false);
                if any_populated
                    && child.is_required
                    && !child.auto_population.is_auto_populated()
                    && !child.is_populated()
                {
                    child_tree.value = Some(MSG_REQUIRED.to_string());
                }
                if !child_tree.is_empty() {
                    out.properties.insert(name.clone(), child_tree);
                }
            }
        }
        NodeBody::Items(items) => {
            for (index, child) in items.iter().enumerate() {
                let mut child_tree = validate_node(child, false);
                // Arrays may not carry intentionally-empty slots.
                if !child.is_populated() && !child.auto_population.is_auto_populated() {
                    child_tree.value = Some(MSG_EMPTY_ITEM.to_string());
                }
                if !child_tree.is_empty() {
                    out.set_item(index, child_tree);
                }
            }
        }
        NodeBody::Pairs(pairs) => {
            for (index, pair) in pairs.iter().enumerate() {
                if pair.key.trim().is_empty() && !pair.value.trim().is_empty() {
                    out.set_item(index, ErrorTree::leaf(MSG_PAIR_KEY.to_string()));
                }
            }
        }
        NodeBody::Leaf => {}
    }

    if is_root && node.is_required && !node.is_populated() {
        out.value = Some(MSG_REQUIRED.to_string());
    }
    out
}

/// Type-specific check of a populated whole value. `None` means acceptable.
fn whole_value_error(tag: TypeTag, value: &str, schema: &SchemaNode) -> Option<String> {
    if is_single_data_element_token(value) {
        return None;
    }
    match tag {
        // The generic object editor only takes one token for the subtree;
        // raw JSON is reserved for the JSON editor variant below.
        TypeTag::Object | TypeTag::Array | TypeTag::ObjectAnalytics => {
            Some(MSG_SINGLE_TOKEN.to_string())
        }
        TypeTag::ObjectJson => match serde_json::from_str::<serde_json::Value>(value) {
            Ok(_) => None,
            Err(_) => Some(MSG_JSON_OR_TOKEN.to_string()),
        },
        TypeTag::Number => match value.parse::<f64>() {
            Ok(n) if n.is_finite() => None,
            _ => Some(MSG_NUMBER.to_string()),
        },
        TypeTag::Integer => match value.parse::<i64>() {
            Ok(_) => None,
            Err(_) => Some(MSG_INTEGER.to_string()),
        },
        TypeTag::Boolean => match value {
            "true" | "false" => None,
            _ => Some(MSG_BOOLEAN.to_string()),
        },
        TypeTag::StringEnum => {
            if schema.enum_options().iter().any(|o| o == value) {
                None
            } else {
                Some(MSG_ENUM.to_string())
            }
        }
        TypeTag::String => None,
    }
}
