//! Structural edit operations on a form-state tree.
//!
//! The renderer is the sole mutator of a tree, and everything it can do is
//! one of the operations here: set a whole value, switch population
//! strategy, push or remove an array item, edit a key/value row, toggle the
//! clear transform. All operations address nodes by id.

use thiserror::Error;

use crate::classify::TypeTag;
use crate::policy::FieldPolicies;
use crate::state::build::new_array_item;
use crate::state::node::{
    FormStateNode, IdGenerator, KeyValuePair, NodeBody, NodeId, PopulationStrategy,
};

/// Errors raised by edit operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// No node with this id exists in the tree.
    #[error("no node with id {0}")]
    UnknownNode(NodeId),

    /// The target path may never be edited.
    #[error("node {0} is always disabled and cannot be edited")]
    Disabled(NodeId),

    /// Parts strategy was requested but the schema declares no structure.
    #[error("node {0} does not support part-by-part editing")]
    PartsUnsupported(NodeId),

    /// The operation does not apply to this node type.
    #[error("{operation} does not apply to a {tag:?} node ({id})")]
    NotApplicable {
        /// Target node.
        id: NodeId,
        /// Operation name for the message.
        operation: &'static str,
        /// The node's classified type.
        tag: TypeTag,
    },

    /// An item or pair index is out of range.
    #[error("index {index} out of range for node {id} (len {len})")]
    IndexOutOfRange {
        /// Target node.
        id: NodeId,
        /// Requested index.
        index: usize,
        /// Current item count.
        len: usize,
    },
}

/// Find a node by id anywhere in the tree.
pub fn node_by_id(root: &FormStateNode, id: NodeId) -> Option<&FormStateNode> {
    if root.id == id {
        return Some(root);
    }
    match &root.body {
        NodeBody::Properties(properties) => {
            properties.values().find_map(|c| node_by_id(c, id))
        }
        NodeBody::Items(items) => items.iter().find_map(|c| node_by_id(c, id)),
        _ => None,
    }
}

fn node_mut_by_id(root: &mut FormStateNode, id: NodeId) -> Option<&mut FormStateNode> {
    if root.id == id {
        return Some(root);
    }
    match &mut root.body {
        NodeBody::Properties(properties) => {
            properties.values_mut().find_map(|c| node_mut_by_id(c, id))
        }
        NodeBody::Items(items) => items.iter_mut().find_map(|c| node_mut_by_id(c, id)),
        _ => None,
    }
}

fn editable_node_mut(
    root: &mut FormStateNode,
    id: NodeId,
) -> Result<&mut FormStateNode, EditError> {
    let node = node_mut_by_id(root, id).ok_or(EditError::UnknownNode(id))?;
    if node.is_always_disabled {
        return Err(EditError::Disabled(id));
    }
    Ok(node)
}

/// Set the whole-mode value of a node.
pub fn set_whole_value(
    root: &mut FormStateNode,
    id: NodeId,
    value: &str,
) -> Result<(), EditError> {
    let node = editable_node_mut(root, id)?;
    node.whole_value = value.to_string();
    Ok(())
}

/// Switch a node's population strategy.
///
/// The whole value and the parts structure both survive the switch, so
/// toggling back restores exactly what was entered before.
pub fn set_population_strategy(
    root: &mut FormStateNode,
    id: NodeId,
    strategy: PopulationStrategy,
) -> Result<(), EditError> {
    let node = editable_node_mut(root, id)?;
    if strategy == PopulationStrategy::Parts && !node.is_parts_supported {
        return Err(EditError::PartsUnsupported(id));
    }
    node.population_strategy = strategy;
    Ok(())
}

/// Append a new item to an array node, or a blank row to a pairs node.
///
/// Returns the id of the created item.
pub fn push_item(
    root: &mut FormStateNode,
    id: NodeId,
    policies: &FieldPolicies,
    ids: &mut IdGenerator,
) -> Result<NodeId, EditError> {
    let node = editable_node_mut(root, id)?;
    match &node.body {
        NodeBody::Items(_) => {
            let item = new_array_item(&node.schema, &node.path, policies, ids)
                .ok_or(EditError::PartsUnsupported(id))?;
            let item_id = item.id;
            if let NodeBody::Items(items) = &mut node.body {
                items.push(item);
            }
            Ok(item_id)
        }
        NodeBody::Pairs(_) => {
            let pair_id = ids.next_id();
            if let NodeBody::Pairs(pairs) = &mut node.body {
                pairs.push(KeyValuePair {
                    id: pair_id,
                    key: String::new(),
                    value: String::new(),
                });
            }
            Ok(pair_id)
        }
        _ => Err(EditError::NotApplicable {
            id,
            operation: "push_item",
            tag: node.tag,
        }),
    }
}

/// Remove the item or pair at `index`.
pub fn remove_item(root: &mut FormStateNode, id: NodeId, index: usize) -> Result<(), EditError> {
    let node = editable_node_mut(root, id)?;
    match &mut node.body {
        NodeBody::Items(items) => {
            if index >= items.len() {
                return Err(EditError::IndexOutOfRange {
                    id,
                    index,
                    len: items.len(),
                });
            }
            items.remove(index);
            Ok(())
        }
        NodeBody::Pairs(pairs) => {
            if index >= pairs.len() {
                return Err(EditError::IndexOutOfRange {
                    id,
                    index,
                    len: pairs.len(),
                });
            }
            pairs.remove(index);
            Ok(())
        }
        _ => Err(EditError::NotApplicable {
            id,
            operation: "remove_item",
            tag: node.tag,
        }),
    }
}

/// Set the key of a key/value row.
pub fn set_pair_key(
    root: &mut FormStateNode,
    id: NodeId,
    index: usize,
    key: &str,
) -> Result<(), EditError> {
    with_pair(root, id, index, |pair| pair.key = key.to_string())
}

/// Set the value of a key/value row.
pub fn set_pair_value(
    root: &mut FormStateNode,
    id: NodeId,
    index: usize,
    value: &str,
) -> Result<(), EditError> {
    with_pair(root, id, index, |pair| pair.value = value.to_string())
}

fn with_pair(
    root: &mut FormStateNode,
    id: NodeId,
    index: usize,
    apply: impl FnOnce(&mut KeyValuePair),
) -> Result<(), EditError> {
    let node = editable_node_mut(root, id)?;
    let tag = node.tag;
    match &mut node.body {
        NodeBody::Pairs(pairs) => {
            let len = pairs.len();
            let pair = pairs
                .get_mut(index)
                .ok_or(EditError::IndexOutOfRange { id, index, len })?;
            apply(pair);
            Ok(())
        }
        _ => Err(EditError::NotApplicable {
            id,
            operation: "edit_pair",
            tag,
        }),
    }
}

/// Mark or unmark a subtree for deletion before new values are applied.
pub fn set_clear(root: &mut FormStateNode, id: NodeId, clear: bool) -> Result<(), EditError> {
    let node = node_mut_by_id(root, id).ok_or(EditError::UnknownNode(id))?;
    node.clear = clear;
    Ok(())
}
