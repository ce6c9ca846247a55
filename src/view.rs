//! Projection of form state into a renderer-facing tree view.
//!
//! The projector is pure: it reads form state plus the error and touched
//! side channels and produces a fresh [`TreeViewNode`] tree. Nothing in form
//! state is mutated, so the renderer can project on every update cycle.

use serde::{Deserialize, Serialize};

use crate::classify::TypeTag;
use crate::order::compare_names;
use crate::policy::AutoPopulationSource;
use crate::state::node::{FormStateNode, NodeBody, NodeId};
use crate::validate::{ErrorTree, TouchedTree};

/// How much of a subtree currently carries user-supplied data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PopulationAmount {
    /// Inert: an ancestor's whole value supersedes this subtree.
    Blank,
    /// Nothing populated.
    Empty,
    /// Some but not all of the subtree populated.
    Partial,
    /// Everything relevant populated.
    Full,
}

/// One node of the rendered tree.
#[derive(Debug, Clone)]
pub struct TreeViewNode {
    /// Stable identity, taken from the form-state node (or pair row).
    pub id: NodeId,
    /// Label shown in the tree.
    pub display_name: String,
    /// Classified editor type.
    pub tag: TypeTag,
    /// Population indicator.
    pub population_amount: PopulationAmount,
    /// Whether the node may not be edited.
    pub disabled: bool,
    /// Explanation of auto-population behavior, when any applies.
    pub info_tip: Option<String>,
    /// Validation error surfaced for display (only once touched).
    pub error: Option<String>,
    /// Whether this subtree contains a touched error, so the renderer can
    /// auto-expand down to it.
    pub contains_touched_error: bool,
    /// Child nodes, already ordered for display.
    pub children: Vec<TreeViewNode>,
}

/// Project a form-state subtree into its tree view.
///
/// `ancestor_is_whole` marks subtrees superseded by an ancestor's whole
/// value: everything below renders blank and disabled, and error reporting
/// is suppressed.
pub fn project(
    node: &FormStateNode,
    display_name: &str,
    ancestor_is_whole: bool,
    errors: Option<&ErrorTree>,
    touched: Option<&TouchedTree>,
) -> TreeViewNode {
    let inert_children = ancestor_is_whole || node.is_whole();

    let error = if ancestor_is_whole {
        None
    } else {
        surfaced_error(errors, touched)
    };

    let children = match &node.body {
        NodeBody::Leaf => Vec::new(),
        NodeBody::Properties(properties) => {
            let mut names: Vec<&String> = properties.keys().collect();
            names.sort_by(|a, b| compare_names(a, b));
            names
                .into_iter()
                .map(|name| {
                    let child = &properties[name.as_str()];
                    project(
                        child,
                        &child.label(None),
                        inert_children,
                        errors.and_then(|e| e.property(name)),
                        touched.and_then(|t| t.property(name)),
                    )
                })
                .collect()
        }
        NodeBody::Items(items) => items
            .iter()
            .enumerate()
            .map(|(index, child)| {
                project(
                    child,
                    &child.label(Some(index)),
                    inert_children,
                    errors.and_then(|e| e.item(index)),
                    touched.and_then(|t| t.item(index)),
                )
            })
            .collect(),
        NodeBody::Pairs(pairs) => pairs
            .iter()
            .enumerate()
            .map(|(index, pair)| {
                let label = if pair.key.trim().is_empty() {
                    format!("Item {}", index + 1)
                } else {
                    pair.key.clone()
                };
                let pair_error = if inert_children {
                    None
                } else {
                    surfaced_error(
                        errors.and_then(|e| e.item(index)),
                        touched.and_then(|t| t.item(index)),
                    )
                };
                TreeViewNode {
                    id: pair.id,
                    display_name: label,
                    tag: TypeTag::String,
                    population_amount: if inert_children {
                        PopulationAmount::Blank
                    } else if pair.is_populated() {
                        PopulationAmount::Full
                    } else {
                        PopulationAmount::Empty
                    },
                    disabled: inert_children,
                    info_tip: None,
                    contains_touched_error: pair_error.is_some(),
                    error: pair_error,
                    children: Vec::new(),
                }
            })
            .collect(),
    };

    let contains_touched_error =
        error.is_some() || children.iter().any(|c| c.contains_touched_error);

    TreeViewNode {
        id: node.id,
        display_name: display_name.to_string(),
        tag: node.tag,
        population_amount: if ancestor_is_whole {
            PopulationAmount::Blank
        } else {
            population_amount(node)
        },
        disabled: node.is_always_disabled || ancestor_is_whole,
        info_tip: if ancestor_is_whole {
            None
        } else {
            info_tip(node)
        },
        error,
        contains_touched_error,
        children,
    }
}

/// A leaf error is surfaced only once its field has been touched, so the
/// tree does not light up red before the user ever interacted with it.
fn surfaced_error(errors: Option<&ErrorTree>, touched: Option<&TouchedTree>) -> Option<String> {
    let message = errors.and_then(|e| e.value.as_ref())?;
    if touched.and_then(|t| t.value) == Some(true) {
        Some(message.clone())
    } else {
        None
    }
}

/// Population indicator of a node in a live (non-inert) context.
pub fn population_amount(node: &FormStateNode) -> PopulationAmount {
    if node.auto_population == AutoPopulationSource::Always {
        return PopulationAmount::Full;
    }
    if node.is_whole() {
        return if node.whole_value.trim().is_empty() {
            PopulationAmount::Empty
        } else {
            PopulationAmount::Full
        };
    }
    match &node.body {
        NodeBody::Leaf => PopulationAmount::Empty,
        NodeBody::Properties(properties) => {
            let amounts: Vec<PopulationAmount> =
                properties.values().map(population_amount).collect();
            let populated = amounts
                .iter()
                .filter(|a| **a != PopulationAmount::Empty)
                .count();
            if populated == 0 {
                PopulationAmount::Empty
            } else if amounts.iter().all(|a| *a == PopulationAmount::Full) {
                // Full only when every child is full; any empty or partial
                // child degrades the object to partial.
                PopulationAmount::Full
            } else {
                PopulationAmount::Partial
            }
        }
        NodeBody::Items(items) => {
            let amounts: Vec<PopulationAmount> =
                items.iter().map(population_amount).collect();
            if amounts.is_empty() || amounts.iter().all(|a| *a == PopulationAmount::Empty) {
                PopulationAmount::Empty
            } else if amounts.iter().all(|a| *a == PopulationAmount::Full) {
                PopulationAmount::Full
            } else {
                PopulationAmount::Partial
            }
        }
        NodeBody::Pairs(pairs) => {
            let populated = pairs.iter().filter(|p| p.is_populated()).count();
            if populated == 0 {
                PopulationAmount::Empty
            } else if populated == pairs.len() {
                PopulationAmount::Full
            } else {
                PopulationAmount::Partial
            }
        }
    }
}

fn info_tip(node: &FormStateNode) -> Option<String> {
    let text = match node.auto_population {
        AutoPopulationSource::Always => {
            "This field is automatically populated by the SDK and cannot be edited."
        }
        AutoPopulationSource::OnCommand => {
            "This field is automatically populated when the event command provides it, \
             unless you supply a value."
        }
        AutoPopulationSource::OnContext => {
            "This field is automatically populated when context collection is enabled, \
             unless you supply a value."
        }
        AutoPopulationSource::None => return None,
    };
    Some(text.to_string())
}
