//! Node lookup by id: field path, settings path, and breadcrumb trail.
//!
//! The edit panel selects nodes by the stable ids the tree view hands out.
//! The locator resolves an id back to the form-state node, the field path
//! into the form-state-shaped side channels (`properties.a.items.0`), the
//! settings path into the persisted value (`a.0`), and the breadcrumb from
//! the root down.

use crate::classify::TypeTag;
use crate::state::node::{FormStateNode, NodeBody, NodeId};
use crate::value::{Step, parse_path};

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// Node (or pair row) id.
    pub id: NodeId,
    /// Display label.
    pub label: String,
}

/// A resolved node.
#[derive(Debug)]
pub struct LocatedNode<'a> {
    /// The form-state node. For a key/value row this is the owning editor
    /// node; the paths and breadcrumb still point at the row itself.
    pub node: &'a FormStateNode,
    /// Path through the form-state shape, for error/touched lookups.
    pub field_path: String,
    /// Path through the persisted value, for the transforms map.
    pub settings_path: String,
    /// Trail from the root to the node, inclusive.
    pub breadcrumb: Vec<Crumb>,
}

/// Find the node with `id`, with its paths and breadcrumb.
pub fn locate<'a>(root: &'a FormStateNode, id: NodeId) -> Option<LocatedNode<'a>> {
    let crumbs = vec![Crumb {
        id: root.id,
        label: root.label(None),
    }];
    locate_in(root, id, String::new(), String::new(), crumbs)
}

fn locate_in<'a>(
    node: &'a FormStateNode,
    id: NodeId,
    field_path: String,
    settings_path: String,
    breadcrumb: Vec<Crumb>,
) -> Option<LocatedNode<'a>> {
    if node.id == id {
        return Some(LocatedNode {
            node,
            field_path,
            settings_path,
            breadcrumb,
        });
    }

    match &node.body {
        NodeBody::Leaf => None,
        NodeBody::Properties(properties) => properties.iter().find_map(|(name, child)| {
            let mut crumbs = breadcrumb.clone();
            crumbs.push(Crumb {
                id: child.id,
                label: child.label(None),
            });
            locate_in(
                child,
                id,
                join(&field_path, &format!("properties.{name}")),
                join(&settings_path, name),
                crumbs,
            )
        }),
        NodeBody::Items(items) => items.iter().enumerate().find_map(|(index, child)| {
            let mut crumbs = breadcrumb.clone();
            crumbs.push(Crumb {
                id: child.id,
                label: child.label(Some(index)),
            });
            locate_in(
                child,
                id,
                join(&field_path, &format!("items.{index}")),
                join(&settings_path, &index.to_string()),
                crumbs,
            )
        }),
        NodeBody::Pairs(pairs) => {
            pairs
                .iter()
                .enumerate()
                .find(|(_, pair)| pair.id == id)
                .map(|(index, pair)| {
                    let mut crumbs = breadcrumb.clone();
                    let label = if pair.key.trim().is_empty() {
                        format!("Item {}", index + 1)
                    } else {
                        pair.key.clone()
                    };
                    crumbs.push(Crumb { id: pair.id, label });
                    let expands =
                        node.tag == TypeTag::ObjectJson && node.schema.expand_paths;
                    let key_path = if expands {
                        normalized_pair_key(pair.key.trim())
                    } else {
                        // Flat editors persist the key literally.
                        pair.key.trim().to_string()
                    };
                    LocatedNode {
                        node,
                        field_path: join(&field_path, &format!("items.{index}")),
                        settings_path: join(&settings_path, &key_path),
                        breadcrumb: crumbs,
                    }
                })
        }
    }
}

/// Settings paths of every subtree marked for clearing.
pub(crate) fn collect_clear_paths(root: &FormStateNode) -> Vec<String> {
    let mut out = Vec::new();
    collect_clear_in(root, "", &mut out);
    out
}

fn collect_clear_in(node: &FormStateNode, settings_path: &str, out: &mut Vec<String>) {
    if node.clear {
        out.push(settings_path.to_string());
    }
    match &node.body {
        NodeBody::Properties(properties) => {
            for (name, child) in properties {
                collect_clear_in(child, &join(settings_path, name), out);
            }
        }
        NodeBody::Items(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_clear_in(child, &join(settings_path, &index.to_string()), out);
            }
        }
        _ => {}
    }
}

/// Rewrite a dot/bracket pair key (`a.b[0]`) into the dot-index form the
/// rest of the settings paths use (`a.b.0`).
fn normalized_pair_key(key: &str) -> String {
    parse_path(key)
        .iter()
        .map(|step| match step {
            Step::Key(name) => name.clone(),
            Step::Index(index) => index.to_string(),
        })
        .collect::<Vec<String>>()
        .join(".")
}

fn join(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{base}.{segment}")
    }
}
