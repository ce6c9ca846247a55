//! The editor facade: one object owning the schema, policies, and tree.
//!
//! `FormEditor` wires the engine's walks together for the renderer: build
//! on load, project and validate on every change, serialize on save, locate
//! on selection. A schema-load event (initial load, or the user switching
//! schemas) replaces the whole tree; ids keep counting up so no id is ever
//! reused across rebuilds.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::locate::{self, LocatedNode};
use crate::policy::FieldPolicies;
use crate::schema::{SchemaError, SchemaNode};
use crate::state::build::build_form_state;
use crate::state::edit::{self, EditError};
use crate::state::node::{FormStateNode, IdGenerator, NodeId, PopulationStrategy};
use crate::validate::{ErrorTree, TouchedTree};
use crate::value;
use crate::view::{self, TreeViewNode};

/// A clear directive recorded alongside persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transform {
    /// Delete the existing value at this path before applying new values.
    pub clear: bool,
}

/// Owns a form-state tree and the configuration it was built from.
#[derive(Debug)]
pub struct FormEditor {
    schema: Rc<SchemaNode>,
    policies: FieldPolicies,
    ids: IdGenerator,
    root: FormStateNode,
}

impl FormEditor {
    /// Build an editor from a fetched schema document and, optionally, the
    /// previously persisted settings value.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema document cannot be parsed.
    pub fn new(
        schema: &Value,
        previous: Option<&Value>,
        policies: FieldPolicies,
    ) -> Result<Self, SchemaError> {
        let schema = Rc::new(SchemaNode::from_value(schema)?);
        let mut ids = IdGenerator::new();
        let root = build_form_state(&schema, previous, &policies, &mut ids);
        info!(
            "editor ready for schema {:?}",
            schema.title.as_deref().unwrap_or("(untitled)")
        );
        Ok(FormEditor {
            schema,
            policies,
            ids,
            root,
        })
    }

    /// Replace the tree for a new schema document.
    ///
    /// The old tree is discarded wholesale; there is no structural diffing
    /// across schema changes.
    pub fn replace_schema(
        &mut self,
        schema: &Value,
        previous: Option<&Value>,
    ) -> Result<(), SchemaError> {
        let schema = Rc::new(SchemaNode::from_value(schema)?);
        self.root = build_form_state(&schema, previous, &self.policies, &mut self.ids);
        self.schema = schema;
        info!("form state rebuilt for replacement schema");
        Ok(())
    }

    /// The form-state root.
    pub fn root(&self) -> &FormStateNode {
        &self.root
    }

    /// The parsed schema.
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// Project the tree view, threading the renderer's error and touched
    /// side channels through.
    pub fn project(
        &self,
        errors: Option<&ErrorTree>,
        touched: Option<&TouchedTree>,
    ) -> TreeViewNode {
        let display_name = self
            .schema
            .title
            .clone()
            .unwrap_or_else(|| "xdm".to_string());
        view::project(&self.root, &display_name, false, errors, touched)
    }

    /// Validate the whole tree. `None` means clean.
    pub fn validate(&self) -> Option<ErrorTree> {
        crate::validate::validate(&self.root)
    }

    /// Compute the persisted settings value. `None` when nothing is
    /// populated; submission should persist the absence, not `{}`.
    pub fn value(&self) -> Option<Value> {
        value::get_value(&self.root)
    }

    /// Resolve a tree-view id to its node, paths, and breadcrumb.
    pub fn locate(&self, id: NodeId) -> Option<LocatedNode<'_>> {
        locate::locate(&self.root, id)
    }

    /// Direct node access by id.
    pub fn node(&self, id: NodeId) -> Option<&FormStateNode> {
        edit::node_by_id(&self.root, id)
    }

    /// The clear-transform map for update-existing-value mode.
    pub fn transforms(&self) -> BTreeMap<String, Transform> {
        locate::collect_clear_paths(&self.root)
            .into_iter()
            .map(|path| (path, Transform { clear: true }))
            .collect()
    }

    /// Set the whole-mode value of a node.
    pub fn set_whole_value(&mut self, id: NodeId, value: &str) -> Result<(), EditError> {
        edit::set_whole_value(&mut self.root, id, value)
    }

    /// Switch a node's population strategy, preserving entered text.
    pub fn set_population_strategy(
        &mut self,
        id: NodeId,
        strategy: PopulationStrategy,
    ) -> Result<(), EditError> {
        edit::set_population_strategy(&mut self.root, id, strategy)
    }

    /// Append an item or key/value row; returns the new id.
    pub fn push_item(&mut self, id: NodeId) -> Result<NodeId, EditError> {
        edit::push_item(&mut self.root, id, &self.policies, &mut self.ids)
    }

    /// Remove the item or row at `index`.
    pub fn remove_item(&mut self, id: NodeId, index: usize) -> Result<(), EditError> {
        edit::remove_item(&mut self.root, id, index)
    }

    /// Set the key of a key/value row.
    pub fn set_pair_key(&mut self, id: NodeId, index: usize, key: &str) -> Result<(), EditError> {
        edit::set_pair_key(&mut self.root, id, index, key)
    }

    /// Set the value of a key/value row.
    pub fn set_pair_value(
        &mut self,
        id: NodeId,
        index: usize,
        value: &str,
    ) -> Result<(), EditError> {
        edit::set_pair_value(&mut self.root, id, index, value)
    }

    /// Mark or unmark a subtree for clearing.
    pub fn set_clear(&mut self, id: NodeId, clear: bool) -> Result<(), EditError> {
        edit::set_clear(&mut self.root, id, clear)
    }
}
