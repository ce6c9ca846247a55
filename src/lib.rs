//! # xdmform
//!
//! A JSON Schema driven form-state engine for XDM object configuration.
//!
//! xdmform takes an arbitrary, deeply nested JSON Schema (objects, arrays,
//! enums, primitives, plus the `object/json` and `object/analytics`
//! extension types) and derives an editable tree of form state from it. The
//! engine keeps that tree synchronized with a visual tree UI, validates it,
//! and serializes it back down to the minimal settings value.
//!
//! ## Features
//!
//! - One form-state node per schema node, with stable generated ids
//! - Two population strategies per structured node: one whole value
//!   (typically a `%data element%` token) or part-by-part editing, with
//!   entered text preserved across switches
//! - Auto-population and always-disabled classification from injected path
//!   tables
//! - Recursive validation producing an error tree, never exceptions
//! - Population-amount indicators (empty/partial/full) for the tree view
//! - Minimal-value serialization: empty branches are omitted, never `{}`
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use xdmform::{FieldPolicies, FormEditor};
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "vendor": {
//!             "type": "object",
//!             "properties": { "name": { "type": "string" } }
//!         }
//!     }
//! });
//!
//! let mut editor = FormEditor::new(&schema, None, FieldPolicies::empty()).unwrap();
//! let name_id = {
//!     let (_, vendor) = editor.root().properties().next().unwrap();
//!     vendor.properties().next().unwrap().1.id
//! };
//! editor.set_whole_value(name_id, "Adobe").unwrap();
//! assert_eq!(editor.value(), Some(json!({ "vendor": { "name": "Adobe" } })));
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Schema parsing
//! - [`classify`] - Schema type classification
//! - [`policy`] - Auto-population and disabled-field tables
//! - [`state`] - The form-state tree, its factory, and edit operations
//! - [`view`] - Tree-view projection
//! - [`validate`] - Recursive validation and the error/touched side channels
//! - [`value`] - Settings serialization
//! - [`locate`] - Node lookup by id
//! - [`editor`] - The `FormEditor` facade tying everything together

/// Schema parsing and the retained schema subset.
pub mod schema;

/// Schema type classification.
pub mod classify;

/// Number-aware property name ordering.
pub mod order;

/// Auto-population and always-disabled field tables.
pub mod policy;

/// The form-state tree, its factory, and edit operations.
pub mod state;

/// Tree-view projection for the renderer.
pub mod view;

/// Recursive validation and the error/touched side channels.
pub mod validate;

/// Serialization of form state to the minimal settings value.
pub mod value;

/// Node lookup by id: field path, settings path, breadcrumb.
pub mod locate;

/// The editor facade owning schema, policies, and tree.
pub mod editor;

pub use classify::{TypeTag, classify};
pub use editor::{FormEditor, Transform};
pub use locate::{Crumb, LocatedNode, locate};
pub use policy::{AutoPopulationSource, FieldPolicies};
pub use schema::{SchemaError, SchemaNode};
pub use state::{
    EditError, FormStateNode, IdGenerator, KeyValuePair, NodeBody, NodeId, PopulationStrategy,
    build_form_state,
};
pub use validate::{ErrorTree, MetaTree, TouchedTree, is_single_data_element_token, validate};
pub use value::get_value;
pub use view::{PopulationAmount, TreeViewNode, population_amount, project};
