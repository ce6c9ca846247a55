//! Form-state tree: nodes, construction, and edit operations.
//!
//! This module owns the mutable side of the engine:
//!
//! - [`node`] - Node types, ids, and population bookkeeping
//! - [`build`] - The factory turning a schema plus persisted settings into
//!   a fresh tree
//! - [`edit`] - The structural operations a renderer may perform

/// Node types, ids, and population bookkeeping.
pub mod node;

/// Form-state construction from schema and settings.
pub mod build;

/// Structural edit operations addressed by node id.
pub mod edit;

pub use build::build_form_state;
pub use edit::EditError;
pub use node::{FormStateNode, IdGenerator, KeyValuePair, NodeBody, NodeId, PopulationStrategy};
