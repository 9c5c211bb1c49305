//! Annotation graph model.
//!
//! ## Structure
//!
//! ```text
//! Document
//! ├── name, metadata labels
//! └── DocumentGraph
//!     ├── text            base text all token ranges point into
//!     ├── nodes           Token | Span | Structure
//!     ├── relations       Dominance | Pointing | Spanning
//!     └── layers          named groupings with their own metadata
//! ```
//!
//! The graph is the sole owner of every node and relation; everything else
//! holds [`NodeId`](crate::base::NodeId) handles.

mod document;
mod document_graph;
pub mod label;
mod layer;
mod node;
mod relation;

pub use document::{Document, DocumentStatus};
pub use document_graph::DocumentGraph;
pub use label::{Annotatable, Label, LabelKind, Labels, annotate, append_meta, qualified_name};
pub use layer::Layer;
pub use node::{Node, NodeKind};
pub use relation::{Relation, RelationKind, STYPE_DEPENDENCY, STYPE_REFERENCE};
