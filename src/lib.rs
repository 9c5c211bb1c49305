//! # tcf-base
//!
//! Streaming importer for the WebLicht Text Corpus Format (TCF). A TCF
//! document is read once, start to end, and mapped onto a layered
//! annotation graph: tokens over a base text, spans and syntax structures
//! over tokens, pointing relations for dependencies and coreference.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project → directory and file loading
//!   ↓
//! tcf     → XML events, per-tag dispatch, id and span bookkeeping
//!   ↓
//! graph   → Document, DocumentGraph, labels and layers
//!   ↓
//! base    → Primitives (node/relation/layer ids, text ranges)
//! ```

// ============================================================================
// FOUNDATION
// ============================================================================

/// Foundation types: graph handles, text ranges
pub mod base;

pub mod config;
pub mod error;

/// Annotation graph the documents are mapped onto
pub mod graph;

// ============================================================================
// IMPORT
// ============================================================================

pub mod project;
pub mod tcf;

pub use base::{LayerId, NodeId, RelationId, TextRange, TextSize};
pub use config::ImporterConfig;
pub use error::{ConfigError, LoadError, MappingError, Result};
pub use graph::{Document, DocumentGraph, DocumentStatus};
pub use tcf::{TcfMapper, map_bytes, map_str};
