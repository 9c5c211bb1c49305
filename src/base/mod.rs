//! Foundation types for the importer.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`NodeId`], [`RelationId`], [`LayerId`] - Graph handles
//! - [`TextRange`], [`TextSize`] - Base text positions
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//!
//! This module has NO dependencies on other crate modules.

mod ids;
mod span;

pub use ids::{LayerId, NodeId, RelationId};
pub use span::{LineCol, LineIndex, TextRange, TextSize, text_range};

// Re-export text-size types for convenience
pub use text_size;
