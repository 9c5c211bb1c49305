//! Error types for document mapping and configuration.

use std::path::PathBuf;

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::NodeId;

/// Result alias used throughout the crate.
pub type Result<T, E = MappingError> = std::result::Result<T, E>;

/// A fatal error that aborts the mapping of the current document.
///
/// No partial graph is handed out once one of these is raised.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("xml error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed attribute at byte {position}: {source}")]
    Attribute {
        position: u64,
        #[source]
        source: quick_xml::events::attributes::AttrError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("multiple use of id '{id}', ids are supposed to be unique")]
    DuplicateId { id: SmolStr },

    #[error("id '{id}' does not refer to any known node")]
    UnresolvedId { id: SmolStr },

    #[error("element <{element}> is missing the required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("reference from {source_node} has no antecedent to point to")]
    MissingReferenceTarget { source_node: NodeId },

    #[error("annotation id '{id}' does not refer to any known annotation")]
    UnknownLabel { id: SmolStr },

    #[error("text span from '{start}' to '{end}' does not cover tokens in text order")]
    InvalidTextSpan { start: SmolStr, end: SmolStr },

    #[error("{parent} cannot dominate other nodes")]
    InvalidDominance { parent: NodeId },

    #[error("{node} cannot be covered by a span")]
    InvalidSpanMember { node: NodeId },

    #[error("{node} is not part of the document graph")]
    UnknownNode { node: NodeId },

    #[error("base text exceeds the addressable size")]
    TextTooLarge,
}

/// An invalid importer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("property '{key}' expects a boolean, found '{value}'")]
    InvalidBoolean { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A failure while loading documents from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error("{}: {source}", path.display())]
    Mapping {
        path: PathBuf,
        #[source]
        source: MappingError,
    },
}
