//! The root container handed to callers.

use smol_str::SmolStr;

use super::document_graph::DocumentGraph;
use super::label::{Annotatable, Labels};

/// Completion status of a mapped document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentStatus {
    Completed,
}

/// A document: its name, document-level metadata and its graph.
#[derive(Clone, Debug, Default)]
pub struct Document {
    name: Option<SmolStr>,
    labels: Labels,
    graph: Option<DocumentGraph>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: Some(SmolStr::new(name)),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(SmolStr::new(name));
    }

    pub fn graph(&self) -> Option<&DocumentGraph> {
        self.graph.as_ref()
    }

    pub fn graph_mut(&mut self) -> Option<&mut DocumentGraph> {
        self.graph.as_mut()
    }

    pub fn set_graph(&mut self, graph: DocumentGraph) {
        self.graph = Some(graph);
    }

    /// Metadata value by name.
    pub fn meta(&self, name: &str) -> Option<&str> {
        self.labels.meta(name)
    }
}

impl Annotatable for Document {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }
}
