//! Typed directed edges between nodes.

use indexmap::IndexSet;
use smol_str::SmolStr;

use super::label::{Annotatable, Labels};
use crate::base::{LayerId, NodeId};

/// Semantic subtype of dependency pointing relations.
pub const STYPE_DEPENDENCY: &str = "dependency";
/// Semantic subtype of coreference pointing relations.
pub const STYPE_REFERENCE: &str = "reference";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Structural parent to child.
    Dominance,
    /// Directed labeled edge not expressing containment.
    Pointing,
    /// Span to one of its covered tokens.
    Spanning,
}

#[derive(Clone, Debug)]
pub struct Relation {
    kind: RelationKind,
    source: NodeId,
    target: NodeId,
    stype: Option<SmolStr>,
    labels: Labels,
    pub(super) layers: IndexSet<LayerId>,
}

impl Relation {
    pub(super) fn new(kind: RelationKind, source: NodeId, target: NodeId) -> Self {
        Self {
            kind,
            source,
            target,
            stype: None,
            labels: Labels::new(),
            layers: IndexSet::new(),
        }
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Semantic subtype such as [`STYPE_DEPENDENCY`] or [`STYPE_REFERENCE`].
    pub fn stype(&self) -> Option<&str> {
        self.stype.as_deref()
    }

    pub fn set_stype(&mut self, stype: &str) {
        self.stype = Some(SmolStr::new(stype));
    }

    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.iter().copied()
    }

    pub fn in_layer(&self, layer: LayerId) -> bool {
        self.layers.contains(&layer)
    }
}

impl Annotatable for Relation {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }
}
