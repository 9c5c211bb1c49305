//! Graph nodes: tokens, spans and structures.

use indexmap::IndexSet;

use super::label::{Annotatable, Labels};
use crate::base::{LayerId, RelationId, TextRange};

/// The closed set of node variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A token over a range of the base text. `None` for tokens that were
    /// not aligned (placeholders, or documents imported without full text).
    Token { range: Option<TextRange> },
    /// A set of tokens, covered through spanning relations.
    Span,
    /// A hierarchical node (constituent) with dominance children.
    Structure,
}

impl NodeKind {
    pub fn is_tokenlike(&self) -> bool {
        matches!(self, NodeKind::Token { .. })
    }

    pub fn can_dominate(&self) -> bool {
        matches!(self, NodeKind::Structure)
    }

    pub fn can_be_span_member(&self) -> bool {
        matches!(self, NodeKind::Token { .. })
    }

    /// Short lowercase name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Token { .. } => "token",
            NodeKind::Span => "span",
            NodeKind::Structure => "structure",
        }
    }
}

/// A node with its labels, layer memberships and incident relations.
#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    labels: Labels,
    pub(super) layers: IndexSet<LayerId>,
    pub(super) outgoing: Vec<RelationId>,
    pub(super) incoming: Vec<RelationId>,
}

impl Node {
    pub(super) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            labels: Labels::new(),
            layers: IndexSet::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Text range of a token node.
    pub fn range(&self) -> Option<TextRange> {
        match self.kind {
            NodeKind::Token { range } => range,
            _ => None,
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.iter().copied()
    }

    pub fn in_layer(&self, layer: LayerId) -> bool {
        self.layers.contains(&layer)
    }

    pub fn outgoing(&self) -> &[RelationId] {
        &self.outgoing
    }

    pub fn incoming(&self) -> &[RelationId] {
        &self.incoming
    }
}

impl Annotatable for Node {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }
}
