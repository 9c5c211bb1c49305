//! Stack-driven construction of constituent trees.
//!
//! Every open `constituent` element owns one frame on the stack, so the
//! matching end tag always pops the frame it pushed. Inner constituents
//! become structures; constituents over `tokenIDs` are leaves attached to
//! the token (or span) they name.

use super::dictionary::{attr, layer};
use super::registry::{BlockIds, IdRegime, IdRegistry};
use super::spans::SpanResolver;
use crate::base::NodeId;
use crate::error::{MappingError, Result};
use crate::graph::{DocumentGraph, LabelKind, RelationKind, annotate};

/// Prefix of ids generated for constituents without usable declared ids.
pub const GENERATED_PREFIX: &str = "constituent-";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Structure(NodeId),
    Leaf(NodeId),
}

impl Frame {
    fn node(self) -> NodeId {
        match self {
            Frame::Structure(node) | Frame::Leaf(node) => node,
        }
    }
}

/// The attributes of one `constituent` start tag.
#[derive(Clone, Copy, Debug, Default)]
pub struct Constituent<'a> {
    pub id: Option<&'a str>,
    pub cat: Option<&'a str>,
    pub token_ids: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct ConstituentBuilder {
    stack: Vec<Frame>,
    ids: BlockIds,
}

impl Default for ConstituentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstituentBuilder {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            ids: BlockIds::new(GENERATED_PREFIX),
        }
    }

    /// Start a `parsing` block.
    pub fn begin_block(&mut self) {
        self.ids.reset();
        self.stack.clear();
    }

    /// Start a `parse`: the next constituent is a root.
    pub fn begin_parse(&mut self) {
        self.stack.clear();
    }

    pub fn regime(&self) -> IdRegime {
        self.ids.regime()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Handle a `constituent` start tag.
    pub fn open(
        &mut self,
        graph: &mut DocumentGraph,
        registry: &mut IdRegistry,
        spans: &mut SpanResolver,
        constituent: Constituent<'_>,
    ) -> Result<NodeId> {
        let id = self.ids.assign(constituent.id);

        let parent = match self.stack.last() {
            Some(Frame::Structure(parent)) => Some(*parent),
            Some(Frame::Leaf(leaf)) => return Err(MappingError::InvalidDominance { parent: *leaf }),
            None => None,
        };

        let syntax = graph.layer_or_create(layer::CONSTITUENTS);
        let frame = match constituent.token_ids {
            Some(token_ids) => Frame::Leaf(spans.resolve(graph, registry, token_ids)?),
            None => {
                let structure = graph.add_structure();
                registry.insert(&id, structure)?;
                graph.add_node_to_layer(syntax, structure)?;
                Frame::Structure(structure)
            }
        };
        let node = frame.node();

        annotate(
            graph.node_mut(node),
            Some(layer::CONSTITUENTS),
            Some(attr::CAT),
            constituent.cat,
            false,
            LabelKind::Annotation,
        );
        if let Some(parent) = parent {
            let rel = graph.add_relation(RelationKind::Dominance, parent, node)?;
            graph.add_relation_to_layer(syntax, rel);
        }

        self.stack.push(frame);
        Ok(node)
    }

    /// Handle a `constituent` end tag.
    pub fn close(&mut self) -> Option<NodeId> {
        self.stack.pop().map(Frame::node)
    }
}
