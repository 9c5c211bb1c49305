//! The node/relation arena of one document.
//!
//! Nodes and relations live in append-only arenas addressed by
//! [`NodeId`] / [`RelationId`]. Removal leaves a tombstone, so handles are
//! never recycled within a graph.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::layer::Layer;
use super::node::{Node, NodeKind};
use super::relation::{Relation, RelationKind};
use crate::base::{LayerId, NodeId, RelationId, TextRange};
use crate::error::{MappingError, Result};

#[derive(Clone, Debug, Default)]
pub struct DocumentGraph {
    /// The primary (base) text all token ranges point into.
    text: String,
    nodes: Vec<Option<Node>>,
    relations: Vec<Option<Relation>>,
    layers: Vec<Layer>,
    layer_names: FxHashMap<SmolStr, LayerId>,
    /// Tokens in creation order, which is text order.
    token_order: Vec<NodeId>,
}

impl DocumentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // TEXT
    // ========================================================================

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// The covered text of a token, `None` for unaligned tokens.
    pub fn token_text(&self, token: NodeId) -> Option<&str> {
        let range = self.node(token)?.range()?;
        self.text.get(std::ops::Range::<usize>::from(range))
    }

    // ========================================================================
    // NODES
    // ========================================================================

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(kind)));
        id
    }

    /// Add a token, optionally over a range of the base text.
    pub fn add_token(&mut self, range: Option<TextRange>) -> NodeId {
        let id = self.push_node(NodeKind::Token { range });
        self.token_order.push(id);
        id
    }

    /// Add a structure node without any relations.
    pub fn add_structure(&mut self) -> NodeId {
        self.push_node(NodeKind::Structure)
    }

    /// Add a span over `tokens`, connected through spanning relations.
    ///
    /// Every member must already exist and be a token. Repeated members are
    /// covered once.
    pub fn add_span(&mut self, tokens: &[NodeId]) -> Result<NodeId> {
        for &token in tokens {
            let node = self.node(token).ok_or(MappingError::UnknownNode { node: token })?;
            if !node.kind().can_be_span_member() {
                return Err(MappingError::InvalidSpanMember { node: token });
            }
        }

        let span = self.push_node(NodeKind::Span);
        for (i, &token) in tokens.iter().enumerate() {
            if tokens[..i].contains(&token) {
                continue;
            }
            self.add_relation(RelationKind::Spanning, span, token)?;
        }
        Ok(span)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index() as usize)?.as_ref()
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index() as usize)?.as_mut()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Iterate over all live nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_ref().map(|n| (NodeId::new(i as u32), n)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Live tokens in text order.
    pub fn tokens(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.token_order
            .iter()
            .copied()
            .filter(|&id| self.contains_node(id))
    }

    pub fn spans(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_of(|kind| matches!(kind, NodeKind::Span))
    }

    pub fn structures(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_of(|kind| matches!(kind, NodeKind::Structure))
    }

    fn nodes_of(&self, pred: fn(&NodeKind) -> bool) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(move |(_, node)| pred(node.kind()))
            .map(|(id, _)| id)
    }

    /// Remove a node together with all relations touching it.
    ///
    /// Returns false if the node was not part of the graph.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(id.index() as usize).and_then(Option::take) else {
            return false;
        };

        for rel in node.outgoing.iter().chain(node.incoming.iter()) {
            self.remove_relation(*rel);
        }
        for layer in node.layers {
            self.layers[layer.index() as usize].nodes.shift_remove(&id);
        }
        self.token_order.retain(|&token| token != id);
        true
    }

    // ========================================================================
    // RELATIONS
    // ========================================================================

    /// Add a relation between two existing nodes.
    ///
    /// Dominance relations need a source that can dominate, spanning
    /// relations need a span source and a token target.
    pub fn add_relation(
        &mut self,
        kind: RelationKind,
        source: NodeId,
        target: NodeId,
    ) -> Result<RelationId> {
        let source_kind = self
            .node(source)
            .ok_or(MappingError::UnknownNode { node: source })?
            .kind();
        match kind {
            RelationKind::Dominance if !source_kind.can_dominate() => {
                return Err(MappingError::InvalidDominance { parent: source });
            }
            RelationKind::Spanning if !matches!(source_kind, NodeKind::Span) => {
                return Err(MappingError::InvalidSpanMember { node: source });
            }
            _ => {}
        }
        let target_kind = self
            .node(target)
            .ok_or(MappingError::UnknownNode { node: target })?
            .kind();
        if kind == RelationKind::Spanning && !target_kind.can_be_span_member() {
            return Err(MappingError::InvalidSpanMember { node: target });
        }

        let id = RelationId::new(self.relations.len() as u32);
        self.relations.push(Some(Relation::new(kind, source, target)));
        if let Some(node) = self.node_mut(source) {
            node.outgoing.push(id);
        }
        if let Some(node) = self.node_mut(target) {
            node.incoming.push(id);
        }
        Ok(id)
    }

    fn remove_relation(&mut self, id: RelationId) {
        let Some(rel) = self
            .relations
            .get_mut(id.index() as usize)
            .and_then(Option::take)
        else {
            return;
        };
        if let Some(node) = self.node_mut(rel.source()) {
            node.outgoing.retain(|&r| r != id);
        }
        if let Some(node) = self.node_mut(rel.target()) {
            node.incoming.retain(|&r| r != id);
        }
        for layer in rel.layers {
            self.layers[layer.index() as usize].relations.shift_remove(&id);
        }
    }

    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.relations.get(id.index() as usize)?.as_ref()
    }

    pub fn relation_mut(&mut self, id: RelationId) -> Option<&mut Relation> {
        self.relations.get_mut(id.index() as usize)?.as_mut()
    }

    /// Iterate over all live relations.
    pub fn relations(&self) -> impl Iterator<Item = (RelationId, &Relation)> {
        self.relations
            .iter()
            .enumerate()
            .filter_map(|(i, rel)| rel.as_ref().map(|r| (RelationId::new(i as u32), r)))
    }

    pub fn relation_count(&self) -> usize {
        self.relations().count()
    }

    /// Outgoing relations of a node.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Relation> {
        self.node(node)
            .map(Node::outgoing)
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| self.relation(id))
    }

    /// Whether `source` already has a relation of `kind` with subtype
    /// `stype` to `target`.
    pub fn has_relation(
        &self,
        source: NodeId,
        target: NodeId,
        kind: RelationKind,
        stype: Option<&str>,
    ) -> bool {
        self.outgoing(source)
            .any(|rel| rel.kind() == kind && rel.target() == target && rel.stype() == stype)
    }

    /// Tokens covered by a span, in the order they were added.
    pub fn covered_tokens(&self, span: NodeId) -> Vec<NodeId> {
        self.targets_of(span, RelationKind::Spanning)
    }

    /// Spans with a spanning relation onto `token`.
    pub fn covering_spans(&self, token: NodeId) -> Vec<NodeId> {
        self.node(token)
            .map(Node::incoming)
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| self.relation(id))
            .filter(|rel| rel.kind() == RelationKind::Spanning)
            .map(Relation::source)
            .collect()
    }

    /// Dominance children of a structure.
    pub fn children(&self, structure: NodeId) -> Vec<NodeId> {
        self.targets_of(structure, RelationKind::Dominance)
    }

    fn targets_of(&self, node: NodeId, kind: RelationKind) -> Vec<NodeId> {
        self.outgoing(node)
            .filter(|rel| rel.kind() == kind)
            .map(Relation::target)
            .collect()
    }

    // ========================================================================
    // LAYERS
    // ========================================================================

    /// Get the layer with `name`, creating it on first use.
    pub fn layer_or_create(&mut self, name: &str) -> LayerId {
        if let Some(&id) = self.layer_names.get(name) {
            return id;
        }
        let id = LayerId::new(self.layers.len() as u32);
        self.layers.push(Layer::new(name));
        self.layer_names.insert(SmolStr::new(name), id);
        tracing::debug!(layer = name, "created layer");
        id
    }

    pub fn layer_id(&self, name: &str) -> Option<LayerId> {
        self.layer_names.get(name).copied()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.index() as usize)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.index() as usize)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layer_id(name).and_then(|id| self.layer(id))
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn add_node_to_layer(&mut self, layer: LayerId, node: NodeId) -> Result<()> {
        let entry = self
            .nodes
            .get_mut(node.index() as usize)
            .and_then(Option::as_mut)
            .ok_or(MappingError::UnknownNode { node })?;
        entry.layers.insert(layer);
        if let Some(layer) = self.layers.get_mut(layer.index() as usize) {
            layer.nodes.insert(node);
        }
        Ok(())
    }

    pub fn add_relation_to_layer(&mut self, layer: LayerId, relation: RelationId) {
        let Some(entry) = self
            .relations
            .get_mut(relation.index() as usize)
            .and_then(Option::as_mut)
        else {
            return;
        };
        entry.layers.insert(layer);
        if let Some(layer) = self.layers.get_mut(layer.index() as usize) {
            layer.relations.insert(relation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::text_range;

    fn graph_with_tokens(text: &str, ranges: &[(usize, usize)]) -> (DocumentGraph, Vec<NodeId>) {
        let mut graph = DocumentGraph::new();
        graph.append_text(text);
        let tokens = ranges
            .iter()
            .map(|&(s, e)| graph.add_token(text_range(s, e)))
            .collect();
        (graph, tokens)
    }

    #[test]
    fn test_token_text() {
        let (graph, tokens) = graph_with_tokens("Max sleeps.", &[(0, 3), (4, 10), (10, 11)]);
        assert_eq!(graph.token_text(tokens[0]), Some("Max"));
        assert_eq!(graph.token_text(tokens[1]), Some("sleeps"));
        assert_eq!(graph.token_text(tokens[2]), Some("."));
    }

    #[test]
    fn test_span_covers_tokens() {
        let (mut graph, tokens) = graph_with_tokens("Max sleeps.", &[(0, 3), (4, 10)]);
        let span = graph.add_span(&[tokens[0], tokens[1], tokens[0]]).unwrap();

        assert_eq!(graph.covered_tokens(span), vec![tokens[0], tokens[1]]);
        assert_eq!(graph.relation_count(), 2);
    }

    #[test]
    fn test_span_over_span_rejected() {
        let (mut graph, tokens) = graph_with_tokens("Max", &[(0, 3)]);
        let span = graph.add_span(&[tokens[0]]).unwrap();
        assert!(matches!(
            graph.add_span(&[span]),
            Err(MappingError::InvalidSpanMember { .. })
        ));
    }

    #[test]
    fn test_dominance_needs_structure() {
        let (mut graph, tokens) = graph_with_tokens("Max", &[(0, 3)]);
        let root = graph.add_structure();

        assert!(graph.add_relation(RelationKind::Dominance, root, tokens[0]).is_ok());
        assert!(matches!(
            graph.add_relation(RelationKind::Dominance, tokens[0], root),
            Err(MappingError::InvalidDominance { .. })
        ));
        assert_eq!(graph.children(root), vec![tokens[0]]);
    }

    #[test]
    fn test_remove_node_drops_relations_and_memberships() {
        let (mut graph, tokens) = graph_with_tokens("Max sleeps", &[(0, 3), (4, 10)]);
        let span = graph.add_span(&tokens).unwrap();
        let layer = graph.layer_or_create("sentences");
        graph.add_node_to_layer(layer, tokens[0]).unwrap();

        assert!(graph.remove_node(tokens[0]));
        assert!(!graph.remove_node(tokens[0]));

        assert_eq!(graph.covered_tokens(span), vec![tokens[1]]);
        assert_eq!(graph.tokens().collect::<Vec<_>>(), vec![tokens[1]]);
        assert!(!graph.layer(layer).unwrap().contains_node(tokens[0]));
        assert_eq!(graph.relation_count(), 1);
    }

    #[test]
    fn test_covering_spans() {
        let (mut graph, tokens) = graph_with_tokens("Max sleeps", &[(0, 3), (4, 10)]);
        let both = graph.add_span(&tokens).unwrap();
        let second = graph.add_span(&tokens[1..]).unwrap();

        assert_eq!(graph.covering_spans(tokens[0]), vec![both]);
        assert_eq!(graph.covering_spans(tokens[1]), vec![both, second]);
        assert!(graph.covering_spans(both).is_empty());
    }

    #[test]
    fn test_layer_or_create_is_lazy_and_stable() {
        let mut graph = DocumentGraph::new();
        assert!(graph.layer_id("pos").is_none());

        let a = graph.layer_or_create("pos");
        let b = graph.layer_or_create("pos");
        assert_eq!(a, b);
        assert_eq!(graph.layers().count(), 1);
        assert_eq!(graph.layer_by_name("pos").unwrap().name(), "pos");
    }

    #[test]
    fn test_has_relation_checks_stype() {
        let (mut graph, tokens) = graph_with_tokens("a b", &[(0, 1), (2, 3)]);
        let rel = graph
            .add_relation(RelationKind::Pointing, tokens[0], tokens[1])
            .unwrap();
        graph.relation_mut(rel).unwrap().set_stype("reference");

        assert!(graph.has_relation(tokens[0], tokens[1], RelationKind::Pointing, Some("reference")));
        assert!(!graph.has_relation(tokens[0], tokens[1], RelationKind::Pointing, Some("dependency")));
        assert!(!graph.has_relation(tokens[1], tokens[0], RelationKind::Pointing, Some("reference")));
    }
}
