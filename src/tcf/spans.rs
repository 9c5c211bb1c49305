//! Resolution of token-id targets to the node an annotation attaches to.
//!
//! A target is a single token id or a whitespace-separated id group. The
//! `shrink` flag attaches single-token annotations to the token itself, the
//! `reuse` flag shares one span per target across all annotation levels.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::registry::{IdRegistry, canonical_group};
use crate::base::NodeId;
use crate::config::ImporterConfig;
use crate::error::{MappingError, Result};
use crate::graph::DocumentGraph;

#[derive(Clone, Debug, Default)]
pub struct SpanResolver {
    shrink: bool,
    reuse: bool,
    /// Spans wrapping exactly one token, keyed by the token id. Kept apart
    /// from the group memo so a single-token span never shadows a token.
    singles: FxHashMap<SmolStr, NodeId>,
    groups: FxHashMap<SmolStr, NodeId>,
}

impl SpanResolver {
    pub fn new(shrink: bool, reuse: bool) -> Self {
        Self {
            shrink,
            reuse,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ImporterConfig) -> Self {
        Self::new(
            config.shrink_token_annotations,
            config.use_common_annotated_element,
        )
    }

    pub fn shrink(&self) -> bool {
        self.shrink
    }

    pub fn reuse(&self) -> bool {
        self.reuse
    }

    /// The node annotations on `target` attach to.
    ///
    /// Creates a span when neither the token itself nor a memoized span
    /// applies. Every id must already name a token.
    pub fn resolve(
        &mut self,
        graph: &mut DocumentGraph,
        registry: &IdRegistry,
        target: &str,
    ) -> Result<NodeId> {
        let key = canonical_group(target);
        if key.is_empty() {
            return Err(MappingError::UnresolvedId { id: SmolStr::new(target) });
        }

        if !key.contains(' ') {
            let token = require_token(graph, registry, &key)?;
            if self.shrink {
                return Ok(token);
            }
            return self.memoized(graph, key, &[token], false);
        }

        if let Some(&span) = self.groups.get(&key).filter(|_| self.reuse) {
            return Ok(span);
        }
        let tokens = registry.resolve_group(&key)?;
        self.memoized(graph, key, &tokens, true)
    }

    /// Drop memoized spans pointing at `node` once it left the graph.
    pub fn forget(&mut self, node: NodeId) {
        self.singles.retain(|_, span| *span != node);
        self.groups.retain(|_, span| *span != node);
    }

    fn memoized(
        &mut self,
        graph: &mut DocumentGraph,
        key: SmolStr,
        tokens: &[NodeId],
        group: bool,
    ) -> Result<NodeId> {
        let reuse = self.reuse;
        let memo = if group { &mut self.groups } else { &mut self.singles };
        if let Some(&span) = memo.get(&key).filter(|_| reuse) {
            return Ok(span);
        }
        let span = graph.add_span(tokens)?;
        if reuse {
            memo.insert(key, span);
        }
        Ok(span)
    }

    /// A fresh span over the tokens between `start` and `end` (inclusive)
    /// in text order.
    ///
    /// A single-token range yields the token itself under `shrink`. The
    /// reuse policy does not apply.
    pub fn text_span(
        &self,
        graph: &mut DocumentGraph,
        registry: &IdRegistry,
        start: &str,
        end: &str,
    ) -> Result<NodeId> {
        let first = require_token(graph, registry, start)?;
        let last = require_token(graph, registry, end)?;
        if first == last && self.shrink {
            return Ok(first);
        }

        let covered: Vec<NodeId> = graph
            .tokens()
            .skip_while(|&token| token != first)
            .scan(false, |done, token| {
                if *done {
                    return None;
                }
                *done = token == last;
                Some(token)
            })
            .collect();

        if covered.last() != Some(&last) {
            return Err(MappingError::InvalidTextSpan {
                start: SmolStr::new(start),
                end: SmolStr::new(end),
            });
        }
        graph.add_span(&covered)
    }
}

/// The node `id` names, which must be a token.
fn require_token(graph: &DocumentGraph, registry: &IdRegistry, id: &str) -> Result<NodeId> {
    let node = registry.resolve(id)?;
    let kind = graph
        .node(node)
        .ok_or(MappingError::UnknownNode { node })?
        .kind();
    if !kind.is_tokenlike() {
        return Err(MappingError::InvalidSpanMember { node });
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::text_range;
    use crate::graph::NodeKind;
    use rstest::rstest;

    fn setup() -> (DocumentGraph, IdRegistry, Vec<NodeId>) {
        let mut graph = DocumentGraph::new();
        graph.append_text("Max sleeps.");
        let mut registry = IdRegistry::new();
        let mut tokens = Vec::new();
        for (i, (s, e)) in [(0, 3), (4, 10), (10, 11)].into_iter().enumerate() {
            let token = graph.add_token(text_range(s, e));
            registry.insert(&format!("t{}", i + 1), token).unwrap();
            tokens.push(token);
        }
        (graph, registry, tokens)
    }

    #[test]
    fn test_shrink_returns_token() {
        let (mut graph, registry, tokens) = setup();
        let mut spans = SpanResolver::new(true, false);

        assert_eq!(spans.resolve(&mut graph, &registry, "t2").unwrap(), tokens[1]);
        assert_eq!(graph.spans().count(), 0);
    }

    #[test]
    fn test_reuse_shares_single_token_span() {
        let (mut graph, registry, tokens) = setup();
        let mut spans = SpanResolver::new(false, true);

        let a = spans.resolve(&mut graph, &registry, "t1").unwrap();
        let b = spans.resolve(&mut graph, &registry, "t1").unwrap();
        assert_eq!(a, b);
        assert_eq!(graph.node(a).unwrap().kind(), &NodeKind::Span);
        assert_eq!(graph.covered_tokens(a), vec![tokens[0]]);
        // the token id still names the token
        assert_eq!(registry.get("t1"), Some(tokens[0]));
    }

    #[test]
    fn test_no_reuse_creates_fresh_spans() {
        let (mut graph, registry, _) = setup();
        let mut spans = SpanResolver::new(false, false);

        let a = spans.resolve(&mut graph, &registry, "t1").unwrap();
        let b = spans.resolve(&mut graph, &registry, "t1").unwrap();
        assert_ne!(a, b);
        assert_eq!(graph.spans().count(), 2);
    }

    #[rstest]
    #[case(true, true)]
    #[case(false, true)]
    fn test_group_spans_reused_on_canonical_key(#[case] shrink: bool, #[case] reuse: bool) {
        let (mut graph, registry, tokens) = setup();
        let mut spans = SpanResolver::new(shrink, reuse);

        let a = spans.resolve(&mut graph, &registry, "t1 t2").unwrap();
        let b = spans.resolve(&mut graph, &registry, " t1   t2").unwrap();
        assert_eq!(a, b);
        assert_eq!(graph.covered_tokens(a), vec![tokens[0], tokens[1]]);
    }

    #[test]
    fn test_group_without_reuse() {
        let (mut graph, registry, _) = setup();
        let mut spans = SpanResolver::new(true, false);

        let a = spans.resolve(&mut graph, &registry, "t1 t2").unwrap();
        let b = spans.resolve(&mut graph, &registry, "t1 t2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_member_is_fatal() {
        let (mut graph, registry, _) = setup();
        let mut spans = SpanResolver::new(true, true);

        assert!(matches!(
            spans.resolve(&mut graph, &registry, "t1 t9"),
            Err(MappingError::UnresolvedId { ref id }) if id == "t9"
        ));
        assert!(matches!(
            spans.resolve(&mut graph, &registry, "t9"),
            Err(MappingError::UnresolvedId { .. })
        ));
        assert_eq!(graph.spans().count(), 0);
    }

    #[test]
    fn test_text_span_covers_range() {
        let (mut graph, registry, tokens) = setup();
        let spans = SpanResolver::new(true, true);

        let span = spans.text_span(&mut graph, &registry, "t1", "t3").unwrap();
        assert_eq!(graph.covered_tokens(span), tokens);

        let single = spans.text_span(&mut graph, &registry, "t2", "t2").unwrap();
        assert_eq!(single, tokens[1]);
    }

    #[test]
    fn test_text_span_single_token_without_shrink() {
        let (mut graph, registry, tokens) = setup();
        let spans = SpanResolver::new(false, true);

        let a = spans.text_span(&mut graph, &registry, "t2", "t2").unwrap();
        let b = spans.text_span(&mut graph, &registry, "t2", "t2").unwrap();
        assert_ne!(a, b);
        assert_eq!(graph.covered_tokens(a), vec![tokens[1]]);
    }

    #[test]
    fn test_text_span_reversed_is_fatal() {
        let (mut graph, registry, _) = setup();
        let spans = SpanResolver::new(true, false);

        assert!(matches!(
            spans.text_span(&mut graph, &registry, "t3", "t1"),
            Err(MappingError::InvalidTextSpan { .. })
        ));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_target_naming_a_span_is_rejected(#[case] shrink: bool) {
        let (mut graph, mut registry, tokens) = setup();
        let sentence = graph.add_span(&tokens).unwrap();
        registry.insert("s1", sentence).unwrap();
        let mut spans = SpanResolver::new(shrink, false);

        assert!(matches!(
            spans.resolve(&mut graph, &registry, "s1"),
            Err(MappingError::InvalidSpanMember { node }) if node == sentence
        ));
        assert!(matches!(
            spans.text_span(&mut graph, &registry, "s1", "s1"),
            Err(MappingError::InvalidSpanMember { .. })
        ));
        assert!(matches!(
            spans.text_span(&mut graph, &registry, "t1", "s1"),
            Err(MappingError::InvalidSpanMember { .. })
        ));
        assert_eq!(graph.spans().count(), 1);
    }

    #[test]
    fn test_forget_drops_memoized_span() {
        let (mut graph, registry, _) = setup();
        let mut spans = SpanResolver::new(false, true);

        let single = spans.resolve(&mut graph, &registry, "t2").unwrap();
        let group = spans.resolve(&mut graph, &registry, "t1 t2").unwrap();
        graph.remove_node(single);
        spans.forget(single);

        let fresh = spans.resolve(&mut graph, &registry, "t2").unwrap();
        assert_ne!(fresh, single);
        assert_eq!(spans.resolve(&mut graph, &registry, "t1 t2").unwrap(), group);
    }
}
