//! Two-phase construction of coreference edges.
//!
//! Mentions of an entity are collected while the `entity` element is open
//! and linked when it closes, because a mention may point to an antecedent
//! that appears later in the document.

use smol_str::SmolStr;

use super::dictionary::{attr, layer};
use super::registry::{BlockIds, IdRegime, IdRegistry};
use super::spans::SpanResolver;
use crate::base::NodeId;
use crate::error::{MappingError, Result};
use crate::graph::{DocumentGraph, LabelKind, RelationKind, STYPE_REFERENCE, annotate};

/// Prefix of ids generated for mentions without usable declared ids.
pub const GENERATED_PREFIX: &str = "reference-";

/// A mention waiting for its entity to close.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingReference {
    /// The mention every other mention of the entity points to. Only
    /// recorded under generated ids, where declared targets are unusable.
    Antecedent(NodeId),
    /// An edge from `source` to the mentions named in `target_key`.
    PendingEdge {
        source: NodeId,
        target_key: SmolStr,
        label: SmolStr,
    },
}

/// The attributes of one `reference` start tag.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reference<'a> {
    pub id: Option<&'a str>,
    pub token_ids: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub rel: Option<&'a str>,
    pub target: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct ReferenceResolver {
    stack: Vec<PendingReference>,
    ids: BlockIds,
    /// Mention ids of the current block, separate from the token scope.
    mentions: IdRegistry,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            ids: BlockIds::new(GENERATED_PREFIX),
            mentions: IdRegistry::new(),
        }
    }

    /// Start a `references` block.
    pub fn begin_block(&mut self) {
        self.stack.clear();
        self.ids = BlockIds::new(GENERATED_PREFIX);
        self.mentions.clear();
    }

    /// Start an `entity`.
    pub fn begin_entity(&mut self) {
        self.stack.clear();
    }

    pub fn regime(&self) -> IdRegime {
        self.ids.regime()
    }

    pub fn pending(&self) -> &[PendingReference] {
        &self.stack
    }

    /// Node registered for a mention id of the current block.
    pub fn mention(&self, id: &str) -> Option<NodeId> {
        self.mentions.get(id)
    }

    /// Handle a `reference` start tag.
    pub fn reference(
        &mut self,
        graph: &mut DocumentGraph,
        registry: &IdRegistry,
        spans: &mut SpanResolver,
        reference: Reference<'_>,
    ) -> Result<NodeId> {
        let id = self.ids.assign(reference.id);
        let token_ids = reference.token_ids.ok_or(MappingError::MissingAttribute {
            element: "reference",
            attribute: attr::TOKEN_IDS,
        })?;

        let node = spans.resolve(graph, registry, token_ids)?;
        // a mention may take part in several entities, the type is upserted
        annotate(
            graph.node_mut(node),
            Some(layer::REFERENCES),
            Some(attr::TYPE),
            reference.kind,
            false,
            LabelKind::Annotation,
        );
        let references = graph.layer_or_create(layer::REFERENCES);
        graph.add_node_to_layer(references, node)?;
        self.mentions.insert(&id, node)?;

        match reference.rel {
            Some(rel) => self.stack.push(PendingReference::PendingEdge {
                source: node,
                target_key: SmolStr::new(reference.target.unwrap_or_default()),
                label: SmolStr::new(rel),
            }),
            None if self.regime() == IdRegime::UsingGeneratedIds => {
                self.stack.push(PendingReference::Antecedent(node));
            }
            None => {}
        }
        Ok(node)
    }

    /// Handle an `entity` end tag: link the pending mentions, last first.
    ///
    /// Returns the number of edges created.
    pub fn close_entity(&mut self, graph: &mut DocumentGraph) -> Result<usize> {
        let mut created = 0;
        let mut antecedent = None;

        while let Some(pending) = self.stack.pop() {
            let (source, target_key, label) = match pending {
                PendingReference::Antecedent(node) => {
                    antecedent = Some(node);
                    continue;
                }
                PendingReference::PendingEdge {
                    source,
                    target_key,
                    label,
                } => (source, target_key, label),
            };

            if self.regime() == IdRegime::UsingGeneratedIds {
                let target = antecedent.ok_or(MappingError::MissingReferenceTarget {
                    source_node: source,
                })?;
                created += usize::from(link(graph, source, target, &label)?);
                continue;
            }

            if target_key.split_whitespace().next().is_none() {
                return Err(MappingError::MissingReferenceTarget {
                    source_node: source,
                });
            }
            for id in target_key.split_whitespace() {
                let target = self.mentions.resolve(id)?;
                if target == source {
                    continue;
                }
                created += usize::from(link(graph, source, target, &label)?);
            }
        }
        Ok(created)
    }
}

/// Add a reference edge unless the same one already exists.
fn link(graph: &mut DocumentGraph, source: NodeId, target: NodeId, label: &str) -> Result<bool> {
    if graph.has_relation(source, target, RelationKind::Pointing, Some(STYPE_REFERENCE)) {
        return Ok(false);
    }
    let rel = graph.add_relation(RelationKind::Pointing, source, target)?;
    if let Some(relation) = graph.relation_mut(rel) {
        relation.set_stype(STYPE_REFERENCE);
    }
    annotate(
        graph.relation_mut(rel),
        Some(layer::REFERENCES),
        Some(attr::REL),
        Some(label),
        false,
        LabelKind::Annotation,
    );
    let references = graph.layer_or_create(layer::REFERENCES);
    graph.add_relation_to_layer(references, rel);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::text_range;
    use crate::graph::Annotatable;

    struct Fixture {
        graph: DocumentGraph,
        registry: IdRegistry,
        spans: SpanResolver,
        resolver: ReferenceResolver,
        tokens: Vec<NodeId>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut graph = DocumentGraph::new();
            graph.append_text("Max said he slept");
            let mut registry = IdRegistry::new();
            let mut tokens = Vec::new();
            for (i, (s, e)) in [(0, 3), (4, 8), (9, 11), (12, 17)].into_iter().enumerate() {
                let token = graph.add_token(text_range(s, e));
                registry.insert(&format!("t{}", i + 1), token).unwrap();
                tokens.push(token);
            }
            let mut resolver = ReferenceResolver::new();
            resolver.begin_block();
            Self {
                graph,
                registry,
                spans: SpanResolver::new(true, false),
                resolver,
                tokens,
            }
        }

        fn reference(
            &mut self,
            id: Option<&str>,
            token_ids: &str,
            rel: Option<&str>,
            target: Option<&str>,
        ) -> Result<NodeId> {
            self.resolver.reference(
                &mut self.graph,
                &self.registry,
                &mut self.spans,
                Reference {
                    id,
                    token_ids: Some(token_ids),
                    kind: Some("pro"),
                    rel,
                    target,
                },
            )
        }

        fn reference_edges(&self) -> Vec<(NodeId, NodeId)> {
            self.graph
                .relations()
                .filter(|(_, r)| r.stype() == Some(STYPE_REFERENCE))
                .map(|(_, r)| (r.source(), r.target()))
                .collect()
        }
    }

    #[test]
    fn test_declared_ids_link_to_target() {
        let mut f = Fixture::new();
        f.resolver.begin_entity();
        f.reference(Some("rc1"), "t1", None, None).unwrap();
        f.reference(Some("rc2"), "t3", Some("anaphoric"), Some("rc1")).unwrap();

        assert_eq!(f.resolver.close_entity(&mut f.graph).unwrap(), 1);
        assert_eq!(f.reference_edges(), vec![(f.tokens[2], f.tokens[0])]);

        let (rel, _) = f.graph.relations().next().unwrap();
        let rel = f.graph.relation(rel).unwrap();
        assert_eq!(rel.labels().annotation("references::rel"), Some("anaphoric"));
        let layer = f.graph.layer_by_name("references").unwrap();
        assert!(layer.contains_node(f.tokens[0]));
        assert_eq!(layer.relations().count(), 1);
    }

    #[test]
    fn test_target_may_follow_source() {
        let mut f = Fixture::new();
        f.resolver.begin_entity();
        f.reference(Some("rc2"), "t3", Some("cataphoric"), Some("rc1")).unwrap();
        f.reference(Some("rc1"), "t1", None, None).unwrap();

        f.resolver.close_entity(&mut f.graph).unwrap();
        assert_eq!(f.reference_edges(), vec![(f.tokens[2], f.tokens[0])]);
    }

    #[test]
    fn test_duplicate_edges_are_skipped() {
        let mut f = Fixture::new();
        f.resolver.begin_entity();
        f.reference(Some("rc1"), "t1", None, None).unwrap();
        f.reference(Some("rc2"), "t3", Some("anaphoric"), Some("rc1")).unwrap();
        f.resolver.close_entity(&mut f.graph).unwrap();

        // the same mention pair again in a second entity
        f.resolver.begin_entity();
        f.reference(Some("rc3"), "t1", None, None).unwrap();
        f.reference(Some("rc4"), "t3", Some("anaphoric"), Some("rc3")).unwrap();
        assert_eq!(f.resolver.close_entity(&mut f.graph).unwrap(), 0);

        assert_eq!(f.reference_edges().len(), 1);
    }

    #[test]
    fn test_self_loops_are_skipped() {
        let mut f = Fixture::new();
        f.resolver.begin_entity();
        f.reference(Some("rc1"), "t1", Some("anaphoric"), Some("rc1")).unwrap();

        assert_eq!(f.resolver.close_entity(&mut f.graph).unwrap(), 0);
    }

    #[test]
    fn test_unknown_target_is_fatal() {
        let mut f = Fixture::new();
        f.resolver.begin_entity();
        f.reference(Some("rc1"), "t1", Some("anaphoric"), Some("rc9")).unwrap();

        assert!(matches!(
            f.resolver.close_entity(&mut f.graph),
            Err(MappingError::UnresolvedId { ref id }) if id == "rc9"
        ));
    }

    #[test]
    fn test_generated_ids_link_to_antecedent() {
        let mut f = Fixture::new();
        f.resolver.begin_entity();
        f.reference(None, "t3", Some("anaphoric"), Some("whatever")).unwrap();
        f.reference(None, "t1", None, None).unwrap();

        assert_eq!(f.resolver.regime(), IdRegime::UsingGeneratedIds);
        assert_eq!(f.resolver.mention("reference-1"), Some(f.tokens[0]));
        assert_eq!(f.resolver.close_entity(&mut f.graph).unwrap(), 1);
        assert_eq!(f.reference_edges(), vec![(f.tokens[2], f.tokens[0])]);
    }

    #[test]
    fn test_generated_ids_without_antecedent_is_fatal() {
        let mut f = Fixture::new();
        f.resolver.begin_entity();
        f.reference(None, "t3", Some("anaphoric"), None).unwrap();
        // drained last first, so t4 is linked before the antecedent is known
        f.reference(None, "t1", None, None).unwrap();
        f.reference(None, "t4", Some("anaphoric"), None).unwrap();

        assert!(matches!(
            f.resolver.close_entity(&mut f.graph),
            Err(MappingError::MissingReferenceTarget { source_node }) if source_node == f.tokens[3]
        ));
    }

    #[test]
    fn test_block_resets_regime_and_counter() {
        let mut f = Fixture::new();
        f.reference(None, "t1", None, None).unwrap();
        f.resolver.begin_block();

        assert_eq!(f.resolver.regime(), IdRegime::UsingDeclaredIds);
        assert_eq!(f.resolver.mention("reference-0"), None);
        f.reference(None, "t2", None, None).unwrap();
        assert_eq!(f.resolver.mention("reference-0"), Some(f.tokens[1]));
    }

    #[test]
    fn test_missing_token_ids_is_fatal() {
        let mut f = Fixture::new();
        let err = f
            .resolver
            .reference(
                &mut f.graph,
                &f.registry,
                &mut f.spans,
                Reference { id: Some("rc1"), ..Reference::default() },
            )
            .unwrap_err();
        assert!(matches!(err, MappingError::MissingAttribute { attribute: "tokenIDs", .. }));
    }
}
