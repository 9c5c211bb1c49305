//! Per-document event dispatch.
//!
//! [`MappingContext`] owns every piece of state needed while one document
//! streams by: the graph under construction, the registries, the structural
//! stacks and the text cursor. It is created fresh for each document and
//! consumed by [`MappingContext::finish`].

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::aligner::{Alignment, TokenAligner};
use super::constituents::{Constituent, ConstituentBuilder};
use super::diagnostics::DiagnosticCollector;
use super::dictionary::{ANNO_LEMMA, ANNO_POS, META_DOCUMENT, NS_SALT, NS_SEGMENT, Tag, attr, layer};
use super::metadata::MetadataFlattener;
use super::reader::{Attributes, EventHandler};
use super::references::{Reference, ReferenceResolver};
use super::registry::{IdRegistry, canonical_group};
use super::spans::SpanResolver;
use crate::base::{LineCol, LineIndex, NodeId, TextSize, text_range};
use crate::config::ImporterConfig;
use crate::error::{MappingError, Result};
use crate::graph::{
    Annotatable, DocumentGraph, Label, LabelKind, Labels, Node, RelationKind, STYPE_DEPENDENCY,
    annotate, qualified_name,
};

/// What a finished mapping hands back.
#[derive(Debug)]
pub struct MappedDocument {
    pub graph: DocumentGraph,
    /// Document-level metadata.
    pub meta: Labels,
    pub diagnostics: DiagnosticCollector,
}

pub struct MappingContext {
    config: ImporterConfig,
    name: Option<SmolStr>,
    graph: DocumentGraph,
    meta: Labels,

    /// Open elements, innermost last.
    path: Vec<Tag>,
    /// Character data of the innermost element.
    chars: String,

    aligner: TokenAligner,
    registry: IdRegistry,
    spans: SpanResolver,
    constituents: ConstituentBuilder,
    references: ReferenceResolver,
    metadata: MetadataFlattener,

    /// Node the next text-valued annotation goes to.
    current: Option<NodeId>,
    /// Declared id of the open token or lemma.
    current_id: Option<SmolStr>,
    /// Feature name of the open morphological `f`.
    feature: Option<SmolStr>,
    /// Lemma annotation ids, for lexical-semantic references.
    lemmas: FxHashMap<SmolStr, NodeId>,
    /// Lemmas named by the open `orthform`, and their relation.
    orthform: Vec<NodeId>,
    relation: Option<Tag>,
    /// Placeholder tokens of failed alignments, removed at the end.
    trash: Vec<NodeId>,
    /// Line starts of the base text, built on the first bad token.
    lines: Option<LineIndex>,

    diagnostics: DiagnosticCollector,
}

impl MappingContext {
    pub fn new(config: ImporterConfig, name: Option<&str>) -> Self {
        Self {
            config,
            name: name.map(SmolStr::new),
            graph: DocumentGraph::new(),
            meta: Labels::new(),
            path: Vec::new(),
            chars: String::new(),
            aligner: TokenAligner::new(),
            registry: IdRegistry::new(),
            spans: SpanResolver::from_config(&config),
            constituents: ConstituentBuilder::new(),
            references: ReferenceResolver::new(),
            metadata: MetadataFlattener::new(),
            current: None,
            current_id: None,
            feature: None,
            lemmas: FxHashMap::default(),
            orthform: Vec::new(),
            relation: None,
            trash: Vec::new(),
            lines: None,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn graph(&self) -> &DocumentGraph {
        &self.graph
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> DiagnosticCollector {
        self.diagnostics
    }

    /// Drop leftover placeholders and hand out the result.
    pub fn finish(mut self) -> MappedDocument {
        self.prune_placeholders();
        tracing::info!(
            document = self.name.as_deref(),
            nodes = self.graph.node_count(),
            relations = self.graph.relation_count(),
            layers = self.graph.layers().count(),
            warnings = self.diagnostics.warning_count(),
            "mapped document"
        );
        MappedDocument {
            graph: self.graph,
            meta: self.meta,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // START TAGS
    // ========================================================================

    fn start(&mut self, tag: Tag, parent: Option<Tag>, attrs: &Attributes) -> Result<()> {
        match tag {
            Tag::TextCorpus => {
                self.set_meta(attr::LANG, attrs.get(attr::LANG));
                let name = self.name.clone();
                self.set_meta(META_DOCUMENT, name.as_deref());
            }
            Tag::Text => {
                self.aligner.reset();
                self.lines = None;
            }
            Tag::Token => {
                let id = required(attrs, tag, attr::ID)?;
                self.current_id = Some(SmolStr::new(id));
            }
            Tag::Sentences => {
                self.graph.layer_or_create(layer::SENTENCES);
            }
            Tag::Sentence => self.sentence(attrs)?,
            Tag::Lemmas => {
                self.graph.layer_or_create(layer::LEMMA);
            }
            Tag::Lemma => {
                let node = self.target(attrs, tag, attr::TOKEN_IDS, layer::LEMMA)?;
                self.current = Some(node);
                self.current_id = attrs.get(attr::ID).map(SmolStr::new);
            }
            Tag::PosTags => self.layer_meta(layer::POS, attr::TAGSET, attrs.get(attr::TAGSET)),
            Tag::Tag if parent == Some(Tag::PosTags) => {
                let node = self.target(attrs, tag, attr::TOKEN_IDS, layer::POS)?;
                self.current = Some(node);
            }
            Tag::Morphology => {
                self.graph.layer_or_create(layer::MORPHOLOGY);
            }
            Tag::Analysis => {
                let node = self.target(attrs, tag, attr::TOKEN_IDS, layer::MORPHOLOGY)?;
                self.current = Some(node);
            }
            Tag::F => self.feature = attrs.get(attr::NAME).map(SmolStr::new),
            Tag::Segment => {
                self.annotate_current(Some(NS_SEGMENT), attr::TYPE, attrs.get(attr::TYPE));
            }
            Tag::Parsing => {
                self.layer_meta(layer::CONSTITUENTS, attr::TAGSET, attrs.get(attr::TAGSET));
                self.constituents.begin_block();
            }
            Tag::Parse => self.constituents.begin_parse(),
            Tag::Constituent => self.constituent(attrs)?,
            Tag::DepParsing => {
                self.layer_meta(layer::DEPENDENCIES, attr::TAGSET, attrs.get(attr::TAGSET))
            }
            Tag::Dependency => self.dependency(attrs)?,
            Tag::References => {
                self.layer_meta(layer::REFERENCES, attr::TYPE_TAGSET, attrs.get(attr::TYPE_TAGSET));
                self.layer_meta(layer::REFERENCES, attr::REL_TAGSET, attrs.get(attr::REL_TAGSET));
                self.references.begin_block();
            }
            Tag::Entity if parent == Some(Tag::NamedEntities) => {
                let node = self.target(attrs, tag, attr::TOKEN_IDS, layer::NAMED_ENTITIES)?;
                self.annotate_node(node, layer::NAMED_ENTITIES, attr::CLASS, attrs.get(attr::CLASS));
            }
            Tag::Entity if parent == Some(Tag::References) => self.references.begin_entity(),
            Tag::Reference => self.reference(attrs)?,
            Tag::NamedEntities => {
                self.layer_meta(layer::NAMED_ENTITIES, attr::TYPE, attrs.get(attr::TYPE))
            }
            Tag::Phonetics => self.layer_meta(
                layer::PHONETICS,
                attr::TRANSCRIPTION,
                attrs.get(attr::TRANSCRIPTION),
            ),
            Tag::Pron => {
                let node = self.target(attrs, tag, attr::TOK_ID, layer::PHONETICS)?;
                self.current = Some(node);
            }
            Tag::Orthography => {
                self.graph.layer_or_create(layer::ORTHOGRAPHY);
            }
            Tag::Correction => self.correction(attrs)?,
            Tag::Geo => {
                for (name, value) in attrs.iter() {
                    self.layer_meta(layer::GEO, name, Some(value));
                }
                self.graph.layer_or_create(layer::GEO);
            }
            Tag::GPoint => {
                let node = self.target(attrs, tag, attr::TOKEN_IDS, layer::GEO)?;
                for name in [
                    attr::ALT,
                    attr::LAT,
                    attr::LON,
                    attr::CONTINENT,
                    attr::COUNTRY,
                    attr::CAPITAL,
                ] {
                    self.annotate_node(node, layer::GEO, name, attrs.get(name));
                }
            }
            Tag::Synonymy | Tag::Antonymy | Tag::Hyponymy | Tag::Hyperonymy => {
                self.graph.layer_or_create(layer::LEXICAL_SEMANTICS);
            }
            Tag::Orthform => self.orthform(attrs)?,
            Tag::WordSenses => self.layer_meta(layer::WORD_SENSE, attr::SRC, attrs.get(attr::SRC)),
            Tag::Ws => {
                let node = self.target(attrs, tag, attr::TOKEN_IDS, layer::WORD_SENSE)?;
                self.annotate_node(node, layer::WORD_SENSE, attr::LEX_UNITS, attrs.get(attr::LEX_UNITS));
                self.annotate_node(node, layer::WORD_SENSE, attr::COMMENT, attrs.get(attr::COMMENT));
            }
            Tag::WordSplittings => {
                self.layer_meta(layer::SPLITTINGS, attr::TYPE, attrs.get(attr::TYPE))
            }
            Tag::Split => {
                let node = self.target(attrs, tag, attr::TOK_ID, layer::SPLITTINGS)?;
                self.current = Some(node);
            }
            Tag::DiscourseConnectives => {
                self.layer_meta(layer::DISCOURSE, attr::TAGSET, attrs.get(attr::TAGSET))
            }
            Tag::Connective => {
                let node = self.target(attrs, tag, attr::TOKEN_IDS, layer::DISCOURSE)?;
                self.annotate_node(node, layer::DISCOURSE, attr::TYPE, attrs.get(attr::TYPE));
            }
            Tag::TextStructure => {
                self.graph.layer_or_create(layer::TEXT_STRUCTURE);
            }
            Tag::TextSpan => self.text_span(attrs)?,
            _ => {
                self.metadata.start(&mut self.meta, tag, parent, attrs);
            }
        }
        Ok(())
    }

    fn sentence(&mut self, attrs: &Attributes) -> Result<()> {
        let token_ids = required(attrs, Tag::Sentence, attr::TOKEN_IDS)?;
        let tokens = self.registry.resolve_group(token_ids)?;
        let span = self.graph.add_span(&tokens)?;
        self.annotate_node(span, "", Tag::Sentence.as_str(), Some(Tag::Sentence.as_str()));
        self.join(layer::SENTENCES, span)?;
        if let Some(id) = attrs.get(attr::ID) {
            self.registry.insert(id, span)?;
        }
        Ok(())
    }

    fn constituent(&mut self, attrs: &Attributes) -> Result<()> {
        let before = self.constituents.regime();
        let constituent = Constituent {
            id: attrs.get(attr::ID),
            cat: attrs.get(attr::CAT),
            token_ids: attrs.get(attr::TOKEN_IDS),
        };
        self.constituents.open(
            &mut self.graph,
            &mut self.registry,
            &mut self.spans,
            constituent,
        )?;
        if self.constituents.regime() != before {
            self.diagnostics
                .generated_ids(Tag::Constituent.as_str(), constituent.id);
        }
        Ok(())
    }

    fn dependency(&mut self, attrs: &Attributes) -> Result<()> {
        // ungoverned tokens have no edge
        let Some(governor) = attrs.get(attr::GOV_IDS) else {
            return Ok(());
        };
        let dependent = required(attrs, Tag::Dependency, attr::DEP_IDS)?;
        let source = self.endpoint(governor)?;
        let target = self.endpoint(dependent)?;

        let rel = self.graph.add_relation(RelationKind::Pointing, source, target)?;
        if let Some(relation) = self.graph.relation_mut(rel) {
            relation.set_stype(STYPE_DEPENDENCY);
        }
        annotate(
            self.graph.relation_mut(rel),
            Some(layer::DEPENDENCIES),
            Some(attr::FUNC),
            attrs.get(attr::FUNC),
            false,
            LabelKind::Annotation,
        );
        let layer = self.graph.layer_or_create(layer::DEPENDENCIES);
        self.graph.add_relation_to_layer(layer, rel);
        Ok(())
    }

    /// A dependency end point: the token itself, or a span for a group.
    fn endpoint(&mut self, ids: &str) -> Result<NodeId> {
        let key = canonical_group(ids);
        if key.contains(' ') {
            self.spans.resolve(&mut self.graph, &self.registry, &key)
        } else {
            self.registry.resolve(&key)
        }
    }

    fn reference(&mut self, attrs: &Attributes) -> Result<()> {
        let before = self.references.regime();
        let reference = Reference {
            id: attrs.get(attr::ID),
            token_ids: attrs.get(attr::TOKEN_IDS),
            kind: attrs.get(attr::TYPE),
            rel: attrs.get(attr::REL),
            target: attrs.get(attr::TARGET),
        };
        self.references
            .reference(&mut self.graph, &self.registry, &mut self.spans, reference)?;
        if self.references.regime() != before {
            self.diagnostics
                .generated_ids(Tag::Reference.as_str(), reference.id);
        }
        Ok(())
    }

    fn correction(&mut self, attrs: &Attributes) -> Result<()> {
        let node = self.target(attrs, Tag::Correction, attr::TOKEN_IDS, layer::ORTHOGRAPHY)?;
        let correction = annotate(
            self.graph.node_mut(node),
            Some(layer::ORTHOGRAPHY),
            Some(Tag::Correction.as_str()),
            None,
            true,
            LabelKind::Annotation,
        );
        if let (Some(correction), Some(operation)) = (correction, attrs.get(attr::OPERATION)) {
            correction.add_label(Label::new(
                Some(layer::ORTHOGRAPHY),
                attr::OPERATION,
                Some(operation),
            ));
        }
        self.current = Some(node);
        Ok(())
    }

    fn orthform(&mut self, attrs: &Attributes) -> Result<()> {
        self.orthform.clear();
        // innermost lexical relation, the orthform itself is the last entry
        self.relation = self
            .path
            .iter()
            .rev()
            .copied()
            .find(|tag| tag.is_lexical_relation());
        let Some(relation) = self.relation else {
            return Ok(());
        };
        let refs = required(attrs, Tag::Orthform, attr::LEMMA_REFS)?;
        let lexical = self.graph.layer_or_create(layer::LEXICAL_SEMANTICS);

        for id in refs.split_whitespace() {
            let node = *self
                .lemmas
                .get(id)
                .ok_or_else(|| MappingError::UnknownLabel { id: SmolStr::new(id) })?;
            let lemma = self
                .graph
                .node_mut(node)
                .and_then(|n| n.labels_mut().get_mut(LabelKind::Annotation, &lemma_key()))
                .ok_or_else(|| MappingError::UnknownLabel { id: SmolStr::new(id) })?;
            lemma.add_label(Label::new(Some(layer::LEXICAL_SEMANTICS), relation.as_str(), None));
            self.graph.add_node_to_layer(lexical, node)?;
            self.orthform.push(node);
        }
        Ok(())
    }

    fn text_span(&mut self, attrs: &Attributes) -> Result<()> {
        let (Some(start), Some(end)) = (attrs.get(attr::START), attrs.get(attr::END)) else {
            return Ok(());
        };
        let node = self
            .spans
            .text_span(&mut self.graph, &self.registry, start, end)?;
        self.annotate_node(node, layer::TEXT_STRUCTURE, attr::TYPE, attrs.get(attr::TYPE));
        self.join(layer::TEXT_STRUCTURE, node)
    }

    // ========================================================================
    // END TAGS
    // ========================================================================

    fn end(&mut self, tag: Tag, parent: Option<Tag>, text: &str) -> Result<()> {
        match tag {
            Tag::Text => {
                if !self.config.ignore_full_text {
                    self.graph.append_text(text);
                    self.lines = None;
                }
            }
            Tag::Token => self.token(text)?,
            Tag::Lemma => {
                self.annotate_current(Some(NS_SALT), ANNO_LEMMA, Some(text));
                if let (Some(id), Some(node)) = (self.current_id.take(), self.current) {
                    self.lemmas.insert(id, node);
                }
            }
            Tag::Tag if parent == Some(Tag::PosTags) => {
                self.annotate_current(Some(NS_SALT), ANNO_POS, Some(text));
            }
            Tag::F => {
                let feature = self.feature.take();
                if let Some(feature) = feature {
                    self.annotate_current(Some(layer::MORPHOLOGY), &feature, Some(text));
                }
            }
            Tag::Constituent => {
                self.constituents.close();
            }
            Tag::Entity if parent == Some(Tag::References) => {
                self.references.close_entity(&mut self.graph)?;
            }
            Tag::Pron => self.annotate_current(Some(layer::PHONETICS), Tag::Pron.as_str(), Some(text)),
            Tag::Correction => {
                if let Some(node) = self.current_node() {
                    annotate(
                        Some(node),
                        Some(layer::ORTHOGRAPHY),
                        Some(Tag::Correction.as_str()),
                        Some(text),
                        true,
                        LabelKind::Annotation,
                    );
                }
            }
            Tag::Src if parent == Some(Tag::Geo) => {
                self.layer_meta(layer::GEO, Tag::Src.as_str(), Some(text));
            }
            Tag::Orthform => self.close_orthform(text),
            Tag::Split => {
                self.annotate_current(Some(layer::SPLITTINGS), Tag::Split.as_str(), Some(text))
            }
            Tag::TextCorpus => self.prune_placeholders(),
            _ => {
                self.metadata.end(&mut self.meta, tag, parent, text);
            }
        }
        Ok(())
    }

    fn token(&mut self, surface: &str) -> Result<()> {
        let id = self.current_id.take().ok_or(MappingError::MissingAttribute {
            element: Tag::Token.as_str(),
            attribute: attr::ID,
        })?;

        let token = if self.config.ignore_full_text {
            self.graph.add_token(None)
        } else {
            match self.aligner.align(self.graph.text(), surface) {
                Alignment::Aligned { start, end } => {
                    let range = text_range(start, end).ok_or(MappingError::TextTooLarge)?;
                    self.graph.add_token(Some(range))
                }
                Alignment::Mismatch => {
                    let cursor = self.aligner.cursor();
                    let position = self.line_col(cursor);
                    self.diagnostics.bad_tokenization(&id, surface, cursor, position);
                    // kept until the end so annotations can still target it
                    let placeholder = self.graph.add_token(None);
                    self.trash.push(placeholder);
                    placeholder
                }
            }
        };
        self.registry.insert(&id, token)
    }

    fn close_orthform(&mut self, text: &str) {
        let Some(relation) = self.relation.take() else {
            return;
        };
        let qualified = qualified_name(Some(layer::LEXICAL_SEMANTICS), relation.as_str());
        for node in std::mem::take(&mut self.orthform) {
            let label = self
                .graph
                .node_mut(node)
                .and_then(|n| n.labels_mut().get_mut(LabelKind::Annotation, &lemma_key()))
                .and_then(|lemma| lemma.label_mut(&qualified));
            if let Some(label) = label {
                label.set_value(Some(text).filter(|t| !t.is_empty()));
            }
        }
    }

    fn line_col(&mut self, offset: usize) -> Option<LineCol> {
        let offset = TextSize::try_from(offset).ok()?;
        let text = self.graph.text();
        let lines = self.lines.get_or_insert_with(|| LineIndex::new(text));
        Some(lines.line_col(offset))
    }

    /// Remove placeholder tokens, and every span left covering nothing.
    fn prune_placeholders(&mut self) {
        for token in std::mem::take(&mut self.trash) {
            let spans = self.graph.covering_spans(token);
            self.graph.remove_node(token);
            for span in spans {
                if self.graph.covered_tokens(span).is_empty() {
                    self.graph.remove_node(span);
                    self.spans.forget(span);
                }
            }
        }
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    /// Resolve the id group in `attribute` and add the node to `layer`.
    fn target(
        &mut self,
        attrs: &Attributes,
        tag: Tag,
        attribute: &'static str,
        layer: &str,
    ) -> Result<NodeId> {
        let ids = required(attrs, tag, attribute)?;
        let node = self.spans.resolve(&mut self.graph, &self.registry, ids)?;
        self.join(layer, node)?;
        Ok(node)
    }

    fn join(&mut self, layer: &str, node: NodeId) -> Result<()> {
        let layer = self.graph.layer_or_create(layer);
        self.graph.add_node_to_layer(layer, node)
    }

    fn current_node(&mut self) -> Option<&mut Node> {
        match self.current {
            Some(node) => self.graph.node_mut(node),
            None => None,
        }
    }

    fn annotate_current(&mut self, namespace: Option<&str>, name: &str, value: Option<&str>) {
        annotate(
            self.current_node(),
            namespace,
            Some(name),
            value,
            false,
            LabelKind::Annotation,
        );
    }

    /// Annotate `node`; an empty `namespace` means none.
    fn annotate_node(&mut self, node: NodeId, namespace: &str, name: &str, value: Option<&str>) {
        annotate(
            self.graph.node_mut(node),
            Some(namespace).filter(|ns| !ns.is_empty()),
            Some(name),
            value,
            false,
            LabelKind::Annotation,
        );
    }

    fn layer_meta(&mut self, layer: &str, name: &str, value: Option<&str>) {
        let layer = self.graph.layer_or_create(layer);
        annotate(
            self.graph.layer_mut(layer),
            None,
            Some(name),
            value,
            false,
            LabelKind::Meta,
        );
    }

    fn set_meta(&mut self, name: &str, value: Option<&str>) {
        annotate(Some(&mut self.meta), None, Some(name), value, false, LabelKind::Meta);
    }
}

impl EventHandler for MappingContext {
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        let tag = Tag::from_local_name(name);
        let parent = self.path.last().copied();
        self.chars.clear();
        self.path.push(tag);
        self.start(tag, parent, attributes)
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        let tag = Tag::from_local_name(name);
        self.path.pop();
        let parent = self.path.last().copied();
        let text = std::mem::take(&mut self.chars);
        self.end(tag, parent, &text)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        // pretty-printing between elements
        if text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r')) {
            return Ok(());
        }
        self.chars.push_str(text);
        Ok(())
    }
}

fn required<'a>(attrs: &'a Attributes, tag: Tag, attribute: &'static str) -> Result<&'a str> {
    attrs.get(attribute).ok_or(MappingError::MissingAttribute {
        element: tag.as_str(),
        attribute,
    })
}

fn lemma_key() -> SmolStr {
    qualified_name(Some(NS_SALT), ANNO_LEMMA)
}
