//! TCF import.
//!
//! ## Pipeline
//!
//! ```text
//! quick-xml events   reader::drive
//!   ↓
//! MappingContext     per-tag dispatch, one per document
//!   ├── TokenAligner        token surface → base text range
//!   ├── IdRegistry          document ids → nodes
//!   ├── SpanResolver        token groups → tokens or spans
//!   ├── ConstituentBuilder  syntax trees
//!   ├── ReferenceResolver   coreference chains
//!   └── MetadataFlattener   CMDI header → document metadata
//!   ↓
//! Document           graph and metadata, installed on success
//! ```

pub mod aligner;
pub mod constituents;
pub mod diagnostics;
pub mod dictionary;
pub mod mapper;
pub mod metadata;
pub mod reader;
pub mod references;
pub mod registry;
pub mod spans;

use std::io::BufRead;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity};
pub use mapper::{MappedDocument, MappingContext};

use crate::config::ImporterConfig;
use crate::error::Result;
use crate::graph::{Document, DocumentStatus, LabelKind, Labels, annotate};

/// Maps one TCF document onto a [`Document`].
#[derive(Debug, Default)]
pub struct TcfMapper {
    config: ImporterConfig,
    document: Option<Document>,
    diagnostics: DiagnosticCollector,
}

impl TcfMapper {
    pub fn new(config: ImporterConfig) -> Self {
        Self {
            config,
            document: None,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Map into `document` instead of a fresh, unnamed one.
    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// Stream `input` into the target document.
    ///
    /// The graph and metadata are only installed if the whole input maps
    /// without a fatal error. Diagnostics are kept either way.
    pub fn map_document<R: BufRead>(&mut self, input: R) -> Result<DocumentStatus> {
        let document = self.document.get_or_insert_with(Document::new);
        let mut context = MappingContext::new(self.config, document.name());

        if let Err(err) = reader::drive(input, &mut context) {
            tracing::error!(document = document.name(), error = %err, "mapping failed");
            self.diagnostics = context.into_diagnostics();
            return Err(err);
        }

        let MappedDocument {
            graph,
            meta,
            diagnostics,
        } = context.finish();
        document.set_graph(graph);
        install_meta(document, &meta);
        self.diagnostics = diagnostics;
        Ok(DocumentStatus::Completed)
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Option<Document> {
        self.document
    }

    /// Findings of the last mapping run.
    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }
}

fn install_meta(document: &mut Document, meta: &Labels) {
    for label in meta.meta_annotations() {
        annotate(
            Some(&mut *document),
            label.namespace(),
            Some(label.name()),
            label.value(),
            true,
            LabelKind::Meta,
        );
    }
}

/// Map an in-memory document.
pub fn map_str(xml: &str, config: ImporterConfig) -> Result<Document> {
    map_bytes(xml.as_bytes(), config)
}

pub fn map_bytes(xml: &[u8], config: ImporterConfig) -> Result<Document> {
    let mut mapper = TcfMapper::new(config);
    mapper.map_document(xml)?;
    Ok(mapper.into_document().unwrap_or_default())
}
