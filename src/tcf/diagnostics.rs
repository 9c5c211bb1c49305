//! Non-fatal findings collected while mapping a document.
//!
//! Anything that aborts the mapping is a [`MappingError`](crate::error::MappingError)
//! instead. Every diagnostic is also emitted through `tracing` at the point
//! where it is raised.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::LineCol;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Info,
}

/// A diagnostic message, optionally tied to a source id and text offset.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Diagnostic code (e.g., "W0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Id of the element the finding is about.
    pub id: Option<SmolStr>,
    /// Byte offset into the base text.
    pub offset: Option<usize>,
    pub position: Option<LineCol>,
}

impl Diagnostic {
    pub fn warning(message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            code: None,
            message: message.into(),
            id: None,
            offset: None,
            position: None,
        }
    }

    pub fn info(message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::warning(message)
        }
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(SmolStr::new(id));
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_position(mut self, position: Option<LineCol>) -> Self {
        self.position = position;
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

pub mod codes {
    /// A token surface string was not found in the base text.
    pub const BAD_TOKENIZATION: &str = "W0001";
    /// Declared ids were abandoned for generated ones within a block.
    pub const GENERATED_IDS: &str = "I0001";
}

// ============================================================================
// COLLECTOR
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// A token that could not be aligned against the base text at `cursor`.
    pub fn bad_tokenization(
        &mut self,
        token_id: &str,
        surface: &str,
        cursor: usize,
        position: Option<LineCol>,
    ) {
        tracing::warn!(
            token = token_id,
            surface,
            cursor,
            position = position.map(tracing::field::display),
            "bad tokenization: token not found in the base text, further errors may follow"
        );
        self.add(
            Diagnostic::warning(format!(
                "skipped token '{surface}' (id {token_id}), it could not be found in the base text"
            ))
            .with_code(codes::BAD_TOKENIZATION)
            .with_id(token_id)
            .with_offset(cursor)
            .with_position(position),
        );
    }

    /// A block switched to generated ids at the element with `declared` id.
    pub fn generated_ids(&mut self, element: &str, declared: Option<&str>) {
        let mut diagnostic = Diagnostic::info(format!(
            "<{element}> ids are missing or repeated, using generated ids for the rest of the block"
        ))
        .with_code(codes::GENERATED_IDS);
        if let Some(id) = declared {
            diagnostic = diagnostic.with_id(id);
        }
        self.add(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Diagnostics with the given code.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics
            .iter()
            .filter(move |d| d.code.as_deref() == Some(code))
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_tokenization_is_a_coded_warning() {
        let mut collector = DiagnosticCollector::new();
        collector.bad_tokenization("t3", "snores", 4, Some(LineCol::new(1, 0)));

        assert_eq!(collector.warning_count(), 1);
        let diag = &collector.diagnostics()[0];
        assert_eq!(diag.code.as_deref(), Some(codes::BAD_TOKENIZATION));
        assert_eq!(diag.id.as_deref(), Some("t3"));
        assert_eq!(diag.offset, Some(4));
        assert_eq!(diag.position, Some(LineCol::new(1, 0)));
        assert!(diag.message.contains("snores"));
    }

    #[test]
    fn test_generated_ids_is_informational() {
        let mut collector = DiagnosticCollector::new();
        collector.generated_ids("constituent", None);

        assert!(!collector.has_warnings());
        assert_eq!(collector.with_code(codes::GENERATED_IDS).count(), 1);
    }
}
