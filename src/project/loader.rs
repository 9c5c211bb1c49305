use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ImporterConfig;
use crate::error::{LoadError, MappingError};
use crate::graph::Document;
use crate::tcf::{DiagnosticCollector, TcfMapper};

/// File extensions picked up when walking a corpus directory.
pub const TCF_EXTENSIONS: &[&str] = &["tcf", "xml"];

/// A successfully mapped file.
#[derive(Debug)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub document: Document,
    pub diagnostics: DiagnosticCollector,
}

/// Loads TCF files, one mapper per document.
#[derive(Clone, Copy, Debug, Default)]
pub struct CorpusLoader {
    config: ImporterConfig,
}

impl CorpusLoader {
    pub fn new(config: ImporterConfig) -> Self {
        Self { config }
    }

    /// Map a single file. The document is named after the file stem.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<LoadedDocument, LoadError> {
        let path = path.as_ref();
        self.map_file(path).map_err(|source| LoadError::Mapping {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Map every TCF file below `dir` in parallel.
    ///
    /// Files that fail to map do not stop the others; their errors are
    /// returned next to the loaded documents, both sorted by path.
    pub fn load_directory<P: AsRef<Path>>(
        &self,
        dir: P,
    ) -> Result<(Vec<LoadedDocument>, Vec<LoadError>), LoadError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LoadError::DirectoryNotFound(dir.to_path_buf()));
        }

        let paths = collect_file_paths(dir)?;
        tracing::debug!(dir = %dir.display(), files = paths.len(), "loading corpus");

        let results: Vec<_> = paths.par_iter().map(|path| self.load_file(path)).collect();

        let mut loaded = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(document) => loaded.push(document),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping document");
                    errors.push(err);
                }
            }
        }
        Ok((loaded, errors))
    }

    fn map_file(&self, path: &Path) -> Result<LoadedDocument, MappingError> {
        let input = BufReader::new(File::open(path)?);
        let mut document = Document::new();
        if let Some(stem) = path.file_stem() {
            document.set_name(&stem.to_string_lossy());
        }

        let mut mapper = TcfMapper::new(self.config).with_document(document);
        mapper.map_document(input)?;
        let diagnostics = mapper.diagnostics().clone();
        Ok(LoadedDocument {
            path: path.to_path_buf(),
            document: mapper.into_document().unwrap_or_default(),
            diagnostics,
        })
    }
}

/// All TCF files below `dir`, sorted. Hidden entries are skipped.
pub fn collect_file_paths(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && has_tcf_extension(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn has_tcf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TCF_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}
