//! Loading TCF documents from the file system.

mod loader;

pub use loader::{CorpusLoader, LoadedDocument, TCF_EXTENSIONS, collect_file_paths};
