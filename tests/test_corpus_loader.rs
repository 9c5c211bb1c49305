//! Loading TCF documents from disk.

use std::fs;
use std::path::Path;

use tcf::project::{CorpusLoader, collect_file_paths};
use tcf::{ImporterConfig, LoadError, MappingError};

const DOCUMENT: &str = r#"<D-Spin><TextCorpus lang="de">
  <text>Max sleeps.</text>
  <tokens><token ID="t1">Max</token><token ID="t2">sleeps</token><token ID="t3">.</token></tokens>
</TextCorpus></D-Spin>"#;

const BROKEN: &str = r#"<TextCorpus><text>a b</text>
  <token ID="t1">a</token><token ID="t1">b</token></TextCorpus>"#;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_load_file_names_document_after_stem() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "max.tcf", DOCUMENT);

    let loaded = CorpusLoader::default()
        .load_file(dir.path().join("max.tcf"))
        .unwrap();

    assert_eq!(loaded.document.name(), Some("max"));
    assert_eq!(loaded.document.meta("document"), Some("max"));
    assert_eq!(loaded.document.graph().unwrap().tokens().count(), 3);
    assert!(loaded.diagnostics.is_empty());
}

#[test]
fn test_load_file_reports_path_of_broken_document() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.xml", BROKEN);

    let err = CorpusLoader::default()
        .load_file(dir.path().join("broken.xml"))
        .unwrap_err();

    match err {
        LoadError::Mapping { path, source } => {
            assert!(path.ends_with("broken.xml"));
            assert!(matches!(source, MappingError::DuplicateId { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CorpusLoader::default()
        .load_file(dir.path().join("absent.tcf"))
        .unwrap_err();

    assert!(matches!(err, LoadError::Mapping { source: MappingError::Io(_), .. }));
}

#[test]
fn test_collect_file_paths_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.tcf", DOCUMENT);
    write(dir.path(), "a.xml", DOCUMENT);
    write(dir.path(), "notes.txt", "not a corpus");
    write(dir.path(), "nested/c.TCF", DOCUMENT);
    write(dir.path(), ".hidden/d.tcf", DOCUMENT);

    let names: Vec<_> = collect_file_paths(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["a.xml", "b.tcf", "nested/c.TCF"]);
}

#[test]
fn test_load_directory_keeps_going_after_failures() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one.tcf", DOCUMENT);
    write(dir.path(), "two.tcf", DOCUMENT);
    write(dir.path(), "zz-broken.tcf", BROKEN);

    let config = ImporterConfig::default().with_ignore_full_text(true);
    let (loaded, errors) = CorpusLoader::new(config).load_directory(dir.path()).unwrap();

    let names: Vec<_> = loaded.iter().map(|l| l.document.name().unwrap()).collect();
    assert_eq!(names, vec!["one", "two"]);
    assert!(loaded.iter().all(|l| l.document.graph().unwrap().text().is_empty()));
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_load_directory_requires_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere");

    assert!(matches!(
        CorpusLoader::default().load_directory(&missing),
        Err(LoadError::DirectoryNotFound(_))
    ));
}
