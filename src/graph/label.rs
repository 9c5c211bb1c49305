//! Annotations, metadata annotations and the upsert primitive.
//!
//! Every label write in the importer goes through [`annotate`], so
//! re-applying the same annotation never produces a second label.

use indexmap::IndexMap;
use smol_str::{SmolStr, format_smolstr};

/// Separator between namespace and name in a qualified label name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Whether a label is a plain annotation or a metadata annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Annotation,
    Meta,
}

/// A `(namespace, name) -> value` entry.
///
/// Labels can carry nested labels, e.g. the operation of an orthographic
/// correction or the lexical-semantic relations of a lemma.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    namespace: Option<SmolStr>,
    name: SmolStr,
    value: Option<String>,
    labels: IndexMap<SmolStr, Label>,
}

impl Label {
    pub fn new(namespace: Option<&str>, name: &str, value: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(SmolStr::new),
            name: SmolStr::new(name),
            value: value.map(str::to_string),
            labels: IndexMap::new(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `namespace::name`, or the bare name without namespace.
    pub fn qualified_name(&self) -> SmolStr {
        qualified_name(self.namespace(), &self.name)
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<&str>) {
        self.value = value.map(str::to_string);
    }

    /// Get a nested label by qualified name.
    pub fn label(&self, qualified: &str) -> Option<&Label> {
        self.labels.get(qualified)
    }

    pub fn label_mut(&mut self, qualified: &str) -> Option<&mut Label> {
        self.labels.get_mut(qualified)
    }

    /// Insert or replace a nested label.
    pub fn add_label(&mut self, label: Label) -> &mut Label {
        let key = label.qualified_name();
        let entry = self.labels.entry(key);
        match entry {
            indexmap::map::Entry::Occupied(mut occupied) => {
                occupied.insert(label);
                occupied.into_mut()
            }
            indexmap::map::Entry::Vacant(vacant) => vacant.insert(label),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }
}

/// Build the qualified name used as label key.
pub fn qualified_name(namespace: Option<&str>, name: &str) -> SmolStr {
    match namespace {
        Some(ns) => format_smolstr!("{ns}{NAMESPACE_SEPARATOR}{name}"),
        None => SmolStr::new(name),
    }
}

/// The annotations and metadata annotations of one item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels {
    annotations: IndexMap<SmolStr, Label>,
    meta: IndexMap<SmolStr, Label>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: LabelKind) -> &IndexMap<SmolStr, Label> {
        match kind {
            LabelKind::Annotation => &self.annotations,
            LabelKind::Meta => &self.meta,
        }
    }

    fn map_mut(&mut self, kind: LabelKind) -> &mut IndexMap<SmolStr, Label> {
        match kind {
            LabelKind::Annotation => &mut self.annotations,
            LabelKind::Meta => &mut self.meta,
        }
    }

    /// Look up a label by qualified name.
    pub fn get(&self, kind: LabelKind, qualified: &str) -> Option<&Label> {
        self.map(kind).get(qualified)
    }

    pub fn get_mut(&mut self, kind: LabelKind, qualified: &str) -> Option<&mut Label> {
        self.map_mut(kind).get_mut(qualified)
    }

    /// Annotation value by qualified name.
    pub fn annotation(&self, qualified: &str) -> Option<&str> {
        self.annotations.get(qualified).and_then(Label::value)
    }

    /// Metadata value by qualified name.
    pub fn meta(&self, qualified: &str) -> Option<&str> {
        self.meta.get(qualified).and_then(Label::value)
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Label> {
        self.annotations.values()
    }

    pub fn meta_annotations(&self) -> impl Iterator<Item = &Label> {
        self.meta.values()
    }

    pub fn len(&self) -> usize {
        self.annotations.len() + self.meta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.meta.is_empty()
    }
}

/// Anything that carries labels: nodes, relations, layers, documents.
pub trait Annotatable {
    fn labels(&self) -> &Labels;
    fn labels_mut(&mut self) -> &mut Labels;
}

impl Annotatable for Labels {
    fn labels(&self) -> &Labels {
        self
    }

    fn labels_mut(&mut self) -> &mut Labels {
        self
    }
}

/// Create or overwrite a label.
///
/// Returns `None` without touching anything when `target` or `name` is
/// absent, or when `value` is absent or empty and `accept_empty` is false.
/// Otherwise the label with the same qualified name gets the new value, or
/// is created.
pub fn annotate<'a, T>(
    target: Option<&'a mut T>,
    namespace: Option<&str>,
    name: Option<&str>,
    value: Option<&str>,
    accept_empty: bool,
    kind: LabelKind,
) -> Option<&'a mut Label>
where
    T: Annotatable + ?Sized,
{
    let target = target?;
    let name = name?;
    if value.is_none_or(str::is_empty) && !accept_empty {
        return None;
    }

    let qualified = qualified_name(namespace, name);
    let map = target.labels_mut().map_mut(kind);
    let label = map
        .entry(qualified)
        .or_insert_with(|| Label::new(namespace, name, None));
    label.set_value(value);
    Some(label)
}

/// Append `value` to a metadata label, joining with `separator` if one exists.
pub fn append_meta<'a, T>(
    target: Option<&'a mut T>,
    name: &str,
    value: &str,
    separator: &str,
) -> Option<&'a mut Label>
where
    T: Annotatable + ?Sized,
{
    let target = target?;
    if value.is_empty() {
        return None;
    }
    let joined = match target.labels().meta(name) {
        Some(existing) => format!("{existing}{separator}{value}"),
        None => value.to_string(),
    };
    annotate(Some(target), None, Some(name), Some(&joined), false, LabelKind::Meta)
}
