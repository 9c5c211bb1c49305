//! Document-local identifiers and the nodes they name.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::{SmolStr, format_smolstr};

use crate::base::NodeId;
use crate::error::{MappingError, Result};

/// Maps identifiers from the source document to graph nodes.
///
/// Identifiers are unique: registering one twice is a fatal data error.
#[derive(Clone, Debug, Default)]
pub struct IdRegistry {
    nodes: FxHashMap<SmolStr, NodeId>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` for `node`.
    pub fn insert(&mut self, id: &str, node: NodeId) -> Result<()> {
        if self.nodes.contains_key(id) {
            return Err(MappingError::DuplicateId { id: SmolStr::new(id) });
        }
        self.nodes.insert(SmolStr::new(id), node);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.nodes.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up `id`, failing if it is unknown.
    pub fn resolve(&self, id: &str) -> Result<NodeId> {
        self.get(id)
            .ok_or_else(|| MappingError::UnresolvedId { id: SmolStr::new(id) })
    }

    /// Resolve every identifier of a whitespace-separated group.
    pub fn resolve_group(&self, group: &str) -> Result<Vec<NodeId>> {
        group.split_whitespace().map(|id| self.resolve(id)).collect()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Canonical form of an identifier group: ids separated by single spaces.
pub fn canonical_group(key: &str) -> SmolStr {
    let mut ids = key.split_whitespace();
    let Some(first) = ids.next() else {
        return SmolStr::default();
    };
    ids.fold(SmolStr::new(first), |acc, id| format_smolstr!("{acc} {id}"))
}

/// Which identifiers a block uses for its nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdRegime {
    #[default]
    UsingDeclaredIds,
    UsingGeneratedIds,
}

/// Per-block identifier bookkeeping with a one-way fallback to generated ids.
///
/// The block switches to generated ids the first time a declared id is
/// missing or repeats an id already declared in the same block. The switch
/// holds until [`BlockIds::reset`] starts the next block.
#[derive(Clone, Debug)]
pub struct BlockIds {
    regime: IdRegime,
    prefix: &'static str,
    next: u32,
    declared: FxHashSet<SmolStr>,
}

impl BlockIds {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            regime: IdRegime::UsingDeclaredIds,
            prefix,
            next: 0,
            declared: FxHashSet::default(),
        }
    }

    pub fn regime(&self) -> IdRegime {
        self.regime
    }

    /// Start a new block: back to declared ids.
    ///
    /// The counter keeps running so generated ids never repeat within a
    /// document.
    pub fn reset(&mut self) {
        self.regime = IdRegime::UsingDeclaredIds;
        self.declared.clear();
    }

    /// Pick the id for the next node of the block.
    pub fn assign(&mut self, declared: Option<&str>) -> SmolStr {
        if self.regime == IdRegime::UsingDeclaredIds {
            match declared {
                Some(id) if !self.declared.contains(id) => {
                    let id = SmolStr::new(id);
                    self.declared.insert(id.clone());
                    return id;
                }
                _ => {
                    tracing::debug!(
                        prefix = self.prefix,
                        declared,
                        "switching to generated ids for the rest of the block"
                    );
                    self.regime = IdRegime::UsingGeneratedIds;
                }
            }
        }
        let id = format_smolstr!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_is_fatal() {
        let mut registry = IdRegistry::new();
        registry.insert("t1", NodeId::new(0)).unwrap();

        let err = registry.insert("t1", NodeId::new(1)).unwrap_err();
        assert!(matches!(err, MappingError::DuplicateId { ref id } if id == "t1"));
        assert_eq!(registry.get("t1"), Some(NodeId::new(0)));
    }

    #[test]
    fn test_resolve_group() {
        let mut registry = IdRegistry::new();
        registry.insert("t1", NodeId::new(0)).unwrap();
        registry.insert("t2", NodeId::new(1)).unwrap();

        assert_eq!(
            registry.resolve_group(" t1  t2 ").unwrap(),
            vec![NodeId::new(0), NodeId::new(1)]
        );
        assert!(matches!(
            registry.resolve_group("t1 t3"),
            Err(MappingError::UnresolvedId { ref id }) if id == "t3"
        ));
    }

    #[test]
    fn test_canonical_group() {
        assert_eq!(canonical_group("t1   t2\tt3 "), "t1 t2 t3");
        assert_eq!(canonical_group(" t1 "), "t1");
        assert_eq!(canonical_group("  "), "");
    }

    #[test]
    fn test_block_ids_switch_on_missing_id() {
        let mut ids = BlockIds::new("c");
        assert_eq!(ids.assign(Some("s1")), "s1");
        assert_eq!(ids.assign(None), "c0");
        assert_eq!(ids.regime(), IdRegime::UsingGeneratedIds);
        // sticky for the rest of the block
        assert_eq!(ids.assign(Some("s2")), "c1");
    }

    #[test]
    fn test_block_ids_switch_on_repeated_id() {
        let mut ids = BlockIds::new("reference-");
        assert_eq!(ids.assign(Some("rc1")), "rc1");
        assert_eq!(ids.assign(Some("rc1")), "reference-0");
        assert_eq!(ids.regime(), IdRegime::UsingGeneratedIds);
    }

    #[test]
    fn test_block_ids_reset() {
        let mut ids = BlockIds::new("c");
        ids.assign(None);
        ids.reset();

        assert_eq!(ids.regime(), IdRegime::UsingDeclaredIds);
        assert_eq!(ids.assign(Some("s1")), "s1");
        assert_eq!(ids.assign(None), "c1");
    }
}
