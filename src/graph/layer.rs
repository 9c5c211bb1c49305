//! Named groupings of nodes and relations.

use indexmap::IndexSet;
use smol_str::SmolStr;

use super::label::{Annotatable, Labels};
use crate::base::{NodeId, RelationId};

/// A layer groups the nodes and relations of one analytic level.
///
/// Its labels are its own metadata (tagsets, sources) and are independent of
/// the labels of its members.
#[derive(Clone, Debug)]
pub struct Layer {
    name: SmolStr,
    labels: Labels,
    pub(super) nodes: IndexSet<NodeId>,
    pub(super) relations: IndexSet<RelationId>,
}

impl Layer {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            labels: Labels::new(),
            nodes: IndexSet::new(),
            relations: IndexSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn relations(&self) -> impl Iterator<Item = RelationId> + '_ {
        self.relations.iter().copied()
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn contains_relation(&self, relation: RelationId) -> bool {
        self.relations.contains(&relation)
    }
}

impl Annotatable for Layer {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }
}
