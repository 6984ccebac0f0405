use crate::workflow::{Edge, EdgeId};
use ahash::AHashMap;

/// Edge list indexed by edge id.
#[derive(Debug, Default)]
pub struct LinkTable<'a> {
    edges: AHashMap<EdgeId, &'a Edge>,
}

impl<'a> LinkTable<'a> {
    /// Indexes `edges`. When an id occurs more than once the last edge wins.
    pub fn new(edges: &'a [Edge]) -> Self {
        Self {
            edges: edges.iter().map(|e| (e.id, e)).collect(),
        }
    }

    pub fn get(&self, id: EdgeId) -> Option<&'a Edge> {
        self.edges.get(&id).copied()
    }

    pub fn contains(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
