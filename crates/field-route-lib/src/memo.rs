//! Per-query memo of resolved edges

use crate::Region;
use crate::geometry::{self, VertexKey};
use crate::graph::{Edge, VisibilityGraph};
use std::collections::HashMap;
use std::sync::Arc;

/// How an edge was resolved against the obstacles
#[derive(Clone, Debug)]
pub enum Resolution {
    /// The edge impedes no obstacle and stays in the graph
    Clear,
    /// The edge is replaced by this local detour subgraph
    Detour(Arc<VisibilityGraph>),
}

impl Resolution {
    #[inline]
    pub fn is_clear(&self) -> bool {
        matches!(self, Resolution::Clear)
    }

    /// Check if two resolutions are the same entry (same detour instance)
    #[cfg(test)]
    pub(crate) fn same_as(&self, other: &Resolution) -> bool {
        match (self, other) {
            (Resolution::Clear, Resolution::Clear) => true,
            (Resolution::Detour(a), Resolution::Detour(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Cache from edge (in both orientations) to its resolution
///
/// Created once per (sub-)query and never shared between queries.
#[derive(Clone, Debug, Default)]
pub struct EdgeMemo {
    entries: HashMap<(VertexKey, VertexKey), Resolution>,
}

impl EdgeMemo {
    /// Create a memo where every ring segment of the region is already clear
    ///
    /// Ring segments are obstacle boundaries, always passable along the boundary.
    pub fn seeded(region: &Region) -> Self {
        let mut memo = Self::default();
        for ring in region.rings() {
            for (from, to) in geometry::ring_segments(ring) {
                if from != to {
                    memo.insert(Edge::new(from, to), Resolution::Clear);
                }
            }
        }
        memo
    }

    /// Cached resolution of an edge
    #[inline]
    pub fn get(&self, edge: &Edge) -> Option<&Resolution> {
        self.entries.get(&edge.key())
    }

    /// Record a resolution for both orientations of the edge
    pub fn insert(&mut self, edge: Edge, resolution: Resolution) {
        self.entries.insert(edge.reversed().key(), resolution.clone());
        self.entries.insert(edge.key(), resolution);
    }

    /// Number of cached orientations (twice the number of distinct edges)
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check that every entry `(a, b)` has an identical `(b, a)` entry
    #[cfg(test)]
    pub(crate) fn is_symmetric(&self) -> bool {
        self.entries.iter().all(|(&(from, to), resolution)| {
            self.entries
                .get(&(to, from))
                .is_some_and(|reverse| reverse.same_as(resolution))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn region() -> Region {
        Region::from_rings(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]],
        ])
        .unwrap()
    }

    #[test]
    fn test_seeded_with_ring_segments_both_ways() {
        let memo = EdgeMemo::seeded(&region());
        // 8 ring segments, two orientations each
        assert_eq!(memo.len(), 16);

        let edge = Edge::new(coord! { x: 4.0, y: 4.0 }, coord! { x: 6.0, y: 4.0 });
        assert!(memo.get(&edge).is_some_and(Resolution::is_clear));
        assert!(memo.get(&edge.reversed()).is_some_and(Resolution::is_clear));
        assert!(memo.is_symmetric());
    }

    #[test]
    fn test_unknown_edge_is_not_cached() {
        let memo = EdgeMemo::seeded(&region());
        let edge = Edge::new(coord! { x: 1.0, y: 1.0 }, coord! { x: 9.0, y: 9.0 });
        assert!(memo.get(&edge).is_none());
    }

    #[test]
    fn test_insert_detour_is_shared_by_both_orientations() {
        let mut memo = EdgeMemo::default();
        let edge = Edge::new(coord! { x: 1.0, y: 5.0 }, coord! { x: 9.0, y: 5.0 });
        let detour = Arc::new(VisibilityGraph::with_edge(Edge::new(
            coord! { x: 1.0, y: 5.0 },
            coord! { x: 4.0, y: 4.0 },
        )));
        memo.insert(edge, Resolution::Detour(detour));

        let forward = memo.get(&edge).unwrap();
        let backward = memo.get(&edge.reversed()).unwrap();
        assert!(forward.same_as(backward));
        assert!(!forward.is_clear());
        assert!(memo.is_symmetric());
    }
}
