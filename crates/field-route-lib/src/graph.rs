//! Undirected visibility graph over exact coordinates
//!
//! Points live in an arena and are addressed by index; edges are index pairs kept
//! in a sorted set so iteration order is deterministic.

use crate::geometry::VertexKey;
use crate::{Result, RouteError};
use geo::{Coord, Line};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A straight segment between two points, treated as undirected by the graph
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub from: Coord<f64>,
    pub to: Coord<f64>,
}

impl Edge {
    #[inline]
    pub fn new(from: Coord<f64>, to: Coord<f64>) -> Self {
        Self { from, to }
    }

    /// The same segment traversed the other way
    #[inline]
    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    #[inline]
    pub fn endpoints(&self) -> [Coord<f64>; 2] {
        [self.from, self.to]
    }

    #[inline]
    pub fn line(&self) -> Line<f64> {
        Line::new(self.from, self.to)
    }

    /// Ordered key of this edge (distinct from the key of the reversed edge)
    #[inline]
    pub(crate) fn key(&self) -> (VertexKey, VertexKey) {
        (VertexKey::of(self.from), VertexKey::of(self.to))
    }
}

/// Mutable undirected graph of straight segments
#[derive(Clone, Debug, Default)]
pub struct VisibilityGraph {
    /// Point arena, indexed by vertex id
    vertices: Vec<Coord<f64>>,
    /// Exact coordinate to vertex id
    index: HashMap<VertexKey, usize>,
    /// Edges as `(min_id, max_id)`
    edges: BTreeSet<(usize, usize)>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl VisibilityGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph holding a single edge
    pub fn with_edge(edge: Edge) -> Self {
        let mut graph = Self::new();
        graph.add_vertex(edge.from);
        graph.add_edge(edge.from, edge.to);
        graph
    }

    /// Create a graph from a closed cycle of vertices (consecutive vertices are
    /// joined, and the last one is joined back to the first)
    pub fn from_cycle(cycle: &[Coord<f64>]) -> Self {
        let mut graph = Self::new();
        for (i, &from) in cycle.iter().enumerate() {
            graph.add_edge(from, cycle[(i + 1) % cycle.len()]);
        }
        graph
    }

    /// Insert a vertex, returning its id (existing vertices are reused)
    pub fn add_vertex(&mut self, coord: Coord<f64>) -> usize {
        let key = VertexKey::of(coord);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.vertices.len();
        self.vertices.push(coord);
        self.index.insert(key, id);
        id
    }

    /// Id of the vertex at `coord`, if present
    #[inline]
    pub fn vertex_id(&self, coord: Coord<f64>) -> Option<usize> {
        self.index.get(&VertexKey::of(coord)).copied()
    }

    #[inline]
    pub fn contains_vertex(&self, coord: Coord<f64>) -> bool {
        self.index.contains_key(&VertexKey::of(coord))
    }

    /// All vertices ever inserted, in id order (removing edges keeps vertices)
    #[inline]
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Add an undirected edge. Returns false for self-loops and existing edges.
    pub fn add_edge(&mut self, from: Coord<f64>, to: Coord<f64>) -> bool {
        if VertexKey::of(from) == VertexKey::of(to) {
            return false;
        }
        let a = self.add_vertex(from);
        let b = self.add_vertex(to);
        self.edges.insert((a.min(b), a.max(b)))
    }

    /// Remove an undirected edge. Returns false if it was not present.
    pub fn remove_edge(&mut self, from: Coord<f64>, to: Coord<f64>) -> bool {
        match (self.vertex_id(from), self.vertex_id(to)) {
            (Some(a), Some(b)) => self.edges.remove(&(a.min(b), a.max(b))),
            _ => false,
        }
    }

    pub fn has_edge(&self, from: Coord<f64>, to: Coord<f64>) -> bool {
        match (self.vertex_id(from), self.vertex_id(to)) {
            (Some(a), Some(b)) => self.edges.contains(&(a.min(b), a.max(b))),
            _ => false,
        }
    }

    /// All edges, lower vertex id first
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges
            .iter()
            .map(|&(a, b)| Edge::new(self.vertices[a], self.vertices[b]))
    }

    /// All edges as vertex id pairs
    pub fn edge_ids(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().copied()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Add every edge of `other` (its isolated vertices are not copied)
    pub fn extend(&mut self, other: &VisibilityGraph) {
        for edge in other.edges() {
            self.add_edge(edge.from, edge.to);
        }
    }

    /// Number of independent cycles (edges minus spanning forest edges)
    pub fn cyclomatic_number(&self) -> usize {
        let mut parent: Vec<usize> = (0..self.vertices.len()).collect();
        let mut cycles = 0;
        for &(a, b) in &self.edges {
            let root_a = find_root(&mut parent, a);
            let root_b = find_root(&mut parent, b);
            if root_a == root_b {
                cycles += 1;
            } else {
                parent[root_a] = root_b;
            }
        }
        cycles
    }

    /// The vertices of the graph's only cycle, in traversal order
    ///
    /// # Errors
    /// `GeometricAssertion` unless the graph has exactly one independent cycle.
    pub fn single_cycle(&self) -> Result<Vec<Coord<f64>>> {
        let cycles = self.cyclomatic_number();
        if cycles != 1 {
            return Err(RouteError::GeometricAssertion(format!(
                "expected exactly one cycle, found {cycles}"
            )));
        }

        let mut adjacency: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for &(a, b) in &self.edges {
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }

        // Strip the trees hanging off the cycle
        let mut leaves: Vec<usize> = adjacency
            .iter()
            .filter(|(_, neighbors)| neighbors.len() <= 1)
            .map(|(&id, _)| id)
            .collect();
        while let Some(leaf) = leaves.pop() {
            let Some(neighbors) = adjacency.remove(&leaf) else {
                continue;
            };
            for neighbor in neighbors {
                if let Some(next) = adjacency.get_mut(&neighbor) {
                    next.remove(&leaf);
                    if next.len() <= 1 {
                        leaves.push(neighbor);
                    }
                }
            }
        }

        let Some((&first, _)) = adjacency.iter().next() else {
            return Err(RouteError::GeometricAssertion(
                "cycle vanished while stripping trees".to_string(),
            ));
        };

        let mut cycle = vec![first];
        let mut previous = first;
        let mut current = adjacency[&first]
            .iter()
            .copied()
            .next()
            .ok_or_else(|| RouteError::GeometricAssertion("isolated cycle vertex".to_string()))?;
        while current != first {
            cycle.push(current);
            let next = adjacency[&current]
                .iter()
                .copied()
                .find(|&neighbor| neighbor != previous)
                .ok_or_else(|| RouteError::GeometricAssertion("broken cycle".to_string()))?;
            previous = current;
            current = next;
            if cycle.len() > adjacency.len() {
                return Err(RouteError::GeometricAssertion(
                    "cycle walk did not close".to_string(),
                ));
            }
        }

        Ok(cycle.into_iter().map(|id| self.vertices[id]).collect())
    }

    /// Remove every edge between consecutive vertices of `path`
    pub fn remove_path(&mut self, path: &[Coord<f64>]) {
        for pair in path.windows(2) {
            self.remove_edge(pair[0], pair[1]);
        }
    }
}

fn find_root(parent: &mut [usize], mut id: usize) -> usize {
    while parent[id] != id {
        parent[id] = parent[parent[id]];
        id = parent[id];
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn square_cycle() -> Vec<Coord<f64>> {
        vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 1.0 },
        ]
    }

    #[test]
    fn test_with_edge() {
        let graph = VisibilityGraph::with_edge(Edge::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
        ));
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(coord! { x: 1.0, y: 1.0 }, coord! { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn test_degenerate_edge_keeps_vertex() {
        let point = coord! { x: 2.0, y: 2.0 };
        let graph = VisibilityGraph::with_edge(Edge::new(point, point));
        assert_eq!(graph.vertex_count(), 1);
        assert!(graph.is_empty());
        assert!(graph.contains_vertex(point));
    }

    #[test]
    fn test_vertices_are_deduplicated() {
        let mut graph = VisibilityGraph::new();
        let a = coord! { x: 0.0, y: 0.0 };
        let b = coord! { x: 1.0, y: 0.0 };
        assert!(graph.add_edge(a, b));
        assert!(!graph.add_edge(b, a));
        assert!(graph.add_edge(coord! { x: -0.0, y: 0.0 }, coord! { x: 0.0, y: 1.0 }));
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_remove_edge_keeps_vertices() {
        let mut graph = VisibilityGraph::from_cycle(&square_cycle());
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.remove_edge(coord! { x: 1.0, y: 0.0 }, coord! { x: 0.0, y: 0.0 }));
        assert!(!graph.remove_edge(coord! { x: 1.0, y: 0.0 }, coord! { x: 0.0, y: 0.0 }));
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.vertex_count(), 4);
    }

    #[test]
    fn test_extend_merges_shared_vertices() {
        let mut graph = VisibilityGraph::from_cycle(&square_cycle());
        let mut other = VisibilityGraph::new();
        other.add_edge(coord! { x: 1.0, y: 1.0 }, coord! { x: 2.0, y: 2.0 });
        other.add_vertex(coord! { x: 9.0, y: 9.0 });
        graph.extend(&other);
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.edge_count(), 5);
        assert!(!graph.contains_vertex(coord! { x: 9.0, y: 9.0 }));
    }

    #[test]
    fn test_cyclomatic_number() {
        let mut graph = VisibilityGraph::from_cycle(&square_cycle());
        assert_eq!(graph.cyclomatic_number(), 1);
        graph.add_edge(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        assert_eq!(graph.cyclomatic_number(), 2);
        graph.remove_edge(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        graph.remove_edge(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 });
        assert_eq!(graph.cyclomatic_number(), 0);
    }

    #[test]
    fn test_single_cycle_ignores_trees() {
        let mut graph = VisibilityGraph::from_cycle(&square_cycle());
        graph.add_edge(coord! { x: 1.0, y: 1.0 }, coord! { x: 2.0, y: 2.0 });
        graph.add_edge(coord! { x: 2.0, y: 2.0 }, coord! { x: 3.0, y: 2.0 });

        let cycle = graph.single_cycle().unwrap();
        assert_eq!(cycle.len(), 4);
        for vertex in square_cycle() {
            assert!(cycle.contains(&vertex));
        }
        // Consecutive cycle vertices are joined by edges
        for (i, &from) in cycle.iter().enumerate() {
            assert!(graph.has_edge(from, cycle[(i + 1) % cycle.len()]));
        }
    }

    #[test]
    fn test_single_cycle_rejects_two_cycles() {
        let mut graph = VisibilityGraph::from_cycle(&square_cycle());
        graph.add_edge(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        assert!(matches!(
            graph.single_cycle(),
            Err(RouteError::GeometricAssertion(_))
        ));
    }

    #[test]
    fn test_remove_path() {
        let mut graph = VisibilityGraph::from_cycle(&square_cycle());
        let cycle = square_cycle();
        graph.remove_path(&cycle[0..3]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_edge_reversed() {
        let edge = Edge::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 2.0 });
        assert_eq!(edge.reversed().reversed(), edge);
        assert_ne!(edge.key(), edge.reversed().key());
        assert_eq!(edge.line().end, coord! { x: 1.0, y: 2.0 });
    }
}
