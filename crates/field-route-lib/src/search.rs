//! Edge weighting and shortest path search over a visibility graph

use crate::geometry::VertexKey;
use crate::graph::VisibilityGraph;
use crate::{Result, RouteError};
use geo::{Coord, Distance, Euclidean, Point};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Earth's radius in kilometers used for great-circle weights
pub const EARTH_RADIUS_KM: f64 = 6367.0;

/// Distance used to weight graph edges
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceMetric {
    /// Great-circle distance in kilometers, coordinates are (longitude, latitude) degrees
    #[default]
    Haversine,
    /// Planar distance in coordinate units
    Euclidean,
}

impl DistanceMetric {
    /// Distance between two points under this metric
    #[inline]
    pub fn distance(self, a: Coord<f64>, b: Coord<f64>) -> f64 {
        match self {
            DistanceMetric::Haversine => haversine(a, b),
            DistanceMetric::Euclidean => Euclidean.distance(Point::from(a), Point::from(b)),
        }
    }
}

/// Calculate the Haversine distance between two (longitude, latitude) points in kilometers
#[inline]
pub fn haversine(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let delta_lat = (b.y - a.y).to_radians();
    let delta_lon = (b.x - a.x).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// An ordered sequence of points from start to end
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Waypoints, start first and end last
    pub points: Vec<Coord<f64>>,
    /// Sum of edge weights along the path
    pub length: f64,
}

/// Visibility graph annotated with non-negative edge weights
#[derive(Clone, Debug)]
pub struct WeightedGraph {
    vertices: Vec<Coord<f64>>,
    index: HashMap<VertexKey, usize>,
    /// Adjacency list: adjacency[i] = [(neighbor, weight), ...]
    adjacency: Vec<Vec<(usize, f64)>>,
}

/// Weight every edge of `graph` with `distance(from, to)`
///
/// Pure in the endpoint coordinates: weighting the same graph twice gives the
/// same weights.
pub fn weight<F>(graph: &VisibilityGraph, distance: F) -> WeightedGraph
where
    F: Fn(Coord<f64>, Coord<f64>) -> f64,
{
    #[cfg(feature = "profiling")]
    profiling::scope!("search::weight");

    let vertices = graph.vertices().to_vec();
    let index = vertices
        .iter()
        .enumerate()
        .map(|(id, &coord)| (VertexKey::of(coord), id))
        .collect();

    let mut adjacency = vec![Vec::new(); vertices.len()];
    for (a, b) in graph.edge_ids() {
        let w = distance(vertices[a], vertices[b]);
        adjacency[a].push((b, w));
        adjacency[b].push((a, w));
    }

    WeightedGraph {
        vertices,
        index,
        adjacency,
    }
}

/// State for Dijkstra's algorithm priority queue
#[derive(Clone, Copy, Debug)]
struct DijkstraState {
    cost: f64,
    node: usize,
}

impl PartialEq for DijkstraState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DijkstraState {}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl WeightedGraph {
    /// Weight of the edge between `a` and `b`, if present
    pub fn weight_between(&self, a: Coord<f64>, b: Coord<f64>) -> Option<f64> {
        let a = *self.index.get(&VertexKey::of(a))?;
        let b = *self.index.get(&VertexKey::of(b))?;
        self.adjacency[a]
            .iter()
            .find(|(neighbor, _)| *neighbor == b)
            .map(|&(_, w)| w)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Find the shortest path from `start` to `end` with Dijkstra's algorithm
    ///
    /// # Errors
    /// `NoPath` if either point is not a vertex or they are not connected.
    pub fn shortest_path(&self, start: Coord<f64>, end: Coord<f64>) -> Result<Path> {
        let (Some(&source), Some(&goal)) = (
            self.index.get(&VertexKey::of(start)),
            self.index.get(&VertexKey::of(end)),
        ) else {
            return Err(RouteError::NoPath);
        };

        let n = self.vertices.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        dist[source] = 0.0;

        let mut heap = BinaryHeap::new();
        heap.push(DijkstraState {
            cost: 0.0,
            node: source,
        });

        while let Some(DijkstraState { cost, node }) = heap.pop() {
            // Skip if we've found a better path
            if cost > dist[node] {
                continue;
            }
            if node == goal {
                break;
            }
            for &(neighbor, w) in &self.adjacency[node] {
                let next = cost + w;
                if next < dist[neighbor] {
                    dist[neighbor] = next;
                    prev[neighbor] = Some(node);
                    heap.push(DijkstraState {
                        cost: next,
                        node: neighbor,
                    });
                }
            }
        }

        if !dist[goal].is_finite() {
            return Err(RouteError::NoPath);
        }

        let mut ids = vec![goal];
        let mut current = goal;
        while current != source {
            current = prev[current].ok_or(RouteError::NoPath)?;
            ids.push(current);
        }
        ids.reverse();

        Ok(Path {
            points: ids.into_iter().map(|id| self.vertices[id]).collect(),
            length: dist[goal],
        })
    }
}
