//! Passable area: a region turned into a convex boundary plus a list of obstacles
//!
//! A non-convex outer ring is replaced by its convex hull, and every pocket between
//! the hull and the ring becomes an auxiliary obstacle. Auxiliary obstacles come
//! first in the obstacle list, explicit holes follow.

use crate::Region;
use crate::geometry::{self, VertexKey};
use geo::{ConvexHull, Coord, LineString, Polygon, Relate};
use std::collections::HashSet;

/// Where an obstacle comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Area between a non-convex outer boundary and its convex hull
    Auxiliary,
    /// A hole supplied with the region
    Explicit,
}

/// A polygon that travel segments must not cross
#[derive(Clone, Debug)]
pub struct Obstacle {
    polygon: Polygon<f64>,
    kind: ObstacleKind,
}

impl Obstacle {
    #[inline]
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    #[inline]
    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    #[inline]
    pub fn is_auxiliary(&self) -> bool {
        self.kind == ObstacleKind::Auxiliary
    }
}

/// Convex boundary, original boundary and obstacles of one query
#[derive(Clone, Debug)]
pub struct PassableArea {
    /// Convex hull of the outer ring
    hull: Polygon<f64>,
    /// The outer ring as given (possibly non-convex)
    original: Polygon<f64>,
    /// Auxiliary obstacles first, then explicit ones
    obstacles: Vec<Obstacle>,
    num_auxiliary: usize,
    /// Vertices of the hull ring, for exact membership tests
    hull_vertices: HashSet<VertexKey>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PassableArea {
    /// Derive the passable area of a region
    pub fn build(region: &Region) -> Self {
        let original = Polygon::new(region.outer().clone(), Vec::new());
        let hull = original.convex_hull();

        let mut obstacles: Vec<Obstacle> = Vec::new();
        if !hull.relate(&original).is_equal_topo() {
            obstacles.extend(
                geometry::difference(&hull, &original)
                    .into_iter()
                    .map(|polygon| Obstacle {
                        polygon,
                        kind: ObstacleKind::Auxiliary,
                    }),
            );
        }
        let num_auxiliary = obstacles.len();

        obstacles.extend(region.holes().iter().map(|hole| Obstacle {
            polygon: Polygon::new(hole.clone(), Vec::new()),
            kind: ObstacleKind::Explicit,
        }));

        let hull_vertices = hull.exterior().0.iter().copied().map(VertexKey::of).collect();

        tracing::trace!(
            "Passable area with {} auxiliary and {} explicit obstacles",
            num_auxiliary,
            obstacles.len() - num_auxiliary
        );

        Self {
            hull,
            original,
            obstacles,
            num_auxiliary,
            hull_vertices,
        }
    }

    /// Convex hull of the outer ring
    #[inline]
    pub fn hull(&self) -> &Polygon<f64> {
        &self.hull
    }

    /// The outer ring as given
    #[inline]
    pub fn original_boundary(&self) -> &LineString<f64> {
        self.original.exterior()
    }

    /// All obstacles, auxiliary ones first
    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Number of auxiliary obstacles (they occupy indices `0..num_auxiliary()`)
    #[inline]
    pub fn num_auxiliary(&self) -> usize {
        self.num_auxiliary
    }

    /// Check if a coordinate is a vertex of the hull ring
    #[inline]
    pub fn is_hull_vertex(&self, coord: Coord<f64>) -> bool {
        self.hull_vertices.contains(&VertexKey::of(coord))
    }

    /// Indices of the obstacles impeding the segment `from`-`to`
    ///
    /// An obstacle impedes when the segment enters its interior. An auxiliary
    /// obstacle also impedes a segment running along its boundary but not along
    /// the original outer ring: that is the hull side of a concavity, which lies
    /// outside the region.
    pub fn impeding_obstacles(&self, from: Coord<f64>, to: Coord<f64>) -> Vec<usize> {
        self.obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| {
                geometry::segment_enters_interior(obstacle.polygon(), from, to)
                    || (obstacle.is_auxiliary()
                        && geometry::segment_along_ring(obstacle.polygon().exterior(), from, to)
                        && !geometry::segment_along_ring(self.original_boundary(), from, to))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Check if the segment is an inadmissible hull chord
    ///
    /// Both endpoints are hull vertices, yet the segment does not run along the
    /// original outer ring, so it spans a concavity from outside the region.
    pub fn is_hull_chord(&self, from: Coord<f64>, to: Coord<f64>) -> bool {
        self.is_hull_vertex(from)
            && self.is_hull_vertex(to)
            && !geometry::segment_along_ring(self.original_boundary(), from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, coord};

    fn square_ring(min: f64, max: f64) -> Vec<[f64; 2]> {
        vec![[min, min], [max, min], [max, max], [min, max], [min, min]]
    }

    fn l_shape() -> Vec<[f64; 2]> {
        vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 5.0],
            [5.0, 5.0],
            [5.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ]
    }

    #[test]
    fn test_convex_region_has_no_auxiliary_obstacles() {
        let region = Region::from_rings(vec![square_ring(0.0, 10.0)]).unwrap();
        let area = PassableArea::build(&region);
        assert_eq!(area.num_auxiliary(), 0);
        assert!(area.obstacles().is_empty());
    }

    #[test]
    fn test_holes_become_explicit_obstacles() {
        let region = Region::from_rings(vec![
            square_ring(0.0, 10.0),
            square_ring(2.0, 3.0),
            square_ring(6.0, 7.0),
        ])
        .unwrap();
        let area = PassableArea::build(&region);
        assert_eq!(area.num_auxiliary(), 0);
        assert_eq!(area.obstacles().len(), 2);
        assert!(
            area.obstacles()
                .iter()
                .all(|o| o.kind() == ObstacleKind::Explicit)
        );
    }

    #[test]
    fn test_concave_outer_ring_yields_auxiliary_obstacle_first() {
        let region = Region::from_rings(vec![l_shape(), square_ring(1.0, 2.0)]).unwrap();
        let area = PassableArea::build(&region);

        assert_eq!(area.num_auxiliary(), 1);
        assert_eq!(area.obstacles().len(), 2);
        assert!(area.obstacles()[0].is_auxiliary());
        assert!(!area.obstacles()[1].is_auxiliary());
        assert!((area.obstacles()[0].polygon().unsigned_area() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_hull_contains_original_boundary() {
        let region = Region::from_rings(vec![l_shape()]).unwrap();
        let area = PassableArea::build(&region);
        assert!(area.hull().relate(&area.original).is_covers());
        assert!(area.is_hull_vertex(coord! { x: 10.0, y: 5.0 }));
        assert!(!area.is_hull_vertex(coord! { x: 5.0, y: 5.0 }));
    }

    #[test]
    fn test_impeding_obstacles() {
        let region = Region::from_rings(vec![l_shape()]).unwrap();
        let area = PassableArea::build(&region);

        // Cuts across the notch
        assert_eq!(
            area.impeding_obstacles(coord! { x: 9.0, y: 3.0 }, coord! { x: 3.0, y: 9.0 }),
            vec![0]
        );
        // Runs along the hull chord of the notch
        assert_eq!(
            area.impeding_obstacles(coord! { x: 10.0, y: 5.0 }, coord! { x: 5.0, y: 10.0 }),
            vec![0]
        );
        // Runs along the original boundary of the notch
        assert!(
            area.impeding_obstacles(coord! { x: 10.0, y: 5.0 }, coord! { x: 5.0, y: 5.0 })
                .is_empty()
        );
        // Stays in the lower-left quadrant
        assert!(
            area.impeding_obstacles(coord! { x: 1.0, y: 1.0 }, coord! { x: 4.0, y: 4.0 })
                .is_empty()
        );
    }

    #[test]
    fn test_is_hull_chord() {
        let region = Region::from_rings(vec![l_shape()]).unwrap();
        let area = PassableArea::build(&region);
        assert!(area.is_hull_chord(coord! { x: 10.0, y: 5.0 }, coord! { x: 5.0, y: 10.0 }));
        assert!(!area.is_hull_chord(coord! { x: 10.0, y: 0.0 }, coord! { x: 10.0, y: 5.0 }));
        assert!(!area.is_hull_chord(coord! { x: 5.0, y: 5.0 }, coord! { x: 5.0, y: 10.0 }));
    }
}
