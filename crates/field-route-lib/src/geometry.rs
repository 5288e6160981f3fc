//! Geometry helpers on top of the `geo` kernel
//!
//! Exact vertex identity, noded convex hulls, snapped polygon differences and the
//! segment/ring predicates used while building visibility graphs.

use crate::{Result, RouteError};
use geo::coordinate_position::CoordPos;
use geo::dimensions::Dimensions;
use geo::{
    Area, BooleanOps, ConvexHull, Coord, Intersects, Line, LineString, MapCoords, MultiPoint,
    Polygon, Relate,
};
use std::collections::HashSet;

/// Snapping tolerance for boolean operation output, relative to coordinate magnitude
const SNAP_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Exact, hashable identity of a coordinate
///
/// Two coordinates share a key iff they compare equal as floats (`-0.0` and `0.0`
/// are folded together). Non-finite coordinates are rejected before they get here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey(u64, u64);

impl VertexKey {
    /// Key of a coordinate
    #[inline(always)]
    pub fn of(coord: Coord<f64>) -> Self {
        Self(normalized_bits(coord.x), normalized_bits(coord.y))
    }
}

impl From<Coord<f64>> for VertexKey {
    #[inline]
    fn from(coord: Coord<f64>) -> Self {
        Self::of(coord)
    }
}

#[inline(always)]
fn normalized_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Squared euclidean distance between two coordinates
#[inline(always)]
pub fn distance_sq(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Check if `point` lies on the segment `a`-`b`, excluding both endpoints
#[inline]
pub fn on_segment(a: Coord<f64>, b: Coord<f64>, point: Coord<f64>) -> bool {
    point != a && point != b && Line::new(a, b).intersects(&point)
}

/// Convex hull of `points` as an open cycle of vertices
///
/// Every input point lying on a hull edge (but not being a hull vertex) is spliced
/// into that edge, ordered by its distance from the edge start. This nodes the hull
/// boundary so collinear obstacle vertices and travel endpoints become vertices too.
///
/// # Errors
/// `GeometricAssertion` if the hull has fewer than three vertices.
pub fn hull_cycle(points: &[Coord<f64>]) -> Result<Vec<Coord<f64>>> {
    let hull = MultiPoint::from(points.to_vec()).convex_hull();
    let mut corners: Vec<Coord<f64>> = hull.exterior().0.clone();
    if corners.len() > 1 && corners.first() == corners.last() {
        corners.pop();
    }
    corners.dedup();

    if corners.len() < 3 {
        return Err(RouteError::GeometricAssertion(format!(
            "convex hull of {} points is degenerate",
            points.len()
        )));
    }

    let corner_keys: HashSet<VertexKey> = corners.iter().copied().map(VertexKey::of).collect();
    let mut spliced_keys: HashSet<VertexKey> = HashSet::new();
    let mut cycle = Vec::with_capacity(corners.len() + points.len());

    for (i, &from) in corners.iter().enumerate() {
        let to = corners[(i + 1) % corners.len()];
        cycle.push(from);

        let mut on_edge: Vec<Coord<f64>> = Vec::new();
        for &point in points {
            let key = VertexKey::of(point);
            if corner_keys.contains(&key) || !on_segment(from, to, point) {
                continue;
            }
            if spliced_keys.insert(key) {
                on_edge.push(point);
            }
        }
        on_edge.sort_by(|a, b| distance_sq(from, *a).total_cmp(&distance_sq(from, *b)));
        cycle.extend(on_edge);
    }

    Ok(cycle)
}

/// Vertices of a closed ring without the closing duplicate
pub fn ring_vertices(ring: &LineString<f64>) -> &[Coord<f64>] {
    let coords = ring.0.as_slice();
    match coords {
        [first, .., last] if first == last => &coords[..coords.len() - 1],
        _ => coords,
    }
}

/// Consecutive segments of a closed ring
pub fn ring_segments(ring: &LineString<f64>) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
    ring.0.windows(2).map(|pair| (pair[0], pair[1]))
}

/// Polygon set difference `minuend - subtrahend`
///
/// The boolean operation may move vertices by a rounding error; every output
/// vertex within tolerance of an input vertex is snapped back onto it so exact
/// vertex identity survives. Empty-area pieces are dropped.
pub fn difference(minuend: &Polygon<f64>, subtrahend: &Polygon<f64>) -> Vec<Polygon<f64>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("geometry::difference");

    let sources: Vec<Coord<f64>> = polygon_coords(minuend)
        .chain(polygon_coords(subtrahend))
        .collect();

    minuend
        .difference(subtrahend)
        .into_iter()
        .map(|piece| piece.map_coords(|coord| snap(coord, &sources)))
        .map(|piece| {
            let (exterior, interiors) = piece.into_inner();
            Polygon::new(
                dedup_ring(exterior),
                interiors.into_iter().map(dedup_ring).collect(),
            )
        })
        .filter(|piece| piece.unsigned_area() > 0.0)
        .collect()
}

fn polygon_coords(polygon: &Polygon<f64>) -> impl Iterator<Item = Coord<f64>> + '_ {
    polygon
        .exterior()
        .0
        .iter()
        .chain(polygon.interiors().iter().flat_map(|ring| ring.0.iter()))
        .copied()
}

fn snap(coord: Coord<f64>, sources: &[Coord<f64>]) -> Coord<f64> {
    let tolerance = SNAP_RELATIVE_TOLERANCE * coord.x.abs().max(coord.y.abs()).max(1.0);
    sources
        .iter()
        .copied()
        .filter(|source| {
            (source.x - coord.x).abs() <= tolerance && (source.y - coord.y).abs() <= tolerance
        })
        .min_by(|a, b| distance_sq(*a, coord).total_cmp(&distance_sq(*b, coord)))
        .unwrap_or(coord)
}

fn dedup_ring(ring: LineString<f64>) -> LineString<f64> {
    let mut coords = ring.0;
    coords.dedup();
    LineString::new(coords)
}

/// Check if the segment `a`-`b` shares interior points with the polygon's interior
///
/// True both for transversal crossings and for segments running through the
/// polygon between two of its own boundary points. Touching the boundary, or
/// running along it, is not entering.
pub fn segment_enters_interior(polygon: &Polygon<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    if a == b {
        return polygon.intersects(&a) && !polygon.exterior().intersects(&a);
    }
    let matrix = polygon.relate(&Line::new(a, b));
    matrix.get(CoordPos::Inside, CoordPos::Inside) != Dimensions::Empty
}

/// Check if the segment `a`-`b` lies entirely on the ring's linework
pub fn segment_along_ring(ring: &LineString<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    if a == b {
        return ring.intersects(&a);
    }
    Line::new(a, b).relate(ring).is_within()
}

/// Check if a coordinate lies on the ring's linework
#[inline]
pub fn touches_ring(ring: &LineString<f64>, coord: Coord<f64>) -> bool {
    ring.intersects(&coord)
}
