//! Region storage and validation module
//!
//! This module provides the `Region` struct: the travel area described as one
//! outer ring plus zero or more hole rings.

use crate::{Result, RouteError};
use geo::{Coord, LineString, Polygon};

/// Minimum number of coordinates in a closed ring (a triangle plus the closing point)
const MIN_RING_COORDS: usize = 4;

/// A polygon with holes that bounds where a route may travel
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    /// Outer ring as exterior, holes as interiors
    polygon: Polygon<f64>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Region {
    /// Create a region from raw rings
    ///
    /// # Arguments
    /// * `rings` - `rings[0]` is the outer boundary, `rings[1..]` are holes. Each ring
    ///   is a closed sequence of `[x, y]` pairs (first equals last).
    ///
    /// # Returns
    /// The region, or `MalformedInput` if there are no rings or a ring is too short,
    /// not closed, or contains a non-finite coordinate. Self-intersection is not checked.
    pub fn from_rings(rings: Vec<Vec<[f64; 2]>>) -> Result<Self> {
        let mut rings = rings
            .into_iter()
            .enumerate()
            .map(|(index, ring)| Self::validate_ring(index, ring));

        let exterior = rings
            .next()
            .ok_or_else(|| RouteError::MalformedInput("region has no rings".to_string()))??;
        let interiors = rings.collect::<Result<Vec<_>>>()?;

        Ok(Self {
            polygon: Polygon::new(exterior, interiors),
        })
    }

    /// Wrap an existing polygon (its exterior is the outer ring, interiors are holes)
    pub fn from_polygon(polygon: Polygon<f64>) -> Self {
        Self { polygon }
    }

    fn validate_ring(index: usize, ring: Vec<[f64; 2]>) -> Result<LineString<f64>> {
        if ring.len() < MIN_RING_COORDS {
            return Err(RouteError::MalformedInput(format!(
                "ring {index} has {} coordinates, at least {MIN_RING_COORDS} required",
                ring.len()
            )));
        }
        if ring.iter().flatten().any(|value| !value.is_finite()) {
            return Err(RouteError::MalformedInput(format!(
                "ring {index} contains a non-finite coordinate"
            )));
        }
        if ring.first() != ring.last() {
            return Err(RouteError::MalformedInput(format!(
                "ring {index} is not closed"
            )));
        }

        Ok(ring
            .into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect::<Vec<_>>()
            .into())
    }

    /// The outer boundary ring
    #[inline]
    pub fn outer(&self) -> &LineString<f64> {
        self.polygon.exterior()
    }

    /// The hole rings
    #[inline]
    pub fn holes(&self) -> &[LineString<f64>] {
        self.polygon.interiors()
    }

    /// All rings, outer boundary first
    pub fn rings(&self) -> impl Iterator<Item = &LineString<f64>> {
        std::iter::once(self.outer()).chain(self.holes())
    }

    /// The region as a polygon with holes
    #[inline]
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_ring(min: f64, max: f64) -> Vec<[f64; 2]> {
        vec![[min, min], [max, min], [max, max], [min, max], [min, min]]
    }

    #[test]
    fn test_region_from_rings() {
        let region = Region::from_rings(vec![square_ring(0.0, 10.0), square_ring(4.0, 6.0)]).unwrap();
        assert_eq!(region.outer().0.len(), 5);
        assert_eq!(region.holes().len(), 1);
        assert_eq!(region.rings().count(), 2);
    }

    #[test]
    fn test_empty_region_fails() {
        let result = Region::from_rings(Vec::new());
        assert!(matches!(result, Err(RouteError::MalformedInput(_))));
    }

    #[test]
    fn test_open_ring_fails() {
        let ring = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let result = Region::from_rings(vec![ring]);
        assert!(matches!(result, Err(RouteError::MalformedInput(_))));
    }

    #[test]
    fn test_short_hole_fails() {
        let result = Region::from_rings(vec![
            square_ring(0.0, 10.0),
            vec![[1.0, 1.0], [2.0, 2.0], [1.0, 1.0]],
        ]);
        assert!(matches!(result, Err(RouteError::MalformedInput(_))));
    }

    #[test]
    fn test_non_finite_coordinate_fails() {
        let mut ring = square_ring(0.0, 10.0);
        ring[2] = [f64::NAN, 10.0];
        let result = Region::from_rings(vec![ring]);
        assert!(matches!(result, Err(RouteError::MalformedInput(_))));
    }

    #[test]
    fn test_from_polygon_keeps_rings() {
        let region = Region::from_rings(vec![square_ring(0.0, 10.0), square_ring(4.0, 6.0)]).unwrap();
        let rewrapped = Region::from_polygon(region.polygon().clone());
        assert_eq!(region, rewrapped);
    }
}
