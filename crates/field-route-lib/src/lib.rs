//! Field Route Library - Shortest Routes Inside Polygonal Fields
//!
//! This library computes a shortest route between two points inside a bounded planar
//! region that may contain polygonal holes. A non-convex outer boundary is handled
//! by turning the space between it and its convex hull into auxiliary obstacles.
//!
//! # Architecture
//!
//! - **[`Region`]**: Validated outer ring plus hole rings
//! - **[`PassableArea`]**: Convex boundary and uniform obstacle list derived from a region
//! - **[`build_graph`]**: Fixed-point visibility graph construction with memoized,
//!   recursive detours around obstacles
//! - **[`WeightedGraph`]**: Distance-weighted graph and Dijkstra search
//! - **[`PathFinder`]**: High-level query entry point
//!
//! # Example
//!
//! ```rust
//! use field_route_lib::{PathFinder, Region};
//! use geo::coord;
//!
//! let region = Region::from_rings(vec![
//!     vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
//!     vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]],
//! ])?;
//! let path = PathFinder::default().find_path(
//!     coord! { x: 1.0, y: 5.0 },
//!     coord! { x: 9.0, y: 5.0 },
//!     &region,
//! )?;
//! assert_eq!(path.points.len(), 4);
//! # Ok::<(), field_route_lib::RouteError>(())
//! ```

mod area;
mod builder;
mod detour;
mod finder;
pub mod geometry;
mod graph;
mod memo;
mod region;
mod search;

// Public API exports
pub use area::{Obstacle, ObstacleKind, PassableArea};
pub use builder::build_graph;
pub use finder::{Config, PathFinder};
pub use graph::{Edge, VisibilityGraph};
pub use memo::{EdgeMemo, Resolution};
pub use region::Region;
pub use search::{DistanceMetric, EARTH_RADIUS_KM, Path, WeightedGraph, haversine, weight};

/// Error types for route queries
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Geometric assertion failed: {0}")]
    GeometricAssertion(String),

    #[error("Visibility graph did not converge within {passes} passes")]
    NonTermination { passes: usize },

    /// Concave obstacles nested deeper than the configured limit
    #[error("Pocket recursion exceeded depth limit at depth {depth}")]
    RecursionLimit { depth: usize },

    #[error("No path between start and end")]
    NoPath,
}

pub type Result<T> = std::result::Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn(Config) -> PathFinder = PathFinder::new;
        let _: fn() -> Config = Config::default;
        let _: fn(&Region) -> PassableArea = PassableArea::build;
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RouteError::NonTermination { passes: 3 }.to_string(),
            "Visibility graph did not converge within 3 passes"
        );
        assert_eq!(RouteError::NoPath.to_string(), "No path between start and end");
    }
}
