//! PathFinder - Top-level entry point for shortest route queries
//!
//! This module provides the high-level API: build the obstacle-free visibility
//! graph for a query, weight it, and extract the shortest path.

use crate::search::{self, DistanceMetric, Path};
use crate::{Region, Result, VisibilityGraph, builder};

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for route queries
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum number of fixed-point passes per (sub-)query before giving up.
    /// Default: 64
    pub max_passes: usize,
    /// Maximum nesting depth of pocket sub-queries around concave obstacles.
    /// Default: 16
    pub max_depth: usize,
    /// Distance used to weight graph edges.
    /// Default: Haversine
    pub metric: DistanceMetric,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_passes: 64,
            max_depth: 16,
            metric: DistanceMetric::Haversine,
        }
    }
}

/// Runs shortest route queries with a fixed configuration
///
/// Holds no per-query state: every call builds its own passable area, memo and
/// graph, so a single finder can serve any number of queries.
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PathFinder {
    /// Create a new path finder with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the obstacle-free visibility graph for a query
    pub fn build_graph(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        region: &Region,
    ) -> Result<VisibilityGraph> {
        builder::build_graph(start, end, region, &self.config)
    }

    /// Find the shortest admissible path from `start` to `end` inside `region`
    pub fn find_path(&self, start: Coord<f64>, end: Coord<f64>, region: &Region) -> Result<Path> {
        #[cfg(feature = "profiling")]
        profiling::scope!("finder::find_path");

        let graph = self.build_graph(start, end, region)?;
        let metric = self.config.metric;
        let weighted = search::weight(&graph, |a, b| metric.distance(a, b));
        let path = weighted.shortest_path(start, end)?;

        tracing::debug!(
            "Found path with {} points and length {:.6} through a graph of {} edges",
            path.points.len(),
            path.length,
            graph.edge_count()
        );
        Ok(path)
    }
}
