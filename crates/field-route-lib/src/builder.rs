//! Fixed-point visibility graph construction
//!
//! The graph starts as the single start-end segment. Each pass resolves every
//! current edge against the obstacles (through the edge memo) and swaps any
//! impeding edge for its local detour subgraph. Construction stops at the first
//! pass that swaps nothing.

use crate::area::PassableArea;
use crate::detour;
use crate::graph::{Edge, VisibilityGraph};
use crate::memo::{EdgeMemo, Resolution};
use crate::{Config, Region, Result, RouteError};
use geo::Coord;
use std::sync::Arc;

/// Build an obstacle-free visibility graph between `start` and `end`
///
/// The result contains a shortest admissible path from `start` to `end` inside
/// `region`.
///
/// # Errors
/// * `NonTermination` if no fixed point is reached within `config.max_passes`
/// * `RecursionLimit` if concave obstacles nest deeper than `config.max_depth`
/// * `GeometricAssertion` if a detour cannot be constructed
pub fn build_graph(
    start: Coord<f64>,
    end: Coord<f64>,
    region: &Region,
    config: &Config,
) -> Result<VisibilityGraph> {
    let mut builder = GraphBuilder::new(start, end, region, config, 0)?;
    builder.run()?;
    Ok(builder.into_graph())
}

/// State of one (sub-)query: its passable area, graph and memo
pub(crate) struct GraphBuilder<'a> {
    area: PassableArea,
    graph: VisibilityGraph,
    memo: EdgeMemo,
    config: &'a Config,
    /// Pocket nesting depth of this query (0 for the top-level query)
    depth: usize,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(
        start: Coord<f64>,
        end: Coord<f64>,
        region: &Region,
        config: &'a Config,
        depth: usize,
    ) -> Result<Self> {
        if depth > config.max_depth {
            tracing::warn!("Pocket recursion exceeded depth {}", config.max_depth);
            return Err(RouteError::RecursionLimit { depth });
        }

        Ok(Self {
            area: PassableArea::build(region),
            graph: VisibilityGraph::with_edge(Edge::new(start, end)),
            memo: EdgeMemo::seeded(region),
            config,
            depth,
        })
    }

    /// Run passes until no edge needs a detour
    pub(crate) fn run(&mut self) -> Result<()> {
        for pass in 1..=self.config.max_passes {
            let detours = self.pass()?;
            tracing::trace!(
                "Depth {} pass {}: {} detours, {} edges",
                self.depth,
                pass,
                detours,
                self.graph.edge_count()
            );
            if detours == 0 {
                tracing::debug!(
                    "Visibility graph converged after {} passes at depth {} ({} vertices, {} edges)",
                    pass,
                    self.depth,
                    self.graph.vertex_count(),
                    self.graph.edge_count()
                );
                return Ok(());
            }
        }

        tracing::warn!(
            "Visibility graph did not converge within {} passes",
            self.config.max_passes
        );
        Err(RouteError::NonTermination {
            passes: self.config.max_passes,
        })
    }

    /// One pass over a snapshot of the current edges, returning the number of detours
    fn pass(&mut self) -> Result<usize> {
        let snapshot: Vec<Edge> = self.graph.edges().collect();
        let mut detours = 0;
        for edge in snapshot {
            if let Resolution::Detour(subgraph) = self.resolve(edge)? {
                self.graph.extend(&subgraph);
                self.graph.remove_edge(edge.from, edge.to);
                detours += 1;
            }
        }
        Ok(detours)
    }

    /// Resolve an edge through the memo, computing and caching it on a miss
    fn resolve(&mut self, edge: Edge) -> Result<Resolution> {
        if let Some(resolution) = self.memo.get(&edge) {
            return Ok(resolution.clone());
        }

        let impeding = self.area.impeding_obstacles(edge.from, edge.to);
        if impeding.is_empty() {
            self.memo.insert(edge, Resolution::Clear);
            return Ok(Resolution::Clear);
        }

        let mut subgraph = VisibilityGraph::new();
        for index in impeding {
            let local = detour::local_detour(edge, index, &self.area, self.config, self.depth)?;
            tracing::trace!(
                "Detour around obstacle {} for ({:?} -> {:?}): {} edges",
                index,
                edge.from,
                edge.to,
                local.edge_count()
            );
            subgraph.extend(&local);
        }

        let resolution = Resolution::Detour(Arc::new(subgraph));
        self.memo.insert(edge, resolution.clone());
        Ok(resolution)
    }

    #[cfg(test)]
    pub(crate) fn memo(&self) -> &EdgeMemo {
        &self.memo
    }

    #[cfg(test)]
    pub(crate) fn area(&self) -> &PassableArea {
        &self.area
    }

    pub(crate) fn into_graph(self) -> VisibilityGraph {
        self.graph
    }
}
