//! Local detour subgraphs
//!
//! A detour routes one impeding edge around one obstacle along the convex hull of
//! the edge and the obstacle. Endpoints hidden in a pocket of a concave obstacle
//! are wired to the pocket mouth by recursive sub-queries, and detours around
//! auxiliary obstacles keep only the half of the hull inside the region.

use crate::area::PassableArea;
use crate::builder::GraphBuilder;
use crate::geometry::{self, VertexKey};
use crate::graph::{Edge, VisibilityGraph};
use crate::{Config, Region, Result, RouteError};
use geo::{ConvexHull, Coord, Intersects, Line, Polygon};
use std::collections::HashSet;

/// Detour subgraph routing `edge` around obstacle `index` of `area`
///
/// The impeding edge itself is never part of the result; the caller removes it.
pub(crate) fn local_detour(
    edge: Edge,
    index: usize,
    area: &PassableArea,
    config: &Config,
    depth: usize,
) -> Result<VisibilityGraph> {
    #[cfg(feature = "profiling")]
    profiling::scope!("detour::local_detour");

    let obstacle = &area.obstacles()[index];
    let cycle = hull_cycle_around(edge, obstacle.polygon())?;

    let cycle_keys: HashSet<VertexKey> = cycle.iter().copied().map(VertexKey::of).collect();
    let endpoints_on_hull = edge
        .endpoints()
        .iter()
        .all(|&endpoint| cycle_keys.contains(&VertexKey::of(endpoint)));

    let mut detour = if endpoints_on_hull {
        VisibilityGraph::from_cycle(&cycle)
    } else {
        concave_detour(edge, obstacle.polygon(), &cycle, config, depth)?
    };

    if obstacle.is_auxiliary() && detour.cyclomatic_number() > 0 {
        trim_outer_half(edge, &mut detour, area)?;
    }

    Ok(detour)
}

/// Noded convex hull of the edge endpoints and the obstacle's vertices
fn hull_cycle_around(edge: Edge, obstacle: &Polygon<f64>) -> Result<Vec<Coord<f64>>> {
    let points: Vec<Coord<f64>> = edge
        .endpoints()
        .into_iter()
        .chain(geometry::ring_vertices(obstacle.exterior()).iter().copied())
        .collect();
    geometry::hull_cycle(&points)
}

/// Detour for an edge with an endpoint hidden inside the obstacle's silhouette
///
/// Starts from the hull ring and rewires it through every pocket (hole of the
/// obstacle's own convex hull) that holds an endpoint of the edge.
fn concave_detour(
    edge: Edge,
    obstacle: &Polygon<f64>,
    cycle: &[Coord<f64>],
    config: &Config,
    depth: usize,
) -> Result<VisibilityGraph> {
    let mut detour = VisibilityGraph::from_cycle(cycle);
    let obstacle_hull = obstacle.convex_hull();
    for pocket in geometry::difference(&obstacle_hull, obstacle) {
        detour = route_through_pocket(edge, detour, &obstacle_hull, &pocket, config, depth)?;
    }
    Ok(detour)
}

/// Rewire `detour` for the endpoints of `edge` lying in `pocket`
fn route_through_pocket(
    edge: Edge,
    mut detour: VisibilityGraph,
    obstacle_hull: &Polygon<f64>,
    pocket: &Polygon<f64>,
    config: &Config,
    depth: usize,
) -> Result<VisibilityGraph> {
    let (gate_a, gate_b) = pocket_mouth(obstacle_hull, pocket)?;
    let mouth = Line::new(gate_a, gate_b);

    let hidden: Vec<Coord<f64>> = edge
        .endpoints()
        .into_iter()
        .filter(|&endpoint| pocket.intersects(&endpoint) && !mouth.intersects(&endpoint))
        .collect();

    match hidden.as_slice() {
        [] => Ok(detour),
        &[vertex] => {
            detour.remove_edge(gate_a, gate_b);
            let other = if vertex == edge.from { edge.to } else { edge.from };

            // A gate hidden behind the other endpoint is reached from it directly.
            // With both gates off the hull, any of these edges that crosses the
            // obstacle is detoured again in a later pass.
            match (detour.contains_vertex(gate_a), detour.contains_vertex(gate_b)) {
                (true, true) => {}
                (false, true) => {
                    detour.add_edge(other, gate_a);
                    detour.remove_edge(other, gate_b);
                }
                (true, false) => {
                    detour.add_edge(other, gate_b);
                    detour.remove_edge(other, gate_a);
                }
                (false, false) => {
                    tracing::trace!(
                        "Pocket gates {:?} and {:?} are both off the detour hull",
                        gate_a,
                        gate_b
                    );
                    detour.add_edge(other, gate_a);
                    detour.add_edge(other, gate_b);
                }
            }

            if vertex != gate_a && vertex != gate_b {
                let region = pocket_region(pocket);
                for gate in [gate_a, gate_b] {
                    detour.extend(&sub_query(vertex, gate, &region, config, depth)?);
                }
            }
            Ok(detour)
        }
        _ => {
            // Both endpoints share the pocket: route inside it only
            let region = pocket_region(pocket);
            sub_query(edge.from, edge.to, &region, config, depth)
        }
    }
}

/// The two pocket vertices on the obstacle hull, i.e. the ends of the pocket mouth
fn pocket_mouth(obstacle_hull: &Polygon<f64>, pocket: &Polygon<f64>) -> Result<(Coord<f64>, Coord<f64>)> {
    let gates: Vec<Coord<f64>> = geometry::ring_vertices(pocket.exterior())
        .iter()
        .copied()
        .filter(|&vertex| geometry::touches_ring(obstacle_hull.exterior(), vertex))
        .collect();

    match gates.as_slice() {
        &[a, b] => Ok((a, b)),
        _ => Err(RouteError::GeometricAssertion(format!(
            "pocket mouth should have 2 vertices on the obstacle hull, found {}",
            gates.len()
        ))),
    }
}

fn pocket_region(pocket: &Polygon<f64>) -> Region {
    Region::from_polygon(Polygon::new(pocket.exterior().clone(), Vec::new()))
}

/// Visibility graph of a nested query one pocket level deeper
fn sub_query(
    start: Coord<f64>,
    end: Coord<f64>,
    region: &Region,
    config: &Config,
    depth: usize,
) -> Result<VisibilityGraph> {
    let mut builder = GraphBuilder::new(start, end, region, config, depth + 1)?;
    builder.run()?;
    Ok(builder.into_graph())
}

/// Drop the half of a detour cycle around an auxiliary obstacle that leaves the region
///
/// The cycle is split at the edge endpoints into two arcs; an arc holding a hull
/// chord (see [`PassableArea::is_hull_chord`]) is removed.
///
/// # Errors
/// `GeometricAssertion` if the detour is not a single cycle through both endpoints,
/// or if both arcs would be removed (which would leave the edge unresolved).
fn trim_outer_half(edge: Edge, detour: &mut VisibilityGraph, area: &PassableArea) -> Result<()> {
    let cycle = detour.single_cycle()?;

    let position = |target: Coord<f64>| {
        cycle.iter().position(|&vertex| vertex == target).ok_or_else(|| {
            RouteError::GeometricAssertion(format!(
                "edge endpoint {target:?} is not on the auxiliary detour cycle"
            ))
        })
    };
    let first = position(edge.from)?;
    let second = position(edge.to)?;
    let (low, high) = (first.min(second), first.max(second));

    let arc_between: Vec<Coord<f64>> = cycle[low..=high].to_vec();
    let arc_around: Vec<Coord<f64>> = cycle[high..]
        .iter()
        .chain(cycle[..=low].iter())
        .copied()
        .collect();

    let has_chord = |arc: &[Coord<f64>]| {
        arc.windows(2)
            .any(|pair| area.is_hull_chord(pair[0], pair[1]))
    };

    match (has_chord(&arc_between), has_chord(&arc_around)) {
        (true, true) => Err(RouteError::GeometricAssertion(
            "both arcs of the auxiliary detour leave the region".to_string(),
        )),
        (true, false) => {
            detour.remove_path(&arc_between);
            Ok(())
        }
        (false, true) => {
            detour.remove_path(&arc_around);
            Ok(())
        }
        (false, false) => Ok(()),
    }
}
