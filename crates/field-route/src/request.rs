//! JSON request and response contract
//!
//! Requests carry two GeoJSON-like point features and one polygon feature:
//! `{"endPoints": [{"geometry": {"coordinates": [x, y]}}, ...],
//!   "polygonGeom": {"geometry": {"coordinates": [[[x, y], ...], ...]}}}`

use field_route_lib::{Path, Region, RouteError};
use geo::{Coord, coord};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Failed to read request: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected exactly 2 end points, found {0}")]
    EndPointCount(usize),

    #[error(transparent)]
    Route(#[from] RouteError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature<G> {
    pub geometry: G,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointGeometry {
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolygonGeometry {
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub end_points: Vec<Feature<PointGeometry>>,
    pub polygon_geom: Feature<PolygonGeometry>,
}

impl RouteRequest {
    pub fn parse(text: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The start and end of the route
    pub fn endpoints(&self) -> Result<(Coord<f64>, Coord<f64>), RequestError> {
        match self.end_points.as_slice() {
            [start, end] => Ok((to_coord(start), to_coord(end))),
            other => Err(RequestError::EndPointCount(other.len())),
        }
    }

    /// The validated field, outer ring first
    pub fn region(&self) -> Result<Region, RequestError> {
        Ok(Region::from_rings(
            self.polygon_geom.geometry.coordinates.clone(),
        )?)
    }
}

fn to_coord(feature: &Feature<PointGeometry>) -> Coord<f64> {
    let [x, y] = feature.geometry.coordinates;
    coord! { x: x, y: y }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStringGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum RouteResponse {
    #[serde(rename = "OK")]
    Ok {
        path: LineStringGeometry,
        length: f64,
    },
    #[serde(rename = "ERROR")]
    Error { message: String },
}

impl RouteResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, RouteResponse::Ok { .. })
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl From<Path> for RouteResponse {
    fn from(path: Path) -> Self {
        RouteResponse::Ok {
            path: LineStringGeometry {
                kind: "LineString",
                coordinates: path.points.iter().map(|c| [c.x, c.y]).collect(),
            },
            length: path.length,
        }
    }
}

impl From<RequestError> for RouteResponse {
    fn from(error: RequestError) -> Self {
        RouteResponse::Error {
            message: error.to_string(),
        }
    }
}
