//! Wire model of the simulation service response.
//!
//! The schema is explicit: optional members are `Option`s, and anything that
//! does not fit the shape below is rejected by [`SimulationResult::from_json_slice`]
//! with [`SimulationError::Decode`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SimulationError;

/// One successful simulation response. Replaced wholesale by the next success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Scenario the service actually simulated.
    pub scenario: String,
    /// Geospatial output.
    #[serde(default, deserialize_with = "null_as_default")]
    pub geojson: FeatureCollection,
    /// Per-agent log entries, in the order the agents ran.
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<LogEntry>,
}

impl SimulationResult {
    /// Decodes a response body.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, SimulationError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decodes a response body held as text.
    pub fn from_json_str(body: &str) -> Result<Self, SimulationError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Features of the result, in response order.
    pub fn features(&self) -> &[Feature] {
        &self.geojson.features
    }
}

/// GeoJSON `FeatureCollection`. The `type` member is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Member features.
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<Feature>,
}

/// GeoJSON `Feature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// `None` when the source geometry is `null`.
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Descriptive properties.
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Properties,
}

impl Feature {
    /// Point feature at `(lon, lat)`.
    pub fn point(lon: f64, lat: f64, properties: Properties) -> Self {
        Self {
            geometry: Some(Geometry::Point {
                coordinates: Position::new(lon, lat),
            }),
            properties,
        }
    }

    /// LineString feature through `(lon, lat)` pairs.
    pub fn line_string(coords: &[(f64, f64)], properties: Properties) -> Self {
        Self {
            geometry: Some(Geometry::LineString {
                coordinates: coords
                    .iter()
                    .map(|&(lon, lat)| Position::new(lon, lat))
                    .collect(),
            }),
            properties,
        }
    }
}

/// Geometry kinds the dashboard knows how to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Single position.
    Point {
        /// Position in GeoJSON order.
        coordinates: Position,
    },
    /// Ordered positions.
    LineString {
        /// Positions in GeoJSON order.
        coordinates: Vec<Position>,
    },
    /// Any other GeoJSON geometry type. Decoded, never drawn.
    #[serde(other)]
    Unsupported,
}

/// A GeoJSON position: `[lon, lat]`, optionally followed by altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Position {
    /// New position from GeoJSON order.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Display order. The only place the axis swap happens.
    pub fn to_lat_lon(self) -> LatLon {
        LatLon {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            other => Err(format!(
                "position needs at least 2 numbers, got {}",
                other.len()
            )),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(value: Position) -> Self {
        [value.lon, value.lat]
    }
}

/// Coordinate in display order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    /// New display-order coordinate.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Feature properties. Only `name` and `severity` drive styling; everything
/// else is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Urgency of a point feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Remaining members.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Properties {
    /// Properties with a name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Builder: set severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Severity label of a point feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// `"severe"`
    Severe,
    /// `"moderate"`
    Moderate,
    /// Any other label, kept verbatim.
    Other(String),
}

impl Severity {
    /// Wire label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Severe => "severe",
            Self::Moderate => "moderate",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "severe" => Self::Severe,
            "moderate" => Self::Moderate,
            _ => Self::Other(value),
        }
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// One agent's contribution to the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Agent display name, e.g. "Data Analyst".
    pub agent: String,
    /// Markdown text.
    pub response: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
