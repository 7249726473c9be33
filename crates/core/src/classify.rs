//! Feature -> render descriptor translation.

use serde::{Deserialize, Serialize};

use crate::model::{Feature, Geometry, LatLon, Severity};

/// Marker color for `severity = "severe"`.
pub const SEVERE_COLOR: &str = "#ef4444";
/// Marker color for `severity = "moderate"`.
pub const MODERATE_COLOR: &str = "#f59e0b";
/// Marker color for every other severity, including none.
pub const DEFAULT_MARKER_COLOR: &str = "#3b82f6";
/// Path color for routes. Never equal to a marker color.
pub const ROUTE_COLOR: &str = "#10b981";
/// Marker radius in meters.
pub const MARKER_RADIUS_M: f64 = 1000.0;
/// Label of a point with neither name nor severity.
pub const CLUSTER_LABEL: &str = "Cluster";
/// Label of a line without a name.
pub const ROUTE_LABEL: &str = "Safe Route";

/// Display-ready form of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderDescriptor {
    /// Circle marker.
    Marker {
        /// Center in display order.
        center: LatLon,
        /// Stroke/fill color.
        color: String,
        /// Radius in meters.
        radius_m: f64,
        /// Popup label.
        label: String,
    },
    /// Polyline.
    Path {
        /// Points in display order, source order preserved.
        points: Vec<LatLon>,
        /// Stroke color.
        color: String,
        /// Popup label.
        label: String,
    },
}

impl RenderDescriptor {
    /// Every coordinate the descriptor occupies.
    pub fn coordinates(&self) -> &[LatLon] {
        match self {
            Self::Marker { center, .. } => std::slice::from_ref(center),
            Self::Path { points, .. } => points,
        }
    }

    /// Popup label.
    pub fn label(&self) -> &str {
        match self {
            Self::Marker { label, .. } | Self::Path { label, .. } => label,
        }
    }

    /// Color.
    pub fn color(&self) -> &str {
        match self {
            Self::Marker { color, .. } | Self::Path { color, .. } => color,
        }
    }
}

/// Marker color for a severity.
pub fn severity_color(severity: Option<&Severity>) -> &'static str {
    match severity {
        Some(Severity::Severe) => SEVERE_COLOR,
        Some(Severity::Moderate) => MODERATE_COLOR,
        Some(Severity::Other(_)) | None => DEFAULT_MARKER_COLOR,
    }
}

/// Classifies one feature. `None` means "do not draw": unsupported or
/// missing geometry, or a line without positions.
pub fn classify(feature: &Feature) -> Option<RenderDescriptor> {
    let props = &feature.properties;
    match feature.geometry.as_ref()? {
        Geometry::Point { coordinates } => {
            let severity = props.severity.as_ref();
            let label = props
                .name
                .clone()
                .or_else(|| severity.map(|s| s.as_str().to_string()))
                .unwrap_or_else(|| CLUSTER_LABEL.to_string());
            Some(RenderDescriptor::Marker {
                center: coordinates.to_lat_lon(),
                color: severity_color(severity).to_string(),
                radius_m: MARKER_RADIUS_M,
                label,
            })
        }
        Geometry::LineString { coordinates } => {
            if coordinates.is_empty() {
                return None;
            }
            Some(RenderDescriptor::Path {
                points: coordinates.iter().map(|p| p.to_lat_lon()).collect(),
                color: ROUTE_COLOR.to_string(),
                label: props
                    .name
                    .clone()
                    .unwrap_or_else(|| ROUTE_LABEL.to_string()),
            })
        }
        Geometry::Unsupported => None,
    }
}

/// Classifies every feature, keeping input order and dropping the ones
/// [`classify`] skips.
pub fn classify_all(features: &[Feature]) -> Vec<RenderDescriptor> {
    let out: Vec<_> = features.iter().filter_map(classify).collect();
    let skipped = features.len() - out.len();
    if skipped > 0 {
        tracing::debug!(features = features.len(), skipped, "skipped undrawable features");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, Properties};

    fn point(severity: Option<&str>, name: Option<&str>) -> Feature {
        Feature::point(
            139.7,
            35.7,
            Properties {
                name: name.map(String::from),
                severity: severity.map(|s| Severity::from(s.to_string())),
                ..Properties::default()
            },
        )
    }

    #[test]
    fn point_colors_follow_severity() {
        let cases = [
            (Some("severe"), SEVERE_COLOR),
            (Some("moderate"), MODERATE_COLOR),
            (Some("low"), DEFAULT_MARKER_COLOR),
            (Some("SEVERE"), DEFAULT_MARKER_COLOR),
            (None, DEFAULT_MARKER_COLOR),
        ];
        for (severity, color) in cases {
            let d = classify(&point(severity, None)).unwrap();
            assert_eq!(d.color(), color, "severity {severity:?}");
        }
    }

    #[test]
    fn point_label_fallbacks() {
        assert_eq!(
            classify(&point(Some("severe"), Some("Damage Zone A"))).unwrap().label(),
            "Damage Zone A"
        );
        assert_eq!(classify(&point(Some("moderate"), None)).unwrap().label(), "moderate");
        assert_eq!(classify(&point(None, None)).unwrap().label(), CLUSTER_LABEL);
    }

    #[test]
    fn point_is_swapped_with_fixed_radius() {
        match classify(&point(None, None)).unwrap() {
            RenderDescriptor::Marker {
                center, radius_m, ..
            } => {
                assert_eq!(center, LatLon::new(35.7, 139.7));
                assert_eq!(radius_m, MARKER_RADIUS_M);
            }
            other => panic!("expected marker, got {other:?}"),
        }
    }

    #[test]
    fn line_points_swapped_in_order() {
        let coords = [(139.70, 35.68), (139.71, 35.69), (139.73, 35.70)];
        let d = classify(&Feature::line_string(&coords, Properties::default())).unwrap();
        let expected: Vec<_> = coords.iter().map(|&(lon, lat)| LatLon::new(lat, lon)).collect();
        assert_eq!(d.coordinates(), expected.as_slice());
        assert_eq!(d.label(), ROUTE_LABEL);
        assert_eq!(d.color(), ROUTE_COLOR);
    }

    #[test]
    fn named_line_keeps_name() {
        let f = Feature::line_string(&[(0.0, 0.0)], Properties::named("Route to Shelter 3"));
        assert_eq!(classify(&f).unwrap().label(), "Route to Shelter 3");
    }

    #[test]
    fn route_color_differs_from_marker_colors() {
        for c in [SEVERE_COLOR, MODERATE_COLOR, DEFAULT_MARKER_COLOR] {
            assert_ne!(ROUTE_COLOR, c);
        }
    }

    #[test]
    fn skips_empty_line_unsupported_and_missing_geometry() {
        let empty = Feature::line_string(&[], Properties::named("nowhere"));
        assert_eq!(classify(&empty), None);

        let poly = Feature {
            geometry: Some(Geometry::Unsupported),
            properties: Properties::named("area"),
        };
        assert_eq!(classify(&poly), None);

        let bare = Feature {
            geometry: None,
            properties: Properties::default(),
        };
        assert_eq!(classify(&bare), None);
    }

    #[test]
    fn classify_all_keeps_order() {
        let features = vec![
            point(Some("severe"), Some("A")),
            Feature {
                geometry: Some(Geometry::Unsupported),
                properties: Properties::default(),
            },
            Feature {
                geometry: Some(Geometry::LineString {
                    coordinates: vec![Position::new(1.0, 2.0)],
                }),
                properties: Properties::named("B"),
            },
        ];
        let labels: Vec<_> = classify_all(&features)
            .iter()
            .map(|d| d.label().to_string())
            .collect();
        assert_eq!(labels, ["A", "B"]);
    }
}
