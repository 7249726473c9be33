//! Viewport fitting.

use serde::{Deserialize, Serialize};

use crate::classify::RenderDescriptor;
use crate::model::LatLon;
use crate::request::RequestSeq;

/// Screen padding, in pixels, the map surface keeps around fitted bounds.
pub const FIT_PADDING_PX: u32 = 40;

/// Minimal rectangle enclosing a set of coordinates, plus the visual margin
/// the map applies when fitting to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    /// Minimum latitude.
    pub south: f64,
    /// Minimum longitude.
    pub west: f64,
    /// Maximum latitude.
    pub north: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Padding in pixels on every side.
    pub padding_px: u32,
}

impl BoundingRegion {
    /// Whether `point` lies inside or on the edge of the rectangle.
    pub fn contains(&self, point: LatLon) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lon)
    }

    /// Geometric center.
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

/// Bounds of every marker center and path point; `None` when there is
/// nothing to fit.
pub fn compute_bounds(descriptors: &[RenderDescriptor]) -> Option<BoundingRegion> {
    let mut points = descriptors.iter().flat_map(|d| d.coordinates().iter().copied());
    let first = points.next()?;
    let init = BoundingRegion {
        south: first.lat,
        west: first.lon,
        north: first.lat,
        east: first.lon,
        padding_px: FIT_PADDING_PX,
    };
    Some(points.fold(init, |b, p| BoundingRegion {
        south: b.south.min(p.lat),
        west: b.west.min(p.lon),
        north: b.north.max(p.lat),
        east: b.east.max(p.lon),
        ..b
    }))
}

/// Applies [`compute_bounds`] once per descriptor set.
///
/// The set is identified by the request sequence that produced it; refitting
/// with a key already seen does nothing, so pan/zoom and re-presentation never
/// move the view.
#[derive(Debug, Default, Clone)]
pub struct ViewportFitter {
    fitted_key: Option<RequestSeq>,
    current: Option<BoundingRegion>,
}

impl ViewportFitter {
    /// Fitter that has not fitted anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes bounds if `key` is new. Returns the region to apply, or
    /// `None` when the key was already fitted or the set has no coordinates
    /// (the previous view is kept in both cases).
    pub fn refit(&mut self, key: RequestSeq, descriptors: &[RenderDescriptor]) -> Option<BoundingRegion> {
        if self.fitted_key == Some(key) {
            return None;
        }
        self.fitted_key = Some(key);
        let region = compute_bounds(descriptors)?;
        tracing::debug!(%key, ?region, "viewport refit");
        self.current = Some(region);
        Some(region)
    }

    /// Last region applied.
    pub fn current(&self) -> Option<BoundingRegion> {
        self.current
    }
}
