#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Data-to-visualization pipeline for the SwarmAid dashboard.
//!
//! Decodes simulation responses, classifies GeoJSON features into render
//! descriptors, fits the map viewport and tracks the request state machine.
//! Transport and presentation live in `swarmaid-dashboard`.

pub mod classify;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod request;
pub mod viewport;

pub use classify::{classify, classify_all, RenderDescriptor};
pub use dashboard::{DashboardController, RunTicket, DEFAULT_SCENARIO};
pub use error::SimulationError;
pub use model::{Feature, Geometry, LatLon, LogEntry, Position, Properties, Severity, SimulationResult};
pub use request::{RequestSeq, RequestState, RequestTracker, Resolution};
pub use viewport::{compute_bounds, BoundingRegion, ViewportFitter};
