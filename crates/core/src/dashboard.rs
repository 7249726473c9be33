//! Dashboard controller: the single owned state record behind the UI.

use crate::classify::{classify_all, RenderDescriptor};
use crate::error::SimulationError;
use crate::model::{LogEntry, SimulationResult};
use crate::request::{RequestSeq, RequestState, RequestTracker, Resolution};
use crate::viewport::{BoundingRegion, ViewportFitter};

/// Scenario used for the automatic run when nothing else is configured.
pub const DEFAULT_SCENARIO: &str = "Tokyo earthquake";

/// A run the driver must execute: fetch `scenario` and report back with `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    /// Sequence the completion must carry.
    pub seq: RequestSeq,
    /// Scenario text exactly as entered.
    pub scenario: String,
}

/// Map layers from the last applied success. Survive later pending and
/// failed states.
#[derive(Debug, Default)]
struct MapLayers {
    scenario: Option<String>,
    descriptors: Vec<RenderDescriptor>,
}

/// Owns scenario text, request state and derived map layers. All mutation
/// goes through its methods.
#[derive(Debug)]
pub struct DashboardController {
    scenario: String,
    mounted: bool,
    tracker: RequestTracker,
    layers: MapLayers,
    fitter: ViewportFitter,
    fresh_fit: Option<BoundingRegion>,
}

impl Default for DashboardController {
    fn default() -> Self {
        Self::new(DEFAULT_SCENARIO)
    }
}

impl DashboardController {
    /// Controller holding `default_scenario` as the initial input text.
    pub fn new(default_scenario: impl Into<String>) -> Self {
        Self {
            scenario: default_scenario.into(),
            mounted: false,
            tracker: RequestTracker::new(),
            layers: MapLayers::default(),
            fitter: ViewportFitter::new(),
            fresh_fit: None,
        }
    }

    /// Current input text.
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Replaces the input text. Does not start a run.
    pub fn set_scenario(&mut self, text: impl Into<String>) {
        self.scenario = text.into();
    }

    /// Automatic run on first presentation. Only the first call issues a
    /// ticket.
    pub fn mount(&mut self) -> Option<RunTicket> {
        if std::mem::replace(&mut self.mounted, true) {
            return None;
        }
        Some(self.issue())
    }

    /// Whether submission controls are enabled.
    pub fn can_submit(&self) -> bool {
        !self.tracker.state().is_pending()
    }

    /// Explicit user run with the current input text. `None` while a run is
    /// pending.
    pub fn submit(&mut self) -> Option<RunTicket> {
        if !self.can_submit() {
            tracing::debug!(scenario = %self.scenario, "submit ignored while pending");
            return None;
        }
        self.mounted = true;
        Some(self.issue())
    }

    fn issue(&mut self) -> RunTicket {
        let seq = self.tracker.begin();
        tracing::info!(%seq, scenario = %self.scenario, "simulation requested");
        RunTicket {
            seq,
            scenario: self.scenario.clone(),
        }
    }

    /// Feeds the outcome of run `seq` back in.
    pub fn complete(
        &mut self,
        seq: RequestSeq,
        outcome: Result<SimulationResult, SimulationError>,
    ) -> Resolution {
        let resolution = self.tracker.resolve(seq, outcome);
        if resolution == Resolution::Stale {
            return resolution;
        }
        match self.tracker.state() {
            RequestState::Succeeded(result) => {
                let descriptors = classify_all(result.features());
                tracing::info!(
                    %seq,
                    scenario = %result.scenario,
                    features = result.features().len(),
                    drawn = descriptors.len(),
                    logs = result.logs.len(),
                    "simulation received"
                );
                self.layers = MapLayers {
                    scenario: Some(result.scenario.clone()),
                    descriptors,
                };
                if let Some(region) = self.fitter.refit(seq, &self.layers.descriptors) {
                    self.fresh_fit = Some(region);
                }
            }
            RequestState::Failed(message) => {
                tracing::warn!(%seq, error = %message, "simulation failed");
            }
            RequestState::Idle | RequestState::Pending => {}
        }
        resolution
    }

    /// Current request state.
    pub fn state(&self) -> &RequestState {
        self.tracker.state()
    }

    /// Map layers of the last success.
    pub fn descriptors(&self) -> &[RenderDescriptor] {
        &self.layers.descriptors
    }

    /// Scenario reported by the last success, for the map caption.
    pub fn displayed_scenario(&self) -> Option<&str> {
        self.layers.scenario.as_deref()
    }

    /// Log entries; empty unless the latest request succeeded.
    pub fn logs(&self) -> &[LogEntry] {
        match self.tracker.state() {
            RequestState::Succeeded(result) => result.logs.as_slice(),
            _ => &[],
        }
    }

    /// Scenario of the log panel's result; `None` unless succeeded.
    pub fn result_scenario(&self) -> Option<&str> {
        match self.tracker.state() {
            RequestState::Succeeded(result) => Some(result.scenario.as_str()),
            _ => None,
        }
    }

    /// Failure text shown in place of logs.
    pub fn error_message(&self) -> Option<&str> {
        match self.tracker.state() {
            RequestState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Viewport currently applied.
    pub fn viewport(&self) -> Option<BoundingRegion> {
        self.fitter.current()
    }

    /// A fit produced by a new result, handed out once.
    pub fn take_viewport_fit(&mut self) -> Option<BoundingRegion> {
        self.fresh_fit.take()
    }
}
