//! Simulation request state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::model::SimulationResult;

/// Sequence number tagging each issued request. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestSeq(u64);

impl RequestSeq {
    /// Wraps a raw sequence number.
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Raw value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The latest request succeeded.
    Succeeded(SimulationResult),
    /// The latest request failed; human-readable cause.
    Failed(String),
}

impl RequestState {
    /// In-flight check.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Short lowercase name, for logs and machine output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// What [`RequestTracker::resolve`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The outcome became the current state.
    Applied,
    /// A newer request was issued (or nothing is pending); ignored.
    Stale,
}

/// Owns the [`RequestState`] and the sequence counter. Last request issued
/// wins, regardless of the order responses arrive in.
#[derive(Debug, Default)]
pub struct RequestTracker {
    last_issued: u64,
    state: RequestState,
}

impl RequestTracker {
    /// Tracker in [`RequestState::Idle`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Latest issued sequence, if any.
    pub fn latest(&self) -> Option<RequestSeq> {
        (self.last_issued > 0).then_some(RequestSeq(self.last_issued))
    }

    /// Starts a request from any state. Any previous payload or error is
    /// dropped and an in-flight request is superseded.
    pub fn begin(&mut self) -> RequestSeq {
        self.last_issued += 1;
        let seq = RequestSeq(self.last_issued);
        if self.state.is_pending() {
            tracing::debug!(%seq, "superseding in-flight request");
        }
        self.state = RequestState::Pending;
        seq
    }

    /// Applies the outcome of request `seq` if it is still authoritative.
    pub fn resolve(
        &mut self,
        seq: RequestSeq,
        outcome: Result<SimulationResult, SimulationError>,
    ) -> Resolution {
        if seq.0 != self.last_issued || !self.state.is_pending() {
            tracing::info!(%seq, latest = self.last_issued, "discarding stale response");
            return Resolution::Stale;
        }
        self.state = match outcome {
            Ok(result) => RequestState::Succeeded(result),
            Err(err) => RequestState::Failed(failure_message(&err)),
        };
        Resolution::Applied
    }
}

/// User-facing text for a failed request.
pub fn failure_message(err: &SimulationError) -> String {
    format!("could not fetch simulation: {err}")
}
