//! Error taxonomy for simulation requests.

use std::time::Duration;

use thiserror::Error;

/// Why a simulation request did not produce a result.
///
/// The dashboard does not branch on the variant; every error collapses into
/// [`RequestState::Failed`](crate::RequestState::Failed) carrying its display
/// text. The variants exist so the message names the underlying cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// Network unreachable, connection refused, body read failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The request exceeded the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The service answered with a non-2xx status.
    #[error("HTTP {status} {reason}")]
    HttpStatus {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase, empty when unknown.
        reason: String,
    },
    /// The body was not a structurally valid simulation response.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for SimulationError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
