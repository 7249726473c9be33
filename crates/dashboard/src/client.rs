use std::time::Duration;

use anyhow::Context;
use reqwest::Url;
use swarmaid_core::{SimulationError, SimulationResult};

use crate::config::ServiceConfig;

/// HTTP client for `GET /simulate`. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SimulationClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl SimulationClient {
    /// Client for the service at `base_url`, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url).with_context(|| format!("invalid service url {base_url:?}"))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn from_config(cfg: &ServiceConfig) -> anyhow::Result<Self> {
        Self::new(cfg.base_url.clone(), cfg.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request URL for `scenario`, query-encoded.
    pub fn simulate_url(&self, scenario: &str) -> Result<Url, SimulationError> {
        let endpoint = format!("{}/simulate", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, &[("scenario", scenario)])
            .map_err(|e| SimulationError::Transport(e.to_string()))
    }

    /// Runs one simulation. Never retries.
    pub async fn simulate(&self, scenario: &str) -> Result<SimulationResult, SimulationError> {
        let url = self.simulate_url(scenario)?;
        tracing::debug!(%url, "requesting simulation");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, scenario, "simulation service rejected request");
            return Err(SimulationError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        SimulationResult::from_json_slice(&body)
    }

    fn transport_error(&self, err: reqwest::Error) -> SimulationError {
        if err.is_timeout() {
            return SimulationError::Timeout(self.timeout);
        }
        SimulationError::Transport(error_chain(&err))
    }
}

/// `err` and its sources joined with `": "`; reqwest keeps the useful part
/// (connection refused, dns failure) in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        let text = e.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = e.source();
    }
    out
}
