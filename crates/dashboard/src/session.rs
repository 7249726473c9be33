//! Session loop: owns the controller, runs fetches, applies completions.
//!
//! Everything that touches [`DashboardController`] happens on the loop.
//! Fetches are spawned and report back over a channel tagged with their
//! [`RequestSeq`]; a completion for a superseded run is dropped by the
//! controller.

use anyhow::Result;
use swarmaid_core::{
    DashboardController, RequestSeq, Resolution, RunTicket, SimulationError, SimulationResult,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::client::SimulationClient;
use crate::present::Presenter;

/// Input line that ends an interactive session.
pub const QUIT_COMMAND: &str = ":quit";

#[derive(Debug)]
struct Completion {
    seq: RequestSeq,
    outcome: Result<SimulationResult, SimulationError>,
}

pub struct Session<P> {
    controller: DashboardController,
    client: SimulationClient,
    presenter: P,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<P: Presenter> Session<P> {
    pub fn new(controller: DashboardController, client: SimulationClient, presenter: P) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            client,
            presenter,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn controller(&self) -> &DashboardController {
        &self.controller
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Requests whose completion has not been applied yet, stale ones
    /// included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// First presentation: issues the automatic run.
    pub fn mount(&mut self) -> Result<()> {
        if let Some(ticket) = self.controller.mount() {
            self.dispatch(ticket);
        }
        self.render()
    }

    /// User submission. `text` replaces the scenario first; `None` re-runs
    /// the current one. Returns whether a run was started.
    pub fn submit(&mut self, text: Option<String>) -> Result<bool> {
        if !self.controller.can_submit() {
            self.presenter
                .notice("simulation already running; wait for it to finish")?;
            return Ok(false);
        }
        if let Some(text) = text {
            self.controller.set_scenario(text);
        }
        let Some(ticket) = self.controller.submit() else {
            return Ok(false);
        };
        self.dispatch(ticket);
        self.render()?;
        Ok(true)
    }

    fn dispatch(&mut self, ticket: RunTicket) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = client.simulate(&ticket.scenario).await;
            // The receiver lives as long as the session; a closed channel
            // means nobody is left to show the result.
            let _ = tx.send(Completion {
                seq: ticket.seq,
                outcome,
            });
        });
    }

    fn apply(&mut self, done: Completion) -> Result<Resolution> {
        self.in_flight = self.in_flight.saturating_sub(1);
        let resolution = self.controller.complete(done.seq, done.outcome);
        if resolution == Resolution::Applied {
            if let Some(region) = self.controller.take_viewport_fit() {
                self.presenter.fit_viewport(&region)?;
            }
            self.render()?;
        }
        Ok(resolution)
    }

    fn render(&mut self) -> Result<()> {
        self.presenter.present(&self.controller)?;
        Ok(())
    }

    /// Waits for the next completion and applies it. `None` when nothing is
    /// in flight.
    pub async fn settle_one(&mut self) -> Result<Option<Resolution>> {
        if self.in_flight == 0 {
            return Ok(None);
        }
        match self.rx.recv().await {
            Some(done) => self.apply(done).map(Some),
            None => Ok(None),
        }
    }

    /// Applies completions until nothing is in flight.
    pub async fn settle(&mut self) -> Result<()> {
        while self.settle_one().await?.is_some() {}
        Ok(())
    }

    /// Mounts, then submits one scenario per input line until EOF or
    /// [`QUIT_COMMAND`]. An empty line re-runs the current scenario. Returns
    /// once input is closed and the last run has settled.
    pub async fn run_interactive<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.mount()?;
        let mut lines = input.lines();
        let mut input_open = true;

        while input_open || self.in_flight > 0 {
            tokio::select! {
                Some(done) = self.rx.recv(), if self.in_flight > 0 => {
                    self.apply(done)?;
                }
                line = lines.next_line(), if input_open => match line? {
                    None => input_open = false,
                    Some(line) if line.trim() == QUIT_COMMAND => input_open = false,
                    Some(line) => {
                        let text = (!line.is_empty()).then_some(line);
                        self.submit(text)?;
                    }
                },
                else => break,
            }
        }
        tracing::debug!("session finished");
        Ok(())
    }

    pub fn into_parts(self) -> (DashboardController, P) {
        (self.controller, self.presenter)
    }
}

/// Presents a saved response body as if the automatic run had returned it.
/// A body that fails to decode shows up as a failed run.
pub fn replay<P: Presenter>(
    mut controller: DashboardController,
    presenter: &mut P,
    body: &[u8],
) -> Result<DashboardController> {
    if let Some(ticket) = controller.mount() {
        controller.complete(ticket.seq, SimulationResult::from_json_slice(body));
    }
    if let Some(region) = controller.take_viewport_fit() {
        presenter.fit_viewport(&region)?;
    }
    presenter.present(&controller)?;
    Ok(controller)
}
