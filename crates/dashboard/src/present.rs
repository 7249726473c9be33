//! Presentation layer: renders the controller's state record.

use std::io::{self, Write};

use serde::Serialize;
use swarmaid_core::{BoundingRegion, DashboardController, LatLon, LogEntry, RenderDescriptor, RequestState};

/// Something that can show the dashboard. Receives the whole state record on
/// every change and each fresh viewport fit exactly once.
pub trait Presenter {
    /// Draws the current state.
    fn present(&mut self, dashboard: &DashboardController) -> io::Result<()>;

    /// Moves the map view to `region`.
    fn fit_viewport(&mut self, region: &BoundingRegion) -> io::Result<()>;

    /// Transient message, e.g. a rejected submission.
    fn notice(&mut self, message: &str) -> io::Result<()>;
}

/// Borrowed, serializable view of the dashboard.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub scenario: &'a str,
    pub state: &'static str,
    pub can_submit: bool,
    pub map: MapSnapshot<'a>,
    pub panel: PanelSnapshot<'a>,
}

#[derive(Debug, Serialize)]
pub struct MapSnapshot<'a> {
    pub scenario: Option<&'a str>,
    pub viewport: Option<BoundingRegion>,
    pub layers: &'a [RenderDescriptor],
}

#[derive(Debug, Serialize)]
pub struct PanelSnapshot<'a> {
    pub scenario: Option<&'a str>,
    pub error: Option<&'a str>,
    pub logs: &'a [LogEntry],
}

impl<'a> Snapshot<'a> {
    pub fn of(d: &'a DashboardController) -> Self {
        Self {
            scenario: d.scenario(),
            state: d.state().label(),
            can_submit: d.can_submit(),
            map: MapSnapshot {
                scenario: d.displayed_scenario(),
                viewport: d.viewport(),
                layers: d.descriptors(),
            },
            panel: PanelSnapshot {
                scenario: d.result_scenario(),
                error: d.error_message(),
                logs: d.logs(),
            },
        }
    }
}

/// Human-readable terminal output.
pub struct TextPresenter<W> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn map(&mut self, d: &DashboardController) -> io::Result<()> {
        match d.displayed_scenario() {
            Some(s) => writeln!(self.out, "-- Map: {s} --")?,
            None => writeln!(self.out, "-- Map --")?,
        }
        if let Some(v) = d.viewport() {
            writeln!(self.out, "  view {}", region(&v))?;
        }
        if d.descriptors().is_empty() {
            writeln!(self.out, "  (no features)")?;
        }
        for desc in d.descriptors() {
            match desc {
                RenderDescriptor::Marker {
                    center,
                    color,
                    radius_m,
                    label,
                } => writeln!(
                    self.out,
                    "  o {label} [{color}] at {} r={radius_m}m",
                    lat_lon(center)
                )?,
                RenderDescriptor::Path {
                    points,
                    color,
                    label,
                } => {
                    if let (Some(first), Some(last)) = (points.first(), points.last()) {
                        writeln!(
                            self.out,
                            "  ~ {label} [{color}] {} points {} -> {}",
                            points.len(),
                            lat_lon(first),
                            lat_lon(last)
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    fn panel(&mut self, d: &DashboardController) -> io::Result<()> {
        match d.result_scenario() {
            Some(s) => writeln!(self.out, "-- Agent Logs (Scenario: {s}) --")?,
            None => writeln!(self.out, "-- Agent Logs (No scenario yet) --")?,
        }
        match d.state() {
            RequestState::Idle | RequestState::Pending => {
                writeln!(self.out, "  Waiting for results...")?;
            }
            RequestState::Failed(message) => {
                writeln!(self.out, "  ! {message}")?;
            }
            RequestState::Succeeded(_) => {
                for entry in d.logs() {
                    writeln!(self.out, "  {}", entry.agent.to_uppercase())?;
                    for line in entry.response.lines() {
                        writeln!(self.out, "    {line}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, d: &DashboardController) -> io::Result<()> {
        let button = if d.can_submit() { "Run Simulation" } else { "Running..." };
        writeln!(self.out, "== SwarmAid Dashboard ==")?;
        writeln!(self.out, "Scenario: {}  [{button}]", d.scenario())?;
        self.map(d)?;
        self.panel(d)?;
        self.out.flush()
    }

    fn fit_viewport(&mut self, r: &BoundingRegion) -> io::Result<()> {
        writeln!(self.out, ">> fit view {}", region(r))?;
        self.out.flush()
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, ">> {message}")?;
        self.out.flush()
    }
}

fn lat_lon(p: &LatLon) -> String {
    format!("({:.4}, {:.4})", p.lat, p.lon)
}

fn region(r: &BoundingRegion) -> String {
    format!(
        "{} .. {} pad {}px",
        lat_lon(&LatLon::new(r.south, r.west)),
        lat_lon(&LatLon::new(r.north, r.east)),
        r.padding_px
    )
}

/// One JSON object per line, tagged by `event`.
pub struct JsonPresenter<W> {
    out: W,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    State(Snapshot<'a>),
    FitViewport { region: &'a BoundingRegion },
    Notice { message: &'a str },
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn present(&mut self, d: &DashboardController) -> io::Result<()> {
        self.emit(&Event::State(Snapshot::of(d)))
    }

    fn fit_viewport(&mut self, region: &BoundingRegion) -> io::Result<()> {
        self.emit(&Event::FitViewport { region })
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        self.emit(&Event::Notice { message })
    }
}
