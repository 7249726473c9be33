#![forbid(unsafe_code)]

//! `swarmaid`: terminal dashboard for the disaster-response simulation service.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use swarmaid_dashboard::{
    session, Config, JsonPresenter, Presenter, Session, SimulationClient, TextPresenter,
};
use swarmaid_core::DashboardController;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "swarmaid", version, about = "SwarmAid simulation dashboard")]
struct Args {
    /// TOML config file ([service] base_url/timeout_secs, [dashboard] default_scenario).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation service base URL, e.g. http://127.0.0.1:8000
    #[arg(long)]
    service: Option<String>,

    /// Scenario for the automatic first run.
    #[arg(long)]
    scenario: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Run the initial scenario, print the result and exit.
    #[arg(long)]
    once: bool,

    /// Present a saved /simulate response body instead of calling the service.
    #[arg(long, conflicts_with = "once")]
    replay: Option<PathBuf>,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut cfg = Config::load_or_default(args.config.as_deref())?;
    if let Some(url) = args.service.clone() {
        cfg.service.base_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        anyhow::ensure!(secs > 0, "--timeout-secs must be positive");
        cfg.service.timeout_secs = secs;
    }
    if let Some(s) = args.scenario.clone() {
        cfg.dashboard.default_scenario = s;
    }
    tracing::debug!(?cfg, "configuration");

    match args.format {
        Format::Text => run(&args, cfg, TextPresenter::new(std::io::stdout())).await,
        Format::Json => run(&args, cfg, JsonPresenter::new(std::io::stdout())).await,
    }
}

async fn run<P: Presenter>(args: &Args, cfg: Config, mut presenter: P) -> anyhow::Result<()> {
    let controller = DashboardController::new(cfg.dashboard.default_scenario.clone());

    if let Some(path) = &args.replay {
        let body = tokio::fs::read(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let controller = session::replay(controller, &mut presenter, &body)?;
        return failure_as_error(&controller);
    }

    let client = SimulationClient::from_config(&cfg.service)?;
    tracing::info!(service = %client.base_url(), "dashboard starting");
    let mut session = Session::new(controller, client, presenter);

    if args.once {
        session.mount()?;
        session.settle().await?;
        return failure_as_error(session.controller());
    }

    session
        .run_interactive(BufReader::new(tokio::io::stdin()))
        .await
}

fn failure_as_error(controller: &DashboardController) -> anyhow::Result<()> {
    match controller.error_message() {
        Some(message) => anyhow::bail!("{message}"),
        None => Ok(()),
    }
}
