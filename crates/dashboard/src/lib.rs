#![forbid(unsafe_code)]

//! Terminal front end for the SwarmAid simulation service: HTTP client,
//! configuration, presenters and the session loop driving
//! [`swarmaid_core::DashboardController`].

pub mod client;
pub mod config;
pub mod present;
pub mod session;

pub use client::SimulationClient;
pub use config::Config;
pub use present::{JsonPresenter, Presenter, TextPresenter};
pub use session::Session;
