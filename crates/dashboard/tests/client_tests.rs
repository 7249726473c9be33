//! Client and session tests against an in-process simulation stub.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use swarmaid_core::{BoundingRegion, DashboardController, RequestState, SimulationError};
use swarmaid_dashboard::session::replay;
use swarmaid_dashboard::{Presenter, Session, SimulationClient};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn tokyo_body(scenario: &str) -> serde_json::Value {
    json!({
        "scenario": scenario,
        "geojson": {
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Damage Zone A", "severity": "severe"},
                 "geometry": {"type": "Point", "coordinates": [139.6917, 35.6895]}},
                {"type": "Feature", "properties": {"name": "Damage Zone B", "severity": "moderate"},
                 "geometry": {"type": "Point", "coordinates": [139.7417, 35.7395]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[139.69, 35.68], [139.70, 35.69]]}}
            ]
        },
        "logs": [
            {"agent": "Data Analyst", "response": "Two damage zones."},
            {"agent": "Critic", "response": "Plan is *adequate*."}
        ]
    })
}

/// Echoes the scenario back. "fail" answers 500, "garbage" answers a
/// non-JSON 200, "slow" answers after two seconds.
async fn simulate(Query(q): Query<HashMap<String, String>>) -> axum::response::Response {
    let scenario = q.get("scenario").cloned().unwrap_or_default();
    match scenario.as_str() {
        "fail" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "garbage" => (StatusCode::OK, "<html>oops</html>").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(tokyo_body(&scenario)).into_response()
        }
        _ => Json(tokyo_body(&scenario)).into_response(),
    }
}

async fn stub() -> String {
    serve(Router::new().route("/simulate", get(simulate))).await
}

fn client(base: &str) -> SimulationClient {
    SimulationClient::new(base, Duration::from_secs(5)).unwrap()
}

#[derive(Default)]
struct Recorder {
    states: Vec<&'static str>,
    layer_counts: Vec<usize>,
    fits: Vec<BoundingRegion>,
    notices: Vec<String>,
}

impl Presenter for Recorder {
    fn present(&mut self, d: &DashboardController) -> io::Result<()> {
        self.states.push(d.state().label());
        self.layer_counts.push(d.descriptors().len());
        Ok(())
    }

    fn fit_viewport(&mut self, region: &BoundingRegion) -> io::Result<()> {
        self.fits.push(*region);
        Ok(())
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        self.notices.push(message.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn simulate_decodes_response_and_encodes_scenario() {
    let base = stub().await;
    let result = client(&base).simulate("Tokyo earthquake & aftershocks").await.unwrap();
    assert_eq!(result.scenario, "Tokyo earthquake & aftershocks");
    assert_eq!(result.features().len(), 3);
    assert_eq!(result.logs.len(), 2);
    assert_eq!(result.logs[1].agent, "Critic");
}

#[tokio::test]
async fn non_success_status_is_http_error() {
    let base = stub().await;
    let err = client(&base).simulate("fail").await.unwrap_err();
    assert_eq!(
        err,
        SimulationError::HttpStatus {
            status: 500,
            reason: "Internal Server Error".into()
        }
    );
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let base = stub().await;
    let err = client(&base).simulate("garbage").await.unwrap_err();
    assert!(matches!(err, SimulationError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn slow_service_times_out() {
    let base = stub().await;
    let c = SimulationClient::new(base, Duration::from_millis(200)).unwrap();
    let err = c.simulate("slow").await.unwrap_err();
    assert_eq!(err, SimulationError::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}")).simulate("x").await.unwrap_err();
    match err {
        SimulationError::Transport(msg) => assert!(!msg.is_empty()),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn session_once_presents_result_and_fits_view() {
    let base = stub().await;
    let mut session = Session::new(
        DashboardController::default(),
        client(&base),
        Recorder::default(),
    );
    session.mount().unwrap();
    assert_eq!(session.in_flight(), 1);
    session.settle().await.unwrap();
    assert_eq!(session.in_flight(), 0);

    let c = session.controller();
    assert_eq!(c.result_scenario(), Some("Tokyo earthquake"));
    assert_eq!(c.descriptors().len(), 3);

    let p = session.presenter();
    assert_eq!(p.states, ["pending", "succeeded"]);
    assert_eq!(p.fits.len(), 1);
}

#[tokio::test]
async fn failure_after_success_keeps_map() {
    let base = stub().await;
    let mut session = Session::new(
        DashboardController::default(),
        client(&base),
        Recorder::default(),
    );
    session.mount().unwrap();
    session.settle().await.unwrap();

    assert!(session.submit(Some("fail".into())).unwrap());
    session.settle().await.unwrap();

    let c = session.controller();
    assert!(c.error_message().unwrap().contains("500"));
    assert_eq!(c.descriptors().len(), 3);
    assert_eq!(c.displayed_scenario(), Some("Tokyo earthquake"));

    let p = session.presenter();
    assert_eq!(p.states, ["pending", "succeeded", "pending", "failed"]);
    assert_eq!(p.layer_counts, [0, 3, 3, 3]);
    assert_eq!(p.fits.len(), 1);
}

#[tokio::test]
async fn resubmit_replaces_result_and_refits() {
    let base = stub().await;
    let mut session = Session::new(
        DashboardController::new("Osaka flood"),
        client(&base),
        Recorder::default(),
    );
    session.mount().unwrap();
    session.settle().await.unwrap();
    assert_eq!(session.controller().result_scenario(), Some("Osaka flood"));

    assert!(session.submit(Some("Lima flood".into())).unwrap());
    session.settle().await.unwrap();
    assert_eq!(session.controller().result_scenario(), Some("Lima flood"));
    assert_eq!(session.controller().scenario(), "Lima flood");
    assert_eq!(session.presenter().fits.len(), 2);
}

#[tokio::test]
async fn interactive_rejects_input_while_pending() {
    let base = stub().await;
    let mut session = Session::new(
        DashboardController::default(),
        client(&base),
        Recorder::default(),
    );
    session
        .run_interactive(&b"Lima flood\n:quit\n"[..])
        .await
        .unwrap();

    let (controller, presenter) = session.into_parts();
    assert_eq!(presenter.notices.len(), 1);
    assert_eq!(controller.result_scenario(), Some("Tokyo earthquake"));
    assert!(matches!(controller.state(), RequestState::Succeeded(_)));
}

#[tokio::test]
async fn interactive_eof_waits_for_initial_run() {
    let base = stub().await;
    let mut session = Session::new(
        DashboardController::default(),
        client(&base),
        Recorder::default(),
    );
    session.run_interactive(&b""[..]).await.unwrap();
    assert_eq!(session.in_flight(), 0);
    assert_eq!(session.presenter().states.last(), Some(&"succeeded"));
}

#[test]
fn replay_presents_saved_body() {
    let body = serde_json::to_vec(&tokyo_body("Tokyo earthquake")).unwrap();
    let mut p = Recorder::default();
    let c = replay(DashboardController::default(), &mut p, &body).unwrap();
    assert_eq!(c.descriptors().len(), 3);
    assert_eq!(p.states, ["succeeded"]);
    assert_eq!(p.fits.len(), 1);

    let mut p = Recorder::default();
    let c = replay(DashboardController::default(), &mut p, b"{}").unwrap();
    assert!(c.error_message().unwrap().contains("decode error"));
    assert_eq!(p.states, ["failed"]);
}
