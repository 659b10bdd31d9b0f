use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::http::StatusCode;
use shared::protocol::{MajorIncome, PlotImage, Statistics};
use tokio::sync::Notify;

use super::*;
use crate::{
    error::{Endpoint, FetchFailure, FALLBACK_FAILURE_MESSAGE},
    render::{render, Screen},
    test_support::{plot_body, spawn_fixture, statistics_body, Reply},
    AnalyticsClient, AnalyticsSource,
};

struct Step<T> {
    gate: Option<Arc<Notify>>,
    result: Result<T, FetchFailure>,
}

impl<T> Step<T> {
    fn ready(result: Result<T, FetchFailure>) -> Self {
        Self { gate: None, result }
    }

    fn gated(gate: Arc<Notify>, result: Result<T, FetchFailure>) -> Self {
        Self {
            gate: Some(gate),
            result,
        }
    }
}

/// Source that replays scripted responses and records every call it receives.
#[derive(Default)]
struct ScriptedSource {
    statistics: Mutex<VecDeque<Step<Statistics>>>,
    plots: Mutex<VecDeque<Step<PlotImage>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedSource {
    fn push_statistics(&self, step: Step<Statistics>) -> &Self {
        self.statistics.lock().expect("statistics script").push_back(step);
        self
    }

    fn push_plot(&self, step: Step<PlotImage>) -> &Self {
        self.plots.lock().expect("plot script").push_back(step);
        self
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("call log").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("call log").push(call);
    }
}

#[async_trait]
impl AnalyticsSource for ScriptedSource {
    async fn fetch_statistics(&self) -> Result<Statistics, FetchFailure> {
        self.record("statistics:start");
        let step = self.statistics.lock().expect("statistics script").pop_front();
        let Some(step) = step else {
            return Err(FetchFailure::new(Endpoint::Statistics, "no scripted response"));
        };
        if let Some(gate) = step.gate {
            gate.notified().await;
        }
        self.record("statistics:done");
        step.result
    }

    async fn fetch_plot(&self) -> Result<PlotImage, FetchFailure> {
        self.record("plot:start");
        let step = self.plots.lock().expect("plot script").pop_front();
        let Some(step) = step else {
            return Err(FetchFailure::new(Endpoint::Plot, "no scripted response"));
        };
        if let Some(gate) = step.gate {
            gate.notified().await;
        }
        self.record("plot:done");
        step.result
    }
}

fn statistics(total_majors: u64, top: &[(&str, f64)]) -> Statistics {
    Statistics {
        total_majors,
        avg_income: 50000.0,
        max_income: 90000.0,
        min_income: 20000.0,
        top_majors: top
            .iter()
            .map(|(major, income)| MajorIncome {
                major: (*major).to_string(),
                income: *income,
            })
            .collect(),
        source: None,
    }
}

fn plot(source: &str) -> PlotImage {
    PlotImage::new(source).expect("plot image")
}

fn controller_for(source: &Arc<ScriptedSource>) -> ViewController {
    ViewController::new(source.clone())
}

async fn wait_for_calls(source: &ScriptedSource, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while source.calls().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("scripted source was not called in time");
}

#[tokio::test]
async fn starts_loading_before_any_response() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::default());
    source
        .push_statistics(Step::gated(gate.clone(), Ok(statistics(5, &[]))))
        .push_plot(Step::ready(Ok(plot("data:foo"))));
    let controller = controller_for(&source);
    assert_eq!(controller.state(), ViewState::Loading);

    let task = controller.spawn_load();
    wait_for_calls(&source, 1).await;
    assert_eq!(controller.state(), ViewState::Loading);

    gate.notify_one();
    task.await.expect("load task");
    assert!(matches!(controller.state(), ViewState::Ready { .. }));
}

#[tokio::test]
async fn happy_path_reaches_ready_with_exact_values() {
    let fixture = spawn_fixture(Reply::ok(statistics_body()), Reply::ok(plot_body()))
        .await
        .expect("spawn fixture");
    let client = AnalyticsClient::new(&fixture.base_url).expect("client");
    let controller = ViewController::new(Arc::new(client));

    controller.load_all().await;

    let expected = ViewState::Ready {
        statistics: statistics(5, &[("CS", 90000.0)]),
        plot: Some(plot("data:foo")),
    };
    assert_eq!(controller.state(), expected);

    let Screen::Ready(screen) = render(&controller.state()) else {
        panic!("expected ready screen");
    };
    assert_eq!(screen.top_majors[0].rank, 1);
    assert_eq!(screen.top_majors[0].major, "CS");
    assert_eq!(screen.top_majors[0].income, "$90,000");
}

#[tokio::test]
async fn statistics_failure_never_requests_plot() {
    let fixture = spawn_fixture(
        Reply::api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve statistics"),
        Reply::ok(plot_body()),
    )
    .await
    .expect("spawn fixture");
    let client = AnalyticsClient::new(&fixture.base_url).expect("client");
    let controller = ViewController::new(Arc::new(client));

    controller.load_all().await;

    assert_eq!(fixture.statistics_hits(), 1);
    assert_eq!(fixture.plot_hits(), 0);
    let ViewState::Error { message } = controller.state() else {
        panic!("expected error state");
    };
    assert!(message.contains("Failed to retrieve statistics"));
}

#[tokio::test]
async fn plot_failure_after_statistics_is_not_partial_ready() {
    let fixture = spawn_fixture(
        Reply::ok(statistics_body()),
        Reply::api_error(StatusCode::NOT_FOUND, "No data available for plotting"),
    )
    .await
    .expect("spawn fixture");
    let client = AnalyticsClient::new(&fixture.base_url).expect("client");
    let controller = ViewController::new(Arc::new(client));

    controller.load_all().await;

    assert_eq!(fixture.statistics_hits(), 1);
    assert_eq!(fixture.plot_hits(), 1);
    assert!(matches!(controller.state(), ViewState::Error { .. }));
}

#[tokio::test]
async fn retry_from_error_reruns_both_calls() {
    let source = Arc::new(ScriptedSource::default());
    source
        .push_statistics(Step::ready(Ok(statistics(5, &[("CS", 90000.0)]))))
        .push_plot(Step::ready(Err(FetchFailure::status(Endpoint::Plot, 500, None))))
        .push_statistics(Step::ready(Ok(statistics(7, &[("Math", 80000.0)]))))
        .push_plot(Step::ready(Ok(plot("data:fresh"))));
    let controller = controller_for(&source);

    controller.load_all().await;
    assert!(matches!(controller.state(), ViewState::Error { .. }));

    controller.retry().await;
    assert_eq!(
        controller.state(),
        ViewState::Ready {
            statistics: statistics(7, &[("Math", 80000.0)]),
            plot: Some(plot("data:fresh")),
        }
    );
    assert_eq!(
        source.calls(),
        vec![
            "statistics:start",
            "statistics:done",
            "plot:start",
            "plot:done",
            "statistics:start",
            "statistics:done",
            "plot:start",
            "plot:done",
        ]
    );
}

#[tokio::test]
async fn refresh_from_ready_passes_through_loading() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::default());
    source
        .push_statistics(Step::ready(Ok(statistics(5, &[("CS", 90000.0)]))))
        .push_plot(Step::ready(Ok(plot("data:first"))))
        .push_statistics(Step::gated(
            gate.clone(),
            Err(FetchFailure::transport(Endpoint::Statistics, "connection reset")),
        ));
    let controller = controller_for(&source);

    controller.load_all().await;
    assert!(matches!(controller.state(), ViewState::Ready { .. }));

    let refresh = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh().await })
    };
    wait_for_calls(&source, 5).await;
    assert_eq!(controller.state(), ViewState::Loading);

    gate.notify_one();
    refresh.await.expect("refresh task");
    assert_eq!(
        controller.state(),
        ViewState::Error {
            message: "failed to reach statistics endpoint: connection reset".to_string(),
        }
    );
}

#[tokio::test]
async fn plot_is_requested_only_after_statistics_resolved() {
    let statistics_gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::default());
    source
        .push_statistics(Step::gated(statistics_gate.clone(), Ok(statistics(1, &[]))))
        .push_plot(Step::ready(Ok(plot("data:foo"))));
    let controller = controller_for(&source);

    let task = controller.spawn_load();
    wait_for_calls(&source, 1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(source.calls(), vec!["statistics:start"]);

    statistics_gate.notify_one();
    task.await.expect("load task");
    assert_eq!(
        source.calls(),
        vec!["statistics:start", "statistics:done", "plot:start", "plot:done"]
    );
}

#[tokio::test]
async fn stale_invocation_cannot_overwrite_newer_result() {
    let slow_gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::default());
    source
        .push_statistics(Step::gated(
            slow_gate.clone(),
            Ok(statistics(1, &[("Stale", 1000.0)])),
        ))
        .push_statistics(Step::ready(Ok(statistics(2, &[("Fresh", 2000.0)]))))
        .push_plot(Step::ready(Ok(plot("data:fresh"))))
        .push_plot(Step::ready(Ok(plot("data:stale"))));
    let controller = controller_for(&source);

    let slow = controller.spawn_load();
    wait_for_calls(&source, 1).await;

    controller.refresh().await;
    let fresh = ViewState::Ready {
        statistics: statistics(2, &[("Fresh", 2000.0)]),
        plot: Some(plot("data:fresh")),
    };
    assert_eq!(controller.state(), fresh);
    assert_eq!(controller.generation(), 2);

    slow_gate.notify_one();
    slow.await.expect("slow task");
    assert_eq!(controller.state(), fresh);
}

#[tokio::test]
async fn teardown_turns_pending_commit_into_no_op() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::default());
    source
        .push_statistics(Step::gated(gate.clone(), Ok(statistics(5, &[]))))
        .push_plot(Step::ready(Ok(plot("data:foo"))));
    let controller = controller_for(&source);

    let task = controller.spawn_load();
    wait_for_calls(&source, 1).await;
    controller.teardown();
    assert!(!controller.is_alive());

    gate.notify_one();
    task.await.expect("load task");
    assert_eq!(controller.state(), ViewState::Loading);

    controller.load_all().await;
    assert_eq!(source.calls().len(), 4);
}

#[tokio::test]
async fn blank_failure_detail_uses_fallback_message() {
    let source = Arc::new(ScriptedSource::default());
    source.push_statistics(Step::ready(Err(FetchFailure::new(Endpoint::Statistics, ""))));
    let controller = controller_for(&source);

    controller.load_all().await;

    assert_eq!(
        controller.state(),
        ViewState::Error {
            message: FALLBACK_FAILURE_MESSAGE.to_string(),
        }
    );
    assert_eq!(source.calls(), vec!["statistics:start", "statistics:done"]);
}

#[tokio::test]
async fn subscribers_observe_committed_state() {
    let source = Arc::new(ScriptedSource::default());
    source
        .push_statistics(Step::ready(Ok(statistics(5, &[]))))
        .push_plot(Step::ready(Ok(plot("data:foo"))));
    let controller = controller_for(&source);
    let mut updates = controller.subscribe();
    assert!(updates.borrow_and_update().is_loading());

    controller.load_all().await;

    assert!(updates.has_changed().expect("controller alive"));
    assert_eq!(updates.borrow_and_update().label(), "ready");
}
