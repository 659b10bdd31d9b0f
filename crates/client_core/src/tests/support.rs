//! In-process analytics service used by the HTTP-level tests.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
pub(crate) enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
}

impl Reply {
    pub(crate) fn ok(body: Value) -> Self {
        Reply::Json(StatusCode::OK, body)
    }

    pub(crate) fn api_error(status: StatusCode, message: &str) -> Self {
        Reply::Json(status, json!({ "error": message }))
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(status, body) => (status, Json(body)).into_response(),
            Reply::Text(status, body) => {
                (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
            }
        }
    }
}

#[derive(Clone)]
struct FixtureState {
    statistics: Reply,
    plot: Reply,
    statistics_delay: Duration,
    statistics_hits: Arc<AtomicUsize>,
    plot_hits: Arc<AtomicUsize>,
}

pub(crate) struct Fixture {
    pub(crate) base_url: String,
    statistics_hits: Arc<AtomicUsize>,
    plot_hits: Arc<AtomicUsize>,
}

impl Fixture {
    pub(crate) fn statistics_hits(&self) -> usize {
        self.statistics_hits.load(Ordering::SeqCst)
    }

    pub(crate) fn plot_hits(&self) -> usize {
        self.plot_hits.load(Ordering::SeqCst)
    }
}

pub(crate) fn statistics_body() -> Value {
    json!({
        "total_majors": 5,
        "avg_income": 50000,
        "max_income": 90000,
        "min_income": 20000,
        "top_majors": [{ "major": "CS", "income": 90000 }]
    })
}

pub(crate) fn plot_body() -> Value {
    json!({ "image": "data:foo" })
}

async fn statistics_route(State(state): State<FixtureState>) -> Response {
    state.statistics_hits.fetch_add(1, Ordering::SeqCst);
    if !state.statistics_delay.is_zero() {
        tokio::time::sleep(state.statistics_delay).await;
    }
    state.statistics.into_response()
}

async fn plot_route(State(state): State<FixtureState>) -> Response {
    state.plot_hits.fetch_add(1, Ordering::SeqCst);
    state.plot.into_response()
}

async fn health_route() -> Json<Value> {
    Json(json!({ "status": "API is running" }))
}

pub(crate) async fn spawn_fixture(statistics: Reply, plot: Reply) -> Result<Fixture> {
    spawn_fixture_with_delay(statistics, plot, Duration::ZERO).await
}

pub(crate) async fn spawn_fixture_with_delay(
    statistics: Reply,
    plot: Reply,
    statistics_delay: Duration,
) -> Result<Fixture> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = FixtureState {
        statistics,
        plot,
        statistics_delay,
        statistics_hits: Arc::new(AtomicUsize::new(0)),
        plot_hits: Arc::new(AtomicUsize::new(0)),
    };
    let fixture = Fixture {
        base_url: format!("http://{addr}"),
        statistics_hits: state.statistics_hits.clone(),
        plot_hits: state.plot_hits.clone(),
    };
    let app = Router::new()
        .route("/api/statistics", get(statistics_route))
        .route("/api/plot", get(plot_route))
        .route("/api/health", get(health_route))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(fixture)
}
