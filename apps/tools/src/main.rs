//! Developer tooling: a fixture analytics service for running the viewers
//! without the real backend, plus a fixture file checker.

use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use shared::{
    error::ApiError,
    protocol::{
        HealthResponse, MajorIncome, PlotResponse, Statistics, HEALTH_PATH, PLOT_PATH,
        STATISTICS_PATH,
    },
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// 1x1 steel-blue PNG, enough for the viewers to exercise image decoding.
const PLACEHOLDER_PLOT: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve canned responses on the analytics API routes.
    ServeFixture {
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
        /// JSON file with `statistics` and `plot` objects.
        #[arg(long)]
        fixture: Option<PathBuf>,
        #[arg(long)]
        fail_statistics: bool,
        #[arg(long)]
        fail_plot: bool,
        /// Delay before every statistics response.
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },
    /// Check that a fixture file parses and upholds the payload invariants.
    CheckFixture { path: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureFile {
    statistics: Statistics,
    plot: PlotResponse,
}

impl FixtureFile {
    fn builtin() -> Self {
        let top_majors = [
            ("PETROLEUM ENGINEERING", 110000.0),
            ("MINING AND MINERAL ENGINEERING", 75000.0),
            ("METALLURGICAL ENGINEERING", 73000.0),
            ("NAVAL ARCHITECTURE AND MARINE ENGINEERING", 70000.0),
            ("CHEMICAL ENGINEERING", 65000.0),
        ]
        .into_iter()
        .map(|(major, income)| MajorIncome {
            major: major.to_string(),
            income,
        })
        .collect();

        Self {
            statistics: Statistics {
                total_majors: 173,
                avg_income: 40151.45,
                max_income: 110000.0,
                min_income: 22000.0,
                top_majors,
                source: Some("json".to_string()),
            },
            plot: PlotResponse {
                image: PLACEHOLDER_PLOT.to_string(),
                total_majors: Some(173),
            },
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture '{}'", path.display()))?;
        let fixture: Self = serde_json::from_str(&raw)
            .with_context(|| format!("fixture '{}' is not valid", path.display()))?;
        fixture
            .statistics
            .validate()
            .with_context(|| format!("fixture '{}' statistics are inconsistent", path.display()))?;
        Ok(fixture)
    }
}

#[derive(Clone)]
struct FixtureState {
    fixture: Arc<FixtureFile>,
    fail_statistics: bool,
    fail_plot: bool,
    delay: Duration,
}

fn fixture_router(state: FixtureState) -> Router {
    Router::new()
        .route(STATISTICS_PATH, get(statistics))
        .route(PLOT_PATH, get(plot))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
}

async fn statistics(State(state): State<FixtureState>) -> Response {
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    if state.fail_statistics {
        tracing::info!("serving injected statistics failure");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("Failed to retrieve statistics")),
        )
            .into_response();
    }
    Json(state.fixture.statistics.clone()).into_response()
}

async fn plot(State(state): State<FixtureState>) -> Response {
    if state.fail_plot {
        tracing::info!("serving injected plot failure");
        return (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("No data available for plotting")),
        )
            .into_response();
    }
    Json(state.fixture.plot.clone()).into_response()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "API is running".to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::ServeFixture {
            bind,
            fixture,
            fail_statistics,
            fail_plot,
            delay_ms,
        } => {
            let fixture = match fixture {
                Some(path) => FixtureFile::load(&path)?,
                None => FixtureFile::builtin(),
            };
            let state = FixtureState {
                fixture: Arc::new(fixture),
                fail_statistics,
                fail_plot,
                delay: Duration::from_millis(delay_ms),
            };
            let listener = TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind fixture server on {bind}"))?;
            tracing::info!(
                addr = %listener.local_addr()?,
                fail_statistics,
                fail_plot,
                delay_ms,
                "fixture analytics service listening"
            );
            axum::serve(listener, fixture_router(state)).await?;
        }
        Command::CheckFixture { path } => {
            let fixture = FixtureFile::load(&path)?;
            println!(
                "fixture ok: total_majors={} top_majors={} plot_bytes={}",
                fixture.statistics.total_majors,
                fixture.statistics.top_majors.len(),
                fixture.plot.image.len()
            );
        }
    }

    Ok(())
}
