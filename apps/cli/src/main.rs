use std::{fmt::Write as _, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config,
    render::{render, ReadyScreen, Screen},
    AnalyticsClient, ViewController, ViewState,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Fetch and print college major income statistics")]
struct Args {
    /// Base URL of the analytics service.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Only probe `/api/health` and print its status.
    #[arg(long)]
    health: bool,
    /// Print the resulting view state as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings_from(&args.config, |name| std::env::var(name).ok());
    settings.apply_cli_overrides(args.server_url, args.timeout_secs);
    let client = AnalyticsClient::from_settings(&settings)
        .with_context(|| format!("cannot use analytics server '{}'", settings.server_url))?;

    if args.health {
        return match client.health().await {
            Ok(health) => {
                println!("{}", health.status);
                Ok(ExitCode::SUCCESS)
            }
            Err(failure) => {
                eprintln!("{}", failure.user_message());
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let controller = ViewController::new(Arc::new(client));
    controller.load_all().await;
    let state = controller.state();
    controller.teardown();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state_summary(&state))?);
    } else {
        print!("{}", render_text(&render(&state)));
    }

    Ok(match state {
        ViewState::Error { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn state_summary(state: &ViewState) -> serde_json::Value {
    match state {
        ViewState::Loading => serde_json::json!({ "state": "loading" }),
        ViewState::Error { message } => serde_json::json!({ "state": "error", "message": message }),
        ViewState::Ready { statistics, plot } => serde_json::json!({
            "state": "ready",
            "statistics": statistics,
            "plot": plot.as_ref().map(|image| image.as_str()),
        }),
    }
}

fn render_text(screen: &Screen) -> String {
    let mut out = String::new();
    match screen {
        Screen::Loading { label } => {
            let _ = writeln!(out, "{label}");
        }
        Screen::Error {
            title,
            message,
            action,
        } => {
            let _ = writeln!(out, "{title}");
            let _ = writeln!(out, "{message}");
            let _ = writeln!(out, "[{}] run again to retry", action.label());
        }
        Screen::Ready(ready) => render_ready_text(&mut out, ready),
    }
    out
}

fn render_ready_text(out: &mut String, ready: &ReadyScreen) {
    let _ = writeln!(out, "{}", ready.heading);
    let _ = writeln!(out, "{}", ready.subtitle);
    let _ = writeln!(out);

    let title_width = ready.cards.iter().map(|card| card.title.len()).max().unwrap_or(0);
    for card in &ready.cards {
        let _ = writeln!(out, "{:<title_width$}  {}", card.title, card.value);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", ready.top_majors_heading);
    let major_width = ready
        .top_majors
        .iter()
        .map(|row| row.major.chars().count())
        .max()
        .unwrap_or(0);
    for row in &ready.top_majors {
        let _ = writeln!(
            out,
            "{:>2}. {:<major_width$}  {:>12}",
            row.rank, row.major, row.income
        );
    }

    if let Some(plot) = &ready.plot {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", plot.heading);
        if plot.image.is_data_uri() {
            let _ = writeln!(
                out,
                "<embedded image, {} bytes encoded>",
                plot.image.as_str().len()
            );
        } else {
            let _ = writeln!(out, "{}", plot.image.as_str());
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "[{}] run again to refresh", ready.action.label());
}
