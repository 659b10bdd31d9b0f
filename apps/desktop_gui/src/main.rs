use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{config, AnalyticsClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::IncomeViewerApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop viewer for college major income statistics")]
struct Args {
    /// Base URL of the analytics service.
    #[arg(long)]
    server_url: Option<String>,
    /// TOML file with `server_url` / `request_timeout_secs`.
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut settings = config::load_settings_from(&args.config, |name| std::env::var(name).ok());
    settings.apply_cli_overrides(args.server_url, args.timeout_secs);
    let client = AnalyticsClient::from_settings(&settings)
        .with_context(|| format!("cannot use analytics server '{}'", settings.server_url))?;
    tracing::info!(server_url = %client.base_url(), "starting income viewer");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(client, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("College Major Income Analysis")
            .with_inner_size([1100.0, 820.0])
            .with_min_inner_size([720.0, 540.0]),
        ..Default::default()
    };
    eframe::run_native(
        "College Major Income Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(IncomeViewerApp::new(cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow!("desktop window failed: {err}"))
}
