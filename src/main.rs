mod app;
mod color;
mod config;
mod data;
mod error;
mod export;
mod pipeline;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::GateTrendsApp;
use clap::Parser;
use config::{ChartConfig, Preset};
use eframe::egui;

/// Plot per-category averages of logic gate similarity scores.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in configuration to use
    #[arg(short, long, value_enum, default_value_t = Preset::Hallucinations)]
    preset: Preset,

    /// JSON configuration file (overrides --preset)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ChartConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => args.preset.config(),
    };

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let title = config.window_title();
    let chart = pipeline::run(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 480.0])
            .with_min_inner_size([500.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(GateTrendsApp::new(chart)))),
    )
    .map_err(|e| anyhow::anyhow!("running chart window: {e}"))
}
