mod app;
mod audio;
mod config;
mod error;
mod track;
mod utils;

use anyhow::{Context, anyhow};
use app::AudioBrowserApp;
use audio::player::RodioEngine;
use config::Settings;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().context("failed to read settings from the environment")?;
    settings.validate().map_err(|msg| anyhow!(msg))?;

    // The output device is opened once, before the window exists.
    let engine = RodioEngine::new().context("failed to open the audio output")?;
    info!(dir = %settings.audio_dir.display(), "starting audio browser");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Audio Browser",
        options,
        Box::new(move |cc| Ok(Box::new(AudioBrowserApp::new(cc, engine, settings)))),
    )
    .map_err(|err| anyhow!("window closed with an error: {err}"))
}
