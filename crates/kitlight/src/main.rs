//! Kitlight - drum-triggered DMX stage lighting
//!
//! Reads the rig configuration, starts the lighting engine, and feeds it
//! note strikes from the first matching MIDI input until Ctrl-C.

mod logging_setup;

use std::sync::Arc;

use anyhow::{Context, Result};
use kitlight_control::{LightEngine, MidiNoteInput};
use kitlight_core::Config;
use tracing::{info, warn};

const DEFAULT_CONFIG_PATH: &str = "kitlight.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {config_path:?}"))?;

    let _log_guard = logging_setup::init(&config.log)?;
    info!(config = %config_path, lights = config.lights.len(), "kitlight starting");

    let engine = Arc::new(LightEngine::new(&config));
    engine.start()?;

    // The rig stays usable without a note source; an operator can plug the
    // kit in and restart without losing the DMX link.
    let _midi = {
        let engine = Arc::clone(&engine);
        match MidiNoteInput::connect(config.midi.port.as_deref(), move |event| {
            engine.note_on(event.note, event.velocity)
        }) {
            Ok(input) => Some(input),
            Err(error) => {
                warn!(%error, "MIDI input unavailable; engine runs without a note source");
                None
            }
        }
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested");
    engine.stop().await;

    Ok(())
}
