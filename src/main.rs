// src/main.rs

//! `mraid-replay`: drives a view-state controller against the headless host.
//!
//! Usage: `mraid-replay [config.json] [creative.html]`
//!
//! Directives are read from stdin, one per line (see `mraid_bridge::replay`).
//! Every script pushed into a creative, every host lifecycle event and every
//! routed URL is printed to stdout as it happens.

use anyhow::Context;
use log::{info, warn};
use mraid_bridge::config::Config;
use mraid_bridge::replay::{Directive, ReplaySession};
use std::io::{self, BufRead, Write};

const DEFAULT_CREATIVE: &str =
    "<html><head><script src=\"mraid.js\"></script></head><body></body></html>";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    // RUST_LOG wins over the configured default filter.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.default_filter.as_str()),
    )
    .format_timestamp_micros()
    .init();

    let creative = match args.next() {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read creative from {}", path))?,
        None => DEFAULT_CREATIVE.to_string(),
    };

    info!(
        "Starting mraid-replay ({} placement)...",
        config.headless.placement
    );
    let mut session =
        ReplaySession::start(config, &creative).context("Failed to start replay session")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read directive from stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let directive = match line.parse::<Directive>() {
            Ok(directive) => directive,
            Err(err) => {
                warn!("Skipping directive '{}': {}", line, err);
                writeln!(stdout, "error {}", err)?;
                stdout.flush()?;
                continue;
            }
        };

        for output in session.apply(&directive) {
            writeln!(stdout, "{}", output)?;
        }
        stdout.flush()?;

        if directive == Directive::Quit {
            break;
        }
    }

    info!("mraid-replay finished.");
    Ok(())
}
