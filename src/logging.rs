//! Logging setup.
//!
//! Level is INFO by default, overridden by `RUST_LOG`. The TUI owns the
//! terminal, so it logs to a file (or nowhere); the server and one-shot CLI
//! commands log to stderr.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Discard,
}

fn make_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Call once at startup. A second call is a no-op.
pub fn init_logging(target: LogTarget<'_>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(make_filter()).with_target(false);

    // try_init fails only when a subscriber is already installed
    match target {
        LogTarget::Stderr => {
            let _ = builder
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .try_init();
        }
        LogTarget::File(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            let _ = builder.with_writer(Mutex::new(file)).with_ansi(false).try_init();
        }
        LogTarget::Discard => {
            let _ = builder.with_writer(io::sink).try_init();
        }
    }

    Ok(())
}
