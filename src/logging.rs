use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Where log lines go for the current output mode.
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// Interactive mode without a log file: the alternate screen owns the terminal.
    Disabled,
}

/// Initialise the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init(target: LogTarget<'_>, default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("init logging: {e}"))?,
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!("init logging: {e}"))?
        }
        LogTarget::Disabled => {}
    }
    Ok(())
}
