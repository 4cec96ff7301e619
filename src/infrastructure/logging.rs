// Process-wide tracing setup
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_FILE: &str = "analysis.log";

/// Log to stderr and append to `log_file`. Call once, from `main`.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging(log_file: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()?;

    Ok(())
}
