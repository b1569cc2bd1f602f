use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_NAME: &str = "token-desk.log";

/// `<data_local_dir>/token-desk/token-desk.log`, or the temp dir when the platform has none.
pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("token-desk")
        .join(LOG_FILE_NAME)
}

/// Setup tracing - file subscriber, since stdout belongs to the terminal UI.
/// Defaults to INFO; transport crates stay at WARN unless RUST_LOG mentions them.
pub fn setup_tracing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("cannot create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;

    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;

    let var = std::env::var("RUST_LOG").unwrap_or_default();
    if !var.contains("hyper") {
        filter = filter.add_directive("hyper=warn".parse()?);
    }
    if !var.contains("reqwest") {
        filter = filter.add_directive("reqwest=warn".parse()?);
    }
    if !var.contains("alloy") {
        filter = filter.add_directive("alloy_transport_http=warn".parse()?);
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_filter(filter),
        )
        .init();

    Ok(())
}
