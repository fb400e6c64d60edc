use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

use super::dir::APPLICATION_NAME;

const LOG_FILES_KEPT: usize = 5;

/// Installs the global subscriber. Logs always go into daily rotated files inside `log_dir`.
/// `verbose` raises the level to `trace` and mirrors everything to stdout, otherwise `RUST_LOG`
/// decides and `debug` is used when it is unset.
pub fn enable_logging(log_dir: &Path, verbose: bool) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(LOG_FILES_KEPT)
        .filename_prefix(APPLICATION_NAME)
        .build(log_dir)?;

    let stdout = std::io::stdout.with_filter(move |_| verbose);
    let level = if verbose {
        LevelFilter::TRACE.to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(crate_filter(&level))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .init();
    Ok(())
}

/// Limits output to this crate so dependencies don't flood the log files.
fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "{}={level}",
        env!("CARGO_PKG_NAME").replace('-', "_")
    ))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .try_init();
});
