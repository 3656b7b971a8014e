use tracing_appender::rolling::Rotation;
use tracing_subscriber::{fmt::time::UtcTime, prelude::*, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize logging: stdout plus an optional rolling file, both rendered in
/// the configured format with RFC 3339 UTC timestamps.
///
/// Level precedence is `logging.level`, then `RUST_LOG`, then `info`.
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_with_config(cfg: &LoggingConfig) {
    let env_filter = build_env_filter(cfg);

    match cfg.format {
        LogFormat::Json => {
            let file_layer = cfg
                .enable_file_logging
                .then(|| {
                    build_file_writer(cfg).map(|writer| {
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_ansi(false)
                            .with_timer(UtcTime::rfc_3339())
                            .with_writer(writer)
                    })
                })
                .flatten();

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_timer(UtcTime::rfc_3339())
                        .with_writer(std::io::stdout),
                )
                .with(file_layer)
                .try_init();
        }
        LogFormat::Text => {
            let file_layer = cfg
                .enable_file_logging
                .then(|| {
                    build_file_writer(cfg).map(|writer| {
                        tracing_subscriber::fmt::layer()
                            .with_ansi(false)
                            .with_timer(UtcTime::rfc_3339())
                            .with_writer(writer)
                    })
                })
                .flatten();

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(true)
                        .with_timer(UtcTime::rfc_3339())
                        .with_writer(std::io::stdout),
                )
                .with(file_layer)
                .try_init();
        }
    }
}

fn build_env_filter(cfg: &LoggingConfig) -> EnvFilter {
    match &cfg.level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn parse_rotation(raw: &str) -> Rotation {
    match raw.to_lowercase().as_str() {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn build_file_writer(cfg: &LoggingConfig) -> Option<tracing_appender::non_blocking::NonBlocking> {
    if let Err(e) = std::fs::create_dir_all(&cfg.dir) {
        eprintln!(
            "Failed to create log directory '{}' ({e}), continuing with stdout logs",
            cfg.dir
        );
        return None;
    }

    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        parse_rotation(&cfg.rotation),
        &cfg.dir,
        &cfg.filename,
    );
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    // Keep guard alive for process lifetime
    let _leaked: &'static _ = Box::leak(Box::new(file_guard));

    Some(non_blocking)
}
