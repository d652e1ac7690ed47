//! Tracing subscriber setup.

use std::{
    io::{IsTerminal, Stderr},
    sync::OnceLock,
};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::{self, LogFormat, LogRotation};

static NONBLOCKING_WORK_GUARD_KEEP: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber described by the `logger` section.
///
/// Does nothing when logging is disabled or a subscriber is already set.
pub fn init(config: &config::Logger) {
    if !config.enable {
        return;
    }

    let filter = config.override_filter.as_ref().map_or_else(
        || {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("ontoseed={}", config.level.as_str())))
        },
        EnvFilter::new,
    );

    let mut layers: Vec<Box<dyn Layer<Registry> + Sync + Send>> = Vec::new();

    if let Some(appender) = &config.file_appender {
        let rolling = match appender.rotation {
            LogRotation::Minutely => {
                tracing_appender::rolling::minutely(&appender.dir, &appender.filename_prefix)
            }
            LogRotation::Hourly => {
                tracing_appender::rolling::hourly(&appender.dir, &appender.filename_prefix)
            }
            LogRotation::Daily => {
                tracing_appender::rolling::daily(&appender.dir, &appender.filename_prefix)
            }
            LogRotation::Never => {
                tracing_appender::rolling::never(&appender.dir, &appender.filename_prefix)
            }
        };
        let (writer, guard) = tracing_appender::non_blocking(rolling);
        if NONBLOCKING_WORK_GUARD_KEEP.set(guard).is_ok() {
            layers.push(format_layer(config.format, writer, false));
        }
    }

    let (console, ansi) = console_writer();
    layers.push(format_layer(config.format, console, ansi));

    if tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("logger_already_initialized");
    }
}

/// Console sink and whether it takes colours. Stdout carries command output
/// only.
fn console_writer() -> (fn() -> Stderr, bool) {
    (std::io::stderr, std::io::stderr().is_terminal())
}

fn format_layer<W>(
    format: LogFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Sync + Send>
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_ansi(ansi).with_writer(writer);
    match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}
