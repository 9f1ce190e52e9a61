//! Process-wide `tracing` subscriber.
//!
//! Events always go to stdout, as colored or plain text or as JSON. With
//! file logging enabled they are also written to daily-rotated files in the
//! logging directory:
//!
//! | file                    | receives                          |
//! |-------------------------|-----------------------------------|
//! | `<project>.error.log`   | errors                            |
//! | `<project>.log`         | info and above                    |
//! | `<project>.trace.log`   | everything the level lets through |
//! | `audit.log`             | the HTTP access log, at any level |
//!
//! The level filter is attached to each layer rather than to the registry,
//! so `audit.log` keeps receiving access lines under `--log-level warn`.

use crate::options::LoggingOptions;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::{LevelFilter, filter_fn},
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Target of the HTTP access log events.
pub const AUDIT_TARGET: &str = "audit";

/// Rotated files kept per log file.
pub const MAX_LOG_FILES: usize = 10;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Flushes the file writers when dropped. Keep it alive for the lifetime of
/// the process.
#[must_use]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

/// Installs the global subscriber.
pub fn init(opts: &LoggingOptions, project: &str) -> anyhow::Result<LoggingGuard> {
    let (layers, guards) = build_layers(opts, project)?;

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(LoggingGuard { _guards: guards })
}

/// `RUST_LOG` when set, otherwise `--log-level`.
fn level_filter(opts: &LoggingOptions) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(opts.level().into()))
}

fn format_layer<W>(opts: &LoggingOptions, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_file(opts.report_caller)
        .with_line_number(opts.report_caller);

    if opts.disable_text {
        layer.json().boxed()
    } else {
        layer.with_ansi(ansi).boxed()
    }
}

fn rolling(opts: &LoggingOptions, prefix: &str) -> anyhow::Result<RollingFileAppender> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&opts.logging_directory)?;
    Ok(appender)
}

fn build_layers(
    opts: &LoggingOptions,
    project: &str,
) -> anyhow::Result<(Vec<BoxedLayer>, Vec<WorkerGuard>)> {
    let stdout = format_layer(opts, std::io::stdout, opts.text_pretty)
        .with_filter(level_filter(opts))
        .boxed();
    let mut layers = vec![stdout];
    let mut guards = Vec::new();

    if !opts.enable_logging_to_file {
        return Ok((layers, guards));
    }

    let files = [
        (format!("{project}.error"), Some(LevelFilter::ERROR)),
        (project.to_string(), Some(LevelFilter::INFO)),
        (format!("{project}.trace"), None),
    ];
    for (prefix, level) in files {
        let (writer, guard) = tracing_appender::non_blocking(rolling(opts, &prefix)?);
        guards.push(guard);
        let layer = format_layer(opts, writer, false).with_filter(level_filter(opts));
        layers.push(match level {
            Some(level) => layer.with_filter(level).boxed(),
            None => layer.boxed(),
        });
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling(opts, AUDIT_TARGET)?);
    guards.push(guard);
    layers.push(
        format_layer(opts, writer, false)
            .with_filter(filter_fn(|meta| meta.target() == AUDIT_TARGET))
            .boxed(),
    );

    Ok((layers, guards))
}
