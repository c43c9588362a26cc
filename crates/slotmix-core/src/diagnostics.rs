use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Utc;
use tracing::{Metadata, info, warn};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::filter_fn, layer::SubscriberExt, util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::{config::DiagnosticsConfig, process::TOOL_OUTPUT_TARGET};

pub struct TelemetryGuard {
    pub session_id: Uuid,
    pub log_file: PathBuf,
    _file_guard: WorkerGuard,
}

// Tool output already reaches the runner's sink; the terminal layer skips it
// while the JSON file keeps every line.
fn is_tool_output(metadata: &Metadata<'_>) -> bool {
    metadata.target() == TOOL_OUTPUT_TARGET
}

fn log_file_stem(prefix: &str, session_id: Uuid) -> String {
    let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
    let session = session_id.simple().to_string();
    format!("{prefix}-{timestamp}-{}", &session[..8])
}

pub fn init_tracing(config: &DiagnosticsConfig) -> anyhow::Result<TelemetryGuard> {
    let log_dir: &Path = &config.log_dir;
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory: {}", log_dir.display()))?;

    let session_id = Uuid::new_v4();
    let stem = log_file_stem(&config.trace_file_prefix, session_id);
    let log_file = log_dir.join(format!("{stem}.log"));
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(stem)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("failed to open trace file in {}", log_dir.display()))?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.rust_log_filter));

    let terminal_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter_fn(|metadata| !is_tool_output(metadata)));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(file_writer);

    if let Err(error) = tracing_subscriber::registry()
        .with(env_filter)
        .with(terminal_layer)
        .with(file_layer)
        .try_init()
    {
        warn!(?error, "global tracing subscriber already initialized");
    } else {
        info!(%session_id, log_file = %log_file.display(), "tracing initialized");
    }

    Ok(TelemetryGuard {
        session_id,
        log_file,
        _file_guard: file_guard,
    })
}
