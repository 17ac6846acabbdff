// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for neurite tools
//!
//! Console output always; with the `file-logging` feature a JSON log file is
//! written to a timestamped run folder as well.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging initialization result
///
/// Dropping the guard flushes any pending file output.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
    started_at: DateTime<Utc>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// When logging was initialised
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Initialize the global subscriber
///
/// With the `file-logging` feature and `config.log_dir` set, creates:
/// ```text
/// <log_dir>/
///   └── run_20250101_120000/
///       └── neurite.log (JSON lines)
/// ```
///
/// # Errors
///
/// Fails if the run folder cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let started_at = Utc::now();
    let filter = debug_flags.to_filter_string(&config.level);
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console_layer: BoxedLayer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    };
    layers.push(console_layer);

    let files = attach_file_layer(config, &filter, started_at, &mut layers)?;

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    if cfg!(not(feature = "file-logging")) {
        if let Some(requested) = &config.log_dir {
            tracing::warn!(
                target: "neurite-observability",
                "Log directory {} ignored: built without the file-logging feature",
                requested.display()
            );
        }
    }

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: files.guards,
        log_dir: files.run_folder,
        started_at,
    })
}

struct FileOutput {
    #[cfg(feature = "file-logging")]
    guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    run_folder: Option<PathBuf>,
}

#[cfg(feature = "file-logging")]
fn attach_file_layer(
    config: &LoggingConfig,
    filter: &str,
    started_at: DateTime<Utc>,
    layers: &mut Vec<BoxedLayer>,
) -> Result<FileOutput> {
    let Some(base_log_dir) = &config.log_dir else {
        return Ok(FileOutput {
            guards: Vec::new(),
            run_folder: None,
        });
    };

    let run_folder = base_log_dir.join(format!("run_{}", started_at.format("%Y%m%d_%H%M%S")));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    cleanup_old_logs(base_log_dir, config.retention_runs)?;

    let file_appender = tracing_appender::rolling::never(&run_folder, "neurite.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(EnvFilter::try_new(filter)?)
        .boxed();
    layers.push(file_layer);

    Ok(FileOutput {
        guards: vec![guard],
        run_folder: Some(run_folder),
    })
}

#[cfg(not(feature = "file-logging"))]
fn attach_file_layer(
    _config: &LoggingConfig,
    _filter: &str,
    _started_at: DateTime<Utc>,
    _layers: &mut Vec<BoxedLayer>,
) -> Result<FileOutput> {
    Ok(FileOutput { run_folder: None })
}

/// Initialize console logging at `info`, honouring debug flags
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingConfig::default())
}

/// Keep only the most recent `retention_runs` run folders
#[cfg(feature = "file-logging")]
fn cleanup_old_logs(base_log_dir: &Path, retention_runs: usize) -> Result<()> {
    let mut runs: Vec<(PathBuf, chrono::NaiveDateTime)> = Vec::new();

    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let timestamp = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("run_"))
            .and_then(|ts| chrono::NaiveDateTime::parse_from_str(ts, "%Y%m%d_%H%M%S").ok());
        if let Some(dt) = timestamp {
            runs.push((path, dt));
        }
    }

    // Oldest first
    runs.sort_by_key(|(_, dt)| *dt);

    if runs.len() > retention_runs {
        let to_remove = runs.len() - retention_runs;
        for (path, _) in runs.iter().take(to_remove) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(())
}
