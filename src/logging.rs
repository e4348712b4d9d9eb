//! Structured logging for FitWell
//!
//! Human-facing output goes to stderr so command output on stdout stays
//! clean. An optional JSON log file records lifecycle events for later review.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

const DEFAULT_LOG_FILE: &str = "fitwell.log";

/// Logging configuration, the `[logging]` table of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,

    /// Also write JSON events to this file
    pub file_path: Option<PathBuf>,

    /// Start a new file every day instead of appending forever
    pub rotation: bool,

    /// Emit span enter/close events
    pub include_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Pretty,
            file_path: None,
            rotation: true,
            include_spans: false,
        }
    }
}

impl LogConfig {
    /// Raise the level according to a `-v` count
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.level = match verbose {
            0 => self.level,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        };
        self
    }

    fn filter(&self) -> EnvFilter {
        // RUST_LOG wins over the configured level
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("fitwell={}", self.level.as_str())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Stderr output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn stderr_layer(config: &LogConfig) -> BoxedLayer {
    let spans = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(spans);

    match config.format {
        LogFormat::Pretty => base.with_line_number(true).boxed(),
        LogFormat::Json => base.json().with_current_span(config.include_spans).boxed(),
        LogFormat::Compact => base.compact().boxed(),
    }
}

fn file_writer(path: &Path, rotation: bool) -> anyhow::Result<BoxMakeWriter> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    if rotation {
        let prefix = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_LOG_FILE);
        return Ok(BoxMakeWriter::new(tracing_appender::rolling::daily(dir, prefix)));
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    Ok(BoxMakeWriter::new(std::sync::Mutex::new(file)))
}

fn file_layer(config: &LogConfig) -> anyhow::Result<Option<BoxedLayer>> {
    let Some(path) = &config.file_path else {
        return Ok(None);
    };

    let layer = fmt::layer()
        .json()
        .with_writer(file_writer(path, config.rotation)?)
        .with_target(true)
        .with_current_span(config.include_spans)
        .boxed();
    Ok(Some(layer))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let layers = vec![Some(stderr_layer(config)), file_layer(config)?]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    tracing_subscriber::registry()
        .with(layers)
        .with(config.filter())
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::debug!(
        level = config.level.as_str(),
        format = ?config.format,
        file = ?config.file_path,
        "Logging initialized"
    );
    Ok(())
}
