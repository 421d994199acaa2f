//! Tracing setup for the shapecheck binary.
//!
//! Logging is off unless `SHAPECHECK_LOG` (or `RUST_LOG`) holds a filter.
//! `SHAPECHECK_LOG_FORMAT` picks the layout:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented spans via `tracing-tree`
//! - `json`: newline-delimited objects
//!
//! ```bash
//! SHAPECHECK_LOG=trace SHAPECHECK_LOG_FORMAT=tree shapecheck shapecheck.json
//! SHAPECHECK_LOG="shapecheck_solver::cache=trace,shapecheck_solver::merge=debug" shapecheck
//! ```
//!
//! Everything is written to stderr; stdout carries only reports.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const LOG_ENV: &str = "SHAPECHECK_LOG";
const FALLBACK_LOG_ENV: &str = "RUST_LOG";
const LOG_FORMAT_ENV: &str = "SHAPECHECK_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// What the environment asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingSettings {
    /// Filter directives; `None` disables logging.
    pub directives: Option<String>,
    pub format: LogFormat,
}

impl TracingSettings {
    /// Build settings from a variable lookup. `SHAPECHECK_LOG` wins over
    /// `RUST_LOG`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let directives = lookup(LOG_ENV).or_else(|| lookup(FALLBACK_LOG_ENV));
        let format = lookup(LOG_FORMAT_ENV)
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();
        Self { directives, format }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Install the global subscriber described by the environment.
///
/// A subscriber installed earlier (by a test harness, say) is left alone.
pub fn init_tracing() {
    let settings = TracingSettings::from_env();
    let Some(directives) = settings.directives else {
        return;
    };
    let filter = EnvFilter::builder().parse_lossy(directives);

    let installed = match settings.format {
        LogFormat::Tree => Registry::default()
            .with(filter)
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_indent_lines(true)
                    .with_targets(true),
            )
            .try_init(),
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
