use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Manifest file looked up in the working directory when none is given.
pub const DEFAULT_MANIFEST: &str = "shapecheck.json";

/// CLI arguments for the shapecheck binary.
#[derive(Parser, Debug)]
#[command(
    name = "shapecheck",
    version,
    about = "Check types against interface shape descriptions"
)]
pub struct CliArgs {
    /// Path to the manifest (defaults to ./shapecheck.json).
    pub manifest: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to style diagnostics.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Stop at the first failing check.
    #[arg(long = "fail-fast", alias = "failFast")]
    pub fail_fast: bool,

    /// Only run checks whose shape has this name. May be repeated.
    #[arg(long = "shape", value_name = "NAME")]
    pub shapes: Vec<String>,

    /// Print the resolved type descriptions and stop.
    #[arg(long = "list-types", alias = "listTypes")]
    pub list_types: bool,
}

impl CliArgs {
    /// The manifest path, resolved against `cwd`.
    pub fn manifest_path(&self, cwd: &std::path::Path) -> PathBuf {
        match &self.manifest {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => cwd.join(path),
            None => cwd.join(DEFAULT_MANIFEST),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve against whether stdout is a terminal.
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            ColorChoice::Auto => is_terminal,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}
