#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use shapecheck::cli::args::{CliArgs, OutputFormat};
use shapecheck::cli::config::load_manifest;
use shapecheck::cli::driver::{self, EXIT_CONFIGURATION};
use shapecheck::cli::reporter::{Reporter, render_json};

fn main() {
    // Initialize tracing if SHAPECHECK_LOG or RUST_LOG is set.
    shapecheck::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            EXIT_CONFIGURATION
        }
    };
    std::process::exit(code);
}

fn run(args: &CliArgs) -> Result<i32> {
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    if args.list_types {
        return list_types(args, &cwd);
    }

    let summary = driver::run(args, &cwd)?;
    match args.format {
        OutputFormat::Json => println!("{}", render_json(&summary)?),
        OutputFormat::Text => {
            let color = args.color.enabled(std::io::stdout().is_terminal());
            colored::control::set_override(color);
            println!("{}", Reporter::new(color).render(&summary));
        }
    }
    Ok(summary.exit_code())
}

fn list_types(args: &CliArgs, cwd: &std::path::Path) -> Result<i32> {
    let manifest = load_manifest(&args.manifest_path(cwd))?.resolve()?;
    println!("{}", Reporter::new(false).format_types(manifest.types.values()));
    Ok(driver::EXIT_SUCCESS)
}
