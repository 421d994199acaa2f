//! Runs every check and dispatch table a manifest declares.

use anyhow::Result;
use shapecheck_solver::{
    CacheStats, CheckMode, ConformanceCache, ConformanceError, VTableError, build_vtable,
};
use std::path::Path;
use tracing::{debug, info};

use crate::cli::args::CliArgs;
use crate::cli::config::{ResolvedManifest, load_manifest};

/// Every check conformed and every table was built.
pub const EXIT_SUCCESS: i32 = 0;
/// At least one check or table failed.
pub const EXIT_VIOLATIONS: i32 = 1;
/// A description was malformed, or the manifest could not be used.
pub const EXIT_CONFIGURATION: i32 = 2;

#[derive(Clone, Debug)]
pub struct CheckOutcome {
    pub shape: String,
    pub candidate: String,
    pub mode: CheckMode,
    pub result: Result<(), ConformanceError>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Clone, Debug)]
pub struct VTableOutcome {
    pub table: String,
    pub implementation: String,
    /// Number of bound slots.
    pub result: Result<usize, VTableError>,
}

impl VTableOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub checks: Vec<CheckOutcome>,
    pub vtables: Vec<VTableOutcome>,
    pub cache: CacheStats,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed()).count()
            + self.vtables.iter().filter(|v| !v.passed()).count()
    }

    fn has_configuration_error(&self) -> bool {
        self.checks
            .iter()
            .any(|c| matches!(&c.result, Err(err) if err.is_configuration()))
            || self
                .vtables
                .iter()
                .any(|v| matches!(&v.result, Err(VTableError::Configuration(_))))
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_configuration_error() {
            EXIT_CONFIGURATION
        } else if self.failures() > 0 {
            EXIT_VIOLATIONS
        } else {
            EXIT_SUCCESS
        }
    }
}

/// Load the manifest named by `args` and run it.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunSummary> {
    let path = args.manifest_path(cwd);
    info!(manifest = %path.display(), "loading manifest");
    let manifest = load_manifest(&path)?.resolve()?;
    run_manifest(&manifest, args)
}

/// Run the resolved manifest's checks, then its dispatch tables.
pub fn run_manifest(manifest: &ResolvedManifest, args: &CliArgs) -> Result<RunSummary> {
    let cache = ConformanceCache::new();
    let mut summary = RunSummary::default();

    for check in &manifest.checks {
        if !args.shapes.is_empty() && !args.shapes.contains(&check.shape) {
            continue;
        }
        let shape = manifest.get(&check.shape)?;
        let candidate = manifest.get(&check.candidate)?;
        let mode = CheckMode::from(check.mode);
        let result = cache.verdict(shape, candidate, mode);
        debug!(
            shape = %check.shape,
            candidate = %check.candidate,
            ?mode,
            conformant = result.is_ok(),
            "checked"
        );
        let failed = result.is_err();
        summary.checks.push(CheckOutcome {
            shape: check.shape.clone(),
            candidate: check.candidate.clone(),
            mode,
            result,
        });
        if failed && args.fail_fast {
            summary.cache = cache.stats();
            return Ok(summary);
        }
    }

    if args.shapes.is_empty() {
        for spec in &manifest.vtables {
            let table = manifest.get(&spec.table)?;
            let implementation = manifest.get(&spec.implementation)?;
            let result = build_vtable(table, implementation).map(|vtable| vtable.len());
            let failed = result.is_err();
            summary.vtables.push(VTableOutcome {
                table: spec.table.clone(),
                implementation: spec.implementation.clone(),
                result,
            });
            if failed && args.fail_fast {
                break;
            }
        }
    }

    summary.cache = cache.stats();
    Ok(summary)
}
