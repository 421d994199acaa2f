//! Public entry points.
//!
//! The `check_*`/`merge_*` functions return the failure as a value; the
//! `require_*` variants abort with the same canonical text.

use crate::accessor::ComposedAccessor;
use crate::conformance::{CheckMode, ConformanceChecker};
use crate::describe::TypeDescription;
use crate::diagnostics::{ConformanceError, Violation};
use crate::merge::DeclarationMerger;
use crate::namespace::Namespace;
use crate::vtable::{VTable, VTableError};

/// Check `candidate` against `shape`; on success expose both namespaces.
pub fn check_conformance(
    shape: &TypeDescription,
    candidate: &TypeDescription,
) -> Result<ComposedAccessor, ConformanceError> {
    ConformanceChecker::new(shape, candidate).check()?;
    Ok(ComposedAccessor::compose(shape, candidate))
}

/// Like [`check_conformance`], but panics with the diagnostic text.
#[track_caller]
pub fn require_conformance(shape: &TypeDescription, candidate: &TypeDescription) -> ComposedAccessor {
    match check_conformance(shape, candidate) {
        Ok(accessor) => accessor,
        Err(err) => panic!("{err}"),
    }
}

/// Check in override mode, then merge both sides into one namespace.
pub fn merge_conformant(
    shape: &TypeDescription,
    candidate: &TypeDescription,
) -> Result<Namespace, ConformanceError> {
    ConformanceChecker::new(shape, candidate)
        .with_mode(CheckMode::Override)
        .check()?;
    Ok(DeclarationMerger::new(shape, candidate).merge()?)
}

/// Like [`merge_conformant`], but panics with the diagnostic text.
#[track_caller]
pub fn require_merge_conformant(shape: &TypeDescription, candidate: &TypeDescription) -> Namespace {
    match merge_conformant(shape, candidate) {
        Ok(namespace) => namespace,
        Err(err) => panic!("{err}"),
    }
}

/// Every violation, undecorated. An empty list means conformant.
pub fn conformance_violations(
    shape: &TypeDescription,
    candidate: &TypeDescription,
    mode: CheckMode,
) -> Result<Vec<Violation>, ConformanceError> {
    ConformanceChecker::new(shape, candidate)
        .with_mode(mode)
        .violations()
}

pub fn is_conformant(shape: &TypeDescription, candidate: &TypeDescription, mode: CheckMode) -> bool {
    ConformanceChecker::new(shape, candidate)
        .with_mode(mode)
        .is_conformant()
}

pub fn build_vtable(
    table: &TypeDescription,
    implementation: &TypeDescription,
) -> Result<VTable, VTableError> {
    VTable::build(table, implementation)
}
