//! shapecheck: interface conformance checking.
//!
//! The engine lives in `shapecheck-solver`; diagnostic codes, message
//! templates and limits live in `shapecheck-common`. This crate re-exports
//! both and adds the manifest-driven command line front end.

// Common types - diagnostic codes, message templates and the headless record
pub use shapecheck_common as common;
pub use shapecheck_common::{
    Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation, format_message, limits,
};

// Conformance engine
pub use shapecheck_solver as solver;
pub use shapecheck_solver::{
    Body, CheckMode, ComposedAccessor, ConfigurationError, ConformanceCache, ConformanceError,
    ConformanceReport, DeclarationMerger, DynObject, FnSig, Instance, Namespace, TypeDescription,
    TypeRef, VTable, VTableError, Value, Violation, ViolationKind, build_vtable,
    check_conformance, conformance_violations, is_conformant, merge_conformant,
    require_conformance, require_merge_conformant,
};

// Tracing configuration (text / tree / JSON output for debugging)
pub mod tracing_config;

// Native CLI
pub mod cli;
