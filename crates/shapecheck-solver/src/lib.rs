//! Interface Conformance Engine
//!
//! Checks that a candidate type implements every member a shape description
//! requires, with compatible signatures, and composes the two into a callable
//! namespace. It uses:
//!
//! - **Signature Model**: structural `TypeRef`/`Signature` values with
//!   role-bound self-markers, wildcards and pointer depth
//! - **Tracer Pattern**: one comparison routine for the boolean fast path and
//!   the accumulate-every-violation report
//! - **Positional Diagnostics**: aligned signature blocks with underlines and
//!   per-slot explanations
//!
//! ```ignore
//! let accessor = check_conformance(&iterable, &counter)?;
//! let mut counter = accessor.instantiate();
//! accessor.call(&mut counter, "next", &[])?;
//! ```
mod accessor;
mod cache;
mod conformance;
mod describe;
mod diagnostics;
mod extract;
mod merge;
mod namespace;
mod parse;
mod queries;
mod render;
mod runtime;
pub mod types;
mod vtable;

pub use accessor::ComposedAccessor;
pub use cache::{CacheStats, ConformanceCache};
pub use conformance::{CheckMode, ConformanceChecker, slot_compatible};
pub use describe::{Body, Member, MemberKind, TypeDescription, Value, Visibility};
pub use diagnostics::{
    CollectingTracer, ConfigurationError, ConformanceError, ConformanceReport, ConformanceTracer,
    FailureReason, FastTracer, PositionMismatch, Violation, ViolationKind,
};
pub use extract::{Extractor, extract};
pub use merge::DeclarationMerger;
pub use namespace::{Binding, BindingValue, Namespace};
pub use parse::ParseError;
pub use queries::{
    build_vtable, check_conformance, conformance_violations, is_conformant, merge_conformant,
    require_conformance, require_merge_conformant,
};
pub use render::{RenderError, RenderedSignature, Span, render_signature};
pub use runtime::{CallContext, CallError, Instance, MemberLookup, invoke};
pub use types::{FnSig, Name, ParamSpec, Role, Signature, SignatureFlags, SignatureKind, TypeRef};
pub use vtable::{DynObject, VTable, VTableEntry, VTableError};

#[cfg(test)]
#[path = "../tests/integration_tests.rs"]
mod integration_tests;
