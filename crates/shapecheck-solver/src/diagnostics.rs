//! Conformance failures and the tracer abstraction.
//!
//! ## Tracer Pattern
//!
//! The checker reports every violation through a `ConformanceTracer`, so one
//! comparison routine backs both the boolean fast path and the full report:
//!
//! - **FastTracer**: stops at the first violation and never builds it
//! - **CollectingTracer**: builds and keeps every violation, in order
//!
//! Violations are constructed lazily via a closure; `FastTracer` never calls it.
//!
//! ## Canonical text
//!
//! `ConformanceError`'s `Display` is the one diagnostic text shared by the
//! aborting and the result-returning entry points:
//!
//! ```text
//! error[SC2000]: type 'Counter' does not conform to 'Iterable'
//!   [SC2001] missing member 'next' of type 'fn(*Self) i32'
//!   [SC2005] member 'magic' has mismatched parameter types
//!       fn magic(**Self, i32) i32
//!                ^^^^^^
//!                expected type '*Self', found '**Self'
//! ```

use crate::render::{RenderError, RenderedSignature};
use crate::types::{Name, SignatureKind, TypeRef};
use serde::Serialize;
use shapecheck_common::diagnostic_codes as codes;
use shapecheck_common::diagnostic_messages as messages;
use shapecheck_common::{Diagnostic, format_message};
use std::fmt;

// =============================================================================
// Tracer Pattern
// =============================================================================

/// Receives violations as the checker finds them.
///
/// # Returns
///
/// `true` to keep checking, `false` to stop the whole check.
pub trait ConformanceTracer {
    fn on_violation(&mut self, violation: impl FnOnce() -> Violation) -> bool;
}

/// Records only that a violation happened.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastTracer {
    failed: bool,
}

impl FastTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl ConformanceTracer for FastTracer {
    #[inline(always)]
    fn on_violation(&mut self, _violation: impl FnOnce() -> Violation) -> bool {
        self.failed = true;
        false
    }
}

/// Collects every violation in the order it is reported.
#[derive(Debug, Default)]
pub struct CollectingTracer {
    violations: Vec<Violation>,
}

impl CollectingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl ConformanceTracer for CollectingTracer {
    #[inline]
    fn on_violation(&mut self, violation: impl FnOnce() -> Violation) -> bool {
        self.violations.push(violation());
        true
    }
}

// =============================================================================
// Configuration errors
// =============================================================================

/// A malformed description. Always fatal; never mixed with violations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The shape stores state.
    NonBehavioralShape { shape: Name, fields: Vec<Name> },
    /// A dispatch-table field is not a function pointer.
    NonFunctionSlot {
        table: Name,
        field: Name,
        found: String,
    },
    DuplicateMember { type_name: Name, member: Name },
    TooManyParameters {
        type_name: Name,
        member: Name,
        count: usize,
    },
}

impl ConfigurationError {
    pub const fn code(&self) -> u32 {
        match self {
            ConfigurationError::NonBehavioralShape { .. } => codes::NON_BEHAVIORAL_SHAPE,
            ConfigurationError::NonFunctionSlot { .. } => codes::NON_FUNCTION_SLOT,
            ConfigurationError::DuplicateMember { .. } => codes::DUPLICATE_MEMBER,
            ConfigurationError::TooManyParameters { .. } => codes::TOO_MANY_PARAMETERS,
        }
    }

    /// The description at fault.
    pub fn type_name(&self) -> &Name {
        match self {
            ConfigurationError::NonBehavioralShape { shape, .. } => shape,
            ConfigurationError::NonFunctionSlot { table, .. } => table,
            ConfigurationError::DuplicateMember { type_name, .. }
            | ConfigurationError::TooManyParameters { type_name, .. } => type_name,
        }
    }

    /// The violation kind this error corresponds to in a headless report.
    pub fn violation_kind(&self) -> Option<ViolationKind> {
        match self {
            ConfigurationError::NonBehavioralShape { .. }
            | ConfigurationError::NonFunctionSlot { .. } => Some(ViolationKind::NonBehavioralShape),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfigurationError::NonBehavioralShape { shape, fields } => {
                let names: Vec<&str> = fields.iter().map(|f| &**f).collect();
                format_message(
                    messages::NON_BEHAVIORAL_SHAPE,
                    &[&**shape, &fields.len().to_string(), &names.join(", ")],
                )
            }
            ConfigurationError::NonFunctionSlot {
                table,
                field,
                found,
            } => format_message(
                messages::NON_FUNCTION_SLOT,
                &[&**table, &**field, found.as_str()],
            ),
            ConfigurationError::DuplicateMember { type_name, member } => {
                format_message(messages::DUPLICATE_MEMBER, &[&**type_name, &**member])
            }
            ConfigurationError::TooManyParameters {
                type_name,
                member,
                count,
            } => format_message(
                messages::TOO_MANY_PARAMETERS,
                &[
                    &**member,
                    &**type_name,
                    &count.to_string(),
                    &shapecheck_common::limits::MAX_PARAMETERS.to_string(),
                ],
            ),
        }
    }

    pub fn to_diagnostic(&self, candidate: &str) -> Diagnostic {
        let diagnostic = Diagnostic::error(&**self.type_name(), candidate, self.message(), self.code());
        match self {
            ConfigurationError::NonFunctionSlot { field: member, .. }
            | ConfigurationError::DuplicateMember { member, .. }
            | ConfigurationError::TooManyParameters { member, .. } => {
                diagnostic.with_member(&**member)
            }
            ConfigurationError::NonBehavioralShape { .. } => diagnostic,
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ConfigurationError {}

// =============================================================================
// Violations
// =============================================================================

/// One disagreeing slot of a requirement and its candidate member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionMismatch {
    pub index: usize,
    /// The slot is the return type.
    pub is_return: bool,
    pub expected: TypeRef,
    pub found: TypeRef,
}

/// Why a requirement is not met.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The candidate has no member of that name.
    MissingMember {
        /// Full type text of the requirement.
        expected: String,
    },
    NotAFunction {
        found: SignatureKind,
    },
    NotANestedType {
        found: SignatureKind,
    },
    ArityMismatch {
        expected: usize,
        found: usize,
    },
    /// One or more slots differ. `mismatches` is left to right.
    PositionMismatch {
        mismatches: Vec<PositionMismatch>,
        rendered: RenderedSignature,
    },
    /// The candidate redefines a default supplied by `shape`.
    DefaultRedefined {
        shape: Name,
    },
}

/// Fieldless taxonomy of violations, for headless consumers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    MissingMember,
    NotAFunction,
    NotANestedType,
    ArityMismatch,
    ParameterTypeMismatch,
    ReturnTypeMismatch,
    DefaultRedefined,
    NonBehavioralShape,
}

/// A single failed requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub member: Name,
    pub reason: FailureReason,
}

impl Violation {
    pub fn new(member: Name, reason: FailureReason) -> Self {
        Self { member, reason }
    }

    pub fn kind(&self) -> ViolationKind {
        match &self.reason {
            FailureReason::MissingMember { .. } => ViolationKind::MissingMember,
            FailureReason::NotAFunction { .. } => ViolationKind::NotAFunction,
            FailureReason::NotANestedType { .. } => ViolationKind::NotANestedType,
            FailureReason::ArityMismatch { .. } => ViolationKind::ArityMismatch,
            FailureReason::PositionMismatch { mismatches, .. } => {
                if mismatches.iter().all(|m| m.is_return) {
                    ViolationKind::ReturnTypeMismatch
                } else {
                    ViolationKind::ParameterTypeMismatch
                }
            }
            FailureReason::DefaultRedefined { .. } => ViolationKind::DefaultRedefined,
        }
    }

    pub fn code(&self) -> u32 {
        match self.kind() {
            ViolationKind::MissingMember => codes::MISSING_MEMBER,
            ViolationKind::NotAFunction => codes::NOT_A_FUNCTION,
            ViolationKind::NotANestedType => codes::NOT_A_NESTED_TYPE,
            ViolationKind::ArityMismatch => codes::ARITY_MISMATCH,
            ViolationKind::ParameterTypeMismatch => codes::PARAMETER_TYPE_MISMATCH,
            ViolationKind::ReturnTypeMismatch => codes::RETURN_TYPE_MISMATCH,
            ViolationKind::DefaultRedefined => codes::DEFAULT_REDEFINED,
            ViolationKind::NonBehavioralShape => codes::NON_BEHAVIORAL_SHAPE,
        }
    }

    /// The one-line summary.
    pub fn message(&self) -> String {
        let member = &*self.member;
        match &self.reason {
            FailureReason::MissingMember { expected } => {
                format_message(messages::MISSING_MEMBER, &[member, expected.as_str()])
            }
            FailureReason::NotAFunction { found } => {
                format_message(messages::NOT_A_FUNCTION, &[member, &found.to_string()])
            }
            FailureReason::NotANestedType { found } => {
                format_message(messages::NOT_A_NESTED_TYPE, &[member, &found.to_string()])
            }
            FailureReason::ArityMismatch { expected, found } => format_message(
                messages::ARITY_MISMATCH,
                &[member, &expected.to_string(), &found.to_string()],
            ),
            FailureReason::PositionMismatch { .. } => {
                if self.kind() == ViolationKind::ReturnTypeMismatch {
                    format_message(messages::RETURN_TYPE_MISMATCH, &[member])
                } else {
                    format_message(messages::PARAMETER_TYPE_MISMATCH, &[member])
                }
            }
            FailureReason::DefaultRedefined { shape } => {
                format_message(messages::DEFAULT_REDEFINED, &[member, &**shape])
            }
        }
    }

    pub fn rendered_signature(&self) -> Option<&RenderedSignature> {
        match &self.reason {
            FailureReason::PositionMismatch { rendered, .. } => Some(rendered),
            _ => None,
        }
    }

    /// The summary followed by the aligned signature block, if any.
    pub fn rendered_text(&self) -> String {
        match self.rendered_signature() {
            Some(block) => format!("{}\n{block}", self.message()),
            None => self.message(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered_text())
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Every violation of one (shape, candidate) check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConformanceReport {
    pub shape: Name,
    pub candidate: Name,
    pub violations: Vec<Violation>,
}

impl ConformanceReport {
    pub fn headline(&self) -> String {
        format_message(
            messages::TYPE_DOES_NOT_CONFORM,
            &[&*self.candidate, &*self.shape],
        )
    }

    /// One serialisable record per violation, without styling.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.violations
            .iter()
            .map(|violation| {
                let diagnostic = Diagnostic::error(
                    &*self.shape,
                    &*self.candidate,
                    violation.message(),
                    violation.code(),
                )
                .with_member(&*violation.member);
                match violation.rendered_signature() {
                    Some(block) => diagnostic.with_related(&*violation.member, block.to_string()),
                    None => diagnostic,
                }
            })
            .collect()
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error[SC{}]: {}",
            codes::TYPE_DOES_NOT_CONFORM,
            self.headline()
        )?;
        for violation in &self.violations {
            write!(f, "\n  [SC{}] {}", violation.code(), violation.message())?;
            if let Some(block) = violation.rendered_signature() {
                for line in block.lines() {
                    write!(f, "\n      {line}")?;
                }
            }
        }
        Ok(())
    }
}

/// Outcome of a failed check.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConformanceError {
    #[error("error[SC{}]: {}", .0.code(), .0)]
    Configuration(#[from] ConfigurationError),
    #[error("{0}")]
    Nonconforming(ConformanceReport),
    #[error("internal error: {0}")]
    Internal(#[from] RenderError),
}

impl ConformanceError {
    pub fn code(&self) -> Option<u32> {
        match self {
            ConformanceError::Configuration(err) => Some(err.code()),
            ConformanceError::Nonconforming(_) => Some(codes::TYPE_DOES_NOT_CONFORM),
            ConformanceError::Internal(_) => None,
        }
    }

    pub fn report(&self) -> Option<&ConformanceReport> {
        match self {
            ConformanceError::Nonconforming(report) => Some(report),
            _ => None,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        self.report()
            .map_or(&[][..], |report| report.violations.as_slice())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ConformanceError::Configuration(_))
    }

    /// Headless records for this failure.
    pub fn to_diagnostics(&self, candidate: &str) -> Vec<Diagnostic> {
        match self {
            ConformanceError::Configuration(err) => vec![err.to_diagnostic(candidate)],
            ConformanceError::Nonconforming(report) => report.to_diagnostics(),
            ConformanceError::Internal(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
