//! Conformance checking.
//!
//! Compares the requirements extracted from a shape with the members extracted
//! from a candidate. Every requirement is evaluated even after earlier ones
//! fail; a single requirement stops its own sub-checks at the first
//! disqualifying condition (missing, wrong kind, wrong arity).
//!
//! Before comparison the shape's self-markers are rebound to the candidate,
//! so `*Self` in a requirement and `*Self` (or `*Counter`) in the candidate
//! compare equal, while `**Self` does not.

use crate::describe::{MemberKind, TypeDescription};
use crate::diagnostics::{
    CollectingTracer, ConfigurationError, ConformanceError, ConformanceReport, ConformanceTracer,
    FailureReason, FastTracer, PositionMismatch, Violation,
};
use crate::extract::extract;
use crate::render::{RenderError, render_signature};
use crate::types::{Role, Signature, SignatureKind, TypeRef};
use serde::Serialize;
use tracing::{debug, trace};

/// How candidate members that share a name with a shape default are treated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckMode {
    /// Redefining a default is a violation.
    #[default]
    Compose,
    /// Redefining a default shadows it.
    Override,
}

/// Whether a found slot type satisfies an expected one.
///
/// An expected `anytype` accepts anything; otherwise the types must be equal,
/// so a found `anytype` only satisfies an expected `anytype`. Function
/// pointers are compared slot by slot under the same rule.
pub fn slot_compatible(expected: &TypeRef, found: &TypeRef) -> bool {
    match (expected, found) {
        (TypeRef::Wildcard, _) => true,
        (TypeRef::FnPtr(expected), TypeRef::FnPtr(found)) => {
            expected.arity() == found.arity()
                && expected
                    .params
                    .iter()
                    .zip(&found.params)
                    .all(|(e, f)| slot_compatible(e, f))
                && slot_compatible(&expected.ret, &found.ret)
        }
        _ => expected == found,
    }
}

/// Checks one (shape, candidate) pair.
pub struct ConformanceChecker<'a> {
    shape: &'a TypeDescription,
    candidate: &'a TypeDescription,
    mode: CheckMode,
}

impl<'a> ConformanceChecker<'a> {
    pub fn new(shape: &'a TypeDescription, candidate: &'a TypeDescription) -> Self {
        Self {
            shape,
            candidate,
            mode: CheckMode::Compose,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: CheckMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    /// All violations, in requirement order. Configuration errors abort.
    pub fn violations(&self) -> Result<Vec<Violation>, ConformanceError> {
        let mut tracer = CollectingTracer::new();
        self.check_with_tracer(&mut tracer)?;
        Ok(tracer.into_violations())
    }

    /// `Ok(())` when conformant, otherwise the full report.
    pub fn check(&self) -> Result<(), ConformanceError> {
        let violations = self.violations()?;
        debug!(
            shape = %self.shape.name(),
            candidate = %self.candidate.name(),
            violations = violations.len(),
            "conformance checked"
        );
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConformanceError::Nonconforming(ConformanceReport {
                shape: self.shape.name().clone(),
                candidate: self.candidate.name().clone(),
                violations,
            }))
        }
    }

    /// Boolean fast path; a malformed description is not conformant.
    pub fn is_conformant(&self) -> bool {
        let mut tracer = FastTracer::new();
        self.check_with_tracer(&mut tracer).is_ok() && !tracer.failed()
    }

    /// Run the comparison, reporting violations to `tracer`.
    pub fn check_with_tracer<T: ConformanceTracer>(
        &self,
        tracer: &mut T,
    ) -> Result<(), ConformanceError> {
        let (required, offered) = self.prepare()?;

        for requirement in &required {
            if !self.check_requirement(requirement, &offered, tracer)? {
                return Ok(());
            }
        }

        if self.mode == CheckMode::Compose {
            self.check_defaults(tracer);
        }
        Ok(())
    }

    /// The stored-state precondition, then extraction of both sides. A shape
    /// with state is reported before anything wrong with either description.
    fn prepare(&self) -> Result<(Vec<Signature>, Vec<Signature>), ConfigurationError> {
        let fields: Vec<_> = self
            .shape
            .stored_fields()
            .map(|member| member.name.clone())
            .collect();
        if !fields.is_empty() {
            return Err(ConfigurationError::NonBehavioralShape {
                shape: self.shape.name().clone(),
                fields,
            });
        }

        let required = extract(self.shape, Role::Shape)?;
        let offered = extract(self.candidate, Role::Candidate)?;
        Ok((required, offered))
    }

    /// Returns whether checking should continue.
    fn check_requirement<T: ConformanceTracer>(
        &self,
        requirement: &Signature,
        offered: &[Signature],
        tracer: &mut T,
    ) -> Result<bool, RenderError> {
        let requirement = requirement.substitute_self(Role::Shape, Role::Candidate);
        let name = &requirement.name;
        trace!(member = %name, expected = %requirement.type_text(), "checking requirement");

        let Some(found) = offered.iter().find(|c| c.name == *name) else {
            return Ok(tracer.on_violation(|| {
                Violation::new(
                    name.clone(),
                    FailureReason::MissingMember {
                        expected: requirement.type_text(),
                    },
                )
            }));
        };

        match (requirement.kind, found.kind) {
            (SignatureKind::NestedType, SignatureKind::NestedType) => return Ok(true),
            (SignatureKind::NestedType, other) => {
                return Ok(tracer.on_violation(|| {
                    Violation::new(name.clone(), FailureReason::NotANestedType { found: other })
                }));
            }
            (SignatureKind::Function, SignatureKind::Function) => {}
            (_, other) => {
                return Ok(tracer.on_violation(|| {
                    Violation::new(name.clone(), FailureReason::NotAFunction { found: other })
                }));
            }
        }

        if requirement.arity() != found.arity() {
            return Ok(tracer.on_violation(|| {
                Violation::new(
                    name.clone(),
                    FailureReason::ArityMismatch {
                        expected: requirement.arity(),
                        found: found.arity(),
                    },
                )
            }));
        }

        let return_slot = requirement.arity();
        let slots: Vec<Option<PositionMismatch>> = requirement
            .slots()
            .zip(found.slots())
            .enumerate()
            .map(|(index, (expected, actual))| {
                (!slot_compatible(expected, actual)).then(|| PositionMismatch {
                    index,
                    is_return: index == return_slot,
                    expected: expected.clone(),
                    found: actual.clone(),
                })
            })
            .collect();

        // The header shows the declaration as written, before self-binding.
        let declared = match self.candidate.member(name).map(|m| &m.kind) {
            Some(MemberKind::Function { sig, .. }) => {
                Signature::function(found.name.clone(), sig, found.has_body())
            }
            _ => found.clone(),
        };
        let Some(rendered) = render_signature(&found.name, &declared, &slots)? else {
            return Ok(true);
        };
        Ok(tracer.on_violation(|| {
            Violation::new(
                name.clone(),
                FailureReason::PositionMismatch {
                    mismatches: slots.into_iter().flatten().collect(),
                    rendered,
                },
            )
        }))
    }

    /// Shape defaults the candidate redefines (compose mode only), private
    /// candidate members included.
    fn check_defaults<T: ConformanceTracer>(&self, tracer: &mut T) {
        for default in self.shape.members().iter().filter(|m| m.is_supplied()) {
            if self.candidate.member(&default.name).is_none() {
                continue;
            }
            let keep_going = tracer.on_violation(|| {
                Violation::new(
                    default.name.clone(),
                    FailureReason::DefaultRedefined {
                        shape: self.shape.name().clone(),
                    },
                )
            });
            if !keep_going {
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/conformance_tests.rs"]
mod tests;
