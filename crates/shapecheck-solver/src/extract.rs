//! Signature extraction.
//!
//! Walks a `TypeDescription` and produces the ordered signature list for one
//! role. Configuration errors (duplicate names, oversized arity, non-pointer
//! dispatch slots) are raised before any signature is produced.

use crate::describe::{Member, MemberKind, TypeDescription};
use crate::diagnostics::ConfigurationError;
use crate::types::{Role, Signature, SignatureFlags, TypeRef};
use rustc_hash::FxHashSet;
use shapecheck_common::limits::MAX_PARAMETERS;
use tracing::trace;

/// Extract the signatures of `desc` as seen in `role`.
pub fn extract(desc: &TypeDescription, role: Role) -> Result<Vec<Signature>, ConfigurationError> {
    Extractor::new(desc, role).extract()
}

/// Per-role extraction over one description.
pub struct Extractor<'a> {
    desc: &'a TypeDescription,
    role: Role,
}

impl<'a> Extractor<'a> {
    pub fn new(desc: &'a TypeDescription, role: Role) -> Self {
        Self { desc, role }
    }

    pub fn extract(&self) -> Result<Vec<Signature>, ConfigurationError> {
        self.validate()?;

        let mut signatures = Vec::new();
        for member in self.desc.members() {
            if let Some(signature) = self.member_signature(member)? {
                trace!(
                    type_name = %self.desc.name(),
                    role = self.role.as_str(),
                    member = %signature.name,
                    ty = %signature.type_text(),
                    "extracted"
                );
                signatures.push(signature);
            }
        }
        Ok(signatures)
    }

    /// Name uniqueness and arity limits, checked over every member.
    fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen = FxHashSet::default();
        for member in self.desc.members() {
            if !seen.insert(&member.name) {
                return Err(ConfigurationError::DuplicateMember {
                    type_name: self.desc.name().clone(),
                    member: member.name.clone(),
                });
            }
            if let MemberKind::Function { sig, .. } = &member.kind
                && sig.arity() > MAX_PARAMETERS
            {
                return Err(ConfigurationError::TooManyParameters {
                    type_name: self.desc.name().clone(),
                    member: member.name.clone(),
                    count: sig.arity(),
                });
            }
        }
        Ok(())
    }

    fn member_signature(&self, member: &Member) -> Result<Option<Signature>, ConfigurationError> {
        let own_name = &**self.desc.name();
        let name = member.name.clone();
        let signature = match self.role {
            Role::Shape => match &member.kind {
                MemberKind::NestedType(_) => Some(Signature::nested_type(name)),
                MemberKind::Function { sig, body: None } => Some(Signature::function(
                    name,
                    &sig.bind_self(own_name, self.role),
                    false,
                )),
                // Defaults and constants are supplied, not required.
                MemberKind::Function { body: Some(_), .. }
                | MemberKind::Const { .. }
                | MemberKind::Field { .. } => None,
            },
            Role::Candidate => {
                if !member.is_public() {
                    return Ok(None);
                }
                Some(match &member.kind {
                    MemberKind::Function { sig, body } => Signature::function(
                        name,
                        &sig.bind_self(own_name, self.role),
                        body.is_some(),
                    ),
                    MemberKind::Field { ty, .. } | MemberKind::Const { ty, .. } => {
                        Signature::value(name, ty.bind_self(own_name, self.role))
                    }
                    MemberKind::NestedType(_) => Signature::nested_type(name),
                })
            }
            Role::DispatchTable => match &member.kind {
                MemberKind::Field {
                    ty: TypeRef::FnPtr(sig),
                    ..
                } => Some(Signature::function(
                    name,
                    &sig.bind_self(own_name, self.role),
                    false,
                )),
                MemberKind::Field { ty, .. } => {
                    return Err(ConfigurationError::NonFunctionSlot {
                        table: self.desc.name().clone(),
                        field: name,
                        found: ty.to_string(),
                    });
                }
                // Only fields are slots.
                _ => None,
            },
        };
        Ok(signature.map(|s| {
            if member.is_public() {
                s
            } else {
                s.with_flags(SignatureFlags::PRIVATE)
            }
        }))
    }
}

#[cfg(test)]
#[path = "../tests/extract_tests.rs"]
mod tests;
