//! Declaration merging.
//!
//! Flattens a shape's supplied declarations and a candidate's public
//! declarations into one namespace named after the candidate. A name present
//! in both resolves to the candidate's definition and keeps the shape's
//! position. Bindings keep their declaring type: merging copies, it never
//! rebinds. Private declarations of either side travel along unlisted, so a
//! copied body still reaches its own type's helpers.

use crate::describe::TypeDescription;
use crate::diagnostics::ConfigurationError;
use crate::extract::extract;
use crate::namespace::{Binding, Namespace};
use crate::types::Role;
use indexmap::IndexMap;
use tracing::{debug, trace};

pub struct DeclarationMerger<'a> {
    shape: &'a TypeDescription,
    candidate: &'a TypeDescription,
}

impl<'a> DeclarationMerger<'a> {
    pub fn new(shape: &'a TypeDescription, candidate: &'a TypeDescription) -> Self {
        Self { shape, candidate }
    }

    pub fn merge(&self) -> Result<Namespace, ConfigurationError> {
        // Extraction validates both sides (duplicate names, arity limits).
        extract(self.shape, Role::Shape)?;
        extract(self.candidate, Role::Candidate)?;

        let mut entries: IndexMap<_, Binding> = IndexMap::new();
        let mut private = Vec::new();

        for member in self.shape.members() {
            let Some(binding) = Binding::from_member(member, self.shape, Role::Shape) else {
                continue;
            };
            if member.is_public() {
                entries.insert(binding.name.clone(), binding);
            } else {
                private.push(binding);
            }
        }

        for member in self.candidate.members() {
            let Some(binding) = Binding::from_member(member, self.candidate, Role::Candidate)
            else {
                continue;
            };
            if !member.is_public() {
                trace!(member = %member.name, "candidate private declaration");
                private.push(binding);
                continue;
            }
            match entries.insert(binding.name.clone(), binding) {
                Some(shadowed) => debug!(
                    member = %shadowed.name,
                    shape = %self.shape.name(),
                    candidate = %self.candidate.name(),
                    "candidate overrides default"
                ),
                None => trace!(member = %member.name, "candidate declaration"),
            }
        }

        debug!(
            namespace = %self.candidate.name(),
            entries = entries.len(),
            private = private.len(),
            "merged declarations"
        );
        Ok(Namespace::from_parts(
            self.candidate.name().clone(),
            entries,
            private,
        ))
    }
}

#[cfg(test)]
#[path = "../tests/merge_tests.rs"]
mod tests;
