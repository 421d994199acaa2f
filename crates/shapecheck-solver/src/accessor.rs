//! The result of a successful compose-mode check.

use crate::describe::{TypeDescription, Value};
use crate::namespace::{Binding, Namespace};
use crate::runtime::{CallError, Instance, MemberLookup, invoke};
use crate::types::{Name, Role};

/// Exposes the candidate's namespace and the shape's namespace separately.
///
/// Calls resolve against the candidate first, then against the shape's
/// defaults, so a default calling a requirement by name reaches the
/// candidate's implementation.
#[derive(Clone, Debug)]
pub struct ComposedAccessor {
    shape: Namespace,
    candidate: Namespace,
    layout: Instance,
}

impl ComposedAccessor {
    pub fn compose(shape: &TypeDescription, candidate: &TypeDescription) -> Self {
        Self {
            shape: Namespace::declarations_of(shape, Role::Shape),
            candidate: Namespace::declarations_of(candidate, Role::Candidate),
            layout: Instance::new(candidate),
        }
    }

    pub fn shape(&self) -> &Namespace {
        &self.shape
    }

    pub fn candidate(&self) -> &Namespace {
        &self.candidate
    }

    /// A fresh candidate value with every field at its initial value.
    pub fn instantiate(&self) -> Instance {
        self.layout.clone()
    }

    pub fn call(
        &self,
        instance: &mut Instance,
        member: &str,
        args: &[Value],
    ) -> Result<Value, CallError> {
        invoke(self, instance, member, args)
    }
}

impl MemberLookup for ComposedAccessor {
    fn namespace_name(&self) -> &Name {
        self.candidate.name()
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.candidate.get(name).or_else(|| self.shape.get(name))
    }

    fn lookup_private(&self, name: &str, origin: &Name) -> Option<&Binding> {
        self.candidate
            .lookup_private(name, origin)
            .or_else(|| self.shape.lookup_private(name, origin))
    }
}
