//! Immutable namespaces of bound declarations.
//!
//! A `Namespace` maps member names to bindings in declaration order. It holds
//! declarations only: functions with bodies, constants and nested types.
//! Stored fields live in an `Instance`, never in a namespace.

use crate::describe::{Body, Member, MemberKind, TypeDescription, Value};
use crate::runtime::{CallError, Instance, MemberLookup, invoke};
use crate::types::{FnSig, Name, Role, TypeRef};
use indexmap::IndexMap;
use std::sync::Arc;

/// The value a name is bound to.
#[derive(Clone, Debug)]
pub enum BindingValue {
    Function { sig: FnSig, body: Body },
    Const { ty: TypeRef, value: Value },
    NestedType(Arc<TypeDescription>),
}

/// One name in a namespace, with the type that declared it.
#[derive(Clone, Debug)]
pub struct Binding {
    pub name: Name,
    /// The description the declaration was copied from.
    pub origin: Name,
    pub origin_role: Role,
    pub value: BindingValue,
}

impl Binding {
    /// The binding a member contributes, if it carries a value.
    ///
    /// Bodyless functions and stored fields contribute nothing.
    pub fn from_member(member: &Member, origin: &TypeDescription, role: Role) -> Option<Self> {
        let value = match &member.kind {
            MemberKind::Function {
                sig,
                body: Some(body),
            } => BindingValue::Function {
                sig: sig.bind_self(origin.name(), role),
                body: body.clone(),
            },
            MemberKind::Const { ty, value } => BindingValue::Const {
                ty: ty.bind_self(origin.name(), role),
                value: value.clone(),
            },
            MemberKind::NestedType(desc) => BindingValue::NestedType(Arc::clone(desc)),
            MemberKind::Function { body: None, .. } | MemberKind::Field { .. } => return None,
        };
        Some(Self {
            name: member.name.clone(),
            origin: origin.name().clone(),
            origin_role: role,
            value,
        })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.value, BindingValue::Function { .. })
    }
}

/// A flattened, immutable mapping from names to bindings.
///
/// Private declarations are kept apart: they are not listed and cannot be
/// reached by name from outside, only from bodies their own type declared.
#[derive(Clone, Debug)]
pub struct Namespace {
    name: Name,
    entries: IndexMap<Name, Binding>,
    private: Vec<Binding>,
}

impl Namespace {
    pub(crate) fn from_parts(
        name: Name,
        entries: IndexMap<Name, Binding>,
        private: Vec<Binding>,
    ) -> Self {
        Self {
            name,
            entries,
            private,
        }
    }

    /// Every declaration of `desc` that carries a value.
    pub fn declarations_of(desc: &TypeDescription, role: Role) -> Self {
        let mut entries = IndexMap::new();
        let mut private = Vec::new();
        for member in desc.members() {
            let Some(binding) = Binding::from_member(member, desc, role) else {
                continue;
            };
            if member.is_public() {
                entries.insert(binding.name.clone(), binding);
            } else {
                private.push(binding);
            }
        }
        Self::from_parts(desc.name().clone(), entries, private)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the private declarations, in declaration order.
    pub fn private_names(&self) -> impl Iterator<Item = &Name> {
        self.private.iter().map(|binding| &binding.name)
    }

    /// Call a function member; `args` excludes the self receiver.
    pub fn call(
        &self,
        instance: &mut Instance,
        member: &str,
        args: &[Value],
    ) -> Result<Value, CallError> {
        invoke(self, instance, member, args)
    }

    pub fn constant(&self, member: &str) -> Result<&Value, CallError> {
        crate::runtime::constant(self, member)
    }
}

impl MemberLookup for Namespace {
    fn namespace_name(&self) -> &Name {
        &self.name
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.get(name)
    }

    fn lookup_private(&self, name: &str, origin: &Name) -> Option<&Binding> {
        self.private
            .iter()
            .find(|binding| &*binding.name == name && binding.origin == *origin)
    }
}
