//! Dispatch tables.
//!
//! A dispatch table description is a flat list of function-pointer fields.
//! Building a `VTable` binds each field to the implementation's public
//! function of the same name. There are no defaults and no inheritance: every
//! slot must be implemented.
//!
//! `DynObject` pairs a table with the state it dispatches on, so a slot body
//! reaches its receiver through an owned reference rather than by recovering
//! a parent record from a field address.

use crate::conformance::slot_compatible;
use crate::describe::{Body, MemberKind, TypeDescription, Value};
use crate::diagnostics::ConfigurationError;
use crate::extract::extract;
use crate::namespace::{Binding, BindingValue, Namespace};
use crate::runtime::{CallError, Instance, MemberLookup, invoke};
use crate::types::{FnSig, Name, Role, Signature};
use rustc_hash::FxHashMap;
use shapecheck_common::diagnostic_codes as codes;
use shapecheck_common::diagnostic_messages as messages;
use shapecheck_common::format_message;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Why a table could not be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VTableError {
    Configuration(ConfigurationError),
    MissingImplementation {
        implementation: Name,
        slot: Name,
    },
    IncompatibleSlot {
        slot: Name,
        expected: String,
        found: String,
    },
}

impl VTableError {
    pub const fn code(&self) -> u32 {
        match self {
            VTableError::Configuration(err) => err.code(),
            VTableError::MissingImplementation { .. } => codes::MISSING_IMPLEMENTATION,
            VTableError::IncompatibleSlot { .. } => codes::INCOMPATIBLE_SLOT,
        }
    }
}

impl fmt::Display for VTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            VTableError::Configuration(err) => err.message(),
            VTableError::MissingImplementation {
                implementation,
                slot,
            } => format_message(
                messages::MISSING_IMPLEMENTATION,
                &[&**implementation, &**slot],
            ),
            VTableError::IncompatibleSlot {
                slot,
                expected,
                found,
            } => format_message(
                messages::INCOMPATIBLE_SLOT,
                &[&**slot, expected.as_str(), found.as_str()],
            ),
        };
        write!(f, "error[SC{}]: {message}", self.code())
    }
}

impl std::error::Error for VTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VTableError::Configuration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for VTableError {
    fn from(err: ConfigurationError) -> Self {
        VTableError::Configuration(err)
    }
}

/// A borrowed view of one slot.
#[derive(Clone, Copy, Debug)]
pub struct VTableEntry<'a> {
    pub name: &'a Name,
    pub sig: &'a FnSig,
    pub function: &'a Body,
}

/// Function slots bound to one implementation, in table order.
#[derive(Clone, Debug)]
pub struct VTable {
    table: Name,
    implementation: Name,
    slots: Vec<Binding>,
    index: FxHashMap<Name, usize>,
    /// The implementation's own declarations, for calls made from its bodies.
    helpers: Namespace,
}

impl VTable {
    pub fn build(
        table: &TypeDescription,
        implementation: &TypeDescription,
    ) -> Result<Self, VTableError> {
        let declared = extract(table, Role::DispatchTable)?;

        let mut slots = Vec::with_capacity(declared.len());
        let mut index = FxHashMap::default();
        for slot in declared {
            let binding = bind_slot(&slot, implementation)?;
            index.insert(binding.name.clone(), slots.len());
            slots.push(binding);
        }

        debug!(
            table = %table.name(),
            implementation = %implementation.name(),
            slots = slots.len(),
            "built dispatch table"
        );
        Ok(Self {
            table: table.name().clone(),
            implementation: implementation.name().clone(),
            slots,
            index,
            helpers: Namespace::declarations_of(implementation, Role::Candidate),
        })
    }

    pub fn table_name(&self) -> &Name {
        &self.table
    }

    pub fn implementation_name(&self) -> &Name {
        &self.implementation
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn entry(&self, slot: &str) -> Option<VTableEntry<'_>> {
        self.index.get(slot).and_then(|&i| entry_of(&self.slots[i]))
    }

    pub fn entries(&self) -> impl Iterator<Item = VTableEntry<'_>> {
        self.slots.iter().filter_map(entry_of)
    }

    /// Call a slot; `args` excludes the self receiver.
    pub fn invoke(
        &self,
        slot: &str,
        instance: &mut Instance,
        args: &[Value],
    ) -> Result<Value, CallError> {
        invoke(self, instance, slot, args)
    }
}

fn entry_of(binding: &Binding) -> Option<VTableEntry<'_>> {
    match &binding.value {
        BindingValue::Function { sig, body } => Some(VTableEntry {
            name: &binding.name,
            sig,
            function: body,
        }),
        BindingValue::Const { .. } | BindingValue::NestedType(_) => None,
    }
}

/// Bind one declared slot to the implementation's function of the same name.
fn bind_slot(slot: &Signature, implementation: &TypeDescription) -> Result<Binding, VTableError> {
    let missing = || VTableError::MissingImplementation {
        implementation: implementation.name().clone(),
        slot: slot.name.clone(),
    };
    let member = implementation
        .member(&slot.name)
        .filter(|m| m.is_public())
        .ok_or_else(missing)?;
    let MemberKind::Function {
        sig,
        body: Some(body),
    } = &member.kind
    else {
        return Err(missing());
    };

    let expected = slot.substitute_self(Role::DispatchTable, Role::Candidate);
    let bound = sig.bind_self(implementation.name(), Role::Candidate);
    let found = Signature::function(member.name.clone(), &bound, true);
    let compatible = expected.arity() == found.arity()
        && expected
            .slots()
            .zip(found.slots())
            .all(|(e, f)| slot_compatible(e, f));
    if !compatible {
        return Err(VTableError::IncompatibleSlot {
            slot: slot.name.clone(),
            expected: expected.type_text(),
            found: found.type_text(),
        });
    }

    Ok(Binding {
        name: member.name.clone(),
        origin: implementation.name().clone(),
        origin_role: Role::Candidate,
        value: BindingValue::Function {
            sig: bound,
            body: body.clone(),
        },
    })
}

impl MemberLookup for VTable {
    fn namespace_name(&self) -> &Name {
        &self.table
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    fn lookup_private(&self, name: &str, origin: &Name) -> Option<&Binding> {
        self.helpers.lookup_private(name, origin)
    }
}

/// A dispatch table paired with the value it dispatches on.
#[derive(Clone, Debug)]
pub struct DynObject {
    vtable: Arc<VTable>,
    instance: Instance,
}

impl DynObject {
    pub fn new(vtable: Arc<VTable>, instance: Instance) -> Self {
        Self { vtable, instance }
    }

    pub fn vtable(&self) -> &VTable {
        &self.vtable
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn call(&mut self, slot: &str, args: &[Value]) -> Result<Value, CallError> {
        self.vtable.invoke(slot, &mut self.instance, args)
    }
}

#[cfg(test)]
#[path = "../tests/vtable_tests.rs"]
mod tests;
