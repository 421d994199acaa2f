//! Call runtime for composed namespaces.
//!
//! Member bodies run against a `MemberLookup` (a namespace, a composed
//! accessor or a dispatch table) and an `Instance` holding the candidate's
//! stored state. Calls made from inside a body go through the same lookup by
//! name, so an overridden member is observed by every default that calls it.

use crate::describe::{MemberKind, TypeDescription, Value};
use crate::namespace::{Binding, BindingValue};
use crate::types::Name;
use indexmap::IndexMap;
use shapecheck_common::limits::MAX_CALL_DEPTH;
use tracing::trace;

/// Error raised while calling a member.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error("'{namespace}' has no member '{member}'")]
    UnknownMember { namespace: Name, member: String },
    #[error("member '{member}' is not a function")]
    NotCallable { member: Name },
    #[error("member '{member}' is not a constant")]
    NotAConstant { member: Name },
    #[error("member '{member}' takes {expected} argument(s), {found} given")]
    ArgumentCount {
        member: Name,
        expected: usize,
        found: usize,
    },
    #[error("'{type_name}' has no field '{field}'")]
    UnknownField { type_name: Name, field: String },
    #[error("field '{field}' holds {expected}, cannot store {found}")]
    ValueMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("member '{member}' has no callable body")]
    OpaqueBody { member: Name },
    #[error("call to '{member}' exceeds the nesting limit of {limit}")]
    RecursionLimit { member: String, limit: u32 },
    #[error("member '{member}' failed: {message}")]
    Failed { member: Name, message: String },
}

/// Resolves member names to bindings.
pub trait MemberLookup {
    /// Name reported in errors.
    fn namespace_name(&self) -> &Name;

    fn lookup(&self, name: &str) -> Option<&Binding>;

    /// A private declaration of `origin`, visible only to bodies `origin`
    /// declared.
    fn lookup_private(&self, _name: &str, _origin: &Name) -> Option<&Binding> {
        None
    }
}

/// Resolve `member` for a call made from a body declared by `caller`, or
/// from outside when `caller` is `None`.
fn resolve<'a>(
    lookup: &'a dyn MemberLookup,
    member: &str,
    caller: Option<&Name>,
) -> Result<&'a Binding, CallError> {
    caller
        .and_then(|origin| lookup.lookup_private(member, origin))
        .or_else(|| lookup.lookup(member))
        .ok_or_else(|| CallError::UnknownMember {
            namespace: lookup.namespace_name().clone(),
            member: member.to_string(),
        })
}

// =============================================================================
// Instance
// =============================================================================

/// Stored state of one candidate value.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    type_name: Name,
    fields: IndexMap<Name, Value>,
}

impl Instance {
    /// Every stored field starts at its default, or the zero value of its type.
    pub fn new(desc: &TypeDescription) -> Self {
        let fields = desc
            .stored_fields()
            .filter_map(|member| match &member.kind {
                MemberKind::Field { ty, default } => Some((
                    member.name.clone(),
                    default.clone().unwrap_or_else(|| Value::zero_for(ty)),
                )),
                _ => None,
            })
            .collect();
        Self {
            type_name: desc.name().clone(),
            fields,
        }
    }

    /// An instance with no stored state.
    pub fn empty(type_name: impl Into<Name>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn type_name(&self) -> &Name {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Replace a field's value. A field never changes kind once it holds
    /// something other than `void`.
    pub fn set(&mut self, field: &str, value: Value) -> Result<(), CallError> {
        let Some(slot) = self.fields.get_mut(field) else {
            return Err(CallError::UnknownField {
                type_name: self.type_name.clone(),
                field: field.to_string(),
            });
        };
        if *slot != Value::Void && slot.kind_name() != value.kind_name() {
            return Err(CallError::ValueMismatch {
                field: field.to_string(),
                expected: slot.kind_name(),
                found: value.kind_name(),
            });
        }
        *slot = value;
        Ok(())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.fields.iter()
    }
}

// =============================================================================
// CallContext
// =============================================================================

/// What a running body can see: its own state and the namespace it was
/// dispatched through.
pub struct CallContext<'a> {
    lookup: &'a dyn MemberLookup,
    instance: &'a mut Instance,
    member: Name,
    declaring_type: Name,
    depth: u32,
}

impl CallContext<'_> {
    pub fn this(&self) -> &Instance {
        &*self.instance
    }

    pub fn this_mut(&mut self) -> &mut Instance {
        &mut *self.instance
    }

    /// The member being executed.
    pub fn member(&self) -> &Name {
        &self.member
    }

    /// The description that declared the running body, which is the shape
    /// for a default even when called through a merged namespace.
    pub fn declaring_type(&self) -> &Name {
        &self.declaring_type
    }

    /// The namespace calls are dispatched through.
    pub fn namespace(&self) -> &Name {
        self.lookup.namespace_name()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn field(&self, name: &str) -> Result<Value, CallError> {
        self.instance
            .get(name)
            .cloned()
            .ok_or_else(|| CallError::UnknownField {
                type_name: self.instance.type_name().clone(),
                field: name.to_string(),
            })
    }

    pub fn int_field(&self, name: &str) -> Result<i64, CallError> {
        let value = self.field(name)?;
        value.as_int().ok_or(CallError::ValueMismatch {
            field: name.to_string(),
            expected: "int",
            found: value.kind_name(),
        })
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), CallError> {
        self.instance.set(name, value.into())
    }

    /// Call another member by name through the dispatching namespace.
    pub fn call(&mut self, member: &str, args: &[Value]) -> Result<Value, CallError> {
        invoke_at(
            self.lookup,
            self.instance,
            member,
            args,
            self.depth + 1,
            Some(&self.declaring_type),
        )
    }

    /// Read a constant by name through the dispatching namespace.
    pub fn constant(&self, member: &str) -> Result<Value, CallError> {
        constant_at(self.lookup, member, Some(&self.declaring_type)).cloned()
    }

    /// An error attributed to the running member.
    pub fn fail(&self, message: impl Into<String>) -> CallError {
        CallError::Failed {
            member: self.member.clone(),
            message: message.into(),
        }
    }
}

/// Call `member` on `instance` through `lookup`.
///
/// `args` excludes the self receiver.
pub fn invoke(
    lookup: &dyn MemberLookup,
    instance: &mut Instance,
    member: &str,
    args: &[Value],
) -> Result<Value, CallError> {
    invoke_at(lookup, instance, member, args, 0, None)
}

fn invoke_at(
    lookup: &dyn MemberLookup,
    instance: &mut Instance,
    member: &str,
    args: &[Value],
    depth: u32,
    caller: Option<&Name>,
) -> Result<Value, CallError> {
    if depth >= MAX_CALL_DEPTH {
        return Err(CallError::RecursionLimit {
            member: member.to_string(),
            limit: MAX_CALL_DEPTH,
        });
    }
    let binding = resolve(lookup, member, caller)?;
    let BindingValue::Function { sig, body } = &binding.value else {
        return Err(CallError::NotCallable {
            member: binding.name.clone(),
        });
    };

    let expected = sig.arity() - usize::from(sig.has_self_receiver());
    if args.len() != expected {
        return Err(CallError::ArgumentCount {
            member: binding.name.clone(),
            expected,
            found: args.len(),
        });
    }

    trace!(
        namespace = %lookup.namespace_name(),
        member,
        origin = %binding.origin,
        depth,
        "call"
    );
    let mut ctx = CallContext {
        lookup,
        instance,
        member: binding.name.clone(),
        declaring_type: binding.origin.clone(),
        depth,
    };
    body.invoke(&mut ctx, args)
}

/// Resolve a constant by name.
pub fn constant<'a>(lookup: &'a dyn MemberLookup, member: &str) -> Result<&'a Value, CallError> {
    constant_at(lookup, member, None)
}

fn constant_at<'a>(
    lookup: &'a dyn MemberLookup,
    member: &str,
    caller: Option<&Name>,
) -> Result<&'a Value, CallError> {
    let binding = resolve(lookup, member, caller)?;
    match &binding.value {
        BindingValue::Const { value, .. } => Ok(value),
        _ => Err(CallError::NotAConstant {
            member: binding.name.clone(),
        }),
    }
}

#[cfg(test)]
#[path = "../tests/runtime_tests.rs"]
mod tests;
