//! Type descriptions.
//!
//! A `TypeDescription` is the structured, explicitly authored stand-in for
//! compile-time reflection: a named list of members, each a stored field, a
//! function (with or without a body), a constant or a nested type. The same
//! description can be checked as a shape or as a candidate; extraction decides
//! what each member means for its role.
//!
//! ```ignore
//! let iterable = TypeDescription::new("Iterable")
//!     .required("next", "fn(*Self) i32".parse()?)
//!     .function("printNext", "fn(*Self) void".parse()?, |ctx, _| {
//!         let value = ctx.call("next", &[])?;
//!         tracing::info!(%value, "next");
//!         Ok(Value::Void)
//!     });
//! ```

use crate::runtime::{CallContext, CallError};
use crate::types::{Name, TypeRef};
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// =============================================================================
// Values and bodies
// =============================================================================

/// A runtime value seen by member bodies.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
}

impl Value {
    /// The zero value a field of type `ty` starts from when it has no default.
    pub fn zero_for(ty: &TypeRef) -> Value {
        let TypeRef::Named { name, depth: 0 } = ty else {
            return Value::Void;
        };
        match &**name {
            "bool" => Value::Bool(false),
            "f16" | "f32" | "f64" | "f80" | "f128" | "comptime_float" => Value::Float(0.0),
            "comptime_int" | "isize" | "usize" => Value::Int(0),
            "[]const u8" | "[]u8" => Value::Str(Arc::from("")),
            other if is_integer_name(other) => Value::Int(0),
            _ => Value::Void,
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// `i8`, `u32`, `i128`...
fn is_integer_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('i' | 'u'))
        && !chars.as_str().is_empty()
        && chars.as_str().bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("void"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

type BodyFn = dyn Fn(&mut CallContext<'_>, &[Value]) -> Result<Value, CallError> + Send + Sync;

/// The implementation of a function member.
///
/// Bodies receive the call context (self state, by-name calls) and the
/// explicit arguments; a self receiver is never part of `args`.
#[derive(Clone)]
pub struct Body(Option<Arc<BodyFn>>);

impl Body {
    pub fn new(
        f: impl Fn(&mut CallContext<'_>, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Self {
        Body(Some(Arc::new(f)))
    }

    /// A body that is declared but cannot be invoked.
    ///
    /// Descriptions loaded from a manifest know that a default exists but have
    /// no code for it.
    pub fn opaque() -> Self {
        Body(None)
    }

    pub fn is_opaque(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) fn invoke(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[Value],
    ) -> Result<Value, CallError> {
        match &self.0 {
            Some(f) => f(ctx, args),
            None => Err(CallError::OpaqueBody {
                member: ctx.member().clone(),
            }),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            f.write_str("Body(opaque)")
        } else {
            f.write_str("Body(..)")
        }
    }
}

// =============================================================================
// Members
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Clone, Debug)]
pub enum MemberKind {
    /// Stored state.
    Field { ty: TypeRef, default: Option<Value> },
    /// A function declaration; `body: None` is a pure requirement.
    Function {
        sig: crate::types::FnSig,
        body: Option<Body>,
    },
    /// A value declaration.
    Const { ty: TypeRef, value: Value },
    NestedType(Arc<TypeDescription>),
}

#[derive(Clone, Debug)]
pub struct Member {
    pub name: Name,
    pub visibility: Visibility,
    pub kind: MemberKind,
}

impl Member {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_stored_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    /// A function with an implementation or a constant: something a shape
    /// supplies rather than requires.
    pub fn is_supplied(&self) -> bool {
        matches!(
            self.kind,
            MemberKind::Function { body: Some(_), .. } | MemberKind::Const { .. }
        )
    }
}

// =============================================================================
// TypeDescription
// =============================================================================

/// A named namespace of members.
#[derive(Clone, Debug)]
pub struct TypeDescription {
    name: Name,
    members: Vec<Member>,
}

impl TypeDescription {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// First member with this name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| &*m.name == name)
    }

    pub fn stored_fields(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_stored_field())
    }

    #[must_use]
    pub fn member_with(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    fn push(self, name: impl Into<Name>, kind: MemberKind) -> Self {
        self.member_with(Member {
            name: name.into(),
            visibility: Visibility::Public,
            kind,
        })
    }

    #[must_use]
    pub fn field(self, name: impl Into<Name>, ty: TypeRef) -> Self {
        self.push(name, MemberKind::Field { ty, default: None })
    }

    #[must_use]
    pub fn field_with_default(self, name: impl Into<Name>, ty: TypeRef, default: Value) -> Self {
        self.push(
            name,
            MemberKind::Field {
                ty,
                default: Some(default),
            },
        )
    }

    /// A bodyless function: a requirement when extracted as a shape.
    #[must_use]
    pub fn required(self, name: impl Into<Name>, sig: crate::types::FnSig) -> Self {
        self.push(name, MemberKind::Function { sig, body: None })
    }

    #[must_use]
    pub fn function(
        self,
        name: impl Into<Name>,
        sig: crate::types::FnSig,
        body: impl Fn(&mut CallContext<'_>, &[Value]) -> Result<Value, CallError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.function_body(name, sig, Body::new(body))
    }

    #[must_use]
    pub fn function_body(self, name: impl Into<Name>, sig: crate::types::FnSig, body: Body) -> Self {
        self.push(
            name,
            MemberKind::Function {
                sig,
                body: Some(body),
            },
        )
    }

    #[must_use]
    pub fn constant(self, name: impl Into<Name>, ty: TypeRef, value: Value) -> Self {
        self.push(name, MemberKind::Const { ty, value })
    }

    #[must_use]
    pub fn nested(self, name: impl Into<Name>, description: TypeDescription) -> Self {
        self.push(name, MemberKind::NestedType(Arc::new(description)))
    }

    /// Mark the most recently added member private.
    #[must_use]
    pub fn private(mut self) -> Self {
        if let Some(last) = self.members.last_mut() {
            last.visibility = Visibility::Private;
        }
        self
    }

    /// Hash of everything a conformance verdict depends on.
    ///
    /// Bodies contribute only their presence, constants only their type, so
    /// two descriptions that differ only in behavior share a key.
    pub fn structural_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash_structure(&mut hasher);
        hasher.finish()
    }

    fn hash_structure(&self, hasher: &mut FxHasher) {
        self.name.hash(hasher);
        self.members.len().hash(hasher);
        for member in &self.members {
            member.name.hash(hasher);
            member.visibility.hash(hasher);
            match &member.kind {
                MemberKind::Field { ty, default } => {
                    0u8.hash(hasher);
                    ty.hash(hasher);
                    default.is_some().hash(hasher);
                }
                MemberKind::Function { sig, body } => {
                    1u8.hash(hasher);
                    sig.hash(hasher);
                    body.is_some().hash(hasher);
                }
                MemberKind::Const { ty, .. } => {
                    2u8.hash(hasher);
                    ty.hash(hasher);
                }
                MemberKind::NestedType(nested) => {
                    3u8.hash(hasher);
                    nested.hash_structure(hasher);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/describe_tests.rs"]
mod tests;
