//! Signature model.
//!
//! The canonical representation of a member as seen by the conformance
//! checker: a name, a kind, a parameter list and a return type. Signatures are
//! derived fresh from a `TypeDescription` on every extraction and never
//! outlive the check that produced them.
//!
//! ## Type references
//!
//! | Variant | Text | Equal to |
//! |---------|------|----------|
//! | `Named` | `i32`, `**u8` | same name at the same depth |
//! | `SelfRef` | `*Self` | same role at the same depth |
//! | `Wildcard` | `anytype` | another wildcard |
//! | `FnPtr` | `*const fn(*Self) void` | structurally equal signature |
//!
//! `Self` is parsed as an ordinary `Named` type. Extraction binds it (and the
//! description's own name) to a `SelfRef` of the extraction role, so the same
//! description can be extracted as a shape or as a candidate.

use bitflags::bitflags;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Member and type names.
pub type Name = Arc<str>;

/// The name `Self` binds to during extraction.
pub const SELF_TYPE_NAME: &str = "Self";

/// The name a nested-type member reports as its type.
pub const TYPE_TYPE_NAME: &str = "type";

/// Which side of a check a description is extracted as.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// The required interface.
    Shape,
    /// The type being checked.
    Candidate,
    /// A flat table of function-pointer slots.
    DispatchTable,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Shape => "shape",
            Role::Candidate => "candidate",
            Role::DispatchTable => "dispatch table",
        }
    }
}

// =============================================================================
// TypeRef
// =============================================================================

/// A reference to a type inside a signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A concrete type behind `depth` pointer layers.
    Named { name: Name, depth: u8 },
    /// The type being defined, bound to the role it was extracted under.
    SelfRef { role: Role, depth: u8 },
    /// `anytype`.
    Wildcard,
    /// A function pointer (`*const fn(...) R`).
    FnPtr(Arc<FnSig>),
}

impl TypeRef {
    pub fn named(name: impl Into<Name>) -> Self {
        TypeRef::Named {
            name: name.into(),
            depth: 0,
        }
    }

    pub fn pointer(name: impl Into<Name>, depth: u8) -> Self {
        TypeRef::Named {
            name: name.into(),
            depth,
        }
    }

    pub fn self_ref(role: Role, depth: u8) -> Self {
        TypeRef::SelfRef { role, depth }
    }

    pub fn fn_ptr(sig: FnSig) -> Self {
        TypeRef::FnPtr(Arc::new(sig))
    }

    pub fn void() -> Self {
        Self::named("void")
    }

    /// Number of pointer layers before the base type.
    pub fn depth(&self) -> u8 {
        match self {
            TypeRef::Named { depth, .. } | TypeRef::SelfRef { depth, .. } => *depth,
            TypeRef::Wildcard | TypeRef::FnPtr(_) => 0,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeRef::Wildcard)
    }

    pub fn is_self(&self) -> bool {
        matches!(self, TypeRef::SelfRef { .. })
    }

    pub fn is_self_of(&self, role: Role) -> bool {
        matches!(self, TypeRef::SelfRef { role: r, .. } if *r == role)
    }

    pub fn contains_wildcard(&self) -> bool {
        match self {
            TypeRef::Wildcard => true,
            TypeRef::FnPtr(sig) => sig.contains_wildcard(),
            TypeRef::Named { .. } | TypeRef::SelfRef { .. } => false,
        }
    }

    /// Bind `Self` and the description's own name to a self-marker of `role`.
    #[must_use]
    pub fn bind_self(&self, own_name: &str, role: Role) -> TypeRef {
        match self {
            TypeRef::Named { name, depth }
                if &**name == SELF_TYPE_NAME || &**name == own_name =>
            {
                TypeRef::SelfRef {
                    role,
                    depth: *depth,
                }
            }
            TypeRef::FnPtr(sig) => TypeRef::FnPtr(Arc::new(sig.bind_self(own_name, role))),
            _ => self.clone(),
        }
    }

    /// Rebind self-markers of role `from` to role `to`, keeping their depth.
    #[must_use]
    pub fn substitute_self(&self, from: Role, to: Role) -> TypeRef {
        match self {
            TypeRef::SelfRef { role, depth } if *role == from => TypeRef::SelfRef {
                role: to,
                depth: *depth,
            },
            TypeRef::FnPtr(sig) => TypeRef::FnPtr(Arc::new(sig.substitute_self(from, to))),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, depth } => {
                for _ in 0..*depth {
                    f.write_str("*")?;
                }
                f.write_str(name)
            }
            TypeRef::SelfRef { depth, .. } => {
                for _ in 0..*depth {
                    f.write_str("*")?;
                }
                f.write_str(SELF_TYPE_NAME)
            }
            TypeRef::Wildcard => f.write_str("anytype"),
            TypeRef::FnPtr(sig) => write!(f, "*const {sig}"),
        }
    }
}

// =============================================================================
// FnSig
// =============================================================================

/// The type of a function member: its parameter types and return type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FnSig {
    pub params: SmallVec<[TypeRef; 4]>,
    pub ret: TypeRef,
}

impl FnSig {
    pub fn new(params: impl IntoIterator<Item = TypeRef>, ret: TypeRef) -> Self {
        Self {
            params: params.into_iter().collect(),
            ret,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the first parameter is a self-marker (a method receiver).
    pub fn has_self_receiver(&self) -> bool {
        self.params.first().is_some_and(TypeRef::is_self)
    }

    pub fn contains_wildcard(&self) -> bool {
        self.params.iter().any(TypeRef::contains_wildcard) || self.ret.contains_wildcard()
    }

    #[must_use]
    pub fn bind_self(&self, own_name: &str, role: Role) -> FnSig {
        FnSig {
            params: self
                .params
                .iter()
                .map(|p| p.bind_self(own_name, role))
                .collect(),
            ret: self.ret.bind_self(own_name, role),
        }
    }

    #[must_use]
    pub fn substitute_self(&self, from: Role, to: Role) -> FnSig {
        FnSig {
            params: self
                .params
                .iter()
                .map(|p| p.substitute_self(from, to))
                .collect(),
            ret: self.ret.substitute_self(from, to),
        }
    }
}

impl fmt::Display for FnSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") {}", self.ret)
    }
}

// =============================================================================
// Signature
// =============================================================================

/// What a member is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureKind {
    Function,
    NestedType,
    /// A stored field or a constant: never a requirement, still mergeable.
    Value,
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignatureKind::Function => "a function",
            SignatureKind::NestedType => "a nested type",
            SignatureKind::Value => "a value",
        })
    }
}

bitflags! {
    /// Flags carried by an extracted signature.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SignatureFlags: u8 {
        /// The member was declared with an implementation.
        const HAS_BODY = 1 << 0;
        /// The first parameter is a self-marker.
        const SELF_RECEIVER = 1 << 1;
        /// Some slot is `anytype`.
        const HAS_WILDCARD = 1 << 2;
        /// The member is not publicly visible.
        const PRIVATE = 1 << 3;
    }
}

/// One parameter slot of a signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamSpec {
    pub ty: TypeRef,
    pub is_wildcard: bool,
}

impl ParamSpec {
    pub fn new(ty: TypeRef) -> Self {
        let is_wildcard = ty.is_wildcard();
        Self { ty, is_wildcard }
    }
}

/// An extracted member signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: Name,
    pub kind: SignatureKind,
    pub params: Vec<ParamSpec>,
    pub return_type: TypeRef,
    pub flags: SignatureFlags,
}

impl Signature {
    pub fn function(name: Name, sig: &FnSig, has_body: bool) -> Self {
        let mut flags = SignatureFlags::empty();
        flags.set(SignatureFlags::HAS_BODY, has_body);
        flags.set(SignatureFlags::SELF_RECEIVER, sig.has_self_receiver());
        flags.set(SignatureFlags::HAS_WILDCARD, sig.contains_wildcard());
        Self {
            name,
            kind: SignatureKind::Function,
            params: sig.params.iter().cloned().map(ParamSpec::new).collect(),
            return_type: sig.ret.clone(),
            flags,
        }
    }

    pub fn nested_type(name: Name) -> Self {
        Self {
            name,
            kind: SignatureKind::NestedType,
            params: Vec::new(),
            return_type: TypeRef::named(TYPE_TYPE_NAME),
            flags: SignatureFlags::empty(),
        }
    }

    pub fn value(name: Name, ty: TypeRef) -> Self {
        let mut flags = SignatureFlags::empty();
        flags.set(SignatureFlags::HAS_WILDCARD, ty.contains_wildcard());
        Self {
            name,
            kind: SignatureKind::Value,
            params: Vec::new(),
            return_type: ty,
            flags,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: SignatureFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn has_body(&self) -> bool {
        self.flags.contains(SignatureFlags::HAS_BODY)
    }

    /// Parameter types followed by the return type.
    ///
    /// The return type is the trailing slot so positional diagnostics can
    /// treat both the same way.
    pub fn slots(&self) -> impl Iterator<Item = &TypeRef> {
        self.params
            .iter()
            .map(|p| &p.ty)
            .chain(std::iter::once(&self.return_type))
    }

    pub fn slot_count(&self) -> usize {
        self.params.len() + 1
    }

    pub fn fn_sig(&self) -> FnSig {
        FnSig::new(self.params.iter().map(|p| p.ty.clone()), self.return_type.clone())
    }

    #[must_use]
    pub fn substitute_self(&self, from: Role, to: Role) -> Signature {
        Signature {
            name: self.name.clone(),
            kind: self.kind,
            params: self
                .params
                .iter()
                .map(|p| ParamSpec::new(p.ty.substitute_self(from, to)))
                .collect(),
            return_type: self.return_type.substitute_self(from, to),
            flags: self.flags,
        }
    }

    /// The member's full type as text: `fn(*Self) i32`, `type`, or a value type.
    pub fn type_text(&self) -> String {
        match self.kind {
            SignatureKind::Function => self.fn_sig().to_string(),
            SignatureKind::NestedType => TYPE_TYPE_NAME.to_string(),
            SignatureKind::Value => self.return_type.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
