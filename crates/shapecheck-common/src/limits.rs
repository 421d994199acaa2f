//! Centralized limits and thresholds for conformance checking.
//!
//! Shape descriptions and candidates are authored by hand, so none of these
//! are reached by well-formed input. They bound the work done on malformed or
//! adversarial descriptions and keep the call runtime from overflowing the
//! stack.

// =============================================================================
// Signature Limits
// =============================================================================

/// Maximum pointer indirection depth accepted in a type reference.
///
/// `********Self` is the deepest accepted self-marker. The signature parser
/// rejects anything deeper with `ParseError::IndirectionTooDeep`.
pub const MAX_INDIRECTION_DEPTH: u8 = 8;

/// Maximum number of parameters of a single member.
///
/// Extraction reports a larger arity as a configuration error instead of
/// comparing it, since the diagnostic renderer lays every slot out on one line.
pub const MAX_PARAMETERS: usize = 64;

// =============================================================================
// Runtime Limits
// =============================================================================

/// Maximum nesting of by-name calls through a namespace.
///
/// Default implementations call other members by name; two defaults that call
/// each other without a base case would otherwise recurse until the stack
/// overflows. Exceeding the limit yields `CallError::RecursionLimit`.
pub const MAX_CALL_DEPTH: u32 = 256;
