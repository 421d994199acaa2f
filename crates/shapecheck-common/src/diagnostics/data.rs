//! Diagnostic message table.
//!
//! 1xxx: configuration errors (the shape or dispatch table is malformed).
//! 2xxx: conformance violations (the candidate does not implement the shape).
//! 3xxx: dispatch table construction.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const NON_BEHAVIORAL_SHAPE: u32 = 1001;
    pub const NON_FUNCTION_SLOT: u32 = 1002;
    pub const DUPLICATE_MEMBER: u32 = 1003;
    pub const TOO_MANY_PARAMETERS: u32 = 1004;

    pub const TYPE_DOES_NOT_CONFORM: u32 = 2000;
    pub const MISSING_MEMBER: u32 = 2001;
    pub const NOT_A_FUNCTION: u32 = 2002;
    pub const NOT_A_NESTED_TYPE: u32 = 2003;
    pub const ARITY_MISMATCH: u32 = 2004;
    pub const PARAMETER_TYPE_MISMATCH: u32 = 2005;
    pub const RETURN_TYPE_MISMATCH: u32 = 2006;
    pub const DEFAULT_REDEFINED: u32 = 2007;

    pub const MISSING_IMPLEMENTATION: u32 = 3001;
    pub const INCOMPATIBLE_SLOT: u32 = 3002;
}

pub mod diagnostic_messages {
    pub const NON_BEHAVIORAL_SHAPE: &str =
        "shape '{0}' must only declare behavior, but it stores {1} field(s): {2}";
    pub const NON_FUNCTION_SLOT: &str =
        "dispatch table '{0}' field '{1}' must be a function pointer, found '{2}'";
    pub const DUPLICATE_MEMBER: &str = "type '{0}' declares member '{1}' more than once";
    pub const TOO_MANY_PARAMETERS: &str =
        "member '{0}' of type '{1}' declares {2} parameters, the limit is {3}";

    pub const TYPE_DOES_NOT_CONFORM: &str = "type '{0}' does not conform to '{1}'";
    pub const MISSING_MEMBER: &str = "missing member '{0}' of type '{1}'";
    pub const NOT_A_FUNCTION: &str = "member '{0}' must be a function, found {1}";
    pub const NOT_A_NESTED_TYPE: &str = "member '{0}' must be a nested type, found {1}";
    pub const ARITY_MISMATCH: &str =
        "member '{0}': expected {1} parameter(s), found {2}";
    pub const PARAMETER_TYPE_MISMATCH: &str = "member '{0}' has mismatched parameter types";
    pub const RETURN_TYPE_MISMATCH: &str = "member '{0}' has a mismatched return type";
    pub const DEFAULT_REDEFINED: &str =
        "member '{0}' redefines a default implementation supplied by '{1}'";
    pub const EXPECTED_FOUND: &str = "expected type '{0}', found '{1}'";

    pub const MISSING_IMPLEMENTATION: &str =
        "implementation '{0}' has no function for dispatch slot '{1}'";
    pub const INCOMPATIBLE_SLOT: &str =
        "dispatch slot '{0}' expects '{1}', but the implementation has '{2}'";
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::NON_BEHAVIORAL_SHAPE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NON_BEHAVIORAL_SHAPE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NON_FUNCTION_SLOT,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NON_FUNCTION_SLOT,
    },
    DiagnosticMessage {
        code: diagnostic_codes::DUPLICATE_MEMBER,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::DUPLICATE_MEMBER,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TOO_MANY_PARAMETERS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TOO_MANY_PARAMETERS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_DOES_NOT_CONFORM,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPE_DOES_NOT_CONFORM,
    },
    DiagnosticMessage {
        code: diagnostic_codes::MISSING_MEMBER,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::MISSING_MEMBER,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NOT_A_FUNCTION,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NOT_A_FUNCTION,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NOT_A_NESTED_TYPE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NOT_A_NESTED_TYPE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::ARITY_MISMATCH,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::ARITY_MISMATCH,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PARAMETER_TYPE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PARAMETER_TYPE_MISMATCH,
    },
    DiagnosticMessage {
        code: diagnostic_codes::RETURN_TYPE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::RETURN_TYPE_MISMATCH,
    },
    DiagnosticMessage {
        code: diagnostic_codes::DEFAULT_REDEFINED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::DEFAULT_REDEFINED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::MISSING_IMPLEMENTATION,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::MISSING_IMPLEMENTATION,
    },
    DiagnosticMessage {
        code: diagnostic_codes::INCOMPATIBLE_SLOT,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::INCOMPATIBLE_SLOT,
    },
];
