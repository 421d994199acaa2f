//! Common types and utilities for the shapecheck conformance checker.
//!
//! This crate provides foundational types used across all shapecheck crates:
//! - Diagnostic records, categories, codes and message templates
//! - Centralized limits (indirection depth, arity, call depth)

// Diagnostic codes, message templates and the serialisable record
pub mod diagnostics;
pub use diagnostics::{
    DIAGNOSTIC_MESSAGES, Diagnostic, DiagnosticCategory, DiagnosticMessage,
    DiagnosticRelatedInformation, diagnostic_codes, diagnostic_messages, format_message,
    get_diagnostic_category, get_diagnostic_message, get_message_template,
};

// Centralized limits and thresholds
pub mod limits;
