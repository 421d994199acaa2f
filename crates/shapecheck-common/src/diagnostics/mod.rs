//! Diagnostic types and message lookup for conformance checking.
//!
//! Message data lives in `data.rs`. Every code is rendered with the
//! `SC` prefix (`error[SC2001]`) by the reporters.

use serde::Serialize;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl DiagnosticCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Suggestion => "suggestion",
            Self::Message => "message",
        }
    }
}

/// Related information for a diagnostic (e.g. the rendered signature block).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    /// Member the information refers to.
    pub member: String,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A conformance diagnostic with optional related information.
///
/// Unlike a source-level compiler diagnostic there is no file/offset: the
/// subject of a diagnostic is a (shape, candidate) pair and one member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The shape description being checked against.
    pub shape: String,
    /// The candidate type being checked.
    pub candidate: String,
    /// The member the diagnostic is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(
        shape: impl Into<String>,
        candidate: impl Into<String>,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            shape: shape.into(),
            candidate: candidate.into(),
            member: None,
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Attach the member this diagnostic is about.
    #[must_use]
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, member: impl Into<String>, message: impl Into<String>) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            member: member.into(),
            message_text: message.into(),
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    /// The code as it appears in rendered output, e.g. `SC2001`.
    #[must_use]
    pub fn display_code(&self) -> String {
        format!("SC{}", self.code)
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
///
/// Returns the template string with `{0}`, `{1}`, etc. placeholders.
/// Use `format_message()` to fill in the placeholders.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

/// Get the category for a diagnostic code.
#[must_use]
pub fn get_diagnostic_category(code: u32) -> Option<DiagnosticCategory> {
    get_diagnostic_message(code).map(|m| m.category)
}

#[cfg(test)]
#[path = "../../tests/diagnostics_tests.rs"]
mod tests;
