use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use shapecheck_common::Diagnostic;
use shapecheck_common::diagnostic_codes::TYPE_DOES_NOT_CONFORM;
use shapecheck_solver::{
    CheckMode, ConformanceError, ConformanceReport, Member, MemberKind, RenderedSignature, Span,
    TypeDescription, Violation, ViolationKind,
};

use crate::cli::driver::{CheckOutcome, RunSummary, VTableOutcome};

/// Renders run results for a terminal or for tooling.
///
/// With colour disabled, a failed check renders exactly as the engine's
/// canonical diagnostic text.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, summary: &RunSummary) -> String {
        let mut blocks: Vec<String> = summary
            .checks
            .iter()
            .map(|check| self.format_check(check))
            .collect();
        blocks.extend(summary.vtables.iter().map(|v| self.format_vtable(v)));
        blocks.push(self.format_summary(summary));
        blocks.join("\n")
    }

    pub fn format_check(&self, check: &CheckOutcome) -> String {
        match &check.result {
            Ok(()) => {
                let mut line = format!(
                    "{}: '{}' conforms to '{}'",
                    self.ok_label(),
                    check.candidate,
                    check.shape
                );
                if check.mode == CheckMode::Override {
                    line.push_str(" (override)");
                }
                line
            }
            Err(ConformanceError::Nonconforming(report)) => self.format_report(report),
            Err(err) => self.format_error_text(&err.to_string()),
        }
    }

    pub fn format_vtable(&self, outcome: &VTableOutcome) -> String {
        match &outcome.result {
            Ok(slots) => format!(
                "{}: '{}' fills dispatch table '{}' ({slots} slot{})",
                self.ok_label(),
                outcome.implementation,
                outcome.table,
                if *slots == 1 { "" } else { "s" }
            ),
            Err(err) => self.format_error_text(&err.to_string()),
        }
    }

    /// One line per type, then one indented line per member.
    pub fn format_types<'a>(&self, types: impl IntoIterator<Item = &'a TypeDescription>) -> String {
        let mut lines = Vec::new();
        for desc in types {
            lines.push(self.emphasize(desc.name()));
            lines.extend(desc.members().iter().map(|m| format!("  {}", describe_member(m))));
        }
        lines.join("\n")
    }

    fn format_summary(&self, summary: &RunSummary) -> String {
        let total = summary.checks.len() + summary.vtables.len();
        let failures = summary.failures();
        let line = format!("{total} run, {failures} failed");
        if !self.color {
            return line;
        }
        if failures == 0 {
            line.green().to_string()
        } else {
            line.red().to_string()
        }
    }

    fn format_report(&self, report: &ConformanceReport) -> String {
        let mut out = format!(
            "{}: {}",
            self.format_error_code(TYPE_DOES_NOT_CONFORM),
            self.emphasize(&report.headline())
        );
        for violation in &report.violations {
            out.push_str("\n  ");
            out.push_str(&self.format_violation(violation));
        }
        out
    }

    fn format_violation(&self, violation: &Violation) -> String {
        let code = format!("[SC{}]", violation.code());
        let code = if self.color {
            code.yellow().to_string()
        } else {
            code
        };
        let mut out = format!("{code} {}", violation.message());
        if let Some(block) = violation.rendered_signature() {
            for line in self.format_block(block) {
                out.push_str("\n      ");
                out.push_str(&line);
            }
        }
        out
    }

    /// The signature block with erroneous slots highlighted.
    fn format_block(&self, block: &RenderedSignature) -> Vec<String> {
        if !self.color {
            return block.lines().map(str::to_string).collect();
        }
        let mut lines = vec![
            highlight(&block.header, &block.spans),
            block.underline.red().bold().to_string(),
        ];
        lines.extend(block.explanations.iter().map(|line| line.red().to_string()));
        lines
    }

    /// `error[SC..]: message` text from an error's `Display`.
    fn format_error_text(&self, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        match text.split_once(": ") {
            Some((label, rest)) => format!("{}: {}", label.red().bold(), self.emphasize(rest)),
            None => text.red().to_string(),
        }
    }

    fn format_error_code(&self, code: u32) -> String {
        let label = format!("error[SC{code}]");
        if self.color {
            label.red().bold().to_string()
        } else {
            label
        }
    }

    fn emphasize(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn ok_label(&self) -> String {
        if self.color {
            "ok".green().bold().to_string()
        } else {
            "ok".to_string()
        }
    }
}

fn describe_member(member: &Member) -> String {
    let text = match &member.kind {
        MemberKind::Field { ty, .. } => format!("field {}: {ty}", member.name),
        MemberKind::Function { sig, body: None } => format!("fn {}: {sig}", member.name),
        MemberKind::Function { sig, body: Some(_) } => {
            format!("fn {}: {sig} (default)", member.name)
        }
        MemberKind::Const { ty, value } => format!("const {}: {ty} = {value}", member.name),
        MemberKind::NestedType(inner) => format!("type {} = {}", member.name, inner.name()),
    };
    if member.is_public() {
        text
    } else {
        format!("{text} (private)")
    }
}

/// Colour the character ranges covered by `spans`.
fn highlight(header: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = header.chars().collect();
    let mut out = String::new();
    let mut cursor = 0;
    for span in spans {
        let start = span.column.min(chars.len());
        let end = (span.column + span.width).min(chars.len());
        if start < cursor {
            continue;
        }
        out.extend(&chars[cursor..start]);
        let slot: String = chars[start..end].iter().collect();
        out.push_str(&slot.red().bold().to_string());
        cursor = end;
    }
    out.extend(&chars[cursor..]);
    out
}

// =============================================================================
// JSON
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckRecord<'a> {
    shape: &'a str,
    candidate: &'a str,
    mode: CheckMode,
    conformant: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<ViolationKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VTableRecord<'a> {
    table: &'a str,
    implementation: &'a str,
    built: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    slots: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunRecord<'a> {
    checks: Vec<CheckRecord<'a>>,
    vtables: Vec<VTableRecord<'a>>,
    failures: usize,
    exit_code: i32,
}

/// Undecorated, machine-readable results.
pub fn render_json(summary: &RunSummary) -> Result<String> {
    let checks = summary
        .checks
        .iter()
        .map(|check| {
            let (violations, diagnostics) = match &check.result {
                Ok(()) => (Vec::new(), Vec::new()),
                Err(err) => (
                    err.violations().iter().map(Violation::kind).collect(),
                    err.to_diagnostics(&check.candidate),
                ),
            };
            CheckRecord {
                shape: &check.shape,
                candidate: &check.candidate,
                mode: check.mode,
                conformant: check.passed(),
                violations,
                diagnostics,
            }
        })
        .collect();
    let vtables = summary
        .vtables
        .iter()
        .map(|outcome| VTableRecord {
            table: &outcome.table,
            implementation: &outcome.implementation,
            built: outcome.passed(),
            slots: outcome.result.as_ref().ok().copied(),
            code: outcome.result.as_ref().err().map(|err| err.code()),
            message: outcome.result.as_ref().err().map(|err| err.to_string()),
        })
        .collect();
    let record = RunRecord {
        checks,
        vtables,
        failures: summary.failures(),
        exit_code: summary.exit_code(),
    };
    serde_json::to_string_pretty(&record).context("failed to serialise results")
}
