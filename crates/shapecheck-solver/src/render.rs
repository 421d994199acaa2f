//! Diagnostic renderer.
//!
//! Lays out one function signature with its erroneous slots marked:
//!
//! ```text
//! fn magic(**Self, i32) f32
//!          ^^^^^^     ^^^
//!          |          expected type 'i64', found 'f32'
//!          expected type '*Self', found '**Self'
//! ```
//!
//! The header is the candidate's declaration. Explanation rows are emitted
//! right-most slot first; every earlier erroneous slot keeps a `|` guide in
//! its column. Columns and widths are counted in characters, not bytes.
//! No styling happens here; `spans` lets a reporter decorate the header and
//! underline without reparsing them.

use crate::diagnostics::PositionMismatch;
use crate::types::{Signature, TypeRef};
use shapecheck_common::{diagnostic_messages, format_message};
use std::fmt;

/// Internal consistency failure of the renderer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error(
        "cannot render '{name}': {found} slot(s) supplied for a signature with {expected} (parameters + return)"
    )]
    SlotCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Location of one erroneous slot in the header line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// Slot index; the return type is the last slot.
    pub slot: usize,
    /// Character column in the header.
    pub column: usize,
    /// Character width of the slot's type text.
    pub width: usize,
}

/// A laid-out signature block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedSignature {
    pub header: String,
    pub underline: String,
    /// Right-most erroneous slot first.
    pub explanations: Vec<String>,
    /// Left to right.
    pub spans: Vec<Span>,
}

impl RenderedSignature {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        [self.header.as_str(), self.underline.as_str()]
            .into_iter()
            .chain(self.explanations.iter().map(String::as_str))
    }
}

impl fmt::Display for RenderedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

/// Render `signature` as `name` with the erroneous slots in `slots` marked.
///
/// `slots` holds one entry per parameter plus one for the return type.
/// Returns `Ok(None)` when no slot is erroneous.
pub fn render_signature(
    name: &str,
    signature: &Signature,
    slots: &[Option<PositionMismatch>],
) -> Result<Option<RenderedSignature>, RenderError> {
    if slots.len() != signature.slot_count() {
        return Err(RenderError::SlotCountMismatch {
            name: name.to_string(),
            expected: signature.slot_count(),
            found: slots.len(),
        });
    }
    if slots.iter().all(Option::is_none) {
        return Ok(None);
    }

    let (header, columns) = layout_header(name, signature);

    let mut spans = Vec::new();
    let mut errors = Vec::new();
    for (slot, (mismatch, (column, width))) in slots.iter().zip(columns).enumerate() {
        if let Some(mismatch) = mismatch {
            spans.push(Span {
                slot,
                column,
                width,
            });
            errors.push(mismatch);
        }
    }

    let mut underline = String::new();
    for span in &spans {
        pad_to(&mut underline, span.column);
        underline.extend(std::iter::repeat_n('^', span.width));
    }

    let mut explanations = Vec::with_capacity(spans.len());
    for (row, span) in spans.iter().enumerate().rev() {
        let mut line = String::new();
        for guide in &spans[..row] {
            pad_to(&mut line, guide.column);
            line.push('|');
        }
        pad_to(&mut line, span.column);
        line.push_str(&explain(&errors[row].expected, &errors[row].found));
        explanations.push(line);
    }

    Ok(Some(RenderedSignature {
        header,
        underline,
        explanations,
        spans,
    }))
}

fn explain(expected: &TypeRef, found: &TypeRef) -> String {
    format_message(
        diagnostic_messages::EXPECTED_FOUND,
        &[&expected.to_string(), &found.to_string()],
    )
}

/// `fn name(a, b) r` plus the (column, width) of every slot.
fn layout_header(name: &str, signature: &Signature) -> (String, Vec<(usize, usize)>) {
    let mut header = format!("fn {name}(");
    let mut width = header.chars().count();
    let mut columns = Vec::with_capacity(signature.slot_count());
    let last_param = signature.arity();
    for (i, ty) in signature.slots().enumerate() {
        if i == last_param {
            header.push_str(") ");
            width += 2;
        } else if i > 0 {
            header.push_str(", ");
            width += 2;
        }
        let text = ty.to_string();
        let text_width = text.chars().count();
        columns.push((width, text_width));
        header.push_str(&text);
        width += text_width;
    }
    (header, columns)
}

/// Pad `line` with spaces up to character column `column`.
fn pad_to(line: &mut String, column: usize) {
    let current = line.chars().count();
    if current < column {
        line.extend(std::iter::repeat_n(' ', column - current));
    }
}

#[cfg(test)]
#[path = "../tests/render_tests.rs"]
mod tests;
