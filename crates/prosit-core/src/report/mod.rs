//! Diagnostic collection and construction.
//!
//! A [`Report`] is an append-only list of diagnostics. Creation methods hand
//! back a [`DiagnosticBuilder`] that the caller chains options onto and then
//! `emit()`s. Nothing here aborts a pipeline: phases run to completion and
//! consumers walk the list (or call [`Report::to_error`] for fail-fast
//! semantics).

mod diagnostic;
mod ice;
pub mod tags;
pub mod wire;

pub use diagnostic::{Annotation, Diagnostic, Edit, Level, SuggestedEdits};

use crate::source::Span;
use crate::{Error, Result};

/// An append-only collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
    /// Phase counter used as a sort key. Bump it between compiler phases so
    /// [`Report::sort`] keeps lexing errors ahead of later ones at the same
    /// offset.
    pub stage: i32,
    /// When positive, every emitted diagnostic captures up to this many
    /// stack frames into its debug footers.
    pub tracing: usize,
}

/// Builder for one diagnostic. Dropping it without `emit()` loses it.
#[must_use = "diagnostic not recorded, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    report: &'a mut Report,
    diag: Diagnostic,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.build(Level::Error, message.into())
    }

    pub fn warning(&mut self, message: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.build(Level::Warning, message.into())
    }

    pub fn remark(&mut self, message: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.build(Level::Remark, message.into())
    }

    pub(crate) fn build(&mut self, level: Level, message: String) -> DiagnosticBuilder<'_> {
        let stage = self.stage;
        DiagnosticBuilder {
            diag: Diagnostic::new(level, message, stage),
            report: self,
        }
    }

    pub(crate) fn push(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.level(), Level::Error | Level::Ice))
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level() == Level::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Sorts diagnostics by primary file path, stage, primary span, and
    /// message. Until this is called, insertion order is preserved.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(Diagnostic::sort_cmp);
    }

    /// Collapses the report into a single aggregate error when it contains
    /// any error-level diagnostic.
    pub fn to_error(&self) -> Result<()> {
        if self.has_errors() {
            Err(Error::Diagnostics {
                errors: self.error_count(),
                warnings: self.warning_count(),
            })
        } else {
            Ok(())
        }
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Replaces the headline message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.diag.message = message.into();
        self
    }

    /// Attaches an annotated span. The first snippet becomes primary.
    pub fn snippet(mut self, span: Span, message: impl Into<String>) -> Self {
        let primary = self.diag.annotations.is_empty();
        self.diag.annotations.push(Annotation {
            span,
            message: message.into(),
            primary,
        });
        self
    }

    /// Names the file for a diagnostic that has no snippet to point at.
    pub fn in_file(mut self, path: impl Into<String>) -> Self {
        self.diag.in_file = Some(path.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.diag.notes.push(note.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.diag.helps.push(help.into());
        self
    }

    pub fn debug(mut self, debug: impl Into<String>) -> Self {
        self.diag.debugs.push(debug.into());
        self
    }

    /// Attaches a stable machine-readable tag.
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.diag.tag = Some(tag);
        self
    }

    /// Attaches a suggested fix made of byte-range replacements.
    pub fn suggest_edits(
        mut self,
        span: Span,
        message: impl Into<String>,
        edits: impl IntoIterator<Item = Edit>,
    ) -> Self {
        self.diag.suggestions.push(SuggestedEdits {
            span,
            message: message.into(),
            edits: edits.into_iter().collect(),
        });
        self
    }

    /// Records the diagnostic on the report.
    pub fn emit(mut self) {
        if self.report.tracing > 0 {
            for line in ice::capture_frames(self.report.tracing) {
                self.diag.debugs.push(line);
            }
        }
        self.report.push(self.diag);
    }
}
