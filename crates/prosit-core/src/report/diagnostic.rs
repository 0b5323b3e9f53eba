//! Diagnostic value types.

use std::fmt;

use crate::source::Span;

/// Severity of a diagnostic.
///
/// The discriminants are the wire-form values and the default sort order:
/// internal errors first, remarks last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[repr(u8)]
pub enum Level {
    /// Internal compiler error: a caught panic, not a user mistake.
    Ice = 1,
    Error = 2,
    Warning = 3,
    /// Informational output that is neither an error nor a warning.
    Remark = 4,
}

impl Level {
    pub(crate) fn from_wire(value: u64) -> Option<Level> {
        match value {
            1 => Some(Level::Ice),
            2 => Some(Level::Error),
            3 => Some(Level::Warning),
            4 => Some(Level::Remark),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Ice => write!(f, "internal error"),
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Remark => write!(f, "remark"),
        }
    }
}

/// One highlighted region of source inside a diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub span: Span,
    /// Shown next to the underline; may be empty.
    pub message: String,
    /// The first annotation pushed is primary; it decides window placement
    /// and takes the diagnostic's level color.
    pub primary: bool,
}

/// A single replacement within a suggested fix: replace `[start, end)` with
/// `replace`. Offsets are absolute byte offsets into the annotated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replace: String,
}

impl Edit {
    pub fn new(start: usize, end: usize, replace: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replace: replace.into(),
        }
    }

    /// An edit that inserts `text` at `at` without removing anything.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }
}

/// A suggested fix: a message plus the edits that implement it, anchored to
/// the span they rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedEdits {
    pub span: Span,
    pub message: String,
    pub edits: Vec<Edit>,
}

/// A single diagnostic: severity, message, annotated spans, and footers.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub(crate) level: Level,
    pub(crate) tag: Option<&'static str>,
    pub(crate) message: String,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) notes: Vec<String>,
    pub(crate) helps: Vec<String>,
    pub(crate) debugs: Vec<String>,
    pub(crate) suggestions: Vec<SuggestedEdits>,
    /// Path shown when the diagnostic has no annotations.
    pub(crate) in_file: Option<String>,
    /// Phase counter copied from the report at creation; a sort key.
    pub(crate) stage: i32,
}

impl Diagnostic {
    pub(crate) fn new(level: Level, message: String, stage: i32) -> Self {
        Self {
            level,
            tag: None,
            message,
            annotations: Vec::new(),
            notes: Vec::new(),
            helps: Vec::new(),
            debugs: Vec::new(),
            suggestions: Vec::new(),
            in_file: None,
            stage,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Stable machine-readable tag, when one was attached.
    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The primary annotation, when any annotation exists.
    pub fn primary(&self) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.primary)
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn helps(&self) -> &[String] {
        &self.helps
    }

    pub fn debugs(&self) -> &[String] {
        &self.debugs
    }

    pub fn suggestions(&self) -> &[SuggestedEdits] {
        &self.suggestions
    }

    pub fn in_file(&self) -> Option<&str> {
        self.in_file.as_deref()
    }

    pub fn note(&mut self, note: impl Into<String>) -> &mut Self {
        self.notes.push(note.into());
        self
    }

    pub fn help(&mut self, help: impl Into<String>) -> &mut Self {
        self.helps.push(help.into());
        self
    }

    pub fn debug(&mut self, debug: impl Into<String>) -> &mut Self {
        self.debugs.push(debug.into());
        self
    }

    /// Sort comparison: primary file path, then stage, then primary span
    /// offsets, then message, with level and tag as final tiebreakers.
    pub(crate) fn sort_cmp(&self, other: &Diagnostic) -> std::cmp::Ordering {
        fn key(d: &Diagnostic) -> (&str, i32, usize, usize, &str, Level, &str) {
            let (path, start, end) = match d.primary() {
                Some(a) if !a.span.is_zero() => {
                    let file = a.span.file().expect("non-zero span has a file");
                    (file.path(), a.span.start(), a.span.end())
                }
                _ => (d.in_file.as_deref().unwrap_or(""), 0, 0),
            };
            (
                path,
                d.stage,
                start,
                end,
                d.message.as_str(),
                d.level,
                d.tag.unwrap_or(""),
            )
        }
        key(self).cmp(&key(other))
    }
}
