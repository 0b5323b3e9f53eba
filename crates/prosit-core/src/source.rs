//! Source files, byte spans, and locations.
//!
//! A [`File`] is an immutable `(path, text)` pair; the path exists for
//! diagnostics only. Files are cheaply clonable handles with identity
//! semantics: two handles are equal when they point at the same file object,
//! never by content.
//!
//! A [`Span`] is a half-open byte range into one file. The zero span carries
//! no file and joins as an identity element.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::line_index::LineIndex;
use crate::width;

/// An immutable source file.
#[derive(Clone)]
pub struct File {
    inner: Arc<FileInner>,
}

struct FileInner {
    path: String,
    text: String,
    index: OnceLock<LineIndex>,
}

impl File {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(FileInner {
                path: path.into(),
                text: text.into(),
                index: OnceLock::new(),
            }),
        }
    }

    /// Path for diagnostics. Never touched as a filesystem path.
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// The full source text.
    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub fn len(&self) -> usize {
        self.inner.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.text.is_empty()
    }

    /// Builds a span over `[start, end)`.
    ///
    /// # Panics
    /// Panics unless `start <= end <= len()`.
    pub fn span(&self, start: usize, end: usize) -> Span {
        assert!(
            start <= end && end <= self.len(),
            "span {start}..{end} out of bounds for {:?} (len {})",
            self.path(),
            self.len()
        );
        Span {
            file: Some(self.clone()),
            start: start as u32,
            end: end as u32,
        }
    }

    /// The empty span at end-of-file.
    pub fn eof_span(&self) -> Span {
        self.span(self.len(), self.len())
    }

    /// Line, column, and UTF-16 column of a byte offset, using the default
    /// tab stop.
    ///
    /// # Panics
    /// Panics if `offset > len()` or `offset` is not a character boundary.
    pub fn location(&self, offset: usize) -> Location {
        self.location_with(offset, width::DEFAULT_TAB_STOP)
    }

    /// Like [`File::location`] with an explicit tab stop.
    pub fn location_with(&self, offset: usize, tab_stop: usize) -> Location {
        assert!(
            offset <= self.len(),
            "offset {offset} out of bounds for {:?} (len {})",
            self.path(),
            self.len()
        );
        let index = self.line_index();
        let line = index.line_of(offset);
        let line_start = index.line_start(line);
        let prefix = &self.text()[line_start..offset];

        let mut column = 0;
        let mut utf16 = 0;
        for c in prefix.chars() {
            column += width::char_width(c, column, tab_stop);
            utf16 += c.len_utf16();
        }

        Location {
            offset,
            line: line + 1,
            column: column + 1,
            utf16: utf16 + 1,
        }
    }

    /// Absolute UTF-16 code-unit offset of a byte offset.
    pub fn utf16_offset(&self, offset: usize) -> usize {
        assert!(offset <= self.len(), "offset {offset} out of bounds");
        let index = self.line_index();
        let line = index.line_of(offset);
        let line_start = index.line_start(line);
        let units: usize = self.text()[line_start..offset]
            .chars()
            .map(char::len_utf16)
            .sum();
        index.utf16_line_start(line) + units
    }

    /// Number of lines in the file.
    pub fn line_count(&self) -> usize {
        self.line_index().line_count()
    }

    /// The text of 1-indexed `line`, without its trailing newline.
    pub fn line_text(&self, line: usize) -> &str {
        let index = self.line_index();
        let start = index.line_start(line - 1);
        let rest = &self.text()[start..];
        match rest.find('\n') {
            Some(n) => &rest[..n],
            None => rest,
        }
    }

    /// Identity comparison; content is never compared.
    pub fn same_file(&self, other: &File) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn line_index(&self) -> &LineIndex {
        // OnceLock guarantees the scan happens exactly once even when two
        // threads ask for the first location concurrently.
        self.inner
            .index
            .get_or_init(|| LineIndex::build(self.text()))
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.same_file(other)
    }
}

impl Eq for File {}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path())
            .field("len", &self.len())
            .finish()
    }
}

/// A half-open byte range `[start, end)` into one file.
///
/// The zero span (`Span::zero()`) belongs to no file; it is what absent
/// tokens and synthetic tokens report.
#[derive(Clone, Default)]
pub struct Span {
    file: Option<File>,
    start: u32,
    end: u32,
}

impl Span {
    /// The absent span.
    pub fn zero() -> Span {
        Span::default()
    }

    pub fn is_zero(&self) -> bool {
        self.file.is_none()
    }

    pub fn file(&self) -> Option<&File> {
        self.file.as_ref()
    }

    pub fn start(&self) -> usize {
        self.start as usize
    }

    pub fn end(&self) -> usize {
        self.end as usize
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The spanned text; empty for the zero span.
    pub fn text(&self) -> &str {
        match &self.file {
            Some(file) => &file.text()[self.start()..self.end()],
            None => "",
        }
    }

    /// Location of the span's first byte.
    pub fn start_loc(&self) -> Option<Location> {
        self.file.as_ref().map(|f| f.location(self.start()))
    }

    /// Location just past the span's last byte.
    pub fn end_loc(&self) -> Option<Location> {
        self.file.as_ref().map(|f| f.location(self.end()))
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// The zero span is an identity element.
    ///
    /// # Panics
    /// Panics when both spans are non-zero and belong to different files.
    pub fn join(&self, other: &Span) -> Span {
        let (a, b) = match (&self.file, &other.file) {
            (None, _) => return other.clone(),
            (_, None) => return self.clone(),
            (Some(a), Some(b)) => (a, b),
        };
        assert!(
            a.same_file(b),
            "cannot join spans from different files ({:?} and {:?})",
            a.path(),
            b.path()
        );
        Span {
            file: Some(a.clone()),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        let same_file = match (&self.file, &other.file) {
            (None, None) => return true,
            (Some(a), Some(b)) => a.same_file(b),
            _ => false,
        };
        same_file && self.start == other.start && self.end == other.end
    }
}

impl Eq for Span {}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}[{}..{}]", file.path(), self.start, self.end),
            None => write!(f, "Span(zero)"),
        }
    }
}

/// A resolved position within a file.
///
/// `line` and `column` are 1-indexed; `column` is a display column (tabs
/// expanded, East Asian width applied) and `utf16` is the 1-indexed UTF-16
/// code-unit column for LSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub utf16: usize,
}
