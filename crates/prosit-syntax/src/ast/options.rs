//! Compact options views.

use prosit_core::source::Span;

use super::expr::ExprAny;
use super::path::Path;
use super::OptionsId;
use crate::SourceFile;
use crate::token::Token;

/// A bracketed, comma-separated list of `path [=] expression` entries.
#[derive(Clone, Copy)]
pub struct CompactOptions<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> CompactOptions<'a> {
    pub fn id(self) -> OptionsId {
        OptionsId(self.index)
    }

    pub fn is_zero(self) -> bool {
        self.index == 0
    }

    /// The fused bracket pair.
    pub fn brackets(self) -> Token<'a> {
        self.file.token(self.data().brackets)
    }

    pub fn len(self) -> usize {
        self.data().entries.len()
    }

    pub fn is_empty(self) -> bool {
        self.data().entries.is_empty()
    }

    pub fn get(self, n: usize) -> OptionEntry<'a> {
        OptionEntry {
            file: self.file,
            options: self.index,
            entry: n,
        }
    }

    /// The comma after entry `n`; zero when the separator is missing.
    pub fn comma(self, n: usize) -> Token<'a> {
        self.file.token(self.data().commas[n])
    }

    pub fn iter(self) -> impl Iterator<Item = OptionEntry<'a>> {
        (0..self.len()).map(move |n| self.get(n))
    }

    pub fn span(self) -> Span {
        let brackets = self.brackets();
        brackets.span().join(&brackets.mate().span())
    }

    fn data(self) -> &'a super::OptionsData {
        &self.file.arenas.options[self.index as usize]
    }
}

impl PartialEq for CompactOptions<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.index == other.index
    }
}

impl Eq for CompactOptions<'_> {}

/// One `path [=] expression` entry of a compact options list.
#[derive(Clone, Copy)]
pub struct OptionEntry<'a> {
    file: &'a SourceFile,
    options: u32,
    entry: usize,
}

impl<'a> OptionEntry<'a> {
    pub fn path(self) -> Path<'a> {
        Path {
            file: self.file,
            raw: self.data().path,
        }
    }

    /// The `=` token; zero in the no-equals aggregate form.
    pub fn equals(self) -> Token<'a> {
        self.file.token(self.data().equals)
    }

    pub fn value(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().value,
        }
    }

    pub fn span(self) -> Span {
        self.path()
            .span()
            .join(&self.equals().span())
            .join(&self.value().span())
    }

    fn data(self) -> &'a super::OptionEntryData {
        &self.file.arenas.options[self.options as usize].entries[self.entry]
    }
}
