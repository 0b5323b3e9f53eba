//! Declaration views and bodies.

use prosit_core::source::Span;

use super::def::Def;
use super::expr::ExprAny;
use super::options::CompactOptions;
use super::path::Path;
use super::{BodyId, DeclId, DeclKind};
use crate::SourceFile;
use crate::token::Token;

/// Any declaration: a typed handle plus its file.
#[derive(Clone, Copy)]
pub struct DeclAny<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) id: DeclId,
}

/// A declaration dispatched to its concrete variant.
#[derive(Clone, Copy)]
pub enum Decl<'a> {
    Empty(DeclEmpty<'a>),
    Syntax(DeclSyntax<'a>),
    Package(DeclPackage<'a>),
    Import(DeclImport<'a>),
    Def(Def<'a>),
    Body(Body<'a>),
    Range(DeclRange<'a>),
}

impl<'a> DeclAny<'a> {
    pub fn id(self) -> DeclId {
        self.id
    }

    pub fn kind(self) -> DeclKind {
        self.id.kind
    }

    pub fn is_zero(self) -> bool {
        self.id.is_zero()
    }

    pub fn file(self) -> &'a SourceFile {
        self.file
    }

    /// The sticky corrupt flag; set with [`SourceFile::mark_corrupt`].
    pub fn is_corrupt(self) -> bool {
        self.file.is_corrupt(self.id)
    }

    /// Dispatches to the concrete variant; `None` for the zero handle.
    pub fn classify(self) -> Option<Decl<'a>> {
        if self.is_zero() {
            return None;
        }
        let index = self.id.index;
        Some(match self.id.kind {
            DeclKind::Empty => Decl::Empty(DeclEmpty {
                file: self.file,
                index,
            }),
            DeclKind::Syntax => Decl::Syntax(DeclSyntax {
                file: self.file,
                index,
            }),
            DeclKind::Package => Decl::Package(DeclPackage {
                file: self.file,
                index,
            }),
            DeclKind::Import => Decl::Import(DeclImport {
                file: self.file,
                index,
            }),
            DeclKind::Def => Decl::Def(Def {
                file: self.file,
                index,
            }),
            DeclKind::Body => Decl::Body(Body {
                file: self.file,
                index,
            }),
            DeclKind::Range => Decl::Range(DeclRange {
                file: self.file,
                index,
            }),
        })
    }

    pub fn as_def(self) -> Option<Def<'a>> {
        match self.classify()? {
            Decl::Def(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_body(self) -> Option<Body<'a>> {
        match self.classify()? {
            Decl::Body(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_syntax(self) -> Option<DeclSyntax<'a>> {
        match self.classify()? {
            Decl::Syntax(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_package(self) -> Option<DeclPackage<'a>> {
        match self.classify()? {
            Decl::Package(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_import(self) -> Option<DeclImport<'a>> {
        match self.classify()? {
            Decl::Import(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_range(self) -> Option<DeclRange<'a>> {
        match self.classify()? {
            Decl::Range(decl) => Some(decl),
            _ => None,
        }
    }

    /// The declaration's compact options, when its variant carries any.
    pub fn options(self) -> CompactOptions<'a> {
        let index = self.id.index as usize;
        let arena = &self.file.arenas;
        let options = match self.id.kind {
            DeclKind::Syntax => arena.syntaxes[index].options,
            DeclKind::Package => arena.packages[index].options,
            DeclKind::Import => arena.imports[index].options,
            DeclKind::Range => arena.ranges[index].options,
            DeclKind::Def => arena.defs[index].options,
            DeclKind::Empty | DeclKind::Body => 0,
        };
        CompactOptions {
            file: self.file,
            index: options,
        }
    }

    /// The terminating semicolon, when its variant carries one.
    pub fn semicolon(self) -> Token<'a> {
        let index = self.id.index as usize;
        let arena = &self.file.arenas;
        let semi = match self.id.kind {
            DeclKind::Empty => arena.empties[index].semicolon,
            DeclKind::Syntax => arena.syntaxes[index].semicolon,
            DeclKind::Package => arena.packages[index].semicolon,
            DeclKind::Import => arena.imports[index].semicolon,
            DeclKind::Range => arena.ranges[index].semicolon,
            DeclKind::Def => arena.defs[index].semicolon,
            DeclKind::Body => crate::token::TokenId::ZERO,
        };
        self.file.token(semi)
    }

    /// Smallest span covering the declaration's tokens.
    pub fn span(self) -> Span {
        match self.classify() {
            None => Span::zero(),
            Some(Decl::Empty(decl)) => decl.semicolon().span(),
            Some(Decl::Syntax(decl)) => decl.span(),
            Some(Decl::Package(decl)) => decl.span(),
            Some(Decl::Import(decl)) => decl.span(),
            Some(Decl::Def(def)) => def.span(),
            Some(Decl::Body(body)) => body.span(),
            Some(Decl::Range(decl)) => decl.span(),
        }
    }
}

impl PartialEq for DeclAny<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.id == other.id
    }
}

impl Eq for DeclAny<'_> {}

impl std::fmt::Debug for DeclAny<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeclAny({:?} #{})", self.id.kind, self.id.index)
    }
}

/// A stray `;`.
#[derive(Clone, Copy)]
pub struct DeclEmpty<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> DeclEmpty<'a> {
    pub fn id(self) -> DeclId {
        DeclId {
            kind: DeclKind::Empty,
            index: self.index,
        }
    }

    pub fn semicolon(self) -> Token<'a> {
        self.file
            .token(self.file.arenas.empties[self.index as usize].semicolon)
    }
}

/// A `syntax = "..."` or `edition = "..."` declaration.
#[derive(Clone, Copy)]
pub struct DeclSyntax<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> DeclSyntax<'a> {
    pub fn id(self) -> DeclId {
        DeclId {
            kind: DeclKind::Syntax,
            index: self.index,
        }
    }

    /// The `syntax` or `edition` keyword token.
    pub fn keyword(self) -> Token<'a> {
        self.file.token(self.data().keyword)
    }

    /// Whether this is an `edition` declaration.
    pub fn is_edition(self) -> bool {
        self.keyword().keyword() == crate::token::Keyword::Edition
    }

    pub fn equals(self) -> Token<'a> {
        self.file.token(self.data().equals)
    }

    pub fn value(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().value,
        }
    }

    pub fn semicolon(self) -> Token<'a> {
        self.file.token(self.data().semicolon)
    }

    pub fn span(self) -> Span {
        self.keyword()
            .span()
            .join(&self.equals().span())
            .join(&self.value().span())
            .join(&self.semicolon().span())
    }

    fn data(self) -> &'a super::SyntaxData {
        &self.file.arenas.syntaxes[self.index as usize]
    }
}

/// A `package foo.bar;` declaration.
#[derive(Clone, Copy)]
pub struct DeclPackage<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> DeclPackage<'a> {
    pub fn id(self) -> DeclId {
        DeclId {
            kind: DeclKind::Package,
            index: self.index,
        }
    }

    pub fn keyword(self) -> Token<'a> {
        self.file.token(self.data().keyword)
    }

    pub fn path(self) -> Path<'a> {
        Path {
            file: self.file,
            raw: self.data().path,
        }
    }

    pub fn semicolon(self) -> Token<'a> {
        self.file.token(self.data().semicolon)
    }

    pub fn span(self) -> Span {
        self.keyword()
            .span()
            .join(&self.path().span())
            .join(&self.semicolon().span())
    }

    fn data(self) -> &'a super::PackageData {
        &self.file.arenas.packages[self.index as usize]
    }
}

/// An `import "path";` declaration, possibly `public` or `weak`.
#[derive(Clone, Copy)]
pub struct DeclImport<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> DeclImport<'a> {
    pub fn id(self) -> DeclId {
        DeclId {
            kind: DeclKind::Import,
            index: self.index,
        }
    }

    pub fn keyword(self) -> Token<'a> {
        self.file.token(self.data().keyword)
    }

    /// The `public`/`weak` token; zero for a plain import.
    pub fn modifier(self) -> Token<'a> {
        self.file.token(self.data().modifier)
    }

    /// The imported path, usually a string literal.
    pub fn target(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().target,
        }
    }

    pub fn semicolon(self) -> Token<'a> {
        self.file.token(self.data().semicolon)
    }

    pub fn span(self) -> Span {
        self.keyword()
            .span()
            .join(&self.modifier().span())
            .join(&self.target().span())
            .join(&self.semicolon().span())
    }

    fn data(self) -> &'a super::ImportData {
        &self.file.arenas.imports[self.index as usize]
    }
}

/// A `reserved`/`extensions` declaration with its items.
#[derive(Clone, Copy)]
pub struct DeclRange<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> DeclRange<'a> {
    pub fn id(self) -> DeclId {
        DeclId {
            kind: DeclKind::Range,
            index: self.index,
        }
    }

    /// The `reserved` or `extensions` keyword token.
    pub fn keyword(self) -> Token<'a> {
        self.file.token(self.data().keyword)
    }

    pub fn len(self) -> usize {
        self.data().items.len()
    }

    pub fn is_empty(self) -> bool {
        self.data().items.is_empty()
    }

    pub fn get(self, n: usize) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().items[n],
        }
    }

    /// The comma after item `n`; zero when the separator is missing.
    pub fn comma(self, n: usize) -> Token<'a> {
        self.file.token(self.data().commas[n])
    }

    pub fn iter(self) -> impl Iterator<Item = ExprAny<'a>> {
        (0..self.len()).map(move |n| self.get(n))
    }

    pub fn semicolon(self) -> Token<'a> {
        self.file.token(self.data().semicolon)
    }

    pub fn span(self) -> Span {
        let mut span = self.keyword().span().join(&self.semicolon().span());
        for item in self.iter() {
            span = span.join(&item.span());
        }
        span
    }

    fn data(self) -> &'a super::RangeData {
        &self.file.arenas.ranges[self.index as usize]
    }
}

/// A brace-delimited declaration list, or the whole file.
#[derive(Clone, Copy)]
pub struct Body<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> Body<'a> {
    pub fn id(self) -> BodyId {
        BodyId(self.index)
    }

    pub fn is_zero(self) -> bool {
        self.index == 0
    }

    /// The fused brace pair; the zero token for the file-level body.
    pub fn braces(self) -> Token<'a> {
        self.file.token(self.data().braces)
    }

    pub fn len(self) -> usize {
        self.data().kinds.len()
    }

    pub fn is_empty(self) -> bool {
        self.data().kinds.is_empty()
    }

    /// The declaration at position `n`.
    pub fn get(self, n: usize) -> DeclAny<'a> {
        let data = self.data();
        DeclAny {
            file: self.file,
            id: DeclId {
                kind: data.kinds[n],
                index: data.indices[n],
            },
        }
    }

    pub fn iter(self) -> Decls<'a> {
        Decls { body: self, pos: 0 }
    }

    /// The body's definitions, skipping other declaration kinds.
    pub fn defs(self) -> impl Iterator<Item = Def<'a>> {
        self.iter().filter_map(DeclAny::as_def)
    }

    /// The braces' span, or the whole file when braces are absent.
    pub fn span(self) -> Span {
        let braces = self.braces();
        if braces.is_zero() {
            let file = self.file.file();
            file.span(0, file.len())
        } else {
            braces.span().join(&braces.mate().span())
        }
    }

    fn data(self) -> &'a super::BodyData {
        &self.file.arenas.bodies[self.index as usize]
    }
}

impl PartialEq for Body<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.index == other.index
    }
}

impl Eq for Body<'_> {}

/// Iterator over a body's declarations in source order.
pub struct Decls<'a> {
    body: Body<'a>,
    pos: usize,
}

impl<'a> Iterator for Decls<'a> {
    type Item = DeclAny<'a>;

    fn next(&mut self) -> Option<DeclAny<'a>> {
        if self.pos >= self.body.len() {
            return None;
        }
        let decl = self.body.get(self.pos);
        self.pos += 1;
        Some(decl)
    }
}
