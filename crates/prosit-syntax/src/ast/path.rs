//! Path views.

use prosit_core::source::Span;

use super::{PathId, PathShape, RawPath};
use crate::SourceFile;
use crate::token::{Cursor, Token, TokenKind};

/// A `.`- or `/`-separated name, backed by a token range rather than an
/// arena entry. Components are simple identifiers or parenthesized extension
/// names.
#[derive(Clone, Copy)]
pub struct Path<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) raw: RawPath,
}

impl<'a> Path<'a> {
    pub fn id(self) -> PathId {
        PathId(self.raw)
    }

    pub fn is_zero(self) -> bool {
        self.raw.is_nil()
    }

    /// Smallest span covering the path's tokens; zero for synthetic paths.
    pub fn span(self) -> Span {
        match self.raw.shape() {
            PathShape::Natural { start, end } => self
                .file
                .token(start)
                .span()
                .join(&self.file.token(end).span()),
            _ => Span::zero(),
        }
    }

    /// True when the path begins with a separator, as in `.foo.bar`.
    pub fn is_absolute(self) -> bool {
        self.tokens()
            .next()
            .is_some_and(|t| t.keyword().is_path_separator())
    }

    /// The single identifier of a one-component relative path, if that is
    /// what this path is.
    pub fn as_ident(self) -> Option<Token<'a>> {
        let mut components = self.components();
        let first = components.next()?;
        if components.next().is_some() || first.separator().is_some() {
            return None;
        }
        let name = first.name()?;
        (name.kind() == TokenKind::Ident).then_some(name)
    }

    /// The path's components in order.
    pub fn components(self) -> Components<'a> {
        Components {
            tokens: self.tokens(),
            pending: None,
        }
    }

    /// The path's text with whitespace, comments, and redundant separators
    /// removed.
    pub fn canonicalized(self) -> String {
        let mut out = String::new();
        canonicalize_into(self.tokens(), &mut out);
        out
    }

    /// Non-skippable tokens of the path, with fused pairs as single items.
    pub(crate) fn tokens(self) -> PathTokens<'a> {
        let stream = self.file.stream();
        let inner = match self.raw.shape() {
            PathShape::Nil => PathTokensInner::Done,
            PathShape::Natural { start, end } => PathTokensInner::Cursor(Cursor::over_naturals(
                stream,
                start.nat_index(),
                end.nat_index() + 1,
            )),
            PathShape::Synthetic { token, lo, hi } => {
                let view = stream.token(token);
                if view.is_leaf() {
                    PathTokensInner::Single(Some(view))
                } else {
                    let children = stream.synth_children(if view.is_open() {
                        token.synth_index()
                    } else {
                        view.mate().id().synth_index()
                    });
                    let hi = hi.min(children.len());
                    let lo = lo.min(hi);
                    PathTokensInner::Cursor(Cursor::over_children(stream, &children[lo..hi]))
                }
            }
        };
        PathTokens { inner }
    }
}

impl PartialEq for Path<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.raw == other.raw
    }
}

impl Eq for Path<'_> {}

impl std::fmt::Debug for Path<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Path({})", self.canonicalized())
    }
}

pub(crate) enum PathTokensInner<'a> {
    Done,
    Single(Option<Token<'a>>),
    Cursor(Cursor<'a>),
}

pub(crate) struct PathTokens<'a> {
    inner: PathTokensInner<'a>,
}

impl<'a> Iterator for PathTokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        match &mut self.inner {
            PathTokensInner::Done => None,
            PathTokensInner::Single(token) => token.take(),
            PathTokensInner::Cursor(cursor) => cursor.next(),
        }
    }
}

/// One path component: an optional leading separator and a name, either of
/// which may be missing in broken source.
#[derive(Clone, Copy)]
pub struct Component<'a> {
    separator: Option<Token<'a>>,
    name: Option<Token<'a>>,
}

impl<'a> Component<'a> {
    /// The `.` or `/` before the name; absent on a leading component of a
    /// relative path.
    pub fn separator(&self) -> Option<Token<'a>> {
        self.separator
    }

    /// The component's name: an identifier, or a fused paren pair for an
    /// extension name.
    pub fn name(&self) -> Option<Token<'a>> {
        self.name
    }

    /// Whether the name is a parenthesized extension component.
    pub fn is_extension(&self) -> bool {
        self.name
            .is_some_and(|t| t.kind() == TokenKind::Punct && !t.is_leaf())
    }

    /// Cursor over an extension component's nested path tokens.
    pub fn extension(&self) -> Option<Cursor<'a>> {
        self.is_extension().then(|| self.name.unwrap().children())?
    }
}

/// Iterator over a path's components.
pub struct Components<'a> {
    tokens: PathTokens<'a>,
    pending: Option<Token<'a>>,
}

impl<'a> Iterator for Components<'a> {
    type Item = Component<'a>;

    fn next(&mut self) -> Option<Component<'a>> {
        let first = self.pending.take().or_else(|| self.tokens.next())?;
        if !first.keyword().is_path_separator() {
            return Some(Component {
                separator: None,
                name: Some(first),
            });
        }
        let name = self.tokens.next();
        if let Some(name) = name
            && name.keyword().is_path_separator()
        {
            // two separators in a row: this component has no name, and the
            // second separator starts the next one
            self.pending = Some(name);
            return Some(Component {
                separator: Some(first),
                name: None,
            });
        }
        Some(Component {
            separator: Some(first),
            name,
        })
    }
}

fn canonicalize_into<'a>(tokens: impl Iterator<Item = Token<'a>>, out: &mut String) {
    for token in tokens {
        if token.keyword().is_path_separator() {
            if !out.ends_with(['.', '/']) {
                out.push_str(token.text());
            }
        } else if token.kind() == TokenKind::Punct && !token.is_leaf() {
            out.push('(');
            if let Some(children) = token.children() {
                canonicalize_into(children.rest(), out);
            }
            out.push(')');
        } else {
            out.push_str(token.text());
        }
    }
}
