//! Expression views and conversions.

use prosit_core::source::Span;

use super::path::Path;
use super::{
    EXPR_ARRAY, EXPR_DICT, EXPR_ERROR, EXPR_FIELD, EXPR_PREFIXED, EXPR_RANGE, ExprId, RawPath,
    RawSlot, SlotShape,
};
use crate::SourceFile;
use crate::token::{Keyword, Token, TokenKind};

/// Expression discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ExprKind {
    /// The absent expression.
    Nil,
    /// An unparseable run of tokens.
    Error,
    /// A string or number token.
    Literal,
    Path,
    /// A sign-prefixed expression.
    Prefixed,
    /// `lo to hi`.
    Range,
    /// A bracketed list.
    Array,
    /// A braced message literal.
    Dict,
    /// A `key: value` entry inside a message literal.
    Field,
}

/// Any expression: a packed handle plus its file.
#[derive(Clone, Copy)]
pub struct ExprAny<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) raw: RawSlot,
}

/// An expression dispatched to its concrete variant.
#[derive(Clone, Copy)]
pub enum Expr<'a> {
    Error(ExprError<'a>),
    Literal(Token<'a>),
    Path(Path<'a>),
    Prefixed(ExprPrefixed<'a>),
    Range(ExprRange<'a>),
    Array(ExprArray<'a>),
    Dict(ExprDict<'a>),
    Field(ExprField<'a>),
}

impl<'a> ExprAny<'a> {
    pub fn id(self) -> ExprId {
        ExprId(self.raw)
    }

    pub fn is_zero(self) -> bool {
        self.raw.is_nil()
    }

    pub fn kind(self) -> ExprKind {
        match self.raw.shape() {
            SlotShape::Nil => ExprKind::Nil,
            SlotShape::Path(path) => {
                if let Some(token) = single_token(self.file, path)
                    && matches!(token.kind(), TokenKind::String | TokenKind::Number)
                {
                    ExprKind::Literal
                } else {
                    ExprKind::Path
                }
            }
            SlotShape::Variant { tag, .. } => match tag {
                EXPR_ERROR => ExprKind::Error,
                EXPR_PREFIXED => ExprKind::Prefixed,
                EXPR_RANGE => ExprKind::Range,
                EXPR_ARRAY => ExprKind::Array,
                EXPR_DICT => ExprKind::Dict,
                EXPR_FIELD => ExprKind::Field,
                _ => ExprKind::Nil,
            },
        }
    }

    /// Dispatches to the concrete variant; `None` for the absent expression.
    pub fn classify(self) -> Option<Expr<'a>> {
        let view = match self.raw.shape() {
            SlotShape::Nil => return None,
            SlotShape::Path(path) => {
                return Some(match self.kind() {
                    ExprKind::Literal => {
                        Expr::Literal(single_token(self.file, path).expect("literal has a token"))
                    }
                    _ => Expr::Path(Path {
                        file: self.file,
                        raw: path,
                    }),
                });
            }
            SlotShape::Variant { tag, index } => (tag, index),
        };
        let (tag, index) = view;
        Some(match tag {
            EXPR_ERROR => Expr::Error(ExprError {
                file: self.file,
                index,
            }),
            EXPR_PREFIXED => Expr::Prefixed(ExprPrefixed {
                file: self.file,
                index,
            }),
            EXPR_RANGE => Expr::Range(ExprRange {
                file: self.file,
                index,
            }),
            EXPR_ARRAY => Expr::Array(ExprArray {
                file: self.file,
                index,
            }),
            EXPR_DICT => Expr::Dict(ExprDict {
                file: self.file,
                index,
            }),
            EXPR_FIELD => Expr::Field(ExprField {
                file: self.file,
                index,
            }),
            _ => return None,
        })
    }

    pub fn as_literal(self) -> Option<Token<'a>> {
        match self.classify()? {
            Expr::Literal(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_path(self) -> Option<Path<'a>> {
        match self.classify()? {
            Expr::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_array(self) -> Option<ExprArray<'a>> {
        match self.classify()? {
            Expr::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_message(self) -> Option<ExprDict<'a>> {
        match self.classify()? {
            Expr::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// `true`/`false` keyword literals.
    pub fn as_bool(self) -> Option<bool> {
        match self.as_path()?.as_ident()?.keyword() {
            Keyword::True => Some(true),
            Keyword::False => Some(false),
            _ => None,
        }
    }

    pub fn as_uint64(self) -> Option<u64> {
        match self.classify()? {
            Expr::Literal(token) => token.int(),
            _ => None,
        }
    }

    pub fn as_uint32(self) -> Option<u32> {
        u32::try_from(self.as_uint64()?).ok()
    }

    /// Signed conversion with two's-complement handling of `-(1 << 63)`.
    pub fn as_int64(self) -> Option<i64> {
        match self.classify()? {
            Expr::Literal(token) => {
                let value = token.int()?;
                i64::try_from(value).ok()
            }
            Expr::Prefixed(prefixed) => {
                if prefixed.prefix().keyword() != Keyword::Minus {
                    return None;
                }
                let value = prefixed.inner().as_uint64()?;
                if value > 1u64 << 63 {
                    return None;
                }
                Some((value as i128).wrapping_neg() as i64)
            }
            _ => None,
        }
    }

    pub fn as_int32(self) -> Option<i32> {
        i32::try_from(self.as_int64()?).ok()
    }

    pub fn as_float64(self) -> Option<f64> {
        match self.classify()? {
            Expr::Literal(token) => token.float(),
            Expr::Path(path) => match path.as_ident()?.keyword() {
                Keyword::Inf => Some(f64::INFINITY),
                Keyword::Nan => Some(f64::NAN),
                _ => None,
            },
            Expr::Prefixed(prefixed) => {
                if prefixed.prefix().keyword() != Keyword::Minus {
                    return None;
                }
                Some(-prefixed.inner().as_float64()?)
            }
            _ => None,
        }
    }

    pub fn as_float32(self) -> Option<f32> {
        Some(self.as_float64()? as f32)
    }

    /// Decoded bytes of a string literal.
    pub fn as_string(self) -> Option<&'a [u8]> {
        self.as_literal()?.decoded_string()
    }

    /// Smallest span covering the expression's tokens.
    pub fn span(self) -> Span {
        match self.classify() {
            None => Span::zero(),
            Some(Expr::Literal(token)) => token.span(),
            Some(Expr::Path(path)) => path.span(),
            Some(Expr::Error(error)) => error.span(),
            Some(Expr::Prefixed(prefixed)) => prefixed
                .prefix()
                .span()
                .join(&prefixed.inner().span()),
            Some(Expr::Range(range)) => range
                .lo()
                .span()
                .join(&range.to_token().span())
                .join(&range.hi().span()),
            Some(Expr::Array(array)) => array.brackets().span(),
            Some(Expr::Dict(dict)) => dict.braces().span(),
            Some(Expr::Field(field)) => field
                .key()
                .span()
                .join(&field.colon().span())
                .join(&field.value().span()),
        }
    }
}

impl PartialEq for ExprAny<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.raw == other.raw
    }
}

impl Eq for ExprAny<'_> {}

impl std::fmt::Debug for ExprAny<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExprAny({:?})", self.kind())
    }
}

fn single_token<'a>(file: &'a SourceFile, path: RawPath) -> Option<Token<'a>> {
    match path.shape() {
        super::PathShape::Natural { start, end } if start == end => Some(file.token(start)),
        super::PathShape::Synthetic { token, lo, hi } if lo == hi => Some(file.token(token)),
        _ => None,
    }
}

/// An unparseable expression: the tokens the parser skipped.
#[derive(Clone, Copy)]
pub struct ExprError<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> ExprError<'a> {
    pub fn first(self) -> Token<'a> {
        self.file.token(self.data().first)
    }

    pub fn last(self) -> Token<'a> {
        self.file.token(self.data().last)
    }

    pub fn span(self) -> Span {
        self.first().span().join(&self.last().span())
    }

    fn data(self) -> &'a super::ExprErrorData {
        &self.file.arenas.expr_errors[self.index as usize]
    }
}

/// A sign-prefixed expression.
#[derive(Clone, Copy)]
pub struct ExprPrefixed<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> ExprPrefixed<'a> {
    pub fn prefix(self) -> Token<'a> {
        self.file.token(self.data().prefix)
    }

    pub fn inner(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().inner,
        }
    }

    fn data(self) -> &'a super::ExprPrefixedData {
        &self.file.arenas.expr_prefixed[self.index as usize]
    }
}

/// A `lo to hi` range.
#[derive(Clone, Copy)]
pub struct ExprRange<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> ExprRange<'a> {
    pub fn lo(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().lo,
        }
    }

    /// The `to` keyword token.
    pub fn to_token(self) -> Token<'a> {
        self.file.token(self.data().to)
    }

    pub fn hi(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().hi,
        }
    }

    fn data(self) -> &'a super::ExprRangeData {
        &self.file.arenas.expr_ranges[self.index as usize]
    }
}

/// A bracketed array literal.
#[derive(Clone, Copy)]
pub struct ExprArray<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> ExprArray<'a> {
    pub fn brackets(self) -> Token<'a> {
        self.file.token(self.data().brackets)
    }

    pub fn len(self) -> usize {
        self.data().elems.len()
    }

    pub fn is_empty(self) -> bool {
        self.data().elems.is_empty()
    }

    pub fn get(self, n: usize) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().elems[n],
        }
    }

    /// The comma after element `n`; zero when the separator is missing.
    pub fn comma(self, n: usize) -> Token<'a> {
        self.file.token(self.data().commas[n])
    }

    pub fn iter(self) -> impl Iterator<Item = ExprAny<'a>> {
        (0..self.len()).map(move |n| self.get(n))
    }

    fn data(self) -> &'a super::ExprArrayData {
        &self.file.arenas.expr_arrays[self.index as usize]
    }
}

/// A braced message literal.
#[derive(Clone, Copy)]
pub struct ExprDict<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> ExprDict<'a> {
    pub fn braces(self) -> Token<'a> {
        self.file.token(self.data().braces)
    }

    pub fn len(self) -> usize {
        self.data().fields.len()
    }

    pub fn is_empty(self) -> bool {
        self.data().fields.is_empty()
    }

    pub fn get(self, n: usize) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().fields[n],
        }
    }

    pub fn comma(self, n: usize) -> Token<'a> {
        self.file.token(self.data().commas[n])
    }

    pub fn iter(self) -> impl Iterator<Item = ExprAny<'a>> {
        (0..self.len()).map(move |n| self.get(n))
    }

    fn data(self) -> &'a super::ExprDictData {
        &self.file.arenas.expr_dicts[self.index as usize]
    }
}

/// A `key: value` entry inside a message literal.
#[derive(Clone, Copy)]
pub struct ExprField<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> ExprField<'a> {
    pub fn key(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().key,
        }
    }

    /// The `:` token; zero when omitted, as before a nested message value.
    pub fn colon(self) -> Token<'a> {
        self.file.token(self.data().colon)
    }

    pub fn value(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().value,
        }
    }

    fn data(self) -> &'a super::ExprFieldData {
        &self.file.arenas.expr_fields[self.index as usize]
    }
}
