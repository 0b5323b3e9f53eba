//! Type views.

use prosit_core::source::Span;

use super::path::Path;
use super::{RawSlot, SlotShape, TYPE_ERROR, TYPE_GENERIC, TYPE_PREFIXED, TypeId};
use crate::SourceFile;
use crate::token::Token;

/// Type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TypeKind {
    Nil,
    /// An unparseable run of tokens.
    Error,
    /// A named type.
    Path,
    /// A modifier keyword applied to an inner type.
    Prefixed,
    /// A path with an angle-bracketed argument list, as in `map<k, v>`.
    Generic,
}

/// Any type: a packed handle plus its file.
#[derive(Clone, Copy)]
pub struct TypeAny<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) raw: RawSlot,
}

/// A type dispatched to its concrete variant.
#[derive(Clone, Copy)]
pub enum Type<'a> {
    Error(TypeError<'a>),
    Path(Path<'a>),
    Prefixed(TypePrefixed<'a>),
    Generic(TypeGeneric<'a>),
}

impl<'a> TypeAny<'a> {
    pub fn id(self) -> TypeId {
        TypeId(self.raw)
    }

    pub fn is_zero(self) -> bool {
        self.raw.is_nil()
    }

    pub fn kind(self) -> TypeKind {
        match self.raw.shape() {
            SlotShape::Nil => TypeKind::Nil,
            SlotShape::Path(_) => TypeKind::Path,
            SlotShape::Variant { tag, .. } => match tag {
                TYPE_ERROR => TypeKind::Error,
                TYPE_PREFIXED => TypeKind::Prefixed,
                TYPE_GENERIC => TypeKind::Generic,
                _ => TypeKind::Nil,
            },
        }
    }

    /// Dispatches to the concrete variant; `None` for the absent type.
    pub fn classify(self) -> Option<Type<'a>> {
        match self.raw.shape() {
            SlotShape::Nil => None,
            SlotShape::Path(path) => Some(Type::Path(Path {
                file: self.file,
                raw: path,
            })),
            SlotShape::Variant { tag, index } => Some(match tag {
                TYPE_ERROR => Type::Error(TypeError {
                    file: self.file,
                    index,
                }),
                TYPE_PREFIXED => Type::Prefixed(TypePrefixed {
                    file: self.file,
                    index,
                }),
                TYPE_GENERIC => Type::Generic(TypeGeneric {
                    file: self.file,
                    index,
                }),
                _ => return None,
            }),
        }
    }

    pub fn as_path(self) -> Option<Path<'a>> {
        match self.classify()? {
            Type::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_prefixed(self) -> Option<TypePrefixed<'a>> {
        match self.classify()? {
            Type::Prefixed(prefixed) => Some(prefixed),
            _ => None,
        }
    }

    pub fn as_generic(self) -> Option<TypeGeneric<'a>> {
        match self.classify()? {
            Type::Generic(generic) => Some(generic),
            _ => None,
        }
    }

    pub fn span(self) -> Span {
        match self.classify() {
            None => Span::zero(),
            Some(Type::Path(path)) => path.span(),
            Some(Type::Error(error)) => error.span(),
            Some(Type::Prefixed(prefixed)) => prefixed
                .prefix()
                .span()
                .join(&prefixed.inner().span()),
            Some(Type::Generic(generic)) => generic
                .path()
                .span()
                .join(&generic.angles().span()),
        }
    }
}

impl PartialEq for TypeAny<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.raw == other.raw
    }
}

impl Eq for TypeAny<'_> {}

impl std::fmt::Debug for TypeAny<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeAny({:?})", self.kind())
    }
}

/// An unparseable type.
#[derive(Clone, Copy)]
pub struct TypeError<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> TypeError<'a> {
    pub fn first(self) -> Token<'a> {
        self.file.token(self.data().first)
    }

    pub fn last(self) -> Token<'a> {
        self.file.token(self.data().last)
    }

    pub fn span(self) -> Span {
        self.first().span().join(&self.last().span())
    }

    fn data(self) -> &'a super::TypeErrorData {
        &self.file.arenas.type_errors[self.index as usize]
    }
}

/// A modifier keyword applied to an inner type.
#[derive(Clone, Copy)]
pub struct TypePrefixed<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> TypePrefixed<'a> {
    /// The modifier token (`optional`, `repeated`, `required`, `group`).
    pub fn prefix(self) -> Token<'a> {
        self.file.token(self.data().prefix)
    }

    pub fn inner(self) -> TypeAny<'a> {
        TypeAny {
            file: self.file,
            raw: self.data().inner,
        }
    }

    fn data(self) -> &'a super::TypePrefixedData {
        &self.file.arenas.type_prefixed[self.index as usize]
    }
}

/// A path with an angle-bracketed type argument list.
#[derive(Clone, Copy)]
pub struct TypeGeneric<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> TypeGeneric<'a> {
    pub fn path(self) -> Path<'a> {
        Path {
            file: self.file,
            raw: self.data().path,
        }
    }

    /// The fused angle-bracket pair.
    pub fn angles(self) -> Token<'a> {
        self.file.token(self.data().angles)
    }

    pub fn len(self) -> usize {
        self.data().args.len()
    }

    pub fn is_empty(self) -> bool {
        self.data().args.is_empty()
    }

    pub fn get(self, n: usize) -> TypeAny<'a> {
        TypeAny {
            file: self.file,
            raw: self.data().args[n],
        }
    }

    /// The comma after argument `n`; zero when the separator is missing.
    pub fn comma(self, n: usize) -> Token<'a> {
        self.file.token(self.data().commas[n])
    }

    pub fn iter(self) -> impl Iterator<Item = TypeAny<'a>> {
        (0..self.len()).map(move |n| self.get(n))
    }

    fn data(self) -> &'a super::TypeGenericData {
        &self.file.arenas.type_generics[self.index as usize]
    }
}
