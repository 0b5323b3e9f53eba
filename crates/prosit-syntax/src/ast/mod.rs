//! The AST arena and node graph.
//!
//! Every node is a pointer-like value: a [`crate::SourceFile`] reference
//! plus an opaque handle into one of the file's typed arenas. The zero
//! handle is "absent" everywhere, node equality is identity, and nodes live
//! as long as their file.
//!
//! # Packed slots
//!
//! Expressions and types that are just a path or a literal never allocate an
//! arena entry. They pack into the same two-word slot used for arena
//! variants:
//!
//! - `(0, 0)` is absent;
//! - a positive first word is a natural path, the two words being an
//!   inclusive token-id range;
//! - a negative first word with a negative second word is a synthetic path:
//!   the synthetic token plus a bit-packed sub-range of its children;
//! - a negative first word with a non-negative second word is an arena
//!   variant: the first word's bitwise-NOT is the tag, the second the index.
//!
//! This relies on natural and synthetic token ids having opposite signs and
//! index 0 of every arena being reserved; both are load-bearing and tested.

mod decl;
mod def;
mod expr;
mod options;
mod path;
mod ty;


pub use decl::{
    Body, Decl, DeclAny, DeclEmpty, DeclImport, DeclPackage, DeclRange, DeclSyntax, Decls,
};
pub use def::{
    Def, DefEnum, DefEnumValue, DefExtend, DefField, DefGroup, DefKind, DefMessage, DefMethod,
    DefOneof, DefOption, DefService, Signature, TypeList,
};
pub use expr::{
    Expr, ExprAny, ExprArray, ExprDict, ExprError, ExprField, ExprKind, ExprPrefixed, ExprRange,
};
pub use options::{CompactOptions, OptionEntry};
pub use path::{Component, Components, Path};
pub use ty::{Type, TypeAny, TypeError, TypeGeneric, TypeKind, TypePrefixed};

use crate::token::TokenId;

/// Declaration discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum DeclKind {
    Empty,
    Syntax,
    Package,
    Import,
    Def,
    Body,
    Range,
}

/// Handle to a declaration. Valid only within the file that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId {
    pub(crate) kind: DeclKind,
    pub(crate) index: u32,
}

impl DeclId {
    /// The absent declaration.
    pub const ZERO: DeclId = DeclId {
        kind: DeclKind::Empty,
        index: 0,
    };

    pub fn is_zero(self) -> bool {
        self.index == 0
    }

    pub fn kind(self) -> DeclKind {
        self.kind
    }
}

/// Handle to a body. The file-level body is always handle 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    pub const ZERO: BodyId = BodyId(0);

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Handle to a compact options list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionsId(pub(crate) u32);

impl OptionsId {
    pub const ZERO: OptionsId = OptionsId(0);

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Handle to an expression: a packed slot, not an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub(crate) RawSlot);

impl ExprId {
    pub const ZERO: ExprId = ExprId(RawSlot::NIL);

    pub fn is_zero(self) -> bool {
        self.0.is_nil()
    }
}

/// Handle to a type: a packed slot, not an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) RawSlot);

impl TypeId {
    pub const ZERO: TypeId = TypeId(RawSlot::NIL);

    pub fn is_zero(self) -> bool {
        self.0.is_nil()
    }
}

/// Handle to a path: two packed token ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId(pub(crate) RawPath);

impl PathId {
    pub const ZERO: PathId = PathId(RawPath::NIL);

    pub fn is_zero(self) -> bool {
        self.0.is_nil()
    }
}

/// A path's packed form: two token ids, or a synthetic token plus a
/// child sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct RawPath {
    pub(crate) a: i32,
    pub(crate) b: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathShape {
    Nil,
    /// Inclusive range of natural token ids.
    Natural { start: TokenId, end: TokenId },
    /// A synthetic token and a `[lo, hi)` range over its children; a leaf
    /// token uses the empty range and stands for itself.
    Synthetic { token: TokenId, lo: usize, hi: usize },
}

impl RawPath {
    pub(crate) const NIL: RawPath = RawPath { a: 0, b: 0 };

    pub(crate) fn natural(start: TokenId, end: TokenId) -> RawPath {
        assert!(
            start.is_natural() && end.is_natural() && start <= end,
            "natural paths need an ordered natural token range"
        );
        RawPath {
            a: start.get(),
            b: end.get(),
        }
    }

    pub(crate) fn synthetic(token: TokenId, lo: usize, hi: usize) -> RawPath {
        assert!(token.is_synthetic(), "synthetic paths start at a synthetic token");
        assert!(lo <= hi && hi <= 0x7FFF, "child range out of encodable bounds");
        RawPath {
            a: token.get(),
            b: !(((lo as i32) << 15) | hi as i32),
        }
    }

    /// A single token standing alone as a path or literal.
    pub(crate) fn single(token: TokenId) -> RawPath {
        if token.is_natural() {
            RawPath::natural(token, token)
        } else {
            RawPath::synthetic(token, 0, 0)
        }
    }

    pub(crate) fn is_nil(self) -> bool {
        self.a == 0 && self.b == 0
    }

    pub(crate) fn shape(self) -> PathShape {
        if self.is_nil() {
            PathShape::Nil
        } else if self.a > 0 {
            PathShape::Natural {
                start: TokenId::from_raw(self.a),
                end: TokenId::from_raw(self.b),
            }
        } else {
            let packed = !self.b;
            PathShape::Synthetic {
                token: TokenId::from_raw(self.a),
                lo: (packed >> 15) as usize,
                hi: (packed & 0x7FFF) as usize,
            }
        }
    }
}

/// The two-word slot shared by expressions and types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct RawSlot {
    a: i32,
    b: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotShape {
    Nil,
    Path(RawPath),
    Variant { tag: u8, index: u32 },
}

impl RawSlot {
    pub(crate) const NIL: RawSlot = RawSlot { a: 0, b: 0 };

    pub(crate) fn from_path(path: RawPath) -> RawSlot {
        RawSlot {
            a: path.a,
            b: path.b,
        }
    }

    pub(crate) fn from_variant(tag: u8, index: u32) -> RawSlot {
        assert!(index != 0, "arena index 0 is reserved");
        assert!(index <= i32::MAX as u32, "arena index overflows the slot");
        RawSlot {
            a: !(tag as i32),
            b: index as i32,
        }
    }

    pub(crate) fn is_nil(self) -> bool {
        self.a == 0 && self.b == 0
    }

    pub(crate) fn shape(self) -> SlotShape {
        if self.is_nil() {
            SlotShape::Nil
        } else if self.a > 0 || (self.a < 0 && self.b < 0) {
            SlotShape::Path(RawPath {
                a: self.a,
                b: self.b,
            })
        } else if self.a < 0 {
            SlotShape::Variant {
                tag: (!self.a) as u8,
                index: self.b as u32,
            }
        } else {
            SlotShape::Nil
        }
    }
}

// arena variant tags for expressions
pub(crate) const EXPR_ERROR: u8 = 0;
pub(crate) const EXPR_PREFIXED: u8 = 1;
pub(crate) const EXPR_RANGE: u8 = 2;
pub(crate) const EXPR_ARRAY: u8 = 3;
pub(crate) const EXPR_DICT: u8 = 4;
pub(crate) const EXPR_FIELD: u8 = 5;

// arena variant tags for types
pub(crate) const TYPE_ERROR: u8 = 0;
pub(crate) const TYPE_PREFIXED: u8 = 1;
pub(crate) const TYPE_GENERIC: u8 = 2;

// --- arena records ---

#[derive(Debug, Default)]
pub(crate) struct BodyData {
    /// Fused brace pair, or the zero token for the file-level body.
    pub(crate) braces: TokenId,
    /// Parallel arrays: a discriminator and an arena index per child.
    pub(crate) kinds: Vec<DeclKind>,
    pub(crate) indices: Vec<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct EmptyData {
    pub(crate) semicolon: TokenId,
}

#[derive(Debug, Default)]
pub(crate) struct SyntaxData {
    pub(crate) keyword: TokenId,
    pub(crate) equals: TokenId,
    pub(crate) value: RawSlot,
    pub(crate) options: u32,
    pub(crate) semicolon: TokenId,
}

#[derive(Debug, Default)]
pub(crate) struct PackageData {
    pub(crate) keyword: TokenId,
    pub(crate) path: RawPath,
    pub(crate) options: u32,
    pub(crate) semicolon: TokenId,
}

#[derive(Debug, Default)]
pub(crate) struct ImportData {
    pub(crate) keyword: TokenId,
    /// `public` or `weak`, when present.
    pub(crate) modifier: TokenId,
    pub(crate) target: RawSlot,
    pub(crate) options: u32,
    pub(crate) semicolon: TokenId,
}

#[derive(Debug, Default)]
pub(crate) struct RangeData {
    /// `reserved` or `extensions`.
    pub(crate) keyword: TokenId,
    pub(crate) items: Vec<RawSlot>,
    pub(crate) commas: Vec<TokenId>,
    pub(crate) options: u32,
    pub(crate) semicolon: TokenId,
}

/// The one generic definition record; its kind is classified from shape.
#[derive(Debug, Default)]
pub(crate) struct DefData {
    pub(crate) ty: RawSlot,
    pub(crate) name: RawPath,
    pub(crate) equals: TokenId,
    pub(crate) value: RawSlot,
    pub(crate) signature: Option<SignatureData>,
    pub(crate) body: u32,
    pub(crate) options: u32,
    pub(crate) semicolon: TokenId,
}

#[derive(Debug, Default)]
pub(crate) struct SignatureData {
    pub(crate) inputs: TypeListData,
    pub(crate) returns_kw: TokenId,
    pub(crate) outputs: TypeListData,
}

#[derive(Debug, Default)]
pub(crate) struct TypeListData {
    pub(crate) parens: TokenId,
    pub(crate) types: Vec<RawSlot>,
    pub(crate) commas: Vec<TokenId>,
}

#[derive(Debug, Default)]
pub(crate) struct OptionsData {
    pub(crate) brackets: TokenId,
    pub(crate) entries: Vec<OptionEntryData>,
    pub(crate) commas: Vec<TokenId>,
}

#[derive(Debug, Default)]
pub(crate) struct OptionEntryData {
    pub(crate) path: RawPath,
    pub(crate) equals: TokenId,
    pub(crate) value: RawSlot,
}

#[derive(Debug, Default)]
pub(crate) struct ExprErrorData {
    pub(crate) first: TokenId,
    pub(crate) last: TokenId,
}

#[derive(Debug, Default)]
pub(crate) struct ExprArrayData {
    pub(crate) brackets: TokenId,
    pub(crate) elems: Vec<RawSlot>,
    pub(crate) commas: Vec<TokenId>,
}

#[derive(Debug, Default)]
pub(crate) struct ExprDictData {
    pub(crate) braces: TokenId,
    pub(crate) fields: Vec<RawSlot>,
    pub(crate) commas: Vec<TokenId>,
}

#[derive(Debug, Default)]
pub(crate) struct ExprFieldData {
    pub(crate) key: RawSlot,
    pub(crate) colon: TokenId,
    pub(crate) value: RawSlot,
}

#[derive(Debug, Default)]
pub(crate) struct ExprPrefixedData {
    pub(crate) prefix: TokenId,
    pub(crate) inner: RawSlot,
}

#[derive(Debug, Default)]
pub(crate) struct ExprRangeData {
    pub(crate) lo: RawSlot,
    pub(crate) to: TokenId,
    pub(crate) hi: RawSlot,
}

#[derive(Debug, Default)]
pub(crate) struct TypeErrorData {
    pub(crate) first: TokenId,
    pub(crate) last: TokenId,
}

#[derive(Debug, Default)]
pub(crate) struct TypePrefixedData {
    pub(crate) prefix: TokenId,
    pub(crate) inner: RawSlot,
}

#[derive(Debug, Default)]
pub(crate) struct TypeGenericData {
    pub(crate) path: RawPath,
    pub(crate) angles: TokenId,
    pub(crate) args: Vec<RawSlot>,
    pub(crate) commas: Vec<TokenId>,
}

/// One packed vector per node variant; index 0 of each is reserved so that
/// a zero handle always means "absent". Arenas grow and never shrink.
#[derive(Debug)]
pub(crate) struct Arenas {
    pub(crate) bodies: Vec<BodyData>,
    pub(crate) defs: Vec<DefData>,
    pub(crate) empties: Vec<EmptyData>,
    pub(crate) imports: Vec<ImportData>,
    pub(crate) packages: Vec<PackageData>,
    pub(crate) ranges: Vec<RangeData>,
    pub(crate) syntaxes: Vec<SyntaxData>,

    pub(crate) expr_errors: Vec<ExprErrorData>,
    pub(crate) expr_arrays: Vec<ExprArrayData>,
    pub(crate) expr_dicts: Vec<ExprDictData>,
    pub(crate) expr_fields: Vec<ExprFieldData>,
    pub(crate) expr_prefixed: Vec<ExprPrefixedData>,
    pub(crate) expr_ranges: Vec<ExprRangeData>,

    pub(crate) type_errors: Vec<TypeErrorData>,
    pub(crate) type_prefixed: Vec<TypePrefixedData>,
    pub(crate) type_generics: Vec<TypeGenericData>,

    pub(crate) options: Vec<OptionsData>,
}

impl Arenas {
    pub(crate) fn new() -> Arenas {
        Arenas {
            bodies: vec![BodyData::default()],
            defs: vec![DefData::default()],
            empties: vec![EmptyData::default()],
            imports: vec![ImportData::default()],
            packages: vec![PackageData::default()],
            ranges: vec![RangeData::default()],
            syntaxes: vec![SyntaxData::default()],
            expr_errors: vec![ExprErrorData::default()],
            expr_arrays: vec![ExprArrayData::default()],
            expr_dicts: vec![ExprDictData::default()],
            expr_fields: vec![ExprFieldData::default()],
            expr_prefixed: vec![ExprPrefixedData::default()],
            expr_ranges: vec![ExprRangeData::default()],
            type_errors: vec![TypeErrorData::default()],
            type_prefixed: vec![TypePrefixedData::default()],
            type_generics: vec![TypeGenericData::default()],
            options: vec![OptionsData::default()],
        }
    }

    pub(crate) fn decl_len(&self, kind: DeclKind) -> usize {
        match kind {
            DeclKind::Empty => self.empties.len(),
            DeclKind::Syntax => self.syntaxes.len(),
            DeclKind::Package => self.packages.len(),
            DeclKind::Import => self.imports.len(),
            DeclKind::Def => self.defs.len(),
            DeclKind::Body => self.bodies.len(),
            DeclKind::Range => self.ranges.len(),
        }
    }
}
