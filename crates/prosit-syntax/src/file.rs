//! The per-file context: token stream, node arenas, and the node factory.

use indexmap::IndexSet;
use prosit_core::report::Report;
use prosit_core::source::File;

use crate::ast::{
    Body, BodyId, CompactOptions, DeclAny, DeclId, DeclKind, ExprAny, ExprId, OptionsId, Path,
    PathId, TypeAny, TypeId,
};
use crate::ast::{
    Arenas, BodyData, DefData, EmptyData, ExprArrayData, ExprDictData, ExprErrorData,
    ExprFieldData, ExprPrefixedData, ExprRangeData, ImportData, OptionEntryData, OptionsData,
    PackageData, RangeData, RawPath, RawSlot, SignatureData, SyntaxData, TypeErrorData,
    TypeGenericData, TypeListData, TypePrefixedData, EXPR_ARRAY, EXPR_DICT, EXPR_ERROR,
    EXPR_FIELD, EXPR_PREFIXED, EXPR_RANGE, TYPE_ERROR, TYPE_GENERIC, TYPE_PREFIXED,
};
use crate::lexer;
use crate::token::{Token, TokenId, TokenStream};

/// A lexed file plus the arenas behind its AST.
///
/// Handles created by one `SourceFile` are meaningless in another; every
/// accessor and mutator panics on a handle that does not belong here.
#[derive(Debug)]
pub struct SourceFile {
    pub(crate) stream: TokenStream,
    pub(crate) arenas: Arenas,
    corrupt: IndexSet<DeclId>,
}

impl SourceFile {
    /// Lexes `file` and sets up an empty AST whose root body is handle 1.
    pub fn new(file: File, report: &mut Report) -> SourceFile {
        Self::from_stream(lexer::lex(&file, report))
    }

    /// Wraps an externally produced token stream, which is assumed frozen.
    pub fn from_stream(stream: TokenStream) -> SourceFile {
        let mut this = SourceFile {
            stream,
            arenas: Arenas::new(),
            corrupt: IndexSet::new(),
        };
        let root = this.alloc_body(BodyData::default());
        debug_assert_eq!(root.0, 1);
        this
    }

    pub fn file(&self) -> &File {
        self.stream.file()
    }

    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    /// Mutable stream access, for minting synthetic tokens.
    pub fn stream_mut(&mut self) -> &mut TokenStream {
        &mut self.stream
    }

    pub fn token(&self, id: TokenId) -> Token<'_> {
        self.stream.token(id)
    }

    /// The file-level body holding all top-level declarations.
    pub fn root_body(&self) -> Body<'_> {
        self.body(BodyId(1))
    }

    // --- view materializers ---

    pub fn decl(&self, id: DeclId) -> DeclAny<'_> {
        assert!(
            (id.index as usize) < self.arenas.decl_len(id.kind),
            "declaration handle from another file"
        );
        DeclAny { file: self, id }
    }

    pub fn body(&self, id: BodyId) -> Body<'_> {
        assert!(
            (id.0 as usize) < self.arenas.bodies.len(),
            "body handle from another file"
        );
        Body {
            file: self,
            index: id.0,
        }
    }

    pub fn expr(&self, id: ExprId) -> ExprAny<'_> {
        ExprAny {
            file: self,
            raw: id.0,
        }
    }

    pub fn ty(&self, id: TypeId) -> TypeAny<'_> {
        TypeAny {
            file: self,
            raw: id.0,
        }
    }

    pub fn path(&self, id: PathId) -> Path<'_> {
        Path {
            file: self,
            raw: id.0,
        }
    }

    pub fn options(&self, id: OptionsId) -> CompactOptions<'_> {
        assert!(
            (id.0 as usize) < self.arenas.options.len(),
            "options handle from another file"
        );
        CompactOptions {
            file: self,
            index: id.0,
        }
    }

    // --- corrupt flag ---

    /// Permanently marks a declaration as structurally recognized but
    /// semantically broken; downstream passes use this to suppress cascade
    /// diagnostics. There is no way to clear the flag.
    pub fn mark_corrupt(&mut self, decl: DeclId) {
        assert!(
            (decl.index as usize) < self.arenas.decl_len(decl.kind),
            "declaration handle from another file"
        );
        self.corrupt.insert(decl);
    }

    pub fn is_corrupt(&self, decl: DeclId) -> bool {
        self.corrupt.contains(&decl)
    }

    // --- paths ---

    /// A path over an inclusive range of natural tokens.
    pub fn new_path(&self, start: TokenId, end: TokenId) -> PathId {
        self.stream.check_owned(start);
        self.stream.check_owned(end);
        PathId(RawPath::natural(start, end))
    }

    /// A path over a sub-range of a synthetic token's children.
    pub fn new_synthetic_path(&self, token: TokenId, lo: usize, hi: usize) -> PathId {
        self.stream.check_owned(token);
        PathId(RawPath::synthetic(token, lo, hi))
    }

    /// A single-token path.
    pub fn new_single_path(&self, token: TokenId) -> PathId {
        self.stream.check_owned(token);
        PathId(RawPath::single(token))
    }

    // --- declarations ---

    /// A stray `;`.
    pub fn new_empty(&mut self, semicolon: TokenId) -> DeclId {
        self.check_token(semicolon);
        let index = push(&mut self.arenas.empties, EmptyData { semicolon });
        DeclId {
            kind: DeclKind::Empty,
            index,
        }
    }

    /// A `syntax = ...;` or `edition = ...;` declaration.
    pub fn new_syntax(
        &mut self,
        keyword: TokenId,
        equals: TokenId,
        value: ExprId,
        semicolon: TokenId,
    ) -> DeclId {
        self.check_token(keyword);
        self.check_token(equals);
        self.check_token(semicolon);
        let index = push(
            &mut self.arenas.syntaxes,
            SyntaxData {
                keyword,
                equals,
                value: value.0,
                options: 0,
                semicolon,
            },
        );
        DeclId {
            kind: DeclKind::Syntax,
            index,
        }
    }

    pub fn new_package(&mut self, keyword: TokenId, path: PathId, semicolon: TokenId) -> DeclId {
        self.check_token(keyword);
        self.check_token(semicolon);
        let index = push(
            &mut self.arenas.packages,
            PackageData {
                keyword,
                path: path.0,
                options: 0,
                semicolon,
            },
        );
        DeclId {
            kind: DeclKind::Package,
            index,
        }
    }

    /// An import; `modifier` is the `public`/`weak` token or zero.
    pub fn new_import(
        &mut self,
        keyword: TokenId,
        modifier: TokenId,
        target: ExprId,
        semicolon: TokenId,
    ) -> DeclId {
        self.check_token(keyword);
        self.check_token(modifier);
        self.check_token(semicolon);
        let index = push(
            &mut self.arenas.imports,
            ImportData {
                keyword,
                modifier,
                target: target.0,
                options: 0,
                semicolon,
            },
        );
        DeclId {
            kind: DeclKind::Import,
            index,
        }
    }

    /// A `reserved`/`extensions` range declaration; items are appended with
    /// [`SourceFile::range_append`].
    pub fn new_range(&mut self, keyword: TokenId, semicolon: TokenId) -> DeclId {
        self.check_token(keyword);
        self.check_token(semicolon);
        let index = push(
            &mut self.arenas.ranges,
            RangeData {
                keyword,
                semicolon,
                ..RangeData::default()
            },
        );
        DeclId {
            kind: DeclKind::Range,
            index,
        }
    }

    /// Appends a range item; a zero `comma` records a missing separator.
    pub fn range_append(&mut self, range: DeclId, item: ExprId, comma: TokenId) {
        assert_eq!(range.kind, DeclKind::Range, "not a range declaration");
        self.check_token(comma);
        let data = &mut self.arenas.ranges[range.index as usize];
        data.items.push(item.0);
        data.commas.push(comma);
    }

    /// A brace-delimited declaration list. `braces` is a fused pair, a lone
    /// unclosed open brace (its mate is then the zero token), or zero.
    pub fn new_body(&mut self, braces: TokenId) -> BodyId {
        self.check_token(braces);
        self.alloc_body(BodyData {
            braces,
            ..BodyData::default()
        })
    }

    /// The generic definition constructor; see [`crate::ast::DefKind`] for
    /// how the parts classify.
    pub fn new_def(&mut self, args: DefArgs) -> DeclId {
        self.check_token(args.equals);
        self.check_token(args.semicolon);
        assert!(
            (args.body.0 as usize) < self.arenas.bodies.len(),
            "body handle from another file"
        );
        let index = push(
            &mut self.arenas.defs,
            DefData {
                ty: args.ty.0,
                name: args.name.0,
                equals: args.equals,
                value: args.value.0,
                signature: None,
                body: args.body.0,
                options: 0,
                semicolon: args.semicolon,
            },
        );
        DeclId {
            kind: DeclKind::Def,
            index,
        }
    }

    /// Attaches a method signature to a definition.
    pub fn set_signature(
        &mut self,
        def: DeclId,
        inputs_parens: TokenId,
        returns_kw: TokenId,
        outputs_parens: TokenId,
    ) {
        assert_eq!(def.kind, DeclKind::Def, "signatures attach to definitions");
        self.check_token(inputs_parens);
        self.check_token(returns_kw);
        self.check_token(outputs_parens);
        self.arenas.defs[def.index as usize].signature = Some(SignatureData {
            inputs: TypeListData {
                parens: inputs_parens,
                ..TypeListData::default()
            },
            returns_kw,
            outputs: TypeListData {
                parens: outputs_parens,
                ..TypeListData::default()
            },
        });
    }

    pub fn signature_input_append(&mut self, def: DeclId, ty: TypeId, comma: TokenId) {
        self.check_token(comma);
        let sig = self.signature_mut(def);
        sig.inputs.types.push(ty.0);
        sig.inputs.commas.push(comma);
    }

    pub fn signature_output_append(&mut self, def: DeclId, ty: TypeId, comma: TokenId) {
        self.check_token(comma);
        let sig = self.signature_mut(def);
        sig.outputs.types.push(ty.0);
        sig.outputs.commas.push(comma);
    }

    /// Attaches a compact options list to a declaration that carries one.
    pub fn set_options(&mut self, decl: DeclId, options: OptionsId) {
        assert!(
            (options.0 as usize) < self.arenas.options.len(),
            "options handle from another file"
        );
        let index = decl.index as usize;
        match decl.kind {
            DeclKind::Syntax => self.arenas.syntaxes[index].options = options.0,
            DeclKind::Package => self.arenas.packages[index].options = options.0,
            DeclKind::Import => self.arenas.imports[index].options = options.0,
            DeclKind::Range => self.arenas.ranges[index].options = options.0,
            DeclKind::Def => self.arenas.defs[index].options = options.0,
            DeclKind::Empty | DeclKind::Body => {
                panic!("{:?} declarations cannot carry options", decl.kind)
            }
        }
    }

    // --- body sequences ---

    /// Appends a declaration to a body.
    pub fn body_append(&mut self, body: BodyId, decl: DeclId) {
        self.body_insert(body, self.arenas.bodies[body.0 as usize].kinds.len(), decl);
    }

    /// Inserts a declaration at position `at`.
    pub fn body_insert(&mut self, body: BodyId, at: usize, decl: DeclId) {
        assert!(
            (decl.index as usize) < self.arenas.decl_len(decl.kind),
            "declaration handle from another file"
        );
        assert!(!decl.is_zero(), "cannot insert the zero declaration");
        let data = &mut self.arenas.bodies[body.0 as usize];
        assert!(at <= data.kinds.len(), "insertion index out of bounds");
        data.kinds.insert(at, decl.kind);
        data.indices.insert(at, decl.index);
    }

    /// Removes and returns the declaration at position `at`.
    pub fn body_delete(&mut self, body: BodyId, at: usize) -> DeclId {
        let data = &mut self.arenas.bodies[body.0 as usize];
        assert!(at < data.kinds.len(), "deletion index out of bounds");
        let kind = data.kinds.remove(at);
        let index = data.indices.remove(at);
        DeclId { kind, index }
    }

    // --- compact options ---

    /// A bracketed compact options list; `brackets` is a fused pair or zero.
    pub fn new_options(&mut self, brackets: TokenId) -> OptionsId {
        self.check_token(brackets);
        let index = push(
            &mut self.arenas.options,
            OptionsData {
                brackets,
                ..OptionsData::default()
            },
        );
        OptionsId(index)
    }

    pub fn options_append(&mut self, options: OptionsId, path: PathId, equals: TokenId, value: ExprId) {
        self.options_append_with_comma(options, path, equals, value, TokenId::ZERO);
    }

    /// Appends an entry with its trailing comma; a zero `comma` records a
    /// missing separator in partially-invalid code.
    pub fn options_append_with_comma(
        &mut self,
        options: OptionsId,
        path: PathId,
        equals: TokenId,
        value: ExprId,
        comma: TokenId,
    ) {
        self.check_token(equals);
        self.check_token(comma);
        let data = &mut self.arenas.options[options.0 as usize];
        data.entries.push(OptionEntryData {
            path: path.0,
            equals,
            value: value.0,
        });
        data.commas.push(comma);
    }

    // --- expressions ---

    /// A literal expression wrapping a string or number token.
    pub fn new_expr_literal(&self, token: TokenId) -> ExprId {
        self.check_token(token);
        ExprId(RawSlot::from_path(RawPath::single(token)))
    }

    pub fn new_expr_path(&self, path: PathId) -> ExprId {
        ExprId(RawSlot::from_path(path.0))
    }

    /// A sign-prefixed expression; `prefix` is the `-` token.
    pub fn new_expr_prefixed(&mut self, prefix: TokenId, inner: ExprId) -> ExprId {
        self.check_token(prefix);
        let index = push(
            &mut self.arenas.expr_prefixed,
            ExprPrefixedData {
                prefix,
                inner: inner.0,
            },
        );
        ExprId(RawSlot::from_variant(EXPR_PREFIXED, index))
    }

    /// A `lo to hi` range expression.
    pub fn new_expr_range(&mut self, lo: ExprId, to: TokenId, hi: ExprId) -> ExprId {
        self.check_token(to);
        let index = push(
            &mut self.arenas.expr_ranges,
            ExprRangeData {
                lo: lo.0,
                to,
                hi: hi.0,
            },
        );
        ExprId(RawSlot::from_variant(EXPR_RANGE, index))
    }

    /// A bracketed array literal; elements are appended separately.
    pub fn new_expr_array(&mut self, brackets: TokenId) -> ExprId {
        self.check_token(brackets);
        let index = push(
            &mut self.arenas.expr_arrays,
            ExprArrayData {
                brackets,
                ..ExprArrayData::default()
            },
        );
        ExprId(RawSlot::from_variant(EXPR_ARRAY, index))
    }

    pub fn expr_array_append(&mut self, array: ExprId, elem: ExprId, comma: TokenId) {
        self.check_token(comma);
        let index = self.variant_index(array.0, EXPR_ARRAY, "array expression");
        let data = &mut self.arenas.expr_arrays[index];
        data.elems.push(elem.0);
        data.commas.push(comma);
    }

    /// A braced message literal; fields are appended separately.
    pub fn new_expr_dict(&mut self, braces: TokenId) -> ExprId {
        self.check_token(braces);
        let index = push(
            &mut self.arenas.expr_dicts,
            ExprDictData {
                braces,
                ..ExprDictData::default()
            },
        );
        ExprId(RawSlot::from_variant(EXPR_DICT, index))
    }

    pub fn expr_dict_append(&mut self, dict: ExprId, field: ExprId, comma: TokenId) {
        self.check_token(comma);
        let index = self.variant_index(dict.0, EXPR_DICT, "message expression");
        let data = &mut self.arenas.expr_dicts[index];
        data.fields.push(field.0);
        data.commas.push(comma);
    }

    /// A `key: value` entry inside a message literal.
    pub fn new_expr_field(&mut self, key: ExprId, colon: TokenId, value: ExprId) -> ExprId {
        self.check_token(colon);
        let index = push(
            &mut self.arenas.expr_fields,
            ExprFieldData {
                key: key.0,
                colon,
                value: value.0,
            },
        );
        ExprId(RawSlot::from_variant(EXPR_FIELD, index))
    }

    /// An unparseable expression covering a token range.
    pub fn new_expr_error(&mut self, first: TokenId, last: TokenId) -> ExprId {
        self.check_token(first);
        self.check_token(last);
        let index = push(&mut self.arenas.expr_errors, ExprErrorData { first, last });
        ExprId(RawSlot::from_variant(EXPR_ERROR, index))
    }

    // --- types ---

    pub fn new_type_path(&self, path: PathId) -> TypeId {
        TypeId(RawSlot::from_path(path.0))
    }

    /// A modifier-prefixed type; `prefix` is the modifier keyword token.
    pub fn new_type_prefixed(&mut self, prefix: TokenId, inner: TypeId) -> TypeId {
        self.check_token(prefix);
        let index = push(
            &mut self.arenas.type_prefixed,
            TypePrefixedData {
                prefix,
                inner: inner.0,
            },
        );
        TypeId(RawSlot::from_variant(TYPE_PREFIXED, index))
    }

    /// A generic type (`map<k, v>`); arguments are appended separately.
    pub fn new_type_generic(&mut self, path: PathId, angles: TokenId) -> TypeId {
        self.check_token(angles);
        let index = push(
            &mut self.arenas.type_generics,
            TypeGenericData {
                path: path.0,
                angles,
                ..TypeGenericData::default()
            },
        );
        TypeId(RawSlot::from_variant(TYPE_GENERIC, index))
    }

    pub fn type_generic_append(&mut self, generic: TypeId, arg: TypeId, comma: TokenId) {
        self.check_token(comma);
        let index = self.variant_index(generic.0, TYPE_GENERIC, "generic type");
        let data = &mut self.arenas.type_generics[index];
        data.args.push(arg.0);
        data.commas.push(comma);
    }

    pub fn new_type_error(&mut self, first: TokenId, last: TokenId) -> TypeId {
        self.check_token(first);
        self.check_token(last);
        let index = push(&mut self.arenas.type_errors, TypeErrorData { first, last });
        TypeId(RawSlot::from_variant(TYPE_ERROR, index))
    }

    // --- internals ---

    fn alloc_body(&mut self, data: BodyData) -> BodyId {
        BodyId(push(&mut self.arenas.bodies, data))
    }

    fn signature_mut(&mut self, def: DeclId) -> &mut SignatureData {
        assert_eq!(def.kind, DeclKind::Def, "signatures attach to definitions");
        self.arenas.defs[def.index as usize]
            .signature
            .as_mut()
            .expect("definition has no signature")
    }

    fn variant_index(&self, slot: RawSlot, tag: u8, what: &str) -> usize {
        match slot.shape() {
            crate::ast::SlotShape::Variant { tag: t, index } if t == tag => index as usize,
            _ => panic!("not a {what} handle"),
        }
    }

    fn check_token(&self, id: TokenId) {
        self.stream.check_owned(id);
    }
}

/// Arguments for [`SourceFile::new_def`]; unset slots stay zero.
#[derive(Debug, Clone, Copy)]
pub struct DefArgs {
    pub ty: TypeId,
    pub name: PathId,
    pub equals: TokenId,
    pub value: ExprId,
    pub body: BodyId,
    pub semicolon: TokenId,
}

impl Default for DefArgs {
    fn default() -> Self {
        Self {
            ty: TypeId::ZERO,
            name: PathId::ZERO,
            equals: TokenId::ZERO,
            value: ExprId::ZERO,
            body: BodyId::ZERO,
            semicolon: TokenId::ZERO,
        }
    }
}

fn push<T>(arena: &mut Vec<T>, data: T) -> u32 {
    arena.push(data);
    (arena.len() - 1) as u32
}
