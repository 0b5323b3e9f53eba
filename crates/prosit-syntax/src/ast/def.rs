//! Definition views and classification.
//!
//! Every definition shares one generic record: a type slot, a name, an
//! equals token, a value, an optional method signature, a body, options, and
//! a semicolon. [`Def::classify`] reads the record's shape — chiefly the
//! head keyword of its type — to decide what the definition is. This is what
//! lets the tree hold constructs valid protobuf would reject: a `message`
//! with a tag number, a field outside any message, a doubly-modified type.

use prosit_core::source::Span;

use super::decl::Body;
use super::expr::ExprAny;
use super::options::CompactOptions;
use super::path::Path;
use super::ty::{Type, TypeAny};
use super::{DeclId, DeclKind};
use crate::SourceFile;
use crate::token::{Keyword, Token};

/// What a definition turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum DefKind {
    Message,
    Enum,
    Service,
    Extend,
    Field,
    EnumValue,
    Oneof,
    Group,
    Method,
    Option,
}

/// A definition: `message`, `enum`, field, method, option, and friends.
#[derive(Clone, Copy)]
pub struct Def<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) index: u32,
}

impl<'a> Def<'a> {
    pub fn id(self) -> DeclId {
        DeclId {
            kind: DeclKind::Def,
            index: self.index,
        }
    }

    /// The definition's type slot: the field type, or the single-keyword
    /// path (`message`, `enum`, ...) that names the construct.
    pub fn ty(self) -> TypeAny<'a> {
        TypeAny {
            file: self.file,
            raw: self.data().ty,
        }
    }

    pub fn name(self) -> Path<'a> {
        Path {
            file: self.file,
            raw: self.data().name,
        }
    }

    pub fn equals(self) -> Token<'a> {
        self.file.token(self.data().equals)
    }

    /// The value after `=`: a field tag, an enum value, an option value.
    pub fn value(self) -> ExprAny<'a> {
        ExprAny {
            file: self.file,
            raw: self.data().value,
        }
    }

    pub fn signature(self) -> Option<Signature<'a>> {
        self.data().signature.as_ref()?;
        Some(Signature {
            file: self.file,
            def_index: self.index,
        })
    }

    pub fn body(self) -> Body<'a> {
        Body {
            file: self.file,
            index: self.data().body,
        }
    }

    pub fn options(self) -> CompactOptions<'a> {
        CompactOptions {
            file: self.file,
            index: self.data().options,
        }
    }

    pub fn semicolon(self) -> Token<'a> {
        self.file.token(self.data().semicolon)
    }

    /// Classifies the definition by its head keyword and shape.
    pub fn classify(self) -> DefKind {
        match self.head_keyword() {
            Keyword::Message => DefKind::Message,
            Keyword::Enum => DefKind::Enum,
            Keyword::Service => DefKind::Service,
            Keyword::Extend => DefKind::Extend,
            Keyword::Oneof => DefKind::Oneof,
            Keyword::Group => DefKind::Group,
            Keyword::Rpc => DefKind::Method,
            Keyword::Option => DefKind::Option,
            _ if self.signature().is_some() => DefKind::Method,
            _ if self.ty().is_zero() => DefKind::EnumValue,
            _ => DefKind::Field,
        }
    }

    pub fn as_message(self) -> Option<DefMessage<'a>> {
        (self.classify() == DefKind::Message).then(|| DefMessage {
            keyword: self.head_keyword_token(),
            name: self.name(),
            body: self.body(),
            options: self.options(),
            semicolon: self.semicolon(),
        })
    }

    pub fn as_enum(self) -> Option<DefEnum<'a>> {
        (self.classify() == DefKind::Enum).then(|| DefEnum {
            keyword: self.head_keyword_token(),
            name: self.name(),
            body: self.body(),
            options: self.options(),
            semicolon: self.semicolon(),
        })
    }

    pub fn as_service(self) -> Option<DefService<'a>> {
        (self.classify() == DefKind::Service).then(|| DefService {
            keyword: self.head_keyword_token(),
            name: self.name(),
            body: self.body(),
            options: self.options(),
            semicolon: self.semicolon(),
        })
    }

    pub fn as_extend(self) -> Option<DefExtend<'a>> {
        (self.classify() == DefKind::Extend).then(|| DefExtend {
            keyword: self.head_keyword_token(),
            extendee: self.name(),
            body: self.body(),
            semicolon: self.semicolon(),
        })
    }

    pub fn as_oneof(self) -> Option<DefOneof<'a>> {
        (self.classify() == DefKind::Oneof).then(|| DefOneof {
            keyword: self.head_keyword_token(),
            name: self.name(),
            body: self.body(),
            options: self.options(),
            semicolon: self.semicolon(),
        })
    }

    pub fn as_field(self) -> Option<DefField<'a>> {
        (self.classify() == DefKind::Field).then(|| DefField {
            ty: self.ty(),
            name: self.name(),
            equals: self.equals(),
            tag: self.value(),
            options: self.options(),
            semicolon: self.semicolon(),
        })
    }

    pub fn as_enum_value(self) -> Option<DefEnumValue<'a>> {
        (self.classify() == DefKind::EnumValue).then(|| DefEnumValue {
            name: self.name(),
            equals: self.equals(),
            value: self.value(),
            options: self.options(),
            semicolon: self.semicolon(),
        })
    }

    pub fn as_group(self) -> Option<DefGroup<'a>> {
        (self.classify() == DefKind::Group).then(|| DefGroup {
            keyword: self.head_keyword_token(),
            name: self.name(),
            equals: self.equals(),
            tag: self.value(),
            body: self.body(),
            options: self.options(),
        })
    }

    pub fn as_method(self) -> Option<DefMethod<'a>> {
        (self.classify() == DefKind::Method).then(|| DefMethod {
            keyword: self.head_keyword_token(),
            name: self.name(),
            signature: self.signature(),
            body: self.body(),
            semicolon: self.semicolon(),
        })
    }

    pub fn as_option(self) -> Option<DefOption<'a>> {
        (self.classify() == DefKind::Option).then(|| DefOption {
            keyword: self.head_keyword_token(),
            path: self.name(),
            equals: self.equals(),
            value: self.value(),
            semicolon: self.semicolon(),
        })
    }

    pub fn span(self) -> Span {
        let mut span = self
            .ty()
            .span()
            .join(&self.name().span())
            .join(&self.equals().span())
            .join(&self.value().span())
            .join(&self.semicolon().span());
        if let Some(signature) = self.signature() {
            span = span
                .join(&signature.inputs().parens().span())
                .join(&signature.returns_kw().span())
                .join(&signature.outputs().parens().span());
        }
        let body = self.body();
        if !body.is_zero() && !body.braces().is_zero() {
            span = span.join(&body.span());
        }
        let options = self.options();
        if !options.is_zero() {
            span = span.join(&options.span());
        }
        span
    }

    /// Keyword heading the type slot, looking through modifier prefixes.
    fn head_keyword(self) -> Keyword {
        self.head_keyword_token().keyword()
    }

    fn head_keyword_token(self) -> Token<'a> {
        let mut ty = self.ty();
        loop {
            match ty.classify() {
                Some(Type::Prefixed(prefixed)) => {
                    let inner = prefixed.inner();
                    if inner.is_zero() {
                        // `optional` with nothing after it: the modifier
                        // itself is the head
                        return prefixed.prefix();
                    }
                    ty = inner;
                }
                Some(Type::Path(path)) => {
                    return match path.as_ident() {
                        Some(token) => token,
                        None => self.file.token(crate::token::TokenId::ZERO),
                    };
                }
                Some(Type::Generic(generic)) => {
                    return match generic.path().as_ident() {
                        Some(token) => token,
                        None => self.file.token(crate::token::TokenId::ZERO),
                    };
                }
                _ => return self.file.token(crate::token::TokenId::ZERO),
            }
        }
    }

    fn data(self) -> &'a super::DefData {
        &self.file.arenas.defs[self.index as usize]
    }
}

impl PartialEq for Def<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.index == other.index
    }
}

impl Eq for Def<'_> {}

/// A method signature: two parenthesized type lists, optionally joined by a
/// `returns` keyword.
#[derive(Clone, Copy)]
pub struct Signature<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) def_index: u32,
}

impl<'a> Signature<'a> {
    pub fn inputs(self) -> TypeList<'a> {
        TypeList {
            file: self.file,
            def_index: self.def_index,
            outputs: false,
        }
    }

    /// The `returns` keyword token; zero when missing.
    pub fn returns_kw(self) -> Token<'a> {
        self.file.token(self.data().returns_kw)
    }

    pub fn outputs(self) -> TypeList<'a> {
        TypeList {
            file: self.file,
            def_index: self.def_index,
            outputs: true,
        }
    }

    fn data(self) -> &'a super::SignatureData {
        self.file.arenas.defs[self.def_index as usize]
            .signature
            .as_ref()
            .expect("signature views exist only for defs that have one")
    }
}

/// One parenthesized, comma-separated type list of a signature.
#[derive(Clone, Copy)]
pub struct TypeList<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) def_index: u32,
    pub(crate) outputs: bool,
}

impl<'a> TypeList<'a> {
    /// The fused paren pair.
    pub fn parens(self) -> Token<'a> {
        self.file.token(self.data().parens)
    }

    pub fn len(self) -> usize {
        self.data().types.len()
    }

    pub fn is_empty(self) -> bool {
        self.data().types.is_empty()
    }

    pub fn get(self, n: usize) -> TypeAny<'a> {
        TypeAny {
            file: self.file,
            raw: self.data().types[n],
        }
    }

    /// The comma after entry `n`; zero when the separator is missing.
    pub fn comma(self, n: usize) -> Token<'a> {
        self.file.token(self.data().commas[n])
    }

    pub fn iter(self) -> impl Iterator<Item = TypeAny<'a>> {
        (0..self.len()).map(move |n| self.get(n))
    }

    fn data(self) -> &'a super::TypeListData {
        let signature = self.file.arenas.defs[self.def_index as usize]
            .signature
            .as_ref()
            .expect("signature views exist only for defs that have one");
        if self.outputs {
            &signature.outputs
        } else {
            &signature.inputs
        }
    }
}

/// A classified `message` definition.
#[derive(Clone, Copy)]
pub struct DefMessage<'a> {
    pub keyword: Token<'a>,
    pub name: Path<'a>,
    pub body: Body<'a>,
    pub options: CompactOptions<'a>,
    pub semicolon: Token<'a>,
}

/// A classified `enum` definition.
#[derive(Clone, Copy)]
pub struct DefEnum<'a> {
    pub keyword: Token<'a>,
    pub name: Path<'a>,
    pub body: Body<'a>,
    pub options: CompactOptions<'a>,
    pub semicolon: Token<'a>,
}

/// A classified `service` definition.
#[derive(Clone, Copy)]
pub struct DefService<'a> {
    pub keyword: Token<'a>,
    pub name: Path<'a>,
    pub body: Body<'a>,
    pub options: CompactOptions<'a>,
    pub semicolon: Token<'a>,
}

/// A classified `extend` block.
#[derive(Clone, Copy)]
pub struct DefExtend<'a> {
    pub keyword: Token<'a>,
    pub extendee: Path<'a>,
    pub body: Body<'a>,
    pub semicolon: Token<'a>,
}

/// A classified `oneof` block.
#[derive(Clone, Copy)]
pub struct DefOneof<'a> {
    pub keyword: Token<'a>,
    pub name: Path<'a>,
    pub body: Body<'a>,
    pub options: CompactOptions<'a>,
    pub semicolon: Token<'a>,
}

/// A classified field.
#[derive(Clone, Copy)]
pub struct DefField<'a> {
    pub ty: TypeAny<'a>,
    pub name: Path<'a>,
    pub equals: Token<'a>,
    pub tag: ExprAny<'a>,
    pub options: CompactOptions<'a>,
    pub semicolon: Token<'a>,
}

/// A classified enum value.
#[derive(Clone, Copy)]
pub struct DefEnumValue<'a> {
    pub name: Path<'a>,
    pub equals: Token<'a>,
    pub value: ExprAny<'a>,
    pub options: CompactOptions<'a>,
    pub semicolon: Token<'a>,
}

/// A classified `group` definition.
#[derive(Clone, Copy)]
pub struct DefGroup<'a> {
    pub keyword: Token<'a>,
    pub name: Path<'a>,
    pub equals: Token<'a>,
    pub tag: ExprAny<'a>,
    pub body: Body<'a>,
    pub options: CompactOptions<'a>,
}

/// A classified `rpc` method.
#[derive(Clone, Copy)]
pub struct DefMethod<'a> {
    pub keyword: Token<'a>,
    pub name: Path<'a>,
    pub signature: Option<Signature<'a>>,
    pub body: Body<'a>,
    pub semicolon: Token<'a>,
}

/// A classified `option` setting.
#[derive(Clone, Copy)]
pub struct DefOption<'a> {
    pub keyword: Token<'a>,
    pub path: Path<'a>,
    pub equals: Token<'a>,
    pub value: ExprAny<'a>,
    pub semicolon: Token<'a>,
}
