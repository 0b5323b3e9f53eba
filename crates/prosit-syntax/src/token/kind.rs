//! Token kinds and keyword classification.

use std::fmt;

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[repr(u8)]
pub enum TokenKind {
    /// Bytes the lexer could not recognize. Kept in the stream so every
    /// byte of the file remains covered by some token.
    Unrecognized = 0,
    Space,
    Comment,
    Ident,
    String,
    Number,
    Punct,
}

impl TokenKind {
    /// Skippable tokens are invisible to syntactic analysis; cursors step
    /// over them unless asked not to.
    #[inline]
    pub fn is_skippable(self) -> bool {
        matches!(
            self,
            TokenKind::Unrecognized | TokenKind::Space | TokenKind::Comment
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Unrecognized => "unrecognized",
            TokenKind::Space => "space",
            TokenKind::Comment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Punct => "punctuation",
        };
        f.write_str(name)
    }
}

/// Classification of identifier and punctuation text, computed at lex time.
///
/// Protobuf keywords are contextual: `message` is a legal field name, so the
/// classification is a hint for the parser, never a separate token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(u8)]
pub enum Keyword {
    Unknown = 0,

    // declaration keywords
    Syntax,
    Edition,
    Package,
    Import,
    Public,
    Weak,
    Option,
    Message,
    Enum,
    Service,
    Rpc,
    Returns,
    Stream,
    Extend,
    Extensions,
    Reserved,
    Oneof,
    Map,
    Group,

    // modifier keywords
    Optional,
    Required,
    Repeated,

    // expression keywords
    To,
    Max,
    True,
    False,
    Inf,
    Nan,

    // punctuation
    Dot,
    Slash,
    Semi,
    Comma,
    Equals,
    Minus,
    Colon,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    AngleOpen,
    AngleClose,

    // fused delimiter pairs
    Parens,
    Brackets,
    Braces,
    Angles,
}

impl Keyword {
    /// Looks up the classification for identifier or punctuation text.
    pub fn classify(text: &str) -> Keyword {
        match text {
            "syntax" => Keyword::Syntax,
            "edition" => Keyword::Edition,
            "package" => Keyword::Package,
            "import" => Keyword::Import,
            "public" => Keyword::Public,
            "weak" => Keyword::Weak,
            "option" => Keyword::Option,
            "message" => Keyword::Message,
            "enum" => Keyword::Enum,
            "service" => Keyword::Service,
            "rpc" => Keyword::Rpc,
            "returns" => Keyword::Returns,
            "stream" => Keyword::Stream,
            "extend" => Keyword::Extend,
            "extensions" => Keyword::Extensions,
            "reserved" => Keyword::Reserved,
            "oneof" => Keyword::Oneof,
            "map" => Keyword::Map,
            "group" => Keyword::Group,
            "optional" => Keyword::Optional,
            "required" => Keyword::Required,
            "repeated" => Keyword::Repeated,
            "to" => Keyword::To,
            "max" => Keyword::Max,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "inf" => Keyword::Inf,
            "nan" => Keyword::Nan,
            "." => Keyword::Dot,
            "/" => Keyword::Slash,
            ";" => Keyword::Semi,
            "," => Keyword::Comma,
            "=" => Keyword::Equals,
            "-" => Keyword::Minus,
            ":" => Keyword::Colon,
            "(" => Keyword::ParenOpen,
            ")" => Keyword::ParenClose,
            "[" => Keyword::BracketOpen,
            "]" => Keyword::BracketClose,
            "{" => Keyword::BraceOpen,
            "}" => Keyword::BraceClose,
            "<" => Keyword::AngleOpen,
            ">" => Keyword::AngleClose,
            _ => Keyword::Unknown,
        }
    }

    /// The keyword's canonical spelling; empty for `Unknown` and the fused
    /// forms, which have no single-token spelling.
    pub fn text(self) -> &'static str {
        match self {
            Keyword::Unknown | Keyword::Parens | Keyword::Brackets | Keyword::Braces
            | Keyword::Angles => "",
            Keyword::Syntax => "syntax",
            Keyword::Edition => "edition",
            Keyword::Package => "package",
            Keyword::Import => "import",
            Keyword::Public => "public",
            Keyword::Weak => "weak",
            Keyword::Option => "option",
            Keyword::Message => "message",
            Keyword::Enum => "enum",
            Keyword::Service => "service",
            Keyword::Rpc => "rpc",
            Keyword::Returns => "returns",
            Keyword::Stream => "stream",
            Keyword::Extend => "extend",
            Keyword::Extensions => "extensions",
            Keyword::Reserved => "reserved",
            Keyword::Oneof => "oneof",
            Keyword::Map => "map",
            Keyword::Group => "group",
            Keyword::Optional => "optional",
            Keyword::Required => "required",
            Keyword::Repeated => "repeated",
            Keyword::To => "to",
            Keyword::Max => "max",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Inf => "inf",
            Keyword::Nan => "nan",
            Keyword::Dot => ".",
            Keyword::Slash => "/",
            Keyword::Semi => ";",
            Keyword::Comma => ",",
            Keyword::Equals => "=",
            Keyword::Minus => "-",
            Keyword::Colon => ":",
            Keyword::ParenOpen => "(",
            Keyword::ParenClose => ")",
            Keyword::BracketOpen => "[",
            Keyword::BracketClose => "]",
            Keyword::BraceOpen => "{",
            Keyword::BraceClose => "}",
            Keyword::AngleOpen => "<",
            Keyword::AngleClose => ">",
        }
    }

    /// Field modifiers (`optional`, `required`, `repeated`, `group`).
    #[inline]
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Keyword::Optional | Keyword::Required | Keyword::Repeated | Keyword::Group
        )
    }

    /// `.` or `/`, the path component separators.
    #[inline]
    pub fn is_path_separator(self) -> bool {
        matches!(self, Keyword::Dot | Keyword::Slash)
    }

    #[inline]
    pub fn is_open_delimiter(self) -> bool {
        matches!(
            self,
            Keyword::ParenOpen | Keyword::BracketOpen | Keyword::BraceOpen | Keyword::AngleOpen
        )
    }

    #[inline]
    pub fn is_close_delimiter(self) -> bool {
        matches!(
            self,
            Keyword::ParenClose | Keyword::BracketClose | Keyword::BraceClose | Keyword::AngleClose
        )
    }

    /// The close delimiter matching an open one.
    pub fn matching_close(self) -> Option<Keyword> {
        match self {
            Keyword::ParenOpen => Some(Keyword::ParenClose),
            Keyword::BracketOpen => Some(Keyword::BracketClose),
            Keyword::BraceOpen => Some(Keyword::BraceClose),
            Keyword::AngleOpen => Some(Keyword::AngleClose),
            _ => None,
        }
    }

    /// The fused form of a delimiter, open or close.
    pub fn fused(self) -> Option<Keyword> {
        match self {
            Keyword::ParenOpen | Keyword::ParenClose => Some(Keyword::Parens),
            Keyword::BracketOpen | Keyword::BracketClose => Some(Keyword::Brackets),
            Keyword::BraceOpen | Keyword::BraceClose => Some(Keyword::Braces),
            Keyword::AngleOpen | Keyword::AngleClose => Some(Keyword::Angles),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
