//! Tokens and the per-file token stream.
//!
//! Tokens come in two flavors. *Natural* tokens are produced by the lexer and
//! pack into a small fixed-size record: an end offset (the start is the
//! previous token's end), a kind, a keyword classification, and a signed
//! offset linking fused delimiter pairs. *Synthetic* tokens are minted
//! programmatically for rewriting; they carry their own text and have no byte
//! span.
//!
//! Token identifiers are small integers: positive ids index the natural
//! array, negative ids (bitwise-NOT encoded) index the synthetic array, and
//! zero means "no token".

pub mod cursor;
mod kind;
mod stream;

#[cfg(test)]
mod stream_tests;

pub use cursor::{Cursor, Mark, Rest};
pub use kind::{Keyword, TokenKind};
pub use stream::{Escape, EscapeValue, Token, TokenStream};

pub(crate) use stream::TokenMeta;

/// Identifier of a token within one stream.
///
/// The zero id is reserved for "no token". Natural and synthetic ids have
/// opposite signs, an invariant the AST's packed representation relies on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct TokenId(i32);

impl TokenId {
    /// The absent token.
    pub const ZERO: TokenId = TokenId(0);

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_natural(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn is_synthetic(self) -> bool {
        self.0 < 0
    }

    /// Raw signed value, for packed storage.
    #[inline]
    pub fn get(self) -> i32 {
        self.0
    }

    /// Rebuilds an id from its raw signed value.
    #[inline]
    pub fn from_raw(raw: i32) -> TokenId {
        TokenId(raw)
    }

    #[inline]
    pub(crate) fn from_nat_index(index: usize) -> TokenId {
        TokenId(index as i32 + 1)
    }

    #[inline]
    pub(crate) fn from_synth_index(index: usize) -> TokenId {
        TokenId(!(index as i32))
    }

    #[inline]
    pub(crate) fn nat_index(self) -> usize {
        debug_assert!(self.is_natural());
        (self.0 - 1) as usize
    }

    #[inline]
    pub(crate) fn synth_index(self) -> usize {
        debug_assert!(self.is_synthetic());
        !self.0 as usize
    }
}
