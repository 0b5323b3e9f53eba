//! The per-file token stream.

use indexmap::IndexMap;
use prosit_core::source::{File, Span};

use super::cursor::Cursor;
use super::kind::{Keyword, TokenKind};
use super::TokenId;

/// A natural token's packed record: 12 bytes, `Copy`.
///
/// The start offset is implicit (the previous record's end). `mate` is 0 for
/// a leaf, positive on a fused open (offset to its close), negative on a
/// fused close (offset back to its open).
#[derive(Debug, Clone, Copy)]
struct NatToken {
    end: u32,
    mate: i32,
    kind: TokenKind,
    keyword: Keyword,
}

/// A synthetic token: owns its text, has no byte span.
#[derive(Debug)]
struct SynthToken {
    text: String,
    kind: TokenKind,
    keyword: Keyword,
    mate: TokenId,
    /// True on the endpoint that owns the child list.
    open: bool,
    children: Vec<TokenId>,
}

/// One decoded escape sequence inside a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escape {
    /// Byte range of the escape sequence (backslash included).
    pub start: u32,
    pub end: u32,
    pub value: EscapeValue,
}

/// What an escape decodes to: a raw byte or a Unicode scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeValue {
    Byte(u8),
    Rune(char),
}

/// Sparse side metadata for tokens whose decoded value would be expensive or
/// lossy to re-derive from the text. Decimal integers and trivially-quoted
/// strings never appear here.
#[derive(Debug)]
pub(crate) enum TokenMeta {
    Int(u64),
    Float(f64),
    String {
        decoded: Box<[u8]>,
        escapes: Vec<Escape>,
    },
}

/// The compact per-file token array, plus minted synthetic tokens.
#[derive(Debug)]
pub struct TokenStream {
    file: File,
    nats: Vec<NatToken>,
    synths: Vec<SynthToken>,
    meta: IndexMap<TokenId, TokenMeta>,
    frozen: bool,
}

impl TokenStream {
    /// An empty, unfrozen stream over `file`.
    pub fn new(file: File) -> TokenStream {
        TokenStream {
            file,
            nats: Vec::new(),
            synths: Vec::new(),
            meta: IndexMap::new(),
            frozen: false,
        }
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Number of natural tokens.
    pub fn natural_count(&self) -> usize {
        self.nats.len()
    }

    /// Appends the next natural token, covering `len` bytes after the
    /// previous token's end. Identifier and punctuation text is classified
    /// into the keyword enumeration here.
    ///
    /// # Panics
    /// Panics if the stream is frozen, `len` is zero or overflows `i32`, or
    /// the token would extend past end-of-file.
    pub fn push(&mut self, len: usize, kind: TokenKind) -> TokenId {
        assert!(!self.frozen, "cannot push natural tokens onto a frozen stream");
        assert!(len > 0, "natural tokens cannot be empty");
        assert!(len <= i32::MAX as usize, "token length overflows");
        let start = self.end_offset();
        let end = start + len;
        assert!(
            end <= self.file.len(),
            "token {start}..{end} extends past end of file (len {})",
            self.file.len()
        );

        let keyword = match kind {
            TokenKind::Ident | TokenKind::Punct => {
                Keyword::classify(&self.file.text()[start..end])
            }
            _ => Keyword::Unknown,
        };
        self.nats.push(NatToken {
            end: end as u32,
            mate: 0,
            kind,
            keyword,
        });
        TokenId::from_nat_index(self.nats.len() - 1)
    }

    /// Marks two previously pushed natural leaves as a matched pair.
    ///
    /// # Panics
    /// Panics if the stream is frozen, either token is synthetic or not a
    /// leaf, or `open` does not strictly precede `close`.
    pub fn fuse(&mut self, open: TokenId, close: TokenId) {
        assert!(!self.frozen, "cannot fuse tokens in a frozen stream");
        assert!(
            open.is_natural() && close.is_natural(),
            "only natural tokens can be fused here"
        );
        let (o, c) = (open.nat_index(), close.nat_index());
        assert!(o < c, "open must strictly precede close");
        assert!(c < self.nats.len(), "close token out of range");
        assert!(
            self.nats[o].mate == 0 && self.nats[c].mate == 0,
            "tokens are already fused"
        );

        let delta = (c - o) as i32;
        self.nats[o].mate = delta;
        self.nats[c].mate = -delta;
        if let Some(fused) = self.nats[o].keyword.fused() {
            self.nats[o].keyword = fused;
            self.nats[c].keyword = fused;
        }
    }

    /// Irreversibly freezes the natural tokens. Synthetic minting stays
    /// available.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Mints a synthetic identifier leaf.
    pub fn new_ident(&mut self, text: impl Into<String>) -> TokenId {
        let text = text.into();
        let keyword = Keyword::classify(&text);
        self.push_synth(text, TokenKind::Ident, keyword)
    }

    /// Mints a synthetic punctuation leaf.
    pub fn new_punct(&mut self, text: impl Into<String>) -> TokenId {
        let text = text.into();
        let keyword = Keyword::classify(&text);
        self.push_synth(text, TokenKind::Punct, keyword)
    }

    /// Mints a synthetic string leaf; `text` is the decoded value, not a
    /// quoted source form.
    pub fn new_string(&mut self, text: impl Into<String>) -> TokenId {
        self.push_synth(text.into(), TokenKind::String, Keyword::Unknown)
    }

    /// Wires two synthetic leaves into a delimiter pair with an explicit
    /// child sequence.
    ///
    /// # Panics
    /// Panics if either endpoint is natural or already part of a pair.
    pub fn new_fused(
        &mut self,
        open: TokenId,
        close: TokenId,
        children: impl IntoIterator<Item = TokenId>,
    ) {
        assert!(
            open.is_synthetic() && close.is_synthetic(),
            "fused pairs minted here must join synthetic tokens"
        );
        let (o, c) = (open.synth_index(), close.synth_index());
        assert!(o < self.synths.len() && c < self.synths.len(), "token out of range");
        assert!(
            self.synths[o].mate.is_zero() && self.synths[c].mate.is_zero(),
            "tokens are already fused"
        );
        let children: Vec<TokenId> = children.into_iter().collect();
        for &child in &children {
            self.check_owned(child);
        }
        self.synths[o].mate = close;
        self.synths[c].mate = open;
        self.synths[o].open = true;
        self.synths[o].children = children;
        if let Some(fused) = self.synths[o].keyword.fused() {
            self.synths[o].keyword = fused;
            self.synths[c].keyword = fused;
        }
    }

    /// Materializes a token view. The zero id yields the zero token.
    pub fn token(&self, id: TokenId) -> Token<'_> {
        self.check_owned(id);
        Token { stream: self, id }
    }

    /// Cursor over the whole natural stream.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::over_naturals(self, 0, self.nats.len())
    }

    /// The natural tokens on either side of a byte offset.
    ///
    /// Between two tokens both are returned; interior to a token, that token
    /// is returned twice; at the stream boundaries the missing side is the
    /// zero token.
    pub fn around(&self, offset: usize) -> (Token<'_>, Token<'_>) {
        let zero = Token { stream: self, id: TokenId::ZERO };
        if self.nats.is_empty() {
            return (zero, zero);
        }
        // first token whose end is past the offset
        let idx = self.nats.partition_point(|t| (t.end as usize) <= offset);
        if idx == self.nats.len() {
            return (self.token(TokenId::from_nat_index(idx - 1)), zero);
        }
        let start = self.nat_start(idx);
        if offset == start {
            let before = if idx == 0 {
                zero
            } else {
                self.token(TokenId::from_nat_index(idx - 1))
            };
            return (before, self.token(TokenId::from_nat_index(idx)));
        }
        let inside = self.token(TokenId::from_nat_index(idx));
        (inside, inside)
    }

    /// End offset of the last natural token; 0 for an empty stream.
    pub fn end_offset(&self) -> usize {
        self.nats.last().map_or(0, |t| t.end as usize)
    }

    pub(crate) fn set_meta(&mut self, id: TokenId, meta: TokenMeta) {
        self.meta.insert(id, meta);
    }

    pub(crate) fn meta(&self, id: TokenId) -> Option<&TokenMeta> {
        self.meta.get(&id)
    }

    pub(crate) fn nat_start(&self, index: usize) -> usize {
        if index == 0 {
            0
        } else {
            self.nats[index - 1].end as usize
        }
    }

    pub(crate) fn nat_len(&self) -> usize {
        self.nats.len()
    }

    pub(crate) fn synth_children(&self, index: usize) -> &[TokenId] {
        &self.synths[index].children
    }

    /// Signed delta of a natural record; 0 leaf, >0 open, <0 close.
    pub(crate) fn nat_mate(&self, index: usize) -> i32 {
        self.nats[index].mate
    }

    /// Panics on ids minted by another stream (or corrupted ids).
    pub(crate) fn check_owned(&self, id: TokenId) {
        if id.is_natural() {
            assert!(id.nat_index() < self.nats.len(), "token id from another stream");
        } else if id.is_synthetic() {
            assert!(id.synth_index() < self.synths.len(), "token id from another stream");
        }
    }

    fn push_synth(&mut self, text: String, kind: TokenKind, keyword: Keyword) -> TokenId {
        self.synths.push(SynthToken {
            text,
            kind,
            keyword,
            mate: TokenId::ZERO,
            open: false,
            children: Vec::new(),
        });
        TokenId::from_synth_index(self.synths.len() - 1)
    }
}

/// A token view: a stream reference plus an id, passed by value.
///
/// The zero token answers every query with an empty default, so callers can
/// probe optional slots without branching.
#[derive(Clone, Copy)]
pub struct Token<'a> {
    stream: &'a TokenStream,
    id: TokenId,
}

impl<'a> Token<'a> {
    pub fn id(self) -> TokenId {
        self.id
    }

    pub fn is_zero(self) -> bool {
        self.id.is_zero()
    }

    pub fn is_synthetic(self) -> bool {
        self.id.is_synthetic()
    }

    pub fn kind(self) -> TokenKind {
        if self.id.is_natural() {
            self.stream.nats[self.id.nat_index()].kind
        } else if self.id.is_synthetic() {
            self.stream.synths[self.id.synth_index()].kind
        } else {
            TokenKind::Unrecognized
        }
    }

    pub fn keyword(self) -> Keyword {
        if self.id.is_natural() {
            self.stream.nats[self.id.nat_index()].keyword
        } else if self.id.is_synthetic() {
            self.stream.synths[self.id.synth_index()].keyword
        } else {
            Keyword::Unknown
        }
    }

    /// Source text of a natural token, or the stored text of a synthetic
    /// one. Empty for the zero token.
    pub fn text(self) -> &'a str {
        if self.id.is_natural() {
            let index = self.id.nat_index();
            let start = self.stream.nat_start(index);
            let end = self.stream.nats[index].end as usize;
            &self.stream.file.text()[start..end]
        } else if self.id.is_synthetic() {
            &self.stream.synths[self.id.synth_index()].text
        } else {
            ""
        }
    }

    /// Byte span of a natural token; the zero span for synthetic and absent
    /// tokens.
    pub fn span(self) -> Span {
        if self.id.is_natural() {
            let index = self.id.nat_index();
            let start = self.stream.nat_start(index);
            let end = self.stream.nats[index].end as usize;
            self.stream.file.span(start, end)
        } else {
            Span::zero()
        }
    }

    pub fn is_leaf(self) -> bool {
        !self.is_zero() && self.mate_id().is_zero()
    }

    pub fn is_open(self) -> bool {
        if self.id.is_natural() {
            self.stream.nats[self.id.nat_index()].mate > 0
        } else if self.id.is_synthetic() {
            self.stream.synths[self.id.synth_index()].open
        } else {
            false
        }
    }

    pub fn is_close(self) -> bool {
        !self.is_zero() && !self.is_leaf() && !self.is_open()
    }

    /// The matching delimiter of a fused pair; the zero token for leaves.
    pub fn mate(self) -> Token<'a> {
        Token {
            stream: self.stream,
            id: self.mate_id(),
        }
    }

    /// Cursor over the children of a fused pair, from either endpoint.
    pub fn children(self) -> Option<Cursor<'a>> {
        if self.is_leaf() || self.is_zero() {
            return None;
        }
        if self.id.is_natural() {
            let index = self.id.nat_index();
            let mate = self.stream.nats[index].mate;
            let (open, close) = if mate > 0 {
                (index, (index as i64 + mate as i64) as usize)
            } else {
                ((index as i64 + mate as i64) as usize, index)
            };
            Some(Cursor::over_naturals(self.stream, open + 1, close))
        } else {
            let open = if self.is_open() { self.id } else { self.mate_id() };
            Some(Cursor::over_children(
                self.stream,
                self.stream.synth_children(open.synth_index()),
            ))
        }
    }

    /// Decoded integer value of a number token, when it is exactly
    /// representable as a `u64`.
    pub fn int(self) -> Option<u64> {
        if self.kind() != TokenKind::Number {
            return None;
        }
        match self.stream.meta(self.id) {
            Some(TokenMeta::Int(v)) => Some(*v),
            Some(TokenMeta::Float(f)) => {
                // u64::MAX as f64 rounds up to 2^64, so the bound is strict
                if !(*f >= 0.0 && *f < u64::MAX as f64) {
                    return None;
                }
                let v = *f as u64;
                (v as f64 == *f).then_some(v)
            }
            Some(TokenMeta::String { .. }) => None,
            // the common case: plain decimal integers are re-parsed on demand
            None => self.text().parse::<u64>().ok(),
        }
    }

    /// Decoded floating-point value of a number token, when the conversion
    /// is exact.
    pub fn float(self) -> Option<f64> {
        if self.kind() != TokenKind::Number {
            return None;
        }
        match self.stream.meta(self.id) {
            Some(TokenMeta::Float(f)) => Some(*f),
            Some(TokenMeta::Int(v)) => {
                let f = *v as f64;
                (f as u64 == *v).then_some(f)
            }
            Some(TokenMeta::String { .. }) => None,
            None => {
                let v = self.text().parse::<u64>().ok()?;
                let f = v as f64;
                (f as u64 == v).then_some(f)
            }
        }
    }

    /// Decoded bytes of a string token. Escapes and implicit concatenation
    /// come from side metadata; trivially-quoted strings are sliced straight
    /// out of the source.
    pub fn decoded_string(self) -> Option<&'a [u8]> {
        if self.kind() != TokenKind::String {
            return None;
        }
        if let Some(TokenMeta::String { decoded, .. }) = self.stream.meta(self.id) {
            return Some(decoded);
        }
        if self.id.is_synthetic() {
            return Some(self.text().as_bytes());
        }
        Some(strip_quotes(self.text()).as_bytes())
    }

    /// Escape sequences recorded for a string token, in source order.
    pub fn escapes(self) -> &'a [Escape] {
        match self.stream.meta(self.id) {
            Some(TokenMeta::String { escapes, .. }) => escapes,
            _ => &[],
        }
    }

    fn mate_id(self) -> TokenId {
        if self.id.is_natural() {
            let index = self.id.nat_index();
            let mate = self.stream.nats[index].mate;
            if mate == 0 {
                TokenId::ZERO
            } else {
                TokenId::from_nat_index((index as i64 + mate as i64) as usize)
            }
        } else if self.id.is_synthetic() {
            self.stream.synths[self.id.synth_index()].mate
        } else {
            TokenId::ZERO
        }
    }

    pub(crate) fn stream(self) -> &'a TokenStream {
        self.stream
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.stream, other.stream) && self.id == other.id
    }
}

impl Eq for Token<'_> {}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "Token(zero)");
        }
        write!(f, "Token({:?}, {:?} {:?})", self.id, self.kind(), self.text())
    }
}

/// Strips matching quotes (single, double, or triple) from a terminated
/// string literal's source text.
fn strip_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    let Some(&quote) = bytes.first() else {
        return text;
    };
    if quote != b'"' && quote != b'\'' {
        return text;
    }
    let q = if bytes.len() >= 6 && bytes[..3].iter().all(|&b| b == quote) {
        3
    } else {
        1
    };
    let body = &text[q..];
    let end = body.len().saturating_sub(q);
    &body[..end]
}
