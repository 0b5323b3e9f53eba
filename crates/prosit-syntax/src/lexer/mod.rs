//! The lexer.
//!
//! A single forward pass over the source text. Matched delimiters are fused
//! as they close; adjacent string literals are fused into a single tree after
//! the main pass; the stream is frozen before it is returned. Lexical errors
//! never stop the scan: the offending bytes always land in some token so that
//! every byte of the file stays covered.

mod numbers;
mod strings;

#[cfg(test)]
mod lexer_tests;

use prosit_core::report::{Report, tags};
use prosit_core::source::File;

use crate::token::{TokenId, TokenKind, TokenMeta, TokenStream};

/// Tokenizes `file` into a frozen stream, reporting lexical errors.
pub fn lex(file: &File, report: &mut Report) -> TokenStream {
    Lexer {
        file: file.clone(),
        stream: TokenStream::new(file.clone()),
        report,
        pos: 0,
        opens: Vec::new(),
    }
    .run()
}

pub(crate) struct Lexer<'r> {
    pub(super) file: File,
    pub(super) stream: TokenStream,
    pub(super) report: &'r mut Report,
    pub(super) pos: usize,
    opens: Vec<TokenId>,
}

impl Lexer<'_> {
    fn run(mut self) -> TokenStream {
        while self.pos < self.file.len() {
            let c = self.char_at(self.pos);
            match c {
                _ if c.is_whitespace() => self.lex_space(),
                '/' if self.starts_with("//") => self.lex_line_comment(),
                '/' if self.starts_with("/*") => self.lex_block_comment(),
                '*' if self.starts_with("*/") => self.lex_stray_comment_close(),
                ';' | ',' | '/' | ':' | '=' | '-' => {
                    self.push_token(1, TokenKind::Punct);
                }
                '.' => self.lex_dot(),
                '(' | '[' | '{' | '<' => self.lex_open(),
                ')' | ']' | '}' | '>' => self.lex_close(),
                '"' | '\'' => self.lex_string(),
                '0'..='9' => self.lex_number(),
                _ if is_ident_start(c) => self.lex_ident(),
                _ => self.lex_unrecognized(),
            }
        }
        self.diagnose_unclosed();
        self.concat_strings();
        self.stream.freeze();
        self.stream
    }

    pub(super) fn char_at(&self, pos: usize) -> char {
        self.file.text()[pos..].chars().next().unwrap_or('\0')
    }

    pub(super) fn starts_with(&self, prefix: &str) -> bool {
        self.file.text()[self.pos..].starts_with(prefix)
    }

    pub(super) fn push_token(&mut self, len: usize, kind: TokenKind) -> TokenId {
        let id = self.stream.push(len, kind);
        self.pos += len;
        id
    }

    fn lex_space(&mut self) {
        let file = self.file.clone();
        let text = file.text();
        let mut end = self.pos;
        while end < text.len() {
            let c = text[end..].chars().next().unwrap();
            if !c.is_whitespace() {
                break;
            }
            end += c.len_utf8();
        }
        self.push_token(end - self.pos, TokenKind::Space);
    }

    fn lex_line_comment(&mut self) {
        let rest = &self.file.text()[self.pos..];
        let len = match rest.find('\n') {
            Some(i) => i + 1,
            None => rest.len(),
        };
        self.push_token(len, TokenKind::Comment);
    }

    fn lex_block_comment(&mut self) {
        let file = self.file.clone();
        let rest = &file.text()[self.pos..];
        match rest[2..].find("*/") {
            Some(i) => {
                self.push_token(2 + i + 2, TokenKind::Comment);
            }
            None => {
                self.report
                    .error("unterminated block comment")
                    .snippet(file.span(self.pos, self.pos + 2), "comment opened here")
                    .tag(tags::UNTERMINATED_BLOCK_COMMENT)
                    .emit();
                self.push_token(rest.len(), TokenKind::Comment);
            }
        }
    }

    fn lex_stray_comment_close(&mut self) {
        let file = self.file.clone();
        let span = file.span(self.pos, self.pos + 2);
        self.report
            .error("Protobuf does not permit nested block comments")
            .snippet(span, "this closes nothing")
            .tag(tags::UNRECOGNIZED_TOKEN)
            .emit();
        self.push_token(2, TokenKind::Unrecognized);
    }

    fn lex_dot(&mut self) {
        if self.char_at(self.pos + 1).is_ascii_digit() {
            self.lex_number();
        } else {
            self.push_token(1, TokenKind::Punct);
        }
    }

    fn lex_open(&mut self) {
        let id = self.push_token(1, TokenKind::Punct);
        self.opens.push(id);
    }

    fn lex_close(&mut self) {
        let id = self.push_token(1, TokenKind::Punct);
        match self.opens.pop() {
            // fused regardless of shape; the parser diagnoses `(]` pairs
            Some(open) => self.stream.fuse(open, id),
            None => {
                let token = self.stream.token(id);
                let text = token.text().to_string();
                let span = token.span();
                self.report
                    .error("unexpected closing delimiter")
                    .snippet(span, format!("`{text}` has no matching open delimiter"))
                    .tag(tags::UNOPENED_DELIMITER)
                    .emit();
            }
        }
    }

    fn lex_ident(&mut self) {
        let file = self.file.clone();
        let text = file.text();
        let mut end = self.pos;
        let mut non_ascii: Option<(usize, char)> = None;
        while end < text.len() {
            let c = text[end..].chars().next().unwrap();
            if !is_ident_continue(c) {
                break;
            }
            if !c.is_ascii() && non_ascii.is_none() {
                non_ascii = Some((end, c));
            }
            end += c.len_utf8();
        }
        if let Some((at, c)) = non_ascii {
            self.report
                .error("non-ASCII character in identifier")
                .snippet(
                    file.span(at, at + c.len_utf8()),
                    "identifiers must be ASCII",
                )
                .tag(tags::NON_ASCII_IDENT)
                .emit();
        }
        self.push_token(end - self.pos, TokenKind::Ident);
    }

    fn lex_unrecognized(&mut self) {
        let file = self.file.clone();
        let text = file.text();
        let start = self.pos;
        let mut end = start;
        while end < text.len() && !self.is_token_start(end) {
            end += text[end..].chars().next().unwrap().len_utf8();
        }
        let span = file.span(start, end);
        self.report
            .error(format!("unrecognized token `{}`", span.text()))
            .snippet(span.clone(), "not valid protobuf syntax")
            .tag(tags::UNRECOGNIZED_TOKEN)
            .emit();
        self.push_token(end - start, TokenKind::Unrecognized);
    }

    /// Whether a recognized token class starts at `pos`. Used to end
    /// unrecognized runs, which coalesce into a single token.
    fn is_token_start(&self, pos: usize) -> bool {
        let c = self.char_at(pos);
        c.is_whitespace()
            || is_ident_start(c)
            || c.is_ascii_digit()
            || matches!(
                c,
                '.' | '/' | ';' | ',' | ':' | '=' | '-' | '(' | ')' | '[' | ']' | '{' | '}'
                    | '<' | '>' | '"' | '\''
            )
            || (c == '*' && self.char_at(pos + 1) == '/')
    }

    fn diagnose_unclosed(&mut self) {
        for id in std::mem::take(&mut self.opens) {
            let token = self.stream.token(id);
            let text = token.text().to_string();
            let span = token.span();
            self.report
                .error("unclosed delimiter")
                .snippet(span, format!("`{text}` is never closed"))
                .tag(tags::UNCLOSED_DELIMITER)
                .emit();
        }
    }

    /// Fuses runs of adjacent string literals (separated only by skippable
    /// tokens) into a single string tree carrying the concatenated value.
    fn concat_strings(&mut self) {
        let mut runs: Vec<(usize, usize)> = Vec::new();
        let n = self.stream.nat_len();
        let mut i = 0;
        while i < n {
            let tok = self.stream.token(TokenId::from_nat_index(i));
            if tok.kind() != TokenKind::String || !tok.is_leaf() {
                i += 1;
                continue;
            }
            let mut last = i;
            let mut j = i + 1;
            while j < n {
                let next = self.stream.token(TokenId::from_nat_index(j));
                if next.kind().is_skippable() {
                    j += 1;
                } else if next.kind() == TokenKind::String && next.is_leaf() {
                    last = j;
                    j += 1;
                } else {
                    break;
                }
            }
            if last > i {
                runs.push((i, last));
            }
            i = j.max(i + 1);
        }

        for (a, b) in runs {
            let mut decoded: Vec<u8> = Vec::new();
            for k in a..=b {
                let tok = self.stream.token(TokenId::from_nat_index(k));
                if tok.kind() == TokenKind::String {
                    decoded.extend_from_slice(tok.decoded_string().unwrap_or_default());
                }
            }
            let open = TokenId::from_nat_index(a);
            let close = TokenId::from_nat_index(b);
            self.stream.fuse(open, close);
            let escapes = match self.stream.meta(open) {
                Some(TokenMeta::String { escapes, .. }) => escapes.clone(),
                _ => Vec::new(),
            };
            self.stream.set_meta(
                open,
                TokenMeta::String {
                    decoded: decoded.into_boxed_slice(),
                    escapes,
                },
            );
        }
    }
}

pub(super) fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub(super) fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
