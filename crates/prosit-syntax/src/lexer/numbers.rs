//! Numeric literal scanning and decoding.

use prosit_core::report::tags;
use prosit_core::source::{File, Span};

use super::Lexer;
use crate::token::{TokenId, TokenKind, TokenMeta};

impl Lexer<'_> {
    /// Greedily scans a numeric literal: digits, letters, underscores, dots,
    /// and a signed exponent. The raw text is kept whatever happens; only
    /// well-formed non-decimal values go into side metadata.
    pub(super) fn lex_number(&mut self) {
        let file = self.file.clone();
        let text = file.text();
        let start = self.pos;
        let is_hex = matches!(text[start..].as_bytes(), [b'0', b'x' | b'X', ..]);

        let mut end = start;
        let mut prev = 0u8;
        while end < text.len() {
            let c = text[end..].chars().next().unwrap();
            let take = c.is_ascii_alphanumeric()
                || c == '_'
                || c == '.'
                || (matches!(c, '+' | '-') && !is_hex && matches!(prev, b'e' | b'E'));
            if !take {
                break;
            }
            prev = if c.is_ascii() { c as u8 } else { 0 };
            end += c.len_utf8();
        }

        let id = self.push_token(end - start, TokenKind::Number);
        self.decode_number(&file, start, end, id);
    }

    fn decode_number(&mut self, file: &File, start: usize, end: usize, id: TokenId) {
        let text = &file.text()[start..end];
        let span = file.span(start, end);
        let separators = text.contains('_');

        if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            self.decode_radix(digits, 16, span, separators, id, tags::INVALID_HEX_LITERAL);
            return;
        }
        if let Some(digits) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
            self.decode_radix(digits, 2, span, separators, id, tags::INVALID_BIN_LITERAL);
            return;
        }
        if let Some(digits) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
            self.decode_radix(digits, 8, span, separators, id, tags::INVALID_OCT_LITERAL);
            return;
        }

        if text.bytes().all(|b| b.is_ascii_digit()) {
            if text.len() > 1 && text.starts_with('0') {
                // legacy octal
                self.decode_radix(&text[1..], 8, span, separators, id, tags::INVALID_OCT_LITERAL);
                return;
            }
            match text.parse::<u64>() {
                // the common case stays out of the metadata table; it is
                // re-parsed on demand
                Ok(_) => {}
                Err(_) => {
                    self.report
                        .error("integer literal out of range")
                        .snippet(span, "does not fit in an unsigned 64-bit integer")
                        .tag(tags::INTEGER_OVERFLOW)
                        .emit();
                    if let Ok(approx) = text.parse::<f64>() {
                        self.stream.set_meta(id, TokenMeta::Float(approx));
                    }
                }
            }
            return;
        }

        let float_like = text.contains('.')
            || text.contains('e')
            || text.contains('E')
            || text.ends_with('f')
            || text.ends_with('F');
        if float_like {
            let cleaned = text
                .strip_suffix('f')
                .or_else(|| text.strip_suffix('F'))
                .unwrap_or(text);
            match (!separators).then(|| cleaned.parse::<f64>().ok()).flatten() {
                Some(value) => {
                    self.stream.set_meta(id, TokenMeta::Float(value));
                }
                None => {
                    let mut diag = self
                        .report
                        .error("invalid floating-point literal")
                        .snippet(span, "cannot be parsed as a number")
                        .tag(tags::INVALID_FLOAT_LITERAL);
                    if separators {
                        diag = diag.note("digit separators (`_`) are not permitted");
                    }
                    diag.emit();
                }
            }
            return;
        }

        let mut diag = self
            .report
            .error("invalid decimal literal")
            .snippet(span, "cannot be parsed as a number")
            .tag(tags::INVALID_DEC_LITERAL);
        if separators {
            diag = diag.note("digit separators (`_`) are not permitted");
        }
        diag.emit();
    }

    fn decode_radix(
        &mut self,
        digits: &str,
        radix: u32,
        span: Span,
        separators: bool,
        id: TokenId,
        tag: &'static str,
    ) {
        let well_formed =
            !digits.is_empty() && !separators && digits.chars().all(|c| c.is_digit(radix));
        if !well_formed {
            let noun = match radix {
                2 => "binary",
                8 => "octal",
                16 => "hexadecimal",
                _ => "numeric",
            };
            let mut diag = self
                .report
                .error(format!("invalid {noun} literal"))
                .snippet(span, format!("cannot be parsed as a {noun} integer"))
                .tag(tag);
            if separators {
                diag = diag.note("digit separators (`_`) are not permitted");
            }
            diag.emit();
            return;
        }
        match u64::from_str_radix(digits, radix) {
            Ok(value) => {
                // non-decimal radices always materialize
                self.stream.set_meta(id, TokenMeta::Int(value));
            }
            Err(_) => {
                self.report
                    .error("integer literal out of range")
                    .snippet(span, "does not fit in an unsigned 64-bit integer")
                    .tag(tags::INTEGER_OVERFLOW)
                    .emit();
            }
        }
    }
}
