//! String literal scanning and escape decoding.

use prosit_core::report::{Edit, tags};
use prosit_core::source::File;

use super::Lexer;
use crate::token::{Escape, EscapeValue, TokenKind, TokenMeta};

impl Lexer<'_> {
    /// Scans a quoted string starting at the current position. The token
    /// includes its quotes; the decoded value and escape records go into
    /// side metadata when the text alone would not reproduce them.
    pub(super) fn lex_string(&mut self) {
        let file = self.file.clone();
        let text = file.text();
        let start = self.pos;
        let quote = self.char_at(start);

        let closer: String = if text[start..].starts_with(&quote.to_string().repeat(3)) {
            quote.to_string().repeat(3)
        } else {
            quote.to_string()
        };
        let q = closer.len();

        let mut i = start + q;
        let mut decoded: Vec<u8> = Vec::new();
        let mut escapes: Vec<Escape> = Vec::new();
        let mut had_escape = false;
        let mut terminated = false;

        while i < text.len() {
            if text[i..].starts_with(&closer) {
                i += q;
                terminated = true;
                break;
            }
            let c = text[i..].chars().next().unwrap();
            if c == '\\' {
                had_escape = true;
                i += self.decode_escape(&file, i, &mut decoded, &mut escapes);
                continue;
            }
            if c == '\0' {
                self.report
                    .error("NUL byte in string literal")
                    .snippet(file.span(i, i + 1), "NUL bytes must be escaped")
                    .suggest_edits(
                        file.span(i, i + 1),
                        "escape the NUL byte",
                        [Edit::new(i, i + 1, "\\0")],
                    )
                    .emit();
            } else if c.is_control() && !matches!(c, '\n' | '\r' | '\t') {
                let escaped = if (c as u32) <= 0xFF {
                    format!("\\x{:02X}", c as u32)
                } else {
                    format!("\\u{:04X}", c as u32)
                };
                self.report
                    .error("non-printable character in string literal")
                    .snippet(file.span(i, i + c.len_utf8()), "must be escaped")
                    .suggest_edits(
                        file.span(i, i + c.len_utf8()),
                        format!("use `{escaped}`"),
                        [Edit::new(i, i + c.len_utf8(), escaped.clone())],
                    )
                    .emit();
            }
            let mut buf = [0u8; 4];
            decoded.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            i += c.len_utf8();
        }

        if !terminated {
            let head = (start + 2).min(text.len());
            self.report
                .error("unterminated string literal")
                .snippet(file.span(start, head), "string opened here")
                .tag(tags::UNTERMINATED_STRING)
                .emit();
        }

        let id = self.push_token(i - start, TokenKind::String);
        if had_escape || !terminated {
            self.stream.set_meta(
                id,
                TokenMeta::String {
                    decoded: decoded.into_boxed_slice(),
                    escapes,
                },
            );
        }
    }

    /// Decodes one escape sequence at `at` (pointing at the backslash).
    /// Returns the number of bytes consumed; appends the decoded value and
    /// its record, or reports an invalid escape.
    fn decode_escape(
        &mut self,
        file: &File,
        at: usize,
        decoded: &mut Vec<u8>,
        escapes: &mut Vec<Escape>,
    ) -> usize {
        let text = file.text();
        let Some(c) = text[at + 1..].chars().next() else {
            // lone backslash at end of file; the unterminated diagnostic
            // covers it
            decoded.push(b'\\');
            return 1;
        };

        let simple = match c {
            'a' => Some(0x07u8),
            'b' => Some(0x08),
            'f' => Some(0x0C),
            'n' => Some(b'\n'),
            'r' => Some(b'\r'),
            't' => Some(b'\t'),
            'v' => Some(0x0B),
            '\\' => Some(b'\\'),
            '\'' => Some(b'\''),
            '"' => Some(b'"'),
            '?' => Some(b'?'),
            _ => None,
        };
        if let Some(byte) = simple {
            decoded.push(byte);
            escapes.push(Escape {
                start: at as u32,
                end: (at + 2) as u32,
                value: EscapeValue::Byte(byte),
            });
            return 2;
        }

        if c.is_digit(8) {
            let mut end = at + 1;
            let mut value = 0u32;
            while end < text.len() && end < at + 4 {
                let Some(d) = text[end..].chars().next().and_then(|c| c.to_digit(8)) else {
                    break;
                };
                value = value * 8 + d;
                end += 1;
            }
            if value > 0xFF {
                self.report
                    .error("invalid escape sequence in string literal")
                    .snippet(
                        file.span(at, end),
                        "octal escape value must be at most \\377",
                    )
                    .tag(tags::INVALID_ESCAPE)
                    .emit();
            }
            let byte = (value & 0xFF) as u8;
            decoded.push(byte);
            escapes.push(Escape {
                start: at as u32,
                end: end as u32,
                value: EscapeValue::Byte(byte),
            });
            return end - at;
        }

        if c == 'x' || c == 'X' {
            let mut end = at + 2;
            let mut value = 0u32;
            let mut digits = 0;
            while end < text.len() && digits < 2 {
                let Some(d) = text[end..].chars().next().and_then(|c| c.to_digit(16)) else {
                    break;
                };
                value = value * 16 + d;
                digits += 1;
                end += 1;
            }
            if digits == 0 {
                self.report
                    .error("invalid escape sequence in string literal")
                    .snippet(
                        file.span(at, at + 2),
                        format!("\\{c} must be followed by at least one hex digit"),
                    )
                    .tag(tags::INVALID_ESCAPE)
                    .emit();
                return 2;
            }
            let byte = value as u8;
            decoded.push(byte);
            escapes.push(Escape {
                start: at as u32,
                end: end as u32,
                value: EscapeValue::Byte(byte),
            });
            return end - at;
        }

        if c == 'u' || c == 'U' {
            let want = if c == 'u' { 4 } else { 8 };
            let mut end = at + 2;
            let mut value = 0u64;
            let mut digits = 0;
            while end < text.len() && digits < want {
                let Some(d) = text[end..].chars().next().and_then(|c| c.to_digit(16)) else {
                    break;
                };
                value = value * 16 + u64::from(d);
                digits += 1;
                end += 1;
            }
            if digits != want {
                self.report
                    .error("invalid escape sequence in string literal")
                    .snippet(
                        file.span(at, end),
                        format!("\\{c} must be followed by exactly {want} hex digits"),
                    )
                    .tag(tags::INVALID_ESCAPE)
                    .emit();
                return end - at;
            }
            let rune = u32::try_from(value).ok().and_then(char::from_u32);
            let Some(rune) = rune else {
                self.report
                    .error("invalid escape sequence in string literal")
                    .snippet(
                        file.span(at, end),
                        "escape value is not a valid Unicode code point",
                    )
                    .tag(tags::INVALID_ESCAPE)
                    .emit();
                return end - at;
            };
            let mut buf = [0u8; 4];
            decoded.extend_from_slice(rune.encode_utf8(&mut buf).as_bytes());
            escapes.push(Escape {
                start: at as u32,
                end: end as u32,
                value: EscapeValue::Rune(rune),
            });
            return end - at;
        }

        self.report
            .error("invalid escape sequence in string literal")
            .snippet(
                file.span(at, at + 1 + c.len_utf8()),
                format!("`\\{c}` is not a valid escape sequence"),
            )
            .tag(tags::INVALID_ESCAPE)
            .emit();
        let mut buf = [0u8; 4];
        decoded.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        1 + c.len_utf8()
    }
}
