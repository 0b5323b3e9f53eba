use prosit_core::report::{Report, tags};
use prosit_core::source::File;

use super::lex;
use crate::token::{EscapeValue, Keyword, TokenId, TokenKind, TokenStream};

fn lex_text(text: &str) -> (TokenStream, Report) {
    let mut report = Report::new();
    let stream = lex(&File::new("test.proto", text), &mut report);
    check_invariants(text, &stream);
    (stream, report)
}

fn lex_clean(text: &str) -> TokenStream {
    let (stream, report) = lex_text(text);
    assert!(
        report.is_empty(),
        "unexpected diagnostics for {text:?}: {}",
        prosit_core::print::Printer::new().render(&report)
    );
    stream
}

/// Every lexed stream must cover the file exactly, with non-decreasing end
/// offsets and well-ordered fused pairs.
fn check_invariants(text: &str, stream: &TokenStream) {
    let mut covered = String::new();
    let mut last_end = 0;
    for i in 0..stream.natural_count() {
        let token = stream.token(TokenId::from_nat_index(i));
        let span = token.span();
        assert!(span.start() >= last_end || span.is_empty());
        assert_eq!(span.start(), last_end);
        last_end = span.end();
        covered.push_str(token.text());

        if token.is_open() {
            let close = token.mate();
            assert!(close.is_close());
            assert!(close.span().start() >= span.end());
            assert_eq!(close.mate(), token);
        }
    }
    assert_eq!(covered, text, "token texts must cover the file");
    if stream.natural_count() > 0 {
        assert_eq!(last_end, text.len());
    }

    // advancing over an open token lands just past its close
    for i in 0..stream.natural_count() {
        let token = stream.token(TokenId::from_nat_index(i));
        if !token.is_open() {
            continue;
        }
        let mut cursor = stream.cursor();
        cursor.seek(token.id());
        cursor.next_skippable();
        let close_index = token.mate().id().nat_index();
        match cursor.peek_skippable() {
            Some(after) => assert_eq!(after.id().nat_index(), close_index + 1),
            None => assert_eq!(close_index, stream.natural_count() - 1),
        }
    }
}

fn kinds(stream: &TokenStream) -> Vec<TokenKind> {
    (0..stream.natural_count())
        .map(|i| stream.token(TokenId::from_nat_index(i)).kind())
        .collect()
}

fn tags_of(report: &Report) -> Vec<&str> {
    report.iter().filter_map(|d| d.tag()).collect()
}

#[test]
fn empty_file_lexes_to_nothing() {
    let (stream, report) = lex_text("");
    assert_eq!(stream.natural_count(), 0);
    assert!(report.is_empty());
}

#[test]
fn syntax_declaration_tokens() {
    let stream = lex_clean("syntax = \"proto3\";\n");
    use TokenKind::*;
    assert_eq!(
        kinds(&stream),
        [Ident, Space, Punct, Space, String, Punct, Space]
    );
    let texts: Vec<_> = stream.cursor().rest().map(|t| t.text().to_string()).collect();
    assert_eq!(texts, ["syntax", "=", "\"proto3\"", ";"]);

    let mut cursor = stream.cursor();
    assert_eq!(cursor.next().unwrap().keyword(), Keyword::Syntax);
    assert_eq!(cursor.next().unwrap().keyword(), Keyword::Equals);
    assert_eq!(
        cursor.next().unwrap().decoded_string(),
        Some(&b"proto3"[..])
    );
    assert_eq!(cursor.next().unwrap().keyword(), Keyword::Semi);
}

#[test]
fn message_with_field_lexes_cleanly() {
    let stream = lex_clean("message M { int32 x = 1; }");
    let top: Vec<_> = stream.cursor().rest().map(|t| t.text().to_string()).collect();
    assert_eq!(top, ["message", "M", "{"]);

    let mut cursor = stream.cursor();
    cursor.next();
    cursor.next();
    let braces = cursor.next().unwrap();
    assert_eq!(braces.keyword(), Keyword::Braces);
    let inner: Vec<_> = braces
        .children()
        .unwrap()
        .rest()
        .map(|t| t.text().to_string())
        .collect();
    assert_eq!(inner, ["int32", "x", "=", "1", ";"]);
}

#[test]
fn mismatched_shapes_still_fuse() {
    let (stream, report) = lex_text("( ]");
    assert!(report.is_empty());
    let mut cursor = stream.cursor();
    let open = cursor.next().unwrap();
    assert!(open.is_open());
    assert_eq!(open.mate().text(), "]");
}

#[test]
fn unopened_delimiter_is_diagnosed() {
    let (stream, report) = lex_text(") x");
    assert_eq!(tags_of(&report), [tags::UNOPENED_DELIMITER]);
    let close = stream.token(TokenId::from_nat_index(0));
    assert!(close.is_leaf());
}

#[test]
fn unclosed_delimiter_points_at_the_opener() {
    let (stream, report) = lex_text("message M {");
    assert_eq!(tags_of(&report), [tags::UNCLOSED_DELIMITER]);
    let diag = report.iter().next().unwrap();
    let primary = diag.primary().unwrap();
    assert_eq!(primary.span.start(), 10);
    assert_eq!(primary.span.text(), "{");

    // the brace stays a leaf; its mate is the zero token
    let mut cursor = stream.cursor();
    cursor.next();
    cursor.next();
    let brace = cursor.next().unwrap();
    assert!(brace.is_leaf());
    assert!(brace.mate().is_zero());
}

#[test]
fn every_dangling_opener_is_diagnosed() {
    let (_, report) = lex_text("( {");
    assert_eq!(
        tags_of(&report),
        [tags::UNCLOSED_DELIMITER, tags::UNCLOSED_DELIMITER]
    );
}

#[test]
fn line_comments_include_their_newline() {
    let stream = lex_clean("x // note\ny");
    let comment = stream.token(TokenId::from_nat_index(2));
    assert_eq!(comment.kind(), TokenKind::Comment);
    assert_eq!(comment.text(), "// note\n");
}

#[test]
fn block_comments_lex_as_one_token() {
    let stream = lex_clean("x /* a\nb */ y");
    let comment = stream.token(TokenId::from_nat_index(2));
    assert_eq!(comment.kind(), TokenKind::Comment);
    assert_eq!(comment.text(), "/* a\nb */");
}

#[test]
fn unterminated_block_comment_runs_to_eof() {
    let (stream, report) = lex_text("x /* never closed");
    assert_eq!(tags_of(&report), [tags::UNTERMINATED_BLOCK_COMMENT]);
    let diag = report.iter().next().unwrap();
    assert_eq!(diag.primary().unwrap().span.text(), "/*");
    let comment = stream.token(TokenId::from_nat_index(2));
    assert_eq!(comment.text(), "/* never closed");
}

#[test]
fn stray_comment_close_is_an_error() {
    let (stream, report) = lex_text("*/");
    let diag = report.iter().next().unwrap();
    assert_eq!(
        diag.message(),
        "Protobuf does not permit nested block comments"
    );
    assert_eq!(
        stream.token(TokenId::from_nat_index(0)).kind(),
        TokenKind::Unrecognized
    );
}

#[test]
fn plain_strings_decode_without_metadata() {
    let stream = lex_clean("\"abc\" 'def'");
    let a = stream.token(TokenId::from_nat_index(0));
    assert_eq!(a.decoded_string(), Some(&b"abc"[..]));
    assert!(a.escapes().is_empty());
    let b = stream.token(TokenId::from_nat_index(2));
    assert_eq!(b.decoded_string(), Some(&b"def"[..]));
}

#[test]
fn escapes_decode_and_record_spans() {
    let stream = lex_clean(r#""a\nb\x41\101\u0041""#);
    let token = stream.token(TokenId::from_nat_index(0));
    assert_eq!(token.decoded_string(), Some(&b"a\nbAAA"[..]));
    let escapes = token.escapes();
    assert_eq!(escapes.len(), 4);
    assert_eq!((escapes[0].start, escapes[0].end), (2, 4));
    assert_eq!(escapes[0].value, EscapeValue::Byte(b'\n'));
    assert_eq!(escapes[1].value, EscapeValue::Byte(b'A'));
    assert_eq!((escapes[1].start, escapes[1].end), (5, 9));
    assert_eq!(escapes[2].value, EscapeValue::Byte(b'A'));
    assert_eq!(escapes[3].value, EscapeValue::Rune('A'));
    assert_eq!((escapes[3].start, escapes[3].end), (13, 19));
}

#[test]
fn long_unicode_escapes_decode_to_runes() {
    let stream = lex_clean(r#""\U0001F600""#);
    let token = stream.token(TokenId::from_nat_index(0));
    assert_eq!(token.decoded_string(), Some("😀".as_bytes()));
}

#[test]
fn hex_escape_without_digits_is_invalid() {
    let (_, report) = lex_text("x = \"abc\\x\"");
    assert_eq!(tags_of(&report), [tags::INVALID_ESCAPE]);
    let diag = report.iter().next().unwrap();
    let primary = diag.primary().unwrap();
    assert_eq!(primary.span.start(), 8);
    assert_eq!(primary.span.end(), 10);
    assert_eq!(primary.span.text(), "\\x");
    assert_eq!(
        primary.message,
        "\\x must be followed by at least one hex digit"
    );
}

#[test]
fn surrogate_escapes_are_invalid() {
    let (_, report) = lex_text(r#""\uD800""#);
    assert_eq!(tags_of(&report), [tags::INVALID_ESCAPE]);
}

#[test]
fn wrong_unicode_digit_count_is_invalid() {
    let (_, report) = lex_text(r#""\u00""#);
    assert_eq!(tags_of(&report), [tags::INVALID_ESCAPE]);
}

#[test]
fn unknown_escape_is_invalid() {
    let (_, report) = lex_text(r#""\q""#);
    assert_eq!(tags_of(&report), [tags::INVALID_ESCAPE]);
    let diag = report.iter().next().unwrap();
    assert_eq!(
        diag.primary().unwrap().message,
        "`\\q` is not a valid escape sequence"
    );
}

#[test]
fn nul_byte_offers_a_fix() {
    let (_, report) = lex_text("\"a\u{0}b\"");
    let diag = report.iter().next().unwrap();
    assert_eq!(diag.message(), "NUL byte in string literal");
    let suggestion = &diag.suggestions()[0];
    assert_eq!(suggestion.edits[0].replace, "\\0");
    assert_eq!((suggestion.edits[0].start, suggestion.edits[0].end), (2, 3));
}

#[test]
fn non_printable_chars_offer_hex_escapes() {
    let (_, report) = lex_text("\"a\u{1}b\"");
    let diag = report.iter().next().unwrap();
    assert_eq!(diag.message(), "non-printable character in string literal");
    assert_eq!(diag.suggestions()[0].edits[0].replace, "\\x01");
}

#[test]
fn unterminated_string_runs_to_eof() {
    let (stream, report) = lex_text("x \"abc");
    assert_eq!(tags_of(&report), [tags::UNTERMINATED_STRING]);
    let token = stream.token(TokenId::from_nat_index(2));
    assert_eq!(token.kind(), TokenKind::String);
    assert_eq!(token.text(), "\"abc");
    assert_eq!(token.decoded_string(), Some(&b"abc"[..]));
}

#[test]
fn triple_quoted_strings_lex_whole() {
    let stream = lex_clean("\"\"\"a \"quoted\" b\"\"\"");
    let token = stream.token(TokenId::from_nat_index(0));
    assert_eq!(token.kind(), TokenKind::String);
    assert_eq!(token.decoded_string(), Some(&b"a \"quoted\" b"[..]));
    assert_eq!(stream.natural_count(), 1);
}

#[test]
fn adjacent_strings_fuse_into_a_tree() {
    let stream = lex_clean("\"foo\" \"bar\" \"baz\"");
    let open = stream.token(TokenId::from_nat_index(0));
    assert!(open.is_open());
    assert_eq!(open.kind(), TokenKind::String);
    assert_eq!(open.mate().text(), "\"baz\"");
    assert_eq!(open.decoded_string(), Some(&b"foobarbaz"[..]));

    // the stream sees a single string tree
    let mut cursor = stream.cursor();
    assert_eq!(cursor.next().unwrap(), open);
    assert!(cursor.next().is_none());
}

#[test]
fn strings_across_comments_still_concatenate() {
    let stream = lex_clean("\"a\" /* glue */ \"b\"");
    let open = stream.token(TokenId::from_nat_index(0));
    assert_eq!(open.decoded_string(), Some(&b"ab"[..]));
}

#[test]
fn non_adjacent_strings_stay_leaves() {
    let stream = lex_clean("\"a\" ; \"b\"");
    assert!(stream.token(TokenId::from_nat_index(0)).is_leaf());
}

#[test]
fn decimal_integers_decode_exactly() {
    let stream = lex_clean("42 18446744073709551615");
    assert_eq!(stream.token(TokenId::from_nat_index(0)).int(), Some(42));
    assert_eq!(
        stream.token(TokenId::from_nat_index(2)).int(),
        Some(u64::MAX)
    );
}

#[test]
fn radix_prefixes_decode() {
    let stream = lex_clean("0x2A 0b101 0o17 017");
    let values: Vec<_> = stream.cursor().rest().map(|t| t.int()).collect();
    assert_eq!(values, [Some(42), Some(5), Some(15), Some(15)]);
}

#[test]
fn floats_decode() {
    let stream = lex_clean("1.5 1e3 .5 2.5f");
    let values: Vec<_> = stream.cursor().rest().map(|t| t.float()).collect();
    assert_eq!(values, [Some(1.5), Some(1000.0), Some(0.5), Some(2.5)]);
}

#[test]
fn int_and_float_conversions_flag_exactness() {
    let stream = lex_clean("42 9007199254740993 1.5");
    let n42 = stream.token(TokenId::from_nat_index(0));
    assert_eq!(n42.float(), Some(42.0));
    // 2^53 + 1 is not representable in an f64
    let big = stream.token(TokenId::from_nat_index(2));
    assert_eq!(big.int(), Some(9007199254740993));
    assert_eq!(big.float(), None);
    let frac = stream.token(TokenId::from_nat_index(4));
    assert_eq!(frac.float(), Some(1.5));
    assert_eq!(frac.int(), None);
}

#[test]
fn decimal_overflow_is_diagnosed() {
    let (stream, report) = lex_text("18446744073709551616");
    assert_eq!(tags_of(&report), [tags::INTEGER_OVERFLOW]);
    let token = stream.token(TokenId::from_nat_index(0));
    assert_eq!(token.int(), None);
    assert_eq!(token.float(), Some(18446744073709551616.0));
}

#[test]
fn hex_overflow_is_diagnosed() {
    let (_, report) = lex_text("0xFFFFFFFFFFFFFFFFF");
    assert_eq!(tags_of(&report), [tags::INTEGER_OVERFLOW]);
}

#[test]
fn malformed_literals_get_radix_specific_tags() {
    let cases = [
        ("0x", tags::INVALID_HEX_LITERAL),
        ("0xG1", tags::INVALID_HEX_LITERAL),
        ("0b12", tags::INVALID_BIN_LITERAL),
        ("0o9", tags::INVALID_OCT_LITERAL),
        ("08", tags::INVALID_OCT_LITERAL),
        ("1e", tags::INVALID_FLOAT_LITERAL),
        ("1.2.3", tags::INVALID_FLOAT_LITERAL),
        ("1abc", tags::INVALID_DEC_LITERAL),
        ("1_000", tags::INVALID_DEC_LITERAL),
    ];
    for (text, tag) in cases {
        let (stream, report) = lex_text(text);
        assert_eq!(tags_of(&report), [tag], "for input {text:?}");
        // the raw text is preserved either way
        assert_eq!(stream.token(TokenId::from_nat_index(0)).text(), text);
    }
}

#[test]
fn leading_dot_starts_a_number_only_before_digits() {
    let stream = lex_clean(".5");
    assert_eq!(stream.token(TokenId::from_nat_index(0)).kind(), TokenKind::Number);

    let stream = lex_clean(".foo");
    assert_eq!(stream.token(TokenId::from_nat_index(0)).kind(), TokenKind::Punct);
    assert_eq!(
        stream.token(TokenId::from_nat_index(0)).keyword(),
        Keyword::Dot
    );
}

#[test]
fn signed_exponents_lex_as_one_token() {
    let stream = lex_clean("1e+3 1E-2");
    assert_eq!(stream.token(TokenId::from_nat_index(0)).text(), "1e+3");
    assert_eq!(stream.token(TokenId::from_nat_index(0)).float(), Some(1000.0));
    assert_eq!(stream.token(TokenId::from_nat_index(2)).float(), Some(0.01));
}

#[test]
fn keywords_classify_at_lex_time() {
    let stream = lex_clean("message optional to max true inf nan notakeyword");
    let keywords: Vec<_> = stream.cursor().rest().map(|t| t.keyword()).collect();
    assert_eq!(
        keywords,
        [
            Keyword::Message,
            Keyword::Optional,
            Keyword::To,
            Keyword::Max,
            Keyword::True,
            Keyword::Inf,
            Keyword::Nan,
            Keyword::Unknown,
        ]
    );
}

#[test]
fn non_ascii_identifiers_are_diagnosed() {
    let (stream, report) = lex_text("héllo");
    assert_eq!(tags_of(&report), [tags::NON_ASCII_IDENT]);
    // the identifier token survives with its full text
    let token = stream.token(TokenId::from_nat_index(0));
    assert_eq!(token.kind(), TokenKind::Ident);
    assert_eq!(token.text(), "héllo");
}

#[test]
fn unrecognized_bytes_coalesce() {
    let (stream, report) = lex_text("a @#$ b");
    assert_eq!(tags_of(&report), [tags::UNRECOGNIZED_TOKEN]);
    let token = stream.token(TokenId::from_nat_index(2));
    assert_eq!(token.kind(), TokenKind::Unrecognized);
    assert_eq!(token.text(), "@#$");
    assert!(token.kind().is_skippable());
}

#[test]
fn recovery_keeps_lexing_after_every_error() {
    let (stream, report) = lex_text("@ message M { \"unterminated");
    assert!(report.len() >= 2);
    assert!(stream.natural_count() > 4);
}

#[test]
fn torture_inputs_keep_invariants() {
    let samples = [
        "syntax = \"proto3\";\npackage a.b;\nmessage M { int32 x = 1; }\n",
        "message M { repeated map<string, int32> m = 2 [deprecated = true]; }",
        "service S { rpc Get (Req) returns (Res); }",
        "/* block */ // line\nreserved 1 to 10, 100;\n",
        "a(b[c{d<e>f}g]h)i",
        ")]}> ([{<",
        "\"\\q\\x\\uZZ\" 0x 08 1e héllo @@@ */ /* open",
        "\t\n\r   \u{3000}",
        "edition = \"2023\";",
        "'one' 'two' \"three\"",
        "extend .google.protobuf.MessageOptions { optional group G = 1 {}; }",
    ];
    for text in samples {
        let (_, _) = lex_text(text);
    }
}

#[test]
fn string_values_survive_relexing() {
    // a clean, unconcatenated string relexes to the same decoded value
    let sources = [
        r#""plain""#,
        r#""with \"escapes\" and \n""#,
        r#""\x41\102C""#,
        "'single quoted'",
        "\"\"\"triple \"quoted\" x\"\"\"",
    ];
    for source in sources {
        let first = lex_clean(source);
        let token = first.token(TokenId::from_nat_index(0));
        let original = token.decoded_string().unwrap().to_vec();

        let relexed = lex_clean(token.text());
        let again = relexed.token(TokenId::from_nat_index(0));
        assert_eq!(
            again.decoded_string().unwrap(),
            &original[..],
            "for {source:?}"
        );
    }
}

#[test]
fn kind_stream_snapshot() {
    let stream = lex_clean("message M { x = 1; } // done\n");
    insta::assert_yaml_snapshot!(kinds(&stream), @r"
    - Ident
    - Space
    - Ident
    - Space
    - Punct
    - Space
    - Ident
    - Space
    - Punct
    - Space
    - Number
    - Punct
    - Space
    - Punct
    - Space
    - Comment
    ");
}
