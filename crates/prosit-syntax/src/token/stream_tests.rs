use prosit_core::source::File;

use crate::token::{Keyword, TokenId, TokenKind, TokenStream};

fn stream(text: &str) -> TokenStream {
    TokenStream::new(File::new("test.proto", text))
}

#[test]
fn push_assigns_dense_ids_and_spans() {
    let mut s = stream("foo bar");
    let a = s.push(3, TokenKind::Ident);
    let sp = s.push(1, TokenKind::Space);
    let b = s.push(3, TokenKind::Ident);

    assert_eq!(a, TokenId::from_nat_index(0));
    assert_eq!(sp, TokenId::from_nat_index(1));
    assert_eq!(b, TokenId::from_nat_index(2));

    assert_eq!(s.token(a).text(), "foo");
    assert_eq!(s.token(sp).text(), " ");
    assert_eq!(s.token(b).text(), "bar");
    assert_eq!(s.token(b).span().start(), 4);
    assert_eq!(s.token(b).span().end(), 7);
    assert_eq!(s.natural_count(), 3);
    assert_eq!(s.end_offset(), 7);
}

#[test]
fn push_classifies_keywords() {
    let mut s = stream("message {");
    let kw = s.push(7, TokenKind::Ident);
    s.push(1, TokenKind::Space);
    let brace = s.push(1, TokenKind::Punct);
    assert_eq!(s.token(kw).keyword(), Keyword::Message);
    assert_eq!(s.token(brace).keyword(), Keyword::BraceOpen);
}

#[test]
fn strings_and_numbers_have_no_keyword() {
    let mut s = stream("\"message\"");
    let tok = s.push(9, TokenKind::String);
    assert_eq!(s.token(tok).keyword(), Keyword::Unknown);
}

#[test]
#[should_panic(expected = "cannot be empty")]
fn push_rejects_empty_tokens() {
    let mut s = stream("abc");
    s.push(0, TokenKind::Ident);
}

#[test]
#[should_panic(expected = "past end of file")]
fn push_rejects_tokens_past_eof() {
    let mut s = stream("abc");
    s.push(4, TokenKind::Ident);
}

#[test]
#[should_panic(expected = "frozen")]
fn push_rejects_frozen_streams() {
    let mut s = stream("abc");
    s.freeze();
    s.push(3, TokenKind::Ident);
}

#[test]
fn fuse_links_mates_and_sets_fused_keyword() {
    let mut s = stream("( x )");
    let open = s.push(1, TokenKind::Punct);
    s.push(1, TokenKind::Space);
    let inner = s.push(1, TokenKind::Ident);
    s.push(1, TokenKind::Space);
    let close = s.push(1, TokenKind::Punct);
    s.fuse(open, close);

    assert!(s.token(open).is_open());
    assert!(s.token(close).is_close());
    assert!(!s.token(open).is_leaf());
    assert_eq!(s.token(open).mate(), s.token(close));
    assert_eq!(s.token(close).mate(), s.token(open));
    assert_eq!(s.token(open).keyword(), Keyword::Parens);
    assert_eq!(s.token(close).keyword(), Keyword::Parens);
    assert!(s.token(inner).is_leaf());

    let children: Vec<_> = s
        .token(open)
        .children()
        .unwrap()
        .rest()
        .map(|t| t.text().to_string())
        .collect();
    assert_eq!(children, ["x"]);
}

#[test]
fn children_from_close_equal_children_from_open() {
    let mut s = stream("(x)");
    let open = s.push(1, TokenKind::Punct);
    let inner = s.push(1, TokenKind::Ident);
    let close = s.push(1, TokenKind::Punct);
    s.fuse(open, close);
    let via_close: Vec<_> = s.token(close).children().unwrap().rest().collect();
    assert_eq!(via_close, vec![s.token(inner)]);
}

#[test]
#[should_panic(expected = "strictly precede")]
fn fuse_rejects_reversed_pairs() {
    let mut s = stream("()");
    let open = s.push(1, TokenKind::Punct);
    let close = s.push(1, TokenKind::Punct);
    s.fuse(close, open);
}

#[test]
#[should_panic(expected = "already fused")]
fn fuse_rejects_non_leaves() {
    let mut s = stream("(())");
    let a = s.push(1, TokenKind::Punct);
    let b = s.push(1, TokenKind::Punct);
    let c = s.push(1, TokenKind::Punct);
    s.push(1, TokenKind::Punct);
    s.fuse(a, c);
    s.fuse(b, c);
}

#[test]
#[should_panic(expected = "frozen")]
fn fuse_rejects_frozen_streams() {
    let mut s = stream("()");
    let open = s.push(1, TokenKind::Punct);
    let close = s.push(1, TokenKind::Punct);
    s.freeze();
    s.fuse(open, close);
}

#[test]
fn synthetic_minting_survives_freezing() {
    let mut s = stream("");
    s.freeze();
    let ident = s.new_ident("message");
    let punct = s.new_punct(";");
    let string = s.new_string("hello");

    assert!(ident.is_synthetic());
    assert_eq!(s.token(ident).text(), "message");
    assert_eq!(s.token(ident).kind(), TokenKind::Ident);
    assert_eq!(s.token(ident).keyword(), Keyword::Message);
    assert_eq!(s.token(punct).keyword(), Keyword::Semi);
    assert!(s.token(string).span().is_zero());
    assert_eq!(s.token(string).decoded_string(), Some(&b"hello"[..]));
}

#[test]
fn new_fused_wires_synthetic_pairs() {
    let mut s = stream("");
    let open = s.new_punct("(");
    let close = s.new_punct(")");
    let child = s.new_ident("foo");
    s.new_fused(open, close, [child]);

    assert!(s.token(open).is_open());
    assert!(s.token(close).is_close());
    assert_eq!(s.token(open).mate(), s.token(close));
    assert_eq!(s.token(open).keyword(), Keyword::Parens);
    let children: Vec<_> = s.token(open).children().unwrap().rest().collect();
    assert_eq!(children, vec![s.token(child)]);
}

#[test]
#[should_panic(expected = "synthetic")]
fn new_fused_rejects_natural_endpoints() {
    let mut s = stream("()");
    let natural = s.push(1, TokenKind::Punct);
    let synth = s.new_punct(")");
    s.new_fused(natural, synth, []);
}

#[test]
fn around_finds_token_boundaries() {
    let mut s = stream("ab cd");
    let a = s.push(2, TokenKind::Ident);
    let sp = s.push(1, TokenKind::Space);
    let b = s.push(2, TokenKind::Ident);

    let (before, after) = s.around(0);
    assert!(before.is_zero());
    assert_eq!(after, s.token(a));

    let (before, after) = s.around(2);
    assert_eq!(before, s.token(a));
    assert_eq!(after, s.token(sp));

    let (before, after) = s.around(1);
    assert_eq!(before, s.token(a));
    assert_eq!(after, s.token(a));

    let (before, after) = s.around(5);
    assert_eq!(before, s.token(b));
    assert!(after.is_zero());
}

#[test]
fn around_on_empty_stream_is_zero() {
    let s = stream("");
    let (before, after) = s.around(0);
    assert!(before.is_zero() && after.is_zero());
}

#[test]
fn decimal_numbers_reparse_on_demand() {
    let mut s = stream("42");
    let n = s.push(2, TokenKind::Number);
    assert_eq!(s.token(n).int(), Some(42));
    assert_eq!(s.token(n).float(), Some(42.0));
}

#[test]
fn zero_token_answers_with_defaults() {
    let s = stream("abc");
    let zero = s.token(TokenId::ZERO);
    assert!(zero.is_zero());
    assert_eq!(zero.text(), "");
    assert!(zero.span().is_zero());
    assert_eq!(zero.kind(), TokenKind::Unrecognized);
    assert_eq!(zero.keyword(), Keyword::Unknown);
    assert!(!zero.is_leaf());
    assert!(zero.mate().is_zero());
    assert!(zero.children().is_none());
}

#[test]
#[should_panic(expected = "another stream")]
fn foreign_token_ids_panic() {
    let mut a = stream("abc");
    a.push(3, TokenKind::Ident);
    let b = stream("xyz");
    b.token(TokenId::from_nat_index(0));
}
