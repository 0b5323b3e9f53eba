use indoc::indoc;
use prosit_core::report::Report;
use prosit_core::source::File;

use crate::lexer::lex;
use crate::token::{Token, TokenId, TokenStream};
use crate::trivia::Trivia;

fn lexed(text: &str) -> TokenStream {
    let mut report = Report::new();
    let stream = lex(&File::new("test.proto", text), &mut report);
    assert!(report.is_empty(), "unexpected diagnostics for {text:?}");
    stream
}

/// First non-skippable token with the given text.
fn find<'a>(stream: &'a TokenStream, text: &str) -> Token<'a> {
    for i in 0..stream.natural_count() {
        let token = stream.token(TokenId::from_nat_index(i));
        if !token.kind().is_skippable() && token.text() == text {
            return token;
        }
    }
    panic!("no token {text:?}");
}

fn texts(stream: &TokenStream, ids: &[TokenId]) -> Vec<String> {
    ids.iter().map(|&id| stream.token(id).text().to_string()).collect()
}

#[test]
fn doc_comments_lead_their_declaration() {
    let stream = lexed(indoc! {"
        foo;
        // doc for bar
        bar;
    "});
    let trivia = Trivia::attribute(&stream);
    let bar = find(&stream, "bar");
    let leading = texts(&stream, trivia.leading(bar.id()));
    assert!(leading.contains(&"// doc for bar\n".to_string()), "{leading:?}");
    assert!(trivia.trailing(find(&stream, ";").id()).is_empty());
}

#[test]
fn same_line_comments_trail() {
    let stream = lexed("int32 x = 1; // trailing\nint32 y = 2;\n");
    let trivia = Trivia::attribute(&stream);
    let semi = find(&stream, ";");
    let trailing = texts(&stream, trivia.trailing(semi.id()));
    assert!(trailing.contains(&"// trailing\n".to_string()), "{trailing:?}");
    // the next declaration gets only its whitespace as leading
    let y_leading = trivia.leading(find(&stream, "int32").id());
    assert!(y_leading.is_empty());
}

#[test]
fn blank_lines_detach_paragraphs() {
    let stream = lexed(indoc! {"
        foo;

        // detached paragraph

        bar;
    "});
    let trivia = Trivia::attribute(&stream);
    let bar = find(&stream, "bar");
    assert!(trivia.leading(bar.id()).iter().all(|&id| {
        stream.token(id).text().trim().is_empty()
    }));

    let slots = trivia.detached(TokenId::ZERO);
    assert_eq!(slots.len(), 1);
    // parked after the first declaration boundary
    assert_eq!(slots[0].boundary, 1);
    let slot_texts = texts(&stream, &slots[0].tokens);
    assert!(
        slot_texts.contains(&"// detached paragraph\n".to_string()),
        "{slot_texts:?}"
    );
}

#[test]
fn comment_before_closer_trails_the_last_declaration() {
    let stream = lexed(indoc! {"
        message M {
            int32 x = 1;
            // about x, stays with it
        }
    "});
    let trivia = Trivia::attribute(&stream);
    let semi = find(&stream, ";");
    let trailing = texts(&stream, trivia.trailing(semi.id()));
    assert!(
        trailing.iter().any(|t| t.contains("about x")),
        "{trailing:?}"
    );
}

#[test]
fn line_comments_group_into_paragraphs() {
    let stream = lexed(indoc! {"
        foo;

        // one paragraph
        // continues here

        // second paragraph

        bar;
    "});
    let trivia = Trivia::attribute(&stream);
    let slots = trivia.detached(TokenId::ZERO);
    assert_eq!(slots.len(), 2);
    let first = texts(&stream, &slots[0].tokens).join("");
    assert!(first.contains("one paragraph") && first.contains("continues here"));
    let second = texts(&stream, &slots[1].tokens).join("");
    assert!(second.contains("second paragraph"));
}

#[test]
fn block_comments_stand_alone() {
    let stream = lexed(indoc! {"
        foo;

        /* block */
        // line right after

        bar;
    "});
    let trivia = Trivia::attribute(&stream);
    let slots = trivia.detached(TokenId::ZERO);
    assert_eq!(slots.len(), 2, "block and line comments must not merge");
}

#[test]
fn scope_start_comments_detach_inside_braces() {
    let stream = lexed(indoc! {"
        message M {
            // floating inside M

            int32 x = 1;
        }
    "});
    let trivia = Trivia::attribute(&stream);
    let brace = find(&stream, "{");
    let slots = trivia.detached(brace.id());
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].boundary, 0);
}

#[test]
fn attribution_partitions_all_skippables() {
    let text = indoc! {r#"
        // header

        syntax = "proto3"; // trailing

        /* detached block */

        message M {
            // doc for x
            int32 x = 1; // about x

            // floating

            int32 y = 2;
        }
        // tail comment
    "#};
    let stream = lexed(text);
    let trivia = Trivia::attribute(&stream);

    let mut expected: Vec<TokenId> = Vec::new();
    for i in 0..stream.natural_count() {
        let id = TokenId::from_nat_index(i);
        if stream.token(id).kind().is_skippable() {
            expected.push(id);
        }
    }

    let mut attributed: Vec<TokenId> = Vec::new();
    for i in 0..stream.natural_count() {
        let id = TokenId::from_nat_index(i);
        attributed.extend_from_slice(trivia.leading(id));
        attributed.extend_from_slice(trivia.trailing(id));
    }
    let mut scopes = vec![TokenId::ZERO];
    for i in 0..stream.natural_count() {
        let id = TokenId::from_nat_index(i);
        let token = stream.token(id);
        if token.is_open() && token.kind() == crate::token::TokenKind::Punct {
            scopes.push(id);
        }
    }
    for scope in scopes {
        for slot in trivia.detached(scope) {
            attributed.extend_from_slice(&slot.tokens);
        }
    }

    attributed.sort();
    expected.sort();
    assert_eq!(attributed, expected, "every skippable token is attributed exactly once");
}

#[test]
fn file_of_only_trivia_goes_into_a_slot() {
    let stream = lexed("  // alone\n");
    let trivia = Trivia::attribute(&stream);
    let slots = trivia.detached(TokenId::ZERO);
    let all: usize = slots.iter().map(|s| s.tokens.len()).sum();
    assert_eq!(all, stream.natural_count());
}
