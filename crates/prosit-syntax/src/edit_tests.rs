use prosit_core::report::{Edit, Report};
use prosit_core::source::File;

use crate::edit::{Justify, justify_edit};
use crate::lexer::lex;
use crate::token::TokenStream;

fn lexed(text: &str) -> TokenStream {
    let mut report = Report::new();
    lex(&File::new("test.proto", text), &mut report)
}

#[test]
fn between_leaves_edits_alone() {
    let stream = lexed("foo   bar");
    let edit = Edit::insert(4, ";");
    assert_eq!(justify_edit(&stream, edit.clone(), Justify::Between), edit);
}

#[test]
fn left_moves_insertions_against_the_left_token() {
    let stream = lexed("foo   bar");
    let edit = justify_edit(&stream, Edit::insert(6, ";"), Justify::Left);
    assert_eq!((edit.start, edit.end), (3, 3));
    assert_eq!(edit.replace, ";");
}

#[test]
fn right_moves_insertions_against_the_right_token() {
    let stream = lexed("foo   bar");
    let edit = justify_edit(&stream, Edit::insert(3, ";"), Justify::Right);
    assert_eq!((edit.start, edit.end), (6, 6));
}

#[test]
fn justification_skips_comments_too() {
    let stream = lexed("a /* note */ b");
    let edit = justify_edit(&stream, Edit::insert(2, ";"), Justify::Right);
    assert_eq!((edit.start, edit.end), (13, 13));

    let edit = justify_edit(&stream, Edit::insert(12, ";"), Justify::Left);
    assert_eq!((edit.start, edit.end), (1, 1));
}

#[test]
fn snug_positions_stay_put() {
    let stream = lexed("foo bar");
    let edit = justify_edit(&stream, Edit::insert(3, ";"), Justify::Left);
    assert_eq!((edit.start, edit.end), (3, 3));
    let edit = justify_edit(&stream, Edit::insert(4, ";"), Justify::Right);
    assert_eq!((edit.start, edit.end), (4, 4));
}

#[test]
fn replacements_absorb_trivia_toward_the_target() {
    let stream = lexed("foo   bar");
    // deleting `bar` leftward also deletes the gap
    let edit = justify_edit(&stream, Edit::new(6, 9, ""), Justify::Left);
    assert_eq!((edit.start, edit.end), (3, 9));
    // deleting `foo` rightward does the same
    let edit = justify_edit(&stream, Edit::new(0, 3, ""), Justify::Right);
    assert_eq!((edit.start, edit.end), (0, 6));
}

#[test]
fn file_boundaries_clamp() {
    let stream = lexed("  foo  ");
    let edit = justify_edit(&stream, Edit::insert(1, "x"), Justify::Left);
    assert_eq!((edit.start, edit.end), (0, 0));
    let edit = justify_edit(&stream, Edit::insert(6, "x"), Justify::Right);
    assert_eq!((edit.start, edit.end), (7, 7));
}
