//! Fix-it edit justification.
//!
//! A suggested edit computed against token boundaries often wants to land on
//! one side of the surrounding whitespace: a semicolon belongs snug against
//! the declaration to its left, an open brace snug against the name to its
//! right. Justification is a pure relocation of edit endpoints across
//! skippable tokens; it never changes the replacement text.

use prosit_core::report::Edit;

use crate::token::{TokenId, TokenStream};

/// Which side of the surrounding whitespace an edit should stick to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    /// Leave the edit where it was computed.
    Between,
    /// Snug against the nearest non-skippable token on the left. An
    /// insertion moves there; a replacement absorbs the skipped trivia.
    Left,
    /// Snug against the nearest non-skippable token on the right.
    Right,
}

/// Relocates `edit` according to `justify`.
pub fn justify_edit(stream: &TokenStream, edit: Edit, justify: Justify) -> Edit {
    match justify {
        Justify::Between => edit,
        Justify::Left => {
            let at = snug_left(stream, edit.start);
            if edit.start == edit.end {
                Edit::new(at, at, edit.replace)
            } else {
                Edit::new(at.min(edit.start), edit.end, edit.replace)
            }
        }
        Justify::Right => {
            let at = snug_right(stream, edit.end);
            if edit.start == edit.end {
                Edit::new(at, at, edit.replace)
            } else {
                Edit::new(edit.start, at.max(edit.end), edit.replace)
            }
        }
    }
}

/// End offset of the nearest non-skippable token at or left of `offset`;
/// 0 when only trivia precedes it.
fn snug_left(stream: &TokenStream, offset: usize) -> usize {
    let (before, _) = stream.around(offset);
    if before.is_zero() {
        return 0;
    }
    let mut index = before.id().nat_index() as isize;
    while index >= 0 {
        let token = stream.token(TokenId::from_nat_index(index as usize));
        if !token.kind().is_skippable() {
            return token.span().end().min(offset);
        }
        index -= 1;
    }
    0
}

/// Start offset of the nearest non-skippable token at or right of `offset`;
/// the end of the lexed text when only trivia follows.
fn snug_right(stream: &TokenStream, offset: usize) -> usize {
    let (_, after) = stream.around(offset);
    if after.is_zero() {
        return offset.max(stream.end_offset());
    }
    let mut index = after.id().nat_index();
    while index < stream.nat_len() {
        let token = stream.token(TokenId::from_nat_index(index));
        if !token.kind().is_skippable() {
            return token.span().start().max(offset);
        }
        index += 1;
    }
    stream.end_offset().max(offset)
}
