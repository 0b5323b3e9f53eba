//! Iteration over token trees.
//!
//! A cursor walks either a range of natural tokens or the child list of a
//! synthetic pair. Advancing with [`Cursor::next`] or
//! [`Cursor::next_skippable`] over a fused open delimiter jumps straight past
//! its close; the children are reached through a fresh cursor obtained from
//! the delimiter token itself.

use prosit_core::source::Span;

use super::stream::{Token, TokenStream};
use super::TokenId;

/// A saved cursor position, restored with [`Cursor::rewind`].
#[derive(Debug, Clone, Copy)]
pub struct Mark(usize);

#[derive(Clone)]
enum Inner<'a> {
    /// Natural token indices in `[lo, hi)`, currently at `pos`.
    Natural { lo: usize, hi: usize, pos: usize },
    /// A synthetic pair's child ids, currently at `pos`.
    Synthetic {
        children: &'a [TokenId],
        pos: usize,
    },
}

/// Iterator over natural tokens or a synthetic pair's children.
#[derive(Clone)]
pub struct Cursor<'a> {
    stream: &'a TokenStream,
    inner: Inner<'a>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn over_naturals(stream: &'a TokenStream, lo: usize, hi: usize) -> Cursor<'a> {
        Cursor {
            stream,
            inner: Inner::Natural { lo, hi, pos: lo },
        }
    }

    pub(crate) fn over_children(stream: &'a TokenStream, children: &'a [TokenId]) -> Cursor<'a> {
        Cursor {
            stream,
            inner: Inner::Synthetic { children, pos: 0 },
        }
    }

    /// Yields the next token including skippable ones, jumping over the
    /// children of fused pairs.
    pub fn next_skippable(&mut self) -> Option<Token<'a>> {
        match &mut self.inner {
            Inner::Natural { hi, pos, .. } => {
                if *pos >= *hi {
                    return None;
                }
                let index = *pos;
                let mate = self.stream.nat_mate(index);
                if mate > 0 {
                    *pos = index + mate as usize + 1;
                } else {
                    *pos = index + 1;
                }
                Some(self.stream.token(TokenId::from_nat_index(index)))
            }
            Inner::Synthetic { children, pos } => {
                let id = *children.get(*pos)?;
                *pos += 1;
                Some(self.stream.token(id))
            }
        }
    }

    /// Yields the next non-skippable token.
    pub fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let token = self.next_skippable()?;
            if !token.kind().is_skippable() {
                return Some(token);
            }
        }
    }

    /// Steps back to the previous token including skippable ones; a fused
    /// pair is re-entered at its open token.
    pub fn prev_skippable(&mut self) -> Option<Token<'a>> {
        match &mut self.inner {
            Inner::Natural { lo, pos, .. } => {
                if *pos <= *lo {
                    return None;
                }
                let before = *pos - 1;
                let mate = self.stream.nat_mate(before);
                let index = if mate < 0 {
                    (before as i64 + mate as i64) as usize
                } else {
                    before
                };
                *pos = index;
                Some(self.stream.token(TokenId::from_nat_index(index)))
            }
            Inner::Synthetic { children, pos } => {
                if *pos == 0 {
                    return None;
                }
                *pos -= 1;
                Some(self.stream.token(children[*pos]))
            }
        }
    }

    /// Steps back to the previous non-skippable token.
    pub fn prev(&mut self) -> Option<Token<'a>> {
        loop {
            let token = self.prev_skippable()?;
            if !token.kind().is_skippable() {
                return Some(token);
            }
        }
    }

    /// The next non-skippable token without advancing.
    pub fn peek(&self) -> Option<Token<'a>> {
        self.clone().next()
    }

    /// The next token, skippable or not, without advancing.
    pub fn peek_skippable(&self) -> Option<Token<'a>> {
        self.clone().next_skippable()
    }

    /// Captures the current position.
    pub fn mark(&self) -> Mark {
        match &self.inner {
            Inner::Natural { pos, .. } => Mark(*pos),
            Inner::Synthetic { pos, .. } => Mark(*pos),
        }
    }

    /// Restores a position captured from this cursor.
    pub fn rewind(&mut self, mark: Mark) {
        match &mut self.inner {
            Inner::Natural { lo, hi, pos } => {
                assert!(mark.0 >= *lo && mark.0 <= *hi, "mark out of range");
                *pos = mark.0;
            }
            Inner::Synthetic { children, pos } => {
                assert!(mark.0 <= children.len(), "mark out of range");
                *pos = mark.0;
            }
        }
    }

    /// Jumps to a specific token: O(1) over naturals, O(n) over children.
    ///
    /// # Panics
    /// Panics if the token is not inside the cursor's range.
    pub fn seek(&mut self, id: TokenId) {
        match &mut self.inner {
            Inner::Natural { lo, hi, pos } => {
                assert!(id.is_natural(), "cannot seek a natural cursor to {id:?}");
                let index = id.nat_index();
                assert!(index >= *lo && index < *hi, "token outside cursor range");
                *pos = index;
            }
            Inner::Synthetic { children, pos } => {
                let index = children
                    .iter()
                    .position(|&c| c == id)
                    .expect("token outside cursor range");
                *pos = index;
            }
        }
    }

    /// Lazy sequence of the remaining non-skippable tokens.
    pub fn rest(&self) -> Rest<'a> {
        Rest {
            cursor: self.clone(),
            skippable: false,
        }
    }

    /// Lazy sequence of all remaining tokens.
    pub fn rest_skippable(&self) -> Rest<'a> {
        Rest {
            cursor: self.clone(),
            skippable: true,
        }
    }

    /// The token and empty span immediately after the cursor's range, for
    /// synthesizing fix-it positions at end-of-input.
    pub fn just_after(&self) -> (Token<'a>, Span) {
        match &self.inner {
            Inner::Natural { hi, .. } => {
                if *hi < self.stream.nat_len() {
                    let token = self.stream.token(TokenId::from_nat_index(*hi));
                    let start = self.stream.nat_start(*hi);
                    (token, self.stream.file().span(start, start))
                } else {
                    let end = self.stream.end_offset();
                    (
                        self.stream.token(TokenId::ZERO),
                        self.stream.file().span(end, end),
                    )
                }
            }
            Inner::Synthetic { .. } => (self.stream.token(TokenId::ZERO), Span::zero()),
        }
    }
}

/// Iterator adapter over a cursor's remaining tokens.
#[derive(Clone)]
pub struct Rest<'a> {
    cursor: Cursor<'a>,
    skippable: bool,
}

impl<'a> Iterator for Rest<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.skippable {
            self.cursor.next_skippable()
        } else {
            self.cursor.next()
        }
    }
}
