//! Trivia attribution.
//!
//! Classifies every skippable token as *leading* on the non-skippable token
//! after it, *trailing* on the one before it, or *detached* into a slot of
//! the enclosing scope. A rewriter that deletes a declaration carries its
//! leading doc comments with it, while detached paragraphs (separated by
//! blank lines) stay behind.
//!
//! Attribution runs once, over a frozen stream, and writes only side tables;
//! token records are never touched.

use indexmap::IndexMap;

use crate::token::{Keyword, Token, TokenId, TokenKind, TokenStream};

/// A detached-paragraph slot: comments (with their surrounding whitespace)
/// parked between two declaration boundaries of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Position among the scope's declaration boundaries (`;` and closing
    /// braces): 0 before the first boundary, 1 after it, and so on.
    pub boundary: usize,
    pub tokens: Vec<TokenId>,
}

#[derive(Debug, Default)]
struct Attached {
    leading: Vec<TokenId>,
    trailing: Vec<TokenId>,
}

/// Side tables mapping tokens to their attributed trivia.
#[derive(Debug, Default)]
pub struct Trivia {
    attached: IndexMap<TokenId, Attached>,
    scopes: IndexMap<TokenId, Vec<Slot>>,
}

impl Trivia {
    /// Attributes every skippable token in the stream. Scopes are the file
    /// body (keyed by the zero token) and each fused delimiter pair (keyed
    /// by its open token).
    pub fn attribute(stream: &TokenStream) -> Trivia {
        let mut out = Trivia::default();
        // (scope key, declaration boundaries seen so far)
        let mut scopes: Vec<(TokenId, usize)> = vec![(TokenId::ZERO, 0)];
        let mut run: Vec<TokenId> = Vec::new();
        let mut prev: Option<Token<'_>> = None;

        for i in 0..stream.nat_len() {
            let token = stream.token(TokenId::from_nat_index(i));
            if token.kind().is_skippable() {
                run.push(token.id());
                continue;
            }

            let scope = *scopes.last().expect("scope stack never empties");
            out.partition(stream, prev, Some(token), std::mem::take(&mut run), scope);

            let is_delimiter = token.kind() == TokenKind::Punct;
            if is_delimiter && token.is_open() {
                scopes.push((token.id(), 0));
            } else if is_delimiter && token.is_close() {
                if scopes.len() > 1 {
                    scopes.pop();
                }
                if token.text() == "}" {
                    scopes.last_mut().expect("scope stack never empties").1 += 1;
                }
            } else if token.keyword() == Keyword::Semi {
                scopes.last_mut().expect("scope stack never empties").1 += 1;
            }
            prev = Some(token);
        }

        let scope = *scopes.last().expect("scope stack never empties");
        out.partition(stream, prev, None, run, scope);
        out
    }

    /// Skippable tokens attributed as leading trivia of `token`.
    pub fn leading(&self, token: TokenId) -> &[TokenId] {
        self.attached.get(&token).map_or(&[], |a| &a.leading)
    }

    /// Skippable tokens attributed as trailing trivia of `token`.
    pub fn trailing(&self, token: TokenId) -> &[TokenId] {
        self.attached.get(&token).map_or(&[], |a| &a.trailing)
    }

    /// Detached slots of a scope: the zero token for the file body, or a
    /// fused pair's open token.
    pub fn detached(&self, scope: TokenId) -> &[Slot] {
        self.scopes.get(&scope).map_or(&[], Vec::as_slice)
    }

    /// Splits the skippable run between `p` and `t` into trailing, leading,
    /// and detached chunks, and records them.
    fn partition(
        &mut self,
        stream: &TokenStream,
        p: Option<Token<'_>>,
        t: Option<Token<'_>>,
        run: Vec<TokenId>,
        scope: (TokenId, usize),
    ) {
        if run.is_empty() {
            return;
        }
        let text = stream.file().text();

        // group comments into paragraphs, each carrying the whitespace that
        // precedes it; what is left after the last comment is the residue
        let mut paras: Vec<Para> = Vec::new();
        let mut pending: Vec<TokenId> = Vec::new();
        for &id in &run {
            let token = stream.token(id);
            if token.kind() != TokenKind::Comment {
                pending.push(id);
                continue;
            }
            let block = token.text().starts_with("/*");
            let joins = paras.last().is_some_and(|para| {
                let last = stream.token(para.last_comment);
                !block
                    && !last.text().starts_with("/*")
                    && separation(text, last, token.span().start()) == 1
            });
            if joins {
                let para = paras.last_mut().unwrap();
                para.tokens.append(&mut pending);
                para.tokens.push(id);
                para.last_comment = id;
            } else {
                let mut tokens = std::mem::take(&mut pending);
                tokens.push(id);
                paras.push(Para {
                    tokens,
                    first_comment: id,
                    last_comment: id,
                });
            }
        }
        let residue = pending;

        // trailing donation to P
        if let Some(p) = p
            && let Some(first) = paras.first()
        {
            let first_comment = stream.token(first.first_comment);
            let gap = newlines(text, p.span().end(), first_comment.span().start());
            let on_p_line = gap == 0;
            let closes_scope =
                t.is_some_and(|t| t.kind() == TokenKind::Punct && t.is_close());
            if on_p_line || (closes_scope && paras.len() == 1 && gap <= 1) {
                let para = paras.remove(0);
                self.attached
                    .entry(p.id())
                    .or_default()
                    .trailing
                    .extend(para.tokens);
            }
        }

        // leading attribution to T
        let mut leading: Vec<TokenId> = Vec::new();
        if let Some(t) = t
            && let Some(last) = paras.last()
        {
            let last_comment = stream.token(last.last_comment);
            if separation(text, last_comment, t.span().start()) == 1 {
                leading = paras.pop().unwrap().tokens;
            }
        }

        // everything else is detached, parked at the current boundary
        for para in paras {
            self.scopes.entry(scope.0).or_default().push(Slot {
                boundary: scope.1,
                tokens: para.tokens,
            });
        }

        // the residue rides with whatever follows it
        match (t, p) {
            (Some(t), _) => {
                leading.extend(residue);
                if !leading.is_empty() {
                    self.attached
                        .entry(t.id())
                        .or_default()
                        .leading
                        .extend(leading);
                }
            }
            (None, Some(p)) => {
                debug_assert!(leading.is_empty());
                self.attached
                    .entry(p.id())
                    .or_default()
                    .trailing
                    .extend(residue);
            }
            (None, None) => {
                if !residue.is_empty() {
                    self.scopes.entry(scope.0).or_default().push(Slot {
                        boundary: scope.1,
                        tokens: residue,
                    });
                }
            }
        }
    }
}

struct Para {
    tokens: Vec<TokenId>,
    first_comment: TokenId,
    last_comment: TokenId,
}

/// Newlines separating a comment from a later offset, counting the line
/// comment's own terminating newline.
fn separation(text: &str, comment: Token<'_>, until: usize) -> usize {
    let own = usize::from(comment.text().ends_with('\n'));
    own + newlines(text, comment.span().end(), until)
}

fn newlines(text: &str, from: usize, until: usize) -> usize {
    text[from..until].bytes().filter(|&b| b == b'\n').count()
}
