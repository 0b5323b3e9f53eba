//! Token-tree lexer and fault-tolerant AST for the Protocol Buffers IDL.
//!
//! # Architecture
//!
//! The lexer turns source text into a flat stream of compact tokens, fusing
//! matched delimiter pairs into trees as they close. The AST is a set of
//! typed arenas behind pointer-like handles, deliberately more permissive
//! than the protobuf grammar so that language servers and formatters can
//! work on broken source: a parser built on these types can always produce a
//! node, and semantic passes mark declarations *corrupt* instead of erasing
//! them. Trivia (comments and whitespace) is attributed through side tables,
//! never stored inside token records.
//!
//! Nothing here aborts on the first error: the lexer recovers from every
//! malformed construct and keeps the whole file covered by tokens, reporting
//! through [`prosit_core::Report`].
//!
//! # Example
//!
//! ```
//! use prosit_core::{File, Report};
//! use prosit_syntax::SourceFile;
//!
//! let mut report = Report::new();
//! let file = SourceFile::new(
//!     File::new("example.proto", "syntax = \"proto3\";\n"),
//!     &mut report,
//! );
//! assert!(report.is_empty());
//! let mut tokens = file.stream().cursor();
//! assert_eq!(tokens.next().unwrap().text(), "syntax");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

pub mod ast;
pub mod edit;
mod file;
pub mod lexer;
pub mod token;
pub mod trivia;

#[cfg(test)]
mod edit_tests;
#[cfg(test)]
mod trivia_tests;

pub use edit::{Justify, justify_edit};
pub use file::{DefArgs, SourceFile};
pub use lexer::lex;
pub use token::{Cursor, Keyword, Token, TokenId, TokenKind, TokenStream};
pub use trivia::Trivia;

static ALLOW_EDITIONS: AtomicBool = AtomicBool::new(false);

/// Enables recognition of editions-only constructs.
///
/// This is the library's single piece of global state. Set it once, before
/// any file is processed; flipping it while work is in flight is unsupported
/// and leaves consumers disagreeing about what they parsed.
pub fn allow_editions(enable: bool) {
    ALLOW_EDITIONS.store(enable, Ordering::Relaxed);
}

/// Whether editions-only constructs are enabled.
pub fn editions_allowed() -> bool {
    ALLOW_EDITIONS.load(Ordering::Relaxed)
}
