//! Core data structures for the Prosit protobuf front-end.
//!
//! This crate holds everything the rest of the front-end reports through:
//! source files and byte spans, lazy line/column indexing (including UTF-16
//! columns for LSP consumers), the diagnostic report with its builder API and
//! ICE capture, a Protobuf wire form of a report, and the terminal printer.
//!
//! The token stream, lexer, and AST live in `prosit-syntax`.

pub mod colors;
mod line_index;
pub mod print;
pub mod report;
pub mod source;
pub mod width;

#[cfg(test)]
mod print_tests;
#[cfg(test)]
mod wire_tests;

pub use colors::Colors;
pub use print::{Printer, Style};
pub use report::{Annotation, Diagnostic, DiagnosticBuilder, Edit, Level, Report, tags};
pub use source::{File, Location, Span};
pub use width::DEFAULT_TAB_STOP;

/// Aggregate error for callers that want fail-fast semantics instead of
/// walking a [`Report`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The report contains at least one error-level diagnostic.
    #[error("{errors} errors and {warnings} warnings emitted")]
    Diagnostics { errors: usize, warnings: usize },
}

/// Result type for report-level operations.
pub type Result<T> = std::result::Result<T, Error>;
