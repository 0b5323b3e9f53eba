//! Stable diagnostic tags.
//!
//! Consumers match these instead of message text, which may change between
//! releases.

pub const UNRECOGNIZED_TOKEN: &str = "unrecognized-token";
pub const UNOPENED_DELIMITER: &str = "unopened-delimiter";
pub const UNCLOSED_DELIMITER: &str = "unclosed-delimiter";
pub const UNTERMINATED_BLOCK_COMMENT: &str = "unterminated-block-comment";
pub const UNTERMINATED_STRING: &str = "unterminated-string";
pub const INVALID_ESCAPE: &str = "invalid-escape";
pub const NON_ASCII_IDENT: &str = "non-ascii-ident";
pub const INTEGER_OVERFLOW: &str = "integer-overflow";
pub const INVALID_DEC_LITERAL: &str = "invalid-dec-literal";
pub const INVALID_BIN_LITERAL: &str = "invalid-bin-literal";
pub const INVALID_OCT_LITERAL: &str = "invalid-oct-literal";
pub const INVALID_HEX_LITERAL: &str = "invalid-hex-literal";
pub const INVALID_FLOAT_LITERAL: &str = "invalid-float-literal";
