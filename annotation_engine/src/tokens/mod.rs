//! Token system for docblock lexing
//!
//! The lexer produces [`SpannedToken`]s lazily; the parser consumes them through
//! a [`TokenStream`] that keeps the last consumed token, one token of lookahead,
//! and a single extra "glimpse" token beyond it.
//!
//! Offsets in every span are byte offsets into the trimmed docblock text, which
//! is also what syntax errors report as "position".

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenKind};
pub use token_stream::{SpannedToken, TokenStream};

pub use crate::utils::{Position, Span, Spanned};
