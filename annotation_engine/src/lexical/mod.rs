//! Lexical analysis of docblock text
//!
//! [`prepare_docblock`] locates the first annotation-capable `@` and trims
//! comment decoration; [`DocLexer`] then turns the remaining text into tokens.

pub mod analyzer;

pub use analyzer::{find_initial_position, prepare_docblock, DocLexer, LexerError, LexicalMetrics};

use crate::tokens::SpannedToken;

/// Tokenize text eagerly, returning tokens and the metrics gathered on the way
pub fn tokenize(input: &str) -> (Vec<SpannedToken>, LexicalMetrics) {
    let mut lexer = DocLexer::new(input);
    let tokens: Vec<_> = lexer.by_ref().collect();
    (tokens, lexer.metrics().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_is_restartable() {
        let text = "@Foo({1, 2})";
        let (first, _) = tokenize(text);
        let (second, _) = tokenize(text);
        assert_eq!(first, second);
        assert_eq!(first.len(), 9);
    }
}
