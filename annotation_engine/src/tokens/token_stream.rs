//! Lookahead over a lazily lexed token sequence

use crate::tokens::token::{Token, TokenKind};
use crate::utils::Spanned;
use std::iter::Peekable;

/// A token with span information
pub type SpannedToken = Spanned<Token>;

/// Parser view of the token sequence.
///
/// `token` is the most recently consumed token, `lookahead` the next one to be
/// consumed, and [`TokenStream::glimpse`] peeks one past the lookahead without
/// consuming anything.
pub struct TokenStream<I: Iterator<Item = SpannedToken>> {
    source: Peekable<I>,
    token: Option<SpannedToken>,
    lookahead: Option<SpannedToken>,
}

impl<I: Iterator<Item = SpannedToken>> TokenStream<I> {
    /// Create a stream positioned before the first token
    pub fn new(tokens: I) -> Self {
        let mut source = tokens.peekable();
        let lookahead = source.next();
        Self {
            source,
            token: None,
            lookahead,
        }
    }

    /// Consume the lookahead; returns whether a new lookahead exists
    pub fn move_next(&mut self) -> bool {
        self.token = self.lookahead.take();
        self.lookahead = self.source.next();
        self.lookahead.is_some()
    }

    pub fn token(&self) -> Option<&SpannedToken> {
        self.token.as_ref()
    }

    pub fn lookahead(&self) -> Option<&SpannedToken> {
        self.lookahead.as_ref()
    }

    /// Kind of the lookahead, `EndOfInput` when exhausted
    pub fn lookahead_kind(&self) -> TokenKind {
        self.lookahead
            .as_ref()
            .map_or(TokenKind::EndOfInput, |t| t.value.kind())
    }

    pub fn is_next(&self, kind: TokenKind) -> bool {
        self.lookahead_kind() == kind
    }

    pub fn is_next_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.lookahead_kind())
    }

    /// Token after the lookahead
    pub fn glimpse(&mut self) -> Option<&SpannedToken> {
        self.source.peek()
    }

    pub fn glimpse_kind(&mut self) -> TokenKind {
        self.glimpse()
            .map_or(TokenKind::EndOfInput, |t| t.value.kind())
    }

    /// Whether the lookahead starts exactly where the consumed token ended
    pub fn next_is_adjacent(&self) -> bool {
        match (&self.token, &self.lookahead) {
            (Some(token), Some(next)) => token.span.is_adjacent_to(&next.span),
            _ => false,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.lookahead.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::DocLexer;

    #[test]
    fn test_lookahead_and_glimpse() {
        let mut stream = TokenStream::new(DocLexer::new("@Foo(1)"));

        assert!(stream.is_next(TokenKind::At));
        assert_eq!(stream.glimpse_kind(), TokenKind::Identifier);
        assert!(stream.token().is_none());

        assert!(stream.move_next());
        assert!(stream.is_next(TokenKind::Identifier));
        assert!(stream.next_is_adjacent());
    }

    #[test]
    fn test_adjacency_detects_whitespace() {
        let mut stream = TokenStream::new(DocLexer::new("Foo \\Bar"));
        stream.move_next();
        assert!(stream.is_next(TokenKind::NamespaceSeparator));
        assert!(!stream.next_is_adjacent());
    }

    #[test]
    fn test_end_of_input() {
        let mut stream = TokenStream::new(DocLexer::new("x"));
        assert!(!stream.move_next());
        assert!(stream.is_at_end());
        assert_eq!(stream.lookahead_kind(), TokenKind::EndOfInput);
        assert!(stream.is_next_any(&[TokenKind::EndOfInput]));
    }
}
