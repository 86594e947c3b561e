//! Docblock lexer
//!
//! Produces tokens lazily. Whitespace and `*` decoration are insignificant, and
//! so is any character that starts no token; nothing the lexer sees is an error.

use crate::config::compile_time::lexical::MAX_DOCBLOCK_SIZE;
use crate::config::runtime::LexicalPreferences;
use crate::log_debug;
use crate::logging::codes;
use crate::tokens::{SpannedToken, Token};
use crate::utils::{Position, Span, Spanned};

#[derive(Debug, Clone, thiserror::Error)]
pub enum LexerError {
    #[error("Docblock too large: {size} bytes (max {MAX_DOCBLOCK_SIZE})")]
    DocblockTooLarge { size: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::DocblockTooLarge { .. } => codes::lexical::DOCBLOCK_TOO_LARGE,
        }
    }
}

/// Counters gathered while lexing one docblock
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub symbol_tokens: usize,
    pub skipped_chars: usize,
    pub longest_identifier: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token {
            Token::Identifier(name) => {
                self.identifier_tokens += 1;
                self.longest_identifier = self.longest_identifier.max(name.len());
            }
            Token::Integer(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::True(_)
            | Token::False(_)
            | Token::Null(_) => self.literal_tokens += 1,
            _ => self.symbol_tokens += 1,
        }
    }
}

/// Lazy tokenizer over already-trimmed docblock text
pub struct DocLexer<'a> {
    input: &'a str,
    pos: Position,
    metrics: LexicalMetrics,
    collect_metrics: bool,
    finished: bool,
}

impl<'a> DocLexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_preferences(input, &LexicalPreferences::default())
    }

    pub fn with_preferences(input: &'a str, preferences: &LexicalPreferences) -> Self {
        Self {
            input,
            pos: Position::start(),
            metrics: LexicalMetrics::default(),
            collect_metrics: preferences.collect_metrics,
            finished: false,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos.offset..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.bump();
        }
    }

    fn slice_from(&self, start: Position) -> &'a str {
        &self.input[start.offset..self.pos.offset]
    }

    fn lex_word(&mut self, start: Position) -> Token {
        self.bump_while(is_word_char);

        // `Class::CONST` stays one identifier; a dangling `::` does not join
        while self.rest().starts_with("::") && self.peek_char_at(2).is_some_and(is_word_start) {
            self.bump();
            self.bump();
            self.bump_while(is_word_char);
        }

        Token::from_word(self.slice_from(start))
    }

    fn lex_number(&mut self, start: Position) -> Token {
        if matches!(self.peek_char(), Some('+' | '-')) {
            self.bump();
        }
        self.bump_while(|c| c.is_ascii_digit());

        let mut is_float = false;
        if self.peek_char() == Some('.') && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            let exponent_digits_at = match self.peek_char_at(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self
                .peek_char_at(exponent_digits_at)
                .is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                for _ in 0..exponent_digits_at {
                    self.bump();
                }
                self.bump_while(|c| c.is_ascii_digit());
            }
        }

        let text = self.slice_from(start).to_string();
        if is_float {
            Token::Float(text)
        } else {
            Token::Integer(text)
        }
    }

    /// Scan a `"..."` literal where `""` stands for one quote. Returns `None`
    /// without consuming anything when the literal is never closed.
    fn lex_string(&mut self) -> Option<Token> {
        let body = &self.rest()[1..];
        let mut value = String::new();
        let mut consumed = 0;
        loop {
            let close = body[consumed..].find('"')?;
            value.push_str(&body[consumed..consumed + close]);
            consumed += close + 1;
            if body[consumed..].starts_with('"') {
                value.push('"');
                consumed += 1;
            } else {
                break;
            }
        }

        let literal_end = self.pos.offset + 1 + consumed;
        while self.pos.offset < literal_end {
            self.bump();
        }
        Some(Token::String(value))
    }

    fn next_token(&mut self) -> Option<SpannedToken> {
        loop {
            let ch = self.peek_char()?;
            let start = self.pos;

            if ch.is_whitespace() || ch == '*' {
                self.bump();
                continue;
            }

            let token = if is_word_start(ch) {
                self.lex_word(start)
            } else if ch.is_ascii_digit()
                || (matches!(ch, '+' | '-') && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()))
            {
                self.lex_number(start)
            } else if ch == '"' {
                match self.lex_string() {
                    Some(token) => token,
                    None => {
                        self.bump();
                        self.metrics.skipped_chars += 1;
                        continue;
                    }
                }
            } else if let Some(token) = Token::from_symbol(ch) {
                self.bump();
                token
            } else {
                self.bump();
                self.metrics.skipped_chars += 1;
                continue;
            };

            if self.collect_metrics {
                self.metrics.record_token(&token);
            }
            return Some(Spanned::new(token, Span::new(start, self.pos)));
        }
    }
}

impl Iterator for DocLexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.is_none() {
            self.finished = true;
            if self.collect_metrics {
                log_debug!("Docblock tokenized",
                    "tokens" => self.metrics.total_tokens,
                    "identifiers" => self.metrics.identifier_tokens,
                    "skipped_chars" => self.metrics.skipped_chars
                );
            }
        }
        token
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte offset of the first `@` that can open an annotation: at the very start,
/// or right after a space, tab or `*`.
pub fn find_initial_position(input: &str) -> Option<usize> {
    input.match_indices('@').map(|(pos, _)| pos).find(|&pos| {
        pos == 0 || matches!(input.as_bytes()[pos - 1], b' ' | b'\t' | b'*')
    })
}

/// Cut a raw docblock down to the text the lexer should see, or `None` when
/// it cannot contain an annotation.
pub fn prepare_docblock(input: &str) -> Result<Option<&str>, LexerError> {
    if input.len() > MAX_DOCBLOCK_SIZE {
        return Err(LexerError::DocblockTooLarge { size: input.len() });
    }

    Ok(find_initial_position(input)
        .map(|pos| input[pos..].trim_matches(|c| matches!(c, '*' | ' ' | '/'))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    fn lex(input: &str) -> Vec<Token> {
        DocLexer::new(input).map(|t| t.value).collect()
    }

    #[test]
    fn test_annotation_with_arguments() {
        assert_eq!(
            lex(r#"@Route("/blog", name = "blog_index")"#),
            vec![
                Token::At,
                Token::Identifier("Route".into()),
                Token::OpenParen,
                Token::String("/blog".into()),
                Token::Comma,
                Token::Identifier("name".into()),
                Token::Equals,
                Token::String("blog_index".into()),
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn test_namespace_separator_is_its_own_token() {
        let tokens: Vec<_> = DocLexer::new(r"@\Acme\Route").collect();
        let kinds: Vec<_> = tokens.iter().map(|t| t.value.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::At,
                TokenKind::NamespaceSeparator,
                TokenKind::Identifier,
                TokenKind::NamespaceSeparator,
                TokenKind::Identifier,
            ]
        );
        assert!(tokens[3].span.is_adjacent_to(&tokens[4].span));
    }

    #[test]
    fn test_class_constant_stays_one_identifier() {
        assert_eq!(
            lex("Status::ACTIVE Foo::class Bar::"),
            vec![
                Token::Identifier("Status::ACTIVE".into()),
                Token::Identifier("Foo::class".into()),
                Token::Identifier("Bar".into()),
                Token::Colon,
                Token::Colon,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            lex("42 -7 3.14 1e3 +2.5E-2 5."),
            vec![
                Token::Integer("42".into()),
                Token::Integer("-7".into()),
                Token::Float("3.14".into()),
                Token::Float("1e3".into()),
                Token::Float("+2.5E-2".into()),
                Token::Integer("5".into()),
            ]
        );
    }

    #[test]
    fn test_minus_before_word_is_a_symbol() {
        assert_eq!(
            lex("foo-bar"),
            vec![
                Token::Identifier("foo".into()),
                Token::Minus,
                Token::Identifier("bar".into()),
            ]
        );
    }

    #[test]
    fn test_string_escapes_and_unterminated_quote() {
        assert_eq!(
            lex(r#""say ""hi""" "open"#),
            vec![
                Token::String(r#"say "hi""#.into()),
                Token::Identifier("open".into()),
            ]
        );
    }

    #[test]
    fn test_keywords_and_skipped_characters() {
        let mut lexer = DocLexer::new("TRUE; false # Null");
        let tokens: Vec<_> = lexer.by_ref().map(|t| t.value.kind()).collect();
        assert_eq!(
            tokens,
            vec![TokenKind::True, TokenKind::False, TokenKind::Null]
        );
        assert_eq!(lexer.metrics().skipped_chars, 2);
        assert_eq!(lexer.metrics().literal_tokens, 3);
    }

    #[test]
    fn test_offsets_are_byte_positions() {
        let tokens: Vec<_> = DocLexer::new("@Foo(\n * 12)").collect();
        let integer = &tokens[3];
        assert_eq!(integer.value, Token::Integer("12".into()));
        assert_eq!(integer.span.start.offset, 9);
        assert_eq!(integer.span.start.line, 2);
    }

    #[test]
    fn test_find_initial_position() {
        assert_eq!(find_initial_position("@Foo"), Some(0));
        assert_eq!(find_initial_position("/** @Foo */"), Some(4));
        assert_eq!(find_initial_position("/**\n *@Foo */"), Some(6));
        assert_eq!(find_initial_position("mail me at a@b.c"), None);
        assert_eq!(find_initial_position("a@b.c\t@Bar"), Some(6));
    }

    #[test]
    fn test_prepare_docblock_trims_decoration() {
        let prepared = prepare_docblock("/**\n * Text\n * @Foo(1)\n */").unwrap();
        assert_eq!(prepared, Some("@Foo(1)\n"));
        assert_eq!(prepare_docblock("/** no tags */").unwrap(), None);
    }
}
