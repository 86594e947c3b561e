//! Docblock tokens
use serde::{Deserialize, Serialize};
use std::fmt;

/// A lexed token. Literal tokens keep the text they carry so syntax errors can
/// quote it back; keyword tokens keep their original spelling (`TRUE`, `Null`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// Letters, digits and underscores, possibly joined by `::`
    Identifier(String),
    /// `\`
    NamespaceSeparator,
    /// Integer literal text, sign included
    Integer(String),
    /// Float literal text, sign included
    Float(String),
    /// String contents with `""` already unescaped to `"`
    String(String),
    True(String),
    False(String),
    Null(String),
    At,
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    Equals,
    Colon,
    Comma,
    Minus,
}

/// Payload-free token classification used for matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    NamespaceSeparator,
    Integer,
    Float,
    String,
    True,
    False,
    Null,
    At,
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    Equals,
    Colon,
    Comma,
    Minus,
    EndOfInput,
}

/// Kinds accepted as a name segment (`@true\Foo` is a legal, if odd, name)
pub const NAME_SEGMENT_KINDS: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Null,
];

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Identifier(_) => TokenKind::Identifier,
            Token::NamespaceSeparator => TokenKind::NamespaceSeparator,
            Token::Integer(_) => TokenKind::Integer,
            Token::Float(_) => TokenKind::Float,
            Token::String(_) => TokenKind::String,
            Token::True(_) => TokenKind::True,
            Token::False(_) => TokenKind::False,
            Token::Null(_) => TokenKind::Null,
            Token::At => TokenKind::At,
            Token::OpenParen => TokenKind::OpenParen,
            Token::CloseParen => TokenKind::CloseParen,
            Token::OpenCurly => TokenKind::OpenCurly,
            Token::CloseCurly => TokenKind::CloseCurly,
            Token::Equals => TokenKind::Equals,
            Token::Colon => TokenKind::Colon,
            Token::Comma => TokenKind::Comma,
            Token::Minus => TokenKind::Minus,
        }
    }

    /// The token's value as seen by the grammar
    pub fn literal(&self) -> &str {
        match self {
            Token::Identifier(s)
            | Token::Integer(s)
            | Token::Float(s)
            | Token::String(s)
            | Token::True(s)
            | Token::False(s)
            | Token::Null(s) => s,
            Token::NamespaceSeparator => "\\",
            Token::At => "@",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenCurly => "{",
            Token::CloseCurly => "}",
            Token::Equals => "=",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Minus => "-",
        }
    }

    pub fn is_name_segment(&self) -> bool {
        NAME_SEGMENT_KINDS.contains(&self.kind())
    }

    /// Classify a bare word, recognizing keywords case-insensitively
    pub fn from_word(word: &str) -> Token {
        match word.to_ascii_lowercase().as_str() {
            "true" => Token::True(word.to_string()),
            "false" => Token::False(word.to_string()),
            "null" => Token::Null(word.to_string()),
            _ => Token::Identifier(word.to_string()),
        }
    }

    pub fn from_symbol(ch: char) -> Option<Token> {
        let token = match ch {
            '\\' => Token::NamespaceSeparator,
            '@' => Token::At,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            '{' => Token::OpenCurly,
            '}' => Token::CloseCurly,
            '=' => Token::Equals,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '-' => Token::Minus,
            _ => return None,
        };
        Some(token)
    }
}

impl TokenKind {
    /// Name used in "Expected X" syntax error messages
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::NamespaceSeparator => "namespace separator",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::At => "'@'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenCurly => "'{'",
            TokenKind::CloseCurly => "'}'",
            TokenKind::Equals => "'='",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Minus => "'-'",
            TokenKind::EndOfInput => "end of string",
        }
    }

    /// Join several kinds the way the parser phrases alternatives
    pub fn describe_any(kinds: &[TokenKind]) -> String {
        kinds
            .iter()
            .map(TokenKind::describe)
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive_and_keep_spelling() {
        assert_eq!(Token::from_word("TRUE"), Token::True("TRUE".into()));
        assert_eq!(Token::from_word("Null").literal(), "Null");
        assert_eq!(Token::from_word("nullable").kind(), TokenKind::Identifier);
    }

    #[test]
    fn test_name_segments() {
        assert!(Token::from_word("false").is_name_segment());
        assert!(Token::Identifier("Route".into()).is_name_segment());
        assert!(!Token::NamespaceSeparator.is_name_segment());
    }

    #[test]
    fn test_describe_any() {
        assert_eq!(
            TokenKind::describe_any(&[TokenKind::Integer, TokenKind::String]),
            "integer or string"
        );
    }
}
