//! Syntax errors raised while consuming docblock tokens
//!
//! Messages follow the `[Syntax Error] Expected X, got Y in context.` shape;
//! positions are byte offsets into the trimmed docblock.

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

fn in_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" in {}", context)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("[Syntax Error] Expected {expected}, got '{found}' at position {}{}.", span.start().offset, in_context(context))]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
        context: String,
    },

    #[error("[Syntax Error] Expected {expected}, got end of string{}.", in_context(context))]
    UnexpectedEndOfInput { expected: String, context: String },

    #[error("[Syntax Error] Nesting deeper than {limit} levels at position {}{}.", span.start().offset, in_context(context))]
    MaxNestingDepth {
        limit: usize,
        span: Span,
        context: String,
    },

    #[error("[Syntax Error] More than {limit} annotations{}.", in_context(context))]
    TooManyAnnotations { limit: usize, context: String },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span, context: &str) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
            context: context.to_string(),
        }
    }

    pub fn unexpected_end_of_input(expected: &str, context: &str) -> Self {
        Self::UnexpectedEndOfInput {
            expected: expected.to_string(),
            context: context.to_string(),
        }
    }

    pub fn max_nesting_depth(limit: usize, span: Span, context: &str) -> Self {
        Self::MaxNestingDepth {
            limit,
            span,
            context: context.to_string(),
        }
    }

    pub fn too_many_annotations(limit: usize, context: &str) -> Self {
        Self::TooManyAnnotations {
            limit,
            context: context.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::MaxNestingDepth { .. } | Self::TooManyAnnotations { .. } => {
                codes::syntax::MAX_NESTING_DEPTH
            }
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. } | Self::MaxNestingDepth { span, .. } => Some(*span),
            Self::UnexpectedEndOfInput { .. } | Self::TooManyAnnotations { .. } => None,
        }
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_unexpected_token_message() {
        let start = Position::new(12, 1, 13);
        let err = SyntaxError::unexpected_token(
            "PlainValue",
            ")",
            Span::new(start, start.advance(')')),
            "class Acme\\Post",
        );
        assert_eq!(
            err.to_string(),
            "[Syntax Error] Expected PlainValue, got ')' at position 12 in class Acme\\Post."
        );
        assert_eq!(err.error_code(), codes::syntax::UNEXPECTED_TOKEN);
        assert!(err.span().is_some());
    }

    #[test]
    fn test_end_of_input_without_context() {
        let err = SyntaxError::unexpected_end_of_input("')'", "");
        assert_eq!(err.to_string(), "[Syntax Error] Expected ')', got end of string.");
        assert_eq!(err.span(), None);
    }
}
