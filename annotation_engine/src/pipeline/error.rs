use crate::imports::ImportError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::registry::RegistryError;
use crate::semantic_analysis::SemanticError;
use crate::syntax::SyntaxError;
use crate::utils::Span;

/// Any failure of a parse or read call
///
/// Syntax and semantic errors display their message unchanged so callers can
/// match on the well-known `[Syntax Error]` / `[Semantical Error]` prefixes.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("Lexical analysis failed: {0}")]
    Lexical(#[from] LexerError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("Import resolution failed: {0}")]
    Import(#[from] ImportError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Class {name} could not be loaded")]
    ClassNotFound { name: String },

    #[error("{kind} {class}::{member} does not exist")]
    MemberNotFound {
        kind: &'static str,
        class: String,
        member: String,
    },
}

impl AnnotationError {
    pub fn class_not_found(name: &str) -> Self {
        Self::ClassNotFound {
            name: name.to_string(),
        }
    }

    pub fn member_not_found(kind: &'static str, class: &str, member: &str) -> Self {
        Self::MemberNotFound {
            kind,
            class: class.to_string(),
            member: member.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Lexical(e) => e.error_code(),
            Self::Syntax(e) => e.error_code(),
            Self::Semantic(e) => e.error_code(),
            Self::Import(e) => e.error_code(),
            Self::Registry(e) => e.error_code(),
            Self::ClassNotFound { .. } | Self::MemberNotFound { .. } => {
                codes::semantic::TYPE_NOT_LOADABLE
            }
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax(e) => e.span(),
            _ => None,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Semantic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_messages() {
        let err: AnnotationError = SyntaxError::unexpected_end_of_input("')'", "").into();
        assert_eq!(err.to_string(), "[Syntax Error] Expected ')', got end of string.");
        assert!(err.is_syntax());
        assert_eq!(err.error_code(), codes::syntax::UNEXPECTED_END_OF_INPUT);

        let err: AnnotationError = ImportError::ConflictingModes.into();
        assert!(err.to_string().starts_with("Import resolution failed"));
    }
}
