use crate::logging::codes::{self, Code};
use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImportError {
    #[error("Either fallback namespaces or an import table can be configured, not both")]
    ConflictingModes,

    #[error("Trait {name} providing a member of {class} could not be loaded")]
    TraitNotFound { name: String, class: String },
}

impl ImportError {
    pub fn trait_not_found(name: &str, class: &str) -> Self {
        Self::TraitNotFound {
            name: name.to_string(),
            class: class.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::ConflictingModes => codes::imports::CONFLICTING_MODES,
            Self::TraitNotFound { .. } => codes::imports::TRAIT_NOT_FOUND,
        }
    }
}
