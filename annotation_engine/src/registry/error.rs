//! Registry and definition-file errors
use crate::logging::codes::{self, Code};
use std::path::PathBuf;
use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read definition file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Definition file {path} is too large: {size} bytes (limit {limit})")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Invalid definition file {path}: {message}")]
    InvalidDefinition { path: PathBuf, message: String },

    #[error("Invalid constant {name}: {message}")]
    InvalidConstant { name: String, message: String },
}

impl RegistryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_definition(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_constant(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidConstant {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Io { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => codes::file_processing::FILE_NOT_FOUND,
                std::io::ErrorKind::PermissionDenied => codes::file_processing::PERMISSION_DENIED,
                _ => codes::file_processing::IO_ERROR,
            },
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::InvalidDefinition { .. } => codes::registry::INVALID_DEFINITION_FILE,
            Self::InvalidConstant { .. } => codes::registry::INVALID_CONSTANT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_codes() {
        let missing = RegistryError::io(
            "a.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(missing.error_code().as_str(), "E005");

        let other = RegistryError::io("a.toml", std::io::Error::other("boom"));
        assert_eq!(other.error_code().as_str(), "E011");
    }

    #[test]
    fn test_messages() {
        let err = RegistryError::invalid_constant("1BAD", "not an identifier");
        assert_eq!(err.to_string(), "Invalid constant 1BAD: not an identifier");
        assert_eq!(err.error_code(), codes::registry::INVALID_CONSTANT);
    }
}
