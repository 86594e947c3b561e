//! Semantic, type, enum and creation errors
use crate::logging::{codes, Code};

pub type SemanticResult<T> = Result<T, SemanticError>;

fn constant_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(", {}", context)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SemanticError {
    #[error("[Semantical Error] The annotation \"@{name}\" in {context} was never imported. Did you maybe forget to add a \"use\" statement for this annotation?")]
    NeverImported { name: String, context: String },

    #[error("[Semantical Error] The annotation \"@{name}\" in {context} does not exist, or could not be auto-loaded.")]
    TypeNotLoadable { name: String, context: String },

    #[error("[Semantical Error] The class \"{name}\" is not annotated with @Annotation. Are you sure this class can be used as annotation? If so, then you need to add @Annotation to the _class_ doc comment of \"{name}\". If it is indeed no annotation, then you need to add @IgnoreAnnotation(\"{original}\") to the _class_ doc comment of {context}.")]
    NotAnAnnotation {
        name: String,
        original: String,
        context: String,
    },

    #[error("[Semantical Error] Annotation @{name} is not allowed to be declared on {context}. You may only use this annotation on these code elements: {allowed}.")]
    TargetNotAllowed {
        name: String,
        context: String,
        allowed: String,
    },

    #[error("[Semantical Error] Couldn't find constant {identifier}{}.", constant_context(context))]
    UndefinedConstant { identifier: String, context: String },

    #[error("[Type Error] Attribute \"{attribute}\" of @{annotation} declared on {context} expects {expected}, but got {actual}.")]
    AttributeTypeMismatch {
        attribute: String,
        annotation: String,
        context: String,
        expected: String,
        actual: String,
    },

    #[error("[Type Error] Attribute \"{attribute}\" of @{annotation} declared on {context} expects {expected}. This value should not be null.")]
    RequiredAttributeMissing {
        attribute: String,
        annotation: String,
        context: String,
        expected: String,
    },

    #[error("[Enum Error] Attribute \"{attribute}\" of @{annotation} declared on {context} accepts only [{allowed}], but got {given}.")]
    InvalidEnumerator {
        attribute: String,
        annotation: String,
        context: String,
        allowed: String,
        given: String,
    },

    #[error("[Creation Error] The annotation @{annotation} declared on {context} does not have a property named \"{property}\". Available properties: {available}")]
    UnknownProperty {
        annotation: String,
        context: String,
        property: String,
        available: String,
    },

    #[error("[Creation Error] The annotation @{annotation} declared on {context} does not accept any values, but got {values}.")]
    ValuesNotAccepted {
        annotation: String,
        context: String,
        values: String,
    },

    /// A native constructor rejected its values
    #[error("[Creation Error] {message}")]
    ConstructionFailed { annotation: String, message: String },
}

impl SemanticError {
    pub fn never_imported(name: &str, context: &str) -> Self {
        Self::NeverImported {
            name: name.to_string(),
            context: context.to_string(),
        }
    }

    pub fn type_not_loadable(name: &str, context: &str) -> Self {
        Self::TypeNotLoadable {
            name: name.to_string(),
            context: context.to_string(),
        }
    }

    pub fn not_an_annotation(name: &str, original: &str, context: &str) -> Self {
        Self::NotAnAnnotation {
            name: name.to_string(),
            original: original.to_string(),
            context: context.to_string(),
        }
    }

    pub fn target_not_allowed(name: &str, context: &str, allowed: &str) -> Self {
        Self::TargetNotAllowed {
            name: name.to_string(),
            context: context.to_string(),
            allowed: allowed.to_string(),
        }
    }

    pub fn undefined_constant(identifier: &str, context: &str) -> Self {
        Self::UndefinedConstant {
            identifier: identifier.to_string(),
            context: context.to_string(),
        }
    }

    pub fn construction_failed(annotation: &str, message: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            annotation: annotation.to_string(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::NeverImported { .. } => codes::semantic::NEVER_IMPORTED,
            Self::TypeNotLoadable { .. } => codes::semantic::TYPE_NOT_LOADABLE,
            Self::NotAnAnnotation { .. } => codes::semantic::NOT_AN_ANNOTATION,
            Self::TargetNotAllowed { .. } => codes::semantic::TARGET_NOT_ALLOWED,
            Self::UndefinedConstant { .. } => codes::semantic::UNDEFINED_CONSTANT,
            Self::AttributeTypeMismatch { .. } => codes::semantic::ATTRIBUTE_TYPE_MISMATCH,
            Self::RequiredAttributeMissing { .. } => codes::semantic::REQUIRED_ATTRIBUTE_MISSING,
            Self::InvalidEnumerator { .. } => codes::semantic::INVALID_ENUMERATOR,
            Self::UnknownProperty { .. }
            | Self::ValuesNotAccepted { .. }
            | Self::ConstructionFailed { .. } => codes::semantic::CREATION_ERROR,
        }
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}
