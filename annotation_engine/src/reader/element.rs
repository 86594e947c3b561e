//! Elements a docblock can be attached to
use crate::grammar::Target;
use crate::imports::ImportScope;
use crate::registry::{ClassDefinition, MethodDefinition, PropertyDefinition};

/// A class, or one of its methods or properties
#[derive(Debug, Clone, Copy)]
pub enum DeclaringElement<'a> {
    Class(&'a ClassDefinition),
    Method {
        class: &'a ClassDefinition,
        method: &'a MethodDefinition,
    },
    Property {
        class: &'a ClassDefinition,
        property: &'a PropertyDefinition,
    },
}

impl<'a> DeclaringElement<'a> {
    pub fn class(&self) -> &'a ClassDefinition {
        match *self {
            Self::Class(class) => class,
            Self::Method { class, .. } | Self::Property { class, .. } => class,
        }
    }

    pub fn target(&self) -> Target {
        match *self {
            Self::Class(_) => Target::CLASS,
            Self::Method { .. } => Target::METHOD,
            Self::Property { .. } => Target::PROPERTY,
        }
    }

    pub fn doc_comment(&self) -> &'a str {
        match *self {
            Self::Class(class) => class.doc(),
            Self::Method { method, .. } => method.doc_comment.as_deref().unwrap_or_default(),
            Self::Property { property, .. } => property.doc_comment.as_deref().unwrap_or_default(),
        }
    }

    /// How the element is named in error messages
    pub fn context(&self) -> String {
        match *self {
            Self::Class(class) => format!("class {}", class.name),
            Self::Method { class, method } => format!("method {}::{}()", class.name, method.name),
            Self::Property { class, property } => {
                format!("property {}::${}", class.name, property.name)
            }
        }
    }

    pub fn import_scope(&self) -> ImportScope<'a> {
        match *self {
            Self::Class(class) => ImportScope::Class(class),
            Self::Method { class, method } => ImportScope::Member {
                class,
                declared_in: method.declared_in.as_deref(),
            },
            Self::Property { class, property } => ImportScope::Member {
                class,
                declared_in: property.declared_in.as_deref(),
            },
        }
    }
}
