//! Declarations the engine introspects: classes, their members and constructors
use crate::grammar::{Annotation, Value, ValueMap};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type FactoryFn = dyn Fn(&str, ValueMap) -> Result<Annotation, String> + Send + Sync;

/// Native constructor taking the raw value map
#[derive(Clone)]
pub struct Factory(Arc<FactoryFn>);

impl Factory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, ValueMap) -> Result<Annotation, String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, class: &str, values: ValueMap) -> Result<Annotation, String> {
        (self.0)(class, values)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory(..)")
    }
}

/// How a class is constructed when used as an annotation
#[derive(Debug, Clone, Default)]
pub enum Constructor {
    /// No value-accepting constructor: values are injected into public fields
    #[default]
    None,
    /// Constructor taking the whole value map; the map becomes the object's properties
    ValueMap,
    /// Constructor implemented natively
    Custom(Factory),
}

impl Constructor {
    pub fn accepts_values(&self) -> bool {
        !matches!(self, Constructor::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub name: String,
    pub doc_comment: Option<String>,
    pub visibility: Visibility,
    pub default: Value,
    /// Class or trait that physically declares the property, when not the owner
    pub declared_in: Option<String>,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc_comment: None,
            visibility: Visibility::Public,
            default: Value::Null,
            declared_in: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub name: String,
    pub doc_comment: Option<String>,
    pub declared_in: Option<String>,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc_comment: None,
            declared_in: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }
}

/// A class, interface or trait as seen by the engine
#[derive(Debug, Clone, Default)]
pub struct ClassDefinition {
    /// Fully-qualified name without a leading separator
    pub name: String,
    pub kind: ClassKind,
    pub doc_comment: Option<String>,
    /// `use` statements in scope of the declaration: lower-cased alias to FQ name
    pub imports: BTreeMap<String, String>,
    pub properties: Vec<PropertyDefinition>,
    pub methods: Vec<MethodDefinition>,
    pub constants: BTreeMap<String, Value>,
    /// Parent class first, then implemented interfaces
    pub parents: Vec<String>,
    pub traits: Vec<String>,
    pub constructor: Constructor,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.trim_start_matches('\\').to_string(),
            ..Default::default()
        }
    }

    pub fn namespace(&self) -> &str {
        self.name.rsplit_once('\\').map_or("", |(ns, _)| ns)
    }

    pub fn short_name(&self) -> &str {
        self.name.rsplit_once('\\').map_or(&self.name, |(_, short)| short)
    }

    pub fn doc(&self) -> &str {
        self.doc_comment.as_deref().unwrap_or("")
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Method names are case-insensitive
    pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn is_trait(&self) -> bool {
        self.kind == ClassKind::Trait
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn with_import(mut self, alias: &str, name: &str) -> Self {
        self.imports.insert(
            alias.to_ascii_lowercase(),
            name.trim_start_matches('\\').to_string(),
        );
        self
    }

    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_constant(mut self, name: &str, value: Value) -> Self {
        self.constants.insert(name.to_string(), value);
        self
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parents.push(parent.trim_start_matches('\\').to_string());
        self
    }

    pub fn with_trait(mut self, name: &str) -> Self {
        self.traits.push(name.trim_start_matches('\\').to_string());
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = constructor;
        self
    }
}
