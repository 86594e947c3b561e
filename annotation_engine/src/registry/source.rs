//! TOML source units
//!
//! A source unit stands in for one source file: a namespace, the `use`
//! imports in scope, and the classes declared in it.
//!
//! ```toml
//! namespace = "Acme\\Blog"
//!
//! [imports]
//! ORM = "Acme\\Mapping"
//!
//! [[classes]]
//! name = "Post"
//! doc = "/** @ORM\\Entity */"
//!
//! [[classes.properties]]
//! name = "title"
//! doc = "/** @ORM\\Column(type=\"string\") */"
//! ```
use super::definition::{
    ClassDefinition, ClassKind, Constructor, MethodDefinition, PropertyDefinition, Visibility,
};
use super::error::{RegistryError, RegistryResult};
use crate::config::compile_time::registry::MAX_DEFINITION_FILE_SIZE;
use crate::grammar::{ArrayKey, ArrayValue, Value};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceUnit {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub imports: BTreeMap<String, String>,
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    pub doc: Option<String>,
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub constructor: ConstructorSpec,
    #[serde(default)]
    pub constants: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructorSpec {
    #[default]
    None,
    Values,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpec {
    pub name: String,
    pub doc: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    pub default: Option<toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodSpec {
    pub name: String,
    pub doc: Option<String>,
}

/// Read and parse a source unit from disk
pub fn load_unit(path: &Path) -> RegistryResult<SourceUnit> {
    let metadata = std::fs::metadata(path).map_err(|e| RegistryError::io(path, e))?;
    if metadata.len() > MAX_DEFINITION_FILE_SIZE {
        return Err(RegistryError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: MAX_DEFINITION_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
    parse_unit(&content, path)
}

/// Parse source-unit text; `path` is only used for messages
pub fn parse_unit(content: &str, path: &Path) -> RegistryResult<SourceUnit> {
    let mut unit: SourceUnit = toml::from_str(content)
        .map_err(|e| RegistryError::invalid_definition(path, e.to_string()))?;
    unit.path = path.to_path_buf();
    unit.namespace = unit.namespace.trim_matches('\\').to_string();
    Ok(unit)
}

impl SourceUnit {
    /// Fully-qualified name of a class declared in this unit
    pub fn qualify(&self, name: &str) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };

        let imported = self
            .imports
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(first))
            .map(|(_, target)| target.trim_start_matches('\\'));

        match (imported, rest) {
            (Some(target), Some(rest)) => format!("{}\\{}", target, rest),
            (Some(target), None) => target.to_string(),
            (None, _) if self.namespace.is_empty() => name.to_string(),
            (None, _) => format!("{}\\{}", self.namespace, name),
        }
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes
            .iter()
            .map(|class| self.declared_name(&class.name))
            .collect()
    }

    fn declared_name(&self, name: &str) -> String {
        let name = name.trim_start_matches('\\');
        if self.namespace.is_empty() || name.contains('\\') {
            name.to_string()
        } else {
            format!("{}\\{}", self.namespace, name)
        }
    }

    /// Convert every declared class into a registry definition
    pub fn to_definitions(&self) -> RegistryResult<Vec<ClassDefinition>> {
        self.classes
            .iter()
            .map(|class| self.to_definition(class))
            .collect()
    }

    fn to_definition(&self, spec: &ClassSpec) -> RegistryResult<ClassDefinition> {
        let mut class = ClassDefinition::new(self.declared_name(&spec.name)).with_kind(spec.kind);
        class.doc_comment = spec.doc.clone();

        for (alias, target) in &self.imports {
            class = class.with_import(alias, target);
        }

        if let Some(parent) = &spec.extends {
            class = class.with_parent(&self.qualify(parent));
        }
        for interface in &spec.implements {
            class = class.with_parent(&self.qualify(interface));
        }
        for name in &spec.traits {
            class = class.with_trait(&self.qualify(name));
        }

        class.constructor = match spec.constructor {
            ConstructorSpec::None => Constructor::None,
            ConstructorSpec::Values => Constructor::ValueMap,
        };

        for (name, value) in &spec.constants {
            let value = convert_value(value).map_err(|message| {
                RegistryError::invalid_constant(&format!("{}::{}", class.name, name), message)
            })?;
            class = class.with_constant(name, value);
        }

        for property in &spec.properties {
            let default = match &property.default {
                Some(value) => convert_value(value).map_err(|message| {
                    RegistryError::invalid_definition(
                        &self.path,
                        format!("default of {}::${}: {}", class.name, property.name, message),
                    )
                })?,
                None => Value::Null,
            };

            let mut definition = PropertyDefinition::new(&property.name)
                .with_visibility(property.visibility)
                .with_default(default);
            definition.doc_comment = property.doc.clone();
            class = class.with_property(definition);
        }

        for method in &spec.methods {
            let mut definition = MethodDefinition::new(&method.name);
            definition.doc_comment = method.doc.clone();
            class = class.with_method(definition);
        }

        Ok(class)
    }
}

/// Convert a TOML value into an annotation value
pub fn convert_value(value: &toml::Value) -> Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Integer(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .iter()
                .map(convert_value)
                .collect::<Result<ArrayValue, String>>()?,
        ),
        toml::Value::Table(table) => {
            let mut array = ArrayValue::new();
            for (key, item) in table {
                array.insert(ArrayKey::from_string(key), convert_value(item)?);
            }
            Value::Array(array)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    const UNIT: &str = r#"
namespace = "Acme\\Blog"

[imports]
ORM = "Acme\\Mapping"
Base = "Acme\\Model\\Entity"

[[classes]]
name = "Post"
doc = "/** @ORM\\Entity */"
extends = "Base"
traits = ["Timestamps"]

[classes.constants]
STATUS = "draft"
LIMITS = [1, 2]

[[classes.properties]]
name = "title"
doc = "/** @ORM\\Column */"

[[classes.properties]]
name = "secret"
visibility = "private"
default = 3

[[classes.methods]]
name = "publish"
"#;

    #[test]
    fn test_parse_unit() {
        let unit = parse_unit(UNIT, Path::new("post.toml")).unwrap();
        assert_eq!(unit.namespace, "Acme\\Blog");
        assert_eq!(unit.class_names(), vec!["Acme\\Blog\\Post".to_string()]);

        let classes = unit.to_definitions().unwrap();
        let post = &classes[0];
        assert_eq!(post.name, "Acme\\Blog\\Post");
        assert_eq!(post.parents, vec!["Acme\\Model\\Entity".to_string()]);
        assert_eq!(post.traits, vec!["Acme\\Blog\\Timestamps".to_string()]);
        assert_eq!(post.imports.get("orm").map(String::as_str), Some("Acme\\Mapping"));
        assert_eq!(post.constants.get("STATUS"), Some(&Value::from("draft")));
        assert_eq!(post.constants.get("LIMITS"), Some(&Value::from(vec![1i64, 2])));
        assert!(!post.property("secret").unwrap().is_public());
        assert_eq!(post.property("secret").unwrap().default, Value::Integer(3));
        assert!(post.method("publish").is_some());
        assert!(!post.constructor.accepts_values());
    }

    #[test]
    fn test_qualify() {
        let unit = parse_unit(UNIT, Path::new("post.toml")).unwrap();
        assert_eq!(unit.qualify("\\Other\\Thing"), "Other\\Thing");
        assert_eq!(unit.qualify("orm\\Column"), "Acme\\Mapping\\Column");
        assert_eq!(unit.qualify("Comment"), "Acme\\Blog\\Comment");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = parse_unit("[[classes]]\nname = \"A\"\ncolour = 1\n", Path::new("bad.toml"));
        assert_matches!(result, Err(RegistryError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_load_unit_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(UNIT.as_bytes()).unwrap();
        let unit = load_unit(file.path()).unwrap();
        assert_eq!(unit.path, file.path());
        assert_eq!(unit.classes.len(), 1);

        let missing = load_unit(Path::new("/definitely/not/here.toml"));
        assert_matches!(missing, Err(RegistryError::Io { .. }));
    }
}
