//! Built-in directive annotations understood by the metadata collector
//!
//! `Target`, `Attribute`, `Attributes` and `Enum` describe annotation types;
//! `IgnoreAnnotation` lists names a class wants skipped. The first four have
//! hand-built descriptors so describing them never needs a parse.

use super::descriptor::{AnnotationDescriptor, AttributeType, ConstructionStyle, FieldSlot};
use crate::grammar::{Annotation, ArrayKey, Target, Value, ValueMap};
use crate::imports::ImportTable;
use crate::registry::{ClassDefinition, Constructor, Factory, PropertyDefinition, TypeOracle};
use crate::semantic_analysis::describe_actual;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

pub const BUILTIN_NAMESPACE: &str = "AnnotationEngine\\Annotation";
pub const TARGET: &str = "AnnotationEngine\\Annotation\\Target";
pub const ATTRIBUTE: &str = "AnnotationEngine\\Annotation\\Attribute";
pub const ATTRIBUTES: &str = "AnnotationEngine\\Annotation\\Attributes";
pub const ENUM: &str = "AnnotationEngine\\Annotation\\Enum";
pub const IGNORE_ANNOTATION: &str = "AnnotationEngine\\Annotation\\IgnoreAnnotation";

static DEFINITIONS: LazyLock<HashMap<String, Arc<ClassDefinition>>> = LazyLock::new(|| {
    [
        target_class(),
        attribute_class(),
        attributes_class(),
        enum_class(),
        ignore_annotation_class(),
    ]
    .into_iter()
    .map(|class| (class.name.to_ascii_lowercase(), Arc::new(class)))
    .collect()
});

/// Definition of a built-in directive type
pub fn definition(name: &str) -> Option<Arc<ClassDefinition>> {
    DEFINITIONS
        .get(&name.trim_start_matches('\\').to_ascii_lowercase())
        .cloned()
}

pub fn is_builtin(name: &str) -> bool {
    definition(name).is_some()
}

/// Imports available while reading an annotation type's own docblock
pub fn bootstrap_imports() -> ImportTable {
    ImportTable::new()
        .with_import("enum", ENUM)
        .with_import("target", TARGET)
        .with_import("attribute", ATTRIBUTE)
        .with_import("attributes", ATTRIBUTES)
}

/// Imports available to the pre-parser collecting `@IgnoreAnnotation`
pub fn ignore_annotation_imports() -> ImportTable {
    ImportTable::new().with_import("ignoreannotation", IGNORE_ANNOTATION)
}

/// Oracle for bootstrap parsing: no user types, but user constants
pub struct BootstrapOracle {
    inner: Arc<dyn TypeOracle>,
}

impl BootstrapOracle {
    pub fn new(inner: Arc<dyn TypeOracle>) -> Self {
        Self { inner }
    }
}

impl TypeOracle for BootstrapOracle {
    fn load(&self, _name: &str) -> Option<Arc<ClassDefinition>> {
        None
    }

    fn global_constant(&self, name: &str) -> Option<Value> {
        self.inner.global_constant(name)
    }

    fn class_constant(&self, class: &str, constant: &str) -> Option<Value> {
        self.inner.class_constant(class, constant)
    }
}

// ============================================================================
// CLASS DEFINITIONS
// ============================================================================

fn target_class() -> ClassDefinition {
    ClassDefinition::new(TARGET)
        .with_doc("/** @Annotation @Target(\"CLASS\") */")
        .with_property(PropertyDefinition::new("value"))
        .with_property(PropertyDefinition::new("targets"))
        .with_property(PropertyDefinition::new("literal"))
        .with_constructor(Constructor::Custom(Factory::new(build_target)))
}

fn attribute_class() -> ClassDefinition {
    ClassDefinition::new(ATTRIBUTE)
        .with_doc("/** @Annotation @Target(\"ANNOTATION\") */")
        .with_property(PropertyDefinition::new("name").with_doc("/** @var string */"))
        .with_property(PropertyDefinition::new("type").with_doc("/** @var string */"))
        .with_property(
            PropertyDefinition::new("required")
                .with_doc("/** @var bool */")
                .with_default(Value::Bool(false)),
        )
}

fn attributes_class() -> ClassDefinition {
    ClassDefinition::new(ATTRIBUTES)
        .with_doc("/** @Annotation @Target(\"CLASS\") */")
        .with_property(
            PropertyDefinition::new("value")
                .with_doc(format!("/** @var array<{}> */", ATTRIBUTE)),
        )
}

fn enum_class() -> ClassDefinition {
    ClassDefinition::new(ENUM)
        .with_doc("/** @Annotation @Target(\"PROPERTY\") */")
        .with_property(PropertyDefinition::new("value"))
        .with_property(PropertyDefinition::new("literal"))
        .with_constructor(Constructor::Custom(Factory::new(build_enum)))
}

fn ignore_annotation_class() -> ClassDefinition {
    ClassDefinition::new(IGNORE_ANNOTATION)
        .with_doc("/** @Annotation @Target(\"CLASS\") */")
        .with_property(PropertyDefinition::new("names"))
        .with_constructor(Constructor::Custom(Factory::new(build_ignore_annotation)))
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

fn build_target(class: &str, values: ValueMap) -> Result<Annotation, String> {
    let value = values.get("value").cloned().unwrap_or(Value::Null);
    let literals: Vec<Value> = match value {
        Value::String(_) => vec![value],
        Value::Array(items) => items.values().cloned().collect(),
        other => {
            return Err(format!(
                "@Target expects either a string value, or an array of strings, \"{}\" given.",
                describe_actual(&other)
            ))
        }
    };

    let mut targets = Target::NONE;
    let mut names = Vec::with_capacity(literals.len());
    for literal in &literals {
        let target = literal.as_str().and_then(Target::from_name).ok_or_else(|| {
            format!(
                "Invalid Target \"{}\". Available targets: [{}]",
                literal,
                Target::names().collect::<Vec<_>>().join(", ")
            )
        })?;
        targets = targets | target;
        names.push(literal.to_string());
    }

    Ok(Annotation::new(class)
        .with("value", literals)
        .with("targets", i64::from(targets.bits()))
        .with("literal", names.join(", ")))
}

fn build_enum(class: &str, values: ValueMap) -> Result<Annotation, String> {
    let Some(Value::Array(allowed)) = values.get("value") else {
        return Err("@Enum expects an array of values.".to_string());
    };

    if let Some(bad) = allowed.values().find(|v| !v.is_scalar()) {
        return Err(format!(
            "@Enum supports only scalar values \"{}\" given.",
            describe_actual(bad)
        ));
    }

    let literal = match values.get("literal") {
        Some(Value::Array(literal)) => literal.clone(),
        _ => Default::default(),
    };
    for (key, name) in literal.iter() {
        let known = allowed
            .values()
            .any(|v| ArrayKey::from_value(v).as_ref() == Some(key));
        if !known {
            return Err(format!(
                "Undefined enumerator value \"{}\" for literal \"{}\".",
                key, name
            ));
        }
    }

    Ok(Annotation::new(class)
        .with("value", allowed.clone())
        .with("literal", literal))
}

fn build_ignore_annotation(class: &str, values: ValueMap) -> Result<Annotation, String> {
    let names: Vec<Value> = match values.get("value") {
        Some(Value::String(name)) => vec![Value::from(name.as_str())],
        Some(Value::Array(names)) => names.values().cloned().collect(),
        other => {
            return Err(format!(
                "@IgnoreAnnotation expects either a string name, or an array of strings, but got {}.",
                other.map_or_else(|| "null".to_string(), Value::to_json)
            ))
        }
    };
    Ok(Annotation::new(class).with("names", names))
}

// ============================================================================
// SEEDED DESCRIPTORS
// ============================================================================

fn attribute(type_name: &str, array_type: Option<&str>, declared: &str, required: bool) -> AttributeType {
    AttributeType {
        type_name: type_name.to_string(),
        array_type: array_type.map(str::to_string),
        declared: declared.to_string(),
        required,
    }
}

fn field(name: &str, default: Value) -> FieldSlot {
    FieldSlot {
        name: name.to_string(),
        default,
    }
}

fn seeded(
    class: &str,
    construction: ConstructionStyle,
    targets: Target,
    default_property: &str,
    attributes: Vec<(&str, AttributeType)>,
) -> AnnotationDescriptor {
    let mut descriptor = AnnotationDescriptor::new(class, construction);
    descriptor.is_annotation = true;
    descriptor.targets = targets;
    descriptor.targets_literal = targets.to_string();
    descriptor.default_property = Some(default_property.to_string());
    descriptor.attribute_types = attributes
        .into_iter()
        .map(|(name, attribute)| (name.to_string(), attribute))
        .collect();
    descriptor
}

/// Descriptors every metadata cache starts with
pub fn seeded_descriptors() -> Vec<AnnotationDescriptor> {
    vec![
        seeded(
            TARGET,
            ConstructionStyle::ByConstructor(Factory::new(build_target)),
            Target::CLASS,
            "value",
            vec![("value", attribute("array", Some("string"), "array<string>", false))],
        ),
        seeded(
            ATTRIBUTE,
            ConstructionStyle::ByFields(vec![
                field("name", Value::Null),
                field("type", Value::Null),
                field("required", Value::Bool(false)),
            ]),
            Target::ANNOTATION,
            "name",
            vec![
                ("name", attribute("string", None, "string", true)),
                ("type", attribute("string", None, "string", true)),
                ("required", attribute("boolean", None, "boolean", false)),
            ],
        ),
        seeded(
            ATTRIBUTES,
            ConstructionStyle::ByFields(vec![field("value", Value::Null)]),
            Target::CLASS,
            "value",
            vec![(
                "value",
                attribute("array", Some(ATTRIBUTE), &format!("array<{}>", ATTRIBUTE), true),
            )],
        ),
        seeded(
            ENUM,
            ConstructionStyle::ByConstructor(Factory::new(build_enum)),
            Target::PROPERTY,
            "value",
            vec![
                ("value", attribute("array", None, "array", true)),
                ("literal", attribute("array", None, "array", false)),
            ],
        ),
    ]
}
