//! Per-type annotation metadata
use crate::grammar::{Annotation, Target, Value, ValueMap};
use crate::registry::{ClassDefinition, Constructor, Factory};
use std::collections::BTreeMap;

/// Declared type of one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeType {
    /// Runtime type name (`string`, `integer`, `array`, ...) or a class name
    pub type_name: String,
    /// Element type when `type_name` is `array` and the declaration named one
    pub array_type: Option<String>,
    /// Type text as written in the declaration
    pub declared: String,
    pub required: bool,
}

const TYPE_MAP: &[(&str, &str)] = &[
    ("float", "double"),
    ("bool", "boolean"),
    ("Boolean", "boolean"),
    ("int", "integer"),
];

fn map_type(name: &str) -> &str {
    TYPE_MAP
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(name, |(_, to)| to)
}

impl AttributeType {
    /// Interpret a declared type; `None` for `mixed`, which accepts anything
    ///
    /// `array<T>` and `T[]` declare arrays whose elements must be `T`.
    pub fn from_declaration(declared: &str, required: bool) -> Option<Self> {
        let mapped = map_type(declared);
        if mapped == "mixed" {
            return None;
        }

        let (type_name, array_type) = if let Some(pos) = mapped.find('<') {
            let inner = mapped
                .get(pos + 1..mapped.len().saturating_sub(1))
                .unwrap_or("");
            ("array".to_string(), Some(map_type(inner).to_string()))
        } else if let Some(pos) = mapped.rfind('[') {
            ("array".to_string(), Some(map_type(&mapped[..pos]).to_string()))
        } else {
            (mapped.to_string(), None)
        };

        Some(Self {
            type_name,
            array_type,
            declared: declared.to_string(),
            required,
        })
    }

    pub fn is_array(&self) -> bool {
        self.type_name == "array"
    }
}

/// Allowed values of an enumerated attribute
#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstraint {
    pub values: Vec<Value>,
    /// Human-readable names of the allowed values, used in messages
    pub literals: Vec<String>,
}

/// A public field receiving values when there is no value constructor
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    pub name: String,
    pub default: Value,
}

/// How instances are built from a checked value map
#[derive(Debug, Clone)]
pub enum ConstructionStyle {
    ByConstructor(Factory),
    ByFields(Vec<FieldSlot>),
}

impl ConstructionStyle {
    /// Resolve a class's constructor shape once, at collection time
    pub fn for_class(class: &ClassDefinition, fields: Vec<FieldSlot>) -> Self {
        match &class.constructor {
            Constructor::None => ConstructionStyle::ByFields(fields),
            Constructor::ValueMap => ConstructionStyle::ByConstructor(value_map_factory()),
            Constructor::Custom(factory) => ConstructionStyle::ByConstructor(factory.clone()),
        }
    }

    pub fn has_constructor(&self) -> bool {
        matches!(self, ConstructionStyle::ByConstructor(_))
    }

    pub fn fields(&self) -> &[FieldSlot] {
        match self {
            ConstructionStyle::ByConstructor(_) => &[],
            ConstructionStyle::ByFields(fields) => fields,
        }
    }
}

/// Constructor that keeps the value map as the object's properties
pub fn value_map_factory() -> Factory {
    Factory::new(|class: &str, values: ValueMap| Ok(Annotation::with_properties(class, values)))
}

#[derive(Debug, Clone)]
pub struct AnnotationDescriptor {
    /// Canonical fully-qualified type name
    pub class: String,
    pub is_annotation: bool,
    pub targets: Target,
    pub targets_literal: String,
    pub construction: ConstructionStyle,
    pub default_property: Option<String>,
    pub attribute_types: BTreeMap<String, AttributeType>,
    pub enums: BTreeMap<String, EnumConstraint>,
}

impl AnnotationDescriptor {
    /// Descriptor for a type that is not an annotation, or has no declarations yet
    pub fn new(class: &str, construction: ConstructionStyle) -> Self {
        Self {
            class: class.to_string(),
            is_annotation: false,
            targets: Target::ALL,
            targets_literal: Target::ALL.to_string(),
            construction,
            default_property: None,
            attribute_types: BTreeMap::new(),
            enums: BTreeMap::new(),
        }
    }

    pub fn has_constructor(&self) -> bool {
        self.construction.has_constructor()
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.construction
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.construction.fields().iter().any(|f| f.name == name)
    }

    pub fn add_attribute(&mut self, name: &str, declared: &str, required: bool) {
        if let Some(attribute) = AttributeType::from_declaration(declared, required) {
            self.attribute_types.insert(name.to_string(), attribute);
        }
    }
}
