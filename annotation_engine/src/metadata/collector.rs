//! Descriptor collection from a type's definition and docblocks
use super::builtin::{self, BootstrapOracle};
use super::cache::MetadataCache;
use super::descriptor::{AnnotationDescriptor, ConstructionStyle, EnumConstraint, FieldSlot};
use crate::grammar::{Annotation, Target, Value};
use crate::logging::codes;
use crate::pipeline::AnnotationError;
use crate::registry::{all_properties, ClassDefinition, TypeOracle};
use crate::syntax::DocParser;
use regex::Regex;
use std::sync::{Arc, LazyLock};

static VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@var\s+(\S+)").expect("valid @var pattern"));

/// Parser for directive annotations inside an annotation type's docblocks
///
/// It sees the directive imports, no user types, and the user's constants.
fn bootstrap_parser(oracle: &Arc<dyn TypeOracle>, cache: &Arc<MetadataCache>) -> DocParser {
    let bootstrap: Arc<dyn TypeOracle> = Arc::new(BootstrapOracle::new(oracle.clone()));
    let mut parser = DocParser::with_imports(bootstrap, cache.clone(), builtin::bootstrap_imports());
    parser.set_ignore_not_imported(true);
    parser
}

/// Build the descriptor for `class`
pub fn collect(
    class: &ClassDefinition,
    oracle: &Arc<dyn TypeOracle>,
    cache: &Arc<MetadataCache>,
) -> Result<AnnotationDescriptor, AnnotationError> {
    let doc = class.doc();
    let is_annotation = doc.contains("@Annotation");

    let mut fields = Vec::new();
    let mut descriptor = AnnotationDescriptor::new(
        &class.name,
        ConstructionStyle::for_class(class, Vec::new()),
    );
    descriptor.is_annotation = is_annotation;

    if !is_annotation {
        return Ok(descriptor);
    }

    let mut parser = bootstrap_parser(oracle, cache);
    parser.set_target(Target::CLASS);
    let directives = parser.parse(doc, &format!("class @{}", class.name))?;
    for directive in &directives {
        apply_class_directive(&mut descriptor, directive);
    }

    if !descriptor.has_constructor() {
        parser.set_target(Target::PROPERTY);
        for property in all_properties(oracle.as_ref(), class)
            .into_iter()
            .filter(|p| p.is_public())
        {
            fields.push(FieldSlot {
                name: property.name.clone(),
                default: property.default.clone(),
            });

            let Some(comment) = property.doc_comment.as_deref() else {
                continue;
            };

            let required = comment.contains("@Required");
            let declared = VAR_PATTERN
                .captures(comment)
                .and_then(|captures| captures.get(1))
                .map_or("mixed", |m| m.as_str());
            descriptor.add_attribute(&property.name, declared, required);

            if comment.contains("@Enum") {
                let context = format!("property {}::${}", class.name, property.name);
                for annotation in parser.parse(comment, &context)? {
                    if let Some(constraint) = enum_constraint(&annotation) {
                        descriptor.enums.insert(property.name.clone(), constraint);
                    }
                }
            }
        }

        descriptor.default_property = fields.first().map(|field| field.name.clone());
        descriptor.construction = ConstructionStyle::ByFields(fields);
    }

    crate::log_success!(
        codes::success::METADATA_COLLECTED,
        "Collected annotation metadata",
        "class" => class.name,
        "targets" => descriptor.targets_literal,
        "attributes" => descriptor.attribute_types.len()
    );

    Ok(descriptor)
}

fn apply_class_directive(descriptor: &mut AnnotationDescriptor, directive: &Annotation) {
    if directive.is(builtin::TARGET) {
        let bits = directive
            .get("targets")
            .and_then(Value::as_integer)
            .unwrap_or_default();
        descriptor.targets = Target::from_bits(u8::try_from(bits).unwrap_or_default());
        descriptor.targets_literal = directive
            .get("literal")
            .map(Value::to_string)
            .unwrap_or_default();
    } else if directive.is(builtin::ATTRIBUTES) {
        let Some(attributes) = directive.get("value").and_then(Value::as_array) else {
            return;
        };
        for attribute in attributes.values().filter_map(Value::as_object) {
            let name = attribute.get("name").and_then(Value::as_str);
            let declared = attribute.get("type").and_then(Value::as_str);
            let required = attribute
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if let (Some(name), Some(declared)) = (name, declared) {
                descriptor.add_attribute(name, declared, required);
            }
        }
    }
}

fn enum_constraint(annotation: &Annotation) -> Option<EnumConstraint> {
    if !annotation.is(builtin::ENUM) {
        return None;
    }
    let values: Vec<Value> = annotation
        .get("value")
        .and_then(Value::as_array)
        .map(|items| items.values().cloned().collect())
        .unwrap_or_default();

    let literals: Vec<String> = match annotation.get("literal").and_then(Value::as_array) {
        Some(literal) if !literal.is_empty() => literal.values().map(Value::to_string).collect(),
        _ => values.iter().map(Value::to_string).collect(),
    };

    Some(EnumConstraint { values, literals })
}
