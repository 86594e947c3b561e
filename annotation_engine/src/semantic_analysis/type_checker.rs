//! Enum and attribute-type checks over a raw value map
use super::error::{SemanticError, SemanticResult};
use super::types::{describe_actual, value_matches};
use crate::grammar::{ArrayValue, Value, ValueMap};
use crate::metadata::AnnotationDescriptor;
use crate::registry::TypeOracle;

/// The annotation being checked and where it was written
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    /// Resolved fully-qualified name
    pub name: &'a str,
    /// Name as written in the docblock
    pub original: &'a str,
    pub context: &'a str,
    pub oracle: &'a dyn TypeOracle,
}

fn is_set(values: &ValueMap, key: &str) -> bool {
    values.get(key).is_some_and(|v| !v.is_null())
}

/// Every enumerated attribute that is present must hold an allowed value
pub fn check_enums(
    descriptor: &AnnotationDescriptor,
    values: &ValueMap,
    ctx: &CheckContext<'_>,
) -> SemanticResult<()> {
    for (property, constraint) in &descriptor.enums {
        let Some(value) = values.get(property).filter(|v| !v.is_null()) else {
            continue;
        };
        if !constraint.values.contains(value) {
            return Err(SemanticError::InvalidEnumerator {
                attribute: property.clone(),
                annotation: ctx.name.to_string(),
                context: ctx.context.to_string(),
                allowed: constraint.literals.join(", "),
                given: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Check declared attribute types; lone values of array attributes are
/// wrapped into single-element arrays in place
pub fn check_attributes(
    descriptor: &AnnotationDescriptor,
    values: &mut ValueMap,
    ctx: &CheckContext<'_>,
) -> SemanticResult<()> {
    for (property, attribute) in &descriptor.attribute_types {
        let mut key = property.as_str();
        if descriptor.default_property.as_deref() == Some(key)
            && !is_set(values, key)
            && is_set(values, "value")
        {
            key = "value";
        }

        let Some(value) = values.get_mut(key).filter(|v| !v.is_null()) else {
            if attribute.required {
                return Err(SemanticError::RequiredAttributeMissing {
                    attribute: key.to_string(),
                    annotation: ctx.original.to_string(),
                    context: ctx.context.to_string(),
                    expected: format!("a(n) {}", attribute.declared),
                });
            }
            continue;
        };

        if attribute.is_array() {
            if !matches!(value, Value::Array(_)) {
                let single = std::mem::replace(value, Value::Null);
                *value = Value::Array(std::iter::once(single).collect::<ArrayValue>());
            }

            if let (Some(element), Value::Array(items)) = (&attribute.array_type, &*value) {
                if let Some(item) = items.values().find(|item| !value_matches(item, element, ctx.oracle)) {
                    return Err(mismatch(
                        key,
                        ctx,
                        format!("either a(n) {0}, or an array of {0}s", element),
                        item,
                    ));
                }
            }
        } else if !value_matches(value, &attribute.type_name, ctx.oracle) {
            return Err(mismatch(
                key,
                ctx,
                format!("a(n) {}", attribute.declared),
                value,
            ));
        }
    }
    Ok(())
}

fn mismatch(attribute: &str, ctx: &CheckContext<'_>, expected: String, actual: &Value) -> SemanticError {
    SemanticError::AttributeTypeMismatch {
        attribute: attribute.to_string(),
        annotation: ctx.original.to_string(),
        context: ctx.context.to_string(),
        expected,
        actual: describe_actual(actual),
    }
}
