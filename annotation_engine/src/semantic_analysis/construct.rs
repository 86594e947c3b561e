//! Building annotation objects from checked values
use super::error::{SemanticError, SemanticResult};
use super::type_checker::CheckContext;
use crate::grammar::{Annotation, ValueMap};
use crate::metadata::{AnnotationDescriptor, ConstructionStyle};

pub fn instantiate(
    descriptor: &AnnotationDescriptor,
    values: ValueMap,
    ctx: &CheckContext<'_>,
) -> SemanticResult<Annotation> {
    let fields = match &descriptor.construction {
        ConstructionStyle::ByConstructor(factory) => {
            return factory
                .call(&descriptor.class, values)
                .map_err(|message| SemanticError::construction_failed(ctx.original, message));
        }
        ConstructionStyle::ByFields(fields) => fields,
    };

    let mut targets = Vec::with_capacity(values.len());
    for property in values.keys() {
        if descriptor.has_property(property) {
            targets.push(property.clone());
            continue;
        }

        if property != "value" {
            return Err(SemanticError::UnknownProperty {
                annotation: ctx.original.to_string(),
                context: ctx.context.to_string(),
                property: property.clone(),
                available: descriptor.property_names().join(", "),
            });
        }

        match &descriptor.default_property {
            Some(default) => targets.push(default.clone()),
            None => {
                return Err(SemanticError::ValuesNotAccepted {
                    annotation: ctx.original.to_string(),
                    context: ctx.context.to_string(),
                    values: serde_json::to_string(&values).unwrap_or_default(),
                });
            }
        }
    }

    let mut instance = Annotation::new(descriptor.class.as_str());
    for field in fields {
        instance.set(&field.name, field.default.clone());
    }
    for (target, (_, value)) in targets.into_iter().zip(values) {
        instance.set(&target, value);
    }
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Value;
    use crate::metadata::FieldSlot;
    use crate::registry::{AnnotationRegistry, Factory};
    use assert_matches::assert_matches;

    fn fields_descriptor(default: Option<&str>) -> AnnotationDescriptor {
        let fields = vec![
            FieldSlot {
                name: "name".into(),
                default: Value::Null,
            },
            FieldSlot {
                name: "nullable".into(),
                default: Value::Bool(false),
            },
        ];
        let mut descriptor =
            AnnotationDescriptor::new("Acme\\Column", ConstructionStyle::ByFields(fields));
        descriptor.default_property = default.map(str::to_string);
        descriptor
    }

    fn run(descriptor: &AnnotationDescriptor, values: ValueMap) -> SemanticResult<Annotation> {
        let registry = AnnotationRegistry::new();
        let ctx = CheckContext {
            name: "Acme\\Column",
            original: "Column",
            context: "class Acme\\Post",
            oracle: &registry,
        };
        instantiate(descriptor, values, &ctx)
    }

    #[test]
    fn test_fields_get_defaults_and_values() {
        let descriptor = fields_descriptor(Some("name"));
        let built = run(
            &descriptor,
            ValueMap::from([("value".to_string(), Value::from("title"))]),
        )
        .unwrap();
        assert_eq!(built.get("name"), Some(&Value::from("title")));
        assert_eq!(built.get("nullable"), Some(&Value::Bool(false)));
        assert_eq!(built.get("value"), None);
    }

    #[test]
    fn test_unknown_property() {
        let descriptor = fields_descriptor(Some("name"));
        let err = run(
            &descriptor,
            ValueMap::from([("colour".to_string(), Value::from("red"))]),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Creation Error] The annotation @Column declared on class Acme\\Post does not have a property named \"colour\". Available properties: name, nullable"
        );
    }

    #[test]
    fn test_values_without_default_property() {
        let descriptor = fields_descriptor(None);
        let err = run(
            &descriptor,
            ValueMap::from([("value".to_string(), Value::Integer(1))]),
        )
        .unwrap_err();
        assert_matches!(&err, SemanticError::ValuesNotAccepted { values, .. } if values == "{\"value\":1}");
    }

    #[test]
    fn test_factory_errors_become_creation_errors() {
        let descriptor = AnnotationDescriptor::new(
            "Acme\\Strict",
            ConstructionStyle::ByConstructor(Factory::new(|_, _| Err("nope".to_string()))),
        );
        let err = run(&descriptor, ValueMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "[Creation Error] nope");
    }
}
