//! Runtime type tests for attribute values
use crate::grammar::Value;
use crate::registry::TypeOracle;

/// Whether `value` has runtime type `type_name` or is an instance of that class
pub fn value_matches(value: &Value, type_name: &str, oracle: &dyn TypeOracle) -> bool {
    if value.type_name() == type_name {
        return true;
    }
    match value {
        Value::Object(object) => oracle.is_a(&object.class, type_name),
        _ => false,
    }
}

/// How an offending value is named in type errors
pub fn describe_actual(value: &Value) -> String {
    match value {
        Value::Object(object) => format!("an instance of {}", object.class),
        other => other.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Annotation;
    use crate::registry::{AnnotationRegistry, ClassDefinition};

    #[test]
    fn test_scalar_matching() {
        let registry = AnnotationRegistry::new();
        assert!(value_matches(&Value::from("x"), "string", &registry));
        assert!(value_matches(&Value::Integer(1), "integer", &registry));
        assert!(value_matches(&Value::Float(1.5), "double", &registry));
        assert!(!value_matches(&Value::Integer(1), "string", &registry));
        assert!(!value_matches(&Value::Null, "string", &registry));
    }

    #[test]
    fn test_instance_matching() {
        let registry = AnnotationRegistry::new();
        registry.register_class(ClassDefinition::new("Acme\\JoinColumn").with_parent("Acme\\Column"));
        let join = Value::from(Annotation::new("Acme\\JoinColumn"));
        assert!(value_matches(&join, "Acme\\JoinColumn", &registry));
        assert!(value_matches(&join, "\\Acme\\Column", &registry));
        assert!(!value_matches(&join, "Acme\\Table", &registry));
        assert_eq!(describe_actual(&join), "an instance of Acme\\JoinColumn");
        assert_eq!(describe_actual(&Value::Bool(true)), "boolean");
    }
}
