//! Type existence and load oracle
use super::definition::{ClassDefinition, MethodDefinition, PropertyDefinition};
use crate::grammar::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Answers "does this type exist" and hands out its definition
///
/// Names are fully qualified, without a leading separator, and compared
/// case-insensitively.
pub trait TypeOracle: Send + Sync {
    fn load(&self, name: &str) -> Option<Arc<ClassDefinition>>;

    fn exists(&self, name: &str) -> bool {
        self.load(name).is_some()
    }

    fn global_constant(&self, _name: &str) -> Option<Value> {
        None
    }

    /// `Class::NAME`, searched through declared parents
    fn class_constant(&self, class: &str, constant: &str) -> Option<Value> {
        let mut visited = HashSet::new();
        let mut pending = vec![class.trim_start_matches('\\').to_string()];

        while let Some(name) = pending.pop() {
            if !visited.insert(name.to_ascii_lowercase()) {
                continue;
            }
            let Some(definition) = self.load(&name) else {
                continue;
            };
            if let Some(value) = definition.constants.get(constant) {
                return Some(value.clone());
            }
            pending.extend(definition.parents.iter().rev().cloned());
        }
        None
    }

    /// True when `class` is `ancestor` or inherits from it
    fn is_a(&self, class: &str, ancestor: &str) -> bool {
        let ancestor = ancestor.trim_start_matches('\\');
        let mut visited = HashSet::new();
        let mut pending = vec![class.trim_start_matches('\\').to_string()];

        while let Some(name) = pending.pop() {
            if name.eq_ignore_ascii_case(ancestor) {
                return true;
            }
            if !visited.insert(name.to_ascii_lowercase()) {
                continue;
            }
            if let Some(definition) = self.load(&name) {
                pending.extend(definition.parents.iter().cloned());
            }
        }
        false
    }
}

/// Properties visible on a class: own, trait-provided, then inherited
///
/// Members coming from a trait or parent carry the physically declaring
/// type in `declared_in`.
pub fn all_properties(oracle: &dyn TypeOracle, class: &ClassDefinition) -> Vec<PropertyDefinition> {
    let mut visited = HashSet::new();
    let mut properties = Vec::new();
    collect_properties(oracle, class, None, &mut visited, &mut properties);
    properties
}

fn collect_properties(
    oracle: &dyn TypeOracle,
    class: &ClassDefinition,
    origin: Option<&str>,
    visited: &mut HashSet<String>,
    out: &mut Vec<PropertyDefinition>,
) {
    if !visited.insert(class.name.to_ascii_lowercase()) {
        return;
    }

    for property in &class.properties {
        if out.iter().any(|p| p.name == property.name) {
            continue;
        }
        let mut property = property.clone();
        if property.declared_in.is_none() {
            property.declared_in = origin.map(|_| class.name.clone());
        }
        out.push(property);
    }

    for name in &class.traits {
        if let Some(definition) = oracle.load(name) {
            let origin = Some(definition.name.as_str());
            collect_properties(oracle, &definition, origin, visited, out);
        }
    }

    if let Some(parent) = class.parents.first() {
        if let Some(definition) = oracle.load(parent) {
            let origin = Some(definition.name.as_str());
            collect_properties(oracle, &definition, origin, visited, out);
        }
    }
}

/// Method lookup through own members, traits and parents
pub fn find_method(
    oracle: &dyn TypeOracle,
    class: &ClassDefinition,
    name: &str,
) -> Option<MethodDefinition> {
    let mut visited = HashSet::new();
    find_method_in(oracle, class, name, false, &mut visited)
}

fn find_method_in(
    oracle: &dyn TypeOracle,
    class: &ClassDefinition,
    name: &str,
    inherited: bool,
    visited: &mut HashSet<String>,
) -> Option<MethodDefinition> {
    if !visited.insert(class.name.to_ascii_lowercase()) {
        return None;
    }

    if let Some(method) = class.method(name) {
        let mut method = method.clone();
        if inherited && method.declared_in.is_none() {
            method.declared_in = Some(class.name.clone());
        }
        return Some(method);
    }

    class
        .traits
        .iter()
        .chain(class.parents.iter())
        .filter_map(|other| oracle.load(other))
        .find_map(|definition| find_method_in(oracle, &definition, name, true, visited))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AnnotationRegistry;

    fn registry() -> AnnotationRegistry {
        let registry = AnnotationRegistry::new();
        registry.register_class(
            ClassDefinition::new("Acme\\Base")
                .with_constant("LIMIT", Value::Integer(10))
                .with_property(PropertyDefinition::new("id"))
                .with_method(MethodDefinition::new("save")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Stamps")
                .with_kind(super::super::definition::ClassKind::Trait)
                .with_property(PropertyDefinition::new("createdAt"))
                .with_method(MethodDefinition::new("touch")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Post")
                .with_parent("Acme\\Base")
                .with_trait("Acme\\Stamps")
                .with_property(PropertyDefinition::new("title")),
        );
        registry
    }

    #[test]
    fn test_class_constant_through_parents() {
        let registry = registry();
        assert_eq!(
            registry.class_constant("Acme\\Post", "LIMIT"),
            Some(Value::Integer(10))
        );
        assert_eq!(registry.class_constant("Acme\\Post", "MISSING"), None);
    }

    #[test]
    fn test_is_a() {
        let registry = registry();
        assert!(registry.is_a("Acme\\Post", "\\acme\\base"));
        assert!(registry.is_a("Acme\\Post", "Acme\\Post"));
        assert!(!registry.is_a("Acme\\Base", "Acme\\Post"));
    }

    #[test]
    fn test_all_properties_origin() {
        let registry = registry();
        let post = registry.load("Acme\\Post").unwrap();
        let properties = all_properties(&registry, &post);
        let names: Vec<_> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["title", "createdAt", "id"]);
        assert_eq!(properties[0].declared_in, None);
        assert_eq!(properties[1].declared_in.as_deref(), Some("Acme\\Stamps"));
        assert_eq!(properties[2].declared_in.as_deref(), Some("Acme\\Base"));
    }

    #[test]
    fn test_find_method() {
        let registry = registry();
        let post = registry.load("Acme\\Post").unwrap();
        let touch = find_method(&registry, &post, "TOUCH").unwrap();
        assert_eq!(touch.declared_in.as_deref(), Some("Acme\\Stamps"));
        assert!(find_method(&registry, &post, "save").is_some());
        assert!(find_method(&registry, &post, "missing").is_none());
    }

    #[test]
    fn test_cyclic_parents_terminate() {
        let registry = AnnotationRegistry::new();
        registry.register_class(ClassDefinition::new("A").with_parent("B"));
        registry.register_class(ClassDefinition::new("B").with_parent("A"));
        assert!(!registry.is_a("A", "C"));
        assert_eq!(registry.class_constant("A", "X"), None);
    }
}
