//! Namespace-mode reader
use super::annotation_reader::get_single;
use super::element::DeclaringElement;
use crate::grammar::Annotation;
use crate::metadata::MetadataCache;
use crate::pipeline::AnnotationError;
use crate::registry::{all_properties, find_method, ClassDefinition, TypeOracle};
use crate::syntax::DocParser;
use std::sync::Arc;

/// Reader that resolves short names against a list of namespaces
///
/// Declared imports are not consulted. Names that resolve to no loadable
/// type are skipped rather than reported.
pub struct SimpleAnnotationReader {
    oracle: Arc<dyn TypeOracle>,
    cache: Arc<MetadataCache>,
    namespaces: Vec<String>,
}

impl SimpleAnnotationReader {
    pub fn new(oracle: Arc<dyn TypeOracle>) -> Self {
        Self::with_cache(oracle, Arc::new(MetadataCache::new()))
    }

    pub fn with_cache(oracle: Arc<dyn TypeOracle>, cache: Arc<MetadataCache>) -> Self {
        Self {
            oracle,
            cache,
            namespaces: Vec::new(),
        }
    }

    pub fn add_namespace(&mut self, namespace: &str) {
        let namespace = namespace.trim_matches('\\');
        if !self.namespaces.iter().any(|ns| ns.eq_ignore_ascii_case(namespace)) {
            self.namespaces.push(namespace.to_string());
        }
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    fn read(&self, element: DeclaringElement<'_>) -> Result<Vec<Annotation>, AnnotationError> {
        let mut parser = DocParser::new(self.oracle.clone(), self.cache.clone());
        for namespace in &self.namespaces {
            parser.add_namespace(namespace)?;
        }
        parser.set_ignore_not_imported(true);
        parser.set_target(element.target());
        parser.parse(element.doc_comment(), &element.context())
    }

    pub fn get_class_annotations(
        &self,
        class: &ClassDefinition,
    ) -> Result<Vec<Annotation>, AnnotationError> {
        self.read(DeclaringElement::Class(class))
    }

    pub fn get_class_annotation(
        &self,
        class: &ClassDefinition,
        annotation: &str,
    ) -> Result<Option<Annotation>, AnnotationError> {
        Ok(get_single(self.get_class_annotations(class)?, annotation))
    }

    pub fn get_method_annotations(
        &self,
        class: &ClassDefinition,
        method: &str,
    ) -> Result<Vec<Annotation>, AnnotationError> {
        let definition = find_method(self.oracle.as_ref(), class, method)
            .ok_or_else(|| AnnotationError::member_not_found("Method", &class.name, method))?;
        self.read(DeclaringElement::Method {
            class,
            method: &definition,
        })
    }

    pub fn get_method_annotation(
        &self,
        class: &ClassDefinition,
        method: &str,
        annotation: &str,
    ) -> Result<Option<Annotation>, AnnotationError> {
        Ok(get_single(self.get_method_annotations(class, method)?, annotation))
    }

    pub fn get_property_annotations(
        &self,
        class: &ClassDefinition,
        property: &str,
    ) -> Result<Vec<Annotation>, AnnotationError> {
        let definition = all_properties(self.oracle.as_ref(), class)
            .into_iter()
            .find(|p| p.name == property)
            .ok_or_else(|| AnnotationError::member_not_found("Property", &class.name, property))?;
        self.read(DeclaringElement::Property {
            class,
            property: &definition,
        })
    }

    pub fn get_property_annotation(
        &self,
        class: &ClassDefinition,
        property: &str,
        annotation: &str,
    ) -> Result<Option<Annotation>, AnnotationError> {
        Ok(get_single(self.get_property_annotations(class, property)?, annotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Value;
    use crate::registry::{AnnotationRegistry, MethodDefinition, PropertyDefinition};

    fn setup() -> (Arc<AnnotationRegistry>, SimpleAnnotationReader) {
        let registry = Arc::new(AnnotationRegistry::new());
        registry.register_class(
            ClassDefinition::new("Acme\\Routing\\Route")
                .with_doc("/** @Annotation @Target(\"METHOD\") */")
                .with_property(PropertyDefinition::new("path")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Mapping\\Entity")
                .with_doc("/** @Annotation */")
                .with_property(PropertyDefinition::new("table")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Blog\\Controller")
                .with_doc("/** @Entity(table=\"controllers\") @Unknown(\"skipped\") @author Someone */")
                .with_method(
                    MethodDefinition::new("index").with_doc("/** @Route(\"/\") @Entity */"),
                )
                .with_property(PropertyDefinition::new("posts").with_doc("/** @var array */")),
        );

        let mut reader = SimpleAnnotationReader::new(registry.clone());
        reader.add_namespace("Acme\\Routing");
        reader.add_namespace("\\Acme\\Mapping\\");
        reader.add_namespace("Acme\\Routing");
        (registry, reader)
    }

    #[test]
    fn test_namespaces_deduplicated() {
        let (_, reader) = setup();
        assert_eq!(reader.namespaces(), &["Acme\\Routing", "Acme\\Mapping"]);
    }

    #[test]
    fn test_unresolved_names_are_skipped() {
        let (registry, reader) = setup();
        let class = registry.load_class("Acme\\Blog\\Controller").unwrap();
        let annotations = reader.get_class_annotations(&class).unwrap();
        assert_eq!(annotations.len(), 1);
        assert!(annotations[0].is("Acme\\Mapping\\Entity"));
        assert_eq!(annotations[0].get("table"), Some(&Value::from("controllers")));
    }

    #[test]
    fn test_method_and_property_readers() {
        let (registry, reader) = setup();
        let class = registry.load_class("Acme\\Blog\\Controller").unwrap();

        let route = reader
            .get_method_annotation(&class, "index", "Acme\\Routing\\Route")
            .unwrap()
            .unwrap();
        assert_eq!(route.get("path"), Some(&Value::from("/")));
        assert_eq!(reader.get_method_annotations(&class, "index").unwrap().len(), 2);

        assert!(reader.get_property_annotations(&class, "posts").unwrap().is_empty());
        assert!(reader.get_property_annotations(&class, "missing").is_err());
    }
}
