//! Annotation reader over class definitions
use super::element::DeclaringElement;
use crate::grammar::Annotation;
use crate::imports::{DeclaredImportExtractor, IgnoreSet, ImportExtractor, ImportScope, ImportTable};
use crate::metadata::{builtin, MetadataCache};
use crate::pipeline::AnnotationError;
use crate::registry::{all_properties, find_method, ClassDefinition, TypeOracle};
use crate::syntax::DocParser;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Name-resolution state computed once per class
#[derive(Debug, Clone)]
struct ClassScope {
    imports: ImportTable,
    ignore: IgnoreSet,
}

/// Reads the annotations of classes, methods and properties
///
/// Each class's import table and ignored names (the defaults plus any
/// `@IgnoreAnnotation` on the class docblock) are computed on first use and
/// cached. Member import tables are cached per providing trait or parent.
pub struct AnnotationReader {
    oracle: Arc<dyn TypeOracle>,
    cache: Arc<MetadataCache>,
    extractor: Arc<dyn ImportExtractor>,
    global_ignore: IgnoreSet,
    pre_parser: DocParser,
    scopes: RwLock<HashMap<String, Arc<ClassScope>>>,
    member_imports: RwLock<HashMap<(String, String), Arc<ImportTable>>>,
}

impl AnnotationReader {
    pub fn new(oracle: Arc<dyn TypeOracle>) -> Self {
        Self::with_cache(oracle, Arc::new(MetadataCache::new()))
    }

    pub fn with_cache(oracle: Arc<dyn TypeOracle>, cache: Arc<MetadataCache>) -> Self {
        let extractor = Arc::new(DeclaredImportExtractor::new(oracle.clone()));
        Self::with_extractor(oracle, cache, extractor)
    }

    pub fn with_extractor(
        oracle: Arc<dyn TypeOracle>,
        cache: Arc<MetadataCache>,
        extractor: Arc<dyn ImportExtractor>,
    ) -> Self {
        let global_ignore = IgnoreSet::with_defaults();

        let mut pre_parser = DocParser::with_imports(
            oracle.clone(),
            cache.clone(),
            builtin::ignore_annotation_imports(),
        );
        pre_parser.set_ignore_not_imported(true);
        pre_parser.set_ignored(global_ignore.clone());

        Self {
            oracle,
            cache,
            extractor,
            global_ignore,
            pre_parser,
            scopes: RwLock::new(HashMap::new()),
            member_imports: RwLock::new(HashMap::new()),
        }
    }

    /// Ignore `name` everywhere this reader parses
    pub fn add_global_ignored_name(&mut self, name: &str) {
        self.global_ignore.add_name(name);
        self.pre_parser.set_ignored(self.global_ignore.clone());
        self.clear_scopes();
    }

    pub fn add_global_ignored_namespace(&mut self, namespace: &str) {
        self.global_ignore.add_namespace(namespace);
        self.pre_parser.set_ignored(self.global_ignore.clone());
        self.clear_scopes();
    }

    pub fn oracle(&self) -> &Arc<dyn TypeOracle> {
        &self.oracle
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    fn clear_scopes(&self) {
        self.scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.member_imports
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Load a class through the oracle
    pub fn class(&self, name: &str) -> Result<Arc<ClassDefinition>, AnnotationError> {
        self.oracle
            .load(name)
            .ok_or_else(|| AnnotationError::class_not_found(name))
    }

    // ========================================================================
    // ELEMENT READERS
    // ========================================================================

    /// Parse the docblock of any declaring element
    pub fn read(&self, element: DeclaringElement<'_>) -> Result<Vec<Annotation>, AnnotationError> {
        let scope = self.class_scope(element.class())?;
        let imports = match element.import_scope() {
            ImportScope::Class(_) | ImportScope::Member { declared_in: None, .. } => {
                scope.imports.clone()
            }
            ImportScope::Member {
                class,
                declared_in: Some(origin),
            } => self.member_imports(class, origin)?.as_ref().clone(),
        };

        let mut parser = DocParser::new(self.oracle.clone(), self.cache.clone());
        parser.set_target(element.target());
        parser.set_imports(imports)?;
        parser.set_ignored(scope.ignore.clone());
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

    /// Annotations of a method declared on the class, its traits or parents
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

    /// Annotations of a property declared on the class, its traits or parents
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

    // ========================================================================
    // PER-CLASS STATE
    // ========================================================================

    fn class_scope(&self, class: &ClassDefinition) -> Result<Arc<ClassScope>, AnnotationError> {
        let key = class.name.to_ascii_lowercase();
        if let Some(scope) = self
            .scopes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(scope.clone());
        }

        let mut imports = builtin::ignore_annotation_imports();
        imports.merge(&self.extractor.extract_imports(ImportScope::Class(class))?);

        let mut ignore = self.global_ignore.clone();
        let context = format!("class {}", class.name);
        for annotation in self.pre_parser.parse(class.doc(), &context)? {
            if !annotation.is(builtin::IGNORE_ANNOTATION) {
                continue;
            }
            if let Some(names) = annotation.get("names").and_then(|v| v.as_array()) {
                ignore.extend_names(names.values().filter_map(|v| v.as_str()));
            }
        }

        crate::log_debug!("Collected class parsing scope",
            "class" => class.name,
            "imports" => imports.len(),
            "ignored" => ignore.names().count()
        );

        let scope = Arc::new(ClassScope { imports, ignore });
        self.scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, scope.clone());
        Ok(scope)
    }

    fn member_imports(
        &self,
        class: &ClassDefinition,
        origin: &str,
    ) -> Result<Arc<ImportTable>, AnnotationError> {
        let key = (class.name.to_ascii_lowercase(), origin.to_ascii_lowercase());
        if let Some(table) = self
            .member_imports
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(table.clone());
        }

        let mut imports = builtin::ignore_annotation_imports();
        imports.merge(&self.extractor.extract_imports(ImportScope::Member {
            class,
            declared_in: Some(origin),
        })?);

        let table = Arc::new(imports);
        self.member_imports
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, table.clone());
        Ok(table)
    }
}

/// First annotation of type `annotation` (case-insensitive, leading `\` optional)
pub fn get_single(annotations: Vec<Annotation>, annotation: &str) -> Option<Annotation> {
    annotations.into_iter().find(|a| a.is(annotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Value;
    use crate::registry::{AnnotationRegistry, ClassKind, MethodDefinition, PropertyDefinition};
    use crate::semantic_analysis::SemanticError;
    use assert_matches::assert_matches;

    fn registry() -> Arc<AnnotationRegistry> {
        let registry = Arc::new(AnnotationRegistry::new());
        registry.register_class(
            ClassDefinition::new("Acme\\Mapping\\Entity")
                .with_doc("/** @Annotation @Target(\"CLASS\") */")
                .with_property(PropertyDefinition::new("table").with_doc("/** @var string */")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Mapping\\Column")
                .with_doc("/** @Annotation @Target(\"PROPERTY\") */")
                .with_property(PropertyDefinition::new("type")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Routing\\Route")
                .with_doc("/** @Annotation @Target(\"METHOD\") */")
                .with_property(PropertyDefinition::new("path")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Behavior\\Timestamps")
                .with_kind(ClassKind::Trait)
                .with_import("Routing", "Acme\\Routing")
                .with_method(
                    MethodDefinition::new("touch").with_doc("/** @Routing\\Route(\"/touch\") */"),
                )
                .with_property(
                    PropertyDefinition::new("updatedAt").with_doc("/** @ORM\\Column(\"datetime\") */"),
                ),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Blog\\Post")
                .with_doc("/**\n * @ORM\\Entity(table=\"posts\")\n * @IgnoreAnnotation(\"draft\")\n * @draft\n */")
                .with_import("ORM", "Acme\\Mapping")
                .with_trait("Acme\\Behavior\\Timestamps")
                .with_property(PropertyDefinition::new("title").with_doc("/** @ORM\\Column(\"string\") @draft */"))
                .with_method(MethodDefinition::new("publish").with_doc("/** @ORM\\Column */")),
        );
        registry
    }

    fn reader() -> (Arc<AnnotationRegistry>, AnnotationReader) {
        let registry = registry();
        let reader = AnnotationReader::new(registry.clone());
        (registry, reader)
    }

    #[test]
    fn test_class_annotations() {
        let (_, reader) = reader();
        let post = reader.class("Acme\\Blog\\Post").unwrap();
        let annotations = reader.get_class_annotations(&post).unwrap();

        assert_eq!(annotations.len(), 2);
        assert!(annotations[1].is(builtin::IGNORE_ANNOTATION));

        let entity = reader
            .get_class_annotation(&post, "Acme\\Mapping\\Entity")
            .unwrap()
            .unwrap();
        assert_eq!(entity.get("table"), Some(&Value::from("posts")));
        assert!(reader.get_class_annotation(&post, "Acme\\Mapping\\Column").unwrap().is_none());
    }

    #[test]
    fn test_ignore_annotation_applies_to_members() {
        let (_, reader) = reader();
        let post = reader.class("Acme\\Blog\\Post").unwrap();
        let annotations = reader.get_property_annotations(&post, "title").unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].get("type"), Some(&Value::from("string")));
    }

    #[test]
    fn test_method_target_checked() {
        let (_, reader) = reader();
        let post = reader.class("Acme\\Blog\\Post").unwrap();
        let error = reader.get_method_annotations(&post, "publish").unwrap_err();
        assert_matches!(error, AnnotationError::Semantic(SemanticError::TargetNotAllowed { .. }));
        assert!(error.to_string().contains("method Acme\\Blog\\Post::publish()"));
    }

    #[test]
    fn test_trait_members_use_trait_imports() {
        let (_, reader) = reader();
        let post = reader.class("Acme\\Blog\\Post").unwrap();

        let route = reader
            .get_method_annotation(&post, "touch", "Acme\\Routing\\Route")
            .unwrap()
            .unwrap();
        assert_eq!(route.get("path"), Some(&Value::from("/touch")));

        // The class's own ORM import stays visible to trait members
        let column = reader
            .get_property_annotation(&post, "updatedAt", "Acme\\Mapping\\Column")
            .unwrap();
        assert!(column.is_some());
    }

    #[test]
    fn test_missing_members() {
        let (_, reader) = reader();
        let post = reader.class("Acme\\Blog\\Post").unwrap();
        assert_matches!(
            reader.get_method_annotations(&post, "missing"),
            Err(AnnotationError::MemberNotFound { kind: "Method", .. })
        );
        assert_matches!(
            reader.get_property_annotations(&post, "missing"),
            Err(AnnotationError::MemberNotFound { kind: "Property", .. })
        );
        assert_matches!(reader.class("Acme\\Missing"), Err(AnnotationError::ClassNotFound { .. }));
    }

    #[test]
    fn test_global_ignored_names() {
        let registry = registry();
        registry.register_class(
            ClassDefinition::new("Acme\\Blog\\Comment")
                .with_doc("/** @ORM\\Entity @internalTag */")
                .with_import("ORM", "Acme\\Mapping"),
        );
        let mut reader = AnnotationReader::new(registry.clone());
        let comment = reader.class("Acme\\Blog\\Comment").unwrap();
        assert!(reader.get_class_annotations(&comment).is_err());

        reader.add_global_ignored_name("internalTag");
        assert_eq!(reader.get_class_annotations(&comment).unwrap().len(), 1);
    }

    #[test]
    fn test_self_import() {
        let registry = registry();
        registry.register_class(
            ClassDefinition::new("Acme\\Mapping\\Index")
                .with_doc("/** @Annotation @self(\"x\") */")
                .with_property(PropertyDefinition::new("value")),
        );
        let reader = AnnotationReader::new(registry.clone());
        let index = reader.class("Acme\\Mapping\\Index").unwrap();
        let annotations = reader.get_class_annotations(&index).unwrap();
        assert!(annotations[0].is("Acme\\Mapping\\Index"));
    }
}
