//! Import extraction for declaring elements
use super::error::{ImportError, ImportResult};
use super::table::ImportTable;
use crate::registry::{ClassDefinition, TypeOracle};
use std::sync::Arc;

/// Scope whose `use` statements are requested
#[derive(Debug, Clone, Copy)]
pub enum ImportScope<'a> {
    Class(&'a ClassDefinition),
    /// A method or property of `class`; `declared_in` names the trait or
    /// parent class physically providing it
    Member {
        class: &'a ClassDefinition,
        declared_in: Option<&'a str>,
    },
}

pub trait ImportExtractor: Send + Sync {
    fn extract_imports(&self, scope: ImportScope<'_>) -> ImportResult<ImportTable>;
}

/// Extractor reading the imports recorded on class definitions
pub struct DeclaredImportExtractor {
    oracle: Arc<dyn TypeOracle>,
}

impl DeclaredImportExtractor {
    pub fn new(oracle: Arc<dyn TypeOracle>) -> Self {
        Self { oracle }
    }

    /// Class imports plus the enclosing namespace and a `self` alias
    pub fn class_table(class: &ClassDefinition) -> ImportTable {
        let mut table = ImportTable::new()
            .with_namespace(class.namespace())
            .with_import("self", &class.name);
        for (alias, target) in &class.imports {
            table.insert(alias, target);
        }
        table
    }

    fn member_table(
        &self,
        class: &ClassDefinition,
        declared_in: Option<&str>,
    ) -> ImportResult<ImportTable> {
        let Some(origin) = declared_in.filter(|o| !o.eq_ignore_ascii_case(&class.name)) else {
            return Ok(Self::class_table(class));
        };

        let provider = self
            .oracle
            .load(origin)
            .ok_or_else(|| ImportError::trait_not_found(origin, &class.name))?;

        if !provider.is_trait() {
            // Inherited member: resolved in the scope of the class declaring it
            return Ok(Self::class_table(&provider));
        }

        let mut table = Self::class_table(class);
        let trait_imports: ImportTable = provider.imports.iter().collect();
        table.merge(&trait_imports);
        Ok(table)
    }
}

impl ImportExtractor for DeclaredImportExtractor {
    fn extract_imports(&self, scope: ImportScope<'_>) -> ImportResult<ImportTable> {
        match scope {
            ImportScope::Class(class) => Ok(Self::class_table(class)),
            ImportScope::Member { class, declared_in } => self.member_table(class, declared_in),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AnnotationRegistry, ClassKind};
    use assert_matches::assert_matches;

    fn setup() -> (Arc<AnnotationRegistry>, DeclaredImportExtractor) {
        let registry = Arc::new(AnnotationRegistry::new());
        registry.register_class(
            ClassDefinition::new("Acme\\Blog\\Post")
                .with_import("ORM", "Acme\\Mapping")
                .with_parent("Acme\\Model\\Base")
                .with_trait("Acme\\Stamps"),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Stamps")
                .with_kind(ClassKind::Trait)
                .with_import("Clock", "Acme\\Time\\Clock"),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Model\\Base").with_import("Col", "Acme\\Mapping\\Column"),
        );
        let extractor = DeclaredImportExtractor::new(registry.clone());
        (registry, extractor)
    }

    #[test]
    fn test_class_scope() {
        let (registry, extractor) = setup();
        let post = registry.load("Acme\\Blog\\Post").unwrap();
        let table = extractor.extract_imports(ImportScope::Class(&post)).unwrap();
        assert_eq!(table.get("orm"), Some("Acme\\Mapping"));
        assert_eq!(table.get("self"), Some("Acme\\Blog\\Post"));
        assert_eq!(table.enclosing_namespace(), Some("Acme\\Blog"));
    }

    #[test]
    fn test_trait_member_merges_trait_imports() {
        let (registry, extractor) = setup();
        let post = registry.load("Acme\\Blog\\Post").unwrap();
        let table = extractor
            .extract_imports(ImportScope::Member {
                class: &post,
                declared_in: Some("Acme\\Stamps"),
            })
            .unwrap();
        assert_eq!(table.get("clock"), Some("Acme\\Time\\Clock"));
        assert_eq!(table.get("orm"), Some("Acme\\Mapping"));
    }

    #[test]
    fn test_inherited_member_uses_parent_scope() {
        let (registry, extractor) = setup();
        let post = registry.load("Acme\\Blog\\Post").unwrap();
        let table = extractor
            .extract_imports(ImportScope::Member {
                class: &post,
                declared_in: Some("Acme\\Model\\Base"),
            })
            .unwrap();
        assert_eq!(table.get("col"), Some("Acme\\Mapping\\Column"));
        assert_eq!(table.get("orm"), None);
        assert_eq!(table.enclosing_namespace(), Some("Acme\\Model"));
    }

    #[test]
    fn test_missing_trait() {
        let (registry, extractor) = setup();
        let post = registry.load("Acme\\Blog\\Post").unwrap();
        let result = extractor.extract_imports(ImportScope::Member {
            class: &post,
            declared_in: Some("Acme\\Gone"),
        });
        assert_matches!(result, Err(ImportError::TraitNotFound { .. }));
    }
}
