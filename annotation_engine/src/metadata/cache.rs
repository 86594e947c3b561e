//! Process-wide descriptor cache
use super::builtin;
use super::collector::collect;
use super::descriptor::AnnotationDescriptor;
use crate::config::compile_time::metadata::MAX_CACHED_DESCRIPTORS;
use crate::config::runtime::parser_preferences;
use crate::pipeline::AnnotationError;
use crate::registry::TypeOracle;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Descriptors keyed by lower-cased fully-qualified name
///
/// Starts seeded with the directive types. Concurrent first-time collection
/// of the same type is allowed; both results are equivalent and the later
/// insert wins.
#[derive(Debug)]
pub struct MetadataCache {
    descriptors: RwLock<HashMap<String, Arc<AnnotationDescriptor>>>,
}

fn cache_key(class: &str) -> String {
    class.trim_start_matches('\\').to_ascii_lowercase()
}

fn seeded_map() -> HashMap<String, Arc<AnnotationDescriptor>> {
    builtin::seeded_descriptors()
        .into_iter()
        .map(|descriptor| (cache_key(&descriptor.class), Arc::new(descriptor)))
        .collect()
}

impl MetadataCache {
    pub fn new() -> Self {
        Self {
            descriptors: RwLock::new(seeded_map()),
        }
    }

    pub fn get(&self, class: &str) -> Option<Arc<AnnotationDescriptor>> {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cache_key(class))
            .cloned()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.get(class).is_some()
    }

    /// Store a descriptor; returns false once the cache is full
    pub fn insert(&self, descriptor: AnnotationDescriptor) -> bool {
        let mut descriptors = self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let key = cache_key(&descriptor.class);
        if descriptors.len() >= MAX_CACHED_DESCRIPTORS && !descriptors.contains_key(&key) {
            crate::log_warning!(
                "Metadata cache is full; descriptor not cached",
                "class" => descriptor.class,
                "limit" => MAX_CACHED_DESCRIPTORS
            );
            return false;
        }
        descriptors.insert(key, Arc::new(descriptor));
        true
    }

    pub fn len(&self) -> usize {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop collected descriptors, keeping the seeded ones
    pub fn clear(&self) {
        *self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner) = seeded_map();
    }

    /// Cached descriptor, or collect one from the type's definition
    ///
    /// Collection may parse docblocks, which reenters this cache; no lock is
    /// held while it runs.
    pub fn get_or_collect(
        self: &Arc<Self>,
        class: &str,
        oracle: &Arc<dyn TypeOracle>,
    ) -> Result<Arc<AnnotationDescriptor>, AnnotationError> {
        if let Some(descriptor) = self.get(class) {
            crate::log_debug!("Metadata cache hit", "class" => class);
            return Ok(descriptor);
        }
        if parser_preferences().log_metadata_collection {
            crate::log_debug!("Metadata cache miss", "class" => class);
        }

        let definition = builtin::definition(class)
            .or_else(|| oracle.load(class))
            .ok_or_else(|| AnnotationError::class_not_found(class))?;

        let descriptor = collect(&definition, oracle, self)?;
        let descriptor = Arc::new(descriptor);
        self.insert(descriptor.as_ref().clone());
        Ok(descriptor)
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AnnotationRegistry, ClassDefinition, PropertyDefinition};
    use assert_matches::assert_matches;

    fn oracle() -> Arc<dyn TypeOracle> {
        let registry = AnnotationRegistry::new();
        registry.register_class(
            ClassDefinition::new("Acme\\Route")
                .with_doc("/** @Annotation */")
                .with_property(PropertyDefinition::new("path")),
        );
        Arc::new(registry)
    }

    #[test]
    fn test_seeded_on_creation() {
        let cache = MetadataCache::new();
        assert_eq!(cache.len(), 4);
        assert!(cache.contains(builtin::TARGET));
        assert!(cache.contains("\\annotationengine\\annotation\\enum"));
        assert!(!cache.contains(builtin::IGNORE_ANNOTATION));
    }

    #[test]
    fn test_collects_once_and_caches() {
        let cache = Arc::new(MetadataCache::new());
        let oracle = oracle();

        let first = cache.get_or_collect("Acme\\Route", &oracle).unwrap();
        assert!(first.is_annotation);
        assert_eq!(cache.len(), 5);

        let second = cache.get_or_collect("acme\\route", &oracle).unwrap();
        assert_eq!(second.default_property.as_deref(), Some("path"));
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_unknown_class() {
        let cache = Arc::new(MetadataCache::new());
        let result = cache.get_or_collect("Acme\\Missing", &oracle());
        assert_matches!(result, Err(AnnotationError::ClassNotFound { .. }));
    }

    #[test]
    fn test_clear_keeps_seeded() {
        let cache = Arc::new(MetadataCache::new());
        cache.get_or_collect("Acme\\Route", &oracle()).unwrap();
        cache.clear();
        assert_eq!(cache.len(), 4);
        assert!(!cache.contains("Acme\\Route"));
    }
}
