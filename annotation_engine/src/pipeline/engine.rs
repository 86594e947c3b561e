//! Direct docblock parsing entry point
use super::error::AnnotationError;
use crate::grammar::{Annotation, Target};
use crate::imports::{IgnoreSet, ImportTable};
use crate::metadata::MetadataCache;
use crate::reader::{AnnotationReader, SimpleAnnotationReader};
use crate::registry::TypeOracle;
use crate::syntax::DocParser;
use std::sync::Arc;

/// Owns the type oracle and the metadata cache shared by every parse
///
/// Readers created from an engine share its cache, so descriptors collected
/// through one are visible to all.
#[derive(Clone)]
pub struct AnnotationEngine {
    oracle: Arc<dyn TypeOracle>,
    cache: Arc<MetadataCache>,
}

impl AnnotationEngine {
    pub fn new(oracle: Arc<dyn TypeOracle>) -> Self {
        Self::with_cache(oracle, Arc::new(MetadataCache::new()))
    }

    pub fn with_cache(oracle: Arc<dyn TypeOracle>, cache: Arc<MetadataCache>) -> Self {
        Self { oracle, cache }
    }

    pub fn oracle(&self) -> &Arc<dyn TypeOracle> {
        &self.oracle
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Parse `text` as if declared on an element of kind `target`
    ///
    /// Only the given names and namespaces are ignored; pass
    /// [`crate::imports::DEFAULT_IGNORED_NAMES`] to skip the usual
    /// documentation tags.
    pub fn parse(
        &self,
        text: &str,
        target: Target,
        imports: &ImportTable,
        ignore_names: &[&str],
        ignore_namespaces: &[&str],
    ) -> Result<Vec<Annotation>, AnnotationError> {
        let mut ignore = IgnoreSet::new();
        ignore.extend_names(ignore_names.iter().copied());
        for namespace in ignore_namespaces {
            ignore.add_namespace(namespace);
        }
        self.parse_with(text, target, imports, ignore, "")
    }

    /// Parse with a prepared ignore set and an error-message context
    pub fn parse_with(
        &self,
        text: &str,
        target: Target,
        imports: &ImportTable,
        ignore: IgnoreSet,
        context: &str,
    ) -> Result<Vec<Annotation>, AnnotationError> {
        let mut parser = DocParser::new(self.oracle.clone(), self.cache.clone());
        parser.set_target(target);
        parser.set_imports(imports.clone())?;
        parser.set_ignored(ignore);
        parser.parse(text, context)
    }

    pub fn reader(&self) -> AnnotationReader {
        AnnotationReader::with_cache(self.oracle.clone(), self.cache.clone())
    }

    pub fn simple_reader(&self, namespaces: &[&str]) -> SimpleAnnotationReader {
        let mut reader = SimpleAnnotationReader::with_cache(self.oracle.clone(), self.cache.clone());
        for namespace in namespaces {
            reader.add_namespace(namespace);
        }
        reader
    }
}

impl std::fmt::Debug for AnnotationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationEngine")
            .field("cached_descriptors", &self.cache.len())
            .finish_non_exhaustive()
    }
}
