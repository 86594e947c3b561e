//! Annotation registry: loaded classes, autoload directories and fallback loaders
use super::definition::ClassDefinition;
use super::error::{RegistryError, RegistryResult};
use super::oracle::TypeOracle;
use super::source::{load_unit, SourceUnit};
use crate::config::compile_time::registry::MAX_NEGATIVE_CACHE_ENTRIES;
use crate::grammar::Value;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success, log_warning};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Fallback loader; returns the definition when it can provide the class
pub type Loader = Arc<dyn Fn(&str) -> Option<ClassDefinition> + Send + Sync>;

#[derive(Default)]
struct RegistryState {
    classes: HashMap<String, Arc<ClassDefinition>>,
    autoload: Vec<(String, Vec<PathBuf>)>,
    loaders: Vec<Loader>,
    failed: HashSet<String>,
    constants: HashMap<String, Value>,
}

/// Process-wide type registry implementing the loader chain:
/// already loaded, then autoload directories, then fallback loaders.
/// Failed lookups are remembered until [`AnnotationRegistry::reset`].
#[derive(Default)]
pub struct AnnotationRegistry {
    state: RwLock<RegistryState>,
}

fn key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget loaded classes, autoload entries, loaders, failures and constants
    pub fn reset(&self) {
        *self.write() = RegistryState::default();
    }

    pub fn register_class(&self, class: ClassDefinition) -> Arc<ClassDefinition> {
        let class = Arc::new(class);
        let mut state = self.write();
        let key = key(&class.name);
        state.failed.remove(&key);
        state.classes.insert(key, Arc::clone(&class));
        class
    }

    /// Register every class of a source unit, returning their names
    pub fn register_unit(&self, unit: &SourceUnit) -> RegistryResult<Vec<String>> {
        let definitions = unit.to_definitions()?;
        Ok(definitions
            .into_iter()
            .map(|class| self.register_class(class).name.clone())
            .collect())
    }

    pub fn register_file(&self, path: &Path) -> RegistryResult<Vec<String>> {
        let unit = load_unit(path)?;
        self.register_unit(&unit)
    }

    /// Map a namespace prefix to class directories; class `A\B\C` is looked up
    /// as `<dir>/A/B/C.toml`. An empty list searches the working directory.
    pub fn register_autoload_namespace(&self, namespace: &str, dirs: Vec<PathBuf>) {
        let namespace = namespace.trim_start_matches('\\').to_string();
        let dirs = if dirs.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            dirs
        };

        let mut state = self.write();
        match state.autoload.iter_mut().find(|(ns, _)| *ns == namespace) {
            Some(entry) => entry.1 = dirs,
            None => state.autoload.push((namespace, dirs)),
        }
    }

    pub fn register_autoload_namespaces<I>(&self, namespaces: I)
    where
        I: IntoIterator<Item = (String, Vec<PathBuf>)>,
    {
        for (namespace, dirs) in namespaces {
            self.register_autoload_namespace(&namespace, dirs);
        }
    }

    pub fn register_loader(&self, loader: Loader) {
        self.write().loaders.push(loader);
    }

    /// Register a loader unless the same loader is already registered
    pub fn register_unique_loader(&self, loader: Loader) {
        let mut state = self.write();
        if !state.loaders.iter().any(|l| Arc::ptr_eq(l, &loader)) {
            state.loaders.push(loader);
        }
    }

    pub fn define_constant(&self, name: &str, value: Value) -> RegistryResult<()> {
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '\\')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\');
        if !valid {
            return Err(RegistryError::invalid_constant(name, "not a valid constant name"));
        }

        self.write()
            .constants
            .insert(name.trim_start_matches('\\').to_string(), value);
        Ok(())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.read().classes.contains_key(&key(name))
    }

    pub fn loaded_count(&self) -> usize {
        self.read().classes.len()
    }

    pub fn failed_count(&self) -> usize {
        self.read().failed.len()
    }

    pub fn loaded_classes(&self) -> Vec<Arc<ClassDefinition>> {
        self.read().classes.values().cloned().collect()
    }

    /// Run the loader chain for `name`
    pub fn load_class(&self, name: &str) -> Option<Arc<ClassDefinition>> {
        let name = name.trim_start_matches('\\');
        let key = key(name);

        let (candidates, loaders) = {
            let state = self.read();
            if let Some(class) = state.classes.get(&key) {
                return Some(Arc::clone(class));
            }
            if state.failed.contains(&key) {
                log_debug!("Negative cache hit", "class" => name);
                return None;
            }

            let relative = format!("{}.toml", name.replace('\\', "/"));
            let candidates: Vec<PathBuf> = state
                .autoload
                .iter()
                .filter(|(namespace, _)| name.starts_with(namespace.as_str()))
                .flat_map(|(_, dirs)| dirs.iter().map(|dir| dir.join(&relative)))
                .collect();
            (candidates, state.loaders.clone())
        };

        // Lock released: loaders may call back into the registry
        for file in candidates.iter().filter(|f| f.is_file()) {
            match self.register_file(file) {
                Ok(_) => {
                    if let Some(class) = self.read().classes.get(&key) {
                        log_debug!("Class autoloaded", "class" => name, "file" => file.display());
                        return Some(Arc::clone(class));
                    }
                }
                Err(err) => {
                    log_error!(err.error_code(), &err.to_string(), "class" => name);
                }
            }
        }

        for loader in &loaders {
            if let Some(definition) = loader(name) {
                self.register_class(definition);
                if let Some(class) = self.read().classes.get(&key) {
                    log_debug!("Class provided by fallback loader", "class" => name);
                    return Some(Arc::clone(class));
                }
            }
        }

        let mut state = self.write();
        if state.failed.len() < MAX_NEGATIVE_CACHE_ENTRIES {
            state.failed.insert(key);
        } else {
            log_warning!("Negative cache full", "class" => name);
        }
        None
    }
}

impl TypeOracle for AnnotationRegistry {
    fn load(&self, name: &str) -> Option<Arc<ClassDefinition>> {
        self.load_class(name)
    }

    fn global_constant(&self, name: &str) -> Option<Value> {
        self.read()
            .constants
            .get(name.trim_start_matches('\\'))
            .cloned()
    }
}

/// Registration helpers used by the CLI and batch processing
pub fn register_units<'a, I>(registry: &AnnotationRegistry, units: I) -> RegistryResult<usize>
where
    I: IntoIterator<Item = &'a SourceUnit>,
{
    let mut count = 0;
    for unit in units {
        count += registry.register_unit(unit)?.len();
    }
    log_success!(
        codes::success::TYPE_LOADED,
        "Source units registered",
        "classes" => count
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_registered_class_is_case_insensitive() {
        let registry = AnnotationRegistry::new();
        registry.register_class(ClassDefinition::new("Acme\\Route"));
        assert!(registry.exists("acme\\route"));
        assert!(registry.exists("\\Acme\\Route"));
        assert!(!registry.exists("Acme\\Other"));
    }

    #[test]
    fn test_autoload_directory() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("Acme").join("Routing");
        std::fs::create_dir_all(&class_dir).unwrap();
        std::fs::write(
            class_dir.join("Route.toml"),
            "namespace = \"Acme\\\\Routing\"\n[[classes]]\nname = \"Route\"\ndoc = \"/** @Annotation */\"\n",
        )
        .unwrap();

        let registry = AnnotationRegistry::new();
        registry.register_autoload_namespace("Acme\\", vec![dir.path().to_path_buf()]);

        let class = registry.load("Acme\\Routing\\Route").unwrap();
        assert_eq!(class.doc(), "/** @Annotation */");
        assert!(registry.is_loaded("Acme\\Routing\\Route"));
        assert!(!registry.exists("Acme\\Routing\\Missing"));
        assert!(!registry.exists("Other\\Route"));
    }

    #[test]
    fn test_loaders_run_in_order_and_failures_are_cached() {
        let registry = AnnotationRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        registry.register_loader(Arc::new(move |_name: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            None
        }));
        registry.register_loader(Arc::new(|name: &str| {
            (name == "Acme\\Generated").then(|| ClassDefinition::new(name))
        }));

        assert!(registry.exists("Acme\\Generated"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(!registry.exists("Acme\\Nope"));
        assert!(!registry.exists("Acme\\Nope"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(registry.failed_count(), 1);

        registry.register_class(ClassDefinition::new("Acme\\Nope"));
        assert!(registry.exists("Acme\\Nope"));
        assert_eq!(registry.failed_count(), 0);
    }

    #[test]
    fn test_unique_loader() {
        let registry = AnnotationRegistry::new();
        let loader: Loader = Arc::new(|_: &str| None);
        registry.register_unique_loader(Arc::clone(&loader));
        registry.register_unique_loader(Arc::clone(&loader));
        registry.register_loader(loader);
        assert_eq!(registry.read().loaders.len(), 2);
    }

    #[test]
    fn test_constants_and_reset() {
        let registry = AnnotationRegistry::new();
        registry.define_constant("PHP_EOL", Value::from("\n")).unwrap();
        assert_eq!(registry.global_constant("PHP_EOL"), Some(Value::from("\n")));
        assert_matches!(
            registry.define_constant("1BAD", Value::Null),
            Err(RegistryError::InvalidConstant { .. })
        );

        registry.register_class(ClassDefinition::new("A"));
        registry.reset();
        assert_eq!(registry.loaded_count(), 0);
        assert_eq!(registry.global_constant("PHP_EOL"), None);
    }

    #[test]
    fn test_register_units() {
        let unit = super::super::source::parse_unit(
            "namespace = \"Acme\"\n[[classes]]\nname = \"A\"\n[[classes]]\nname = \"B\"\n",
            Path::new("unit.toml"),
        )
        .unwrap();
        let registry = AnnotationRegistry::new();
        assert_eq!(register_units(&registry, [&unit]).unwrap(), 2);
        assert!(registry.exists("Acme\\B"));
    }
}
