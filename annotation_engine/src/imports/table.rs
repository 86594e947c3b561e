//! Alias to fully-qualified name tables
use std::collections::BTreeMap;

/// Imports in scope for one declaring element
///
/// Aliases are stored lower-cased; targets never carry a leading separator.
/// The enclosing namespace is kept apart from the aliases so it can never
/// collide with a `use` statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    aliases: BTreeMap<String, String>,
    namespace: Option<String>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.trim_matches('\\').to_string());
        self
    }

    pub fn with_import(mut self, alias: &str, target: &str) -> Self {
        self.insert(alias, target);
        self
    }

    pub fn insert(&mut self, alias: &str, target: &str) {
        self.aliases.insert(
            alias.to_ascii_lowercase(),
            target.trim_start_matches('\\').to_string(),
        );
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.aliases
            .get(&alias.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The namespace the declaring element lives in; `Some("")` for the global namespace
    pub fn enclosing_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Entries of `other` win over existing ones
    pub fn merge(&mut self, other: &ImportTable) {
        for (alias, target) in &other.aliases {
            self.aliases.insert(alias.clone(), target.clone());
        }
        if other.namespace.is_some() {
            self.namespace = other.namespace.clone();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// No aliases and no enclosing namespace
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.namespace.is_none()
    }
}

impl<A: AsRef<str>, T: AsRef<str>> FromIterator<(A, T)> for ImportTable {
    fn from_iter<I: IntoIterator<Item = (A, T)>>(iter: I) -> Self {
        let mut table = ImportTable::new();
        for (alias, target) in iter {
            table.insert(alias.as_ref(), target.as_ref());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_are_case_insensitive() {
        let table = ImportTable::new().with_import("ORM", "\\Acme\\Mapping");
        assert_eq!(table.get("orm"), Some("Acme\\Mapping"));
        assert_eq!(table.get("Orm"), Some("Acme\\Mapping"));
        assert_eq!(table.get("Route"), None);
    }

    #[test]
    fn test_namespace_is_not_an_alias() {
        let table = ImportTable::new().with_namespace("Acme\\Blog\\");
        assert_eq!(table.enclosing_namespace(), Some("Acme\\Blog"));
        assert_eq!(table.len(), 0);
        assert!(!table.is_empty());
        assert_eq!(table.get("__NAMESPACE__"), None);
    }

    #[test]
    fn test_merge_overrides() {
        let mut class = ImportTable::new()
            .with_namespace("Acme")
            .with_import("Route", "Acme\\Route");
        let from_trait: ImportTable = [("route", "Other\\Route"), ("Cache", "Other\\Cache")]
            .into_iter()
            .collect();
        class.merge(&from_trait);
        assert_eq!(class.get("route"), Some("Other\\Route"));
        assert_eq!(class.get("cache"), Some("Other\\Cache"));
        assert_eq!(class.enclosing_namespace(), Some("Acme"));
    }
}
