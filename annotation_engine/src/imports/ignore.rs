//! Names and namespaces whose annotations are skipped instead of rejected
use std::collections::HashSet;

/// Tags of documentation tools and coding standards that are never annotations
pub const DEFAULT_IGNORED_NAMES: &[&str] = &[
    // Annotation metadata directives
    "Annotation",
    "Attribute",
    "Attributes",
    "Required",
    "Target",
    // Widely used, not part of any documentation standard
    "fix",
    "fixme",
    "override",
    // Documentation tool tags, first generation
    "abstract",
    "access",
    "code",
    "deprec",
    "endcode",
    "exception",
    "final",
    "ingroup",
    "inheritdoc",
    "inheritDoc",
    "magic",
    "name",
    "toc",
    "tutorial",
    "private",
    "static",
    "staticvar",
    "staticVar",
    "throw",
    // Documentation tool tags, second generation
    "api",
    "author",
    "category",
    "copyright",
    "deprecated",
    "example",
    "filesource",
    "global",
    "ignore",
    "internal",
    "license",
    "link",
    "method",
    "package",
    "param",
    "property",
    "property-read",
    "property-write",
    "return",
    "see",
    "since",
    "source",
    "subpackage",
    "throws",
    "todo",
    "TODO",
    "usedby",
    "uses",
    "var",
    "version",
    // Test coverage markers
    "codeCoverageIgnore",
    "codeCoverageIgnoreStart",
    "codeCoverageIgnoreEnd",
    // Static analysis and code style tools
    "SuppressWarnings",
    "noinspection",
    "package_version",
    "startuml",
    "enduml",
    "experimental",
    "phpcsSuppress",
    "codingStandardsIgnoreStart",
    "codingStandardsIgnoreEnd",
    "template",
    "implements",
    "extends",
    "use",
];

/// Ignored names (exact match) and namespaces (case-insensitive prefix)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    names: HashSet<String>,
    namespaces: Vec<String>,
}

fn normalize_namespace(namespace: &str) -> String {
    format!("{}\\", namespace.trim_end_matches('\\').to_ascii_lowercase())
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set seeded with [`DEFAULT_IGNORED_NAMES`]
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.extend_names(DEFAULT_IGNORED_NAMES.iter().copied());
        set
    }

    pub fn add_name(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    pub fn extend_names<'a, I: IntoIterator<Item = &'a str>>(&mut self, names: I) {
        for name in names {
            self.add_name(name);
        }
    }

    pub fn add_namespace(&mut self, namespace: &str) {
        let namespace = normalize_namespace(namespace);
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace);
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.add_name(name);
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.add_namespace(namespace);
        self
    }

    /// Union of both sets
    pub fn merge(&mut self, other: &IgnoreSet) {
        self.names.extend(other.names.iter().cloned());
        for namespace in &other.namespaces {
            if !self.namespaces.contains(namespace) {
                self.namespaces.push(namespace.clone());
            }
        }
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn in_ignored_namespace(&self, name: &str) -> bool {
        let candidate = normalize_namespace(name);
        self.namespaces.iter().any(|ns| candidate.starts_with(ns))
    }

    /// Exact name membership or a matching namespace prefix
    pub fn is_ignored(&self, name: &str) -> bool {
        self.contains_name(name) || self.in_ignored_namespace(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.namespaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_contain_documentation_tags() {
        let set = IgnoreSet::with_defaults();
        for tag in ["param", "return", "deprecated", "var", "property-read"] {
            assert!(set.is_ignored(tag), "{} should be ignored", tag);
        }
        assert!(!set.is_ignored("Route"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let set = IgnoreSet::new().with_name("Foo");
        assert!(set.is_ignored("Foo"));
        assert!(!set.is_ignored("foo"));
    }

    #[test]
    fn test_namespace_prefix_matching() {
        let set = IgnoreSet::new().with_namespace("Acme\\Docs\\");
        assert!(set.is_ignored("acme\\docs\\Example"));
        assert!(set.is_ignored("Acme\\Docs"));
        assert!(set.is_ignored("Acme\\Docs\\"));
        assert!(!set.is_ignored("Acme\\DocsExtra\\Example"));
        assert!(!set.is_ignored("Acme\\Other"));
    }

    #[test]
    fn test_merge() {
        let mut set = IgnoreSet::new().with_name("a");
        set.merge(&IgnoreSet::new().with_name("b").with_namespace("X"));
        assert!(set.is_ignored("a"));
        assert!(set.is_ignored("b"));
        assert!(set.is_ignored("X\\Y"));
    }
}
