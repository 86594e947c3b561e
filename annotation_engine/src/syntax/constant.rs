//! Constant references inside annotation arguments
//!
//! `NAME` is a global constant, `Class::NAME` a class constant whose class
//! part is qualified like an annotation name, and `Class::class` yields the
//! qualified class name itself.

use crate::grammar::Value;
use crate::imports::ImportTable;
use crate::metadata::builtin;
use crate::registry::TypeOracle;
use crate::semantic_analysis::{SemanticError, SemanticResult};

const CLASS_SUFFIX: &str = "::class";

/// Whether a type can be loaded; directive types always can
pub(crate) fn type_exists(oracle: &dyn TypeOracle, name: &str) -> bool {
    builtin::is_builtin(name) || oracle.exists(name)
}

/// Name scope a constant identifier is resolved in
pub struct ConstantResolver<'a> {
    pub oracle: &'a dyn TypeOracle,
    pub imports: &'a ImportTable,
    pub namespaces: &'a [String],
}

impl ConstantResolver<'_> {
    pub fn resolve(&self, identifier: &str, context: &str) -> SemanticResult<Value> {
        let mut identifier = identifier.to_string();

        if !identifier.starts_with('\\') && self.lookup(&identifier).is_none() {
            if let Some((class, constant)) = identifier.split_once("::") {
                if let Some(qualified) = self.qualify_class(class) {
                    identifier = format!("{}::{}", qualified, constant);
                }
            }
        }

        if let Some(class) = strip_class_suffix(&identifier) {
            return Ok(Value::from(class.trim_start_matches('\\')));
        }

        self.lookup(&identifier)
            .ok_or_else(|| SemanticError::undefined_constant(&identifier, context))
    }

    fn lookup(&self, identifier: &str) -> Option<Value> {
        let identifier = identifier.trim_start_matches('\\');
        match identifier.split_once("::") {
            Some((class, constant)) => self.oracle.class_constant(class, constant),
            None => self.oracle.global_constant(identifier),
        }
    }

    fn qualify_class(&self, class: &str) -> Option<String> {
        let (alias, rest) = class.find('\\').map_or((class, ""), |pos| class.split_at(pos));

        if !self.namespaces.is_empty() {
            return self
                .namespaces
                .iter()
                .map(|namespace| format!("{}\\{}", namespace, class))
                .find(|candidate| type_exists(self.oracle, candidate));
        }

        if let Some(import) = self.imports.get(alias) {
            return Some(format!("{}{}", import, rest));
        }

        self.imports
            .enclosing_namespace()
            .map(|namespace| format!("{}\\{}", namespace, class))
            .filter(|candidate| type_exists(self.oracle, candidate))
    }
}

fn strip_class_suffix(identifier: &str) -> Option<&str> {
    let split = identifier.len().checked_sub(CLASS_SUFFIX.len())?;
    let suffix = identifier.get(split..)?;
    suffix
        .eq_ignore_ascii_case(CLASS_SUFFIX)
        .then(|| &identifier[..split])
}
