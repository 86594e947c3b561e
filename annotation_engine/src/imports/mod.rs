//! Import and ignore resolution
//!
//! An [`ImportTable`] maps lower-cased aliases to fully-qualified names for
//! one declaring element; an [`IgnoreSet`] lists names and namespaces whose
//! annotations are skipped rather than rejected.

pub mod error;
pub mod extractor;
pub mod ignore;
pub mod table;

pub use error::{ImportError, ImportResult};
pub use extractor::{DeclaredImportExtractor, ImportExtractor, ImportScope};
pub use ignore::{IgnoreSet, DEFAULT_IGNORED_NAMES};
pub use table::ImportTable;
