//! Class registry: definitions, source units and the type oracle
//!
//! Annotation classes and the classes they decorate are described by
//! [`ClassDefinition`]s. They are registered explicitly, loaded from TOML
//! source units, autoloaded from namespace directories or produced by
//! fallback loaders.

pub mod definition;
pub mod error;
pub mod loader;
pub mod oracle;
pub mod source;

pub use definition::{
    ClassDefinition, ClassKind, Constructor, Factory, MethodDefinition, PropertyDefinition,
    Visibility,
};
pub use error::{RegistryError, RegistryResult};
pub use loader::{register_units, AnnotationRegistry, Loader};
pub use oracle::{all_properties, find_method, TypeOracle};
pub use source::{load_unit, parse_unit, SourceUnit};
