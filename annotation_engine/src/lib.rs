//! Docblock annotation engine
//!
//! Reads `@Name(...)` annotations out of doc comments attached to classes,
//! methods and properties, resolves the names through import tables,
//! validates the arguments against metadata collected from each annotation
//! class, and constructs typed annotation values.

// Internal modules
pub mod batch;
pub mod config;
pub mod grammar;
pub mod imports;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod metadata;
pub mod pipeline;
pub mod reader;
pub mod registry;
pub mod semantic_analysis;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults, Workspace};
pub use grammar::{Annotation, ArrayKey, ArrayValue, Target, Value};
pub use imports::{IgnoreSet, ImportTable};
pub use metadata::MetadataCache;
pub use pipeline::{get_single, AnnotationEngine, AnnotationError, PipelineResult};
pub use reader::{AnnotationReader, SimpleAnnotationReader};
pub use registry::{AnnotationRegistry, ClassDefinition, TypeOracle};
