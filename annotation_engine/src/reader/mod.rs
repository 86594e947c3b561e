//! Annotation readers over registered classes
//!
//! [`AnnotationReader`] resolves names through each class's declared
//! imports. [`SimpleAnnotationReader`] resolves them through a list of
//! namespaces instead and silently skips anything it cannot find.

pub mod annotation_reader;
pub mod element;
pub mod simple;

pub use annotation_reader::{get_single, AnnotationReader};
pub use element::DeclaringElement;
pub use simple::SimpleAnnotationReader;
