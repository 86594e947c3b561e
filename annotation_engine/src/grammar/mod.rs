//! Values and objects produced by parsing annotation expressions

pub mod nodes;
pub mod target;

pub use nodes::{Annotation, ArrayKey, ArrayValue, Value, ValueMap};
pub use target::Target;
