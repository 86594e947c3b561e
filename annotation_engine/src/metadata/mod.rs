//! Annotation type metadata
//!
//! A descriptor records whether a type is an annotation, where it may be
//! attached, how instances are built and which attribute constraints apply.
//! Descriptors are collected lazily from type definitions and cached for
//! the life of the process.

pub mod builtin;
pub mod cache;
pub mod collector;
pub mod descriptor;

pub use cache::MetadataCache;
pub use collector::collect;
pub use descriptor::{
    value_map_factory, AnnotationDescriptor, AttributeType, ConstructionStyle, EnumConstraint,
    FieldSlot,
};
