//! Semantic analysis of parsed argument lists
//!
//! Runs after an annotation's raw values are parsed: enum membership,
//! declared attribute types, then construction of the object.

pub mod construct;
pub mod error;
pub mod type_checker;
pub mod types;

pub use construct::instantiate;
pub use error::{SemanticError, SemanticResult};
pub use type_checker::{check_attributes, check_enums, CheckContext};
pub use types::{describe_actual, value_matches};
