//! Syntax analysis of docblock annotations
//!
//! [`DocParser`] drives the lexer, resolves annotation names, fetches type
//! metadata and hands assembled values to semantic analysis.

pub mod constant;
pub mod error;
pub mod parser;

pub use constant::ConstantResolver;
pub use error::{SyntaxError, SyntaxResult};
pub use parser::DocParser;
