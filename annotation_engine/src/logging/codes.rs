//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const DOCBLOCK_TOO_LARGE: Code = Code::new("E020");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E051");
    pub const MAX_NESTING_DEPTH: Code = Code::new("E052");
}

/// Import and ignore resolution error codes
pub mod imports {
    use super::Code;

    pub const CONFLICTING_MODES: Code = Code::new("E060");
    pub const TRAIT_NOT_FOUND: Code = Code::new("E061");
}

/// Type registry error codes
pub mod registry {
    use super::Code;

    pub const INVALID_DEFINITION_FILE: Code = Code::new("E070");
    pub const INVALID_CONSTANT: Code = Code::new("E071");
}

/// Semantic analysis error codes
pub mod semantic {
    use super::Code;

    pub const NEVER_IMPORTED: Code = Code::new("E100");
    pub const TYPE_NOT_LOADABLE: Code = Code::new("E101");
    pub const NOT_AN_ANNOTATION: Code = Code::new("E102");
    pub const TARGET_NOT_ALLOWED: Code = Code::new("E103");
    pub const UNDEFINED_CONSTANT: Code = Code::new("E104");
    pub const ATTRIBUTE_TYPE_MISMATCH: Code = Code::new("E110");
    pub const REQUIRED_ATTRIBUTE_MISSING: Code = Code::new("E111");
    pub const INVALID_ENUMERATOR: Code = Code::new("E112");
    pub const CREATION_ERROR: Code = Code::new("E120");
}

/// Batch processing error codes
pub mod batch {
    use super::Code;

    pub const NO_FILES_FOUND: Code = Code::new("E130");
    pub const THREAD_FAILURE: Code = Code::new("E131");
    pub const TOO_MANY_FILES: Code = Code::new("E132");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const DOCBLOCK_PARSED: Code = Code::new("I040");
    pub const METADATA_COLLECTED: Code = Code::new("I050");
    pub const TYPE_LOADED: Code = Code::new("I060");
    pub const BATCH_COMPLETED: Code = Code::new("I070");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

const ERROR_METADATA: &[ErrorMetadata] = &[
    // System errors
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal system error",
        "File a bug report with the failing input",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "System initialization failure",
        "Check logging and runtime configuration",
    ),
    // File processing errors
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "File not found at specified path",
        "Check file path and ensure file exists",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "File exceeds maximum size limit",
        "Reduce file size or raise max_definition_file_size",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "Permission denied accessing file",
        "Check file permissions and user access rights",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "I/O error during file operation",
        "Check disk space, permissions, and file system integrity",
    ),
    ErrorMetadata::new(
        "E012",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "Invalid file path provided",
        "Provide a valid file path",
    ),
    // Lexical errors
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::Medium,
        false,
        true,
        "Docblock exceeds maximum size limit",
        "Shorten the comment or raise max_docblock_size",
    ),
    // Syntax errors
    ErrorMetadata::new(
        "E050",
        "Syntax",
        Severity::High,
        false,
        true,
        "Unexpected token in annotation expression",
        "Fix the annotation syntax at the reported position",
    ),
    ErrorMetadata::new(
        "E051",
        "Syntax",
        Severity::High,
        false,
        true,
        "Docblock ended inside an annotation expression",
        "Close every parenthesis and brace",
    ),
    ErrorMetadata::new(
        "E052",
        "Syntax",
        Severity::High,
        false,
        true,
        "Annotation values nested too deeply",
        "Flatten nested arrays and annotations",
    ),
    // Import errors
    ErrorMetadata::new(
        "E060",
        "Imports",
        Severity::High,
        false,
        true,
        "Parser configured with both imports and fallback namespaces",
        "Use either an import table or fallback namespaces",
    ),
    ErrorMetadata::new(
        "E061",
        "Imports",
        Severity::Medium,
        true,
        false,
        "Trait contributing a member could not be loaded",
        "Register the trait definition with the type registry",
    ),
    // Registry errors
    ErrorMetadata::new(
        "E070",
        "Registry",
        Severity::Medium,
        true,
        false,
        "Class definition file could not be parsed",
        "Fix the TOML definition file",
    ),
    ErrorMetadata::new(
        "E071",
        "Registry",
        Severity::Low,
        true,
        false,
        "Constant value cannot be represented",
        "Use a scalar, array or table constant value",
    ),
    // Semantic errors
    ErrorMetadata::new(
        "E100",
        "Semantic",
        Severity::High,
        false,
        true,
        "Annotation name was never imported",
        "Add a use statement or ignore the annotation name",
    ),
    ErrorMetadata::new(
        "E101",
        "Semantic",
        Severity::High,
        false,
        true,
        "Resolved annotation type cannot be loaded",
        "Register the annotation class or an autoload namespace",
    ),
    ErrorMetadata::new(
        "E102",
        "Semantic",
        Severity::High,
        false,
        true,
        "Class used as annotation is not marked @Annotation",
        "Mark the class with @Annotation or ignore the name",
    ),
    ErrorMetadata::new(
        "E103",
        "Semantic",
        Severity::High,
        false,
        true,
        "Annotation is not allowed on this code element",
        "Move the annotation or widen its @Target",
    ),
    ErrorMetadata::new(
        "E104",
        "Semantic",
        Severity::High,
        false,
        true,
        "Referenced constant is not defined",
        "Define the constant or fix the reference",
    ),
    ErrorMetadata::new(
        "E110",
        "Semantic",
        Severity::Medium,
        false,
        true,
        "Attribute value has the wrong type",
        "Pass a value matching the declared attribute type",
    ),
    ErrorMetadata::new(
        "E111",
        "Semantic",
        Severity::Medium,
        false,
        true,
        "Required attribute is missing",
        "Provide a value for the required attribute",
    ),
    ErrorMetadata::new(
        "E112",
        "Semantic",
        Severity::Medium,
        false,
        true,
        "Attribute value is not an allowed enumerator",
        "Use one of the listed values",
    ),
    ErrorMetadata::new(
        "E120",
        "Semantic",
        Severity::Medium,
        false,
        true,
        "Annotation object could not be created",
        "Check property names and constructor arguments",
    ),
    // Batch errors
    ErrorMetadata::new(
        "E130",
        "Batch",
        Severity::Low,
        true,
        false,
        "No source units found in directory",
        "Point the batch at a directory containing .toml units",
    ),
    ErrorMetadata::new(
        "E131",
        "Batch",
        Severity::Critical,
        false,
        true,
        "Worker thread failed",
        "Re-run sequentially to isolate the failing file",
    ),
    ErrorMetadata::new(
        "E132",
        "Batch",
        Severity::Medium,
        false,
        true,
        "Directory holds more units than one batch allows",
        "Split the directory or raise max_files_per_batch",
    ),
];

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        ERROR_METADATA
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
