// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    metadata: MetadataLimits,
    registry: RegistryLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_docblock_size: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_nesting_depth: usize,
    max_annotations_per_docblock: usize,
}

#[derive(serde::Deserialize)]
struct MetadataLimits {
    max_cached_descriptors: usize,
}

#[derive(serde::Deserialize)]
struct RegistryLimits {
    max_definition_file_size: u64,
    max_negative_cache_entries: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_files_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ANNOTATION_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ANNOTATION_CONFIG_DIR");

    let profile =
        env::var("ANNOTATION_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ANNOTATION_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of annotation_engine directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_DOCBLOCK_SIZE: usize = 16 * 1024 * 1024;
    const ABSOLUTE_MAX_NESTING_DEPTH: usize = 1024;
    const ABSOLUTE_MAX_DEFINITION_FILE_SIZE: u64 = 100 * 1024 * 1024;

    if config.lexical.max_docblock_size > ABSOLUTE_MAX_DOCBLOCK_SIZE {
        panic!("LIMITS: max_docblock_size exceeds absolute maximum");
    }

    if config.syntax.max_nesting_depth == 0
        || config.syntax.max_nesting_depth > ABSOLUTE_MAX_NESTING_DEPTH
    {
        panic!("LIMITS: max_nesting_depth must be between 1 and {ABSOLUTE_MAX_NESTING_DEPTH}");
    }

    if config.registry.max_definition_file_size > ABSOLUTE_MAX_DEFINITION_FILE_SIZE {
        panic!("LIMITS: max_definition_file_size exceeds absolute maximum");
    }

    if config.batch_processing.max_worker_threads == 0 {
        panic!("LIMITS: max_worker_threads must be at least 1");
    }

    if config.logging.max_log_events_per_file > config.logging.log_buffer_size {
        panic!("LIMITS: max_log_events_per_file exceeds log_buffer_size");
    }

    if profile == "production" && config.syntax.max_nesting_depth > 256 {
        panic!("PRODUCTION: max_nesting_depth too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_DOCBLOCK_SIZE: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_NESTING_DEPTH: usize = {};
        pub const MAX_ANNOTATIONS_PER_DOCBLOCK: usize = {};
    }}

    pub mod metadata {{
        pub const MAX_CACHED_DESCRIPTORS: usize = {};
    }}

    pub mod registry {{
        pub const MAX_DEFINITION_FILE_SIZE: u64 = {};
        pub const MAX_NEGATIVE_CACHE_ENTRIES: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_FILES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
    }}
}}
"#,
        profile,
        config.lexical.max_docblock_size,
        config.syntax.max_nesting_depth,
        config.syntax.max_annotations_per_docblock,
        config.metadata.max_cached_descriptors,
        config.registry.max_definition_file_size,
        config.registry.max_negative_cache_entries,
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_files_per_batch,
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_events_per_file,
    );

    fs::write(output_path, constants_code).unwrap();
}
