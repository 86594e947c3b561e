//! Batch processing of source-unit directories
//!
//! Every discovered unit is registered before any element is read, so
//! annotation classes declared in one file are usable from all the others.
//! Files are then read sequentially or on a fixed set of worker threads.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::BatchPreferences;
use crate::logging::{self, codes};
use crate::pipeline::{self, AnnotationError, PipelineResult};
use crate::reader::AnnotationReader;
use crate::registry::AnnotationRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&BatchPreferences::default())
    }
}

impl BatchConfig {
    pub fn from_preferences(preferences: &BatchPreferences) -> Self {
        let max_threads = if preferences.worker_threads == 0 {
            thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4)
        } else {
            preferences.worker_threads
        };

        Self {
            max_threads: max_threads.clamp(1, MAX_WORKER_THREADS),
            recursive: preferences.recursive,
            max_files: None,
            fail_fast: preferences.fail_fast,
        }
    }
}

/// Registry and reader shared by every file of a batch
#[derive(Clone)]
pub struct Workspace {
    pub registry: Arc<AnnotationRegistry>,
    pub reader: Arc<AnnotationReader>,
}

impl Workspace {
    pub fn new(registry: Arc<AnnotationRegistry>) -> Self {
        let reader = Arc::new(AnnotationReader::new(registry.clone()));
        Self { registry, reader }
    }

    pub fn process_file(&self, file_path: &Path) -> Result<PipelineResult, AnnotationError> {
        pipeline::process_file(&file_path.to_string_lossy(), &self.registry, &self.reader)
    }
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, AnnotationError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    /// Failed elements across every file that could be read
    pub fn element_error_count(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.error_count())
            .sum()
    }

    pub fn annotation_count(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.annotation_count())
            .sum()
    }

    pub fn has_errors(&self) -> bool {
        self.failure_count() > 0 || self.element_error_count() > 0
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: AnnotationError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Restore discovery order after parallel processing
    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} read, {} failed, {} annotations, {} element errors, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.failure_count(),
            self.annotation_count(),
            self.element_error_count(),
            self.processing_duration.as_secs_f64()
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "files": self.successful_files
                .iter()
                .map(|(_, result)| result.to_json())
                .collect::<Vec<_>>(),
            "failed_files": self.failed_files
                .iter()
                .map(|(path, error)| serde_json::json!({
                    "file": path.display().to_string(),
                    "error": error.to_string(),
                    "code": error.error_code().as_str(),
                }))
                .collect::<Vec<_>>(),
            "files_processed": self.files_processed,
            "annotations": self.annotation_count(),
            "element_errors": self.element_error_count(),
            "duration_ms": self.processing_duration.as_secs_f64() * 1000.0,
        })
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No source units found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Thread pool error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> logging::Code {
        match self {
            Self::DirectoryNotFound { .. } => codes::file_processing::INVALID_PATH,
            Self::NoFilesFound { .. } => codes::batch::NO_FILES_FOUND,
            Self::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::ThreadError { .. } => codes::batch::THREAD_FAILURE,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Discover `.toml` source units in a directory, sorted by path
pub fn discover_unit_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let limit = config
        .max_files
        .unwrap_or(MAX_FILES_PER_BATCH)
        .min(MAX_FILES_PER_BATCH);

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config.recursive, limit)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    if files.len() > limit {
        if config.max_files.is_none() {
            return Err(BatchError::TooManyFiles {
                count: files.len(),
                max: MAX_FILES_PER_BATCH,
            });
        }
        crate::log_warning!(
            "Reached maximum file limit",
            "files_found" => files.len(),
            "limit" => limit
        );
    }

    files.sort();
    files.truncate(limit);

    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

/// Collect up to `limit + 1` files so an overflow is observable
fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    recursive: bool,
    limit: usize,
) -> Result<(), BatchError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir_path)
        .map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;
    entries.sort();

    for path in entries {
        if files.len() > limit {
            break;
        }
        if path.is_dir() {
            if recursive {
                visit_directory(&path, files, recursive, limit)?;
            }
        } else if is_unit_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_unit_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Register every unit up front; failures resurface when the file is processed
fn preregister(files: &[PathBuf], workspace: &Workspace) {
    for file in files {
        if let Err(error) = workspace.registry.register_file(file) {
            crate::log_debug!("Deferred registration failure",
                "file" => file.display(),
                "error" => error
            );
        }
    }
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Process a directory of source units one file at a time
pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
    workspace: &Workspace,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch processing",
        "directory" => dir_path.display()
    );

    let files = discover_unit_files(dir_path, config)?;
    preregister(&files, workspace);

    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        let should_continue = logging::with_file_context(file_path.clone(), file_id, || {
            match workspace.process_file(file_path) {
                Ok(result) => {
                    let clean = !result.has_errors();
                    results.add_success(file_path.clone(), result);
                    clean || !config.fail_fast
                }
                Err(error) => {
                    crate::log_error!(
                        error.error_code(),
                        "Source unit processing failed",
                        "file" => file_path.display(),
                        "file_id" => file_id,
                        "error" => error
                    );
                    results.add_failure(file_path.clone(), error);
                    !config.fail_fast
                }
            }
        });

        if !should_continue {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_completed(&results, 1);

    Ok(results)
}

/// Process a directory of source units on worker threads
pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
    workspace: &Workspace,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);

    crate::log_info!("Starting parallel batch processing",
        "directory" => dir_path.display(),
        "max_threads" => threads
    );

    let files = discover_unit_files(dir_path, config)?;
    preregister(&files, workspace);

    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(&files, threads);
    crate::log_debug!("Parallel processing configuration",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    for (chunk_id, chunk) in files.chunks(chunk_size).enumerate() {
        let chunk_results = process_chunk_parallel(chunk, chunk_id * chunk_size, threads, workspace)?;
        results.merge(chunk_results);

        if config.fail_fast && results.has_errors() {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_batch_completed(&results, threads);

    Ok(results)
}

fn process_chunk_parallel(
    files: &[PathBuf],
    first_file_id: usize,
    threads: usize,
    workspace: &Workspace,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let files_per_thread = files.len().div_ceil(threads);

    let mut handles = Vec::new();
    for (thread_id, thread_files) in files.chunks(files_per_thread).enumerate() {
        let thread_files = thread_files.to_vec();
        let results = Arc::clone(&results);
        let workspace = workspace.clone();
        let start_id = first_file_id + thread_id * files_per_thread;

        let handle = thread::spawn(move || {
            for (offset, file_path) in thread_files.into_iter().enumerate() {
                let outcome = logging::with_file_context(file_path.clone(), start_id + offset, || {
                    workspace.process_file(&file_path)
                });

                let mut guard = results.lock().unwrap_or_else(PoisonError::into_inner);
                match outcome {
                    Ok(result) => guard.add_success(file_path, result),
                    Err(error) => {
                        crate::log_error!(
                            error.error_code(),
                            "Source unit processing failed",
                            "file" => file_path.display(),
                            "error" => error
                        );
                        guard.add_failure(file_path, error);
                    }
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().map_err(|_| {
            crate::log_error!(codes::batch::THREAD_FAILURE, "Worker thread panicked");
            BatchError::ThreadError {
                message: "Thread panicked during processing".to_string(),
            }
        })?;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::ThreadError {
        message: "Failed to extract results from worker threads".to_string(),
    })?;
    Ok(results.into_inner().unwrap_or_else(PoisonError::into_inner))
}

fn calculate_chunk_size(files: &[PathBuf], max_threads: usize) -> usize {
    const MAX_FILES_PER_THREAD: usize = 50;
    files.len().clamp(1, max_threads * MAX_FILES_PER_THREAD)
}

fn log_batch_completed(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETED,
        "Batch processing completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "element_errors" => results.element_error_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Process a directory with custom configuration
pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
    workspace: &Workspace,
) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        process_directory_sequential(dir_path, config, workspace)
    } else {
        process_directory_parallel(dir_path, config, workspace)
    }
}

/// Process a directory with default configuration and a fresh registry
pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    let workspace = Workspace::new(Arc::new(AnnotationRegistry::new()));
    process_directory_with_config(dir_path, &BatchConfig::default(), &workspace)
}
