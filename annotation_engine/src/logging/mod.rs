//! Global logging for the annotation engine
//!
//! A process-wide `LoggingService` and `ErrorCollector` sit behind `OnceLock`s.
//! Each worker thread may set a file context; events logged while it is set
//! are tagged with the unit path and recorded in the collector.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());
    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;
    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized")?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    let context = FileProcessingContext::new(file_path, file_id);

    if let Some(collector) = try_get_global_error_collector() {
        collector.record_file_context(&context);
    }

    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the file context set for the current thread
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Attach context pairs and the current file, then log and collect
pub fn log_event_with_context(mut event: LogEvent, context: Vec<(&str, &str)>) {
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    let file_ctx = get_current_file_context();
    if let Some(file_ctx) = &file_ctx {
        if config::preferences().include_file_context {
            event = event.with_context("file", &file_ctx.file_path.display().to_string());
            event = event.with_context("file_id", &file_ctx.file_id.to_string());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let (Some(file_ctx), Some(collector)) = (file_ctx, try_get_global_error_collector()) {
        if event.is_error() || event.is_warning() {
            collector.record_event(&file_ctx.file_path, event);
        }
    }
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(s) = span {
        event = event.with_span(s);
    }
    log_event_with_context(event, context);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    log_event_with_context(LogEvent::success(code, message), context);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    log_event_with_context(LogEvent::info(message), context);
}

// ============================================================================
// BATCH REPORTING
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

pub fn print_cargo_style_summary() {
    if let Some(collector) = try_get_global_error_collector() {
        print!("{}", collector::format_cargo_style_errors(collector));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context_management() {
        let file_path = PathBuf::from("Acme/Entity.toml");

        clear_file_context();
        assert!(get_current_file_context().is_none());

        set_file_context(file_path.clone(), 1);
        assert_eq!(
            get_current_file_context().map(|c| c.file_path),
            Some(file_path)
        );

        clear_file_context();
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context_restores_state() {
        let result = with_file_context(PathBuf::from("a.toml"), 2, || {
            get_current_file_context().map(|c| c.file_id)
        });

        assert_eq!(result, Some(2));
        assert!(get_current_file_context().is_none());
    }
}
