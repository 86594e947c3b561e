//! Per-unit event collection for batch runs
//!
//! Events logged while a source unit is being processed are grouped under that
//! unit's path so the CLI can print one report block per unit.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The unit currently being processed on this thread
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self { file_path, file_id }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

/// Thread-safe event store keyed by source unit
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Make sure a unit shows up in the summary even if it logs nothing
    pub fn record_file_context(&self, context: &FileProcessingContext) {
        self.lock().entry(context.file_path.clone()).or_default();
    }

    /// Record an event; past the per-file limit a single overflow warning is kept
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.lock();
        let total: usize = events.values().map(Vec::len).sum();
        if total >= LOG_BUFFER_SIZE {
            return;
        }
        if event.is_error() {
            let errors = events.values().flatten().filter(|e| e.is_error()).count();
            if errors >= MAX_ERROR_COLLECTION {
                return;
            }
        }

        let file_events = events.entry(file_path.to_path_buf()).or_default();
        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.lock().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.lock();

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            ..Default::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            } else {
                summary.successful_files += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Render collected errors and warnings grouped by unit, in compiler style
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let notable: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if notable.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));
        for event in notable {
            let kind = if event.is_error() { "error" } else { "warning" };
            output.push_str(&format!(
                "{}[{}]: {}\n",
                kind,
                event.code.as_str(),
                event.message
            ));

            for (key, value) in &event.context {
                if key != "file" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }

            if event.is_error() {
                output.push_str(&format!("  = help: {}\n", event.recommended_action()));
            }
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}
