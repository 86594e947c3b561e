// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether to collect token metrics while lexing
    pub collect_metrics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_metrics: env::var(env_vars::LEXICAL_COLLECT_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserPreferences {
    /// Whether to emit a debug event for every annotation skipped through the ignore set
    pub log_ignored_annotations: bool,

    /// Whether to emit a debug event on metadata cache misses
    pub log_metadata_collection: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            log_ignored_annotations: env::var(env_vars::PARSER_LOG_IGNORED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_metadata_collection: env::var(env_vars::PARSER_LOG_METADATA)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

/// Parser preferences read once per process
pub fn parser_preferences() -> &'static ParserPreferences {
    static PREFERENCES: OnceLock<ParserPreferences> = OnceLock::new();
    PREFERENCES.get_or_init(ParserPreferences::default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPreferences {
    /// Worker threads used when the caller does not choose (0 = auto)
    pub worker_threads: usize,

    /// Whether to stop at the first file containing a failed element
    pub fail_fast: bool,

    /// Whether to descend into subdirectories
    pub recursive: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            worker_threads: env::var(env_vars::BATCH_THREADS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            fail_fast: env::var(env_vars::BATCH_FAIL_FAST)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            recursive: env::var(env_vars::BATCH_RECURSIVE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Write events to the console at all
    pub enable_console_logging: bool,

    /// Most verbose level that is still emitted
    pub min_log_level: LogLevel,

    /// Attach the current file and element to every event
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOG_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOG_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOG_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_file_context: env::var(env_vars::LOG_FILE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Aggregate of every runtime preference group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub parser: ParserPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variables read by the preference defaults
pub mod env_vars {
    pub const LEXICAL_COLLECT_METRICS: &str = "ANNOTATION_LEXICAL_METRICS";

    pub const PARSER_LOG_IGNORED: &str = "ANNOTATION_LOG_IGNORED";
    pub const PARSER_LOG_METADATA: &str = "ANNOTATION_LOG_METADATA";

    pub const BATCH_THREADS: &str = "ANNOTATION_BATCH_THREADS";
    pub const BATCH_FAIL_FAST: &str = "ANNOTATION_BATCH_FAIL_FAST";
    pub const BATCH_RECURSIVE: &str = "ANNOTATION_BATCH_RECURSIVE";

    pub const LOG_STRUCTURED: &str = "ANNOTATION_LOG_STRUCTURED";
    pub const LOG_CONSOLE: &str = "ANNOTATION_LOG_CONSOLE";
    pub const LOG_LEVEL: &str = "ANNOTATION_LOG_LEVEL";
    pub const LOG_FILE_CONTEXT: &str = "ANNOTATION_LOG_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_runtime_config_serializes() {
        let config = RuntimeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("min_log_level"));
        assert!(json.contains("worker_threads"));
    }
}
