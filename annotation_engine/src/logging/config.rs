//! Logging configuration: compile-time buffer limits plus runtime preferences

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; only the first call wins
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

/// Active preferences; the environment defaults unless installed first
pub fn preferences() -> &'static LoggingPreferences {
    RUNTIME_PREFERENCES.get_or_init(LoggingPreferences::default)
}

pub fn min_log_level() -> EventsLogLevel {
    preferences().min_log_level.to_events_log_level()
}

/// Sanity-check the generated limits
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE == 0 {
        return Err("Log buffer size must be positive".to_string());
    }

    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err("Max log events per file exceeds total buffer size".to_string());
    }

    if MAX_ERROR_COLLECTION > LOG_BUFFER_SIZE {
        return Err("Max collected errors exceeds total buffer size".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_preferences_are_installed_once() {
        let first = preferences() as *const LoggingPreferences;
        assert!(init_runtime_preferences(LoggingPreferences::default()).is_err());
        assert_eq!(first, preferences() as *const LoggingPreferences);
    }
}
