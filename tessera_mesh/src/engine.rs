/// Tessera Engine - process-wide logger and configuration
///
/// The mesh core is single-threaded per device, but logging and
/// configuration are global so that every `Mesh` sees the same settings.
/// Both slots are lazily initialized with their defaults and guarded by
/// `RwLock`.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Global configuration (initialized with Config::default())
static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

fn config_slot() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

// ===== CONFIG =====

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Scan mesh data for problems that are not memory-safety issues
    /// (index ranges pointing past the vertex buffer, non-finite tangents)
    pub enable_validation: bool,
    /// Entries below this severity are dropped before reaching the logger
    pub min_log_severity: LogSeverity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            min_log_severity: LogSeverity::Info,
        }
    }
}

// ===== PUBLIC API =====

/// Static facade over the global logger and configuration
pub struct Engine;

impl Engine {
    // ===== CONFIG API =====

    /// Replace the global configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tessera_mesh::tessera::{Config, Engine};
    ///
    /// Engine::set_config(Config { enable_validation: true, ..Config::default() });
    /// ```
    pub fn set_config(config: Config) {
        if let Ok(mut lock) = config_slot().write() {
            *lock = config;
        }
    }

    /// Current global configuration
    pub fn config() -> Config {
        config_slot()
            .read()
            .map(|lock| *lock)
            .unwrap_or_default()
    }

    /// Restore `Config::default()`
    pub fn reset_config() {
        Self::set_config(Config::default());
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tessera_mesh::tessera::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_slot().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to DefaultLogger
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_slot().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by the engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        if severity < Self::config().min_log_severity {
            return;
        }
        if let Ok(lock) = logger_slot().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file,
                line,
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
