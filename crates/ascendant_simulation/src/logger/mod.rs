//! Process-wide logger
//!
//! The simulation core never prints directly: it goes through a pluggable
//! [`LogPrinter`] so the headless binary, the client and tests can route
//! output wherever they want. Messages below the configured [`LogLevel`]
//! are dropped before formatting.

use once_cell::sync::Lazy;
use std::sync::Mutex;

static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

static MIN_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

/// Severity, ordered from chattiest to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Stdout printer used by both binaries
pub struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    if let Ok(mut slot) = LOGGER.lock() {
        *slot = Some(logger);
    }
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    if let Ok(mut slot) = LOGGER.lock() {
        slot.get_or_insert(logger);
    }
}

pub fn set_log_level(level: LogLevel) {
    if let Ok(mut current) = MIN_LEVEL.lock() {
        *current = level;
    }
}

pub fn log_level() -> LogLevel {
    MIN_LEVEL.lock().map(|level| *level).unwrap_or(LogLevel::Debug)
}

/// Installs [`ConsoleLogger`] unless a printer is already set.
pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    if level < log_level() {
        return;
    }

    // A poisoned slot drops the message
    let Ok(slot) = LOGGER.lock() else {
        return;
    };
    if let Some(printer) = slot.as_ref() {
        printer.log(level, &stamp(message));
    }
}

fn stamp(message: &str) -> String {
    format!("[{}] {}", chrono::Local::now().format("%H:%M:%S%.3f"), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_order_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::Error.max(LogLevel::Info), LogLevel::Error);
    }

    #[test]
    fn test_stamp_prefixes_time() {
        let line = stamp("level loaded");
        assert!(line.starts_with('['));
        assert!(line.ends_with("] level loaded"));
        assert_eq!(LogLevel::Warning.as_str(), "WARNING");
    }
}
