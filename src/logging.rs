//! Severity-tagged progress and diagnostic logging.
//!
//! A process-global level filters messages; everything at or above the
//! level is printed to stderr with a colored severity header.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use colored::Colorize;

/// Message severities, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Verbose = 1,
    Status = 2,
    Notice = 3,
    Warning = 4,
    Error = 5,
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Status as u8);

impl LogLevel {
    pub fn from_str(s: &str) -> Option<LogLevel> {
        match s {
            "debug" => Some(LogLevel::Debug),
            "verbose" => Some(LogLevel::Verbose),
            "status" => Some(LogLevel::Status),
            "notice" => Some(LogLevel::Notice),
            "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "verbose",
            LogLevel::Status => "status",
            LogLevel::Notice => "notice",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }

    fn from_u8(v: u8) -> LogLevel {
        match v {
            0 => LogLevel::Debug,
            1 => LogLevel::Verbose,
            2 => LogLevel::Status,
            3 => LogLevel::Notice,
            4 => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }
}

pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_log_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Print a message if `level` passes the global filter.
pub fn log(level: LogLevel, args: fmt::Arguments) {
    if level < get_log_level() {
        return;
    }

    let header = match level {
        LogLevel::Debug => "debug".dimmed(),
        LogLevel::Verbose => "verbose".normal(),
        LogLevel::Status => "status".green(),
        LogLevel::Notice => "notice".cyan(),
        LogLevel::Warning => "warning".yellow(),
        LogLevel::Error => "error".red(),
    };
    eprintln!("[{}] {}", header, args);
}

/// Log a formatted message at the given severity.
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)*) => {
        $crate::logging::log($level, format_args!($($arg)*))
    };
}
