//! Diagnostics output of the spatial index.
//!
//! Index code reports through the `spatial_*!` macros, which forward to one
//! process-wide [`Logger`]. The default prints colored lines to stdout; games
//! install their own with [`set_logger`] to route entries into a log file or
//! an in-game console. ERROR entries carry the file and line that raised them.

use colored::*;
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use chrono::{DateTime, Local};

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Sink for index diagnostics.
///
/// # Example
///
/// ```no_run
/// use terra_spatial::terra::log::{Logger, LogEntry};
///
/// struct OverlayLogger;
///
/// impl Logger for OverlayLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Push to the in-game debug overlay...
///     }
/// }
///
/// terra_spatial::terra::log::set_logger(OverlayLogger);
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One diagnostic message.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,

    /// Wall-clock time at which the macro ran
    pub timestamp: SystemTime,

    /// Emitting component, e.g. "terra::SpatialIndex" or "terra::QueryCache"
    pub source: String,

    pub message: String,

    /// Set for ERROR entries only
    pub file: Option<&'static str>,

    /// Set for ERROR entries only
    pub line: Option<u32>,
}

/// Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-operation detail (subdivisions, cache publications)
    Trace,

    /// Cache maintenance and other housekeeping
    Debug,

    /// Lifecycle events (index created, rebuilt)
    Info,

    /// Logical misuse that was recovered from
    Warn,

    /// Hard failures, with file:line details
    Error,
}

impl LogSeverity {
    /// Fixed-width colored tag used by [`DefaultLogger`].
    pub fn label(self) -> ColoredString {
        match self {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        }
    }
}

/// Prints `[time] [LEVEL] [source] message`, followed by ` (file:line)` when
/// the entry has a location.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let local: DateTime<Local> = entry.timestamp.into();
        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        println!(
            "[{}] [{}] [{}] {}{}",
            local.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.severity.label(),
            entry.source.bright_blue(),
            entry.message,
            location
        );
    }
}

/// Wraps another logger and drops entries below `min_severity`.
///
/// ```no_run
/// use terra_spatial::terra::log::{self, DefaultLogger, LogSeverity, SeverityFilter};
///
/// log::set_logger(SeverityFilter::new(LogSeverity::Info, DefaultLogger));
/// ```
pub struct SeverityFilter<L> {
    min_severity: LogSeverity,
    inner: L,
}

impl<L: Logger> SeverityFilter<L> {
    pub fn new(min_severity: LogSeverity, inner: L) -> Self {
        Self { min_severity, inner }
    }
}

impl<L: Logger> Logger for SeverityFilter<L> {
    fn log(&self, entry: &LogEntry) {
        if entry.severity >= self.min_severity {
            self.inner.log(entry);
        }
    }
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Replace the global logger.
pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
    if let Ok(mut lock) = logger().write() {
        *lock = Box::new(logger_impl);
    }
}

/// Restore the DefaultLogger.
pub fn reset_logger() {
    if let Ok(mut lock) = logger().write() {
        *lock = Box::new(DefaultLogger);
    }
}

/// Send an entry without location to the global logger.
///
/// Target of `spatial_trace!` through `spatial_warn!`.
pub fn emit(severity: LogSeverity, source: &str, message: String) {
    dispatch(severity, source, message, None);
}

/// Send an entry tagged with `file:line` to the global logger.
///
/// Target of `spatial_error!`.
pub fn emit_detailed(
    severity: LogSeverity,
    source: &str,
    message: String,
    file: &'static str,
    line: u32,
) {
    dispatch(severity, source, message, Some((file, line)));
}

fn dispatch(severity: LogSeverity, source: &str, message: String, location: Option<(&'static str, u32)>) {
    let Ok(active) = logger().read() else {
        return;
    };
    active.log(&LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: source.to_string(),
        message,
        file: location.map(|(file, _)| file),
        line: location.map(|(_, line)| line),
    });
}

// ===== LOGGING MACROS =====

/// TRACE entry, for per-operation detail.
///
/// ```ignore
/// spatial_trace!("terra::Octree", "Subdivided node at depth {}", depth);
/// ```
#[macro_export]
macro_rules! spatial_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit($crate::log::LogSeverity::Trace, $source, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! spatial_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit($crate::log::LogSeverity::Debug, $source, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! spatial_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit($crate::log::LogSeverity::Info, $source, format!($($arg)*))
    };
}

/// WARN entry, for misuse the index recovered from.
///
/// ```ignore
/// spatial_warn!("terra::SpatialIndex", "Attempted to remove untracked {}", entity);
/// ```
#[macro_export]
macro_rules! spatial_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit($crate::log::LogSeverity::Warn, $source, format!($($arg)*))
    };
}

/// ERROR entry; records the caller's file and line.
#[macro_export]
macro_rules! spatial_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::emit_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!(),
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
