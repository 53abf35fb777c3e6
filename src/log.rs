//! File-based debug logging
//!
//! Log lines are written to `~/.ssh-pick/logs/sshp.log` with timestamps and
//! log levels. Logging is off by default and enabled with the `-d` flag;
//! while disabled every log call is a no-op that never touches the file.
//! The log directory and file are created with owner-only permissions.

use chrono::Local;
use once_cell::sync::Lazy;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

#[cfg(unix)]
const PRIVATE_LOG_DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const PRIVATE_LOG_FILE_MODE: u32 = 0o600;

/// Global logger instance used by the logging macros.
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

// Flag for enabling debug logging
static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

pub fn enable_debug_mode() {
    DEBUG_MODE.store(true, Ordering::SeqCst);
}

#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Logging-related error types
#[derive(Debug)]
pub enum LogError {
    /// I/O error when writing to the log file
    IoError(io::Error),
    /// Failed to create the log directory
    DirectoryCreationError(String),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(err) => write!(f, "I/O error: {}", err),
            LogError::DirectoryCreationError(msg) => {
                write!(f, "Failed to create directory: {}", msg)
            }
        }
    }
}

impl std::error::Error for LogError {}

impl From<io::Error> for LogError {
    fn from(err: io::Error) -> Self {
        LogError::IoError(err)
    }
}

/// Logger that writes formatted entries to the debug log file.
///
/// The sink is opened lazily on the first enabled log call so plain runs
/// never create the log directory.
pub struct Logger {
    sink: Mutex<Option<BufWriter<File>>>,
}

impl Logger {
    fn new() -> Self {
        Self {
            sink: Mutex::new(None),
        }
    }

    pub fn is_debug_enabled(&self) -> bool {
        DEBUG_MODE.load(Ordering::SeqCst)
    }

    pub fn log_debug(&self, message: &str) -> Result<(), LogError> {
        self.log(LogLevel::Debug, message)
    }

    pub fn log_info(&self, message: &str) -> Result<(), LogError> {
        self.log(LogLevel::Info, message)
    }

    pub fn log_warn(&self, message: &str) -> Result<(), LogError> {
        self.log(LogLevel::Warning, message)
    }

    pub fn log_error(&self, message: &str) -> Result<(), LogError> {
        self.log(LogLevel::Error, message)
    }

    fn log(&self, level: LogLevel, message: &str) -> Result<(), LogError> {
        if !self.is_debug_enabled() {
            return Ok(());
        }

        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if sink.is_none() {
            *sink = Some(BufWriter::new(create_log_file()?));
        }
        if let Some(writer) = sink.as_mut() {
            writeln!(writer, "{}", format_entry(level, message))?;
            writer.flush()?;
        }
        Ok(())
    }
}

fn format_entry(level: LogLevel, message: &str) -> String {
    format!(
        "{} [{}] {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        level.as_str(),
        message
    )
}

fn create_log_file() -> Result<File, LogError> {
    let log_dir = dirs::home_dir()
        .ok_or_else(|| LogError::DirectoryCreationError("Home directory not found".to_string()))?
        .join(".ssh-pick")
        .join("logs");
    create_private_directory(&log_dir)?;
    open_private_append_file(&log_dir.join("sshp.log"))
}

fn create_private_directory(path: &Path) -> Result<(), LogError> {
    fs::create_dir_all(path)?;
    set_private_directory_permissions(path)
}

fn open_private_append_file(path: &Path) -> Result<File, LogError> {
    let mut options = OpenOptions::new();
    options
        .create(true) // Create if missing.
        .append(true); // Preserve existing logs.
    #[cfg(unix)]
    {
        options.mode(PRIVATE_LOG_FILE_MODE);
    }
    let file = options.open(path)?;
    Ok(file)
}

#[cfg(unix)]
fn set_private_directory_permissions(path: &Path) -> Result<(), LogError> {
    fs::set_permissions(path, fs::Permissions::from_mode(PRIVATE_LOG_DIR_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_private_directory_permissions(_path: &Path) -> Result<(), LogError> {
    Ok(())
}

/// Log a debug message (only when debug mode is enabled)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        let _ = $crate::log::LOGGER.log_debug(&format!($($arg)*));
    }};
}

/// Log an informational message (only when debug mode is enabled)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let _ = $crate::log::LOGGER.log_info(&format!($($arg)*));
    }};
}

/// Log a warning message (only when debug mode is enabled)
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        let _ = $crate::log::LOGGER.log_warn(&format!($($arg)*));
    }};
}

/// Log an error message (only when debug mode is enabled)
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        let _ = $crate::log::LOGGER.log_error(&format!($($arg)*));
    }};
}

#[cfg(test)]
#[path = "test/log.rs"]
mod tests;
