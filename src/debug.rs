//! Category-based debug logging for par-workspace
//!
//! Controlled by DEBUG_LEVEL environment variable:
//! - 0 or unset: No debugging
//! - 1: Errors only
//! - 2: Info level (pane lifecycle, splits, restores)
//! - 3: Debug level (item activation, event dispatch)
//! - 4: Trace level (every operation, detailed info)
//!
//! Output goes to `par_workspace_debug.log` in the system temp directory so
//! the host application's stdout/stderr are left alone.

use parking_lot::Mutex;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Self {
        match std::env::var("DEBUG_LEVEL") {
            Ok(val) => Self::parse(&val),
            Err(_) => DebugLevel::Off,
        }
    }

    fn parse(val: &str) -> Self {
        match val.trim().parse::<u8>() {
            Ok(1) => DebugLevel::Error,
            Ok(2) => DebugLevel::Info,
            Ok(3) => DebugLevel::Debug,
            Ok(4) => DebugLevel::Trace,
            _ => DebugLevel::Off,
        }
    }
}

/// Global debug logger
struct DebugLogger {
    level: DebugLevel,
    file: Option<std::fs::File>,
}

impl DebugLogger {
    fn new() -> Self {
        let level = DebugLevel::from_env();
        if level == DebugLevel::Off {
            return DebugLogger { level, file: None };
        }

        let log_path = std::env::temp_dir().join("par_workspace_debug.log");
        match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&log_path)
        {
            Ok(f) => {
                let mut logger = DebugLogger {
                    level,
                    file: Some(f),
                };
                logger.write_raw(&format!(
                    "\n{}\npar-workspace debug session started at {} (level={:?})\n{}\n",
                    "=".repeat(80),
                    get_timestamp(),
                    level,
                    "=".repeat(80)
                ));
                logger
            }
            // Silently fall back to no file output
            Err(_) => DebugLogger { level, file: None },
        }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn log(&mut self, level: DebugLevel, category: &str, msg: &str) {
        if level <= self.level {
            let level_str = match level {
                DebugLevel::Error => "ERROR",
                DebugLevel::Info => "INFO ",
                DebugLevel::Debug => "DEBUG",
                DebugLevel::Trace => "TRACE",
                DebugLevel::Off => return,
            };
            self.write_raw(&format!(
                "[{}] [{}] [{}] {}\n",
                get_timestamp(),
                level_str,
                category,
                msg
            ));
        }
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| Mutex::new(DebugLogger::new()))
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    let logger = get_logger().lock();
    level <= logger.level
}

/// Log a message at specified level
pub fn log(level: DebugLevel, category: &str, msg: &str) {
    let mut logger = get_logger().lock();
    logger.log(level, category, msg);
}

/// Log formatted message
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if is_enabled(level) {
        log(level, category, &format!("{}", args));
    }
}

/// Log at an explicit level; the per-level macros below expand to this.
#[macro_export]
macro_rules! debug_at {
    ($level:ident, $category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::$level, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => { $crate::debug_at!(Error, $category, $($arg)*) };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => { $crate::debug_at!(Info, $category, $($arg)*) };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => { $crate::debug_at!(Debug, $category, $($arg)*) };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => { $crate::debug_at!(Trace, $category, $($arg)*) };
}
