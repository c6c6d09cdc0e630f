use std::sync::atomic::{AtomicU8, Ordering};

use crate::bindings::{jsLog, LogLevel};

static MAX_LOG_LEVEL: AtomicU8 = AtomicU8::new(3);

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum LoggerLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

#[inline(always)]
fn is_enabled(level: LoggerLevel) -> bool {
    MAX_LOG_LEVEL.load(Ordering::Relaxed) >= level as u8
}

/// Façade over the `jsLog` binding, gated by a global maximum level so that
/// messages filtered out never cross the WebAssembly boundary.
pub struct Logger {}

impl Logger {
    pub fn set_logger_level(new_level: LoggerLevel) {
        MAX_LOG_LEVEL.store(new_level as u8, Ordering::Relaxed);
    }

    pub fn error(text: &str) {
        if is_enabled(LoggerLevel::Error) {
            jsLog(LogLevel::Error, text);
        }
    }

    pub fn warn(text: &str) {
        if is_enabled(LoggerLevel::Warn) {
            jsLog(LogLevel::Warn, text);
        }
    }

    pub fn info(text: &str) {
        if is_enabled(LoggerLevel::Info) {
            jsLog(LogLevel::Info, text);
        }
    }

    pub fn debug(text: &str) {
        if is_enabled(LoggerLevel::Debug) {
            jsLog(LogLevel::Debug, text);
        }
    }

    pub fn lazy_error(func: &dyn Fn() -> String) {
        if is_enabled(LoggerLevel::Error) {
            jsLog(LogLevel::Error, &func());
        }
    }

    pub fn lazy_warn(func: &dyn Fn() -> String) {
        if is_enabled(LoggerLevel::Warn) {
            jsLog(LogLevel::Warn, &func());
        }
    }

    pub fn lazy_info(func: &dyn Fn() -> String) {
        if is_enabled(LoggerLevel::Info) {
            jsLog(LogLevel::Info, &func());
        }
    }

    pub fn lazy_debug(func: &dyn Fn() -> String) {
        if is_enabled(LoggerLevel::Debug) {
            jsLog(LogLevel::Debug, &func());
        }
    }
}
