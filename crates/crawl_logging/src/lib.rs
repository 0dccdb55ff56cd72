#![deny(missing_docs)]
//! Shared logging utilities for the crawler workspace.
//!
//! This crate provides the `crawl_*` logging macros used by the engine and the
//! command-line front end, plus a terminal initializer for tests.

/// Target used by every `crawl_*` macro so crawler output can be filtered
/// separately from dependency logs.
pub const LOG_TARGET: &str = "crawler";

/// Logs a trace-level message under the crawler target.
#[macro_export]
macro_rules! crawl_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the crawler target.
#[macro_export]
macro_rules! crawl_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the crawler target.
#[macro_export]
macro_rules! crawl_info {
    ($($arg:tt)*) => {{
        log::info!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the crawler target.
#[macro_export]
macro_rules! crawl_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the crawler target.
#[macro_export]
macro_rules! crawl_error {
    ($($arg:tt)*) => {{
        log::error!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Maps a `-v` repeat count onto a level filter.
///
/// Zero keeps the default `Info`; one enables `Debug`; anything above is `Trace`.
pub fn level_for_verbosity(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
