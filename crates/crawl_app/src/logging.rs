//! Logger initialization for the command-line front end.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Destination for log output.
#[derive(Debug, Clone)]
pub enum LogDestination {
    /// Write to the terminal only.
    Terminal,
    /// Write to the terminal and to the given file.
    Both(PathBuf),
}

/// Initialize the global logger. Falls back to terminal-only if the file cannot be created.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let LogDestination::Both(path) = destination {
        if let Some(file_logger) = create_file_logger(level, config, &path) {
            loggers.push(file_logger);
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    let mut builder = ConfigBuilder::new();
    builder
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        // Keep connection-pool chatter out of -vv output.
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("rustls");
    builder.build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
