use std::fmt;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Verbosity picked with `--log`. Levels up to debug only apply to typebridge crates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Completely disables logging
    Off,
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Progress of the command
    Info,
    /// Every scanned declaration, registered type and generated file
    Debug,
    /// Everything, rendered queries and dependencies included
    Trace,
}

impl LogLevel {
    pub(crate) fn filter(self) -> EnvFilter {
        let directives = match self {
            LogLevel::Off => "off",
            LogLevel::Error => "typebridge=error,off",
            LogLevel::Warn => "typebridge=warn,off",
            LogLevel::Info => "typebridge=info,off",
            LogLevel::Debug => "typebridge=debug,off",
            LogLevel::Trace => "trace",
        };

        EnvFilter::new(directives)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogStyle {
    /// Standard text
    Text,
    /// JSON objects
    Json,
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}
