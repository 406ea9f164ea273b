use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter, Layer, Registry};
use typebridge_module::{
    logging::{LOG_ENV, LOG_STYLE_ENV},
    MODULE_ROOT_ENV,
};

mod log;

use self::log::{LogLevel, LogStyle};

#[derive(Debug, Parser)]
#[command(name = "typebridge", version)]
#[command(arg_required_else_help = true)]
/// Bridges native Rust types and the schema of a typebridge engine
pub(crate) struct Args {
    /// Directory holding typebridge.toml
    #[arg(long, short = 'C', global = true, env = MODULE_ROOT_ENV, default_value = ".")]
    pub root: PathBuf,
    /// Set the logging level. TYPEBRIDGE_LOG filter directives are used when omitted
    #[arg(long = "log", global = true)]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, global = true, env = LOG_STYLE_ENV, default_value_t = LogStyle::Text)]
    log_style: LogStyle,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Generate the Rust client of the engine schema
    Codegen(CodegenCommand),
    /// Scan the module sources and print the types they expose
    Scan(ScanCommand),
    /// Fetch the engine schema through introspection
    Introspect(IntrospectCommand),
}

#[derive(Debug, clap::Args)]
pub(crate) struct CodegenCommand {
    /// Saved introspection response to generate from. Defaults to `[module].introspection`,
    /// then to querying the current session
    #[arg(long, short)]
    pub schema: Option<PathBuf>,
    /// Output directory, overrides `[codegen].output_dir`
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Leave the generated files unformatted
    #[arg(long)]
    pub no_format: bool,
}

#[derive(Debug, clap::Args)]
pub(crate) struct ScanCommand {
    /// Print the whole type model as JSON
    #[arg(long)]
    pub json: bool,
    /// Write the JSON type model to this file instead of stdout
    #[arg(long, short, requires = "json")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct IntrospectCommand {
    /// Write the introspection response to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Installs the subscriber. Logs go to stderr, stdout carries the command output.
    pub(crate) fn init_logging(&self) -> anyhow::Result<()> {
        let filter = match self.log_level {
            Some(level) => level.filter(),
            None => EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var(LOG_ENV)
                .from_env_lossy(),
        };

        let layer = fmt::layer().with_writer(std::io::stderr);
        let layer: Box<dyn Layer<Registry> + Send + Sync> = match self.log_style {
            LogStyle::Text => layer.boxed(),
            LogStyle::Json => layer.json().boxed(),
        };

        tracing_subscriber::registry().with(layer).with(filter).try_init()?;

        Ok(())
    }
}
