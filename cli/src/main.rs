#![forbid(unsafe_code)]

mod args;
mod codegen;
mod config;
mod introspect;
mod scan;

use std::process::ExitCode;

use args::{Args, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match try_main(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main(args: Args) -> anyhow::Result<()> {
    args.init_logging()?;

    match args.command {
        Command::Codegen(command) => codegen::codegen(&args.root, command).await,
        Command::Scan(command) => scan::scan(&args.root, command).await,
        Command::Introspect(command) => introspect::introspect(command).await,
    }
}
