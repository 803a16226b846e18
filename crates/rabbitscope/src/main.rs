mod cli;
mod commands;
mod error;

use std::ffi::OsStr;
use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The TUI owns stdout; its logs go to a file instead. The guard must
    // live until exit so buffered log lines are flushed.
    let _log_guard = match &cli.command {
        Command::Tui(args) => Some(init_file_tracing(&args.log_file, cli.global.verbose)),
        Command::Generate(_) => {
            init_stdout_tracing(cli.global.verbose);
            None
        }
    };

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Generate(args) => commands::generate::run(args, &cli.global).await,
        Command::Tui(args) => commands::tui::run(args, &cli.global).await,
    }
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)))
}

fn init_stdout_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_target(false)
        .init();
}

fn init_file_tracing(log_file: &Path, verbosity: u8) -> WorkerGuard {
    let log_dir = log_file.parent().unwrap_or(Path::new("."));
    let log_filename = log_file
        .file_name()
        .unwrap_or(OsStr::new("rabbitscope.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    guard
}
