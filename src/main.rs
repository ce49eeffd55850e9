mod cli;
mod execute;

use std::process::ExitCode;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use crate::cli::CLI;

/// Logs go to stderr so listing output on stdout stays clean.
///
/// `RUST_LOG` wins when set. Otherwise listing flags and `-q` only show
/// errors, `-v` shows debug output, and the default is info.
fn init_tracing(cli: &CLI) {
    let level = if cli.quiet || cli.is_listing() {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reqs={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = CLI::parse();
    init_tracing(&cli);
    tracing::debug!("reqs starting with args: {:?}", cli);

    match execute::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
