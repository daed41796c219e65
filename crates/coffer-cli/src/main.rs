//! coffer: tar, zip and unzip with path safety checks on every extraction.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let (verbose, quiet) = cli.command.verbosity();
    logging::init(verbose, quiet);

    let formatter = output::create_formatter(cli.json, verbose, quiet);

    let result = match &cli.command {
        cli::Commands::Tar(args) => commands::tar::execute(args, &*formatter, cli.json),
        cli::Commands::Zip(args) => commands::zip::execute(args, &*formatter, cli.json),
        cli::Commands::Unzip(args) => commands::unzip::execute(args, &*formatter, cli.json),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // A failed verification already carries its failures in the JSON report.
            let reported = cli.json && err.downcast_ref::<error::VerificationFailed>().is_some();
            if !reported {
                formatter.format_error(cli.command.operation(), &err);
            }
            ExitCode::FAILURE
        }
    }
}
