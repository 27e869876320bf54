//! CLI entry point for the percolate analyses.
//!
//! Parses command-line arguments with clap, runs the selected command, prints
//! its table to stdout and maps errors and recorded trial failures to exit
//! codes. Logging is initialised first so every later step can emit
//! structured diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use percolate_cli::{
    cli::{Cli, CliError, Command, TableFormat, render_outcome, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field, warn};

/// Exit code when the command ran but some trials failed.
const TRIALS_FAILED: u8 = 2;

/// Parses arguments, runs the command, renders its table and flushes stdout.
/// Returns the number of recorded trial failures.
fn try_main() -> Result<usize> {
    let cli = Cli::parse();
    let format = match &cli.command {
        Command::Sweep(command) => command.output.format,
        Command::Empirical(command) => command.output.format,
    };
    let outcome = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_outcome(&outcome, format, &mut writer).context("failed to render results")?;
    writer.flush().context("failed to flush output")?;
    Ok(outcome.failure_count())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match try_main() {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            warn!(failed, "some trials failed; see the table for details");
            ExitCode::from(TRIALS_FAILED)
        }
        Err(err) => {
            let code = err
                .downcast_ref::<CliError>()
                .map(|cli_error| field::display(cli_error.code()));
            error!(error = %format!("{err:#}"), code, "command execution failed");
            ExitCode::FAILURE
        }
    }
}

fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_text() {
        let cli = Cli::parse_from(["percolate", "empirical", "roads.csv"]);
        let Command::Empirical(command) = cli.command else {
            panic!("empirical command");
        };
        assert_eq!(command.output.format, TableFormat::Text);
    }
}
