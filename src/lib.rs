//! dupesweep - content-based duplicate file finder
//!
//! Walks a directory tree, fingerprints every regular file at or above a
//! size threshold with BLAKE3, groups files with equal fingerprints, and
//! reports each group with the first file in traversal order marked as the
//! one to keep. Optionally deletes the rest after confirmation.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Result;

use crate::app::{Pipeline, RunOptions};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::ExitCode;
use crate::signal::ShutdownHandler;

/// Run the binary against the real terminal streams.
///
/// Installs logging and the Ctrl+C handler, then runs the pipeline.
///
/// # Errors
///
/// Returns an error for an invalid root, an interrupted scan, a bad
/// configuration, or a failure writing the report.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let shutdown = signal::install_handler()?;

    let color = !cli.no_color && io::stdout().is_terminal();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let mut err = io::stderr();

    run_with(cli, shutdown, color, &mut input, &mut out, &mut err)
}

/// Run the pipeline against caller-supplied streams, without colors.
///
/// # Errors
///
/// Same as [`run_app`].
pub fn run_app_with_io(
    cli: Cli,
    shutdown: ShutdownHandler,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitCode> {
    run_with(cli, shutdown, false, input, out, err)
}

fn run_with(
    cli: Cli,
    shutdown: ShutdownHandler,
    color: bool,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitCode> {
    let config = Config::resolve(&cli)?;
    let options = RunOptions::from_cli(&cli).with_color(color);
    Pipeline::new(options, config, shutdown).run(input, out, err)
}
