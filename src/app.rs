//! The scan → report → (confirm → delete) pipeline behind the binary.
//!
//! [`Pipeline`] walks through [`PipelineState`]s in a fixed order:
//!
//! ```text
//! Idle → Scanning → Indexed → Reported ─┬─────────────────────────────→ Done
//!                                       └→ Confirming ─┬→ Deleting → Done
//!                                                      └──────────────→ Done
//! ```
//!
//! `Confirming` is only entered when deletion was requested and duplicates
//! exist. A declined confirmation goes straight to `Done`.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::actions::confirm::{confirm, DELETE_PROMPT};
use crate::actions::delete::{delete_duplicates, DeleteConfig, DeleteMode};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, ScanResult};
use crate::error::ExitCode;
use crate::output::text::{write_deletion_report, write_prompt_separator};
use crate::output::{JsonOutput, TextReport};
use crate::progress::Progress;
use crate::signal::ShutdownHandler;

/// Errors raised by the pipeline after the scan has finished.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Shutdown was requested at the prompt or during deletion.
    #[error("Interrupted by user before deletion finished")]
    Interrupted,
}

/// Where the pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Nothing has started
    Idle,
    /// Walking and hashing
    Scanning,
    /// The duplicate index is complete
    Indexed,
    /// The report has been written
    Reported,
    /// Waiting for the user to confirm deletion
    Confirming,
    /// Removing duplicates
    Deleting,
    /// Finished
    Done,
}

impl PipelineState {
    /// Whether `next` may follow `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use PipelineState::{Confirming, Deleting, Done, Idle, Indexed, Reported, Scanning};
        matches!(
            (self, next),
            (Idle, Scanning)
                | (Scanning, Indexed)
                | (Indexed, Reported)
                | (Reported, Confirming | Done)
                | (Confirming, Deleting | Done)
                | (Deleting, Done)
        )
    }
}

/// Per-run options taken from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root to scan
    pub directory: PathBuf,
    /// Offer deletion after the report
    pub delete: bool,
    /// Delete without prompting
    pub assume_yes: bool,
    /// Report format
    pub output: OutputFormat,
    /// Colored report tags
    pub color: bool,
    /// Hide progress bars
    pub quiet: bool,
}

impl RunOptions {
    /// Take options from parsed arguments. Color follows `--no-color` only.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            directory: cli.directory.clone(),
            delete: cli.delete,
            assume_yes: cli.yes,
            output: cli.output,
            color: !cli.no_color,
            quiet: cli.quiet,
        }
    }

    /// Override the color decision.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// One run of the duplicate finder.
pub struct Pipeline {
    options: RunOptions,
    config: Config,
    shutdown: ShutdownHandler,
    state: PipelineState,
}

impl Pipeline {
    /// Create a pipeline in the `Idle` state.
    #[must_use]
    pub fn new(options: RunOptions, config: Config, shutdown: ShutdownHandler) -> Self {
        Self {
            options,
            config,
            shutdown,
            state: PipelineState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        log::trace!("Pipeline: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run every stage, writing the report to `out`.
    ///
    /// Prompts and deletion lines go to `out` for text reports and to
    /// `err` for JSON reports, so stdout stays a single JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is invalid, the run is interrupted, or
    /// writing to the output streams fails. An interruption after the
    /// report stops before the next file is deleted and yields
    /// [`PipelineError::Interrupted`].
    pub fn run(
        &mut self,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<ExitCode> {
        let json = self.options.output == OutputFormat::Json;
        let progress = Arc::new(Progress::new(self.options.quiet || json));

        self.transition(PipelineState::Scanning);
        let mut result = self.scan(Arc::clone(&progress))?;
        self.transition(PipelineState::Indexed);

        if result.skipped() > 0 {
            log::warn!(
                "Skipped {} entries ({} during traversal, {} while hashing)",
                result.skipped(),
                result.traversal_skips,
                result.hash_failures
            );
        }

        self.report(&result, out)?;
        self.transition(PipelineState::Reported);

        if !self.options.delete {
            self.transition(PipelineState::Done);
            return Ok(ExitCode::Success);
        }
        if !result.has_duplicates() {
            log::debug!("Nothing to delete");
            self.transition(PipelineState::Done);
            return Ok(ExitCode::Success);
        }

        let ui: &mut dyn Write = if json { err } else { out };

        self.check_shutdown()?;
        self.transition(PipelineState::Confirming);
        let confirmed = if self.options.assume_yes {
            log::info!("Deletion confirmed by --yes");
            true
        } else {
            write_prompt_separator(ui)?;
            confirm(input, ui, DELETE_PROMPT)?
        };
        self.check_shutdown()?;

        if !confirmed {
            writeln!(ui, "Deletion cancelled.")?;
            self.transition(PipelineState::Done);
            return Ok(ExitCode::Success);
        }

        self.transition(PipelineState::Deleting);
        let delete_config = DeleteConfig {
            mode: DeleteMode::from_trash_flag(self.config.trash),
            ..DeleteConfig::default()
        }
        .with_shutdown_flag(self.shutdown.get_flag());
        let batch = delete_duplicates(&mut result, &delete_config, Some(progress.as_ref()));
        write_deletion_report(ui, &batch)?;

        if batch.interrupted {
            return Err(PipelineError::Interrupted.into());
        }

        self.transition(PipelineState::Done);
        Ok(ExitCode::Success)
    }

    fn check_shutdown(&self) -> Result<(), PipelineError> {
        if self.shutdown.is_shutdown_requested() {
            log::warn!("Shutdown requested, skipping deletion");
            return Err(PipelineError::Interrupted);
        }
        Ok(())
    }

    fn scan(&self, progress: Arc<Progress>) -> Result<ScanResult> {
        let finder_config = FinderConfig::default()
            .with_io_threads(self.config.io_threads)
            .with_chunk_size(self.config.chunk_size)
            .with_walker_config(self.config.walker_config())
            .with_shutdown_flag(self.shutdown.get_flag())
            .with_progress_callback(progress);

        let finder = DuplicateFinder::new(finder_config);
        Ok(finder.find_duplicates(&self.options.directory)?)
    }

    fn report(&self, result: &ScanResult, out: &mut dyn Write) -> Result<()> {
        match self.options.output {
            OutputFormat::Text => {
                TextReport::new(result)
                    .with_color(self.options.color)
                    .write_to(out)?;
            }
            OutputFormat::Json => {
                JsonOutput::new(result, ExitCode::Success).write_to(out)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}
