//! Command-line front end.
//!
//! Thin orchestration over the library: resolve storage, load the rule set,
//! build the plan, then hand it to the executor or print it. All decisions
//! about what moves where live in the library modules; this layer only wires
//! them together and renders the results.

use crate::config::ConfigStore;
use crate::event_log::EventLog;
use crate::mover;
use crate::output::{self, OutputFormatter};
use crate::planner;
use crate::storage::Storage;
use crate::undo::{self, UndoError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tidybox", version, about = "Sort files into category folders, with preview and one-shot undo")]
pub struct Cli {
    /// Override the data directory holding the config, last-run record and log.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the move plan for one or more folders without touching anything.
    Preview {
        /// Folders to scan (direct children only).
        #[arg(required = true)]
        folders: Vec<PathBuf>,
    },
    /// Move files into their category folders.
    Organize {
        /// Folders to organize (direct children only).
        #[arg(required = true)]
        folders: Vec<PathBuf>,

        /// Analyze and report only; make no changes.
        #[arg(long)]
        dry_run: bool,

        /// Only move files whose name matches one of these glob patterns.
        #[arg(long, value_name = "GLOB")]
        only: Vec<String>,
    },
    /// Reverse the last organize run.
    Undo,
    /// Print the active configuration record and its location.
    Config,
}

/// Runs a parsed command to completion.
pub fn run(cli: Cli) -> Result<(), String> {
    let storage = match cli.data_dir {
        Some(dir) => Storage::new(dir),
        None => Storage::default_location(),
    }
    .map_err(|e| format!("Could not prepare data directory: {}", e))?;

    let log = EventLog::new(storage.log_path());
    let store = ConfigStore::new(&storage, log.clone());

    match cli.command {
        Command::Preview { folders } => {
            let rules = store.load();
            let plan = planner::build_preview(&folders, &rules, &log);
            if plan.is_empty() {
                OutputFormatter::info("No files found to organize.");
                return Ok(());
            }

            OutputFormatter::header("Planned moves");
            OutputFormatter::plan_listing(&plan);
            OutputFormatter::summary_table(&output::count_by_category(&plan), plan.len());
            Ok(())
        }

        Command::Organize {
            folders,
            dry_run,
            only,
        } => {
            let rules = store.load();
            let mut plan = planner::build_preview(&folders, &rules, &log);
            if !only.is_empty() {
                plan = planner::retain_matching(plan, &only);
            }
            if plan.is_empty() {
                OutputFormatter::info("No files found to organize.");
                return Ok(());
            }

            if dry_run {
                OutputFormatter::dry_run_notice("Files would be organized as follows:");
                OutputFormatter::plan_listing(&plan);
                OutputFormatter::summary_table(&output::count_by_category(&plan), plan.len());
                OutputFormatter::dry_run_notice("No files were modified.");
                return Ok(());
            }

            let pb = OutputFormatter::create_progress_bar(plan.len() as u64);
            let performed = mover::perform_moves_with(&plan, &storage, &log, |entry, _| {
                if let Some(name) = entry.source.file_name() {
                    pb.set_message(name.to_string_lossy().to_string());
                }
                pb.inc(1);
            });
            pb.finish_and_clear();

            let failed = plan.len() - performed.len();
            let moved: Vec<_> = plan
                .iter()
                .filter(|entry| performed.iter().any(|m| m.src == entry.source))
                .cloned()
                .collect();
            OutputFormatter::summary_table(&output::count_by_category(&moved), performed.len());

            if failed > 0 {
                OutputFormatter::warning(&format!(
                    "{} file(s) could not be moved. See {} for details.",
                    failed,
                    storage.log_path().display()
                ));
            }
            if !performed.is_empty() {
                OutputFormatter::success(&format!(
                    "Moved {} file(s). Run 'tidybox undo' to revert.",
                    performed.len()
                ));
            }
            Ok(())
        }

        Command::Undo => match undo::undo_last_run(&storage, &log) {
            Ok(report) if report.succeeded() => {
                OutputFormatter::success(&report.message());
                Ok(())
            }
            Ok(report) => {
                OutputFormatter::error(&report.message());
                OutputFormatter::warning(
                    "The last-run record was kept; fix the issues and retry the undo.",
                );
                Ok(())
            }
            Err(UndoError::NoRunRecorded) => {
                OutputFormatter::warning("No last run recorded.");
                Ok(())
            }
            Err(e) => Err(format!("{}", e)),
        },

        Command::Config => {
            let rules = store.load();
            let json = serde_json::to_string_pretty(&rules)
                .map_err(|e| format!("Could not render config: {}", e))?;
            OutputFormatter::info(&format!("Config file: {}", storage.config_path().display()));
            println!("{}", json);
            Ok(())
        }
    }
}
