//! Move execution and the last-run record.
//!
//! The executor performs every plan entry it receives, in order, with
//! best-effort semantics: a failed entry is logged and skipped, never aborting
//! the batch. Successful moves are written to a single `last_run.json` record
//! that backs the one-shot undo.

use crate::event_log::EventLog;
use crate::planner::PlanEntry;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while persisting or reading the last-run record.
#[derive(Debug)]
pub enum RunLogError {
    /// Failed to write the record.
    WriteFailed { source: io::Error },
    /// Failed to read the record.
    ReadFailed { source: io::Error },
    /// The record exists but cannot be parsed.
    InvalidFormat { reason: String },
}

impl std::fmt::Display for RunLogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunLogError::WriteFailed { source } => {
                write!(f, "Failed to write last-run record: {}", source)
            }
            RunLogError::ReadFailed { source } => {
                write!(f, "Failed to read last-run record: {}", source)
            }
            RunLogError::InvalidFormat { reason } => {
                write!(f, "Invalid last-run record: {}", reason)
            }
        }
    }
}

impl std::error::Error for RunLogError {}

/// One successfully executed move: original path and collision-resolved
/// final path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub src: PathBuf,
    pub dest: PathBuf,
}

/// The persisted record of the most recent successful batch.
///
/// At most one exists per installation: a new batch with at least one success
/// overwrites it entirely, and a fully successful undo deletes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    /// ISO 8601 UTC timestamp of the batch.
    pub timestamp: String,
    /// Moves in execution order.
    pub moves: Vec<MoveRecord>,
}

impl RunLog {
    /// Creates a record for the given moves, stamped with the current time.
    pub fn new(moves: Vec<MoveRecord>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            moves,
        }
    }

    /// Overwrites the record on disk.
    pub fn save(&self, path: &Path) -> Result<(), RunLogError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| RunLogError::WriteFailed {
            source: io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
        })?;
        fs::write(path, json).map_err(|e| RunLogError::WriteFailed { source: e })
    }

    /// Loads the record, or `None` if no run has been recorded.
    pub fn load(path: &Path) -> Result<Option<Self>, RunLogError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path).map_err(|e| RunLogError::ReadFailed { source: e })?;
        let log = serde_json::from_str(&json).map_err(|e| RunLogError::InvalidFormat {
            reason: e.to_string(),
        })?;
        Ok(Some(log))
    }

    /// Removes the record if present.
    pub fn delete(path: &Path) -> Result<(), RunLogError> {
        if path.exists() {
            fs::remove_file(path).map_err(|e| RunLogError::WriteFailed { source: e })?;
        }
        Ok(())
    }
}

/// Returns a collision-safe variant of `dest`.
///
/// If `dest` is free it is returned unchanged; otherwise `_1`, `_2`, ... is
/// appended before the extension until an unused name is found. The search is
/// monotonic, so the lowest available suffix always wins.
pub fn unique_dest(dest: &Path) -> PathBuf {
    if !dest.exists() {
        return dest.to_path_buf();
    }

    let parent = dest.parent().unwrap_or_else(|| Path::new(""));
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let suffix = dest
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{}_{}{}", stem, counter, suffix));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Moves a file, falling back to copy-and-delete when the rename crosses a
/// filesystem boundary.
///
/// On success the file exists only at `dest`. If the fallback copy lands but
/// the source cannot be removed, the copy is taken back out so the
/// "moved entirely or not at all" contract holds.
pub fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(src, dest)?;
            if let Err(remove_err) = fs::remove_file(src) {
                let _ = fs::remove_file(dest);
                return Err(remove_err);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Executes an approved plan.
///
/// Per entry: create the destination directory, resolve a collision-safe
/// final path, move. Failures are logged and skipped. If at least one move
/// succeeded the last-run record is overwritten with exactly the successful
/// moves; a batch with zero successes leaves any prior record untouched, so
/// a no-op run cannot erase an earlier run's undo capability.
pub fn perform_moves(plan: &[PlanEntry], storage: &Storage, log: &EventLog) -> Vec<MoveRecord> {
    perform_moves_with(plan, storage, log, |_, _| {})
}

/// Like [`perform_moves`], invoking `observe(entry, succeeded)` after each
/// entry so front ends can drive progress reporting.
pub fn perform_moves_with(
    plan: &[PlanEntry],
    storage: &Storage,
    log: &EventLog,
    mut observe: impl FnMut(&PlanEntry, bool),
) -> Vec<MoveRecord> {
    let mut performed = Vec::new();

    for entry in plan {
        let Some(dest_dir) = entry.planned_dest.parent() else {
            log.error(&format!(
                "Planned destination has no parent: {}",
                entry.planned_dest.display()
            ));
            observe(entry, false);
            continue;
        };

        if let Err(e) = fs::create_dir_all(dest_dir) {
            log.error(&format!(
                "Failed to create directory {}: {}",
                dest_dir.display(),
                e
            ));
            observe(entry, false);
            continue;
        }

        let final_dest = unique_dest(&entry.planned_dest);
        match move_file(&entry.source, &final_dest) {
            Ok(()) => {
                log.append(&format!(
                    "Moved: {} -> {}",
                    entry.source.display(),
                    final_dest.display()
                ));
                performed.push(MoveRecord {
                    src: entry.source.clone(),
                    dest: final_dest,
                });
                observe(entry, true);
            }
            Err(e) => {
                log.error(&format!(
                    "Failed to move {} -> {}: {}",
                    entry.source.display(),
                    final_dest.display(),
                    e
                ));
                observe(entry, false);
            }
        }
    }

    if !performed.is_empty() {
        let run_log_path = storage.last_run_path();
        match RunLog::new(performed.clone()).save(&run_log_path) {
            Ok(()) => log.append(&format!(
                "Wrote last run with {} moves to {}",
                performed.len(),
                run_log_path.display()
            )),
            Err(e) => log.error(&format!("Could not record last run: {}", e)),
        }
    }

    performed
}
