//! One-shot undo of the last move batch.
//!
//! Replays the last-run record in reverse order, moving each file from its
//! final location back to a collision-safe path at its original location.
//! Reverse order matches the batch's dependency order when several moves
//! shared destination directories. Only a fully successful undo deletes the
//! record; any failure preserves it so the undo can be retried.

use crate::event_log::EventLog;
use crate::mover::{self, RunLog, RunLogError};
use crate::storage::Storage;
use std::fs;

/// Errors that prevent an undo from starting.
#[derive(Debug)]
pub enum UndoError {
    /// There is no last-run record to reverse.
    NoRunRecorded,
    /// The record exists but could not be read.
    RunLog(RunLogError),
}

impl std::fmt::Display for UndoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndoError::NoRunRecorded => write!(f, "No last run recorded."),
            UndoError::RunLog(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for UndoError {}

impl From<RunLogError> for UndoError {
    fn from(e: RunLogError) -> Self {
        UndoError::RunLog(e)
    }
}

/// Outcome of an undo attempt that got as far as replaying records.
#[derive(Debug)]
pub struct UndoReport {
    /// Number of moves reversed.
    pub undone: usize,
    /// One line per failed reversal: "moved-to -> original: reason".
    pub failures: Vec<String>,
}

impl UndoReport {
    /// True when every recorded move was reversed.
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary for the embedding layer.
    pub fn message(&self) -> String {
        if self.succeeded() {
            format!("Undid {} moves.", self.undone)
        } else {
            format!("Some files failed to undo:\n{}", self.failures.join("\n"))
        }
    }
}

/// Reverses the last recorded batch.
///
/// Each record is replayed last-moved-first: the original parent directory is
/// recreated if needed, and if something now occupies the original path the
/// restored file is suffixed rather than overwriting it. Per-record failures
/// accumulate without stopping the replay. On full success the run record is
/// deleted; otherwise it is kept for a retry.
pub fn undo_last_run(storage: &Storage, log: &EventLog) -> Result<UndoReport, UndoError> {
    let run_log_path = storage.last_run_path();
    let run = RunLog::load(&run_log_path)?.ok_or(UndoError::NoRunRecorded)?;

    let mut failures = Vec::new();
    for record in run.moves.iter().rev() {
        let current = &record.dest;
        let original = &record.src;

        let result = original
            .parent()
            .map(fs::create_dir_all)
            .unwrap_or(Ok(()))
            .and_then(|()| {
                let restore_to = mover::unique_dest(original);
                mover::move_file(current, &restore_to)?;
                log.append(&format!(
                    "Undid move: {} -> {}",
                    current.display(),
                    restore_to.display()
                ));
                Ok(())
            });

        if let Err(e) = result {
            log.error(&format!(
                "Failed to undo {} -> {}: {}",
                current.display(),
                original.display(),
                e
            ));
            failures.push(format!(
                "{} -> {}: {}",
                current.display(),
                original.display(),
                e
            ));
        }
    }

    let undone = run.moves.len() - failures.len();
    let report = UndoReport { undone, failures };

    if report.succeeded() {
        if let Err(e) = RunLog::delete(&run_log_path) {
            // Files are already restored at this point; the stale record is
            // only a warning condition.
            log.warn(&format!("Could not delete last-run record: {}", e));
        }
        log.append(&report.message());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;
    use crate::mover::perform_moves;
    use crate::planner::build_preview;
    use tempfile::TempDir;

    fn setup(temp_dir: &TempDir) -> (Storage, EventLog) {
        let storage =
            Storage::new(temp_dir.path().join("data")).expect("Failed to create storage");
        let log = EventLog::new(storage.log_path());
        (storage, log)
    }

    #[test]
    fn test_undo_without_run_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let (storage, log) = setup(&temp_dir);

        let result = undo_last_run(&storage, &log);
        assert!(matches!(result, Err(UndoError::NoRunRecorded)));
    }

    #[test]
    fn test_undo_restores_files_and_deletes_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let (storage, log) = setup(&temp_dir);
        let inbox = temp_dir.path().join("inbox");
        fs::create_dir(&inbox).expect("Failed to create inbox");
        fs::write(inbox.join("report.pdf"), "pdf").expect("Failed to write");
        fs::write(inbox.join("song.unknownext"), "?").expect("Failed to write");

        let plan = build_preview(&[inbox.clone()], &RuleSet::default(), &log);
        perform_moves(&plan, &storage, &log);
        assert!(!inbox.join("report.pdf").exists());

        let report = undo_last_run(&storage, &log).expect("Undo failed");
        assert!(report.succeeded());
        assert_eq!(report.undone, 2);
        assert_eq!(report.message(), "Undid 2 moves.");
        assert!(inbox.join("report.pdf").exists());
        assert!(inbox.join("song.unknownext").exists());
        assert!(!storage.last_run_path().exists());

        // One-shot: a second undo has nothing to reverse.
        assert!(matches!(
            undo_last_run(&storage, &log),
            Err(UndoError::NoRunRecorded)
        ));
    }

    #[test]
    fn test_undo_suffixes_when_original_slot_is_taken() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let (storage, log) = setup(&temp_dir);
        let inbox = temp_dir.path().join("inbox");
        fs::create_dir(&inbox).expect("Failed to create inbox");
        fs::write(inbox.join("notes.txt"), "moved away").expect("Failed to write");

        let plan = build_preview(&[inbox.clone()], &RuleSet::default(), &log);
        perform_moves(&plan, &storage, &log);

        // Something new claims the original path before the undo runs.
        fs::write(inbox.join("notes.txt"), "newcomer").expect("Failed to write");

        let report = undo_last_run(&storage, &log).expect("Undo failed");
        assert!(report.succeeded());
        assert_eq!(
            fs::read_to_string(inbox.join("notes.txt")).expect("Failed to read"),
            "newcomer"
        );
        assert_eq!(
            fs::read_to_string(inbox.join("notes_1.txt")).expect("Failed to read"),
            "moved away"
        );
    }

    #[test]
    fn test_undo_partial_failure_keeps_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let (storage, log) = setup(&temp_dir);
        let inbox = temp_dir.path().join("inbox");
        fs::create_dir(&inbox).expect("Failed to create inbox");
        fs::write(inbox.join("a.txt"), "a").expect("Failed to write");
        fs::write(inbox.join("b.txt"), "b").expect("Failed to write");

        let plan = build_preview(&[inbox.clone()], &RuleSet::default(), &log);
        let performed = perform_moves(&plan, &storage, &log);
        assert_eq!(performed.len(), 2);

        // One moved file disappears; its reversal must fail.
        fs::remove_file(&performed[0].dest).expect("Failed to remove");

        let report = undo_last_run(&storage, &log).expect("Undo failed to start");
        assert!(!report.succeeded());
        assert_eq!(report.undone, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.message().starts_with("Some files failed to undo:"));
        // Record preserved for a retry.
        assert!(storage.last_run_path().exists());
    }
}
