//! tidybox - rule-driven file organizing with one-shot undo
//!
//! This library scans folders, classifies files by extension against a
//! user-defined rule set, moves them into category subfolders with
//! collision-safe naming, and can reverse the last batch of moves exactly
//! once. Planning is side-effect free; execution is best-effort per entry.

pub mod cli;
pub mod config;
pub mod event_log;
pub mod mover;
pub mod output;
pub mod planner;
pub mod storage;
pub mod undo;

pub use config::{CategoryRule, ConfigError, ConfigStore, RuleSet};
pub use event_log::EventLog;
pub use mover::{MoveRecord, RunLog, RunLogError, perform_moves};
pub use planner::{OTHERS_CATEGORY, PlanEntry, build_preview, retain_matching};
pub use storage::Storage;
pub use undo::{UndoError, UndoReport, undo_last_run};
