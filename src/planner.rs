//! Move planning.
//!
//! Builds the side-effect-free preview plan: one proposed move per eligible
//! file, computed fresh on every call. The planner never touches the
//! filesystem beyond read-only enumeration, so it can be re-run arbitrarily
//! often (after a rules edit, before confirmation, per watcher event) with no
//! cumulative effect.

use crate::config::RuleSet;
use crate::event_log::EventLog;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

/// Category name assigned to files matching no rule.
pub const OTHERS_CATEGORY: &str = "Others";

/// One proposed move. Immutable once built; the executor consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// The file as it exists at plan-build time.
    pub source: PathBuf,
    /// Matched category name, or "Others".
    pub category: String,
    /// destination-root / category-name / file base name. The executor may
    /// still suffix the base name to dodge a collision.
    pub planned_dest: PathBuf,
}

/// Determines the category and destination root for one file.
///
/// The destination root is the matched rule's `destination` when it is a
/// non-empty absolute path, otherwise the file's own parent folder. Files
/// matching no rule fall back to "Others" and `others_destination`, resolved
/// the same way. The category subfolder is appended in both cases, so an
/// unmatched file always lands under an `Others/` directory.
fn categorize(file: &Path, source_folder: &Path, rules: &RuleSet) -> (String, PathBuf) {
    let extension = file
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    let (category, configured_root) = match rules.rule_for_extension(&extension) {
        Some(rule) => (rule.name.clone(), rule.destination.as_str()),
        None => (OTHERS_CATEGORY.to_string(), rules.others_destination.as_str()),
    };

    let root = Path::new(configured_root);
    let target_folder = if !configured_root.is_empty() && root.is_absolute() {
        root.join(&category)
    } else {
        source_folder.join(&category)
    };

    (category, target_folder)
}

/// Builds the preview plan for a set of source folders.
///
/// Only direct children that are regular files are considered; subdirectories
/// are neither descended into nor moved. A missing or non-directory source is
/// logged and skipped without affecting the other folders. Entries come back
/// in filesystem enumeration order, which callers must treat as display-only.
pub fn build_preview(sources: &[PathBuf], rules: &RuleSet, log: &EventLog) -> Vec<PlanEntry> {
    let mut plan = Vec::new();

    for source in sources {
        let entries = match fs::read_dir(source) {
            Ok(entries) => entries,
            Err(e) => {
                log.warn(&format!("Source not found: {} ({})", source.display(), e));
                continue;
            }
        };

        for entry in entries.flatten() {
            if let Ok(file_type) = entry.file_type()
                && file_type.is_file()
            {
                let file_path = entry.path();
                let (category, target_folder) = categorize(&file_path, source, rules);
                let planned_dest = target_folder.join(entry.file_name());
                plan.push(PlanEntry {
                    source: file_path,
                    category,
                    planned_dest,
                });
            }
        }
    }

    plan
}

/// Keeps only the plan entries whose file name matches one of the glob
/// patterns.
///
/// Selection features (checkboxes, watcher patterns) are expressed as filters
/// over the plan rather than separate execution paths; the executor always
/// receives a plain entry sequence. Unparseable patterns are dropped.
pub fn retain_matching(plan: Vec<PlanEntry>, patterns: &[String]) -> Vec<PlanEntry> {
    let compiled: Vec<Pattern> = patterns
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    plan.into_iter()
        .filter(|entry| {
            let name = entry
                .source
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            compiled.iter().any(|pattern| pattern.matches(&name))
        })
        .collect()
}
