//! Terminal output formatting.
//!
//! Centralizes colored status lines, the plan/summary tables and the move
//! progress bar so the CLI front end stays free of styling details.

use crate::planner::PlanEntry;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Formats all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Green checkmarked success line.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Red error line on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Yellow warning line.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Cyan informational line.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Bold section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Yellow dry-run notice.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Progress bar sized for a move batch.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints the preview plan, one proposed move per line.
    pub fn plan_listing(plan: &[PlanEntry]) {
        for entry in plan {
            let name = entry
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| entry.source.display().to_string());
            println!(
                " - {} [{}]\n   → {}",
                name,
                entry.category.cyan(),
                entry.planned_dest.display()
            );
        }
    }

    /// Prints a per-category count table for a plan or batch.
    pub fn summary_table(category_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let max_category_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            let file_word = if **count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                file_word,
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_category_len
        );
    }
}

/// Tallies plan entries per category, for the summary table.
pub fn count_by_category(plan: &[PlanEntry]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for entry in plan {
        *counts.entry(entry.category.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_count_by_category() {
        let entry = |name: &str, category: &str| PlanEntry {
            source: PathBuf::from("/inbox").join(name),
            category: category.to_string(),
            planned_dest: PathBuf::from("/inbox").join(category).join(name),
        };
        let plan = vec![
            entry("a.pdf", "Documents"),
            entry("b.pdf", "Documents"),
            entry("c.png", "Images"),
        ];

        let counts = count_by_category(&plan);
        assert_eq!(counts.get("Documents"), Some(&2));
        assert_eq!(counts.get("Images"), Some(&1));
    }
}
