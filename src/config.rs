//! Category rule configuration.
//!
//! This module owns the category-to-extensions-and-destination mapping and its
//! persistence as a JSON record. The record looks like:
//!
//! ```json
//! {
//!   "categories": {
//!     "Images": { "extensions": [".jpg", ".png"], "destination": "" },
//!     "Documents": { "extensions": [".pdf", ".txt"], "destination": "/data/docs" }
//!   },
//!   "others_destination": "",
//!   "safe_mode": true,
//!   "monitoring_enabled": true,
//!   "monitor_patterns": ["*"]
//! }
//! ```
//!
//! The order of the `categories` object is rule insertion order and decides
//! ties: when two rules claim the same extension, the first one wins. An empty
//! `destination` means "relative to each source folder being scanned".
//! `safe_mode`, `monitoring_enabled` and `monitor_patterns` are feature flags
//! consumed by embedding layers; the core only round-trips them.

use crate::event_log::EventLog;
use crate::storage::Storage;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Errors that can occur while persisting the configuration record.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to write the record or its temp file.
    WriteFailed { path: PathBuf, source: std::io::Error },
    /// Failed to serialize the rule set to JSON.
    SerializeFailed(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::WriteFailed { path, source } => {
                write!(f, "Failed to write config {}: {}", path.display(), source)
            }
            ConfigError::SerializeFailed(reason) => {
                write!(f, "Failed to serialize config: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// One named category: an extension set plus an optional destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    /// Category name, unique within the rule set.
    pub name: String,
    /// Lowercase, dot-prefixed extensions (e.g. `.jpg`).
    pub extensions: Vec<String>,
    /// Absolute destination root, or empty for "relative to the source folder".
    pub destination: String,
}

impl CategoryRule {
    /// Creates a rule from literal parts.
    pub fn new(name: &str, extensions: &[&str], destination: &str) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            destination: destination.to_string(),
        }
    }

    /// Checks whether a lowercase dot-prefixed extension belongs to this rule.
    ///
    /// Stored extensions are lowercased on comparison, so a sloppily edited
    /// record with `.JPG` still matches.
    pub fn matches(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e.to_lowercase() == extension)
    }
}

/// Ordered collection of category rules plus the "Others" fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rules in insertion order; earlier rules win extension ties.
    #[serde(with = "categories_map", default = "default_categories")]
    pub categories: Vec<CategoryRule>,

    /// Destination root for files matching no rule (category "Others").
    #[serde(default)]
    pub others_destination: String,

    /// Pass-through flag for embedding layers (confirmation before moving).
    #[serde(default = "default_true")]
    pub safe_mode: bool,

    /// Pass-through flag for embedding layers (folder watching on/off).
    #[serde(default = "default_true")]
    pub monitoring_enabled: bool,

    /// Glob patterns a watched file name must match to be auto-organized.
    #[serde(default = "default_monitor_patterns")]
    pub monitor_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_monitor_patterns() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Images",
            &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp"],
            "",
        ),
        CategoryRule::new("Videos", &[".mp4", ".mkv", ".mov", ".avi", ".webm"], ""),
        CategoryRule::new(
            "Documents",
            &[".pdf", ".docx", ".doc", ".txt", ".pptx", ".xlsx", ".odt"],
            "",
        ),
        CategoryRule::new("Archives", &[".zip", ".rar", ".tar", ".gz", ".7z"], ""),
        CategoryRule::new(
            "Code",
            &[".py", ".js", ".java", ".cpp", ".c", ".cs", ".html", ".css"],
            "",
        ),
    ]
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            others_destination: String::new(),
            safe_mode: true,
            monitoring_enabled: true,
            monitor_patterns: default_monitor_patterns(),
        }
    }
}

impl RuleSet {
    /// Finds the first rule claiming the given lowercase dot-prefixed
    /// extension. Insertion order decides ties.
    pub fn rule_for_extension(&self, extension: &str) -> Option<&CategoryRule> {
        self.categories.iter().find(|rule| rule.matches(extension))
    }

    /// Checks a file name against the monitor patterns.
    ///
    /// Unparseable patterns never match. An empty pattern list matches
    /// nothing, which effectively disables auto-organization.
    pub fn monitor_match(&self, file_name: &str) -> bool {
        self.monitor_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|pattern| pattern.matches(file_name))
    }
}

/// Serializes `Vec<CategoryRule>` as a JSON object keyed by category name,
/// and deserializes it back preserving document order. Serde's map access
/// yields entries in the order they appear in the text, so no ordered-map
/// type is needed.
mod categories_map {
    use super::CategoryRule;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    #[derive(Serialize)]
    struct BodyRef<'a> {
        extensions: &'a [String],
        destination: &'a str,
    }

    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        extensions: Vec<String>,
        #[serde(default)]
        destination: String,
    }

    pub fn serialize<S>(rules: &[CategoryRule], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(rules.len()))?;
        for rule in rules {
            map.serialize_entry(
                &rule.name,
                &BodyRef {
                    extensions: &rule.extensions,
                    destination: &rule.destination,
                },
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<CategoryRule>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Vec<CategoryRule>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to { extensions, destination }")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut rules = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, body)) = access.next_entry::<String, Body>()? {
                    rules.push(CategoryRule {
                        name,
                        extensions: body.extensions,
                        destination: body.destination,
                    });
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

/// Loads and saves the persisted rule set.
pub struct ConfigStore {
    path: PathBuf,
    log: EventLog,
}

impl ConfigStore {
    /// Creates a store reading and writing the given storage's config record.
    pub fn new(storage: &Storage, log: EventLog) -> Self {
        Self {
            path: storage.config_path(),
            log,
        }
    }

    /// Loads the persisted rule set.
    ///
    /// Fails soft: a missing record is replaced by the built-in defaults
    /// (which are also written back), and a malformed record falls back to
    /// the defaults after a log entry. Callers never see an error.
    pub fn load(&self) -> RuleSet {
        if !self.path.exists() {
            let defaults = RuleSet::default();
            match self.save(&defaults) {
                Ok(()) => self
                    .log
                    .append(&format!("Saved default config to {}", self.path.display())),
                Err(e) => self
                    .log
                    .error(&format!("Could not save default config: {}", e)),
            }
            return defaults;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                self.log
                    .error(&format!("Config unreadable, using defaults: {}", e));
                return RuleSet::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(rules) => rules,
            Err(e) => {
                self.log
                    .error(&format!("Config corrupted, using defaults: {}", e));
                RuleSet::default()
            }
        }
    }

    /// Overwrites the persisted record.
    ///
    /// The new record is written to a sibling temp file and renamed into
    /// place, so concurrent readers never observe a partial record.
    pub fn save(&self, rules: &RuleSet) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(rules)
            .map_err(|e| ConfigError::SerializeFailed(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| ConfigError::WriteFailed {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| ConfigError::WriteFailed {
            path: self.path.clone(),
            source: e,
        })?;

        self.log
            .append(&format!("Config saved to {}", self.path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> ConfigStore {
        let storage = Storage::new(temp_dir.path()).expect("Failed to create storage");
        let log = EventLog::new(storage.log_path());
        ConfigStore::new(&storage, log)
    }

    #[test]
    fn test_default_rule_set_covers_common_categories() {
        let rules = RuleSet::default();
        let names: Vec<_> = rules.categories.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Images", "Videos", "Documents", "Archives", "Code"]
        );
        assert!(rules.categories.iter().all(|r| r.destination.is_empty()));
    }

    #[test]
    fn test_rule_for_extension_first_match_wins() {
        let rules = RuleSet {
            categories: vec![
                CategoryRule::new("First", &[".dat"], ""),
                CategoryRule::new("Second", &[".dat", ".bin"], ""),
            ],
            ..RuleSet::default()
        };

        assert_eq!(rules.rule_for_extension(".dat").unwrap().name, "First");
        assert_eq!(rules.rule_for_extension(".bin").unwrap().name, "Second");
        assert!(rules.rule_for_extension(".xyz").is_none());
    }

    #[test]
    fn test_matches_tolerates_uppercase_stored_extensions() {
        let rule = CategoryRule::new("Images", &[".JPG"], "");
        assert!(rule.matches(".jpg"));
    }

    #[test]
    fn test_load_missing_record_writes_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);

        let rules = store.load();
        assert_eq!(rules, RuleSet::default());
        assert!(temp_dir.path().join("organizer_config.json").exists());
    }

    #[test]
    fn test_load_corrupted_record_falls_back_to_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);
        fs::write(temp_dir.path().join("organizer_config.json"), "{not json")
            .expect("Failed to write");

        let rules = store.load();
        assert_eq!(rules, RuleSet::default());
    }

    #[test]
    fn test_save_load_round_trip_preserves_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);

        let rules = RuleSet {
            categories: vec![
                CategoryRule::new("Zeta", &[".z"], "/data/zeta"),
                CategoryRule::new("Alpha", &[".a"], ""),
                CategoryRule::new("Mid", &[".m"], ""),
            ],
            others_destination: "/data/misc".to_string(),
            safe_mode: false,
            monitoring_enabled: false,
            monitor_patterns: vec!["*.pdf".to_string()],
        };

        store.save(&rules).expect("Failed to save");
        let loaded = store.load();

        // Order must survive even though names are not alphabetical.
        assert_eq!(loaded, rules);
    }

    #[test]
    fn test_missing_categories_key_uses_default_categories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(&temp_dir);
        fs::write(
            temp_dir.path().join("organizer_config.json"),
            r#"{"others_destination": "/misc"}"#,
        )
        .expect("Failed to write");

        let rules = store.load();
        assert_eq!(rules.categories, default_categories());
        assert_eq!(rules.others_destination, "/misc");
    }

    #[test]
    fn test_monitor_match() {
        let rules = RuleSet {
            monitor_patterns: vec!["*.pdf".to_string(), "report_*".to_string()],
            ..RuleSet::default()
        };

        assert!(rules.monitor_match("invoice.pdf"));
        assert!(rules.monitor_match("report_2024.txt"));
        assert!(!rules.monitor_match("photo.png"));
    }

    #[test]
    fn test_monitor_match_ignores_invalid_patterns() {
        let rules = RuleSet {
            monitor_patterns: vec!["[invalid".to_string(), "*.txt".to_string()],
            ..RuleSet::default()
        };

        assert!(rules.monitor_match("notes.txt"));
        assert!(!rules.monitor_match("notes.pdf"));
    }
}
