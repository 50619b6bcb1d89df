//! Append-only text log.
//!
//! One timestamped line per notable event (config saved, file moved, move or
//! undo failure). The sink is handed around explicitly; a logging failure is
//! reported on stderr and otherwise swallowed, so the log can never take the
//! core operations down with it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Severity tag written into each log line.
#[derive(Debug, Clone, Copy)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// Appends human-readable event lines to a log file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Creates a log sink writing to the given file path.
    ///
    /// The file is created lazily on the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends an informational line.
    pub fn append(&self, message: &str) {
        self.write_line(Level::Info, message);
    }

    /// Appends a warning line.
    pub fn warn(&self, message: &str) {
        self.write_line(Level::Warning, message);
    }

    /// Appends an error line.
    pub fn error(&self, message: &str) {
        self.write_line(Level::Error, message);
    }

    fn write_line(&self, level: Level, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("{} - {} - {}\n", timestamp, level.tag(), message);

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            eprintln!("Warning: could not write to {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_append_writes_timestamped_lines() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log_path = temp_dir.path().join("organizer.log");
        let log = EventLog::new(&log_path);

        log.append("config saved");
        log.error("move failed");

        let content = fs::read_to_string(&log_path).expect("Failed to read log");
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO - config saved"));
        assert!(lines[1].contains("ERROR - move failed"));
    }

    #[test]
    fn test_append_to_unwritable_path_does_not_panic() {
        let log = EventLog::new("/nonexistent/dir/organizer.log");
        log.append("should be swallowed");
    }
}
