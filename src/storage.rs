//! Per-installation storage locations.
//!
//! The configuration record, the last-run log and the text log all live in a
//! single application data directory. The directory is carried as an explicit
//! value rather than a process-wide constant so that tests and embedders can
//! point separate `ConfigStore`/`RunLog` instances at separate locations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "tidybox";

const CONFIG_FILE: &str = "organizer_config.json";
const LAST_RUN_FILE: &str = "last_run.json";
const LOG_FILE: &str = "organizer.log";

/// Resolved data directory for one installation.
///
/// All persisted state paths are derived from this value.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Creates a storage rooted at an explicit directory, creating it if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Creates a storage rooted at the platform's per-user data directory
    /// (e.g. `~/.local/share/tidybox` on Linux).
    pub fn default_location() -> io::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine a user data directory",
            )
        })?;
        Self::new(base.join(APP_DIR_NAME))
    }

    /// The data directory itself.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the JSON configuration record.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// Path of the JSON last-run record that backs undo.
    pub fn last_run_path(&self) -> PathBuf {
        self.data_dir.join(LAST_RUN_FILE)
    }

    /// Path of the append-only text log.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_data_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("nested").join("data");

        let storage = Storage::new(&root).expect("Failed to create storage");
        assert!(root.is_dir());
        assert_eq!(storage.data_dir(), root);
    }

    #[test]
    fn test_paths_derive_from_data_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = Storage::new(temp_dir.path()).expect("Failed to create storage");

        assert_eq!(
            storage.config_path(),
            temp_dir.path().join("organizer_config.json")
        );
        assert_eq!(storage.last_run_path(), temp_dir.path().join("last_run.json"));
        assert_eq!(storage.log_path(), temp_dir.path().join("organizer.log"));
    }
}
