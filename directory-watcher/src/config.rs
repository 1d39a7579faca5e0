//! Configuration types for directory watching.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WatcherError};

/// Configuration for the watched directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Path to the directory.
    pub path: PathBuf,

    /// Glob applied to the file name of each new entry (e.g. `*.txt`).
    pub filter: String,
}

impl WatchConfig {
    /// Create a new watch config.
    pub fn new(path: impl Into<PathBuf>, filter: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filter: filter.into(),
        }
    }

    /// Check the directory and compile the filter.
    ///
    /// Touches the file system to confirm `path` is an existing directory,
    /// so call it right before registering the watch.
    pub fn validate(&self) -> Result<NameFilter> {
        let filter = NameFilter::new(&self.filter)?;

        if !self.path.exists() {
            return Err(WatcherError::DirectoryNotFound(
                self.path.display().to_string(),
            ));
        }

        if !self.path.is_dir() {
            return Err(WatcherError::NotADirectory(self.path.display().to_string()));
        }

        Ok(filter)
    }
}

/// A compiled file name filter.
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: Pattern,
}

impl NameFilter {
    /// Compile a glob pattern. Blank patterns are rejected.
    pub fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(WatcherError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }

        let pattern = Pattern::new(trimmed).map_err(|e| WatcherError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { pattern })
    }

    /// Check if the final component of `path` matches.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        self.pattern.matches_with(name, Self::options())
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    fn options() -> MatchOptions {
        MatchOptions {
            // Windows file names are case-insensitive.
            case_sensitive: !cfg!(windows),
            require_literal_separator: true,
            require_literal_leading_dot: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_watch_config_creation() {
        let config = WatchConfig::new("/watched", "*.csv");

        assert_eq!(config.path, Path::new("/watched"));
        assert_eq!(config.filter, "*.csv");
    }

    #[test]
    fn test_filter_matches_file_name_only() {
        let filter = NameFilter::new("*.txt").unwrap();

        assert!(filter.matches(Path::new("/watched/report.txt")));
        assert!(!filter.matches(Path::new("/watched/image.png")));
        assert!(!filter.matches(Path::new("/watched.txt/image.png")));
    }

    #[test]
    fn test_filter_matches_hidden_files() {
        let filter = NameFilter::new("*.txt").unwrap();
        assert!(filter.matches(Path::new("/watched/.notes.txt")));
    }

    #[test]
    fn test_blank_filter_rejected() {
        for pattern in ["", "   "] {
            let err = NameFilter::new(pattern).unwrap_err();
            assert!(err.is_configuration(), "{pattern:?} should be rejected");
        }
    }

    #[test]
    fn test_malformed_filter_rejected() {
        let err = NameFilter::new("report[.txt").unwrap_err();
        assert!(matches!(err, WatcherError::InvalidPattern { .. }));
    }

    #[test]
    fn test_validate_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let filter = WatchConfig::new(temp_dir.path(), "*.txt").validate().unwrap();

        assert_eq!(filter.as_str(), "*.txt");
    }

    #[test]
    fn test_validate_nonexistent_directory() {
        let err = WatchConfig::new("/nonexistent/path/12345", "*.txt")
            .validate()
            .unwrap_err();

        assert!(matches!(err, WatcherError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_validate_file_is_not_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        let err = WatchConfig::new(&file, "*.txt").validate().unwrap_err();
        assert!(matches!(err, WatcherError::NotADirectory(_)));
    }
}
