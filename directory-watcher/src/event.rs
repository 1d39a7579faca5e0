//! File events from directory watching.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};
use serde::{Deserialize, Serialize};

/// A new entry appeared in the watched directory.
///
/// The file may still be being written when this is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCreatedEvent {
    /// Absolute path of the new entry.
    pub full_path: PathBuf,

    /// When the watcher saw the event.
    pub detected_at: DateTime<Utc>,
}

impl FileCreatedEvent {
    /// Create a new file event.
    pub fn new(full_path: impl Into<PathBuf>) -> Self {
        Self {
            full_path: full_path.into(),
            detected_at: Utc::now(),
        }
    }

    /// Path of the new entry.
    pub fn path(&self) -> &Path {
        &self.full_path
    }

    /// File name component, if it is valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.full_path.file_name().and_then(|n| n.to_str())
    }
}

/// Whether a raw notify event means an entry appeared in the directory.
///
/// A rename into the directory counts as a creation; the OS may report
/// both for one file and no deduplication is done.
pub(crate) fn is_creation(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To))
    )
}
