use crate::core::error::{Error, Result};
use crate::storage::index::ModTime;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A note file found in the notes directory
#[derive(Debug, Clone)]
pub struct DiscoveredNote {
    pub path: PathBuf,
    /// File name, which doubles as the note identifier
    pub note_id: String,
    pub modified: ModTime,
}

/// Result of listing the notes directory
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub notes: Vec<DiscoveredNote>,
    /// Entries that could not be read; their notes may still exist
    pub unreadable: usize,
}

impl Discovery {
    /// Whether every entry of the directory was seen
    pub fn is_complete(&self) -> bool {
        self.unreadable == 0
    }
}

/// List the visible note files directly inside `notes_dir`.
///
/// Names starting with `.` are hidden and skipped, as are subdirectories
/// and names the index format cannot hold. Failing to read the directory
/// itself is an error; failing on a single entry is counted and skipped.
pub fn discover_notes(notes_dir: &Path) -> Result<Discovery> {
    if !notes_dir.is_dir() {
        return Err(Error::Config(format!(
            "Notes directory does not exist: {}",
            notes_dir.display()
        )));
    }

    let mut discovery = Discovery::default();

    let walker = WalkBuilder::new(notes_dir)
        .standard_filters(false)
        .hidden(true)
        .max_depth(Some(1))
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) if is_root_error(&err) => {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to read {}: {}", notes_dir.display(), err),
                )));
            }
            Err(err) => {
                warn!("Failed to access note file: {}", err);
                discovery.unreadable += 1;
                continue;
            }
        };

        if entry.depth() == 0 || !entry.file_type().map_or(false, |t| t.is_file()) {
            continue;
        }

        let Some(note_id) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %entry.path().display(), "skipping note with non UTF-8 name");
            continue;
        };
        if note_id.contains(['\n', '\r']) {
            warn!(path = %entry.path().display(), "skipping note with line break in name");
            continue;
        }

        let modified = match ModTime::of_file(entry.path()) {
            Ok(modified) => modified,
            Err(err) => {
                warn!(note = %note_id, "Failed to read modification time: {}", err);
                discovery.unreadable += 1;
                continue;
            }
        };

        discovery.notes.push(DiscoveredNote {
            modified,
            path: entry.into_path(),
            note_id,
        });
    }

    discovery.notes.sort_by(|a, b| a.note_id.cmp(&b.note_id));
    Ok(discovery)
}

// Errors without a depth come from the walk setup, not from an entry.
fn is_root_error(err: &ignore::Error) -> bool {
    err.depth().map_or(true, |depth| depth == 0)
}
