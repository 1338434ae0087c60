use crate::core::error::Result;
use crate::indexing::discovery::{discover_notes, Discovery};
use crate::storage::index::InvertedIndex;
use crate::storage::notes::read_text;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    pub fn changes(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

/// Bring `index` in line with the note files in `notes_dir`.
///
/// New files are indexed, files modified after they were indexed are
/// re-lexed from scratch, and notes whose file is gone are dropped.
/// Nothing is dropped when some directory entry could not be read.
pub fn reconcile(notes_dir: &Path, index: &mut InvertedIndex) -> Result<ReconcileReport> {
    std::fs::create_dir_all(notes_dir)?;
    apply(discover_notes(notes_dir)?, index)
}

fn apply(discovery: Discovery, index: &mut InvertedIndex) -> Result<ReconcileReport> {
    let complete = discovery.is_complete();
    let mut report = ReconcileReport::default();
    let mut on_disk = HashSet::new();

    for note in discovery.notes {
        let recorded = index.mod_time(&note.note_id);
        if matches!(recorded, Some(t) if note.modified <= t) {
            on_disk.insert(note.note_id);
            continue;
        }

        let text = match read_text(&note.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        if recorded.is_some() {
            index.remove_document(&note.note_id);
            index.add_document(&text, &note.note_id, note.modified);
            debug!(note = %note.note_id, "re-indexed modified note");
            report.updated.push(note.note_id.clone());
        } else {
            index.add_document(&text, &note.note_id, note.modified);
            debug!(note = %note.note_id, "indexed new note");
            report.added.push(note.note_id.clone());
        }
        on_disk.insert(note.note_id);
    }

    if !complete {
        warn!(
            unreadable = discovery.unreadable,
            "notes directory listing is incomplete, keeping notes that were not seen"
        );
        on_disk.extend(index.notes().map(|(id, _)| id.to_string()));
    }

    let vanished: Vec<String> = index
        .notes()
        .map(|(id, _)| id)
        .filter(|id| !on_disk.contains(*id))
        .map(str::to_string)
        .collect();
    for note_id in vanished {
        index.remove_document(&note_id);
        debug!(note = %note_id, "dropped note whose file is gone");
        report.removed.push(note_id);
    }

    if !report.is_empty() {
        info!(
            added = report.added.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            "reconciled index with notes directory"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::index::ModTime;
    use std::fs;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_reconcile_adds_new_notes() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("a.txt"), "alpha beta").unwrap();
        fs::write(dir.join(".swap"), "ignored words").unwrap();

        let mut index = InvertedIndex::new();
        let report = reconcile(dir, &mut index).unwrap();
        assert_eq!(report.added, vec!["a.txt".to_string()]);
        assert!(index.contains_word("alpha"));
        assert!(!index.contains_word("ignored"));
    }

    #[test]
    fn test_reconcile_updates_modified_notes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, "old words").unwrap();

        let mut index = InvertedIndex::new();
        reconcile(temp_dir.path(), &mut index).unwrap();

        fs::write(&path, "fresh text").unwrap();
        set_mtime(&path, SystemTime::now() + Duration::from_secs(60));

        let report = reconcile(temp_dir.path(), &mut index).unwrap();
        assert_eq!(report.updated, vec!["a.txt".to_string()]);
        assert!(!index.contains_word("old"));
        assert!(index.contains_word("fresh"));
    }

    #[test]
    fn test_reconcile_skips_older_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, "disk text").unwrap();

        let mut index = InvertedIndex::new();
        index.add_document("indexed text", "a.txt", ModTime(u64::MAX));

        let report = reconcile(temp_dir.path(), &mut index).unwrap();
        assert!(report.is_empty());
        assert!(index.contains_word("indexed"));
    }

    #[test]
    fn test_reconcile_removes_vanished_notes() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = InvertedIndex::new();
        index.add_document("ghost words", "gone.txt", ModTime(1));

        let report = reconcile(temp_dir.path(), &mut index).unwrap();
        assert_eq!(report.removed, vec!["gone.txt".to_string()]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("a.txt"), "alpha beta").unwrap();
        fs::write(dir.join("b.txt"), "beta gamma").unwrap();
        fs::write(dir.join("c.txt"), "").unwrap();

        let mut index = InvertedIndex::new();
        index.add_document("stale", "old.txt", ModTime(1));
        let first = reconcile(dir, &mut index).unwrap();
        assert_eq!(first.changes(), 4);

        let snapshot = index.clone();
        let second = reconcile(dir, &mut index).unwrap();
        assert!(second.is_empty());
        assert_eq!(index, snapshot);
    }

    #[test]
    fn test_reconcile_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("notes");
        let mut index = InvertedIndex::new();
        assert!(reconcile(&dir, &mut index).unwrap().is_empty());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_reconcile_indexes_pre_epoch_notes() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("good.txt"), "fresh words").unwrap();
        fs::write(dir.join("old.txt"), "ancient words").unwrap();
        set_mtime(&dir.join("old.txt"), UNIX_EPOCH - Duration::from_secs(86_400));

        let mut index = InvertedIndex::new();
        let report = reconcile(dir, &mut index).unwrap();
        assert_eq!(report.added, vec!["good.txt".to_string(), "old.txt".to_string()]);
        assert_eq!(index.mod_time("old.txt"), Some(ModTime(0)));
        assert!(index.contains_word("ancient"));

        assert!(reconcile(dir, &mut index).unwrap().is_empty());
    }

    #[test]
    fn test_incomplete_listing_keeps_unseen_notes() {
        let mut index = InvertedIndex::new();
        index.add_document("still here", "unseen.txt", ModTime(1));

        let discovery = Discovery {
            notes: Vec::new(),
            unreadable: 1,
        };
        let report = apply(discovery, &mut index).unwrap();
        assert!(report.is_empty());
        assert!(index.contains_word("still"));

        let report = apply(Discovery::default(), &mut index).unwrap();
        assert_eq!(report.removed, vec!["unseen.txt".to_string()]);
    }
}
