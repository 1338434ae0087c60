use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::storage::index::ModTime;
use chrono::{DateTime, Local};
use sha1::{Digest, Sha1};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Time prefix of a note identifier; ':' is not filesystem safe so '-' it is
const ID_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.6f";

/// A freshly written note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub note_id: String,
    pub modified: ModTime,
}

/// Plain-text note files, one per note, named by their identifier
#[derive(Debug, Clone)]
pub struct NoteStore {
    notes_dir: PathBuf,
}

impl NoteStore {
    pub fn new(notes_dir: PathBuf) -> Self {
        Self { notes_dir }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.notes_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.notes_dir
    }

    pub fn path(&self, note_id: &str) -> PathBuf {
        self.notes_dir.join(note_id)
    }

    /// Write `text` to a new note file named after the current local time
    pub fn create(&self, text: &str) -> Result<NewNote> {
        self.create_at(text, Local::now())
    }

    pub fn create_at(&self, text: &str, now: DateTime<Local>) -> Result<NewNote> {
        std::fs::create_dir_all(&self.notes_dir)?;

        let note_id = note_id_for(text, now);
        let path = self.path(&note_id);
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        drop(file);

        info!(note = %note_id, "created note");
        Ok(NewNote {
            modified: ModTime::of_file(&path)?,
            note_id,
        })
    }

    pub fn read(&self, note_id: &str) -> Result<String> {
        let path = self.path(note_id);
        read_text(&path).map_err(|e| missing_or_io(e, path))
    }

    pub fn delete(&self, note_id: &str) -> Result<()> {
        let path = self.path(note_id);
        std::fs::remove_file(&path).map_err(|e| missing_or_io(e, path))?;
        info!(note = %note_id, "deleted note");
        Ok(())
    }

    pub fn mod_time(&self, note_id: &str) -> Result<ModTime> {
        let path = self.path(note_id);
        if !path.exists() {
            return Err(Error::MissingFile(path));
        }
        ModTime::of_file(&path)
    }

    pub fn exists(&self, note_id: &str) -> bool {
        self.path(note_id).is_file()
    }
}

/// `<local time>H<sha1 of text>.txt`; sorting identifiers sorts by creation time
pub fn note_id_for(text: &str, now: DateTime<Local>) -> String {
    let digest = Sha1::digest(text.as_bytes());
    format!("{}H{:x}.txt", now.format(ID_TIME_FORMAT), digest)
}

/// Read a note file, replacing invalid UTF-8 rather than failing
pub fn read_text(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

fn missing_or_io(e: std::io::Error, path: PathBuf) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::MissingFile(path)
    } else {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32, micros: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 9, h, m, s)
            .single()
            .unwrap()
            + chrono::Duration::microseconds(micros as i64)
    }

    #[test]
    fn test_note_id_format() {
        let id = note_id_for("hello", at(7, 5, 3, 42));
        assert_eq!(
            id,
            "2024-03-09T07-05-03.000042Haaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d.txt"
        );
        assert!(!id.contains(':'));
    }

    #[test]
    fn test_note_ids_sort_chronologically() {
        let earlier = note_id_for("zzz", at(9, 59, 59, 999_999));
        let later = note_id_for("aaa", at(10, 0, 0, 0));
        assert!(earlier < later);
    }

    #[test]
    fn test_create_read_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = NoteStore::new(temp_dir.path().join("notes"));

        let note = store.create("buy milk").unwrap();
        assert!(store.exists(&note.note_id));
        assert_eq!(store.read(&note.note_id).unwrap(), "buy milk");
        assert_eq!(store.mod_time(&note.note_id).unwrap(), note.modified);

        store.delete(&note.note_id).unwrap();
        assert!(!store.exists(&note.note_id));
    }

    #[test]
    fn test_missing_note_errors() {
        let temp_dir = TempDir::new().unwrap();
        let store = NoteStore::new(temp_dir.path().to_path_buf());
        assert!(matches!(store.read("nope.txt"), Err(Error::MissingFile(_))));
        assert!(matches!(store.delete("nope.txt"), Err(Error::MissingFile(_))));
        assert!(matches!(store.mod_time("nope.txt"), Err(Error::MissingFile(_))));
    }

    #[test]
    fn test_create_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = NoteStore::new(temp_dir.path().to_path_buf());
        let now = at(12, 0, 0, 0);
        store.create_at("same", now).unwrap();
        assert!(store.create_at("same", now).is_err());
    }

    #[test]
    fn test_read_text_lossy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bin.txt");
        std::fs::write(&path, [b'o', b'k', 0xff]).unwrap();
        assert_eq!(read_text(&path).unwrap(), "ok\u{fffd}");
    }
}
