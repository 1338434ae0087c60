use nbnotes::storage::codec;
use nbnotes::{discover_notes, reconcile, search, Config, InvertedIndex, NoteStore, Result};
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn setup() -> Result<(TempDir, Config, NoteStore)> {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::new(temp_dir.path().join("nbnotes"));
    config.init()?;
    let store = NoteStore::from_config(&config);
    Ok((temp_dir, config, store))
}

#[test]
fn test_created_notes_are_found_after_reload() -> Result<()> {
    let (_temp_dir, config, store) = setup()?;

    let mut index = codec::load(&config.index_path)?;
    assert!(index.is_empty());

    let note = store.create("Buy milk and #groceries")?;
    index.add_document("Buy milk and #groceries", &note.note_id, note.modified);
    codec::save(&index, &config.index_path)?;

    let mut reloaded = codec::load(&config.index_path)?;
    assert!(reconcile(&config.notes_dir, &mut reloaded)?.is_empty());
    assert_eq!(reloaded, index);

    let hits = search("#groceries milk", &reloaded);
    assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![note.note_id.clone()]);
    assert!(search("groceries", &reloaded).is_empty());
    assert_eq!(store.read(&note.note_id)?, "Buy milk and #groceries");
    Ok(())
}

#[test]
fn test_reindex_matches_incremental_index() -> Result<()> {
    let (_temp_dir, config, store) = setup()?;

    let mut incremental = InvertedIndex::new();
    for text in ["alpha beta", "beta gamma", ""] {
        let note = store.create(text)?;
        incremental.add_document(text, &note.note_id, note.modified);
    }

    let mut rebuilt = InvertedIndex::new();
    let report = reconcile(&config.notes_dir, &mut rebuilt)?;
    assert_eq!(report.added.len(), 3);
    assert_eq!(rebuilt, incremental);
    assert_eq!(discover_notes(&config.notes_dir)?.notes.len(), 3);
    Ok(())
}

#[test]
fn test_external_changes_are_reconciled() -> Result<()> {
    let (_temp_dir, config, store) = setup()?;

    let mut index = InvertedIndex::new();
    let keep = store.create("alpha beta")?;
    let edit = store.create("beta gamma")?;
    let gone = store.create("gamma delta")?;
    reconcile(&config.notes_dir, &mut index)?;
    codec::save(&index, &config.index_path)?;

    // Another program edits one note, deletes another and adds a third
    let edited = store.path(&edit.note_id);
    fs::write(&edited, "epsilon")?;
    fs::File::options()
        .write(true)
        .open(&edited)?
        .set_modified(SystemTime::now() + Duration::from_secs(60))?;
    store.delete(&gone.note_id)?;
    fs::write(store.path("manual.txt"), "written by hand")?;

    let mut index = codec::load(&config.index_path)?;
    let report = reconcile(&config.notes_dir, &mut index)?;
    assert_eq!(report.added, vec!["manual.txt".to_string()]);
    assert_eq!(report.updated, vec![edit.note_id.clone()]);
    assert_eq!(report.removed, vec![gone.note_id.clone()]);

    assert_eq!(search("beta", &index).into_iter().collect::<Vec<_>>(), vec![keep.note_id]);
    assert!(search("gamma", &index).is_empty());
    assert_eq!(search("epsilon", &index).len(), 1);
    assert_eq!(search("hand", &index).len(), 1);

    let snapshot = index.clone();
    assert!(reconcile(&config.notes_dir, &mut index)?.is_empty());
    assert_eq!(index, snapshot);
    Ok(())
}

#[test]
fn test_deleted_note_is_missing_file() -> Result<()> {
    let (_temp_dir, _config, store) = setup()?;
    let note = store.create("short lived")?;
    store.delete(&note.note_id)?;

    assert!(matches!(store.read(&note.note_id), Err(nbnotes::Error::MissingFile(_))));
    assert!(matches!(store.delete(&note.note_id), Err(nbnotes::Error::MissingFile(_))));
    Ok(())
}
