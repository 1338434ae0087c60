//! Line-oriented text format of the persisted index.
//!
//! ```text
//! nb index 1            header
//! <note id>             ┐ one pair per note
//! <mod time>            ┘
//!                       blank line ends the note list
//! <word>                ┐
//! <note list position>  │ one pair per posting
//! <offset>              │
//!                       ┘ blank line (or end of file) ends the block
//! ```

use crate::core::error::{Error, Result};
use crate::storage::index::{InvertedIndex, ModTime, Posting};
use std::collections::{BTreeMap, HashMap};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::Lines;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const INDEX_HEADER: &str = "nb index 1";

/// Load the index at `path`. A missing file yields an empty index.
pub fn load(path: &Path) -> Result<InvertedIndex> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no index file, starting empty");
            return Ok(InvertedIndex::new());
        }
        Err(e) => return Err(e.into()),
    };

    let index = decode(&text)?;
    debug!(
        notes = index.note_count(),
        words = index.word_count(),
        "loaded index"
    );
    Ok(index)
}

/// Rewrite the index file at `path` in full.
///
/// The new contents go to a temporary file in the same directory which is
/// then renamed over `path`, so readers never observe a partial index.
pub fn save(index: &InvertedIndex, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode(index, &mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    info!(
        path = %path.display(),
        notes = index.note_count(),
        words = index.word_count(),
        "saved index"
    );
    Ok(())
}

pub fn encode<W: Write>(index: &InvertedIndex, out: &mut W) -> Result<()> {
    writeln!(out, "{}", INDEX_HEADER)?;

    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(index.note_count());
    for (position, (note_id, mod_time)) in index.notes().enumerate() {
        positions.insert(note_id, position);
        writeln!(out, "{}\n{}", note_id, mod_time.0)?;
    }
    writeln!(out)?;

    for (word, postings) in index.entries() {
        writeln!(out, "{}", word)?;
        for posting in postings {
            let position = positions.get(posting.note_id.as_str()).ok_or_else(|| {
                Error::Format(format!(
                    "posting for '{}' references unindexed note {}",
                    word, posting.note_id
                ))
            })?;
            writeln!(out, "{}\n{}", position, posting.offset)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn decode(text: &str) -> Result<InvertedIndex> {
    let mut lines = text.lines();

    match lines.next() {
        Some(header) if header == INDEX_HEADER => {}
        Some(header) => {
            return Err(Error::Format(format!(
                "unrecognized index header '{}', expected '{}'",
                header, INDEX_HEADER
            )))
        }
        None => return Err(Error::Format("index file is empty".to_string())),
    }

    let mut note_ids: Vec<String> = Vec::new();
    let mut note_mod_times = BTreeMap::new();
    loop {
        let note_id = match lines.next() {
            Some("") => break,
            Some(id) => id,
            None => return Err(Error::Format("note list is not terminated".to_string())),
        };
        let mod_time = parse_number::<u64>(&mut lines, "modification time")?;
        if note_mod_times.insert(note_id.to_string(), ModTime(mod_time)).is_some() {
            return Err(Error::Format(format!("note {} is listed twice", note_id)));
        }
        note_ids.push(note_id.to_string());
    }

    let mut word_postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
    while let Some(word) = lines.next() {
        if word.is_empty() {
            return Err(Error::Format("expected a word, found a blank line".to_string()));
        }

        let mut postings = Vec::new();
        loop {
            let position = match lines.next() {
                None | Some("") => break,
                Some(line) => parse_line::<usize>(line, "note position")?,
            };
            let note_id = note_ids.get(position).ok_or_else(|| {
                Error::Format(format!(
                    "word '{}' references note position {} of {}",
                    word,
                    position,
                    note_ids.len()
                ))
            })?;
            let offset = parse_number::<usize>(&mut lines, "offset")?;
            postings.push(Posting {
                offset,
                note_id: note_id.clone(),
            });
        }

        if postings.is_empty() {
            return Err(Error::Format(format!("word '{}' has no postings", word)));
        }
        if word_postings.insert(word.to_string(), postings).is_some() {
            return Err(Error::Format(format!("word '{}' is listed twice", word)));
        }
    }

    Ok(InvertedIndex::from_parts(note_mod_times, word_postings))
}

fn parse_number<T: std::str::FromStr>(lines: &mut Lines<'_>, what: &str) -> Result<T> {
    let line = lines
        .next()
        .ok_or_else(|| Error::Format(format!("unexpected end of file, expected {}", what)))?;
    parse_line(line, what)
}

fn parse_line<T: std::str::FromStr>(line: &str, what: &str) -> Result<T> {
    line.parse()
        .map_err(|_| Error::Format(format!("invalid {}: '{}'", what, line)))
}
