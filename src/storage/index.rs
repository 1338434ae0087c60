use crate::core::error::Result;
use crate::indexing::lexer::lex;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Last-indexed modification time of a note, in nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ModTime(pub u64);

impl ModTime {
    /// Times before the Unix epoch clamp to zero
    pub fn from_system_time(time: SystemTime) -> Self {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        Self(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
    }

    /// Modification time of the file at `path`
    pub fn of_file(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self::from_system_time(metadata.modified()?))
    }
}

/// One occurrence of a word in a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub offset: usize,
    pub note_id: String,
}

/// Word → postings, plus the modification time each note was indexed at.
///
/// A word key never maps to an empty posting list; autocomplete enumerates
/// the vocabulary straight from the keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    word_postings: BTreeMap<String, Vec<Posting>>,
    note_mod_times: BTreeMap<String, ModTime>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lex `text` and record every token as a posting for `note_id`
    pub fn add_document(&mut self, text: &str, note_id: &str, mod_time: ModTime) {
        for token in lex(text) {
            self.word_postings.entry(token.word).or_default().push(Posting {
                offset: token.offset,
                note_id: note_id.to_string(),
            });
        }
        self.note_mod_times.insert(note_id.to_string(), mod_time);
    }

    /// Drop every posting of `note_id`. Removing an unknown note is a no-op.
    pub fn remove_document(&mut self, note_id: &str) {
        self.word_postings.retain(|_, postings| {
            postings.retain(|p| p.note_id != note_id);
            !postings.is_empty()
        });
        self.note_mod_times.remove(note_id);
    }

    pub fn postings(&self, word: &str) -> Option<&[Posting]> {
        self.word_postings.get(word).map(Vec::as_slice)
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.word_postings.contains_key(word)
    }

    /// Vocabulary in ascending order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.word_postings.keys().map(String::as_str)
    }

    /// Words starting with `prefix`, in ascending order
    pub fn words_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.word_postings
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .map(|(word, _)| word.as_str())
            .take_while(move |word| word.starts_with(prefix))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.word_postings
            .iter()
            .map(|(word, postings)| (word.as_str(), postings.as_slice()))
    }

    pub fn mod_time(&self, note_id: &str) -> Option<ModTime> {
        self.note_mod_times.get(note_id).copied()
    }

    /// Indexed notes in ascending identifier order
    pub fn notes(&self) -> impl DoubleEndedIterator<Item = (&str, ModTime)> {
        self.note_mod_times.iter().map(|(id, time)| (id.as_str(), *time))
    }

    pub fn note_count(&self) -> usize {
        self.note_mod_times.len()
    }

    pub fn word_count(&self) -> usize {
        self.word_postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.note_mod_times.is_empty() && self.word_postings.is_empty()
    }

    // The codec validates note references before calling this.
    pub(crate) fn from_parts(
        note_mod_times: BTreeMap<String, ModTime>,
        word_postings: BTreeMap<String, Vec<Posting>>,
    ) -> Self {
        Self {
            word_postings,
            note_mod_times,
        }
    }
}
