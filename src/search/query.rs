use crate::storage::index::InvertedIndex;
use std::collections::BTreeSet;

/// Number of notes shown for an empty query
pub const LATEST_NOTES_LIMIT: usize = 30;

/// Query terms: fragments between single spaces, lowercased like indexed words
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split(' ')
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Notes containing every term of `query`.
///
/// An empty query yields the most recently created notes instead.
pub fn search(query: &str, index: &InvertedIndex) -> BTreeSet<String> {
    let terms = query_terms(query);
    if terms.is_empty() {
        return latest_notes(index, LATEST_NOTES_LIMIT);
    }

    let mut terms = terms.iter();
    let Some(mut matches) = terms.next().and_then(|term| notes_with(index, term)) else {
        return BTreeSet::new();
    };

    for term in terms {
        if matches.is_empty() {
            break;
        }
        let Some(found) = notes_with(index, term) else {
            return BTreeSet::new();
        };
        matches.retain(|note_id| found.contains(note_id));
    }
    matches
}

/// The `limit` greatest note identifiers, which are the newest notes
pub fn latest_notes(index: &InvertedIndex, limit: usize) -> BTreeSet<String> {
    index
        .notes()
        .rev()
        .take(limit)
        .map(|(id, _)| id.to_string())
        .collect()
}

/// Sort results for display, newest first
pub fn newest_first(results: BTreeSet<String>) -> Vec<String> {
    results.into_iter().rev().collect()
}

fn notes_with(index: &InvertedIndex, word: &str) -> Option<BTreeSet<String>> {
    index
        .postings(word)
        .map(|postings| postings.iter().map(|p| p.note_id.clone()).collect())
}
