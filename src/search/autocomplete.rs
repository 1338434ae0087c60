//! Prefix completion of the word under the cursor.
//!
//! With the cursor at the end of a word the first candidate is previewed
//! (speculative mode) and Tab splices its remainder in without moving the
//! cursor. That leaves the cursor inside the completed word, so further Tab
//! presses rotate the whole word through the candidates (cycle mode).

use crate::indexing::lexer::{lex, Token};
use crate::storage::index::InvertedIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    Speculative,
    Cycle,
}

/// Completion state for one query/cursor pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub token: Token,
    /// Lowercased text of the token up to the cursor
    pub prefix: String,
    pub mode: CompletionMode,
    /// Vocabulary words extending the prefix, with the token itself last
    /// when the vocabulary does not already hold it
    pub candidates: Vec<String>,
}

/// Result of accepting a completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub query: String,
    pub cursor: usize,
}

/// Completion for the token the cursor sits in or at the end of, if any
pub fn complete(query: &str, cursor: usize, index: &InvertedIndex) -> Option<Completion> {
    let token = lex(query).find(|t| t.offset < cursor && cursor <= t.end())?;
    let mode = if cursor == token.end() {
        CompletionMode::Speculative
    } else {
        CompletionMode::Cycle
    };

    let prefix = query.get(token.offset..cursor)?.to_lowercase();
    let mut candidates: Vec<String> = index
        .words_with_prefix(&prefix)
        .filter(|word| word.len() > prefix.len())
        .map(str::to_string)
        .collect();
    if !candidates.contains(&token.word) {
        candidates.push(token.word.clone());
    }

    Some(Completion {
        token,
        prefix,
        mode,
        candidates,
    })
}

impl Completion {
    /// Text that accepting would insert after the cursor, in speculative mode
    pub fn preview(&self) -> Option<&str> {
        if self.mode != CompletionMode::Speculative {
            return None;
        }
        self.candidates
            .first()
            .and_then(|word| word.get(self.prefix.len()..))
            .filter(|suffix| !suffix.is_empty())
    }

    /// Apply the completion to `query`. The cursor never moves.
    pub fn accept(&self, query: &str, cursor: usize) -> Edit {
        let mut edited = String::with_capacity(query.len() + 16);
        match self.mode {
            CompletionMode::Speculative => {
                edited.push_str(&query[..cursor]);
                edited.push_str(self.preview().unwrap_or_default());
                edited.push_str(&query[cursor..]);
            }
            CompletionMode::Cycle => {
                let next = self
                    .candidates
                    .iter()
                    .position(|word| *word == self.token.word)
                    .map_or(0, |i| (i + 1) % self.candidates.len());
                edited.push_str(&query[..self.token.offset]);
                edited.push_str(&self.candidates[next]);
                edited.push_str(&query[self.token.end()..]);
            }
        }
        Edit {
            query: edited,
            cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::index::ModTime;

    fn index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_document("meeting meetup meet memo", "a", ModTime(1));
        index
    }

    #[test]
    fn test_no_token_at_cursor() {
        let index = index();
        assert!(complete("", 0, &index).is_none());
        assert!(complete("mee ", 4, &index).is_none());
        assert!(complete("mee", 0, &index).is_none());
    }

    #[test]
    fn test_speculative_candidates() {
        let index = index();
        let completion = complete("mee", 3, &index).unwrap();
        assert_eq!(completion.mode, CompletionMode::Speculative);
        assert_eq!(completion.candidates, vec!["meet", "meeting", "meetup", "mee"]);
        assert_eq!(completion.preview(), Some("t"));
    }

    #[test]
    fn test_candidates_always_hold_current_token() {
        let index = index();
        for (query, cursor) in [("xyz", 3), ("meet", 4), ("meeting", 3), ("ME", 2)] {
            let completion = complete(query, cursor, &index).unwrap();
            assert!(completion.candidates.contains(&completion.token.word));
        }
    }

    #[test]
    fn test_exact_word_is_not_duplicated() {
        let index = index();
        let completion = complete("meet", 4, &index).unwrap();
        assert_eq!(completion.candidates, vec!["meeting", "meetup", "meet"]);
    }

    #[test]
    fn test_tab_then_cycle() {
        let index = index();
        let edit = complete("todo mee", 8, &index).unwrap().accept("todo mee", 8);
        assert_eq!(edit, Edit { query: "todo meet".to_string(), cursor: 8 });

        // Cursor is now inside "meet": cycle mode over the words extending "mee".
        let completion = complete(&edit.query, edit.cursor, &index).unwrap();
        assert_eq!(completion.mode, CompletionMode::Cycle);
        assert_eq!(completion.preview(), None);

        let mut query = edit.query;
        let mut seen = Vec::new();
        for _ in 0..4 {
            let completion = complete(&query, 8, &index).unwrap();
            query = completion.accept(&query, 8).query;
            seen.push(query.clone());
        }
        assert_eq!(
            seen,
            vec!["todo meeting", "todo meetup", "todo meet", "todo meeting"]
        );
    }

    #[test]
    fn test_cycle_keeps_surrounding_text() {
        let index = index();
        let completion = complete("a meetup b", 4, &index).unwrap();
        assert_eq!(completion.mode, CompletionMode::Cycle);
        let edit = completion.accept("a meetup b", 4);
        assert_eq!(edit.query, "a memo b");
    }

    #[test]
    fn test_unknown_word_accepts_as_noop() {
        let index = index();
        let completion = complete("zebra", 5, &index).unwrap();
        assert_eq!(completion.candidates, vec!["zebra"]);
        assert_eq!(completion.preview(), None);
        assert_eq!(completion.accept("zebra", 5).query, "zebra");
    }
}
