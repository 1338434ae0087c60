//! Word tokenizer shared by indexing, search highlighting and autocomplete.
//!
//! A word is a maximal run of characters that are neither whitespace nor
//! punctuation. `#` and `-` count as word characters so tags (`#todo`) and
//! hyphenated words (`follow-up`) survive as single tokens.

use std::str::CharIndices;

/// A lowercased word and where it starts in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub word: String,
    /// Byte offset of the first character in the source text
    pub offset: usize,
    /// Length in bytes of the source run (may differ from `word.len()`)
    pub len: usize,
}

impl Token {
    /// Byte offset just past the end of the source run
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Tokenize `text` lazily
pub fn lex(text: &str) -> Lexer<'_> {
    Lexer {
        text,
        chars: text.char_indices(),
    }
}

/// Iterator over the tokens of a string, see [`lex`]
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    text: &'a str,
    chars: CharIndices<'a>,
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let start = loop {
            let (idx, c) = self.chars.next()?;
            if !is_delimiter(c) {
                break idx;
            }
        };

        let end = loop {
            match self.chars.next() {
                Some((idx, c)) if is_delimiter(c) => break idx,
                Some(_) => continue,
                None => break self.text.len(),
            }
        };

        let run = &self.text[start..end];
        Some(Token {
            word: run.to_lowercase(),
            offset: start,
            len: run.len(),
        })
    }
}

pub fn is_delimiter(c: char) -> bool {
    if c == '#' || c == '-' {
        return false;
    }
    c.is_whitespace() || c.is_ascii_punctuation() || is_general_punctuation(c)
}

// Dashes, quotes, bullets and ellipses from the General Punctuation block.
fn is_general_punctuation(c: char) -> bool {
    matches!(c, '\u{2010}'..='\u{2027}' | '\u{2030}'..='\u{205E}')
}
