mod view;

use crate::core::error::{Error, Result};
use crate::search::autocomplete::{complete, Completion};
use crate::search::query::{newest_first, search};
use crate::storage::codec;
use crate::storage::index::InvertedIndex;
use crate::storage::notes::NoteStore;
use crate::ui::launcher::Launcher;
use crate::ui::terminal::TerminalSession;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use tracing::{debug, warn};

pub use view::{highlight_segments, viewport, Window};

/// Which keys the console is listening for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    /// A result was chosen with Enter; next key picks edit, view or delete
    EditSubmenu,
}

/// Side effect requested by a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Create(String),
    Edit(String),
    View(String),
    Delete(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A search hit with its content loaded for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub note_id: String,
    pub text: String,
}

/// Interactive search-as-you-type console.
///
/// `selection == 0` is the "new note" row (the query line); result `i` is
/// at `selection == i + 1`.
pub struct Console<L: Launcher> {
    store: NoteStore,
    index: InvertedIndex,
    index_path: PathBuf,
    launcher: L,

    query: String,
    /// Byte offset into `query`, always on a char boundary
    cursor: usize,
    selection: usize,
    mode: Mode,

    results: Vec<ResultEntry>,
    completion: Option<Completion>,
    status: Option<String>,
    created: Option<String>,
}

impl<L: Launcher> Console<L> {
    pub fn new(
        store: NoteStore,
        index: InvertedIndex,
        index_path: PathBuf,
        launcher: L,
        query: String,
    ) -> Self {
        let mut console = Self {
            store,
            index,
            index_path,
            launcher,
            cursor: query.len(),
            query,
            selection: 0,
            mode: Mode::Browsing,
            results: Vec::new(),
            completion: None,
            status: None,
            created: None,
        };
        console.refresh();
        console
    }

    /// Run until Escape or until a note is created
    pub fn run(&mut self, session: &mut TerminalSession) -> Result<()> {
        loop {
            session.draw(|f| view::render(f, self))?;

            let key = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                _ => continue,
            };

            let flow = match self.handle_key(key) {
                action @ (Action::Edit(_) | Action::View(_)) => {
                    session.suspend(|| self.apply(action))??
                }
                action => self.apply(action)?,
            };
            if flow == Flow::Exit {
                return Ok(());
            }
            self.refresh();
        }
    }

    /// Handle one key press without a terminal
    pub fn step(&mut self, key: KeyEvent) -> Result<Flow> {
        let action = self.handle_key(key);
        let flow = self.apply(action)?;
        if flow == Flow::Continue {
            self.refresh();
        }
        Ok(flow)
    }

    /// Update query, cursor and selection state for `key`
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return Action::Quit;
        }
        self.status = None;

        match self.mode {
            Mode::EditSubmenu => {
                self.mode = Mode::Browsing;
                let Some(note_id) = self.selected().map(|entry| entry.note_id.clone()) else {
                    return Action::None;
                };
                match key.code {
                    KeyCode::Enter | KeyCode::Char('e') => Action::Edit(note_id),
                    KeyCode::Char('v') => Action::View(note_id),
                    KeyCode::Char('d') => Action::Delete(note_id),
                    _ => Action::None,
                }
            }
            Mode::Browsing => self.handle_browsing_key(key, ctrl),
        }
    }

    fn handle_browsing_key(&mut self, key: KeyEvent, ctrl: bool) -> Action {
        match key.code {
            KeyCode::Enter if self.selection == 0 => {
                if !self.query.is_empty() {
                    return Action::Create(self.query.clone());
                }
            }
            KeyCode::Enter => {
                if self.selected().is_some() {
                    self.mode = Mode::EditSubmenu;
                }
            }
            KeyCode::Tab => {
                if let Some(completion) = &self.completion {
                    let edit = completion.accept(&self.query, self.cursor);
                    self.query = edit.query;
                    self.cursor = edit.cursor;
                }
            }
            KeyCode::Left => self.cursor = prev_boundary(&self.query, self.cursor),
            KeyCode::Right => self.cursor = next_boundary(&self.query, self.cursor),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.query.len(),
            KeyCode::Up => self.selection = self.selection.saturating_sub(1),
            KeyCode::Down => self.selection += 1,
            KeyCode::Backspace if self.cursor > 0 => {
                let start = prev_boundary(&self.query, self.cursor);
                self.query.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.query.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            _ => {}
        }
        Action::None
    }

    /// Carry out `action` against the notes directory and the index
    pub fn apply(&mut self, action: Action) -> Result<Flow> {
        match action {
            Action::None => {}
            Action::Quit => return Ok(Flow::Exit),
            Action::Create(text) => {
                let note = self.store.create(&text)?;
                self.index.add_document(&text, &note.note_id, note.modified);
                self.save()?;
                self.created = Some(note.note_id);
                return Ok(Flow::Exit);
            }
            Action::Edit(note_id) => self.edit_note(&note_id)?,
            Action::View(note_id) => self.view_note(&note_id)?,
            Action::Delete(note_id) => self.delete_note(&note_id)?,
        }
        Ok(Flow::Continue)
    }

    fn edit_note(&mut self, note_id: &str) -> Result<()> {
        let path = self.store.path(note_id);
        if !path.is_file() {
            debug!(note = %note_id, "edit target is gone");
            return Ok(());
        }

        self.index.remove_document(note_id);
        let launched = self.launcher.edit(&path);
        self.absorb(launched)?;

        match self.store.read(note_id) {
            Ok(text) => {
                let modified = self.store.mod_time(note_id)?;
                self.index.add_document(&text, note_id, modified);
            }
            Err(Error::MissingFile(_)) => debug!(note = %note_id, "note removed while editing"),
            Err(e) => return Err(e),
        }
        self.save()
    }

    fn view_note(&mut self, note_id: &str) -> Result<()> {
        let path = self.store.path(note_id);
        if !path.is_file() {
            debug!(note = %note_id, "view target is gone");
            return Ok(());
        }
        let launched = self.launcher.view(&path);
        self.absorb(launched)
    }

    fn delete_note(&mut self, note_id: &str) -> Result<()> {
        match self.store.delete(note_id) {
            Ok(()) | Err(Error::MissingFile(_)) => {}
            Err(e) => return Err(e),
        }
        self.index.remove_document(note_id);
        self.save()
    }

    // A failed editor or pager is reported in the footer, not fatal.
    fn absorb(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(Error::Editor(msg)) => {
                warn!("{}", msg);
                self.status = Some(msg);
                Ok(())
            }
            other => other,
        }
    }

    fn save(&self) -> Result<()> {
        codec::save(&self.index, &self.index_path)
    }

    /// Recompute completion and results for the current query
    pub fn refresh(&mut self) {
        self.completion = complete(&self.query, self.cursor, &self.index);

        let mut results = Vec::new();
        for note_id in newest_first(search(&self.query, &self.index)) {
            match self.store.read(&note_id) {
                Ok(text) => results.push(ResultEntry { note_id, text }),
                Err(Error::MissingFile(_)) => {}
                Err(e) => warn!(note = %note_id, "failed to read note: {}", e),
            }
        }
        self.results = results;

        self.selection = self.selection.min(self.results.len());
        if self.selection == 0 {
            self.mode = Mode::Browsing;
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }

    pub fn selected(&self) -> Option<&ResultEntry> {
        self.selection.checked_sub(1).and_then(|i| self.results.get(i))
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Identifier of the note created before the console exited, if any
    pub fn created(&self) -> Option<&str> {
        self.created.as_deref()
    }
}

fn prev_boundary(s: &str, i: usize) -> usize {
    s[..i].char_indices().next_back().map_or(0, |(idx, _)| idx)
}

fn next_boundary(s: &str, i: usize) -> usize {
    s[i..].chars().next().map_or(i, |c| i + c.len_utf8())
}
