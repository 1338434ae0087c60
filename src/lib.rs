// Core functionality
pub mod core {
    pub mod config;
    pub mod error;
}

// Data storage
pub mod storage {
    pub mod codec;
    pub mod index;
    pub mod notes;
}

// Indexing pipeline
pub mod indexing {
    pub mod discovery;
    pub mod lexer;
    pub mod reconcile;
}

// Search & completion
pub mod search {
    pub mod autocomplete;
    pub mod query;
}

// User interfaces
pub mod ui {
    pub mod cli;
    pub mod console;
    pub mod launcher;
    pub mod terminal;
}

// Re-export commonly used types
pub use core::config::Config;
pub use core::error::{Error, Result};
pub use indexing::discovery::{discover_notes, Discovery};
pub use indexing::lexer::{lex, Token};
pub use indexing::reconcile::{reconcile, ReconcileReport};
pub use search::autocomplete::{complete, Completion, CompletionMode};
pub use search::query::search;
pub use storage::index::{InvertedIndex, ModTime, Posting};
pub use storage::notes::NoteStore;
pub use ui::cli::{Cli, Command};
pub use ui::console::Console;
pub use ui::launcher::{ExternalLauncher, Launcher};
pub use ui::terminal::TerminalSession;
