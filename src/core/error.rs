use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index format error: {0}")]
    Format(String),

    #[error("Unsupported platform: set NB_NOTES_DIR to choose a notes directory")]
    UnsupportedPlatform,

    #[error("Note file is missing: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External command error: {0}")]
    Editor(String),
}

pub type Result<T> = std::result::Result<T, Error>;
