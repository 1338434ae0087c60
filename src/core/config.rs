use super::error::{Error, Result};
use std::path::{Path, PathBuf};

const ROOT_DIR_ENV: &str = "NB_NOTES_DIR";
const EDITOR_ENV: &str = "NB_NOTES_EDITOR";
const PAGER_ENV: &str = "NB_NOTES_PAGER";

const DEFAULT_EDITOR: &str = "vi";
const DEFAULT_PAGER: &str = "less";

/// Configuration for nb
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding the notes directory and the index
    pub root_dir: PathBuf,
    /// Directory with one plain-text file per note
    pub notes_dir: PathBuf,
    /// Path to the persisted index
    pub index_path: PathBuf,
    /// Command used to edit a note
    pub editor: String,
    /// Command used to view a note read-only
    pub pager: String,
}

impl Config {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root_dir = resolve_root_dir(&lookup, home)?;
        let mut config = Self::new(root_dir);
        config.editor = first_set(&lookup, &[EDITOR_ENV, "EDITOR"])
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        config.pager = first_set(&lookup, &[PAGER_ENV, "PAGER"])
            .unwrap_or_else(|| DEFAULT_PAGER.to_string());
        Ok(config)
    }

    /// Create a configuration rooted at `root_dir` with default commands
    pub fn new(root_dir: PathBuf) -> Self {
        Self {
            notes_dir: root_dir.join("notes"),
            index_path: root_dir.join("index.txt"),
            root_dir,
            editor: DEFAULT_EDITOR.to_string(),
            pager: DEFAULT_PAGER.to_string(),
        }
    }

    /// Create the notes directory (and the root) if needed
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.notes_dir)?;
        Ok(())
    }
}

fn first_set<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
}

fn resolve_root_dir<F>(lookup: &F, home: Option<PathBuf>) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = first_set(lookup, &[ROOT_DIR_ENV]) {
        return Ok(PathBuf::from(dir));
    }

    let home_dir = || {
        home.clone()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
    };

    if cfg!(target_os = "macos") {
        return Ok(home_dir()?.join("Documents").join("nbnotes"));
    }
    if cfg!(unix) {
        if let Some(data_home) = first_set(lookup, &["XDG_DATA_HOME"]) {
            return Ok(Path::new(&data_home).join("nbnotes"));
        }
        return Ok(home_dir()?.join(".nbnotes"));
    }

    Err(Error::UnsupportedPlatform)
}
