use crate::core::config::Config;
use crate::core::error::{Error, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Hands a note file to another program and waits for it to finish
pub trait Launcher {
    fn edit(&mut self, path: &Path) -> Result<()>;
    fn view(&mut self, path: &Path) -> Result<()>;
}

/// Runs the configured editor and pager through the shell, so commands
/// like `code --wait` work as they would when typed.
#[derive(Debug, Clone)]
pub struct ExternalLauncher {
    editor: String,
    pager: String,
}

impl ExternalLauncher {
    pub fn new(editor: impl Into<String>, pager: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
            pager: pager.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.editor.clone(), config.pager.clone())
    }
}

impl Launcher for ExternalLauncher {
    fn edit(&mut self, path: &Path) -> Result<()> {
        run(&self.editor, path)
    }

    fn view(&mut self, path: &Path) -> Result<()> {
        run(&self.pager, path)
    }
}

fn run(command: &str, path: &Path) -> Result<()> {
    debug!(command, path = %path.display(), "launching external command");
    let status = shell(command, path)
        .status()
        .map_err(|e| Error::Editor(format!("failed to run '{}': {}", command, e)))?;
    if !status.success() {
        return Err(Error::Editor(format!("'{}' exited with {}", command, status)));
    }
    Ok(())
}

#[cfg(unix)]
fn shell(command: &str, path: &Path) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(format!("{} \"$1\"", command))
        .arg("nb")
        .arg(path);
    cmd
}

#[cfg(not(unix))]
fn shell(command: &str, path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command).arg(path);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_editor_receives_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a note with spaces.txt");

        let mut launcher = ExternalLauncher::new("touch", "cat");
        launcher.edit(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failing_command_is_editor_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("note.txt");

        let mut launcher = ExternalLauncher::new("false", "exit 3;");
        assert!(matches!(launcher.edit(&path), Err(Error::Editor(_))));
        assert!(matches!(launcher.view(&path), Err(Error::Editor(_))));
    }
}
