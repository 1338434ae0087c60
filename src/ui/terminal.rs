use crate::core::error::Result;
use crossterm::cursor;
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};

/// Raw-mode alternate-screen session on stdout.
///
/// The terminal is restored when the session is dropped, whichever way the
/// console loop exits. [`TerminalSession::suspend`] hands the terminal back
/// to a child process and takes it again afterwards.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalSession {
    pub fn acquire() -> Result<Self> {
        enter()?;
        match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => Ok(Self {
                terminal,
                active: true,
            }),
            Err(e) => {
                let _ = leave();
                Err(e.into())
            }
        }
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Restore the normal screen, run `f`, then take the terminal back.
    pub fn suspend<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        leave()?;
        self.active = false;

        let out = f();

        enter()?;
        self.active = true;
        self.terminal.clear()?;
        Ok(out)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.active {
            let _ = leave();
        }
    }
}

fn enter() -> io::Result<()> {
    enter_with(
        enable_raw_mode,
        || execute!(io::stdout(), EnterAlternateScreen),
        disable_raw_mode,
    )
}

// Raw mode is switched back off when the alternate screen cannot be entered.
fn enter_with<R, S, U>(raw_on: R, alternate_screen: S, raw_off: U) -> io::Result<()>
where
    R: FnOnce() -> io::Result<()>,
    S: FnOnce() -> io::Result<()>,
    U: FnOnce() -> io::Result<()>,
{
    raw_on()?;
    if let Err(e) = alternate_screen() {
        let _ = raw_off();
        return Err(e);
    }
    Ok(())
}

fn leave() -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_failed_alternate_screen_leaves_raw_mode() {
        let raw = Cell::new(false);
        let result = enter_with(
            || {
                raw.set(true);
                Ok(())
            },
            || Err(io::Error::new(io::ErrorKind::Other, "no alternate screen")),
            || {
                raw.set(false);
                Ok(())
            },
        );
        assert!(result.is_err());
        assert!(!raw.get());
    }

    #[test]
    fn test_enter_keeps_raw_mode_on_success() {
        let raw = Cell::new(false);
        let result = enter_with(
            || {
                raw.set(true);
                Ok(())
            },
            || Ok(()),
            || {
                raw.set(false);
                Ok(())
            },
        );
        assert!(result.is_ok());
        assert!(raw.get());
    }

    #[test]
    fn test_failed_raw_mode_skips_alternate_screen() {
        let screen = Cell::new(false);
        let result = enter_with(
            || Err(io::Error::new(io::ErrorKind::Other, "not a tty")),
            || {
                screen.set(true);
                Ok(())
            },
            || Ok(()),
        );
        assert!(result.is_err());
        assert!(!screen.get());
    }
}
