//! Local terminal helpers shared by the selector and the session runner.

use crossterm::{terminal, tty::IsTty};
use std::io;

/// Whether standard input is attached to an interactive terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_tty()
}

/// Current terminal dimensions as (columns, rows).
pub fn size() -> io::Result<(u16, u16)> {
    terminal::size()
}

/// Scoped ownership of the terminal's raw mode.
///
/// The previous mode is captured when raw mode is enabled and put back by
/// [`RawModeGuard::restore`]. Dropping the guard without calling `restore`
/// also disables raw mode, so a panic never strands the terminal; the
/// normal paths call `restore` so failures are surfaced.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { active: true })
    }

    /// Restore the mode captured by [`RawModeGuard::enter`].
    pub fn restore(mut self) -> io::Result<()> {
        self.active = false;
        terminal::disable_raw_mode()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = terminal::disable_raw_mode();
        }
    }
}
