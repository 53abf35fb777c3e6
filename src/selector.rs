//! Interactive arrow-key profile selector.
//!
//! Owns the terminal's raw key-capture mode for the duration of one
//! [`select`] call and releases it on every exit path, including the
//! empty-list case. The cursor state machine is kept separate from the
//! terminal I/O so the clamping rules can be tested without a TTY.

use crate::log_debug;
use crate::store::Profile;
use crate::term::{self, RawModeGuard};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

const SELECT_COLOR: &str = "\x1B[1;31m";
const UNSELECT_COLOR: &str = "\x1B[1;34m";
const RESET_COLOR: &str = "\x1B[0m";
const MARKER: char = '▶';

#[derive(Debug)]
pub enum SelectorError {
    /// Raw key capture could not be acquired (e.g. stdin is not a terminal).
    TerminalUnavailable,
    IoError(io::Error),
}

impl std::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectorError::TerminalUnavailable => {
                write!(f, "an interactive terminal is required for profile selection")
            }
            SelectorError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for SelectorError {}

impl From<io::Error> for SelectorError {
    fn from(err: io::Error) -> Self {
        SelectorError::IoError(err)
    }
}

/// One selector transition, decoded from a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorKey {
    Up,
    Down,
    Confirm,
    Cancel,
    Other,
}

/// Cursor over a fixed-length profile list, clamped to `[0, len-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SelectionState {
    len: usize,
    cursor: usize,
}

impl SelectionState {
    pub(crate) fn new(len: usize) -> Self {
        Self { len, cursor: 0 }
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply one key, clamping at the list boundaries (never wraps).
    pub(crate) fn apply(&mut self, key: SelectorKey) {
        match key {
            SelectorKey::Up => self.cursor = self.cursor.saturating_sub(1),
            SelectorKey::Down if self.cursor + 1 < self.len => self.cursor += 1,
            _ => {}
        }
    }
}

/// Let the user pick one profile with the arrow keys.
///
/// Returns `Ok(None)` when the list is empty or the selection is cancelled.
pub fn select(profiles: &[Profile]) -> Result<Option<Profile>, SelectorError> {
    if !term::is_interactive() {
        return Err(SelectorError::TerminalUnavailable);
    }
    let guard = RawModeGuard::enter().map_err(|_| SelectorError::TerminalUnavailable)?;

    let outcome = selection_loop(profiles, &mut io::stdout());

    // Raw mode is released before any outcome is surfaced; a selection
    // error takes precedence over a restore error.
    let restored = guard.restore();
    let selected = outcome?;
    restored?;
    Ok(selected)
}

fn selection_loop(profiles: &[Profile], out: &mut impl Write) -> Result<Option<Profile>, SelectorError> {
    let mut state = SelectionState::new(profiles.len());

    render(out, profiles, &state)?;
    if profiles.is_empty() {
        return Ok(None);
    }

    loop {
        match read_key()? {
            SelectorKey::Confirm => {
                let profile = profiles[state.cursor()].clone();
                log_debug!("Selected profile '{}'", profile.name);
                return Ok(Some(profile));
            }
            SelectorKey::Cancel => {
                log_debug!("Selection cancelled");
                return Ok(None);
            }
            key => state.apply(key),
        }
        render(out, profiles, &state)?;
    }
}

/// Full-screen redraw: clear, reprint every row, mark the cursor row.
fn render(out: &mut impl Write, profiles: &[Profile], state: &SelectionState) -> Result<(), SelectorError> {
    queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    write!(out, "Host profiles  |  Use ↑ ↓ to navigate  |  Enter to connect  |  ESC to quit\r\n")?;

    if profiles.is_empty() {
        write!(out, "\r\nNo profiles saved. Add one with `sshp add`.\r\n")?;
    }

    for (i, profile) in profiles.iter().enumerate() {
        let (color, marker) = if i == state.cursor() {
            (SELECT_COLOR, MARKER)
        } else {
            (UNSELECT_COLOR, ' ')
        };
        write!(out, "\r\n{} {} {} {}", color, marker, profile.summary(), RESET_COLOR)?;
    }

    out.flush()?;
    Ok(())
}

/// Block for the next key press and map it to a selector transition.
fn read_key() -> Result<SelectorKey, SelectorError> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            return Ok(map_key(key));
        }
    }
}

pub(crate) fn map_key(key: KeyEvent) -> SelectorKey {
    match key.code {
        KeyCode::Up => SelectorKey::Up,
        KeyCode::Down => SelectorKey::Down,
        KeyCode::Enter => SelectorKey::Confirm,
        KeyCode::Esc => SelectorKey::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => SelectorKey::Cancel,
        KeyCode::Char('q') => SelectorKey::Cancel,
        _ => SelectorKey::Other,
    }
}

#[cfg(test)]
#[path = "test/selector.rs"]
mod tests;
