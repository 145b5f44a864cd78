//! Keyboard → `Command` translation.
//!
//! One-shot keys (quit, confirm, initials editing) become commands on the
//! press event.  Movement and firing are "held" keys: we remember the frame
//! each key was last pressed or repeated and treat it as down while that is
//! recent enough.  This covers terminals that never send key-release events.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};
use fleet_shooter::entities::{Command, Phase, Steer};

/// A key counts as held if its last press/repeat arrived within this many
/// frames.  The OS key-repeat rate is ≥ 15 Hz, so 8 frames @ 60 FPS
/// (≈133 ms) is refreshed before it expires.
const HOLD_WINDOW: u64 = 8;

/// Min frames between shots while Space is held (≈7.5 shots/sec @ 60 FPS).
pub const SHOOT_COOLDOWN: u32 = 8;

#[derive(Debug, Default)]
pub struct HeldKeys {
    key_frame: HashMap<KeyCode, u64>,
}

impl HeldKeys {
    pub fn press(&mut self, code: KeyCode, frame: u64) {
        self.key_frame.insert(code, frame);
    }

    pub fn release(&mut self, code: KeyCode) {
        self.key_frame.remove(&code);
    }

    pub fn clear(&mut self) {
        self.key_frame.clear();
    }

    fn is_held(&self, code: KeyCode, frame: u64) -> bool {
        self.key_frame
            .get(&code)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    fn any_held(&self, codes: &[KeyCode], frame: u64) -> bool {
        codes.iter().any(|&c| self.is_held(c, frame))
    }

    pub fn steer(&self, frame: u64) -> Steer {
        let left = self.any_held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame);
        let right = self.any_held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame);
        match (left, right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::Idle,
        }
    }

    pub fn firing(&self, frame: u64) -> bool {
        self.is_held(KeyCode::Char(' '), frame)
    }
}

/// Command for a single key press in `phase`, if it means one.
///
/// While initials are being typed every letter is input, so only Esc and
/// Ctrl-C quit there.
pub fn command_for_press(code: KeyCode, modifiers: KeyModifiers, phase: Phase) -> Option<Command> {
    match code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        _ if phase == Phase::EnteringInitials => match code {
            KeyCode::Char(c) => Some(Command::Letter(c)),
            KeyCode::Backspace => Some(Command::Backspace),
            KeyCode::Enter => Some(Command::Submit),
            _ => None,
        },
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        KeyCode::Char(' ') | KeyCode::Enter if phase != Phase::Playing => Some(Command::Confirm),
        _ => None,
    }
}
