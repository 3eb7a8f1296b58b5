//! Terminal-independent key presses. Frontends convert their own events into
//! [`KeyPress`] before handing them to the app state.

use tui_textarea::{Input, Key as AreaKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Delete,
    Home,
    End,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn is_interrupt(&self) -> bool {
        self.ctrl && matches!(self.key, Key::Char('c') | Key::Char('C'))
    }

    /// Editing input for a single-line text field. Navigation between fields
    /// (Enter, Tab, Up, Down, Esc) is not forwarded.
    pub fn to_field_input(&self) -> Option<Input> {
        let key = match self.key {
            Key::Char(c) => AreaKey::Char(c),
            Key::Backspace => AreaKey::Backspace,
            Key::Delete => AreaKey::Delete,
            Key::Left => AreaKey::Left,
            Key::Right => AreaKey::Right,
            Key::Home => AreaKey::Home,
            Key::End => AreaKey::End,
            _ => return None,
        };
        Some(Input {
            key,
            ctrl: self.ctrl,
            alt: self.alt,
            shift: self.shift,
        })
    }
}
