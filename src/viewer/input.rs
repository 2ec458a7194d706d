//! Input processing layer: key → action mapping.
//!
//! Pure logic, no I/O. Printable keys edit the text, so every command is
//! behind a modifier or a non-printing key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions produced by key input processing.
pub(super) enum Action {
    Quit,
    Insert(char),
    Backspace,
    /// Ctrl+U: clear the whole text field.
    ClearText,
    /// Ctrl+L: L → M → Q → H → L.
    CycleLevel,
    /// Tab: switch between auto and manual size.
    ToggleSizeMode,
    /// Up/Down: step the manual size.
    SizeUp,
    SizeDown,
    /// Ctrl+Y: copy the share permalink via OSC 52.
    CopyPermalink,
    /// Ctrl+S: write the current bitmap to the save path.
    SavePng,
    /// Ctrl+O: open the last saved PNG with the system viewer.
    OpenPng,
}

/// Map a key event to an `Action`. Returns `None` for unbound keys.
pub(super) fn map_key_event(key: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = key;

    match (code, modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),

        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Some(Action::ClearText),
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Some(Action::CycleLevel),
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => Some(Action::CopyPermalink),
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => Some(Action::SavePng),
        (KeyCode::Char('o'), KeyModifiers::CONTROL) => Some(Action::OpenPng),

        (KeyCode::Tab, _) => Some(Action::ToggleSizeMode),
        (KeyCode::Up, _) => Some(Action::SizeUp),
        (KeyCode::Down, _) => Some(Action::SizeDown),
        (KeyCode::Backspace, _) => Some(Action::Backspace),

        // Text entry last, so modified chords above never fall through here.
        (KeyCode::Char(c), m) if m.is_empty() || m == KeyModifiers::SHIFT => {
            Some(Action::Insert(c))
        }

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent { code, modifiers, kind: KeyEventKind::Press, state: KeyEventState::NONE }
    }

    fn simple_key(code: KeyCode) -> KeyEvent {
        key(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_plain_char_inserts() {
        let a = map_key_event(simple_key(KeyCode::Char('h')));
        assert!(matches!(a, Some(Action::Insert('h'))));
    }

    #[test]
    fn test_shifted_char_inserts() {
        let a = map_key_event(key(KeyCode::Char('H'), KeyModifiers::SHIFT));
        assert!(matches!(a, Some(Action::Insert('H'))));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let a = map_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(a, Some(Action::Quit)));
    }

    #[test]
    fn test_esc_quits() {
        let a = map_key_event(simple_key(KeyCode::Esc));
        assert!(matches!(a, Some(Action::Quit)));
    }

    #[test]
    fn test_ctrl_l_cycles_level_not_insert() {
        let a = map_key_event(key(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(matches!(a, Some(Action::CycleLevel)));
    }

    #[test]
    fn test_plain_l_inserts() {
        let a = map_key_event(simple_key(KeyCode::Char('l')));
        assert!(matches!(a, Some(Action::Insert('l'))));
    }

    #[test]
    fn test_tab_toggles_mode() {
        let a = map_key_event(simple_key(KeyCode::Tab));
        assert!(matches!(a, Some(Action::ToggleSizeMode)));
    }

    #[test]
    fn test_arrows_step_size() {
        assert!(matches!(map_key_event(simple_key(KeyCode::Up)), Some(Action::SizeUp)));
        assert!(matches!(map_key_event(simple_key(KeyCode::Down)), Some(Action::SizeDown)));
    }

    #[test]
    fn test_backspace() {
        let a = map_key_event(simple_key(KeyCode::Backspace));
        assert!(matches!(a, Some(Action::Backspace)));
    }

    #[test]
    fn test_ctrl_y_copies_permalink() {
        let a = map_key_event(key(KeyCode::Char('y'), KeyModifiers::CONTROL));
        assert!(matches!(a, Some(Action::CopyPermalink)));
    }

    #[test]
    fn test_alt_char_unbound() {
        let a = map_key_event(key(KeyCode::Char('x'), KeyModifiers::ALT));
        assert!(a.is_none());
    }

    #[test]
    fn test_function_key_unbound() {
        let a = map_key_event(simple_key(KeyCode::F(5)));
        assert!(a.is_none());
    }
}
