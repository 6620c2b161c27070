use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use soundgrid::shared::{BEATS_PER_BAR, InputEvent, NUM_PADS, PadKey};

use super::mode::TuiState;

/// Pad keys in pad order, three rows of four.
pub const PAD_KEYS: [char; NUM_PADS] = ['q', 'w', 'e', 'r', 'a', 's', 'd', 'f', 'z', 'x', 'c', 'v'];

// poll for input from the tui; pad presses also start the pad's flash
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        if let Some(event) = handle_key(key) {
            if let InputEvent::Pad(pad) = event {
                ts.flash(pad, Instant::now());
            }
            return Ok(vec![event]);
        }
    }
    Ok(vec![])
}

fn handle_key(key: KeyEvent) -> Option<InputEvent> {
    // raw mode swallows the signal
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputEvent::Quit);
    }
    let bar = BEATS_PER_BAR as i32;
    let event = match key.code {
        KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char(' ') => InputEvent::TogglePlay,
        KeyCode::Char('b') => InputEvent::ToggleRecord,
        KeyCode::Char('p') => InputEvent::NextPack,

        // tempo, fine and coarse
        KeyCode::Char('-') => InputEvent::AdjustBpm(-1),
        KeyCode::Char('=') => InputEvent::AdjustBpm(1),
        KeyCode::Char('_') => InputEvent::AdjustBpm(-10),
        KeyCode::Char('+') => InputEvent::AdjustBpm(10),

        // timeline editing
        KeyCode::Up => InputEvent::SelectLayer(-1),
        KeyCode::Down => InputEvent::SelectLayer(1),
        KeyCode::Left => InputEvent::SelectNote(-1),
        KeyCode::Right => InputEvent::SelectNote(1),
        KeyCode::Char('[') => InputEvent::NudgeNote(-1),
        KeyCode::Char(']') => InputEvent::NudgeNote(1),
        KeyCode::Char('{') => InputEvent::NudgeNote(-bar),
        KeyCode::Char('}') => InputEvent::NudgeNote(bar),
        KeyCode::Backspace => InputEvent::DeleteNote,
        KeyCode::Delete => InputEvent::DeleteLayer,
        KeyCode::Char('0') => InputEvent::ClearAll,

        KeyCode::Char('k') => InputEvent::SavePack,
        KeyCode::Char('l') => InputEvent::LoadNextSavedPack,
        KeyCode::Char('K') => InputEvent::DeleteSavedPack,

        // lowercase plays the pad, shifted clears its slot
        KeyCode::Char(c) if c.is_ascii_uppercase() => InputEvent::ClearSlot(char_to_pad(c.to_ascii_lowercase())?),
        KeyCode::Char(c) => InputEvent::Pad(char_to_pad(c)?),
        _ => return None,
    };
    Some(event)
}

// convert char to pad
fn char_to_pad(c: char) -> Option<PadKey> {
    let index = PAD_KEYS.iter().position(|&k| k == c)?;
    PadKey::new(index as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn press(code: KeyCode) -> Option<InputEvent> {
        handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn pad(i: u8) -> PadKey {
        PadKey::new(i).unwrap()
    }

    #[test_case('q', 0 ; "top left")]
    #[test_case('r', 3 ; "top right")]
    #[test_case('a', 4 ; "middle row")]
    #[test_case('v', 11 ; "bottom right")]
    fn pad_letters(c: char, index: u8) {
        assert_eq!(press(KeyCode::Char(c)), Some(InputEvent::Pad(pad(index))));
    }

    #[test]
    fn shifted_pads_clear_slots() {
        let shifted = handle_key(KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT));
        assert_eq!(shifted, Some(InputEvent::ClearSlot(pad(5))));
    }

    #[test]
    fn capital_k_is_not_a_pad() {
        assert_eq!(press(KeyCode::Char('K')), Some(InputEvent::DeleteSavedPack));
        assert_eq!(press(KeyCode::Char('k')), Some(InputEvent::SavePack));
    }

    #[test]
    fn transport_and_editing_keys() {
        assert_eq!(press(KeyCode::Char(' ')), Some(InputEvent::TogglePlay));
        assert_eq!(press(KeyCode::Char('+')), Some(InputEvent::AdjustBpm(10)));
        assert_eq!(press(KeyCode::Char('}')), Some(InputEvent::NudgeNote(4)));
        assert_eq!(press(KeyCode::Backspace), Some(InputEvent::DeleteNote));
        assert_eq!(press(KeyCode::Char('0')), Some(InputEvent::ClearAll));
    }

    #[test]
    fn ctrl_c_quits_and_unbound_keys_do_nothing() {
        let ctrl_c = handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(ctrl_c, Some(InputEvent::Quit));
        assert_eq!(press(KeyCode::Char('j')), None);
        assert_eq!(press(KeyCode::Char('J')), None);
        assert_eq!(press(KeyCode::F(5)), None);
    }
}
