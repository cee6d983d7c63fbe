//! Raw keyboard event cleanup before anything routes on them.
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

/// Filters key releases (and Windows repeats) and strips the redundant
/// SHIFT some terminals report alongside an uppercase character, so
/// bindings can match on the character alone.
#[derive(Debug, Default)]
pub struct KeyboardNormalizer {
    esc_down: bool,
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(mut key) = evt else {
            return Some(evt);
        };
        if let KeyCode::Char(c) = key.code
            && c.is_uppercase()
        {
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        if cfg!(windows) {
            match key.kind {
                KeyEventKind::Release => {
                    if key.code == KeyCode::Esc {
                        self.esc_down = false;
                    }
                    return None;
                }
                KeyEventKind::Repeat => return None,
                KeyEventKind::Press => {}
            }
            // Windows reports a held Esc as a stream of presses.
            if key.code == KeyCode::Esc {
                if self.esc_down {
                    return None;
                }
                self.esc_down = true;
            } else {
                self.esc_down = false;
            }
        } else if key.kind == KeyEventKind::Release {
            return None;
        }
        Some(Event::Key(key))
    }
}
