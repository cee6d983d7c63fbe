use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    /// Flip the global "enabled for all pages" flag.
    ToggleAddon,
    OpenPanel,
    ClosePanel,
    ToggleDebugLog,
    ToggleMouseCapture,
    // Page scrolling
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollHome,
    ScrollEnd,
    // Control panel navigation
    PanelUp,
    PanelDown,
    PanelToggle,
    PanelNext,
    PanelPrev,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::ToggleAddon => "Toggle ruler everywhere",
            Action::OpenPanel => "Open control panel",
            Action::ClosePanel => "Close control panel",
            Action::ToggleDebugLog => "Toggle debug log",
            Action::ToggleMouseCapture => "Toggle mouse capture",
            Action::ScrollUp => "Scroll up",
            Action::ScrollDown => "Scroll down",
            Action::ScrollPageUp => "Scroll page up",
            Action::ScrollPageDown => "Scroll page down",
            Action::ScrollHome => "Scroll to top",
            Action::ScrollEnd => "Scroll to end",
            Action::PanelUp => "Panel up",
            Action::PanelDown => "Panel down",
            Action::PanelToggle => "Toggle / cycle setting",
            Action::PanelNext => "Next value",
            Action::PanelPrev => "Previous value",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::F(n) => format!("F{n}"),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Keys bound to each action. Several actions may share a key (Up scrolls the
/// page or moves the panel cursor); callers check the actions that apply to
/// the current mode.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::plain(KeyCode::Char('q')));
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        kb.add(
            ToggleAddon,
            KeyCombo::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
        );
        kb.add(OpenPanel, KeyCombo::plain(KeyCode::Char('o')));
        kb.add(ClosePanel, KeyCombo::plain(KeyCode::Esc));
        kb.add(ClosePanel, KeyCombo::plain(KeyCode::Char('o')));
        kb.add(ToggleDebugLog, KeyCombo::plain(KeyCode::F(12)));
        kb.add(ToggleMouseCapture, KeyCombo::plain(KeyCode::Char('m')));
        // Scrolling
        kb.add(ScrollUp, KeyCombo::plain(KeyCode::Up));
        kb.add(ScrollUp, KeyCombo::plain(KeyCode::Char('k')));
        kb.add(ScrollDown, KeyCombo::plain(KeyCode::Down));
        kb.add(ScrollDown, KeyCombo::plain(KeyCode::Char('j')));
        kb.add(ScrollPageUp, KeyCombo::plain(KeyCode::PageUp));
        kb.add(ScrollPageDown, KeyCombo::plain(KeyCode::PageDown));
        kb.add(ScrollPageDown, KeyCombo::plain(KeyCode::Char(' ')));
        kb.add(ScrollHome, KeyCombo::plain(KeyCode::Home));
        kb.add(ScrollEnd, KeyCombo::plain(KeyCode::End));
        // Control panel
        kb.add(PanelUp, KeyCombo::plain(KeyCode::Up));
        kb.add(PanelUp, KeyCombo::plain(KeyCode::Char('k')));
        kb.add(PanelDown, KeyCombo::plain(KeyCode::Down));
        kb.add(PanelDown, KeyCombo::plain(KeyCode::Char('j')));
        kb.add(PanelToggle, KeyCombo::plain(KeyCode::Char(' ')));
        kb.add(PanelToggle, KeyCombo::plain(KeyCode::Enter));
        kb.add(PanelNext, KeyCombo::plain(KeyCode::Right));
        kb.add(PanelPrev, KeyCombo::plain(KeyCode::Left));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    /// The first of `actions` bound to `key`, in the order given.
    pub fn first_match(&self, actions: &[Action], key: &KeyEvent) -> Option<Action> {
        actions.iter().copied().find(|a| self.matches(*a, key))
    }

    /// Display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }
}
