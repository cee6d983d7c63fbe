//! Popup for editing the preferences of the current page.

use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem};

use crate::components::{Component, ComponentContext};
use crate::keybindings::{Action, KeyBindings};
use crate::preferences::{COLORS, OPACITY_STEPS, PagePreferences};
use crate::theme;
use crate::ui::UiFrame;
use crate::visualizer::Appearance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRow {
    AddonEnabled,
    SiteEnabled,
    PageEnabled,
    Appearance,
    Color,
    Opacity,
}

impl PanelRow {
    pub const ALL: [PanelRow; 6] = [
        PanelRow::AddonEnabled,
        PanelRow::SiteEnabled,
        PanelRow::PageEnabled,
        PanelRow::Appearance,
        PanelRow::Color,
        PanelRow::Opacity,
    ];
}

/// Edits a copy of the page's preferences. The owner collects finished edits
/// with [`ControlPanel::take_changes`], persists them and broadcasts.
///
/// While the global flag is off every other row is inert.
#[derive(Debug)]
pub struct ControlPanel {
    prefs: PagePreferences,
    selected: usize,
    changed: bool,
    bindings: KeyBindings,
}

impl ControlPanel {
    pub fn new(prefs: PagePreferences) -> Self {
        Self {
            prefs,
            selected: 0,
            changed: false,
            bindings: KeyBindings::default(),
        }
    }

    /// Replaces the edited copy, e.g. after a hotkey changed the store.
    pub fn set_preferences(&mut self, prefs: PagePreferences) {
        self.prefs = prefs;
        self.changed = false;
    }

    pub fn preferences(&self) -> &PagePreferences {
        &self.prefs
    }

    pub fn selected_row(&self) -> PanelRow {
        PanelRow::ALL[self.selected]
    }

    pub fn take_changes(&mut self) -> Option<PagePreferences> {
        if self.changed {
            self.changed = false;
            Some(self.prefs.clone())
        } else {
            None
        }
    }

    fn bump_selection(&mut self, delta: isize) {
        let last = PanelRow::ALL.len() - 1;
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = (self.selected + delta as usize).min(last);
        }
    }

    fn row_active(&self, row: PanelRow) -> bool {
        row == PanelRow::AddonEnabled || self.prefs.addon_enabled
    }

    /// Toggles a flag or steps a choice of the selected row.
    pub fn step_selected(&mut self, step: isize) -> bool {
        let row = self.selected_row();
        if !self.row_active(row) {
            return false;
        }
        let prefs = &mut self.prefs;
        match row {
            PanelRow::AddonEnabled => prefs.addon_enabled = !prefs.addon_enabled,
            PanelRow::SiteEnabled => prefs.site_enabled = !prefs.site_enabled,
            PanelRow::PageEnabled => prefs.page_enabled = !prefs.page_enabled,
            PanelRow::Appearance => {
                let current = Appearance::from_name(&prefs.appearance);
                let index = Appearance::ALL
                    .iter()
                    .position(|a| *a == current)
                    .unwrap_or(0);
                prefs.appearance = Appearance::ALL[cycle(index, step, Appearance::ALL.len())]
                    .name()
                    .to_string();
            }
            PanelRow::Color => {
                let index = COLORS
                    .iter()
                    .position(|c| c.name == prefs.color_name)
                    .unwrap_or(0);
                prefs.color_name = COLORS[cycle(index, step, COLORS.len())].name.to_string();
            }
            PanelRow::Opacity => {
                let index = nearest_step(prefs.opacity);
                let next = (index as isize + step).clamp(0, OPACITY_STEPS.len() as isize - 1);
                prefs.opacity = OPACITY_STEPS[next as usize];
            }
        }
        self.changed = true;
        true
    }

    fn row_label(&self, row: PanelRow) -> String {
        let check = |on: bool| if on { "[x]" } else { "[ ]" };
        let prefs = &self.prefs;
        match row {
            PanelRow::AddonEnabled => format!("{} Ruler on all pages", check(prefs.addon_enabled)),
            PanelRow::SiteEnabled => {
                format!("{} Show on all pages of {}", check(prefs.site_enabled), prefs.host())
            }
            PanelRow::PageEnabled => format!("{} Show on this page", check(prefs.page_enabled)),
            PanelRow::Appearance => format!("    Appearance  < {} >", prefs.appearance),
            PanelRow::Color => format!("    Color       < {} >", prefs.color().name),
            PanelRow::Opacity => format!("    Opacity     < {:.0}% >", prefs.opacity * 100.0),
        }
    }

    /// Centered popup area inside `area`.
    pub fn popup_area(area: Rect) -> Rect {
        let width = area.width.min(56);
        let height = area.height.min(PanelRow::ALL.len() as u16 + 4);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}

fn cycle(index: usize, step: isize, len: usize) -> usize {
    (index as isize + step).rem_euclid(len as isize) as usize
}

fn nearest_step(opacity: f64) -> usize {
    OPACITY_STEPS
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - opacity).abs().total_cmp(&(*b - opacity).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

impl Component for ControlPanel {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        let popup = Self::popup_area(area);
        let style = Style::default().fg(theme::panel_fg()).bg(theme::panel_bg());
        if ctx.overlay() {
            frame.render_widget(Clear, popup);
        }
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(" Reading Ruler ")
            .style(style);
        if ctx.focused() {
            block = block.border_style(Style::default().fg(theme::panel_border()));
        }
        let inner = block.inner(popup);
        frame.render_widget(block, popup);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let mut items: Vec<ListItem> = PanelRow::ALL
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut item_style = style;
                if !self.row_active(*row) {
                    item_style = item_style.add_modifier(Modifier::DIM);
                }
                if i == self.selected {
                    item_style = item_style.add_modifier(Modifier::REVERSED);
                }
                ListItem::new(self.row_label(*row)).style(item_style)
            })
            .collect();
        let hotkeys = self.bindings.combos_for(Action::ToggleAddon).join("/");
        items.push(ListItem::new(""));
        items.push(
            ListItem::new(format!("{hotkeys} toggles the ruler everywhere"))
                .style(style.add_modifier(Modifier::DIM)),
        );
        frame.render_widget(List::new(items), inner);
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        let actions = [
            Action::PanelUp,
            Action::PanelDown,
            Action::PanelToggle,
            Action::PanelNext,
            Action::PanelPrev,
        ];
        match self.bindings.first_match(&actions, key) {
            Some(Action::PanelUp) => {
                self.bump_selection(-1);
                true
            }
            Some(Action::PanelDown) => {
                self.bump_selection(1);
                true
            }
            Some(Action::PanelToggle) | Some(Action::PanelNext) => {
                self.step_selected(1);
                true
            }
            Some(Action::PanelPrev) => {
                self.step_selected(-1);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::buffer::Buffer;

    fn panel() -> ControlPanel {
        let store = PreferenceStore::in_memory();
        ControlPanel::new(PagePreferences::read(&store, "https://example.com/a").unwrap())
    }

    fn press(panel: &mut ControlPanel, code: KeyCode) -> bool {
        panel.handle_event(
            &Event::Key(KeyEvent::new(code, KeyModifiers::NONE)),
            &ComponentContext::new(true),
        )
    }

    #[test]
    fn navigation_is_bounded() {
        let mut p = panel();
        press(&mut p, KeyCode::Up);
        assert_eq!(p.selected_row(), PanelRow::AddonEnabled);
        for _ in 0..10 {
            press(&mut p, KeyCode::Down);
        }
        assert_eq!(p.selected_row(), PanelRow::Opacity);
    }

    #[test]
    fn choices_cycle_and_report_changes() {
        let mut p = panel();
        assert!(p.take_changes().is_none());
        p.selected = 3;
        press(&mut p, KeyCode::Char(' '));
        assert_eq!(p.preferences().appearance, "negative");
        press(&mut p, KeyCode::Right);
        assert_eq!(p.preferences().appearance, "ruler");

        p.selected = 4;
        press(&mut p, KeyCode::Left);
        assert_eq!(p.preferences().color_name, "gray");

        p.selected = 5;
        press(&mut p, KeyCode::Right);
        assert_eq!(p.preferences().opacity, 0.3);
        for _ in 0..20 {
            press(&mut p, KeyCode::Right);
        }
        assert_eq!(p.preferences().opacity, 0.9);

        let changed = p.take_changes().unwrap();
        assert_eq!(changed.opacity, 0.9);
        assert!(p.take_changes().is_none());
    }

    #[test]
    fn rows_are_inert_while_the_addon_is_off() {
        let mut p = panel();
        press(&mut p, KeyCode::Enter);
        assert!(!p.preferences().addon_enabled);
        p.take_changes();
        p.selected = 2;
        assert!(press(&mut p, KeyCode::Enter));
        assert!(p.preferences().page_enabled);
        assert!(p.take_changes().is_none());
    }

    #[test]
    fn renders_a_centered_popup() {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        let mut p = panel();
        {
            let mut frame = UiFrame::from_parts(area, &mut buf);
            p.render(&mut frame, area, &ComponentContext::new(true));
        }
        let popup = ControlPanel::popup_area(area);
        assert_eq!(popup, Rect::new(12, 7, 56, 10));
        let row: String = (popup.x..popup.right())
            .map(|x| buf.cell((x, popup.y + 2)).unwrap().symbol().to_string())
            .collect();
        assert!(row.contains("Show on all pages of example.com"));
    }
}
