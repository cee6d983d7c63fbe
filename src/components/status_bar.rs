use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::preferences::PreferenceSnapshot;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string, truncate_to_width};

use super::{Component, ComponentContext};

/// One-line summary of the file and the ruler settings in effect.
pub struct StatusBar {
    left: String,
    right: String,
    style: Style,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            left: String::new(),
            right: String::new(),
            style: Style::default()
                .fg(theme::status_fg())
                .bg(theme::status_bg()),
        }
    }

    pub fn set_left<T: Into<String>>(&mut self, value: T) {
        self.left = value.into();
    }

    pub fn set_right<T: Into<String>>(&mut self, value: T) {
        self.right = value.into();
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    /// Fills both halves from the file title, the active preferences and a
    /// short key hint.
    pub fn update(&mut self, title: &str, snapshot: &PreferenceSnapshot, color_name: &str, hint: &str) {
        let state = if snapshot.enabled { "on" } else { "off" };
        self.left = format!(
            " {title} | ruler {state} | {} | {color_name} | {:.0}%",
            snapshot.appearance,
            snapshot.opacity * 100.0
        );
        self.right = format!("{hint} ");
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ComponentContext) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        frame.fill(Rect { height: 1, ..area }, self.style);
        let y = area.y;
        let x = area.x;
        let width = area.width as usize;
        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }

        let left = truncate_to_width(&self.left, width);
        safe_set_string(buffer, bounds, x, y, &left, self.style);

        if !self.right.is_empty() {
            let right = truncate_to_width(&self.right, width);
            let right_width = right.chars().count();
            let left_width = left.chars().count();
            // The hint yields to the summary when space runs out.
            if right_width + left_width < width {
                let start_x = x.saturating_add((width - right_width) as u16);
                safe_set_string(buffer, bounds, start_x, y, &right, self.style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn update_summarises_the_snapshot() {
        let mut s = StatusBar::new();
        let snap = PreferenceSnapshot {
            enabled: false,
            opacity: 0.35,
            ..PreferenceSnapshot::default()
        };
        s.update("notes.md", &snap, "yellow", "o: options");
        assert_eq!(s.left(), " notes.md | ruler off | ruler | yellow | 35%");
        assert_eq!(s.right(), "o: options ");
    }

    #[test]
    fn right_side_is_dropped_when_it_would_overlap() {
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        let mut s = StatusBar::new();
        s.set_left("left");
        s.set_right("right");
        {
            let mut frame = UiFrame::from_parts(area, &mut buf);
            s.render(&mut frame, area, &ComponentContext::default());
        }
        let text = row_text(&buf, 0);
        assert!(text.starts_with("left"));
        assert!(text.ends_with("right"));

        s.set_left("a much longer summary");
        let mut buf = Buffer::empty(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut buf);
            s.render(&mut frame, area, &ComponentContext::default());
        }
        assert!(!row_text(&buf, 0).contains("right"));
    }
}
