use ratatui::style::{Color, Modifier, Style};

use crate::page::TextStyle;
use crate::term_color::Rgb;

// Centralized theme colors. Page colors are RGB so overlays can blend into
// them; chrome uses the terminal's named colors.

pub const ACCENT_RGB: Rgb = (200, 100, 0);
pub const PAGE_BG_RGB: Rgb = (250, 250, 245);
pub const PAGE_FG_RGB: Rgb = (40, 40, 40);
const HEADING_RGB: Rgb = (20, 60, 120);
const LINK_RGB: Rgb = (30, 90, 200);
const CODE_BG_RGB: Rgb = (235, 235, 228);
const MARKER_RGB: Rgb = (140, 140, 140);

pub fn rgb_to_color(rgb: Rgb) -> Color {
    crate::term_color::map_rgb_to_color(rgb.0, rgb.1, rgb.2)
}

pub fn accent() -> Color {
    rgb_to_color(ACCENT_RGB)
}

pub fn page_style() -> Style {
    Style::default()
        .fg(rgb_to_color(PAGE_FG_RGB))
        .bg(rgb_to_color(PAGE_BG_RGB))
}

/// Style for a run of flowed text.
pub fn text_style(style: TextStyle) -> Style {
    let base = page_style();
    match style {
        TextStyle::Plain => base,
        TextStyle::Heading => base
            .fg(rgb_to_color(HEADING_RGB))
            .add_modifier(Modifier::BOLD),
        TextStyle::Emphasis => base.add_modifier(Modifier::ITALIC),
        TextStyle::Strong => base.add_modifier(Modifier::BOLD),
        TextStyle::Strikethrough => base.add_modifier(Modifier::CROSSED_OUT),
        TextStyle::Code => base.bg(rgb_to_color(CODE_BG_RGB)),
        TextStyle::Link => base
            .fg(rgb_to_color(LINK_RGB))
            .add_modifier(Modifier::UNDERLINED),
        TextStyle::Marker => base.fg(rgb_to_color(MARKER_RGB)),
    }
}

pub fn replaced_box_style() -> Style {
    page_style().fg(rgb_to_color(MARKER_RGB))
}

// Frames
pub fn frame_border() -> Color {
    Color::DarkGray
}
pub fn frame_title() -> Color {
    accent()
}

// Status bar
pub fn status_bg() -> Color {
    Color::DarkGray
}
pub fn status_fg() -> Color {
    Color::White
}

// Control panel
pub fn panel_bg() -> Color {
    Color::Black
}
pub fn panel_fg() -> Color {
    Color::White
}
pub fn panel_border() -> Color {
    accent()
}

// Debug log
pub fn debug_bg() -> Color {
    Color::Black
}
pub fn debug_fg() -> Color {
    Color::Gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_returns_a_color_variant() {
        match accent() {
            Color::Rgb(_, _, _) | Color::Indexed(_) => {}
            other => panic!("unexpected color variant {other:?}"),
        }
    }

    #[test]
    fn text_styles_keep_the_page_background() {
        let bg = page_style().bg;
        for style in [TextStyle::Plain, TextStyle::Heading, TextStyle::Link] {
            assert_eq!(text_style(style).bg, bg);
        }
        assert_ne!(text_style(TextStyle::Code).bg, bg);
    }
}
