//! RGB handling for overlay compositing.
//!
//! Overlay colors arrive as CSS-style hex strings. Compositing works in RGB
//! and only maps back to a terminal color at the very end, using truecolor
//! when the terminal advertises it and the xterm-256 palette otherwise.

use ratatui::style::Color;

pub type Rgb = (u8, u8, u8);

/// Map an RGB triple to a color the current terminal can show.
///
/// `COLORTERM` containing `truecolor` or `24bit` yields `Color::Rgb`;
/// anything else gets the nearest xterm-256 index.
pub fn map_rgb_to_color(r: u8, g: u8, b: u8) -> Color {
    if let Ok(var) = std::env::var("COLORTERM") {
        let lv = var.to_lowercase();
        if lv.contains("truecolor") || lv.contains("24bit") {
            return Color::Rgb(r, g, b);
        }
    }
    Color::Indexed(rgb_to_xterm_index(r, g, b))
}

/// Parses `#rgb` or `#rrggbb` (leading `#` optional).
pub fn parse_hex(value: &str) -> Option<Rgb> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                let v = ch.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some((out[0], out[1], out[2]))
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        }
        _ => None,
    }
}

/// Mixes `over` onto `base`. `alpha` is clamped to `[0, 1]`.
pub fn blend(base: Rgb, over: Rgb, alpha: f64) -> Rgb {
    let a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    let mix = |b: u8, o: u8| -> u8 {
        let v = f64::from(b) * (1.0 - a) + f64::from(o) * a;
        v.round().clamp(0.0, 255.0) as u8
    };
    (mix(base.0, over.0), mix(base.1, over.1), mix(base.2, over.2))
}

/// Best-effort RGB value of a terminal color. `Reset` resolves to `fallback`.
pub fn color_to_rgb(color: Color, fallback: Rgb) -> Rgb {
    match color {
        Color::Reset => fallback,
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Indexed(i) => xterm_index_to_rgb(i),
        Color::Black => (0, 0, 0),
        Color::Red => (205, 0, 0),
        Color::Green => (0, 205, 0),
        Color::Yellow => (205, 205, 0),
        Color::Blue => (0, 0, 238),
        Color::Magenta => (205, 0, 205),
        Color::Cyan => (0, 205, 205),
        Color::Gray => (229, 229, 229),
        Color::DarkGray => (127, 127, 127),
        Color::LightRed => (255, 0, 0),
        Color::LightGreen => (0, 255, 0),
        Color::LightYellow => (255, 255, 0),
        Color::LightBlue => (92, 92, 255),
        Color::LightMagenta => (255, 0, 255),
        Color::LightCyan => (0, 255, 255),
        Color::White => (255, 255, 255),
    }
}

fn xterm_index_to_rgb(idx: u8) -> Rgb {
    match idx {
        0..=15 => color_to_rgb(ANSI_16[idx as usize], (0, 0, 0)),
        16..=231 => {
            let i = idx - 16;
            from_6cube(i / 36, (i / 6) % 6, i % 6)
        }
        _ => from_gray(idx - 232),
    }
}

const ANSI_16: [Color; 16] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Gray,
    Color::DarkGray,
    Color::LightRed,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightMagenta,
    Color::LightCyan,
    Color::White,
];

fn rgb_to_xterm_index(r: u8, g: u8, b: u8) -> u8 {
    let r6 = to_6cube(r);
    let g6 = to_6cube(g);
    let b6 = to_6cube(b);
    let cube_index = 16 + 36 * r6 + 6 * g6 + b6;
    let (cr, cg, cb) = from_6cube(r6, g6, b6);

    let gray_index = rgb_to_gray_index(r, g, b);
    let (gr, gg, gb) = from_gray(gray_index);

    if color_distance_sq((r, g, b), (gr, gg, gb)) < color_distance_sq((r, g, b), (cr, cg, cb)) {
        232 + gray_index
    } else {
        cube_index
    }
}

fn to_6cube(v: u8) -> u8 {
    ((v as u16 * 5 + 127) / 255) as u8
}

fn from_6cube(r6: u8, g6: u8, b6: u8) -> Rgb {
    let conv = |c: u8| match c {
        0 => 0u8,
        1 => 95,
        2 => 135,
        3 => 175,
        4 => 215,
        _ => 255,
    };
    (conv(r6), conv(g6), conv(b6))
}

fn rgb_to_gray_index(r: u8, g: u8, b: u8) -> u8 {
    let avg = (r as u16 + g as u16 + b as u16) / 3;
    ((avg * 23 + 127) / 255) as u8
}

fn from_gray(idx: u8) -> Rgb {
    let v = (8 + idx as u16 * 10).min(255) as u8;
    (v, v, v)
}

fn color_distance_sq(a: Rgb, b: Rgb) -> u32 {
    let d = |x: u8, y: u8| {
        let v = x as i32 - y as i32;
        (v * v) as u32
    };
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(parse_hex("#ffeb3b"), Some((255, 235, 59)));
        assert_eq!(parse_hex("90caf9"), Some((144, 202, 249)));
        assert_eq!(parse_hex("#0f8"), Some((0, 255, 136)));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(parse_hex("#ééé"), None);
    }

    #[test]
    fn blend_interpolates_and_clamps() {
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
        assert_eq!(blend((10, 20, 30), (200, 100, 50), 0.0), (10, 20, 30));
        assert_eq!(blend((10, 20, 30), (200, 100, 50), 7.0), (200, 100, 50));
        assert_eq!(blend((10, 20, 30), (200, 100, 50), f64::NAN), (10, 20, 30));
    }

    #[test]
    fn palette_colors_resolve_to_rgb() {
        assert_eq!(color_to_rgb(Color::Reset, (1, 2, 3)), (1, 2, 3));
        assert_eq!(color_to_rgb(Color::Rgb(4, 5, 6), (0, 0, 0)), (4, 5, 6));
        assert_eq!(color_to_rgb(Color::Indexed(16), (9, 9, 9)), (0, 0, 0));
        assert_eq!(color_to_rgb(Color::Indexed(231), (9, 9, 9)), (255, 255, 255));
        assert_eq!(color_to_rgb(Color::Indexed(15), (9, 9, 9)), (255, 255, 255));
    }

    #[test]
    fn cube_corners_map_back_to_their_index() {
        for idx in [16u8, 21, 46, 196, 226, 231] {
            let (r, g, b) = xterm_index_to_rgb(idx);
            assert_eq!(rgb_to_xterm_index(r, g, b), idx);
        }
    }

    #[test]
    fn map_rgb_to_color_returns_a_concrete_color() {
        match map_rgb_to_color(12, 34, 56) {
            Color::Rgb(_, _, _) | Color::Indexed(_) => {}
            other => panic!("unexpected color {other:?}"),
        }
    }
}
