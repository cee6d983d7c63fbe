//! Paints a page, its embedded frames and the ruler overlay.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::context::BrowsingContext;
use crate::geometry::Rectangle;
use crate::host::FrameHost;
use crate::page::{Page, Tag};
use crate::surface::{OverlayLayer, OverlaySurface};
use crate::term_color::{blend, color_to_rgb, parse_hex};
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

use super::{Component, ComponentContext};

/// Renders the top-level context over the whole area it is given.
pub struct PageView<'a> {
    context: &'a BrowsingContext,
    frames: &'a [BrowsingContext],
}

impl<'a> PageView<'a> {
    pub fn new(context: &'a BrowsingContext, frames: &'a [BrowsingContext]) -> Self {
        Self { context, frames }
    }
}

impl Component for PageView<'_> {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let page = self.context.page();
        paint_page(frame, area, page);

        for frame_id in page.frame_elements() {
            let Some(outer) = page.frame_rect(frame_id) else {
                continue;
            };
            let child = page
                .content_context(frame_id)
                .and_then(|id| self.frames.iter().find(|c| c.id() == id));
            let title = child.map(|c| c.title()).unwrap_or("frame");
            paint_frame_border(frame, area, to_cells(outer), title);

            let (Some(child), Some(inner)) = (child, page.frame_viewport(frame_id)) else {
                continue;
            };
            let (x, y, w, h) = to_cells(inner);
            if w <= 0 || h <= 0 {
                continue;
            }
            let offscreen_area = Rect::new(0, 0, w as u16, h as u16);
            let mut offscreen = Buffer::empty(offscreen_area);
            {
                let mut child_frame = UiFrame::from_parts(offscreen_area, &mut offscreen);
                paint_page(&mut child_frame, offscreen_area, child.page());
            }
            frame.blit_at(
                &offscreen,
                i32::from(area.x) + x,
                i32::from(area.y) + y,
                area,
            );
        }

        if let Some(ruler) = self.context.ruler() {
            composite_overlay(frame, area, ruler.surface());
        }
    }
}

/// Text and replaced boxes of one page, scrolled.
pub fn paint_page(frame: &mut UiFrame<'_>, area: Rect, page: &Page) {
    frame.fill(area, theme::page_style());
    let layout = page.layout();
    let visible = page.visible_rows();
    let scroll = page.scroll_offset();
    let buffer = frame.buffer_mut();
    let bounds = area.intersection(buffer.area);

    for fragment in layout.fragments() {
        if !visible.contains(&fragment.y) {
            continue;
        }
        let x = area.x.saturating_add(fragment.x);
        let y = area.y.saturating_add(fragment.y - scroll);
        safe_set_string(
            buffer,
            bounds,
            x,
            y,
            &fragment.text,
            theme::text_style(fragment.style),
        );
    }

    let box_style = theme::replaced_box_style();
    for b in layout.boxes() {
        match b.tag {
            Tag::Rule => {
                if visible.contains(&b.rect.y) {
                    let line = "─".repeat(b.rect.width as usize);
                    let y = area.y.saturating_add(b.rect.y - scroll);
                    safe_set_string(buffer, bounds, area.x + b.rect.x, y, &line, box_style);
                }
            }
            Tag::Frame => {}
            _ => {
                let cells = (
                    i32::from(b.rect.x),
                    i32::from(b.rect.y) - i32::from(scroll),
                    i32::from(b.rect.width),
                    i32::from(b.rect.height),
                );
                paint_box(buffer, bounds, area, cells, &b.label, box_style);
            }
        }
    }
}

fn paint_frame_border(frame: &mut UiFrame<'_>, area: Rect, cells: (i32, i32, i32, i32), title: &str) {
    let style = theme::page_style().fg(theme::frame_border());
    let buffer = frame.buffer_mut();
    let bounds = area.intersection(buffer.area);
    paint_box(buffer, bounds, area, cells, "", style);
    let (x, y, w, _) = cells;
    let row = i32::from(area.y) + y;
    let col = i32::from(area.x) + x + 2;
    if w > 4 && row >= i32::from(bounds.y) && col >= 0 {
        let label: String = format!(" {title} ").chars().take((w - 4) as usize).collect();
        safe_set_string(
            buffer,
            bounds,
            col as u16,
            row as u16,
            &label,
            style.fg(theme::frame_title()),
        );
    }
}

/// Draws a single-line box at area-relative cells `(x, y, w, h)`, which may
/// start above the area. `label` goes on the first inside row.
fn paint_box(
    buffer: &mut Buffer,
    bounds: Rect,
    area: Rect,
    (x, y, w, h): (i32, i32, i32, i32),
    label: &str,
    style: Style,
) {
    if w < 2 || h < 2 {
        return;
    }
    let inner = (w - 2) as usize;
    let left = i32::from(area.x) + x;
    for dy in 0..h {
        let row = i32::from(area.y) + y + dy;
        if row < i32::from(bounds.y) || row >= i32::from(bounds.bottom()) || left < 0 {
            continue;
        }
        let line = if dy == 0 {
            format!("┌{}┐", "─".repeat(inner))
        } else if dy == h - 1 {
            format!("└{}┘", "─".repeat(inner))
        } else if dy == 1 && !label.is_empty() {
            let text: String = label.chars().take(inner).collect();
            format!("│{text:<inner$}│")
        } else {
            format!("│{}│", " ".repeat(inner))
        };
        safe_set_string(buffer, bounds, left as u16, row as u16, &line, style);
    }
}

/// Blends every visible overlay element into the cells it covers.
///
/// Element rectangles are viewport pixels relative to `area`. A cell is
/// covered when the rectangle spans at least half of it.
pub fn composite_overlay(frame: &mut UiFrame<'_>, area: Rect, surface: &OverlaySurface) {
    let fallback_bg = theme::PAGE_BG_RGB;
    let fallback_fg = theme::PAGE_FG_RGB;
    let buffer = frame.buffer_mut();
    let bounds = area.intersection(buffer.area);
    for (_, element) in surface.elements() {
        if !element.is_visible() {
            continue;
        }
        let Some(rgb) = parse_hex(&element.color) else {
            continue;
        };
        let Some(span) = covered_cells(element.rect, bounds, area) else {
            continue;
        };
        for y in span.y..span.bottom() {
            for x in span.x..span.right() {
                let Some(cell) = buffer.cell_mut((x, y)) else {
                    continue;
                };
                let bg = blend(color_to_rgb(cell.bg, fallback_bg), rgb, element.opacity);
                cell.set_bg(theme::rgb_to_color(bg));
                if element.layer == OverlayLayer::Shade {
                    let fg = blend(color_to_rgb(cell.fg, fallback_fg), rgb, element.opacity);
                    cell.set_fg(theme::rgb_to_color(fg));
                }
            }
        }
    }
}

fn covered_cells(rect: Rectangle, bounds: Rect, area: Rect) -> Option<Rect> {
    let x0 = (rect.x / CELL_WIDTH_PX).round() as i64 + i64::from(area.x);
    let x1 = (rect.right() / CELL_WIDTH_PX).round() as i64 + i64::from(area.x);
    let y0 = (rect.y / CELL_HEIGHT_PX).round() as i64 + i64::from(area.y);
    let y1 = (rect.bottom() / CELL_HEIGHT_PX).round() as i64 + i64::from(area.y);
    let x0 = x0.max(i64::from(bounds.x));
    let y0 = y0.max(i64::from(bounds.y));
    let x1 = x1.min(i64::from(bounds.right()));
    let y1 = y1.min(i64::from(bounds.bottom()));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        x0 as u16,
        y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

/// Viewport pixels to area-relative cells.
fn to_cells(rect: Rectangle) -> (i32, i32, i32, i32) {
    (
        (rect.x / CELL_WIDTH_PX).round() as i32,
        (rect.y / CELL_HEIGHT_PX).round() as i32,
        (rect.width / CELL_WIDTH_PX).round() as i32,
        (rect.height / CELL_HEIGHT_PX).round() as i32,
    )
}
