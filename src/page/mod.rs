//! A scrollable Markdown page: the host the ruler queries.
//!
//! Geometry handed out by a page is in viewport-relative virtual pixels (see
//! [`CELL_WIDTH_PX`]/[`CELL_HEIGHT_PX`]); the layout itself is in cells.

pub mod document;
pub mod layout;

use ratatui::layout::Rect;

use crate::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::geometry::Rectangle;
use crate::host::{Caret, ElementKind, FrameHost, FrameId, Insets, NodeKind, TextHost};
use crate::messages::ContextId;

pub use document::{Display, Document, NodeData, NodeId, Tag};
pub use layout::{Fragment, Layout, ReplacedBox, TextStyle};

/// Frames draw a one-cell border with one cell of horizontal padding inside.
pub const FRAME_INSETS: Insets = Insets {
    padding_left: CELL_WIDTH_PX,
    padding_top: 0.0,
    border_left: CELL_WIDTH_PX,
    border_top: CELL_HEIGHT_PX,
};

/// Columns left empty on each side of the body.
const BODY_MARGIN_COLS: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameSlot {
    node: NodeId,
    context: ContextId,
}

#[derive(Debug, Clone)]
pub struct Page {
    document: Document,
    layout: Layout,
    cols: u16,
    rows: u16,
    scroll: u16,
    frames: Vec<FrameSlot>,
}

impl Page {
    pub fn new(document: Document, cols: u16, rows: u16) -> Self {
        let mut page = Self {
            document,
            layout: Layout::default(),
            cols,
            rows,
            scroll: 0,
            frames: Vec::new(),
        };
        page.relayout();
        page
    }

    pub fn from_markdown(markdown: &str, cols: u16, rows: u16) -> Self {
        Self::new(Document::parse(markdown), cols, rows)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Viewport size in cells.
    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Viewport size in virtual pixels.
    pub fn viewport_px(&self) -> (f64, f64) {
        (
            f64::from(self.cols) * CELL_WIDTH_PX,
            f64::from(self.rows) * CELL_HEIGHT_PX,
        )
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        let relayout = cols != self.cols;
        self.cols = cols;
        self.rows = rows;
        if relayout {
            self.relayout();
        }
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll
    }

    pub fn max_scroll(&self) -> u16 {
        self.layout.height().saturating_sub(self.rows)
    }

    /// Scrolls by `delta` rows. Returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: i32) -> bool {
        let target = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        let target = target as u16;
        let changed = target != self.scroll;
        self.scroll = target;
        changed
    }

    /// Appends an embedded frame whose content lives in `context`.
    pub fn embed_frame(&mut self, context: ContextId) -> FrameId {
        let node = self.document.append_frame();
        self.frames.push(FrameSlot { node, context });
        self.relayout();
        FrameId(self.frames.len() - 1)
    }

    /// Content box of a frame (inside border and padding), viewport-relative.
    pub fn frame_viewport(&self, frame: FrameId) -> Option<Rectangle> {
        let outer = self.frame_rect(frame)?;
        let insets = self.frame_insets(frame);
        Some(Rectangle::new(
            outer.x + insets.left(),
            outer.y + insets.top(),
            outer.width - 2.0 * insets.left(),
            outer.height - 2.0 * insets.top(),
        ))
    }

    /// Frame whose content box contains the viewport point.
    pub fn frame_at(&self, x: f64, y: f64) -> Option<(FrameId, ContextId)> {
        self.frames.iter().enumerate().find_map(|(i, slot)| {
            let id = FrameId(i);
            let inner = self.frame_viewport(id)?;
            let inside = x >= inner.x && x < inner.right() && y >= inner.y && y < inner.bottom();
            inside.then_some((id, slot.context))
        })
    }

    /// Maps a document cell rectangle to viewport pixels.
    pub fn to_viewport(&self, rect: Rect) -> Rectangle {
        Rectangle::new(
            f64::from(rect.x) * CELL_WIDTH_PX,
            (f64::from(rect.y) - f64::from(self.scroll)) * CELL_HEIGHT_PX,
            f64::from(rect.width) * CELL_WIDTH_PX,
            f64::from(rect.height) * CELL_HEIGHT_PX,
        )
    }

    /// Document rows currently on screen.
    pub fn visible_rows(&self) -> std::ops::Range<u16> {
        self.scroll..self.scroll.saturating_add(self.rows)
    }

    fn relayout(&mut self) {
        let width = self.cols.saturating_sub(2 * BODY_MARGIN_COLS).max(1);
        self.layout = Layout::compute(&self.document, BODY_MARGIN_COLS, width);
    }

    fn cell_at(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        let (width, height) = self.viewport_px();
        if x < 0.0 || y < 0.0 || x >= width || y >= height {
            return None;
        }
        let col = (x / CELL_WIDTH_PX).floor() as u16;
        let row = ((y / CELL_HEIGHT_PX).floor() as u16).checked_add(self.scroll)?;
        Some((col, row))
    }
}

impl TextHost for Page {
    type Node = NodeId;

    /// Replaced boxes answer with themselves. Otherwise the nearest text
    /// fragment on the row whose block spans the column.
    fn caret_at(&self, x: f64, y: f64) -> Option<Caret<NodeId>> {
        let (col, row) = self.cell_at(x, y)?;
        if let Some(b) = self.layout.box_at(col, row) {
            return Some(Caret {
                node: b.node,
                rect: self.to_viewport(b.rect),
            });
        }
        let fragment = self
            .layout
            .fragments_on_row(row)
            .filter(|f| f.node.is_some())
            .filter(|f| {
                self.layout
                    .node_rect(f.block)
                    .is_some_and(|r| col >= r.x && col < r.right())
            })
            .min_by_key(|f| {
                if col < f.x {
                    f.x - col
                } else {
                    col.saturating_sub(f.x + f.width().saturating_sub(1))
                }
            })?;
        let line = self.to_viewport(Rect::new(fragment.x, row, 0, 1));
        Some(Caret {
            node: fragment.node?,
            rect: Rectangle::new(x, line.y, 0.0, line.height),
        })
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        match self.document.node(node).map(|n| &n.data) {
            Some(NodeData::Text(_)) => NodeKind::Text,
            Some(NodeData::Element(tag)) => NodeKind::Element(ElementKind::from_tag(tag.name())),
            _ => NodeKind::Other,
        }
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.document.parent(node)
    }

    fn is_block(&self, element: NodeId) -> bool {
        self.document
            .tag(element)
            .is_some_and(|t| t.display() == Display::Block)
    }

    fn bounding_rect(&self, node: NodeId) -> Rectangle {
        self.layout
            .node_rect(node)
            .map(|r| self.to_viewport(r))
            .unwrap_or_default()
    }
}

impl FrameHost for Page {
    fn frame_elements(&self) -> Vec<FrameId> {
        (0..self.frames.len()).map(FrameId).collect()
    }

    fn content_context(&self, frame: FrameId) -> Option<ContextId> {
        self.frames.get(frame.0).map(|slot| slot.context)
    }

    fn frame_rect(&self, frame: FrameId) -> Option<Rectangle> {
        let slot = self.frames.get(frame.0)?;
        self.layout.node_rect(slot.node).map(|r| self.to_viewport(r))
    }

    fn frame_insets(&self, _frame: FrameId) -> Insets {
        FRAME_INSETS
    }
}
