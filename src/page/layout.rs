//! Block/inline flow of a [`Document`] into terminal cells.
//!
//! Blocks stack vertically and take the full width they are given; inline
//! content word-wraps inside them. Images, rules and frames are replaced
//! boxes. Coordinates are document cells: `x` is a column, `y` a row from the
//! top of the document (scrolling is applied later by the page).

use ratatui::layout::Rect;

use crate::constants::{BLOCK_INDENT_COLS, FRAME_ROWS, IMAGE_ROWS};
use crate::page::document::{Display, Document, NodeData, NodeId, Tag};

/// How a run of text is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Plain,
    Heading,
    Emphasis,
    Strong,
    Strikethrough,
    Code,
    Link,
    /// List bullets and quote bars.
    Marker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Text node this run belongs to; `None` for generated markers.
    pub node: Option<NodeId>,
    /// Nearest block ancestor.
    pub block: NodeId,
    pub x: u16,
    pub y: u16,
    pub text: String,
    pub style: TextStyle,
}

impl Fragment {
    pub fn width(&self) -> u16 {
        self.text.chars().count() as u16
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplacedBox {
    pub node: NodeId,
    pub tag: Tag,
    pub rect: Rect,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    width: u16,
    height: u16,
    fragments: Vec<Fragment>,
    boxes: Vec<ReplacedBox>,
    rects: Vec<Option<Rect>>,
}

impl Layout {
    /// Lays `doc` out into `width` columns starting at column `x`.
    pub fn compute(doc: &Document, x: u16, width: u16) -> Self {
        let mut flow = Flow {
            doc,
            fragments: Vec::new(),
            boxes: Vec::new(),
            rects: vec![None; doc.len()],
            row: 0,
            col: 0,
            pending_space: false,
            line_used: false,
        };
        flow.block(Document::ROOT, x, width.max(1));
        let height = flow.row;
        let mut layout = Self {
            width,
            height,
            fragments: flow.fragments,
            boxes: flow.boxes,
            rects: flow.rects,
        };
        layout.fill_inline_rects(doc);
        layout
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Total document height in rows.
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn boxes(&self) -> &[ReplacedBox] {
        &self.boxes
    }

    pub fn node_rect(&self, id: NodeId) -> Option<Rect> {
        self.rects.get(id).copied().flatten()
    }

    pub fn fragments_on_row(&self, row: u16) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().filter(move |f| f.y == row)
    }

    pub fn box_at(&self, col: u16, row: u16) -> Option<&ReplacedBox> {
        self.boxes.iter().find(|b| {
            col >= b.rect.x && col < b.rect.right() && row >= b.rect.y && row < b.rect.bottom()
        })
    }

    /// Text nodes and inline elements get the union of what they produced.
    fn fill_inline_rects(&mut self, doc: &Document) {
        let placed: Vec<(NodeId, Rect)> = self
            .fragments
            .iter()
            .filter_map(|f| f.node.map(|n| (n, Rect::new(f.x, f.y, f.width().max(1), 1))))
            .chain(self.boxes.iter().map(|b| (b.node, b.rect)))
            .collect();
        for (node, rect) in placed {
            let mut current = Some(node);
            while let Some(id) = current {
                let is_block = doc.tag(id).is_some_and(|t| t.display() == Display::Block);
                if is_block {
                    break;
                }
                if let Some(slot) = self.rects.get_mut(id) {
                    *slot = Some(slot.map_or(rect, |r| r.union(rect)));
                }
                current = doc.parent(id);
            }
        }
    }
}

struct Flow<'a> {
    doc: &'a Document,
    fragments: Vec<Fragment>,
    boxes: Vec<ReplacedBox>,
    rects: Vec<Option<Rect>>,
    row: u16,
    col: u16,
    pending_space: bool,
    line_used: bool,
}

impl Flow<'_> {
    fn block(&mut self, id: NodeId, x: u16, width: u16) {
        let start = self.row;
        let tag = self.doc.tag(id).unwrap_or(Tag::Span);
        match tag {
            Tag::Rule | Tag::Frame => {
                let height = if tag == Tag::Frame { FRAME_ROWS } else { 1 };
                self.replaced(id, tag, Rect::new(x, self.row, width, height));
                self.row = self.row.saturating_add(height);
            }
            Tag::CodeBlock => self.preformatted(id, x, width),
            Tag::BlockQuote => {
                let (inner_x, inner_w) = indent(x, width);
                self.children(id, inner_x, inner_w);
                for row in start..self.row {
                    self.marker(id, x, row, "│");
                }
            }
            Tag::ListItem => {
                let (inner_x, inner_w) = indent(x, width);
                self.marker(id, x, self.row, "•");
                self.children(id, inner_x, inner_w);
                if self.row == start {
                    self.row += 1;
                }
            }
            _ => self.children(id, x, width),
        }
        if let Some(slot) = self.rects.get_mut(id) {
            *slot = Some(Rect::new(x, start, width, self.row - start));
        }
    }

    fn children(&mut self, id: NodeId, x: u16, width: u16) {
        let doc = self.doc;
        let spaced = matches!(doc.tag(id), Some(Tag::Body | Tag::BlockQuote));
        let mut run: Vec<NodeId> = Vec::new();
        let children = doc.children(id);
        for (i, child) in children.iter().enumerate() {
            let is_block = doc
                .tag(*child)
                .is_some_and(|t| t.display() == Display::Block);
            if !is_block {
                run.push(*child);
                continue;
            }
            self.inline_run(&run, x, width);
            run.clear();
            self.block(*child, x, width);
            if spaced && i + 1 < children.len() {
                self.row = self.row.saturating_add(1);
            }
        }
        self.inline_run(&run, x, width);
    }

    fn preformatted(&mut self, id: NodeId, x: u16, width: u16) {
        let text_node = self.doc.children(id).first().copied();
        let content = self.doc.text_content(id);
        for line in content.lines() {
            let text: String = line.chars().take(width as usize).collect();
            if !text.is_empty() {
                self.fragments.push(Fragment {
                    node: text_node,
                    block: id,
                    x,
                    y: self.row,
                    text,
                    style: TextStyle::Code,
                });
            }
            self.row = self.row.saturating_add(1);
        }
    }

    fn inline_run(&mut self, run: &[NodeId], x: u16, width: u16) {
        if run.is_empty() {
            return;
        }
        self.col = x;
        self.pending_space = false;
        self.line_used = false;
        for node in run {
            self.inline(*node, x, width);
        }
        if self.line_used {
            self.row = self.row.saturating_add(1);
        }
        self.line_used = false;
    }

    fn inline(&mut self, id: NodeId, x: u16, width: u16) {
        let doc = self.doc;
        let Some(node) = doc.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => {
                let text = text.replace(['\n', '\t', '\r'], " ");
                let style = self.style_for(id);
                let block = self.block_of(id);
                for (i, word) in text.split(' ').enumerate() {
                    if i > 0 {
                        self.pending_space = true;
                    }
                    if !word.is_empty() {
                        self.word(id, block, word, style, x, width);
                    }
                }
            }
            NodeData::LineBreak => self.newline(x),
            NodeData::Element(Tag::Image) => {
                if self.line_used {
                    self.newline(x);
                }
                let label = self.doc.text_content(id);
                let box_width = (label.chars().count() as u16).saturating_add(4).min(width);
                self.replaced(id, Tag::Image, Rect::new(x, self.row, box_width, IMAGE_ROWS));
                self.row = self.row.saturating_add(IMAGE_ROWS);
                self.col = x;
                self.pending_space = false;
            }
            NodeData::Element(_) => {
                for child in &node.children {
                    self.inline(*child, x, width);
                }
            }
        }
    }

    fn word(&mut self, id: NodeId, block: NodeId, word: &str, style: TextStyle, x: u16, width: u16) {
        let right = x.saturating_add(width);
        let len = word.chars().count() as u16;
        let mut gap = u16::from(self.pending_space && self.col > x);
        if self.col > x && self.col + gap + len > right {
            self.newline(x);
            gap = 0;
        }
        self.col += gap;
        self.pending_space = false;

        let mut rest: Vec<char> = word.chars().collect();
        while !rest.is_empty() {
            if self.col >= right {
                self.newline(x);
            }
            let take = usize::from(right - self.col).min(rest.len());
            let chunk: String = rest.drain(..take).collect();
            self.fragments.push(Fragment {
                node: Some(id),
                block,
                x: self.col,
                y: self.row,
                text: chunk,
                style,
            });
            self.col += take as u16;
            self.line_used = true;
        }
    }

    fn newline(&mut self, x: u16) {
        self.row = self.row.saturating_add(1);
        self.col = x;
        self.pending_space = false;
        self.line_used = false;
    }

    fn marker(&mut self, owner: NodeId, x: u16, y: u16, symbol: &str) {
        self.fragments.push(Fragment {
            node: None,
            block: owner,
            x,
            y,
            text: symbol.to_string(),
            style: TextStyle::Marker,
        });
    }

    fn replaced(&mut self, id: NodeId, tag: Tag, rect: Rect) {
        let label = match tag {
            Tag::Image => format!("[{}]", self.doc.text_content(id)),
            _ => String::new(),
        };
        self.boxes.push(ReplacedBox {
            node: id,
            tag,
            rect,
            label,
        });
    }

    fn block_of(&self, id: NodeId) -> NodeId {
        self.doc
            .closest(id, |t| t.display() == Display::Block)
            .unwrap_or(Document::ROOT)
    }

    fn style_for(&self, id: NodeId) -> TextStyle {
        let doc = self.doc;
        if doc.closest(id, |t| t == Tag::Code).is_some() {
            TextStyle::Code
        } else if doc.closest(id, |t| matches!(t, Tag::Heading(_))).is_some() {
            TextStyle::Heading
        } else if doc.closest(id, |t| t == Tag::Link).is_some() {
            TextStyle::Link
        } else if doc.closest(id, |t| t == Tag::Strong).is_some() {
            TextStyle::Strong
        } else if doc.closest(id, |t| t == Tag::Emphasis).is_some() {
            TextStyle::Emphasis
        } else if doc.closest(id, |t| t == Tag::Strikethrough).is_some() {
            TextStyle::Strikethrough
        } else {
            TextStyle::Plain
        }
    }
}

fn indent(x: u16, width: u16) -> (u16, u16) {
    let step = BLOCK_INDENT_COLS.min(width.saturating_sub(1));
    (x + step, width - step)
}
