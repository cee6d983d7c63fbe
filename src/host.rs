//! Host queries consumed by the ruler core.
//!
//! The core never lays text out itself. It asks the host where the caret
//! would land for a point, what kind of node sits there, and how big the
//! surrounding boxes are. The terminal page in [`crate::page`] is one host;
//! tests provide small fakes.

use std::fmt;

use crate::geometry::Rectangle;
use crate::messages::ContextId;

/// A caret position resolved from a viewport point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Caret<N> {
    pub node: N,
    /// Local caret box; its `y`/`height` describe the line box the caret sits on.
    pub rect: Rectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element(ElementKind),
    Other,
}

/// Element categories the row locator distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Heading,
    Image,
    Video,
    Svg,
    Other,
}

impl ElementKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "hgroup" => ElementKind::Heading,
            "img" => ElementKind::Image,
            "video" => ElementKind::Video,
            "svg" => ElementKind::Svg,
            _ => ElementKind::Other,
        }
    }

    /// Elements hit directly (not through a text position) that get their
    /// whole box highlighted.
    pub fn is_highlight_worthy(self) -> bool {
        !matches!(self, ElementKind::Other)
    }
}

pub trait TextHost {
    type Node: Copy + Eq + fmt::Debug;

    /// Resolves the caret position under a viewport point, if any.
    fn caret_at(&self, x: f64, y: f64) -> Option<Caret<Self::Node>>;

    fn node_kind(&self, node: Self::Node) -> NodeKind;

    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether the element generates a block-level box.
    fn is_block(&self, element: Self::Node) -> bool;

    /// Viewport-relative border box of a node.
    fn bounding_rect(&self, node: Self::Node) -> Rectangle;
}

impl<T: TextHost + ?Sized> TextHost for &T {
    type Node = T::Node;

    fn caret_at(&self, x: f64, y: f64) -> Option<Caret<Self::Node>> {
        (**self).caret_at(x, y)
    }

    fn node_kind(&self, node: Self::Node) -> NodeKind {
        (**self).node_kind(node)
    }

    fn parent_element(&self, node: Self::Node) -> Option<Self::Node> {
        (**self).parent_element(node)
    }

    fn is_block(&self, element: Self::Node) -> bool {
        (**self).is_block(element)
    }

    fn bounding_rect(&self, node: Self::Node) -> Rectangle {
        (**self).bounding_rect(node)
    }
}

/// Identity of an embedded frame element within its hosting page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

/// Padding and border widths on the leading edges of a frame element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    pub padding_left: f64,
    pub padding_top: f64,
    pub border_left: f64,
    pub border_top: f64,
}

impl Insets {
    pub fn left(&self) -> f64 {
        self.padding_left + self.border_left
    }

    pub fn top(&self) -> f64 {
        self.padding_top + self.border_top
    }
}

/// Page-level queries about embedded frame elements.
pub trait FrameHost {
    /// Every frame element currently in the page, in document order.
    fn frame_elements(&self) -> Vec<FrameId>;

    /// The browsing context displayed by a frame element, if it has one.
    fn content_context(&self, frame: FrameId) -> Option<ContextId>;

    /// Viewport-relative border box of the frame element.
    fn frame_rect(&self, frame: FrameId) -> Option<Rectangle>;

    fn frame_insets(&self, frame: FrameId) -> Insets;
}
