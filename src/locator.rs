//! Maps a viewport point to the rectangle of the text row under it.

use tracing::trace;

use crate::constants::{ANCESTOR_LEVELS, SAMPLE_COUNT, SAMPLE_RADIUS};
use crate::geometry::Rectangle;
use crate::host::{Caret, NodeKind, TextHost};

/// Probe directions for each ring, vertical first since rows stack vertically.
const RING: [(f64, f64); 4] = [(0.0, -1.0), (0.0, 1.0), (-1.0, 0.0), (1.0, 0.0)];

#[derive(Debug, Clone, Copy)]
pub struct RowLocator {
    sample_count: usize,
    sample_radius: f64,
    ancestor_levels: usize,
}

impl Default for RowLocator {
    fn default() -> Self {
        Self::new(SAMPLE_COUNT, SAMPLE_RADIUS, ANCESTOR_LEVELS)
    }
}

impl RowLocator {
    pub fn new(sample_count: usize, sample_radius: f64, ancestor_levels: usize) -> Self {
        Self {
            sample_count: sample_count.max(1),
            sample_radius,
            ancestor_levels,
        }
    }

    /// Finds the rectangle to highlight around `(x, y)`.
    ///
    /// Text hits yield the row's line box stretched to the width of the
    /// enclosing block. Direct element hits yield the element's own box when
    /// the element is highlight-worthy. Everything else yields `None`.
    pub fn locate<H: TextHost + ?Sized>(&self, host: &H, x: f64, y: f64) -> Option<Rectangle> {
        let caret = self.caret_at_or_near(host, x, y)?;
        match host.node_kind(caret.node) {
            NodeKind::Element(kind) if kind.is_highlight_worthy() => {
                Some(host.bounding_rect(caret.node))
            }
            NodeKind::Text => {
                let parent = host.parent_element(caret.node)?;
                let block = self.ancestor_block(host, parent)?;
                let block_rect = host.bounding_rect(block);
                Some(Rectangle::new(
                    block_rect.x,
                    caret.rect.y,
                    block_rect.width,
                    caret.rect.height,
                ))
            }
            _ => None,
        }
    }

    /// Probes the pointer, then rings of compass points around it, and
    /// returns the first caret found.
    fn caret_at_or_near<H: TextHost + ?Sized>(
        &self,
        host: &H,
        x: f64,
        y: f64,
    ) -> Option<Caret<H::Node>> {
        let found = (0..self.sample_count).find_map(|i| {
            let (dx, dy) = self.sample_offset(i);
            host.caret_at(x + dx, y + dy)
        });
        if found.is_none() {
            trace!(x, y, "no caret near pointer");
        }
        found
    }

    fn sample_offset(&self, index: usize) -> (f64, f64) {
        if index == 0 {
            return (0.0, 0.0);
        }
        let ring = ((index - 1) / RING.len() + 1) as f64;
        let (ux, uy) = RING[(index - 1) % RING.len()];
        (
            ux * ring * self.sample_radius,
            uy * ring * self.sample_radius,
        )
    }

    /// Walks up to `ancestor_levels` elements looking for a block box.
    ///
    /// When none is found within the limit the last element reached is
    /// returned even if it is inline. `None` only when the walk runs off the
    /// root.
    fn ancestor_block<H: TextHost + ?Sized>(&self, host: &H, start: H::Node) -> Option<H::Node> {
        let mut element = Some(start);
        for _ in 0..self.ancestor_levels {
            let current = element?;
            if host.is_block(current) {
                return Some(current);
            }
            element = host.parent_element(current);
        }
        element
    }
}
