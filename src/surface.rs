//! The surface visualizers draw on.
//!
//! A surface holds named overlay elements, each with a rectangle, an opacity
//! and a color. Visualizers only mutate elements they created; the page view
//! composites whatever is on the surface after the page content.

use std::collections::BTreeMap;

use crate::geometry::Rectangle;

/// How an overlay element mixes with the content beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayLayer {
    /// Colors the background only, leaving glyphs readable.
    Tint,
    /// Dims glyphs and background alike.
    Shade,
}

pub trait RenderSurface {
    /// Creates the element if it does not exist yet.
    fn ensure_element(&mut self, id: &str, layer: OverlayLayer);
    fn remove_element(&mut self, id: &str);
    fn set_rect(&mut self, id: &str, rect: Rectangle);
    fn set_opacity(&mut self, id: &str, opacity: f64);
    fn set_color(&mut self, id: &str, color: &str);
    /// Width and height of the viewport, in virtual pixels.
    fn viewport_size(&self) -> (f64, f64);
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayElement {
    pub layer: OverlayLayer,
    pub rect: Rectangle,
    pub opacity: f64,
    pub color: String,
}

impl OverlayElement {
    fn new(layer: OverlayLayer) -> Self {
        Self {
            layer,
            rect: Rectangle::default(),
            opacity: 1.0,
            color: String::from("#000000"),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && !self.rect.is_empty()
    }
}

/// In-memory surface composited onto the terminal buffer each frame.
#[derive(Debug, Clone, Default)]
pub struct OverlaySurface {
    elements: BTreeMap<String, OverlayElement>,
    /// Creation order, so later elements paint on top.
    order: Vec<String>,
    viewport: (f64, f64),
    rect_writes: u64,
}

impl OverlaySurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: (width, height),
            ..Self::default()
        }
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    pub fn element(&self, id: &str) -> Option<&OverlayElement> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in paint order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &OverlayElement)> {
        self.order
            .iter()
            .filter_map(|id| self.elements.get(id).map(|e| (id.as_str(), e)))
    }

    /// Number of geometry updates applied so far.
    pub fn rect_writes(&self) -> u64 {
        self.rect_writes
    }
}

impl RenderSurface for OverlaySurface {
    fn ensure_element(&mut self, id: &str, layer: OverlayLayer) {
        if !self.elements.contains_key(id) {
            self.elements
                .insert(id.to_string(), OverlayElement::new(layer));
            self.order.push(id.to_string());
        }
    }

    fn remove_element(&mut self, id: &str) {
        self.elements.remove(id);
        self.order.retain(|o| o != id);
    }

    fn set_rect(&mut self, id: &str, rect: Rectangle) {
        if let Some(el) = self.elements.get_mut(id) {
            el.rect = rect;
            self.rect_writes += 1;
        }
    }

    fn set_opacity(&mut self, id: &str, opacity: f64) {
        if let Some(el) = self.elements.get_mut(id) {
            el.opacity = opacity;
        }
    }

    fn set_color(&mut self, id: &str, color: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.color = color.to_string();
        }
    }

    fn viewport_size(&self) -> (f64, f64) {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent_and_keeps_order() {
        let mut s = OverlaySurface::new(100.0, 100.0);
        s.ensure_element("a", OverlayLayer::Tint);
        s.ensure_element("b", OverlayLayer::Shade);
        s.set_opacity("a", 0.5);
        s.ensure_element("a", OverlayLayer::Shade);
        assert_eq!(s.len(), 2);
        assert_eq!(s.element("a").unwrap().opacity, 0.5);
        assert_eq!(s.element("a").unwrap().layer, OverlayLayer::Tint);
        let ids: Vec<&str> = s.elements().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn writes_to_missing_elements_are_ignored() {
        let mut s = OverlaySurface::default();
        s.set_rect("ghost", Rectangle::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(s.rect_writes(), 0);
        s.ensure_element("x", OverlayLayer::Tint);
        s.set_rect("x", Rectangle::new(0.0, 0.0, 1.0, 1.0));
        s.remove_element("x");
        assert!(s.is_empty());
        assert_eq!(s.rect_writes(), 1);
    }
}
