use crate::constants::{DEFAULT_OPACITY, ELEMENT_PREFIX};
use crate::geometry::Rectangle;
use crate::preferences::COLORS;
use crate::surface::{OverlayLayer, RenderSurface};

/// A single colored band over the active row.
#[derive(Debug, Clone)]
pub struct HighlightVisualizer {
    id: String,
    opacity: f64,
    visible: bool,
}

impl Default for HighlightVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightVisualizer {
    pub fn new() -> Self {
        Self {
            id: format!("{ELEMENT_PREFIX}ruler"),
            opacity: DEFAULT_OPACITY,
            visible: true,
        }
    }

    pub fn element_id(&self) -> &str {
        &self.id
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn attach<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.ensure_element(&self.id, OverlayLayer::Tint);
        surface.set_color(&self.id, COLORS[0].hex);
        self.visible = true;
        self.hide(surface);
    }

    pub fn detach<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.remove_element(&self.id);
    }

    pub fn show<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        if !self.visible {
            surface.set_opacity(&self.id, self.opacity);
            self.visible = true;
        }
    }

    pub fn hide<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.visible {
            surface.set_opacity(&self.id, 0.0);
            self.visible = false;
        }
    }

    /// Same as `hide` for this variant.
    pub fn stash<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        self.hide(surface);
    }

    pub fn set_color<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, color: &str) {
        surface.set_color(&self.id, color);
    }

    pub fn set_opacity<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, opacity: f64) {
        self.opacity = opacity;
        if self.visible {
            surface.set_opacity(&self.id, opacity);
        }
    }

    pub fn position<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, rect: Rectangle) {
        surface.set_rect(&self.id, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::OverlaySurface;

    fn attached() -> (HighlightVisualizer, OverlaySurface) {
        let mut surface = OverlaySurface::new(640.0, 480.0);
        let mut v = HighlightVisualizer::new();
        v.attach(&mut surface);
        (v, surface)
    }

    #[test]
    fn attaches_hidden() {
        let (v, surface) = attached();
        assert!(!v.is_visible());
        assert_eq!(surface.element(v.element_id()).unwrap().opacity, 0.0);
    }

    #[test]
    fn show_uses_configured_opacity_and_hide_zeroes_it() {
        let (mut v, mut surface) = attached();
        v.set_opacity(&mut surface, 0.4);
        // Still hidden: the new opacity waits for show().
        assert_eq!(surface.element(v.element_id()).unwrap().opacity, 0.0);
        v.show(&mut surface);
        assert_eq!(surface.element(v.element_id()).unwrap().opacity, 0.4);
        v.stash(&mut surface);
        assert_eq!(surface.element(v.element_id()).unwrap().opacity, 0.0);
    }

    #[test]
    fn position_and_color_write_through() {
        let (mut v, mut surface) = attached();
        let rect = Rectangle::new(-4.0, 46.0, 308.0, 22.0);
        v.position(&mut surface, rect);
        v.set_color(&mut surface, "#90caf9");
        let el = surface.element(v.element_id()).unwrap();
        assert_eq!(el.rect, rect);
        assert_eq!(el.color, "#90caf9");
        v.detach(&mut surface);
        assert!(surface.is_empty());
    }
}
