use tracing::trace;

use crate::constants::{DEFAULT_OPACITY, ELEMENT_PREFIX};
use crate::geometry::Rectangle;
use crate::surface::{OverlayLayer, RenderSurface};

const SHADE_COLOR: &str = "#000000";

/// Visibility of the negative visualizer.
///
/// | event       | Show        | Hide        | Stash       |
/// |-------------|-------------|-------------|-------------|
/// | show        | Show        | Show        | Show        |
/// | hide        | Hide        | Hide        | Hide        |
/// | stash       | Stash       | Stash       | Stash       |
/// | position    | Show        | Hide        | Show        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeState {
    Show,
    Hide,
    #[default]
    Stash,
}

/// Darkens the page above and below the active row.
///
/// Three full-width elements: the panel above the row, the row itself (a
/// mask that stays clear while tracking) and the panel below. Stashing dims
/// the mask too, so the whole page fades evenly while no row is tracked.
#[derive(Debug, Clone)]
pub struct NegativeVisualizer {
    top_id: String,
    mask_id: String,
    bottom_id: String,
    opacity: f64,
    state: NegativeState,
}

impl Default for NegativeVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl NegativeVisualizer {
    pub fn new() -> Self {
        Self {
            top_id: format!("{ELEMENT_PREFIX}top"),
            mask_id: format!("{ELEMENT_PREFIX}mask"),
            bottom_id: format!("{ELEMENT_PREFIX}bottom"),
            opacity: DEFAULT_OPACITY,
            state: NegativeState::default(),
        }
    }

    pub fn state(&self) -> NegativeState {
        self.state
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn element_ids(&self) -> [&str; 3] {
        [
            self.top_id.as_str(),
            self.mask_id.as_str(),
            self.bottom_id.as_str(),
        ]
    }

    pub fn attach<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        for id in [&self.top_id, &self.mask_id, &self.bottom_id] {
            surface.ensure_element(id, OverlayLayer::Shade);
            surface.set_color(id, SHADE_COLOR);
        }
        self.apply(surface);
    }

    pub fn detach<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        for id in [&self.top_id, &self.mask_id, &self.bottom_id] {
            surface.remove_element(id);
        }
    }

    pub fn show<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        self.transition(surface, NegativeState::Show);
    }

    pub fn hide<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        self.transition(surface, NegativeState::Hide);
    }

    pub fn stash<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        self.transition(surface, NegativeState::Stash);
    }

    pub fn set_opacity<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, opacity: f64) {
        self.opacity = opacity;
        self.apply(surface);
    }

    /// Lays the three panels out around `rect`. Receiving a position means
    /// tracking resumed, so a stashed visualizer shows again; a hidden one
    /// stays hidden.
    pub fn position<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, rect: Rectangle) {
        let (width, height) = surface.viewport_size();
        surface.set_rect(&self.top_id, Rectangle::new(0.0, 0.0, width, rect.y));
        surface.set_rect(
            &self.mask_id,
            Rectangle::new(0.0, rect.y, width, rect.height),
        );
        surface.set_rect(
            &self.bottom_id,
            Rectangle::new(0.0, rect.bottom(), width, height - rect.bottom()),
        );
        if self.state == NegativeState::Stash {
            self.transition(surface, NegativeState::Show);
        }
    }

    fn transition<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, next: NegativeState) {
        if self.state == next {
            return;
        }
        trace!(from = ?self.state, to = ?next, "negative visualizer transition");
        self.state = next;
        self.apply(surface);
    }

    fn apply<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        let (overlay, mask) = match self.state {
            NegativeState::Show => (self.opacity, 0.0),
            NegativeState::Hide => (0.0, 0.0),
            NegativeState::Stash => (self.opacity, self.opacity),
        };
        surface.set_opacity(&self.top_id, overlay);
        surface.set_opacity(&self.mask_id, mask);
        surface.set_opacity(&self.bottom_id, overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::OverlaySurface;

    fn opacities(v: &NegativeVisualizer, s: &OverlaySurface) -> (f64, f64, f64) {
        let [top, mask, bottom] = v.element_ids();
        (
            s.element(top).unwrap().opacity,
            s.element(mask).unwrap().opacity,
            s.element(bottom).unwrap().opacity,
        )
    }

    fn attached() -> (NegativeVisualizer, OverlaySurface) {
        let mut surface = OverlaySurface::new(640.0, 480.0);
        let mut v = NegativeVisualizer::new();
        v.attach(&mut surface);
        (v, surface)
    }

    #[test]
    fn show_stash_hide_sequence() {
        let (mut v, mut s) = attached();
        assert_eq!(v.state(), NegativeState::Stash);

        v.show(&mut s);
        assert_eq!(opacities(&v, &s), (0.2, 0.0, 0.2));

        v.stash(&mut s);
        assert_eq!(opacities(&v, &s), (0.2, 0.2, 0.2));

        v.hide(&mut s);
        assert_eq!(opacities(&v, &s), (0.0, 0.0, 0.0));
    }

    #[test]
    fn stash_from_hide_dims_everything() {
        let (mut v, mut s) = attached();
        v.hide(&mut s);
        v.stash(&mut s);
        assert_eq!(v.state(), NegativeState::Stash);
        assert_eq!(opacities(&v, &s), (0.2, 0.2, 0.2));
    }

    #[test]
    fn position_resumes_from_stash_but_not_from_hide() {
        let (mut v, mut s) = attached();
        let rect = Rectangle::new(10.0, 100.0, 50.0, 20.0);
        v.position(&mut s, rect);
        assert_eq!(v.state(), NegativeState::Show);
        assert_eq!(opacities(&v, &s), (0.2, 0.0, 0.2));

        v.hide(&mut s);
        v.position(&mut s, rect);
        assert_eq!(v.state(), NegativeState::Hide);
        assert_eq!(opacities(&v, &s), (0.0, 0.0, 0.0));
    }

    #[test]
    fn panels_span_the_viewport_around_the_row() {
        let (mut v, mut s) = attached();
        v.position(&mut s, Rectangle::new(10.0, 100.0, 50.0, 20.0));
        let [top, mask, bottom] = v.element_ids();
        assert_eq!(
            s.element(top).unwrap().rect,
            Rectangle::new(0.0, 0.0, 640.0, 100.0)
        );
        assert_eq!(
            s.element(mask).unwrap().rect,
            Rectangle::new(0.0, 100.0, 640.0, 20.0)
        );
        assert_eq!(
            s.element(bottom).unwrap().rect,
            Rectangle::new(0.0, 120.0, 640.0, 360.0)
        );
    }

    #[test]
    fn opacity_change_respects_state() {
        let (mut v, mut s) = attached();
        v.hide(&mut s);
        v.set_opacity(&mut s, 0.5);
        assert_eq!(opacities(&v, &s), (0.0, 0.0, 0.0));
        v.show(&mut s);
        assert_eq!(opacities(&v, &s), (0.5, 0.0, 0.5));
    }
}
