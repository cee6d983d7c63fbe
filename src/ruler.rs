//! The ruler state machine.
//!
//! A [`Ruler`] owns one live [`Visualizer`] and the surface it draws on. It
//! decides when the row under the pointer needs to be recomputed, when the
//! visualizer should be shown, hidden or stashed, and how rectangles reported
//! by embedded frames map into its own viewport.

use tracing::{debug, trace};

use crate::constants::{DEFAULT_OPACITY, RULER_PADDING};
use crate::frames::FrameCoordinator;
use crate::geometry::{Padding, Rectangle};
use crate::host::{FrameHost, TextHost};
use crate::locator::RowLocator;
use crate::messages::{ContextId, MessageSender};
use crate::preferences::{COLORS, PreferenceSnapshot};
use crate::surface::RenderSurface;
use crate::visualizer::{Appearance, Visualizer};

/// Point-in-time copy of a ruler's state.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerState {
    pub enabled: bool,
    pub activated: bool,
    pub appearance: Appearance,
    pub color: String,
    pub opacity: f64,
    /// Padded bounds of the last located row; the exited-row check tests
    /// against this.
    pub latest_row_bounds: Option<Rectangle>,
    pub latest_rendered: Option<Rectangle>,
}

#[derive(Debug)]
pub struct Ruler<S: RenderSurface> {
    enabled: bool,
    activated: bool,
    appearance: Appearance,
    color: String,
    opacity: f64,
    latest_row_bounds: Option<Rectangle>,
    latest_rendered: Option<Rectangle>,
    visualizer: Visualizer,
    /// Frame rulers keep their proxy across appearance changes.
    proxied: bool,
    locator: RowLocator,
    frames: FrameCoordinator,
    padding: Padding,
    surface: S,
}

impl<S: RenderSurface> Ruler<S> {
    /// A top-level ruler drawing on `surface`. Starts disabled until
    /// preferences arrive.
    pub fn new(surface: S) -> Self {
        Self::build(Visualizer::for_appearance(Appearance::default()), false, surface)
    }

    /// A ruler inside an embedded frame. Everything it would draw is relayed
    /// to `parent` instead.
    pub fn with_frame_proxy(parent: MessageSender, surface: S) -> Self {
        Self::build(Visualizer::frame_proxy(parent), true, surface)
    }

    fn build(visualizer: Visualizer, proxied: bool, surface: S) -> Self {
        let mut ruler = Self {
            enabled: false,
            activated: true,
            appearance: Appearance::default(),
            color: COLORS[0].hex.to_string(),
            opacity: DEFAULT_OPACITY,
            latest_row_bounds: None,
            latest_rendered: None,
            visualizer,
            proxied,
            locator: RowLocator::default(),
            frames: FrameCoordinator::new(),
            padding: RULER_PADDING,
            surface,
        };
        ruler.visualizer.attach(&mut ruler.surface);
        ruler
    }

    pub fn with_locator(mut self, locator: RowLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn state(&self) -> RulerState {
        RulerState {
            enabled: self.enabled,
            activated: self.activated,
            appearance: self.appearance,
            color: self.color.clone(),
            opacity: self.opacity,
            latest_row_bounds: self.latest_row_bounds,
            latest_rendered: self.latest_rendered,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn visualizer(&self) -> &Visualizer {
        &self.visualizer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn apply_preferences(&mut self, snapshot: &PreferenceSnapshot) {
        self.enable_if(snapshot.enabled);
        self.set_appearance(Appearance::from_name(&snapshot.appearance));
        self.set_color(&snapshot.color);
        self.set_opacity(snapshot.opacity);
    }

    pub fn enable_if(&mut self, enable: bool) {
        if enable {
            self.enable();
        } else {
            self.disable();
        }
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            debug!("ruler enabled");
        }
        self.enabled = true;
        self.show();
    }

    pub fn disable(&mut self) {
        if self.enabled {
            debug!("ruler disabled");
        }
        self.enabled = false;
        self.hide();
    }

    pub fn activate(&mut self) {
        self.activated = true;
        self.show();
    }

    pub fn deactivate(&mut self) {
        self.activated = false;
        self.hide();
    }

    /// Swaps in a fresh visualizer for `appearance`, then restores the last
    /// rendered rectangle and styling on it. Frame rulers keep their proxy.
    pub fn set_appearance(&mut self, appearance: Appearance) {
        if self.appearance == appearance {
            return;
        }
        debug!(from = %self.appearance, to = %appearance, "switching appearance");
        self.appearance = appearance;

        if !self.proxied {
            self.visualizer.hide(&mut self.surface);
            self.visualizer.detach(&mut self.surface);
            self.visualizer = Visualizer::for_appearance(appearance);
            self.visualizer.attach(&mut self.surface);
        }

        if self.enabled && self.activated {
            self.visualizer.show(&mut self.surface);
        } else {
            self.visualizer.hide(&mut self.surface);
        }
        self.position_at_latest();
        self.visualizer.set_color(&mut self.surface, &self.color);
        self.visualizer.set_opacity(&mut self.surface, self.opacity);
    }

    pub fn set_color(&mut self, color: &str) {
        self.color = color.to_string();
        self.visualizer.set_color(&mut self.surface, color);
    }

    /// Clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        let opacity = if opacity.is_nan() {
            DEFAULT_OPACITY
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.opacity = opacity;
        self.visualizer.set_opacity(&mut self.surface, opacity);
    }

    /// Repositions only when `(x, y)` left the last located row.
    pub fn position_around_if_exited<H: TextHost + ?Sized>(&mut self, host: &H, x: f64, y: f64) {
        if !self.enabled {
            return;
        }
        if self
            .latest_row_bounds
            .is_some_and(|bounds| bounds.contains(x, y))
        {
            return;
        }
        self.position_around(host, x, y);
    }

    /// Locates the row around `(x, y)` and renders it. Stashes when nothing
    /// highlightable is near the pointer.
    pub fn position_around<H: TextHost + ?Sized>(&mut self, host: &H, x: f64, y: f64) {
        if !self.enabled {
            return;
        }
        let Some(row) = self.locator.locate(host, x, y) else {
            self.latest_row_bounds = None;
            self.stash();
            return;
        };
        self.activate();
        let rect = row.rounded().inflated(self.padding.x, self.padding.y);
        trace!(x, y, ?rect, "row located");
        self.latest_row_bounds = Some(rect);
        self.position_at(rect);
    }

    /// Renders a rectangle a frame computed in its own viewport.
    ///
    /// Messages from frames this page cannot resolve are dropped.
    pub fn position_on_frame<F: FrameHost + ?Sized>(
        &mut self,
        host: &F,
        source: ContextId,
        rect: Rectangle,
    ) {
        let Some(translated) = self.frames.to_page(host, source, rect) else {
            debug!(%source, "position from unknown frame dropped");
            return;
        };
        self.activate();
        self.position_at(translated.rounded());
    }

    /// Moves the visualizer over `rect` unless it is already there.
    pub fn position_at(&mut self, rect: Rectangle) {
        if self.latest_rendered == Some(rect) {
            return;
        }
        self.visualizer.position(&mut self.surface, rect);
        self.latest_rendered = Some(rect);
    }

    /// Shows the visualizer when both enabled and activated.
    pub fn show(&mut self) {
        if self.enabled && self.activated {
            self.visualizer.show(&mut self.surface);
        }
    }

    pub fn hide(&mut self) {
        self.visualizer.hide(&mut self.surface);
    }

    /// Suppresses tracking. The next position is always rendered afresh.
    pub fn stash(&mut self) {
        self.visualizer.stash(&mut self.surface);
        self.latest_rendered = None;
    }

    fn position_at_latest(&mut self) {
        if let Some(rect) = self.latest_rendered {
            self.visualizer.position(&mut self.surface, rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::host::{Caret, FrameId, Insets, NodeKind};
    use crate::messages::{Command, Mailbox};
    use crate::surface::OverlaySurface;
    use crate::visualizer::NegativeState;

    /// Node 0 is a block spanning `{0,48,300,36}`; node 1 is its text, with
    /// one line at y 48..66 and another at 66..84.
    struct OneParagraph {
        probes: Cell<usize>,
    }

    impl OneParagraph {
        fn new() -> Self {
            Self {
                probes: Cell::new(0),
            }
        }
    }

    impl TextHost for OneParagraph {
        type Node = usize;

        fn caret_at(&self, x: f64, y: f64) -> Option<Caret<usize>> {
            self.probes.set(self.probes.get() + 1);
            if !(0.0..300.0).contains(&x) || !(48.0..84.0).contains(&y) {
                return None;
            }
            let line_y = if y < 66.0 { 48.0 } else { 66.0 };
            Some(Caret {
                node: 1,
                rect: Rectangle::new(x, line_y, 0.0, 18.0),
            })
        }

        fn node_kind(&self, node: usize) -> NodeKind {
            if node == 1 { NodeKind::Text } else { NodeKind::Other }
        }

        fn parent_element(&self, node: usize) -> Option<usize> {
            (node == 1).then_some(0)
        }

        fn is_block(&self, element: usize) -> bool {
            element == 0
        }

        fn bounding_rect(&self, _node: usize) -> Rectangle {
            Rectangle::new(0.0, 48.0, 300.0, 36.0)
        }
    }

    struct OneFrame;

    impl FrameHost for OneFrame {
        fn frame_elements(&self) -> Vec<FrameId> {
            vec![FrameId(0)]
        }

        fn content_context(&self, _frame: FrameId) -> Option<ContextId> {
            Some(ContextId(1))
        }

        fn frame_rect(&self, _frame: FrameId) -> Option<Rectangle> {
            Some(Rectangle::new(100.0, 200.0, 400.0, 200.0))
        }

        fn frame_insets(&self, _frame: FrameId) -> Insets {
            Insets {
                padding_left: 0.5,
                padding_top: 0.0,
                border_left: 1.0,
                border_top: 1.0,
            }
        }
    }

    fn enabled_ruler() -> Ruler<OverlaySurface> {
        let mut ruler = Ruler::new(OverlaySurface::new(800.0, 600.0));
        ruler.enable();
        ruler
    }

    fn highlight_opacity(ruler: &Ruler<OverlaySurface>) -> f64 {
        ruler
            .surface()
            .element("--reading-ruler-ruler")
            .map(|el| el.opacity)
            .unwrap_or(-1.0)
    }

    #[test]
    fn starts_disabled_and_ignores_pointer() {
        let host = OneParagraph::new();
        let mut ruler = Ruler::new(OverlaySurface::new(800.0, 600.0));
        ruler.position_around(&host, 50.0, 50.0);
        assert_eq!(host.probes.get(), 0);
        assert_eq!(ruler.state().latest_rendered, None);
    }

    #[test]
    fn renders_padded_row_and_skips_pointer_moves_inside_it() {
        let host = OneParagraph::new();
        let mut ruler = enabled_ruler();
        ruler.position_around(&host, 50.0, 50.0);
        let expected = Rectangle::new(-4.0, 46.0, 308.0, 22.0);
        assert_eq!(ruler.state().latest_rendered, Some(expected));
        assert_eq!(ruler.state().latest_row_bounds, Some(expected));

        let probes = host.probes.get();
        ruler.position_around_if_exited(&host, 120.0, 60.0);
        ruler.position_around_if_exited(&host, -4.0, 68.0);
        assert_eq!(host.probes.get(), probes);

        ruler.position_around_if_exited(&host, 50.0, 75.0);
        assert!(host.probes.get() > probes);
        assert_eq!(
            ruler.state().latest_rendered,
            Some(Rectangle::new(-4.0, 64.0, 308.0, 22.0))
        );
    }

    #[test]
    fn no_row_stashes_and_forgets_the_rendered_rect() {
        let host = OneParagraph::new();
        let mut ruler = enabled_ruler();
        ruler.position_around(&host, 50.0, 50.0);
        assert!(highlight_opacity(&ruler) > 0.0);

        ruler.position_around(&host, 500.0, 500.0);
        assert_eq!(highlight_opacity(&ruler), 0.0);
        assert_eq!(ruler.state().latest_rendered, None);
        assert_eq!(ruler.state().latest_row_bounds, None);
    }

    #[test]
    fn position_at_suppresses_identical_writes() {
        let mut ruler = enabled_ruler();
        let rect = Rectangle::new(1.0, 2.0, 3.0, 4.0);
        let before = ruler.surface().rect_writes();
        ruler.position_at(rect);
        ruler.position_at(rect);
        assert_eq!(ruler.surface().rect_writes(), before + 1);
    }

    #[test]
    fn disable_hides_even_while_activated() {
        let host = OneParagraph::new();
        let mut ruler = enabled_ruler();
        ruler.position_around(&host, 50.0, 50.0);
        ruler.disable();
        assert_eq!(highlight_opacity(&ruler), 0.0);
        ruler.activate();
        assert_eq!(highlight_opacity(&ruler), 0.0);
        ruler.enable();
        assert_eq!(highlight_opacity(&ruler), 0.2);
    }

    #[test]
    fn deactivate_is_transient() {
        let host = OneParagraph::new();
        let mut ruler = enabled_ruler();
        ruler.position_around(&host, 50.0, 50.0);
        ruler.deactivate();
        assert!(ruler.is_enabled());
        assert_eq!(highlight_opacity(&ruler), 0.0);
        // enable() alone does not override a transient deactivation.
        ruler.enable();
        assert_eq!(highlight_opacity(&ruler), 0.0);
        ruler.activate();
        assert_eq!(highlight_opacity(&ruler), 0.2);
    }

    #[test]
    fn switching_appearance_restores_last_rect_on_new_visualizer() {
        let host = OneParagraph::new();
        let mut ruler = enabled_ruler();
        ruler.set_opacity(0.5);
        ruler.position_around(&host, 50.0, 50.0);
        ruler.set_appearance(Appearance::Negative);

        let surface = ruler.surface();
        assert!(surface.element("--reading-ruler-ruler").is_none());
        assert_eq!(surface.len(), 3);
        let mask = surface.element("--reading-ruler-mask").map(|el| el.rect);
        assert_eq!(mask, Some(Rectangle::new(0.0, 46.0, 800.0, 22.0)));
        let top = surface.element("--reading-ruler-top").map(|el| el.opacity);
        assert_eq!(top, Some(0.5));
        match ruler.visualizer() {
            Visualizer::Negative(v) => assert_eq!(v.state(), NegativeState::Show),
            other => panic!("unexpected visualizer {other:?}"),
        }
    }

    #[test]
    fn switching_appearance_while_disabled_stays_dark() {
        let mut ruler = Ruler::new(OverlaySurface::new(800.0, 600.0));
        ruler.set_appearance(Appearance::Negative);
        assert!(ruler.surface().elements().all(|(_, el)| !el.is_visible()));
    }

    #[test]
    fn preferences_snapshot_drives_every_setting() {
        let mut ruler = Ruler::new(OverlaySurface::new(800.0, 600.0));
        ruler.apply_preferences(&PreferenceSnapshot {
            enabled: true,
            appearance: "bogus".to_string(),
            color: "#90caf9".to_string(),
            opacity: 1.7,
        });
        let state = ruler.state();
        assert!(state.enabled);
        assert_eq!(state.appearance, Appearance::Ruler);
        assert_eq!(state.color, "#90caf9");
        assert_eq!(state.opacity, 1.0);
        let color = ruler
            .surface()
            .element("--reading-ruler-ruler")
            .map(|el| el.color.clone());
        assert_eq!(color.as_deref(), Some("#90caf9"));
    }

    #[test]
    fn frame_rectangles_are_translated_rounded_and_rendered() {
        let mut ruler = enabled_ruler();
        ruler.position_on_frame(&OneFrame, ContextId(1), Rectangle::new(10.0, 5.0, 50.0, 15.0));
        assert_eq!(
            ruler.state().latest_rendered,
            Some(Rectangle::new(112.0, 206.0, 50.0, 15.0))
        );
        assert_eq!(highlight_opacity(&ruler), 0.2);
    }

    #[test]
    fn unknown_frame_is_ignored() {
        let mut ruler = enabled_ruler();
        let writes = ruler.surface().rect_writes();
        ruler.position_on_frame(&OneFrame, ContextId(7), Rectangle::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(ruler.surface().rect_writes(), writes);
        assert_eq!(ruler.state().latest_rendered, None);
    }

    #[test]
    fn frame_ruler_relays_to_parent_and_keeps_its_proxy() {
        let parent = Mailbox::new(ContextId::TOP);
        let host = OneParagraph::new();
        let mut ruler = Ruler::with_frame_proxy(
            parent.sender_from(ContextId(1)),
            OverlaySurface::new(400.0, 200.0),
        );
        ruler.enable();
        ruler.set_appearance(Appearance::Negative);
        assert!(ruler.visualizer().is_frame_proxy());
        assert!(ruler.surface().is_empty());
        parent.drain();

        ruler.position_around(&host, 50.0, 50.0);
        let commands: Vec<Command> = parent.drain().into_iter().map(|m| m.command).collect();
        assert_eq!(
            commands,
            vec![
                Command::Show,
                Command::PositionAt {
                    rect: Rectangle::new(-4.0, 46.0, 308.0, 22.0)
                }
            ]
        );
    }
}
