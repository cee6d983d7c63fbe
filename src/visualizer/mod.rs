//! Interchangeable rendering strategies for the ruler.
//!
//! Every variant answers the same capability set. The ruler owns exactly one
//! live [`Visualizer`] and dispatches to it by variant; switching appearance
//! builds a fresh instance through [`Visualizer::for_appearance`].

mod frame_proxy;
mod highlight;
mod negative;

pub use frame_proxy::FrameProxyVisualizer;
pub use highlight::HighlightVisualizer;
pub use negative::{NegativeState, NegativeVisualizer};

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::geometry::Rectangle;
use crate::messages::MessageSender;
use crate::surface::RenderSurface;

/// Named ruler styles a user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    /// A colored band over the active row.
    #[default]
    Ruler,
    /// Darkens everything except the active row.
    Negative,
}

impl Appearance {
    pub const ALL: [Appearance; 2] = [Appearance::Ruler, Appearance::Negative];

    pub fn name(self) -> &'static str {
        match self {
            Appearance::Ruler => "ruler",
            Appearance::Negative => "negative",
        }
    }

    /// Parses a stored name, falling back to [`Appearance::Ruler`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(name, "unknown appearance; using ruler");
            Appearance::default()
        })
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAppearance(pub String);

impl FromStr for Appearance {
    type Err = UnknownAppearance;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Appearance::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAppearance(s.to_string()))
    }
}

#[derive(Debug)]
pub enum Visualizer {
    Highlight(HighlightVisualizer),
    Negative(NegativeVisualizer),
    FrameProxy(FrameProxyVisualizer),
}

impl Visualizer {
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Ruler => Visualizer::Highlight(HighlightVisualizer::new()),
            Appearance::Negative => Visualizer::Negative(NegativeVisualizer::new()),
        }
    }

    pub fn frame_proxy(parent: MessageSender) -> Self {
        Visualizer::FrameProxy(FrameProxyVisualizer::new(parent))
    }

    pub fn is_frame_proxy(&self) -> bool {
        matches!(self, Visualizer::FrameProxy(_))
    }

    /// Creates the variant's elements on the surface.
    pub fn attach<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        match self {
            Visualizer::Highlight(v) => v.attach(surface),
            Visualizer::Negative(v) => v.attach(surface),
            Visualizer::FrameProxy(v) => v.attach(),
        }
    }

    /// Removes every element the variant created.
    pub fn detach<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        match self {
            Visualizer::Highlight(v) => v.detach(surface),
            Visualizer::Negative(v) => v.detach(surface),
            Visualizer::FrameProxy(_) => {}
        }
    }

    pub fn show<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        match self {
            Visualizer::Highlight(v) => v.show(surface),
            Visualizer::Negative(v) => v.show(surface),
            Visualizer::FrameProxy(v) => v.show(),
        }
    }

    pub fn hide<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        match self {
            Visualizer::Highlight(v) => v.hide(surface),
            Visualizer::Negative(v) => v.hide(surface),
            Visualizer::FrameProxy(v) => v.hide(),
        }
    }

    /// Suppresses tracking without fully hiding.
    pub fn stash<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        match self {
            Visualizer::Highlight(v) => v.stash(surface),
            Visualizer::Negative(v) => v.stash(surface),
            Visualizer::FrameProxy(v) => v.stash(),
        }
    }

    pub fn set_color<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, color: &str) {
        match self {
            Visualizer::Highlight(v) => v.set_color(surface, color),
            Visualizer::Negative(_) | Visualizer::FrameProxy(_) => {}
        }
    }

    pub fn set_opacity<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, opacity: f64) {
        match self {
            Visualizer::Highlight(v) => v.set_opacity(surface, opacity),
            Visualizer::Negative(v) => v.set_opacity(surface, opacity),
            Visualizer::FrameProxy(_) => {}
        }
    }

    pub fn position<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, rect: Rectangle) {
        match self {
            Visualizer::Highlight(v) => v.position(surface, rect),
            Visualizer::Negative(v) => v.position(surface, rect),
            Visualizer::FrameProxy(v) => v.position(rect),
        }
    }
}
