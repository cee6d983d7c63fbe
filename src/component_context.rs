/// Per-call UI flags handed to every [`crate::components::Component`] method.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentContext {
    /// The terminal window has focus.
    focused: bool,
    /// Drawn on top of the page (the control panel).
    overlay: bool,
}

impl ComponentContext {
    pub const fn new(focused: bool) -> Self {
        Self {
            focused,
            overlay: false,
        }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn overlay(&self) -> bool {
        self.overlay
    }

    pub const fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }
}
