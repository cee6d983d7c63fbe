/// Chrome state of the reader, separate from the pages and rulers.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppState {
    mouse_capture_enabled: bool,
    mouse_capture_dirty: bool,
    panel_visible: bool,
    debug_log_visible: bool,
    focused: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            mouse_capture_enabled: true,
            // Pushed to the driver on the first tick.
            mouse_capture_dirty: true,
            panel_visible: false,
            debug_log_visible: false,
            focused: true,
        }
    }

    pub fn mouse_capture_enabled(&self) -> bool {
        self.mouse_capture_enabled
    }

    pub fn set_mouse_capture_enabled(&mut self, enabled: bool) {
        if self.mouse_capture_enabled == enabled {
            return;
        }
        self.mouse_capture_enabled = enabled;
        self.mouse_capture_dirty = true;
    }

    pub fn toggle_mouse_capture(&mut self) {
        let enabled = !self.mouse_capture_enabled;
        self.set_mouse_capture_enabled(enabled);
    }

    pub fn take_mouse_capture_change(&mut self) -> Option<bool> {
        if self.mouse_capture_dirty {
            self.mouse_capture_dirty = false;
            Some(self.mouse_capture_enabled)
        } else {
            None
        }
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn set_panel_visible(&mut self, visible: bool) {
        self.panel_visible = visible;
    }

    pub fn debug_log_visible(&self) -> bool {
        self.debug_log_visible
    }

    pub fn toggle_debug_log_visible(&mut self) {
        self.debug_log_visible = !self.debug_log_visible;
    }

    /// Whether the terminal window has focus.
    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Records a focus report. Returns whether it changed anything.
    pub fn set_focused(&mut self, focused: bool) -> bool {
        let changed = self.focused != focused;
        self.focused = focused;
        changed
    }
}
