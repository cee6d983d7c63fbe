use crate::geometry::Rectangle;
use crate::messages::{Command, MessageSender};

/// Used inside embedded frames. Draws nothing; every call is relayed to the
/// parent context so only one ruler is ever painted per screen.
#[derive(Debug, Clone)]
pub struct FrameProxyVisualizer {
    parent: MessageSender,
}

impl FrameProxyVisualizer {
    pub fn new(parent: MessageSender) -> Self {
        Self { parent }
    }

    /// Starts out hidden in the parent.
    pub fn attach(&mut self) {
        self.hide();
    }

    pub fn show(&mut self) {
        self.parent.send(Command::Show);
    }

    pub fn hide(&mut self) {
        self.parent.send(Command::Hide);
    }

    pub fn stash(&mut self) {
        self.parent.send(Command::Stash);
    }

    /// `rect` is relative to the frame's own viewport.
    pub fn position(&mut self, rect: Rectangle) {
        self.parent.send(Command::PositionAt { rect });
    }
}
