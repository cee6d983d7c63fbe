//! Resolves embedded frames and maps their coordinates into the page.

use std::collections::HashMap;

use tracing::trace;

use crate::geometry::Rectangle;
use crate::host::{FrameHost, FrameId};
use crate::messages::ContextId;

/// Maps a frame's content context to the frame element hosting it.
///
/// Entries are only ever added and live as long as the page. A stale entry
/// for a removed frame is harmless: lookups go through the live context id,
/// and the frame rectangle is queried fresh every time.
#[derive(Debug, Default)]
pub struct FrameCoordinator {
    cache: HashMap<ContextId, FrameId>,
}

impl FrameCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve_frame<H: FrameHost + ?Sized>(
        &mut self,
        host: &H,
        context: ContextId,
    ) -> Option<FrameId> {
        if let Some(frame) = self.cache.get(&context) {
            return Some(*frame);
        }
        let frame = host
            .frame_elements()
            .into_iter()
            .find(|f| host.content_context(*f) == Some(context))?;
        trace!(%context, frame = frame.0, "caching frame element");
        self.cache.insert(context, frame);
        Some(frame)
    }

    /// Translates a rectangle from a frame's viewport into the page's
    /// viewport: the frame's position plus its leading padding and border.
    pub fn to_page<H: FrameHost + ?Sized>(
        &mut self,
        host: &H,
        context: ContextId,
        rect: Rectangle,
    ) -> Option<Rectangle> {
        let frame = self.resolve_frame(host, context)?;
        let frame_rect = host.frame_rect(frame)?;
        let insets = host.frame_insets(frame);
        Some(rect.translated(frame_rect.x + insets.left(), frame_rect.y + insets.top()))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
