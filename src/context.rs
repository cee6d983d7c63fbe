//! One browsing context: a page, its ruler and its mailbox.

use tracing::{debug, trace};

use crate::constants::MIN_FRAME_VIEWPORT_PX;
use crate::messages::{Command, ContextId, Inbound, Mailbox, MessageSender};
use crate::page::Page;
use crate::ruler::Ruler;
use crate::scheduler::PositionRequest;
use crate::surface::OverlaySurface;

#[derive(Debug)]
pub struct BrowsingContext {
    id: ContextId,
    title: String,
    page: Page,
    /// `None` for frames too small to be worth tracking.
    ruler: Option<Ruler<OverlaySurface>>,
    mailbox: Mailbox,
}

impl BrowsingContext {
    /// The top-level page. Its ruler draws on its own overlay surface.
    pub fn top(title: impl Into<String>, page: Page) -> Self {
        let (width, height) = page.viewport_px();
        Self {
            id: ContextId::TOP,
            title: title.into(),
            page,
            ruler: Some(Ruler::new(OverlaySurface::new(width, height))),
            mailbox: Mailbox::new(ContextId::TOP),
        }
    }

    /// An embedded frame whose ruler relays everything to `parent`.
    ///
    /// Frames with a viewport of at most [`MIN_FRAME_VIEWPORT_PX`] in either
    /// direction are treated as tracking pixels and get no ruler.
    pub fn frame(id: ContextId, title: impl Into<String>, page: Page, parent: &Mailbox) -> Self {
        let (width, height) = page.viewport_px();
        let ruler = if width <= MIN_FRAME_VIEWPORT_PX || height <= MIN_FRAME_VIEWPORT_PX {
            debug!(context = %id, width, height, "frame too small for a ruler");
            None
        } else {
            Some(Ruler::with_frame_proxy(
                parent.sender_from(id),
                OverlaySurface::new(width, height),
            ))
        };
        Self {
            id,
            title: title.into(),
            page,
            ruler,
            mailbox: Mailbox::new(id),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn ruler(&self) -> Option<&Ruler<OverlaySurface>> {
        self.ruler.as_ref()
    }

    pub fn ruler_mut(&mut self) -> Option<&mut Ruler<OverlaySurface>> {
        self.ruler.as_mut()
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// A sender that delivers into this context, stamped as `source`.
    pub fn sender_from(&self, source: ContextId) -> MessageSender {
        self.mailbox.sender_from(source)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.page.resize(cols, rows);
        let (width, height) = self.page.viewport_px();
        if let Some(ruler) = self.ruler.as_mut() {
            ruler.surface_mut().set_viewport_size(width, height);
        }
    }

    /// Runs the tick's coalesced position request.
    pub fn apply_request(&mut self, request: PositionRequest) {
        let Some(ruler) = self.ruler.as_mut() else {
            return;
        };
        trace!(context = %self.id, x = request.x, y = request.y, force = request.force, "position request");
        if request.force {
            ruler.position_around(&self.page, request.x, request.y);
        } else {
            ruler.position_around_if_exited(&self.page, request.x, request.y);
        }
    }

    /// Drains the mailbox and dispatches every command. Returns how many
    /// were handled.
    pub fn process_mail(&mut self) -> usize {
        let inbound = self.mailbox.drain();
        let count = inbound.len();
        for message in inbound {
            self.dispatch(message);
        }
        count
    }

    pub fn dispatch(&mut self, message: Inbound) {
        let Inbound { source, command } = message;
        let Some(ruler) = self.ruler.as_mut() else {
            return;
        };
        trace!(context = %self.id, %source, ?command, "dispatch");
        match command {
            Command::Activate => ruler.activate(),
            Command::Deactivate => ruler.deactivate(),
            Command::Options(snapshot) => ruler.apply_preferences(&snapshot),
            Command::Show => ruler.show(),
            Command::Hide => ruler.hide(),
            Command::Stash => ruler.stash(),
            Command::PositionAt { rect } => ruler.position_on_frame(&self.page, source, rect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;
    use crate::preferences::PreferenceSnapshot;

    const DOC: &str = "First paragraph of text.\n\nSecond one.\n";

    #[test]
    fn tiny_frames_have_no_ruler() {
        let top = BrowsingContext::top("top", Page::from_markdown(DOC, 80, 24));
        let tiny = BrowsingContext::frame(
            ContextId(1),
            "tiny",
            Page::from_markdown(DOC, 12, 6),
            top.mailbox(),
        );
        assert!(tiny.ruler().is_none());
        let roomy = BrowsingContext::frame(
            ContextId(2),
            "roomy",
            Page::from_markdown(DOC, 40, 10),
            top.mailbox(),
        );
        assert!(roomy.ruler().is_some_and(|r| r.visualizer().is_frame_proxy()));
    }

    #[test]
    fn mail_drives_the_ruler() {
        let mut top = BrowsingContext::top("top", Page::from_markdown(DOC, 80, 24));
        let panel = top.sender_from(ContextId::CONTROL_PANEL);
        panel.send(Command::Options(PreferenceSnapshot {
            enabled: true,
            ..PreferenceSnapshot::default()
        }));
        assert_eq!(top.process_mail(), 1);
        assert!(top.ruler().is_some_and(|r| r.is_enabled()));

        top.apply_request(PositionRequest {
            x: 20.0,
            y: 8.0,
            force: false,
        });
        let rendered = top.ruler().and_then(|r| r.state().latest_rendered);
        assert_eq!(rendered, Some(Rectangle::new(4.0, -2.0, 632.0, 20.0)));

        panel.send(Command::Deactivate);
        top.process_mail();
        assert!(top.ruler().is_some_and(|r| !r.state().activated));
    }

    #[test]
    fn frame_relays_land_in_the_top_page() {
        let mut top_page = Page::from_markdown(DOC, 80, 40);
        let frame_id = ContextId(1);
        top_page.embed_frame(frame_id);
        let mut top = BrowsingContext::top("top", top_page);
        let mut frame = BrowsingContext::frame(
            frame_id,
            "frame",
            Page::from_markdown(DOC, 74, 10),
            top.mailbox(),
        );
        let enabled = Command::Options(PreferenceSnapshot {
            enabled: true,
            ..PreferenceSnapshot::default()
        });
        top.sender_from(ContextId::CONTROL_PANEL).send(enabled.clone());
        frame.sender_from(ContextId::CONTROL_PANEL).send(enabled);
        frame.process_mail();
        top.process_mail();

        frame.apply_request(PositionRequest {
            x: 20.0,
            y: 8.0,
            force: true,
        });
        top.process_mail();
        // Frame box at column 1, row 4; content starts one border cell and
        // one padding cell in, below the top border.
        let rendered = top.ruler().and_then(|r| r.state().latest_rendered);
        assert_eq!(
            rendered,
            Some(Rectangle::new(4.0 + 24.0, -2.0 + 80.0, 584.0, 20.0))
        );
    }
}
