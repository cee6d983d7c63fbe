//! The reader: routes terminal input to browsing contexts, runs the tick and
//! draws the screen.

use crossterm::event::{Event, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, trace, warn};

use crate::component_context::ComponentContext;
use crate::components::{Component, ControlPanel, DebugLogComponent, PageView, StatusBar};
use crate::config::ReaderConfig;
use crate::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::context::BrowsingContext;
use crate::error::PreferenceError;
use crate::event_loop::ControlFlow;
use crate::host::FrameId;
use crate::keybindings::{Action, KeyBindings};
use crate::messages::{Broadcaster, Command, ContextId, MessageSender};
use crate::page::{Document, Page};
use crate::preferences::{PagePreferences, PreferenceStore};
use crate::scheduler::PositionRequests;
use crate::state::AppState;
use crate::ui::UiFrame;

const STATUS_ROWS: u16 = 1;
const WHEEL_ROWS: i32 = 3;
const DEBUG_LOG_MAX_ROWS: u16 = 10;

const GLOBAL_ACTIONS: [Action; 10] = [
    Action::ToggleAddon,
    Action::OpenPanel,
    Action::ToggleDebugLog,
    Action::ToggleMouseCapture,
    Action::ScrollUp,
    Action::ScrollDown,
    Action::ScrollPageUp,
    Action::ScrollPageDown,
    Action::ScrollHome,
    Action::ScrollEnd,
];

/// Virtual-pixel centre of a terminal cell.
pub fn cell_center(col: u16, row: u16) -> (f64, f64) {
    (
        f64::from(col) * CELL_WIDTH_PX + CELL_WIDTH_PX / 2.0,
        f64::from(row) * CELL_HEIGHT_PX + CELL_HEIGHT_PX / 2.0,
    )
}

/// Where the pointer is, resolved to the innermost context.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PointerTarget {
    context: ContextId,
    x: f64,
    y: f64,
}

pub struct ReaderApp {
    top: BrowsingContext,
    /// `frames[i]` is shown by frame element `FrameId(i)` of the top page.
    frames: Vec<BrowsingContext>,
    store: PreferenceStore,
    prefs: PagePreferences,
    broadcaster: Broadcaster,
    panel_to_top: MessageSender,
    requests: PositionRequests,
    hover: Option<ContextId>,
    pointer: Option<(u16, u16)>,
    /// Set while the panel holds the ruler stashed; the next pointer motion
    /// repositions unconditionally.
    resume_on_move: bool,
    panel: ControlPanel,
    status: StatusBar,
    debug_log: DebugLogComponent,
    state: AppState,
    bindings: KeyBindings,
    size: (u16, u16),
}

impl ReaderApp {
    /// Builds every context for a terminal of `cols` x `rows` and broadcasts
    /// the page's preferences to them.
    pub fn new(
        config: &ReaderConfig,
        store: PreferenceStore,
        cols: u16,
        rows: u16,
    ) -> Result<Self, PreferenceError> {
        let prefs = PagePreferences::read(&store, &config.url)?;
        let page_rows = rows.saturating_sub(STATUS_ROWS);

        let mut page = Page::new(Document::parse(&config.document.markdown), cols, page_rows);
        let frame_ids: Vec<ContextId> = (1..=config.frames.len())
            .map(|i| ContextId(i as u32))
            .collect();
        for id in &frame_ids {
            page.embed_frame(*id);
        }
        let top = BrowsingContext::top(config.document.title.clone(), page);

        let frames: Vec<BrowsingContext> = config
            .frames
            .iter()
            .zip(&frame_ids)
            .enumerate()
            .map(|(i, (source, id))| {
                let (frame_cols, frame_rows) = frame_size(top.page(), FrameId(i));
                BrowsingContext::frame(
                    *id,
                    source.title.clone(),
                    Page::from_markdown(&source.markdown, frame_cols, frame_rows),
                    top.mailbox(),
                )
            })
            .collect();

        let mut broadcaster = Broadcaster::new();
        broadcaster.add(top.sender_from(ContextId::CONTROL_PANEL));
        for frame in &frames {
            broadcaster.add(frame.sender_from(ContextId::CONTROL_PANEL));
        }
        let panel_to_top = top.sender_from(ContextId::CONTROL_PANEL);
        debug!(
            url = %config.url,
            frames = frames.len(),
            enabled = prefs.enabled(),
            "reader created"
        );

        let (debug_log, _) = DebugLogComponent::new_default();
        let mut app = Self {
            top,
            frames,
            store,
            panel: ControlPanel::new(prefs.clone()),
            prefs,
            broadcaster,
            panel_to_top,
            requests: PositionRequests::new(),
            hover: None,
            pointer: None,
            resume_on_move: false,
            status: StatusBar::new(),
            debug_log,
            state: AppState::new(),
            bindings: KeyBindings::default(),
            size: (cols, rows),
        };
        app.broadcaster
            .broadcast(&Command::Options(app.prefs.snapshot()));
        app.refresh_status();
        Ok(app)
    }

    /// Replaces the log panel, e.g. with one registered as the global sink.
    pub fn with_debug_log(mut self, debug_log: DebugLogComponent) -> Self {
        self.debug_log = debug_log;
        self
    }

    pub fn top(&self) -> &BrowsingContext {
        &self.top
    }

    pub fn frames(&self) -> &[BrowsingContext] {
        &self.frames
    }

    pub fn preferences(&self) -> &PagePreferences {
        &self.prefs
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn hovered(&self) -> Option<ContextId> {
        self.hover
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        match event {
            Event::Key(key) => return self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::FocusLost => {
                if self.state.set_focused(false) {
                    self.broadcaster.broadcast(&Command::Deactivate);
                }
            }
            Event::FocusGained => {
                if self.state.set_focused(true) {
                    self.broadcaster.broadcast(&Command::Activate);
                }
            }
            Event::Resize(cols, rows) => self.resize(*cols, *rows),
            _ => {}
        }
        ControlFlow::Continue
    }

    /// One render tick: mail queued by input handling, then the coalesced
    /// position requests, then whatever positioning relayed.
    pub fn tick(&mut self) {
        self.drain_mail();
        for (id, request) in self.requests.take() {
            if let Some(context) = self.context_mut(id) {
                context.apply_request(request);
            }
        }
        self.drain_mail();
    }

    pub fn draw(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let (page_area, status_area) = split_status(area);
        let ctx = ComponentContext::new(self.state.focused());

        PageView::new(&self.top, &self.frames).render(frame, page_area, &ctx);
        if self.state.debug_log_visible() {
            self.debug_log.render(frame, debug_log_area(page_area), &ctx);
        }
        if self.state.panel_visible() {
            let overlay = ComponentContext::new(true).with_overlay(true);
            self.panel.render(frame, page_area, &overlay);
        }
        self.status.render(frame, status_area, &ctx);
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.size = (cols, rows);
        self.top.resize(cols, rows.saturating_sub(STATUS_ROWS));
        for (i, frame) in self.frames.iter_mut().enumerate() {
            let (frame_cols, frame_rows) = frame_size(self.top.page(), FrameId(i));
            frame.resize(frame_cols, frame_rows);
        }
        self.after_top_scroll();
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ControlFlow {
        if self.bindings.matches(Action::Quit, key) {
            return ControlFlow::Quit;
        }
        if self.state.panel_visible() {
            if self.bindings.matches(Action::ClosePanel, key) {
                self.close_panel();
            } else if self
                .panel
                .handle_event(&Event::Key(*key), &ComponentContext::new(true))
                && let Some(prefs) = self.panel.take_changes()
            {
                self.commit_preferences(prefs);
            }
            return ControlFlow::Continue;
        }
        if self.state.debug_log_visible()
            && self
                .debug_log
                .handle_event(&Event::Key(*key), &ComponentContext::new(true))
        {
            return ControlFlow::Continue;
        }

        let page_rows = i32::from(self.top.page().size().1.max(2)) - 1;
        match self.bindings.first_match(&GLOBAL_ACTIONS, key) {
            Some(Action::ToggleAddon) => self.toggle_addon(),
            Some(Action::OpenPanel) => self.open_panel(),
            Some(Action::ToggleDebugLog) => self.state.toggle_debug_log_visible(),
            Some(Action::ToggleMouseCapture) => self.state.toggle_mouse_capture(),
            Some(Action::ScrollUp) => self.scroll_top(-1),
            Some(Action::ScrollDown) => self.scroll_top(1),
            Some(Action::ScrollPageUp) => self.scroll_top(-page_rows),
            Some(Action::ScrollPageDown) => self.scroll_top(page_rows),
            Some(Action::ScrollHome) => self.scroll_top(-i32::from(u16::MAX)),
            Some(Action::ScrollEnd) => self.scroll_top(i32::from(u16::MAX)),
            _ => {}
        }
        ControlFlow::Continue
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let force = std::mem::take(&mut self.resume_on_move);
                self.route_pointer(col, row, force);
            }
            MouseEventKind::Down(_) => {
                self.route_pointer(col, row, false);
                if let Some(id) = self.hover
                    && let Some(ruler) = self.context_mut(id).and_then(|c| c.ruler_mut())
                {
                    ruler.activate();
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let delta = if mouse.kind == MouseEventKind::ScrollUp {
                    -WHEEL_ROWS
                } else {
                    WHEEL_ROWS
                };
                self.scroll_under_pointer(col, row, delta, mouse);
            }
            _ => {}
        }
    }

    fn scroll_under_pointer(&mut self, col: u16, row: u16, delta: i32, mouse: &MouseEvent) {
        if self.state.debug_log_visible() {
            let (page_area, _) = split_status(self.screen());
            if debug_log_area(page_area).contains((col, row).into()) {
                self.debug_log
                    .handle_event(&Event::Mouse(*mouse), &ComponentContext::new(true));
                return;
            }
        }
        let Some(target) = self.resolve(col, row) else {
            return;
        };
        if target.context == ContextId::TOP {
            self.scroll_top(delta);
            return;
        }
        let scrolled = self
            .context_mut(target.context)
            .is_some_and(|c| c.page_mut().scroll_by(delta));
        if scrolled {
            self.route_pointer(col, row, true);
        }
    }

    fn scroll_top(&mut self, delta: i32) {
        if self.top.page_mut().scroll_by(delta) {
            trace!(offset = self.top.page().scroll_offset(), "top page scrolled");
            self.after_top_scroll();
        }
    }

    /// Frames moved on screen: their rulers must report again from scratch.
    fn after_top_scroll(&mut self) {
        if let Some(id) = self.hover
            && id != ContextId::TOP
            && let Some(ruler) = self.context_mut(id).and_then(|c| c.ruler_mut())
        {
            ruler.stash();
        }
        if let Some((col, row)) = self.pointer {
            self.route_pointer(col, row, true);
        }
    }

    /// Resolves the pointer to its innermost context and records a position
    /// request there. Leaving a frame deactivates its ruler.
    fn route_pointer(&mut self, col: u16, row: u16, force: bool) {
        self.pointer = Some((col, row));
        let target = self.resolve(col, row);
        let entered = target.map(|t| t.context);
        if entered != self.hover {
            if let Some(previous) = self.hover {
                self.leave(previous);
            }
            self.hover = entered;
            if let Some(t) = target {
                trace!(context = %t.context, "pointer entered");
                self.requests.request_enter(t.context, t.x, t.y);
            }
            return;
        }
        let Some(t) = target else {
            return;
        };
        if force {
            self.requests.request_scroll(t.context, t.x, t.y);
        } else {
            self.requests.request_pointer(t.context, t.x, t.y);
        }
    }

    fn leave(&mut self, context: ContextId) {
        self.requests.cancel(context);
        if context == ContextId::TOP {
            return;
        }
        trace!(%context, "pointer left frame");
        if let Some(ruler) = self.context_mut(context).and_then(|c| c.ruler_mut()) {
            ruler.deactivate();
        }
    }

    fn resolve(&self, col: u16, row: u16) -> Option<PointerTarget> {
        let (cols, rows) = self.top.page().size();
        if col >= cols || row >= rows {
            return None;
        }
        let (x, y) = cell_center(col, row);
        let page = self.top.page();
        if let Some((frame, context)) = page.frame_at(x, y)
            && let Some(inner) = page.frame_viewport(frame)
            && self.frames.iter().any(|f| f.id() == context)
        {
            return Some(PointerTarget {
                context,
                x: x - inner.x,
                y: y - inner.y,
            });
        }
        Some(PointerTarget {
            context: ContextId::TOP,
            x,
            y,
        })
    }

    fn context_mut(&mut self, id: ContextId) -> Option<&mut BrowsingContext> {
        if id == ContextId::TOP {
            Some(&mut self.top)
        } else {
            self.frames.iter_mut().find(|c| c.id() == id)
        }
    }

    fn drain_mail(&mut self) {
        for frame in &mut self.frames {
            frame.process_mail();
        }
        self.top.process_mail();
    }

    fn open_panel(&mut self) {
        self.panel.set_preferences(self.prefs.clone());
        self.state.set_panel_visible(true);
        self.panel_to_top.send(Command::Stash);
        self.resume_on_move = true;
        debug!("control panel opened");
    }

    fn close_panel(&mut self) {
        self.state.set_panel_visible(false);
        debug!("control panel closed");
    }

    fn toggle_addon(&mut self) {
        let mut prefs = self.prefs.clone();
        prefs.addon_enabled = !prefs.addon_enabled;
        self.panel.set_preferences(prefs.clone());
        self.commit_preferences(prefs);
    }

    /// Persists `prefs` and pushes the new snapshot to every ruler.
    fn commit_preferences(&mut self, prefs: PagePreferences) {
        self.prefs = prefs;
        if let Err(err) = self.prefs.write(&mut self.store) {
            warn!(%err, "failed to save preferences");
        }
        let snapshot = self.prefs.snapshot();
        debug!(?snapshot, "preferences changed");
        self.broadcaster.broadcast(&Command::Options(snapshot));
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        let combo = |action| {
            self.bindings
                .combos_for(action)
                .into_iter()
                .next()
                .unwrap_or_default()
        };
        let hint = format!(
            "{} options | {} toggle | {} quit",
            combo(Action::OpenPanel),
            combo(Action::ToggleAddon),
            combo(Action::Quit)
        );
        let snapshot = self.prefs.snapshot();
        let color = self.prefs.color().name;
        self.status
            .update(self.top.title(), &snapshot, color, &hint);
    }

    fn screen(&self) -> Rect {
        Rect::new(0, 0, self.size.0, self.size.1)
    }
}

/// Size in cells of a frame element's content box.
fn frame_size(page: &Page, frame: FrameId) -> (u16, u16) {
    page.frame_viewport(frame)
        .map(|inner| {
            (
                (inner.width / CELL_WIDTH_PX).round().max(0.0) as u16,
                (inner.height / CELL_HEIGHT_PX).round().max(0.0) as u16,
            )
        })
        .unwrap_or((0, 0))
}

fn split_status(area: Rect) -> (Rect, Rect) {
    let status_height = STATUS_ROWS.min(area.height);
    let page = Rect {
        height: area.height - status_height,
        ..area
    };
    let status = Rect {
        y: area.y + page.height,
        height: status_height,
        ..area
    };
    (page, status)
}

fn debug_log_area(page_area: Rect) -> Rect {
    let height = (page_area.height / 2).min(DEBUG_LOG_MAX_ROWS);
    Rect {
        y: page_area.bottom() - height,
        height,
        ..page_area
    }
}
