//! In-app log panel fed by the tracing subscriber.
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use crossterm::event::{Event, KeyCode, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::components::{Component, ComponentContext};
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

const DEFAULT_MAX_LINES: usize = 2000;
static GLOBAL_LOG: OnceLock<DebugLogHandle> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn set_global_debug_log(handle: DebugLogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_debug_log() -> Option<DebugLogHandle> {
    GLOBAL_LOG.get().cloned()
}

/// Copies panic reports into the debug log before the previous hook runs.
pub fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }
    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(handle) = GLOBAL_LOG.get() {
            handle.push("=== PANIC ===");
            if let Some(location) = info.location() {
                handle.push(format!(
                    "{}:{}:{}",
                    location.file(),
                    location.line(),
                    location.column()
                ));
            }
            if let Some(msg) = info.payload().downcast_ref::<&str>() {
                handle.push(format!("message: {msg}"));
            } else if let Some(msg) = info.payload().downcast_ref::<String>() {
                handle.push(format!("message: {msg}"));
            }
        }
        prev(info);
    }));
}

#[derive(Debug)]
struct DebugLogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl DebugLogBuffer {
    fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct DebugLogHandle {
    inner: Arc<Mutex<DebugLogBuffer>>,
}

impl DebugLogHandle {
    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    pub fn writer(&self) -> DebugLogWriter {
        DebugLogWriter::new(self.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `count` lines ending `from_end` lines before the newest one.
    pub fn tail(&self, count: usize, from_end: usize) -> Vec<String> {
        let Ok(buffer) = self.inner.lock() else {
            return Vec::new();
        };
        let end = buffer.lines.len().saturating_sub(from_end);
        let start = end.saturating_sub(count);
        buffer.lines.range(start..end).cloned().collect()
    }
}

/// `io::Write` adapter that splits writes into lines.
#[derive(Debug)]
pub struct DebugLogWriter {
    handle: DebugLogHandle,
    pending: Vec<u8>,
}

impl DebugLogWriter {
    pub fn new(handle: DebugLogHandle) -> Self {
        Self {
            handle,
            pending: Vec::new(),
        }
    }

    fn flush_pending(&mut self, force: bool) {
        let cut = if force {
            self.pending.len()
        } else {
            match self.pending.iter().rposition(|b| *b == b'\n') {
                Some(pos) => pos + 1,
                None => return,
            }
        };
        let drained: Vec<u8> = self.pending.drain(..cut).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n').filter(|l| !l.is_empty()) {
            self.handle.push(line.to_string());
        }
    }
}

impl Write for DebugLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for DebugLogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}

/// Bordered panel showing the newest log lines. PageUp/PageDown and the
/// mouse wheel scroll back; new output snaps to the bottom only while the
/// view is already there.
#[derive(Debug)]
pub struct DebugLogComponent {
    handle: DebugLogHandle,
    /// Lines scrolled back from the newest.
    back: usize,
    last_view: usize,
}

impl DebugLogComponent {
    pub fn new(max_lines: usize) -> (Self, DebugLogHandle) {
        let handle = DebugLogHandle {
            inner: Arc::new(Mutex::new(DebugLogBuffer::new(max_lines))),
        };
        (
            Self {
                handle: handle.clone(),
                back: 0,
                last_view: 0,
            },
            handle,
        )
    }

    pub fn new_default() -> (Self, DebugLogHandle) {
        Self::new(DEFAULT_MAX_LINES)
    }

    pub fn scroll_back(&mut self, lines: usize) {
        let max = self.handle.len().saturating_sub(self.last_view.max(1));
        self.back = (self.back + lines).min(max);
    }

    pub fn scroll_forward(&mut self, lines: usize) {
        self.back = self.back.saturating_sub(lines);
    }

    pub fn is_following(&self) -> bool {
        self.back == 0
    }
}

impl Component for DebugLogComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = Style::default()
            .fg(theme::debug_fg())
            .bg(theme::debug_bg());
        frame.fill(area, style);
        let title = if self.is_following() {
            " debug log (F12) ".to_string()
        } else {
            format!(" debug log (F12) -{} ", self.back)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(style);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        self.last_view = inner.height as usize;
        let lines = self.handle.tail(self.last_view, self.back);
        let buffer = frame.buffer_mut();
        for (i, line) in lines.iter().enumerate() {
            safe_set_string(buffer, inner, inner.x, inner.y + i as u16, line, style);
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        let page = self.last_view.max(1);
        match event {
            Event::Key(key) => match key.code {
                KeyCode::PageUp => {
                    self.scroll_back(page);
                    true
                }
                KeyCode::PageDown => {
                    self.scroll_forward(page);
                    true
                }
                _ => false,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => {
                    self.scroll_back(3);
                    true
                }
                MouseEventKind::ScrollDown => {
                    self.scroll_forward(3);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::buffer::Buffer;

    #[test]
    fn buffer_keeps_only_the_newest_lines() {
        let (_comp, handle) = DebugLogComponent::new(3);
        for line in ["one", "two", "three", "four"] {
            handle.push(line);
        }
        assert_eq!(handle.len(), 3);
        assert_eq!(handle.tail(10, 0), vec!["two", "three", "four"]);
        assert_eq!(handle.tail(1, 1), vec!["three"]);
    }

    #[test]
    fn writer_splits_lines_and_flushes_partials() {
        let (_comp, handle) = DebugLogComponent::new(10);
        let mut writer = handle.writer();
        writer.write_all(b"first line\nsecond line\npartial").unwrap();
        assert_eq!(handle.len(), 2);
        writer.flush().unwrap();
        assert_eq!(handle.tail(10, 0), vec!["first line", "second line", "partial"]);
    }

    #[test]
    fn page_keys_scroll_back_and_forward() {
        let (mut comp, handle) = DebugLogComponent::new(100);
        for i in 0..20 {
            handle.push(format!("line{i}"));
        }
        let area = Rect::new(0, 0, 20, 7);
        let mut buffer = Buffer::empty(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut buffer);
            comp.render(&mut frame, area, &ComponentContext::new(true));
        }
        assert_eq!(buffer.cell((1, 5)).unwrap().symbol(), "l");
        assert!(comp.is_following());

        let page_up = Event::Key(KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE));
        assert!(comp.handle_event(&page_up, &ComponentContext::default()));
        assert_eq!(comp.back, 5);
        let page_down = Event::Key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
        comp.handle_event(&page_down, &ComponentContext::default());
        comp.handle_event(&page_down, &ComponentContext::default());
        assert!(comp.is_following());
    }
}
