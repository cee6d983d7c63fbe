use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// The reader's message pump.
///
/// Each iteration first calls the handler with `None` (a render tick: pending
/// ruler positions are applied, mailboxes drained and the screen drawn), then
/// waits up to `poll_interval` for input and drains every queued event before
/// the next tick. Bursts of mouse motion therefore collapse into one
/// positioning pass per tick.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Runs until the handler returns [`ControlFlow::Quit`].
    ///
    /// The handler gets `Some(event)` for input and `None` for a tick.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    /// Replays a fixed script of events, then reports nothing pending.
    struct Scripted {
        events: VecDeque<Event>,
    }

    impl InputDriver for Scripted {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.events.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.events
                .pop_front()
                .ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn drains_bursts_between_ticks() {
        let driver = Scripted {
            events: VecDeque::from(vec![key('a'), key('b'), key('c')]),
        };
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(0));
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                seen.push(event.is_some());
                // Quit on the second tick.
                if seen.iter().filter(|e| !**e).count() == 2 {
                    return Ok(ControlFlow::Quit);
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, vec![false, true, true, true, false]);
    }

    #[test]
    fn quit_from_an_event_stops_immediately() {
        let driver = Scripted {
            events: VecDeque::from(vec![key('q'), key('x')]),
        };
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(0));
        let mut events = 0;
        event_loop
            .run(|_, event| match event {
                Some(_) => {
                    events += 1;
                    Ok(ControlFlow::Quit)
                }
                None => Ok(ControlFlow::Continue),
            })
            .unwrap();
        assert_eq!(events, 1);
        assert_eq!(event_loop.driver().events.len(), 1);
    }
}
