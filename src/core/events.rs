//! Event sources for the dashboard loop

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

/// All possible events in the system
#[derive(Debug, Clone)]
pub enum Event {
    // Input events
    Key(KeyEvent),
    Resize(u16, u16),

    // System events
    Frame, // Animation tick
    Poll,  // Data cycle tick; the sample source still throttles requests
}

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new() -> (Self, mpsc::UnboundedSender<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, tx)
    }

    /// Start terminal input, frame and poll tick tasks
    pub fn spawn_sources(
        event_tx: mpsc::UnboundedSender<Event>,
        frame_interval: Duration,
        poll_interval: Duration,
    ) {
        tokio::spawn(Self::terminal_events(event_tx.clone()));
        tokio::spawn(Self::tick_events(
            event_tx.clone(),
            frame_interval,
            Event::Frame,
        ));
        tokio::spawn(Self::tick_events(event_tx, poll_interval, Event::Poll));
    }

    async fn terminal_events(tx: mpsc::UnboundedSender<Event>) {
        use crossterm::event::{self, Event as CrosstermEvent};
        use futures::StreamExt;

        let mut reader = event::EventStream::new();
        while let Some(event_result) = reader.next().await {
            let event = match event_result {
                Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                _ => continue,
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    }

    async fn tick_events(tx: mpsc::UnboundedSender<Event>, interval: Duration, event: Event) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.send(event.clone()).is_err() {
                break;
            }
        }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Poll tick period for a given request interval. Ticking faster than the
/// interval keeps request timing close to it despite scheduling jitter.
pub fn poll_tick_interval(request_interval: Duration) -> Duration {
    (request_interval / 4).max(Duration::from_millis(50))
}

/// Key binding helper
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.code == self.key && event.modifiers == self.modifiers
    }
}

/// Standard key bindings
pub struct KeyBindings;

impl KeyBindings {
    pub fn quit() -> KeyBinding {
        KeyBinding::new(KeyCode::Char('q'))
    }

    pub fn quit_alt() -> KeyBinding {
        KeyBinding::ctrl(KeyCode::Char('c'))
    }

    pub fn escape() -> KeyBinding {
        KeyBinding::new(KeyCode::Esc)
    }

    pub fn reset_peaks() -> KeyBinding {
        KeyBinding::new(KeyCode::Char('r'))
    }

    pub fn reconnect() -> KeyBinding {
        KeyBinding::new(KeyCode::Char('c'))
    }
}
