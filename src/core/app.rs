//! Main application loop

use anyhow::Result;
use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;

use crate::client::transport::Transport;
use crate::client::{PollError, SampleSource};
use crate::config::Config;
use crate::core::dashboard::DashboardController;
use crate::core::events::{poll_tick_interval, Event, EventHandler, EventResult, KeyBindings};
use crate::core::state::StatusState;
use crate::ui::renderer::Renderer;
use crate::ui::theme::Theme;

pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    controller: DashboardController,
    status: StatusState,
    theme: Theme,
    config: Config,
    /// Used to log in again on reconnect
    transport: Arc<dyn Transport>,
    /// The error that stopped polling, if any
    failure: Option<PollError>,
}

impl App {
    pub fn new(
        controller: DashboardController,
        transport: Arc<dyn Transport>,
        endpoint: String,
        config: Config,
    ) -> Result<Self> {
        let backend = CrosstermBackend::new(std::io::stdout());
        let terminal = Terminal::new(backend)?;
        let theme = Theme::from_name(&config.display.theme);

        Ok(Self {
            terminal,
            controller,
            status: StatusState::new(endpoint),
            theme,
            config,
            transport,
            failure: None,
        })
    }

    /// Run until the user quits. If polling had stopped on a fatal error, that
    /// error is returned after the terminal is restored.
    pub async fn run(mut self) -> Result<()> {
        self.setup_terminal()?;

        let (mut event_handler, event_tx) = EventHandler::new();
        EventHandler::spawn_sources(
            event_tx,
            Duration::from_millis(self.config.display.frame_interval_ms.max(1)),
            poll_tick_interval(self.config.poll_settings().interval),
        );

        self.render()?;
        let result = self.event_loop(&mut event_handler).await;

        // Cleanup
        let restored = self.restore_terminal();
        self.controller.shutdown().await;
        result?;
        restored?;

        match self.failure {
            Some(e) => Err(anyhow::Error::new(e).context("polling stopped")),
            None => Ok(()),
        }
    }

    fn setup_terminal(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide,
        )?;
        Ok(())
    }

    fn restore_terminal(&mut self) -> Result<()> {
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show,
        )?;
        Ok(())
    }

    async fn event_loop(&mut self, event_handler: &mut EventHandler) -> Result<()> {
        loop {
            let Some(event) = event_handler.next().await else {
                break;
            };

            match self.handle_event(event).await? {
                EventResult::Continue => {}
                EventResult::Quit => break,
            }
        }
        Ok(())
    }

    async fn handle_event(&mut self, event: Event) -> Result<EventResult> {
        match event {
            Event::Key(key) => self.handle_key(key).await,
            Event::Resize(width, height) => {
                tracing::debug!(width, height, "terminal resized");
                self.render()?;
                Ok(EventResult::Continue)
            }
            Event::Frame => {
                self.controller.frame_cycle();
                self.render()?;
                Ok(EventResult::Continue)
            }
            Event::Poll => {
                self.poll().await;
                Ok(EventResult::Continue)
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult> {
        if key.kind != KeyEventKind::Press {
            return Ok(EventResult::Continue);
        }

        if KeyBindings::quit().matches(&key)
            || KeyBindings::quit_alt().matches(&key)
            || KeyBindings::escape().matches(&key)
        {
            return Ok(EventResult::Quit);
        }

        if KeyBindings::reset_peaks().matches(&key) {
            self.controller.reset_peaks();
            tracing::info!("throughput peaks reset");
        } else if KeyBindings::reconnect().matches(&key) && self.failure.is_some() {
            self.reconnect().await;
        }

        self.render()?;
        Ok(EventResult::Continue)
    }

    /// One data cycle. Polling stays off after a fatal error until reconnect.
    async fn poll(&mut self) {
        if self.failure.is_some() {
            return;
        }

        match self.controller.data_cycle().await {
            Ok(outcome) => self.status.record(outcome, self.controller.source()),
            Err(e) => {
                tracing::error!(error = %e, "polling stopped");
                self.status.record_fatal(e.to_string());
                self.failure = Some(e);
            }
        }
    }

    async fn reconnect(&mut self) {
        let source = SampleSource::connect(
            self.transport.clone(),
            &self.config.credentials(),
            self.config.poll_settings(),
        )
        .await;
        self.controller.reconnect(source).await;
        self.status.reset();
        self.failure = None;
    }

    fn render(&mut self) -> Result<()> {
        let controller = &self.controller;
        let status = &self.status;
        let theme = &self.theme;
        self.terminal.draw(|frame| {
            Renderer::render(frame, controller, status, theme);
        })?;
        Ok(())
    }
}
