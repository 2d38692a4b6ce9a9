use anyhow::{Context, Result};
use crossterm::event::Event;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::bridge::NotificationBridge;
use crate::input::{InputReader, InputSource, InputState, KeyAction, TerminalInput};
use crate::models::SessionFacet;
use crate::render::{self, RenderState};
use crate::session::MediaSession;
use crate::transport::TransportController;

/// Everything the driver reacts to arrives through one queue of these.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    Input(Vec<Event>),
    Changed(SessionFacet),
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Running,
    Exiting,
}

/// Owns the terminal while the realtime display runs. Only this type writes
/// to `out`, so repaints never interleave.
pub struct RealtimeSession<W: Write> {
    session: Arc<dyn MediaSession>,
    controller: TransportController,
    render: RenderState,
    input: InputState,
    phase: Phase,
    out: W,
    exit_delay: Duration,
}

impl<W: Write> RealtimeSession<W> {
    pub fn new(session: Arc<dyn MediaSession>, out: W, exit_delay: Duration) -> Self {
        Self {
            controller: TransportController::new(Arc::clone(&session)),
            session,
            render: RenderState::new(),
            input: InputState::default(),
            phase: Phase::Initializing,
            out,
            exit_delay,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub fn exit_requested(&self) -> bool {
        self.input.exit_requested()
    }

    #[cfg(test)]
    pub fn render_state(&self) -> &RenderState {
        &self.render
    }

    /// Run the whole lifecycle, reading keys from `input`. The terminal is
    /// restored even when setup fails half way.
    pub fn run(&mut self, input: impl InputSource) -> Result<()> {
        let (tx, rx) = mpsc::channel();

        let started = self.initialize(&tx).and_then(|bridge| {
            InputReader::spawn(input, tx).context("Failed to start input reader")?;
            Ok(bridge)
        });
        let result = started.map(|bridge| {
            debug!("Subscribed to {:?}", bridge.facets());
            self.run_loop(&rx);
        });

        let restored = self.shutdown().context("Failed to restore terminal");
        result?;
        restored
    }

    /// Set up the screen, subscribe to changes and paint the first frame.
    pub fn initialize(&mut self, queue: &Sender<LoopEvent>) -> Result<NotificationBridge> {
        render::enter_screen(&mut self.out).context("Failed to switch to alternate screen")?;
        let bridge = NotificationBridge::register(self.session.as_ref(), queue)
            .context("Failed to subscribe to session changes")?;
        self.repaint();
        self.phase = Phase::Running;
        info!("Realtime display running for {}", self.session.name());
        Ok(bridge)
    }

    pub fn run_loop(&mut self, events: &Receiver<LoopEvent>) {
        while !self.input.exit_requested() {
            match events.recv() {
                Ok(event) => self.handle(event),
                Err(_) => {
                    warn!("Event queue closed");
                    break;
                }
            }
        }
    }

    pub fn handle(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::Input(batch) => {
                for record in &batch {
                    if self.input.exit_requested() {
                        break;
                    }
                    if let Some(action) = KeyAction::from_event(record) {
                        self.on_key(action);
                    }
                }
            }
            LoopEvent::Changed(facet) => {
                debug!("Repainting after {facet} change");
                self.repaint();
            }
            LoopEvent::InputClosed => {
                warn!("Keyboard input closed, exiting");
                self.input = self.input.on_action(KeyAction::Exit);
            }
        }
    }

    /// Print the exit message, wait briefly, and give the terminal back.
    pub fn shutdown(&mut self) -> io::Result<()> {
        if self.phase == Phase::Running {
            self.render.show_exit(&mut self.out)?;
            thread::sleep(self.exit_delay);
        }
        self.phase = Phase::Exiting;
        debug!("Leaving realtime display at \"{}\"", self.render.title());
        render::leave_screen(&mut self.out)
    }

    fn on_key(&mut self, action: KeyAction) {
        // The hint goes out before the command, which may be slow.
        if let Err(e) = self.render.show_hint(action.hint(), &mut self.out) {
            error!("Failed to show hint: {e}");
        }
        self.input = self.input.on_action(action);

        let sent = match action {
            KeyAction::Exit => return,
            KeyAction::TogglePlayPause => self.controller.toggle_play_pause(),
            KeyAction::NextTrack => self.controller.next_track(),
            KeyAction::PreviousTrack => self.controller.previous_track(),
        };
        match sent {
            Some(command) => debug!("Sent {command} to {}", self.session.name()),
            None => debug!("{action:?} not applicable right now"),
        }
    }

    fn repaint(&mut self) {
        if let Err(e) = self.render.repaint(self.session.as_ref(), &mut self.out) {
            error!("Repaint failed: {e}");
        }
    }
}

/// Take over the real terminal and run until the user exits.
pub fn run(session: Arc<dyn MediaSession>, exit_delay: Duration) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut display = RealtimeSession::new(session, io::stdout(), exit_delay);
    let result = display.run(TerminalInput);

    disable_raw_mode()?;
    result
}
