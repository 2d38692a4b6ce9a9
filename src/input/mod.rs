use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use std::io;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

use crate::realtime::LoopEvent;

/// Most records handed to the driver in one batch.
const BATCH_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Exit,
    TogglePlayPause,
    NextTrack,
    PreviousTrack,
}

impl KeyAction {
    /// Maps a terminal event to an action. Only key-down events for the
    /// bound keys produce one.
    pub fn from_event(event: &Event) -> Option<Self> {
        let Event::Key(KeyEvent { code, kind, .. }) = event else {
            return None;
        };
        if !matches!(kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return None;
        }
        match code {
            KeyCode::Char('x') => Some(KeyAction::Exit),
            KeyCode::Char(' ') => Some(KeyAction::TogglePlayPause),
            KeyCode::Char('n') => Some(KeyAction::NextTrack),
            KeyCode::Char('p') => Some(KeyAction::PreviousTrack),
            _ => None,
        }
    }

    /// Text shown on the prompt row when the key is accepted.
    pub fn hint(&self) -> &'static str {
        match self {
            KeyAction::Exit => "exit",
            KeyAction::TogglePlayPause => "play/pause",
            KeyAction::NextTrack => "next",
            KeyAction::PreviousTrack => "prev",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Running,
    ExitRequested,
}

impl InputState {
    pub fn on_action(self, action: KeyAction) -> Self {
        match (self, action) {
            (InputState::ExitRequested, _) => InputState::ExitRequested,
            (InputState::Running, KeyAction::Exit) => InputState::ExitRequested,
            (
                InputState::Running,
                KeyAction::TogglePlayPause | KeyAction::NextTrack | KeyAction::PreviousTrack,
            ) => InputState::Running,
        }
    }

    pub fn exit_requested(&self) -> bool {
        *self == InputState::ExitRequested
    }
}

/// A blocking source of terminal events.
pub trait InputSource: Send + 'static {
    /// Block until at least one event is available, then return it together
    /// with whatever else is already queued.
    fn read_batch(&mut self) -> io::Result<Vec<Event>>;
}

pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn read_batch(&mut self) -> io::Result<Vec<Event>> {
        let mut batch = vec![event::read()?];
        while batch.len() < BATCH_SIZE && event::poll(Duration::ZERO)? {
            batch.push(event::read()?);
        }
        Ok(batch)
    }
}

/// Reads input on its own thread and posts each batch to the driver.
pub struct InputReader;

impl InputReader {
    pub fn spawn(mut source: impl InputSource, queue: Sender<LoopEvent>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("input".to_string())
            .spawn(move || {
                loop {
                    match source.read_batch() {
                        Ok(batch) => {
                            if queue.send(LoopEvent::Input(batch)).is_err() {
                                debug!("Driver gone, input reader stopping");
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to read terminal input: {e}");
                            let _ = queue.send(LoopEvent::InputClosed);
                            return;
                        }
                    }
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers, MouseEvent, MouseEventKind};
    use std::collections::VecDeque;
    use std::sync::mpsc;

    fn key(c: char, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    struct ScriptedInput(VecDeque<Vec<Event>>);

    impl InputSource for ScriptedInput {
        fn read_batch(&mut self) -> io::Result<Vec<Event>> {
            self.0
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script done"))
        }
    }

    #[test]
    fn test_key_mapping() {
        let press = |c| KeyAction::from_event(&key(c, KeyEventKind::Press));
        assert_eq!(press('x'), Some(KeyAction::Exit));
        assert_eq!(press(' '), Some(KeyAction::TogglePlayPause));
        assert_eq!(press('n'), Some(KeyAction::NextTrack));
        assert_eq!(press('p'), Some(KeyAction::PreviousTrack));
        assert_eq!(press('q'), None);
        assert_eq!(press('X'), None);
    }

    #[test]
    fn test_only_key_down_counts() {
        assert_eq!(KeyAction::from_event(&key('x', KeyEventKind::Release)), None);
        assert_eq!(
            KeyAction::from_event(&key('n', KeyEventKind::Repeat)),
            Some(KeyAction::NextTrack)
        );

        let mouse = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(KeyAction::from_event(&mouse), None);
        assert_eq!(KeyAction::from_event(&Event::Resize(80, 24)), None);
        assert_eq!(KeyAction::from_event(&Event::FocusGained), None);
    }

    #[test]
    fn test_hints() {
        assert_eq!(KeyAction::Exit.hint(), "exit");
        assert_eq!(KeyAction::TogglePlayPause.hint(), "play/pause");
        assert_eq!(KeyAction::NextTrack.hint(), "next");
        assert_eq!(KeyAction::PreviousTrack.hint(), "prev");
    }

    #[test]
    fn test_exit_is_terminal() {
        let state = InputState::default();
        assert!(!state.exit_requested());

        for action in [
            KeyAction::TogglePlayPause,
            KeyAction::NextTrack,
            KeyAction::PreviousTrack,
        ] {
            assert_eq!(state.on_action(action), InputState::Running);
        }

        let exited = state.on_action(KeyAction::Exit);
        assert!(exited.exit_requested());
        assert_eq!(
            exited.on_action(KeyAction::TogglePlayPause),
            InputState::ExitRequested
        );
    }

    #[test]
    fn test_reader_forwards_batches_then_reports_close() {
        let script = ScriptedInput(VecDeque::from(vec![
            vec![key(' ', KeyEventKind::Press), key(' ', KeyEventKind::Release)],
            vec![key('x', KeyEventKind::Press)],
        ]));
        let (tx, rx) = mpsc::channel();

        InputReader::spawn(script, tx).unwrap().join().unwrap();

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], LoopEvent::Input(batch) if batch.len() == 2));
        assert!(matches!(&events[1], LoopEvent::Input(batch) if batch.len() == 1));
        assert_eq!(events[2], LoopEvent::InputClosed);
    }
}
