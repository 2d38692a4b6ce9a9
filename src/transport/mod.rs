use std::sync::Arc;

use tracing::debug;

use crate::models::PlaybackStatus;
use crate::session::{MediaSession, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    Play,
    Pause,
    SkipNext,
    SkipPrevious,
}

impl std::fmt::Display for TransportCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportCommand::Play => write!(f, "play"),
            TransportCommand::Pause => write!(f, "pause"),
            TransportCommand::SkipNext => write!(f, "next"),
            TransportCommand::SkipPrevious => write!(f, "previous"),
        }
    }
}

/// Turns user intent into transport commands, but only the ones that make
/// sense for the session's current playback status.
pub struct TransportController {
    session: Arc<dyn MediaSession>,
}

impl TransportController {
    pub fn new(session: Arc<dyn MediaSession>) -> Self {
        Self { session }
    }

    pub fn toggle_play_pause(&self) -> Option<TransportCommand> {
        match self.current_status()? {
            PlaybackStatus::Playing => self.submit(TransportCommand::Pause),
            PlaybackStatus::Paused => self.submit(TransportCommand::Play),
            PlaybackStatus::Other => None,
        }
    }

    pub fn next_track(&self) -> Option<TransportCommand> {
        match self.current_status()? {
            PlaybackStatus::Playing => self.submit(TransportCommand::SkipNext),
            PlaybackStatus::Paused | PlaybackStatus::Other => None,
        }
    }

    pub fn previous_track(&self) -> Option<TransportCommand> {
        match self.current_status()? {
            PlaybackStatus::Playing => self.submit(TransportCommand::SkipPrevious),
            PlaybackStatus::Paused | PlaybackStatus::Other => None,
        }
    }

    /// Fresh status, or `None` when the session can't be used at all.
    fn current_status(&self) -> Option<PlaybackStatus> {
        if !self.session.is_valid() {
            debug!("Session {} is gone, ignoring command", self.session.name());
            return None;
        }
        self.session.playback_status().ok()
    }

    fn submit(&self, command: TransportCommand) -> Option<TransportCommand> {
        let sent: SessionResult<()> = match command {
            TransportCommand::Play => self.session.try_play(),
            TransportCommand::Pause => self.session.try_pause(),
            TransportCommand::SkipNext => self.session.try_skip_next(),
            TransportCommand::SkipPrevious => self.session.try_skip_previous(),
        };
        // Best effort, at most once: the player's answer only ever shows up
        // as a later change notification, so a failed send is just dropped.
        if let Err(e) = sent {
            debug!("Failed to send {command}: {e}");
        }
        Some(command)
    }
}
