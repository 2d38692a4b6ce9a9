//! In-memory session and terminal sink for tests.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use super::{ChangeHandler, MediaSession, SessionError, SessionResult, Subscription};
use crate::models::{MediaInfo, PlaybackStatus, SessionFacet, TimelineInfo};

/// Ordered record of everything the fake session and sink observed.
pub type Journal = Arc<Mutex<Vec<String>>>;

struct FakeState {
    status: PlaybackStatus,
    media: MediaInfo,
    timeline: TimelineInfo,
    valid: bool,
}

pub struct FakeSession {
    state: Mutex<FakeState>,
    handlers: Mutex<Vec<(SessionFacet, ChangeHandler)>>,
    journal: Journal,
}

impl FakeSession {
    pub fn new(status: PlaybackStatus, title: &str, artist: &str) -> Self {
        Self::with_journal(status, title, artist, Journal::default())
    }

    pub fn with_journal(status: PlaybackStatus, title: &str, artist: &str, journal: Journal) -> Self {
        Self {
            state: Mutex::new(FakeState {
                status,
                media: MediaInfo::new(title, artist),
                timeline: TimelineInfo::default(),
                valid: true,
            }),
            handlers: Mutex::new(Vec::new()),
            journal,
        }
    }

    pub fn set_status(&self, status: PlaybackStatus) {
        self.state.lock().unwrap().status = status;
    }

    pub fn set_media(&self, title: &str, artist: &str) {
        self.state.lock().unwrap().media = MediaInfo::new(title, artist);
    }

    pub fn invalidate(&self) {
        self.state.lock().unwrap().valid = false;
    }

    /// Transport commands received so far, oldest first.
    pub fn commands(&self) -> Vec<String> {
        self.journal
            .lock()
            .unwrap()
            .iter()
            .filter_map(|entry| entry.strip_prefix("cmd:").map(str::to_owned))
            .collect()
    }

    pub fn subscribed(&self) -> Vec<SessionFacet> {
        self.handlers.lock().unwrap().iter().map(|(f, _)| *f).collect()
    }

    /// Simulate the provider announcing a change.
    pub fn fire(&self, facet: SessionFacet) {
        for (subscribed, handler) in self.handlers.lock().unwrap().iter() {
            if *subscribed == facet {
                handler();
            }
        }
    }

    fn record(&self, command: &str) -> SessionResult<()> {
        self.journal.lock().unwrap().push(format!("cmd:{command}"));
        Ok(())
    }
}

impl MediaSession for FakeSession {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_valid(&self) -> bool {
        self.state.lock().unwrap().valid
    }

    fn playback_status(&self) -> SessionResult<PlaybackStatus> {
        let state = self.state.lock().unwrap();
        if !state.valid {
            return Err(SessionError::Bus(zbus::Error::Failure("gone".into())));
        }
        Ok(state.status)
    }

    fn media_info(&self) -> SessionResult<MediaInfo> {
        Ok(self.state.lock().unwrap().media.clone())
    }

    fn timeline_info(&self) -> SessionResult<TimelineInfo> {
        Ok(self.state.lock().unwrap().timeline)
    }

    fn try_play(&self) -> SessionResult<()> {
        self.record("play")
    }

    fn try_pause(&self) -> SessionResult<()> {
        self.record("pause")
    }

    fn try_skip_next(&self) -> SessionResult<()> {
        self.record("next")
    }

    fn try_skip_previous(&self) -> SessionResult<()> {
        self.record("previous")
    }

    fn subscribe(
        &self,
        facet: SessionFacet,
        handler: ChangeHandler,
    ) -> SessionResult<Subscription> {
        self.handlers.lock().unwrap().push((facet, handler));
        Ok(Subscription::new(facet, None))
    }
}

/// A terminal stand-in. Every flush is journaled as one `out:` entry.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pending: Arc<Mutex<Vec<u8>>>,
    written: Arc<Mutex<Vec<u8>>>,
    journal: Journal,
}

impl RecordingSink {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    /// Everything written so far, flushed or not.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.written.lock().unwrap()).into_owned()
    }

    pub fn clear(&self) {
        self.written.lock().unwrap().clear();
    }
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.lock().unwrap().extend_from_slice(buf);
        self.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut pending = self.pending.lock().unwrap();
        if !pending.is_empty() {
            let text = String::from_utf8_lossy(&pending).into_owned();
            self.journal.lock().unwrap().push(format!("out:{text}"));
            pending.clear();
        }
        Ok(())
    }
}
