use std::sync::Arc;
use std::thread::JoinHandle;

use crate::models::{MediaInfo, PlaybackStatus, SessionFacet, TimelineInfo};

mod mpris;
pub use mpris::MprisProvider;

#[cfg(test)]
pub mod fake;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("D-Bus error: {0}")]
    Bus(#[from] zbus::Error),
    #[error("Failed to start change listener: {0}")]
    Listener(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Callback invoked by a session when one of its facets changes. It carries
/// no payload; receivers are expected to re-query the session.
pub type ChangeHandler = Box<dyn Fn() + Send + 'static>;

/// Something that can hand out "the current media session".
pub trait MediaProvider {
    fn request_current_session(&self) -> SessionResult<Option<Arc<dyn MediaSession>>>;
}

/// The query, command and subscription surface of one media session.
///
/// The `try_*` commands are submitted without waiting for the player to act
/// on them. `Ok(())` only means the request left this process.
pub trait MediaSession: Send + Sync {
    /// Name of the player behind this session, for display and logs.
    fn name(&self) -> &str;

    fn is_valid(&self) -> bool;

    fn playback_status(&self) -> SessionResult<PlaybackStatus>;
    fn media_info(&self) -> SessionResult<MediaInfo>;
    fn timeline_info(&self) -> SessionResult<TimelineInfo>;

    fn try_play(&self) -> SessionResult<()>;
    fn try_pause(&self) -> SessionResult<()>;
    fn try_skip_next(&self) -> SessionResult<()>;
    fn try_skip_previous(&self) -> SessionResult<()>;

    /// Register `handler` to be called every time `facet` changes. Handlers
    /// may run on any thread, possibly concurrently with each other.
    fn subscribe(&self, facet: SessionFacet, handler: ChangeHandler)
    -> SessionResult<Subscription>;
}

/// Keeps a change listener registered. Listeners stay alive until the
/// session goes away; dropping the handle does not stop them.
pub struct Subscription {
    facet: SessionFacet,
    _listener: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(facet: SessionFacet, listener: Option<JoinHandle<()>>) -> Self {
        Self {
            facet,
            _listener: listener,
        }
    }

    pub fn facet(&self) -> SessionFacet {
        self.facet
    }
}
