use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    #[default]
    Other,
}

impl PlaybackStatus {
    /// Label for the action the play/pause key would perform.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            PlaybackStatus::Playing => "pause",
            PlaybackStatus::Paused => "play",
            PlaybackStatus::Other => "",
        }
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for PlaybackStatus {
    type Err = std::convert::Infallible;

    /// Parses an MPRIS `PlaybackStatus` value. Anything that is neither
    /// playing nor paused (including "Stopped") collapses to `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "playing" => PlaybackStatus::Playing,
            "paused" => PlaybackStatus::Paused,
            _ => PlaybackStatus::Other,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub title: String,
    pub artist: String,
}

impl MediaInfo {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// Drops control characters so player-supplied text cannot smuggle escape
/// sequences onto the terminal.
pub fn printable(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineInfo {
    pub position: Duration,
    pub end: Duration,
}

impl TimelineInfo {
    pub fn format(&self) -> String {
        let fmt = |d: Duration| {
            let secs = d.as_secs();
            format!("{}:{:02}", secs / 60, secs % 60)
        };
        format!("{}/{}", fmt(self.position), fmt(self.end))
    }
}

/// Which part of the session a change notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionFacet {
    Metadata,
    PlaybackInfo,
    Timeline,
}

impl SessionFacet {
    pub const ALL: [SessionFacet; 3] = [
        SessionFacet::Metadata,
        SessionFacet::PlaybackInfo,
        SessionFacet::Timeline,
    ];
}

impl std::fmt::Display for SessionFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionFacet::Metadata => write!(f, "metadata"),
            SessionFacet::PlaybackInfo => write!(f, "playback-info"),
            SessionFacet::Timeline => write!(f, "timeline"),
        }
    }
}
