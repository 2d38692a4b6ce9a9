use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use zbus::blocking::Connection;
use zbus::blocking::fdo::DBusProxy;
use zbus::names::BusName;
use zbus::zvariant::{OwnedValue, Value};

use super::{ChangeHandler, MediaProvider, MediaSession, SessionError, SessionResult, Subscription};
use crate::models::{MediaInfo, PlaybackStatus, SessionFacet, TimelineInfo, printable};

const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";

#[zbus::proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2",
    gen_async = false
)]
trait Player {
    #[zbus(no_reply)]
    fn play(&self) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn pause(&self) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn next(&self) -> zbus::Result<()>;

    #[zbus(no_reply)]
    fn previous(&self) -> zbus::Result<()>;

    #[zbus(signal)]
    fn seeked(&self, position: i64) -> zbus::Result<()>;

    #[zbus(property)]
    fn playback_status(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    // Players never announce position changes, so it must not be cached.
    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> zbus::Result<i64>;
}

/// Finds MPRIS players on the session bus.
pub struct MprisProvider {
    conn: Connection,
    preferred: Option<String>,
}

impl MprisProvider {
    pub fn connect(preferred: Option<String>) -> SessionResult<Self> {
        let conn = Connection::session()?;
        Ok(Self { conn, preferred })
    }

    fn player_names(&self) -> SessionResult<Vec<String>> {
        let dbus = DBusProxy::new(&self.conn)?;
        let names = dbus.list_names().map_err(zbus::Error::from)?;
        Ok(names
            .iter()
            .map(|name| name.as_str())
            .filter(|name| name.starts_with(MPRIS_PREFIX))
            .map(str::to_owned)
            .collect())
    }

    fn open(&self, name: &str) -> SessionResult<MprisSession> {
        let player = PlayerProxy::builder(&self.conn)
            .destination(name.to_owned())?
            .build()?;
        let dbus = DBusProxy::new(&self.conn)?;
        Ok(MprisSession {
            name: name.to_owned(),
            dbus,
            player,
        })
    }
}

impl MediaProvider for MprisProvider {
    fn request_current_session(&self) -> SessionResult<Option<Arc<dyn MediaSession>>> {
        let mut candidates = Vec::new();
        for name in self.player_names()? {
            let status = match self.open(&name).and_then(|s| s.playback_status()) {
                Ok(status) => status,
                Err(e) => {
                    debug!("Skipping player {name}: {e}");
                    continue;
                }
            };
            candidates.push((name, status));
        }

        let Some(name) = pick_current(&candidates, self.preferred.as_deref()) else {
            return Ok(None);
        };
        info!("Using media session {name}");
        Ok(Some(Arc::new(self.open(&name)?)))
    }
}

/// Chooses "the current session" among the players on the bus: a configured
/// preference wins, then whoever is playing, then whoever is paused.
fn pick_current(candidates: &[(String, PlaybackStatus)], preferred: Option<&str>) -> Option<String> {
    if let Some(preferred) = preferred {
        let wanted = preferred.to_lowercase();
        let found = candidates.iter().find(|(name, _)| {
            short_name(name).to_lowercase().contains(&wanted)
        });
        match found {
            Some((name, _)) => return Some(name.clone()),
            None => warn!("Preferred player '{preferred}' not found, picking another"),
        }
    }

    [PlaybackStatus::Playing, PlaybackStatus::Paused]
        .iter()
        .find_map(|wanted| candidates.iter().find(|(_, status)| status == wanted))
        .or_else(|| candidates.first())
        .map(|(name, _)| name.clone())
}

fn short_name(bus_name: &str) -> &str {
    bus_name.strip_prefix(MPRIS_PREFIX).unwrap_or(bus_name)
}

pub struct MprisSession {
    name: String,
    dbus: DBusProxy<'static>,
    player: PlayerProxy<'static>,
}

impl MprisSession {
    fn spawn_listener(
        &self,
        facet: SessionFacet,
        handler: ChangeHandler,
    ) -> SessionResult<thread::JoinHandle<()>> {
        let player = self.player.clone();
        let name = self.name.clone();
        let listener = thread::Builder::new()
            .name(format!("{facet}-listener"))
            .spawn(move || {
                match facet {
                    SessionFacet::Metadata => {
                        for _ in player.receive_metadata_changed() {
                            handler();
                        }
                    }
                    SessionFacet::PlaybackInfo => {
                        for _ in player.receive_playback_status_changed() {
                            handler();
                        }
                    }
                    SessionFacet::Timeline => match player.receive_seeked() {
                        Ok(signals) => {
                            for _ in signals {
                                handler();
                            }
                        }
                        Err(e) => warn!("Failed to listen for {facet} changes on {name}: {e}"),
                    },
                }
                debug!("{facet} listener for {name} stopped");
            })
            .map_err(|e| SessionError::Listener(e.to_string()))?;
        Ok(listener)
    }
}

impl MediaSession for MprisSession {
    fn name(&self) -> &str {
        short_name(&self.name)
    }

    fn is_valid(&self) -> bool {
        let Ok(name) = BusName::try_from(self.name.as_str()) else {
            return false;
        };
        self.dbus.name_has_owner(name).unwrap_or(false)
    }

    fn playback_status(&self) -> SessionResult<PlaybackStatus> {
        let status = self.player.playback_status()?;
        Ok(status.parse().unwrap_or_default())
    }

    fn media_info(&self) -> SessionResult<MediaInfo> {
        let metadata = self.player.metadata()?;
        Ok(media_info_from(&metadata))
    }

    fn timeline_info(&self) -> SessionResult<TimelineInfo> {
        let position = self.player.position()?;
        let metadata = self.player.metadata()?;
        Ok(TimelineInfo {
            position: micros(position),
            end: track_length(&metadata).unwrap_or_default(),
        })
    }

    fn try_play(&self) -> SessionResult<()> {
        Ok(self.player.play()?)
    }

    fn try_pause(&self) -> SessionResult<()> {
        Ok(self.player.pause()?)
    }

    fn try_skip_next(&self) -> SessionResult<()> {
        Ok(self.player.next()?)
    }

    fn try_skip_previous(&self) -> SessionResult<()> {
        Ok(self.player.previous()?)
    }

    fn subscribe(
        &self,
        facet: SessionFacet,
        handler: ChangeHandler,
    ) -> SessionResult<Subscription> {
        let listener = self.spawn_listener(facet, handler)?;
        Ok(Subscription::new(facet, Some(listener)))
    }
}

fn media_info_from(metadata: &HashMap<String, OwnedValue>) -> MediaInfo {
    let title = metadata
        .get("xesam:title")
        .map(|v| strings(v).join(", "))
        .unwrap_or_default();

    let artist = ["xesam:albumArtist", "xesam:artist"]
        .iter()
        .filter_map(|key| metadata.get(*key))
        .map(|v| strings(v).join(", "))
        .find(|artist| !artist.is_empty())
        .unwrap_or_default();

    MediaInfo::new(title, artist)
}

fn strings(value: &Value<'_>) -> Vec<String> {
    match value {
        Value::Str(s) => vec![printable(s.as_str())],
        Value::Array(items) => items.inner().iter().flat_map(strings).collect(),
        Value::Value(inner) => strings(inner),
        _ => Vec::new(),
    }
}

fn track_length(metadata: &HashMap<String, OwnedValue>) -> Option<Duration> {
    match metadata.get("mpris:length").map(|v| &**v) {
        Some(Value::I64(us)) => Some(micros(*us)),
        Some(Value::U64(us)) => Some(Duration::from_micros(*us)),
        _ => None,
    }
}

fn micros(us: i64) -> Duration {
    Duration::from_micros(us.max(0) as u64)
}
