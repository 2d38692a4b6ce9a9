use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::warn;

use crate::config::Config;
use crate::models::printable;
use crate::realtime;
use crate::session::{MediaProvider, MediaSession, MprisProvider, SessionResult};

pub const NO_MEDIA: &str = "No media currently playing.";

pub struct App {
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Without a session bus there is nothing to control, which is the same
    /// outcome as a bus with no players on it.
    fn provider(&self) -> Box<dyn MediaProvider> {
        match MprisProvider::connect(self.config.session.player.clone()) {
            Ok(provider) => Box::new(provider),
            Err(e) => {
                warn!("Failed to connect to the D-Bus session bus: {e}");
                Box::new(NoSessionBus)
            }
        }
    }

    /// Follow the current session until the user presses `x`.
    pub fn realtime(&self) -> Result<()> {
        let exit_delay = self.config.exit_delay();
        realtime_with(&*self.provider(), &mut io::stdout(), |session| {
            realtime::run(session, exit_delay)
        })
    }

    /// Print the current track and exit.
    pub fn once(&self) -> Result<()> {
        once_with(&*self.provider(), &mut io::stdout())
    }
}

struct NoSessionBus;

impl MediaProvider for NoSessionBus {
    fn request_current_session(&self) -> SessionResult<Option<Arc<dyn MediaSession>>> {
        Ok(None)
    }
}

/// Hand the current session to `run`, or report that there is none without
/// touching the terminal mode.
fn realtime_with(
    provider: &dyn MediaProvider,
    out: &mut impl Write,
    run: impl FnOnce(Arc<dyn MediaSession>) -> Result<()>,
) -> Result<()> {
    match current_session(provider, out)? {
        Some(session) => run(session),
        None => Ok(()),
    }
}

fn once_with(provider: &dyn MediaProvider, out: &mut impl Write) -> Result<()> {
    if let Some(session) = current_session(provider, out)? {
        print_now_playing(session.as_ref(), out)?;
    }
    Ok(())
}

/// Look up the session to control, telling the user when there is none.
fn current_session(
    provider: &dyn MediaProvider,
    out: &mut impl Write,
) -> Result<Option<Arc<dyn MediaSession>>> {
    let session = provider
        .request_current_session()
        .with_context(|| "Failed to look up the current media session")?;
    if session.is_none() {
        writeln!(out, "{NO_MEDIA}")?;
    }
    Ok(session)
}

fn print_now_playing(session: &dyn MediaSession, out: &mut impl Write) -> Result<()> {
    let media = session
        .media_info()
        .with_context(|| format!("Failed to read media info from {}", session.name()))?;
    writeln!(out, "{}", printable(&media.title))?;
    writeln!(out, "{}", printable(&media.artist))?;
    Ok(())
}
