use crossterm::{
    Command,
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use std::fmt;
use std::io::{self, Write};
use tracing::{trace, warn};

use crate::models::{MediaInfo, PlaybackStatus, printable};
use crate::session::MediaSession;

const TITLE_ROW: u16 = 0;
const ARTIST_ROW: u16 = 1;
const STATUS_ROW: u16 = 2;
const HELP_LINES: [&str; 3] = ["(p): Previous Track", "(n): Next Track", "(x): exit"];
/// Row that holds the key hint; the cursor rests here between repaints.
pub const PROMPT_ROW: u16 = STATUS_ROW + 1 + HELP_LINES.len() as u16;

/// Saves the window title on the terminal's title stack (xterm `CSI 22;0 t`).
pub struct PushTitle;

impl Command for PushTitle {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[22;0t")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Restores the window title saved by [`PushTitle`].
pub struct PopTitle;

impl Command for PopTitle {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[23;0t")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Remember the window title and switch to the alternate screen.
pub fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    queue!(out, PushTitle, EnterAlternateScreen, Clear(ClearType::All))?;
    out.flush()
}

/// Undo [`enter_screen`].
pub fn leave_screen(out: &mut impl Write) -> io::Result<()> {
    queue!(out, PopTitle, LeaveAlternateScreen)?;
    out.flush()
}

/// What is currently on screen. Every repaint rewrites the whole frame from
/// this, so painting the same state twice produces the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    title: String,
    artist: String,
    status: PlaybackStatus,
    hint: &'static str,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn status_line(&self) -> String {
        format!("( ): {}", self.status.toggle_label())
    }

    #[cfg(test)]
    pub fn hint(&self) -> &str {
        self.hint
    }

    /// Re-query the session and redraw the full frame.
    pub fn repaint(&mut self, session: &dyn MediaSession, out: &mut impl Write) -> io::Result<()> {
        let media = session.media_info().unwrap_or_else(|e| {
            warn!("Failed to read media info: {e}");
            MediaInfo::default()
        });
        let status = session.playback_status().unwrap_or_else(|e| {
            warn!("Failed to read playback status: {e}");
            PlaybackStatus::Other
        });
        match session.timeline_info() {
            Ok(timeline) => trace!("Timeline at {}", timeline.format()),
            Err(e) => trace!("No timeline: {e}"),
        }

        self.title = printable(&media.title);
        self.artist = printable(&media.artist);
        self.status = status;
        self.draw(out)
    }

    pub fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(
            out,
            MoveTo(0, TITLE_ROW),
            Clear(ClearType::CurrentLine),
            Print(&self.title),
            SetTitle(&self.title),
            MoveTo(0, ARTIST_ROW),
            Clear(ClearType::CurrentLine),
            Print(&self.artist),
            MoveTo(0, STATUS_ROW),
            Clear(ClearType::CurrentLine),
            Print(self.status_line()),
        )?;
        for (row, line) in (STATUS_ROW + 1..).zip(HELP_LINES) {
            queue!(out, MoveTo(0, row), Clear(ClearType::CurrentLine), Print(line))?;
        }
        self.draw_prompt(out)?;
        out.flush()
    }

    /// Replace the prompt row with `hint` and flush it to the terminal.
    pub fn show_hint(&mut self, hint: &'static str, out: &mut impl Write) -> io::Result<()> {
        self.hint = hint;
        self.draw_prompt(out)?;
        out.flush()
    }

    pub fn show_exit(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(
            out,
            MoveTo(0, PROMPT_ROW + 1),
            SetForegroundColor(Color::Red),
            Print("Exiting..."),
            ResetColor,
        )?;
        out.flush()
    }

    fn draw_prompt(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(
            out,
            MoveTo(0, PROMPT_ROW),
            Clear(ClearType::CurrentLine),
            Print(self.hint),
        )
    }
}
