//! Interactive terminal front-end.
//!
//! A single-threaded loop: draw, then wait for input no longer than the time
//! left before the next autoplay tick. No threads, no background timers.

pub mod input;
pub mod session;
pub mod view;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::Event;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use crate::app::App;
use crate::diagram::{DiagramRenderer, Ink, Line, Tone};
use crate::error::Result;

pub use session::TerminalSession;

/// Poll interval while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Run the interactive session until the user quits.
pub fn run<R: DiagramRenderer>(app: &mut App<R>) -> Result<()> {
    let session = TerminalSession::new()?;
    tracing::info!("interactive session started");

    let mut stdout = io::stdout();
    let mut dirty = true;

    while app.is_running() {
        if dirty {
            let (width, height) = session.size()?;
            paint(&mut stdout, &view::compose(app), width, height)?;
            dirty = false;
        }

        let now = Instant::now();
        let timeout = app
            .navigator()
            .time_until_tick(now)
            .map_or(IDLE_POLL, |t| t.min(IDLE_POLL));

        if session.poll_event(timeout)? {
            match session.read_event()? {
                Event::Key(key) => {
                    if let Some(command) = input::command_for(key) {
                        app.handle(command, Instant::now());
                        dirty = true;
                    }
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        if app.on_tick(Instant::now()) {
            dirty = true;
        }
    }

    app.shutdown();
    drop(session);
    Ok(())
}

/// Draw `lines` from the top-left corner, clipped to the terminal.
fn paint(out: &mut impl Write, lines: &[Line], width: u16, height: u16) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::All)
    )?;
    for (y, line) in lines.iter().take(height as usize).enumerate() {
        queue!(out, cursor::MoveTo(0, y as u16))?;
        let mut used = 0usize;
        for span in &line.spans {
            let remaining = (width as usize).saturating_sub(used);
            if remaining == 0 {
                break;
            }
            let text: String = span.text.chars().take(remaining).collect();
            used += text.chars().count();
            queue!(out, SetForegroundColor(color(span.tone, span.ink)))?;
            if span.ink == Ink::Strong {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
        }
    }
    out.flush()
}

fn color(tone: Tone, ink: Ink) -> Color {
    if ink == Ink::Faint {
        return Color::DarkGrey;
    }
    match tone {
        Tone::Neutral => Color::Reset,
        Tone::Query => Color::Red,
        Tone::Key => Color::Blue,
        Tone::Value => Color::Green,
        Tone::Score => Color::Yellow,
        Tone::Output => Color::Magenta,
    }
}
