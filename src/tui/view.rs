//! Screen composition: turns the app state into styled lines.
//!
//! Pure and terminal-free, so it can be tested and reused by the
//! non-interactive commands.

use crate::app::App;
use crate::diagram::{DiagramRenderer, Ink, Line, Span, Tone};
use crate::nav::{Mode, Phase, Track};

use super::input::{DETAIL_HINTS, OVERVIEW_HINTS};

/// Header, body and footer for the current state.
pub fn compose<R: DiagramRenderer>(app: &App<R>) -> Vec<Line> {
    let state = app.state();
    let mut lines = vec![tabs(state.mode()), Line::default()];

    match (state.mode(), app.current_step()) {
        (Mode::Detail(track), Some(step)) => {
            let len = app.navigator().catalog().map_or(0, <[_]>::len);
            lines.push(Line::new(vec![Span::new(
                format!("{}  ·  step {} of {len}", track.title(), state.step() + 1),
                Tone::Neutral,
                Ink::Faint,
            )]));
            lines.push(progress_dots(state.step(), len));
            lines.push(Line::default());
            lines.push(Line::new(vec![Span::new(step.title, Tone::Neutral, Ink::Strong)]));
            lines.push(Line::plain(step.description));
        }
        _ => {
            lines.push(phase_selector(state.phase()));
        }
    }

    lines.push(Line::default());
    let diagram = app.diagram();
    lines.push(Line::new(vec![Span::new(diagram.title, Tone::Neutral, Ink::Faint)]));
    lines.extend(diagram.rows);
    lines.push(Line::default());
    lines.push(footer(state.mode(), state.autoplay()));
    lines
}

fn tabs(mode: Mode) -> Line {
    let mut line = Line::default();
    let entries = [("o", "Overview", Mode::Overview)]
        .into_iter()
        .chain(Track::ALL.map(|t| {
            let key = match t {
                Track::Prefill => "p",
                Track::Decoding => "d",
                Track::NoCache => "n",
            };
            (key, t.title(), Mode::Detail(t))
        }));
    for (i, (key, title, tab)) in entries.enumerate() {
        if i > 0 {
            line.push(Span::plain("  "));
        }
        let ink = if tab == mode { Ink::Strong } else { Ink::Faint };
        let text = if tab == mode {
            format!("[{key}] {title}")
        } else {
            format!(" {key}  {title}")
        };
        line.push(Span::new(text, Tone::Neutral, ink));
    }
    line
}

fn phase_selector(phase: Phase) -> Line {
    let mut line = Line::default();
    for (i, p) in Phase::ALL.into_iter().enumerate() {
        if i > 0 {
            line.push(Span::plain("   "));
        }
        let ink = if p == phase { Ink::Strong } else { Ink::Faint };
        line.push(Span::new(format!("({}) {}", p.number(), p.title()), Tone::Neutral, ink));
    }
    line
}

/// `●` for the current step, `○` for the others.
pub fn progress_dots(step: usize, len: usize) -> Line {
    let mut line = Line::default();
    for i in 0..len {
        if i > 0 {
            line.push(Span::plain(" "));
        }
        if i == step {
            line.push(Span::new("●", Tone::Score, Ink::Strong));
        } else {
            line.push(Span::new("○", Tone::Neutral, Ink::Faint));
        }
    }
    line
}

fn footer(mode: Mode, autoplay: bool) -> Line {
    match mode {
        Mode::Overview => Line::new(vec![Span::new(OVERVIEW_HINTS, Tone::Neutral, Ink::Faint)]),
        Mode::Detail(_) => {
            let status = if autoplay { "▶ playing" } else { "❚❚ paused" };
            Line::new(vec![
                Span::new(status, Tone::Score, Ink::Strong),
                Span::plain("   "),
                Span::new(DETAIL_HINTS, Tone::Neutral, Ink::Faint),
            ])
        }
    }
}
