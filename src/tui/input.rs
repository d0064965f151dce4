//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::Command;
use crate::nav::{Phase, Track};

/// Key hints shown in the footer, per screen.
pub const OVERVIEW_HINTS: &str =
    "1/2/3 phase   p prefill   d decoding   n no-cache   q quit";
pub const DETAIL_HINTS: &str =
    "←/h back   →/l next   space autoplay   o/esc overview   p/d/n track   q quit";

/// Map a key press to a command. Releases and unbound keys map to `None`.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => Some(Command::Quit),
            _ => None,
        };
    }
    let command = match key.code {
        KeyCode::Char('1') => Command::SelectPhase(Phase::One),
        KeyCode::Char('2') => Command::SelectPhase(Phase::Two),
        KeyCode::Char('3') => Command::SelectPhase(Phase::Three),
        KeyCode::Char('p') => Command::EnterDetail(Track::Prefill),
        KeyCode::Char('d') => Command::EnterDetail(Track::Decoding),
        KeyCode::Char('n') => Command::EnterDetail(Track::NoCache),
        KeyCode::Char('o') | KeyCode::Esc => Command::ReturnToOverview,
        KeyCode::Right | KeyCode::Char('l') => Command::StepForward,
        KeyCode::Left | KeyCode::Char('h') => Command::StepBackward,
        KeyCode::Char(' ') => Command::ToggleAutoplay,
        KeyCode::Char('q') => Command::Quit,
        _ => return None,
    };
    Some(command)
}
