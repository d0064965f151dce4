//! Command-line interface.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::app::{App, Command};
use crate::catalog;
use crate::config::TourConfig;
use crate::diagram::{DiagramRenderer, FigureRenderer};
use crate::error::{Error, Result};
use crate::nav::{Phase, Track};

#[derive(Parser, Debug)]
#[command(name = "kv-attention-tour")]
#[command(about = "Step through prefill vs. KV-cached decoding attention")]
#[command(version)]
pub struct Cli {
    /// JSON config file (dimensions, playback, token labels)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file (the interactive session logs nowhere otherwise)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive walkthrough (default)
    Run,

    /// List tracks and their steps
    Tracks,

    /// Print one step, or every step of a track
    Show {
        /// prefill, decoding or no-cache
        track: String,

        /// 1-based step number
        #[arg(short, long)]
        step: Option<usize>,
    },

    /// Print an overview phase
    Overview {
        /// 1, 2 or 3
        #[arg(short, long, default_value = "1")]
        phase: u8,
    },

    /// Autoplay a track headlessly, printing each step
    Play {
        /// prefill, decoding or no-cache
        track: String,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<usize>,

        /// Do not wait between steps
        #[arg(long)]
        instant: bool,
    },
}

impl Cli {
    /// Load the config file if one was given, defaults otherwise.
    pub fn load_config(&self) -> Result<TourConfig> {
        match &self.config {
            Some(path) => TourConfig::from_file(path),
            None => Ok(TourConfig::default()),
        }
    }
}

/// Parse a track name, logging rejected input.
pub fn parse_track(name: &str) -> Result<Track> {
    name.parse::<Track>()
        .inspect_err(|err| tracing::warn!(%err, "rejected track"))
}

/// Parse a phase number, logging rejected input.
pub fn parse_phase(number: u8) -> Result<Phase> {
    Phase::try_from(number).inspect_err(|err| tracing::warn!(%err, "rejected phase"))
}

/// `tracks`: every track with its numbered step titles.
pub fn list_tracks(out: &mut impl Write) -> Result<()> {
    for track in Track::ALL {
        let steps = catalog::steps(track);
        writeln!(out, "{} ({}, {} steps)", track.title(), track, steps.len())?;
        for step in steps {
            writeln!(out, "  {}", step.title)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// `show`: one step (1-based) or the whole track.
pub fn show_track(
    config: &TourConfig,
    track: Track,
    step: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let renderer = FigureRenderer::from_config(config);
    let steps = catalog::steps(track);
    let selected = match step {
        Some(n) if n == 0 || n > steps.len() => {
            let err = Error::StepOutOfRange {
                track: track.as_str(),
                step: n,
                len: steps.len(),
            };
            tracing::warn!(%err, "rejected step");
            return Err(err);
        }
        Some(n) => &steps[n - 1..n],
        None => steps,
    };
    for descriptor in selected {
        writeln!(out, "{}", descriptor.title)?;
        writeln!(out, "{}", descriptor.description)?;
        writeln!(out)?;
        writeln!(out, "{}", renderer.render(descriptor.figure).to_plain())?;
        writeln!(out)?;
    }
    Ok(())
}

/// `overview`: one overview phase.
pub fn show_overview(config: &TourConfig, phase: Phase, out: &mut impl Write) -> Result<()> {
    let renderer = FigureRenderer::from_config(config);
    writeln!(out, "{}", renderer.overview(phase).to_plain())?;
    Ok(())
}

/// `play`: drive autoplay to completion, printing each step as it appears.
///
/// With `instant`, simulated time jumps straight to each deadline instead of
/// sleeping. Returns the number of ticks that changed the step.
pub fn play_track(
    config: &TourConfig,
    track: Track,
    max_ticks: Option<usize>,
    instant: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let mut app = App::from_config(config);
    let mut now = Instant::now();
    app.handle(Command::EnterDetail(track), now);
    app.handle(Command::ToggleAutoplay, now);
    print_current(&app, out)?;

    let mut ticks = 0;
    while app.state().autoplay() && max_ticks.is_none_or(|max| ticks < max) {
        let wait = app.navigator().time_until_tick(now).unwrap_or_default();
        if instant {
            now += wait;
        } else {
            std::thread::sleep(wait);
            now = Instant::now();
        }
        if app.on_tick(now) {
            ticks += 1;
            print_current(&app, out)?;
        }
    }

    app.shutdown();
    Ok(ticks)
}

fn print_current<R: DiagramRenderer>(app: &App<R>, out: &mut impl Write) -> Result<()> {
    let state = app.state();
    if let Some(step) = app.current_step() {
        let marker = if state.autoplay() { "▶" } else { "■" };
        writeln!(out, "{marker} {}", step.title)?;
        writeln!(out, "{}", app.diagram().to_plain())?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_show() {
        let cli = Cli::parse_from(["kv-attention-tour", "show", "prefill", "--step", "4"]);
        assert_eq!(
            cli.command,
            Some(Commands::Show {
                track: "prefill".into(),
                step: Some(4),
            })
        );
    }

    #[test]
    fn test_cli_defaults_to_no_subcommand() {
        let cli = Cli::parse_from(["kv-attention-tour", "-vv"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_show_rejects_step_zero() {
        let mut out = Vec::new();
        let err = show_track(&TourConfig::default(), Track::Decoding, Some(0), &mut out);
        assert!(matches!(err, Err(Error::StepOutOfRange { len: 6, .. })));
    }
}
