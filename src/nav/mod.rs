//! Navigation state machine for the walkthrough.
//!
//! [`Navigator`] is the single owner of [`NavigationState`]. Every change goes
//! through one of its transition methods, each of which is total: requests
//! that make no sense in the current state are absorbed as no-ops.
//!
//! ```text
//!                 enter_detail(track)
//!   Overview ─────────────────────────────► Detail(track), Idle, step 0
//!      ▲                                          │        ▲
//!      │ return_to_overview                toggle │        │ toggle / last step
//!      └──────────────────────────────────────────┤        │
//!                                                 ▼        │
//!                                         Detail(track), Playing ──tick──► step+1
//! ```

pub mod autoplay;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::catalog::{self, StepDescriptor};
use crate::error::Error;

pub use autoplay::{AutoplayTimer, TimerHandle};

/// One of the three step-by-step walkthroughs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    /// Full-sequence attention over the prompt.
    Prefill,
    /// One new token attending over cached keys/values.
    Decoding,
    /// One new token, recomputing everything from scratch.
    NoCache,
}

impl Track {
    /// All tracks in display order.
    pub const ALL: [Track; 3] = [Track::Prefill, Track::Decoding, Track::NoCache];

    /// Short name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefill => "prefill",
            Self::Decoding => "decoding",
            Self::NoCache => "no-cache",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Prefill => "Prefill",
            Self::Decoding => "Decoding (KV cache)",
            Self::NoCache => "Decoding (no cache)",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefill" => Ok(Self::Prefill),
            "decoding" | "decode" | "kv-cache" | "cache" => Ok(Self::Decoding),
            "no-cache" | "nocache" | "no_cache" => Ok(Self::NoCache),
            _ => Err(Error::UnknownTrack(s.to_string())),
        }
    }
}

/// Overview stage shown when no detail track is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Prefill flow.
    #[default]
    One,
    /// Decoding with the KV cache.
    Two,
    /// Decoding without a cache.
    Three,
}

impl Phase {
    /// All phases in display order.
    pub const ALL: [Phase; 3] = [Phase::One, Phase::Two, Phase::Three];

    /// 1-based phase number.
    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Heading shown above the overview diagram.
    pub fn title(&self) -> &'static str {
        match self {
            Self::One => "Phase 1: Prefill (context processing)",
            Self::Two => "Phase 2: Decoding with KV cache",
            Self::Three => "Phase 3: Decoding without KV cache (recompute everything)",
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(Error::InvalidPhase(other)),
        }
    }
}

/// What the screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Phase overview; no step list.
    #[default]
    Overview,
    /// Step-by-step walkthrough of one track.
    Detail(Track),
}

impl Mode {
    /// Active track, if any.
    pub fn track(&self) -> Option<Track> {
        match self {
            Self::Overview => None,
            Self::Detail(track) => Some(*track),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overview => f.write_str("overview"),
            Self::Detail(track) => write!(f, "{track}"),
        }
    }
}

/// Snapshot of everything the view needs to know about navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    mode: Mode,
    phase: Phase,
    step: usize,
    autoplay: bool,
}

impl NavigationState {
    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Last selected overview phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index into the active catalog (0 in overview).
    pub fn step(&self) -> usize {
        self.step
    }

    /// Whether autoplay is running.
    pub fn autoplay(&self) -> bool {
        self.autoplay
    }
}

/// Owner of [`NavigationState`] and the autoplay timer.
#[derive(Debug, Clone)]
pub struct Navigator {
    state: NavigationState,
    timer: AutoplayTimer,
}

impl Navigator {
    /// Start in the overview at phase 1, with the given autoplay period.
    pub fn new(interval: Duration) -> Self {
        Self {
            state: NavigationState::default(),
            timer: AutoplayTimer::new(interval),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Autoplay timer (read-only).
    pub fn timer(&self) -> &AutoplayTimer {
        &self.timer
    }

    /// Steps of the active track; `None` in overview.
    pub fn catalog(&self) -> Option<&'static [StepDescriptor]> {
        catalog::active_catalog(self.state.mode)
    }

    /// Descriptor for the current step; `None` in overview.
    pub fn current(&self) -> Option<&'static StepDescriptor> {
        catalog::current_descriptor(self.state.mode, self.state.step)
    }

    /// Index of the last step in the active track.
    pub fn last_step(&self) -> Option<usize> {
        self.catalog().map(|steps| steps.len().saturating_sub(1))
    }

    /// Open a track at its first step, stopping autoplay.
    pub fn enter_detail(&mut self, track: Track) {
        self.switch_mode(Mode::Detail(track));
    }

    /// Go back to the overview. The last phase is kept.
    pub fn return_to_overview(&mut self) {
        self.switch_mode(Mode::Overview);
    }

    /// Pick an overview phase. Ignored outside the overview.
    pub fn select_phase(&mut self, phase: Phase) {
        if self.state.mode != Mode::Overview {
            return;
        }
        self.state.phase = phase;
        tracing::debug!(phase = phase.number(), "phase selected");
    }

    /// Advance one step, clamped at the last one.
    pub fn step_forward(&mut self) {
        let Some(last) = self.last_step() else {
            return;
        };
        if self.state.step >= last {
            return;
        }
        self.state.step += 1;
        tracing::debug!(mode = %self.state.mode, step = self.state.step, "step forward");
        if self.state.step == last {
            self.stop_autoplay();
        }
    }

    /// Go back one step, clamped at zero. Disabled while playing.
    pub fn step_backward(&mut self) {
        if self.state.autoplay || self.state.mode == Mode::Overview {
            return;
        }
        if self.state.step > 0 {
            self.state.step -= 1;
            tracing::debug!(mode = %self.state.mode, step = self.state.step, "step backward");
        }
    }

    /// Start or stop autoplay.
    ///
    /// Starting from the last step rewinds to the first one.
    pub fn toggle_autoplay(&mut self, now: Instant) {
        let Some(last) = self.last_step() else {
            return;
        };
        if self.state.autoplay {
            self.stop_autoplay();
            return;
        }
        if self.state.step >= last {
            self.state.step = 0;
        }
        self.state.autoplay = true;
        let handle = self.timer.start(now);
        tracing::info!(mode = %self.state.mode, step = self.state.step, ?handle, "autoplay started");
    }

    /// Deliver a timer tick. Returns true if the state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.state.autoplay {
            return false;
        }
        let Some(handle) = self.timer.fire(now) else {
            return false;
        };
        let Some(last) = self.last_step() else {
            self.stop_autoplay();
            return true;
        };
        tracing::trace!(?handle, step = self.state.step, "autoplay tick");
        if self.state.step >= last {
            self.stop_autoplay();
            return true;
        }
        self.state.step += 1;
        if self.state.step == last {
            self.stop_autoplay();
        }
        true
    }

    /// How long the event loop may wait before the next tick is due.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        if self.state.autoplay {
            self.timer.time_until(now)
        } else {
            None
        }
    }

    /// Stop autoplay and drop any pending tick. Used on shutdown too.
    pub fn stop_autoplay(&mut self) {
        let cancelled = self.timer.cancel();
        if self.state.autoplay {
            self.state.autoplay = false;
            tracing::info!(mode = %self.state.mode, step = self.state.step, ?cancelled, "autoplay stopped");
        }
    }

    fn switch_mode(&mut self, mode: Mode) {
        self.stop_autoplay();
        self.state.mode = mode;
        self.state.step = 0;
        tracing::debug!(%mode, phase = self.state.phase.number(), "mode changed");
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}
