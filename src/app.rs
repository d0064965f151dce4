//! Top-level application state.
//!
//! [`App`] is the only owner of the [`Navigator`]. Front-ends translate
//! their input into [`Command`]s and feed timer ticks through
//! [`App::on_tick`]; they never touch navigation state directly.

use std::time::Instant;

use crate::catalog::StepDescriptor;
use crate::config::TourConfig;
use crate::diagram::{Diagram, DiagramRenderer, FigureRenderer};
use crate::nav::{NavigationState, Navigator, Phase, Track};

/// A discrete user request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    EnterDetail(Track),
    ReturnToOverview,
    SelectPhase(Phase),
    StepForward,
    StepBackward,
    ToggleAutoplay,
    Quit,
}

/// Navigation plus the renderer used to draw it.
#[derive(Debug)]
pub struct App<R = FigureRenderer> {
    navigator: Navigator,
    renderer: R,
    running: bool,
}

impl App<FigureRenderer> {
    /// App with the default figure renderer for `config`.
    pub fn from_config(config: &TourConfig) -> Self {
        Self::new(config, FigureRenderer::from_config(config))
    }
}

impl<R: DiagramRenderer> App<R> {
    pub fn new(config: &TourConfig, renderer: R) -> Self {
        Self {
            navigator: Navigator::new(config.playback.interval()),
            renderer,
            running: true,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn state(&self) -> NavigationState {
        self.navigator.state()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Apply one command.
    pub fn handle(&mut self, command: Command, now: Instant) {
        match command {
            Command::EnterDetail(track) => self.navigator.enter_detail(track),
            Command::ReturnToOverview => self.navigator.return_to_overview(),
            Command::SelectPhase(phase) => self.navigator.select_phase(phase),
            Command::StepForward => self.navigator.step_forward(),
            Command::StepBackward => self.navigator.step_backward(),
            Command::ToggleAutoplay => self.navigator.toggle_autoplay(now),
            Command::Quit => self.shutdown(),
        }
    }

    /// Forward a timer tick. Returns true if the screen needs redrawing.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.navigator.tick(now)
    }

    /// Stop autoplay and mark the app as finished.
    pub fn shutdown(&mut self) {
        self.navigator.stop_autoplay();
        if self.running {
            tracing::info!("tour exiting");
        }
        self.running = false;
    }

    /// Current step, if a track is open.
    pub fn current_step(&self) -> Option<&'static StepDescriptor> {
        self.navigator.current()
    }

    /// Diagram for whatever is on screen.
    pub fn diagram(&self) -> Diagram {
        let state = self.navigator.state();
        match self.navigator.current() {
            Some(step) => self.renderer.render(step.figure),
            None => self.renderer.overview(state.phase()),
        }
    }
}
