//! kv-attention-tour: a step-by-step terminal walkthrough of attention.
//!
//! Shows why decoding with a KV cache is cheap and prefill is not:
//! - Prefill: the whole prompt at once, an [L, L] score square
//! - Decoding with cache: one token, one score row over cached keys
//! - Decoding without cache: everything recomputed every step
//!
//! Nothing is computed numerically. The diagrams are block grids sized by a
//! few constants, and a small navigation state machine with an autoplay timer
//! walks through them.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod diagram;
pub mod error;
pub mod logging;
pub mod nav;
pub mod tui;

pub use app::{App, Command};
pub use catalog::{Figure, StepDescriptor, active_catalog, current_descriptor};
pub use config::{Dimensions, PlaybackConfig, TokenConfig, TourConfig};
pub use diagram::{Diagram, DiagramRenderer, FigureRenderer};
pub use error::{Error, Result};
pub use nav::{AutoplayTimer, Mode, NavigationState, Navigator, Phase, TimerHandle, Track};
