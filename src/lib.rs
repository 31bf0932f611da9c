//! Real-time annotation overlay for a driver-assistance heads-up display.
//!
//! Each video frame, [`HudEngine::render_frame`] takes a telemetry snapshot
//! and the projected road geometry, updates its derived state and timers,
//! and draws the overlay onto a [`Canvas`]:
//!
//! - [`telemetry`]: per-tick snapshot and projected scene geometry
//! - [`state`]: derived, unit-converted display state
//! - [`timers`]: pending-limit blink, status crossfade, standstill, peak acceleration
//! - [`animations`]: proximity and standstill color ramps
//! - [`status`]: status-bar cause codes and messages
//! - [`widgets`]: one module per overlay element
//! - [`canvas`]: drawing capability plus recording and embedded-graphics adapters
//! - [`video`]: frame source boundary and starvation gate
//! - [`profiling`]: draw-time metrics, frame-rate filter, timing sink
//! - [`config`]: layout constants and runtime settings
//! - [`colors`], [`units`], [`filter`], [`error`]
//!
//! # Threading
//!
//! The engine is single-threaded and never blocks. The only shared resource
//! is the video frame handle ([`video::SharedFrameSlot`]), locked just long
//! enough to read the frame id and calibration.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod animations;
pub mod canvas;
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod profiling;
pub mod state;
pub mod status;
pub mod telemetry;
pub mod timers;
pub mod units;
pub mod video;
pub mod widgets;

// Re-export commonly used items
pub use canvas::{Canvas, DisplayCanvas, RecordingCanvas};
pub use config::HudSettings;
pub use engine::HudEngine;
pub use error::{ConfigError, ParseSourceError, ThemeError};
pub use profiling::{RenderMetrics, TimingSink};
pub use state::DerivedHudState;
pub use telemetry::{SceneGeometry, TelemetrySnapshot};
pub use timers::TimerState;
pub use video::{FrameInfo, SharedFrameSlot, VideoFrameSource};
