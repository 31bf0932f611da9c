//! Overlay widgets.
//!
//! Each submodule lays out and draws one element of the overlay against a
//! [`Canvas`](crate::canvas::Canvas):
//!
//! - [`set_speed`]: header gradient and the MAX box holding the cruise target
//! - [`speed_limit`]: US and Vienna signs, the pending sign, the source panel
//! - [`curve_speed`]: curve-speed advisory boxes beside the MAX box
//! - [`current_speed`]: the large speed readout or standstill timer
//! - [`lanes`]: lane lines, road edges, path, adjacent lanes, path edges
//! - [`lead`]: lead chevrons and their metrics labels
//! - [`driver_state`]: driver-monitor face outline and attention arcs
//! - [`status_bar`]: bottom bar with status text and road name
//! - [`lead_info`]: acceleration insights bar
//! - [`turn_signals`]: turn-signal sprite animation
//! - [`primitives`]: shared shape helpers
//!
//! # Architecture
//!
//! Widgets are free functions taking the canvas and a [`HudFrame`], the
//! read-only view of one tick. Geometry is computed in separate pure
//! functions so it can be tested without a canvas. The only widget state
//! that outlives a tick (the lead label box) is owned by the engine and
//! passed in explicitly.
//!
//! Every widget leaves the canvas opacity at 1.0 when it returns.

pub mod current_speed;
pub mod curve_speed;
pub mod driver_state;
pub mod lanes;
pub mod lead;
pub mod lead_info;
pub mod primitives;
pub mod set_speed;
pub mod speed_limit;
pub mod status_bar;
pub mod turn_signals;

use std::time::Instant;

use crate::{
    config::HudSettings,
    state::DerivedHudState,
    telemetry::{SceneGeometry, TelemetrySnapshot},
    timers::TimerState,
};

/// Everything a widget may read during one tick.
#[derive(Clone, Copy, Debug)]
pub struct HudFrame<'a> {
    pub snapshot: &'a TelemetrySnapshot,
    pub scene: &'a SceneGeometry,
    pub settings: &'a HudSettings,
    pub state: &'a DerivedHudState,
    pub timers: &'a TimerState,
    pub now: Instant,
}
