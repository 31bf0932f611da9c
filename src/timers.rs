//! Timed transitions layered on top of the derived state.
//!
//! Each transition is a small state machine around a [`Stopwatch`]. All of
//! them live in [`TimerState`], owned by the engine and created with every
//! stopwatch invalid, so nothing persists between engines and nothing is
//! hidden in function-local statics.
//!
//! Time is always passed in as `now`. Nothing here reads the clock, which
//! keeps every transition deterministic under test.
//!
//! | Transition            | Starts when                          | Ends when                      |
//! |-----------------------|--------------------------------------|--------------------------------|
//! | [`PendingLimitBlink`] | a new limit awaits confirmation      | the limit is confirmed         |
//! | [`StatusCrossfade`]   | status text changes / no road name   | hold + fade have elapsed       |
//! | [`StandstillTimer`]   | a long standstill begins             | the car moves or a map opens   |
//! | [`PeakAcceleration`]  | a new peak while engaged             | hold elapses with no new peak  |

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::{BLINK_ON, BLINK_PERIOD, FADE_DURATION, PEAK_ACCEL_HOLD, TEXT_DURATION};

// =============================================================================
// Stopwatch
// =============================================================================

/// Monotonic stopwatch that is either running from a start instant or invalid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stopwatch {
    started: Option<Instant>,
}

impl Stopwatch {
    pub const fn new() -> Self {
        Self { started: None }
    }

    /// Start, or restart if already running.
    #[inline]
    pub const fn start(&mut self, now: Instant) {
        self.started = Some(now);
    }

    /// Start only if not already running. Returns true if it started.
    #[inline]
    pub const fn start_if_idle(&mut self, now: Instant) -> bool {
        if self.started.is_some() {
            return false;
        }
        self.started = Some(now);
        true
    }

    #[inline]
    pub const fn invalidate(&mut self) {
        self.started = None;
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.started.is_some()
    }

    /// Time since start, or `None` if never started.
    #[inline]
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.started.map(|start| now.saturating_duration_since(start))
    }

    /// True once `timeout` has passed. An invalid stopwatch counts as expired.
    #[inline]
    pub fn has_expired(&self, now: Instant, timeout: Duration) -> bool {
        self.elapsed(now).is_none_or(|e| e > timeout)
    }
}

#[inline]
fn millis_f32(d: Duration) -> f32 {
    d.as_secs_f32() * 1000.0
}

// =============================================================================
// Pending-Limit Blink
// =============================================================================

/// Alternates the pending sign pen while a new limit waits for confirmation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingLimitBlink {
    timer: Stopwatch,
}

impl PendingLimitBlink {
    pub fn update(&mut self, limit_changed: bool, now: Instant) {
        if limit_changed {
            if self.timer.start_if_idle(now) {
                debug!("pending limit blink started");
            }
        } else {
            self.timer.invalidate();
        }
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        self.timer.is_valid()
    }

    /// True during the highlighted half of each blink period.
    pub fn is_highlighted(&self, now: Instant) -> bool {
        self.timer
            .elapsed(now)
            .is_some_and(|e| e.as_millis() % BLINK_PERIOD.as_millis() < BLINK_ON.as_millis())
    }
}

// =============================================================================
// Status / Road-Name Crossfade
// =============================================================================

/// Hands the status bar over from status text to the road name.
///
/// New status text shows at full opacity for [`TEXT_DURATION`], then fades
/// out over [`FADE_DURATION`] while the road name fades in. Without a road
/// name the status text restarts every tick and never fades.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusCrossfade {
    timer: Stopwatch,
    last_shown: String,
    displaying_status: bool,
    status_opacity: f32,
    road_name_opacity: f32,
}

impl StatusCrossfade {
    pub fn update(&mut self, status: &str, has_road_name: bool, now: Instant) {
        if status != self.last_shown || !has_road_name {
            if status != self.last_shown {
                debug!(status, "status text changed");
                status.clone_into(&mut self.last_shown);
            }
            self.displaying_status = true;
            self.timer.start(now);
        } else if self.displaying_status && self.timer.has_expired(now, TEXT_DURATION + FADE_DURATION) {
            self.displaying_status = false;
        }

        let elapsed = self.timer.elapsed(now).map_or(0.0, millis_f32);
        let text = millis_f32(TEXT_DURATION);
        let fade = millis_f32(FADE_DURATION);

        if self.displaying_status {
            self.status_opacity = (1.0 - (elapsed - text) / fade).clamp(0.0, 1.0);
            self.road_name_opacity = 1.0 - self.status_opacity;
        } else {
            self.road_name_opacity = (elapsed / fade).clamp(0.0, 1.0);
            self.status_opacity = 0.0;
        }
    }

    #[inline]
    pub const fn status_opacity(&self) -> f32 {
        self.status_opacity
    }

    #[inline]
    pub const fn road_name_opacity(&self) -> f32 {
        self.road_name_opacity
    }

    pub fn last_shown(&self) -> &str {
        &self.last_shown
    }
}

// =============================================================================
// Standstill Duration
// =============================================================================

/// Measures how long the car has been waiting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StandstillTimer {
    timer: Stopwatch,
    duration: Duration,
}

impl StandstillTimer {
    pub fn update(&mut self, running: bool, now: Instant) {
        if running {
            if self.timer.start_if_idle(now) {
                debug!("standstill timer started");
            }
            self.duration = self.timer.elapsed(now).unwrap_or_default();
        } else {
            self.duration = Duration::ZERO;
            self.timer.invalidate();
        }
    }

    #[inline]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Whole seconds waited.
    #[inline]
    pub const fn secs(&self) -> u64 {
        self.duration.as_secs()
    }
}

// =============================================================================
// Peak Acceleration
// =============================================================================

/// Running acceleration peak that goes stale after [`PEAK_ACCEL_HOLD`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PeakAcceleration {
    timer: Stopwatch,
    max: f32,
    stale: bool,
}

impl PeakAcceleration {
    /// Feed one sample. Peaks only register while `tracking`.
    pub fn update(&mut self, acceleration: f32, tracking: bool, now: Instant) {
        if tracking && acceleration > self.max {
            self.max = acceleration;
            self.timer.start(now);
            self.stale = false;
        } else {
            self.stale = self.timer.has_expired(now, PEAK_ACCEL_HOLD);
        }
    }

    #[inline]
    pub const fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }
}

// =============================================================================
// Timer Bundle
// =============================================================================

/// Every timed transition the engine owns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimerState {
    pub pending_limit: PendingLimitBlink,
    pub status_crossfade: StatusCrossfade,
    pub standstill: StandstillTimer,
    pub peak_acceleration: PeakAcceleration,
}
