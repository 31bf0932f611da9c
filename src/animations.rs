//! Color ramps used for visual feedback.
//!
//! This module provides the two ramps the overlay animates colors with:
//! - **Proximity ramp**: the MAX caption and set-speed digits shift color as
//!   the cruise target climbs above the speed limit
//! - **Standstill ramp**: the standstill readout drifts from the engaged
//!   color to warning red the longer the car waits
//!
//! # Proximity Ramp
//!
//! Three breakpoints, three colors. Below the first breakpoint the first
//! color holds, past the last the last color holds, and in between the two
//! bracketing colors blend linearly:
//! ```text
//! color = c[lo] + (x - xp[lo]) / (xp[hi] - xp[lo]) * (c[hi] - c[lo])
//! ```
//! The breakpoints land exactly on their colors.
//!
//! # Standstill Ramp
//!
//! | Duration   | Color                                   |
//! |------------|-----------------------------------------|
//! | 0–60 s     | engaged green                           |
//! | 60–90 s    | green → conditional-override yellow     |
//! | 90–120 s   | yellow → traffic-mode red               |
//! | > 120 s    | traffic-mode red                        |
//!
//! The ramp output is opaque; only RGB is blended.

use crate::{
    colors::{Color, status_color},
    config::{STANDSTILL_END_SECS, STANDSTILL_HOLD_SECS, STANDSTILL_MID_SECS},
    telemetry::Status,
};

// =============================================================================
// Linear Interpolation
// =============================================================================

#[inline]
fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    let a = f32::from(a);
    let b = f32::from(b);
    t.mul_add(b - a, a).round().clamp(0.0, 255.0) as u8
}

/// Blend two colors, including alpha. `t` is clamped to `[0, 1]`.
pub fn lerp_color(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color::rgba(
        lerp_channel(from.r, to.r, t),
        lerp_channel(from.g, to.g, t),
        lerp_channel(from.b, to.b, t),
        lerp_channel(from.a, to.a, t),
    )
}

// =============================================================================
// Proximity Ramp
// =============================================================================

/// Piecewise-linear color ramp over ascending breakpoints `xp`.
pub fn interp_color(x: f32, xp: [f32; 3], colors: [Color; 3]) -> Color {
    let hi = xp.iter().position(|&p| x <= p).unwrap_or(xp.len());
    if hi == xp.len() {
        return colors[xp.len() - 1];
    }
    if hi == 0 {
        return colors[0];
    }
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span <= 0.0 {
        return colors[hi];
    }
    lerp_color(colors[lo], colors[hi], (x - xp[lo]) / span)
}

/// Breakpoints for the set-speed proximity ramp around a speed limit.
#[inline]
pub fn proximity_breakpoints(speed_limit: f32) -> [f32; 3] {
    [speed_limit + 5.0, speed_limit + 15.0, speed_limit + 25.0]
}

// =============================================================================
// Standstill Ramp
// =============================================================================

/// Readout color after waiting `secs` seconds at a standstill.
pub fn standstill_color(secs: f32) -> Color {
    let engaged = status_color(Status::Engaged).with_alpha(255);
    let overridden = status_color(Status::ConditionalOverridden).with_alpha(255);
    let traffic = status_color(Status::TrafficModeActive).with_alpha(255);
    let window = STANDSTILL_MID_SECS - STANDSTILL_HOLD_SECS;

    if secs <= STANDSTILL_HOLD_SECS {
        engaged
    } else if secs <= STANDSTILL_MID_SECS {
        lerp_color(engaged, overridden, (secs - STANDSTILL_HOLD_SECS) / window)
    } else if secs <= STANDSTILL_END_SECS {
        lerp_color(overridden, traffic, (secs - STANDSTILL_MID_SECS) / window)
    } else {
        traffic
    }
}
