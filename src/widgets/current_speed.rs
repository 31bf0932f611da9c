//! Large current-speed readout at the top center.
//!
//! After waiting at a standstill for more than a second with the timer
//! enabled, the readout switches to minutes and seconds tinted by the
//! standstill ramp. Otherwise the digits are amber while the controller is
//! stopping, red while the brake lights are on, and white by default.

use core::fmt::Write;

use heapless::String;

use crate::{
    animations::standstill_color,
    canvas::{Canvas, FontSpec, RectF, TextStyle},
    colors::{self, BRAKING_SPEED, BRAKING_UNIT, Color, STOPPING_SPEED, STOPPING_UNIT},
    config::STANDSTILL_DISPLAY_AFTER,
};

use super::HudFrame;

/// Baselines of the digits and the unit line.
const DIGITS_BASELINE: f32 = 210.0;
const UNIT_BASELINE: f32 = 290.0;

const DIGITS_FONT: FontSpec = FontSpec::bold(176.0);
const UNIT_FONT: FontSpec = FontSpec::normal(66.0);

pub type StandstillText = String<24>;

/// Minutes and seconds lines of the standstill readout.
pub fn standstill_text(secs: u64) -> (StandstillText, StandstillText) {
    let minutes = secs / 60;
    let seconds = secs % 60;

    let mut top = StandstillText::new();
    if minutes == 1 {
        top.push_str("1 minute").ok();
    } else {
        write!(top, "{minutes} minutes").ok();
    }
    let mut bottom = StandstillText::new();
    write!(bottom, "{seconds} seconds").ok();
    (top, bottom)
}

/// Digit and unit colors when not at a long standstill.
pub fn speed_colors(brake_lights: bool, stopping: bool) -> (Color, Color) {
    if brake_lights {
        (BRAKING_SPEED, BRAKING_UNIT)
    } else if stopping {
        (STOPPING_SPEED, STOPPING_UNIT)
    } else {
        (colors::white(255), colors::white(200))
    }
}

/// Text centered on the screen's vertical axis with its baseline at `y`.
fn centered_line(canvas: &mut impl Canvas, y: f32, text: &str, font: FontSpec, color: Color) {
    let width = canvas.size().width;
    canvas.text(RectF::new(0.0, 0.0, width, y), text, &TextStyle::baseline(font, color));
}

pub fn draw_current_speed(canvas: &mut impl Canvas, frame: &HudFrame<'_>) {
    let state = frame.state;
    if state.big_map_open || frame.settings.hide_speed {
        return;
    }
    canvas.set_opacity(1.0);

    let standstill = &frame.timers.standstill;
    if standstill.duration() > STANDSTILL_DISPLAY_AFTER {
        let color = standstill_color(standstill.secs() as f32);
        let (minutes, seconds) = standstill_text(standstill.secs());
        centered_line(canvas, DIGITS_BASELINE, &minutes, DIGITS_FONT, color);
        centered_line(canvas, UNIT_BASELINE, &seconds, UNIT_FONT, color);
        return;
    }

    let (digits, unit) = speed_colors(state.brake_lights, state.stopping);
    centered_line(canvas, DIGITS_BASELINE, &state.strings.speed, DIGITS_FONT, digits);
    centered_line(canvas, UNIT_BASELINE, state.units.speed_unit(), UNIT_FONT, unit);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standstill_text() {
        let (m, s) = standstill_text(65);
        assert_eq!(m.as_str(), "1 minute");
        assert_eq!(s.as_str(), "5 seconds");
        let (m, _) = standstill_text(45);
        assert_eq!(m.as_str(), "0 minutes");
        let (m, s) = standstill_text(185);
        assert_eq!((m.as_str(), s.as_str()), ("3 minutes", "5 seconds"));
    }

    #[test]
    fn test_brake_lights_win_over_stopping() {
        assert_eq!(speed_colors(true, true), (BRAKING_SPEED, BRAKING_UNIT));
        assert_eq!(speed_colors(false, true), (STOPPING_SPEED, STOPPING_UNIT));
        assert_eq!(speed_colors(false, false).1.a, 200, "Unit label is dimmed");
    }
}
