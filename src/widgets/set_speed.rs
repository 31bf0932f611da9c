//! Header gradient and the MAX box.
//!
//! The MAX box holds the cruise target and, below it, the speed-limit sign.
//! Its size depends on the unit system and the sign family so the sign fits:
//!
//! | Condition                               | Width | Extra height        |
//! |-----------------------------------------|-------|---------------------|
//! | imperial, no Vienna sign                | 172   |                     |
//! | metric or Vienna sign                   | 200   |                     |
//! | US sign with a three-digit limit        | 223   |                     |
//! | US sign                                 |       | 186 + margin        |
//! | Vienna sign                             |       | 176 + margin        |
//!
//! The box stays centered on the 172 px base column when it widens.
//!
//! # Proximity Ramp
//!
//! While engaged with a known limit, the MAX caption and cruise digits shift
//! color as the target climbs past the limit (see
//! [`crate::animations::interp_color`]).

use crate::{
    animations::{interp_color, proximity_breakpoints},
    canvas::{Canvas, CornerRadii, Fill, FontSpec, RectF, ShapeStyle, Stroke, TextStyle, VerticalGradient},
    colors::{self, Color, MAX_DEFAULT, MAX_OVER, MAX_OVERRIDE, MAX_UNSET, MAX_WARN},
    config::{
        SET_SPEED_HEIGHT, SET_SPEED_ORIGIN_X, SET_SPEED_ORIGIN_Y, SET_SPEED_RADIUS, SET_SPEED_VIENNA_BOTTOM_RADIUS,
        SET_SPEED_WIDTH, SET_SPEED_WIDTH_EXTRA_WIDE, SET_SPEED_WIDTH_WIDE, SIGN_MARGIN, UI_HEADER_HEIGHT,
        US_SIGN_HEIGHT, VIENNA_SIGN_SIZE,
    },
    state::{DerivedHudState, readout_len},
    telemetry::Status,
};

use super::HudFrame;

/// Darkening at the top of the header band.
const HEADER_SHADE: f32 = 0.45;

/// Vertical offsets of the MAX caption and the cruise digits in the box.
const MAX_CAPTION_OFFSET: f32 = 27.0;
const SET_SPEED_DIGITS_OFFSET: f32 = 77.0;

/// Header gradient: transparent at the bottom of the header band, fading in
/// over its lower 40 %.
pub fn header_gradient() -> VerticalGradient {
    VerticalGradient::new(UI_HEADER_HEIGHT - UI_HEADER_HEIGHT / 2.5, UI_HEADER_HEIGHT)
        .with_stop(0.0, colors::black(0).with_alpha_f(HEADER_SHADE))
        .with_stop(1.0, colors::TRANSPARENT)
}

pub fn draw_header(canvas: &mut impl Canvas) {
    let width = canvas.size().width;
    canvas.set_opacity(1.0);
    canvas.fill_rect(RectF::new(0.0, 0.0, width, UI_HEADER_HEIGHT), &Fill::Gradient(header_gradient()));
}

/// Outer MAX box rectangle for this tick.
pub fn set_speed_rect(state: &DerivedHudState) -> RectF {
    let mut width = SET_SPEED_WIDTH;
    let mut height = SET_SPEED_HEIGHT;

    if state.units.is_metric() || state.has_eu_speed_limit {
        width = SET_SPEED_WIDTH_WIDE;
    }
    if state.has_us_speed_limit && readout_len(&state.strings.speed_limit) >= 3 {
        width = SET_SPEED_WIDTH_EXTRA_WIDE;
    }

    if state.has_us_speed_limit {
        height += US_SIGN_HEIGHT + SIGN_MARGIN;
    } else if state.has_eu_speed_limit {
        height += VIENNA_SIGN_SIZE + SIGN_MARGIN;
    }

    RectF::new(SET_SPEED_ORIGIN_X + (SET_SPEED_WIDTH - width) / 2.0, SET_SPEED_ORIGIN_Y, width, height)
}

/// Corner radii: the bottom hugs a round Vienna sign.
pub fn set_speed_radii(state: &DerivedHudState) -> CornerRadii {
    let bottom = if state.has_eu_speed_limit { SET_SPEED_VIENNA_BOTTOM_RADIUS } else { SET_SPEED_RADIUS };
    CornerRadii::top_bottom(SET_SPEED_RADIUS, bottom)
}

/// Colors of the MAX caption and the cruise digits.
pub fn max_colors(state: &DerivedHudState) -> (Color, Color) {
    if !state.is_cruise_set {
        return (MAX_UNSET, colors::SET_SPEED_UNSET);
    }
    match state.status {
        Status::Disengaged => (colors::white(255), colors::SET_SPEED_DEFAULT),
        Status::Override => (MAX_OVERRIDE, colors::SET_SPEED_DEFAULT),
        _ if state.speed_limit > 0.0 => {
            let xp = proximity_breakpoints(state.speed_limit);
            (
                interp_color(state.set_speed, xp, [MAX_DEFAULT, MAX_WARN, MAX_OVER]),
                interp_color(
                    state.set_speed,
                    xp,
                    [colors::SET_SPEED_DEFAULT, colors::SET_SPEED_WARN, colors::SET_SPEED_OVER],
                ),
            )
        }
        _ => (MAX_DEFAULT, colors::SET_SPEED_DEFAULT),
    }
}

/// Draw the box and its contents. Returns the box rect; the sign and the
/// curve advisory are laid out against it.
pub fn draw_set_speed(canvas: &mut impl Canvas, frame: &HudFrame<'_>) -> RectF {
    let state = frame.state;
    let rect = set_speed_rect(state);

    let pen = if frame.snapshot.traffic_mode_active {
        Stroke::new(colors::red(255), 10.0)
    } else {
        Stroke::new(colors::white(75), 6.0)
    };
    canvas.set_opacity(1.0);
    canvas.rounded_rect(rect, set_speed_radii(state), &ShapeStyle::filled_outlined(colors::black(166), pen));

    if frame.settings.hide_max_speed {
        return rect;
    }

    let (max_color, digits_color) = max_colors(state);
    canvas.text(
        rect.adjusted(0.0, MAX_CAPTION_OFFSET, 0.0, 0.0),
        "MAX",
        &TextStyle::top(FontSpec::demi_bold(40.0), max_color),
    );
    canvas.text(
        rect.adjusted(0.0, SET_SPEED_DIGITS_OFFSET, 0.0, 0.0),
        &state.strings.set_speed,
        &TextStyle::top(FontSpec::bold(90.0), digits_color),
    );
    rect
}
