//! Curve-speed advisory beside the MAX box.
//!
//! Two advisories may be enabled: map-based (MTSC) and vision-based (VTSC).
//! The advisory currently limiting the car is colored (MTSC green, VTSC red)
//! and drawn tall; the other is muted black and short. With only VTSC
//! enabled its box covers both slots.

use crate::{
    canvas::{Canvas, FontSpec, RectF, Sprite, Stroke, TextStyle},
    colors::{self, Color},
    config::{CURVE_BOX_RADIUS, CURVE_BOX_SHORT, CURVE_BOX_TALL, CURVE_ICON_GAP, SET_SPEED_WIDTH},
};

use super::{HudFrame, primitives::draw_panel};

/// Curve icon edge length.
pub const CURVE_ICON_SIZE: f32 = SET_SPEED_WIDTH * 1.25;

/// Which advisory a box shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advisory {
    Map,
    Vision,
}

/// Laid-out advisory boxes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveLayout {
    pub icon: RectF,
    pub mtsc: Option<RectF>,
    pub vtsc: Option<RectF>,
}

pub fn curve_layout(set_speed_rect: RectF, mtsc_enabled: bool, vtsc_enabled: bool, vtsc_controlling: bool) -> CurveLayout {
    let icon = RectF::new(set_speed_rect.right() + CURVE_ICON_GAP, set_speed_rect.top(), CURVE_ICON_SIZE, CURVE_ICON_SIZE);
    let (tall, short) = (CURVE_BOX_TALL, CURVE_BOX_SHORT);

    let (mtsc, vtsc) = if mtsc_enabled {
        let mtsc = RectF::new(icon.x, icon.bottom() + 10.0, icon.width, if vtsc_controlling { short } else { tall });
        let vtsc = vtsc_enabled.then(|| {
            RectF::new(mtsc.x, mtsc.bottom() + 20.0, mtsc.width, if vtsc_controlling { tall } else { short })
        });
        (Some(mtsc), vtsc)
    } else if vtsc_enabled {
        (None, Some(RectF::new(icon.x, icon.bottom() + 10.0, icon.width, tall + short)))
    } else {
        (None, None)
    };

    CurveLayout { icon, mtsc, vtsc }
}

/// Box color and font for an advisory.
pub fn advisory_style(advisory: Advisory, vtsc_controlling: bool) -> (Color, FontSpec) {
    match advisory {
        Advisory::Map if !vtsc_controlling => (colors::green(255), FontSpec::bold(45.0)),
        Advisory::Vision if vtsc_controlling => (colors::red(255), FontSpec::bold(45.0)),
        _ => (colors::black(255), FontSpec::demi_bold(35.0)),
    }
}

fn draw_advisory_box(canvas: &mut impl Canvas, rect: RectF, text: &str, advisory: Advisory, vtsc_controlling: bool) {
    let (base, font) = advisory_style(advisory, vtsc_controlling);
    draw_panel(canvas, rect, CURVE_BOX_RADIUS, base.with_alpha(166), Stroke::new(base, 10.0));
    canvas.text(rect.adjusted(20.0, 0.0, 0.0, 0.0), text, &TextStyle::left(font, colors::white(255)));
}

pub fn draw_curve_speed(canvas: &mut impl Canvas, frame: &HudFrame<'_>, set_speed_rect: RectF) {
    let state = frame.state;
    if !state.curve_advisory_visible {
        return;
    }
    let curve = &frame.snapshot.curve_speed;
    let layout = curve_layout(set_speed_rect, curve.mtsc_enabled, curve.vtsc_enabled, curve.vtsc_controlling);

    canvas.set_opacity(1.0);
    canvas.sprite(Sprite::CurveSpeed { left: curve.left_curve }, layout.icon);
    if let Some(rect) = layout.mtsc {
        draw_advisory_box(canvas, rect, &state.strings.mtsc_speed, Advisory::Map, curve.vtsc_controlling);
    }
    if let Some(rect) = layout.vtsc {
        draw_advisory_box(canvas, rect, &state.strings.vtsc_speed, Advisory::Vision, curve.vtsc_controlling);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: RectF = RectF::new(60.0, 45.0, 172.0, 204.0);

    #[test]
    fn test_icon_beside_box() {
        let l = curve_layout(BOX, true, false, false);
        assert_eq!(l.icon, RectF::new(232.0 + 25.0, 45.0, 215.0, 215.0));
        assert_eq!(l.mtsc.map(|r| r.height), Some(100.0));
        assert_eq!(l.vtsc, None);
    }

    #[test]
    fn test_controlling_advisory_is_tall() {
        let l = curve_layout(BOX, true, true, true);
        let (mtsc, vtsc) = (l.mtsc.unwrap(), l.vtsc.unwrap());
        assert_eq!(mtsc.height, 50.0);
        assert_eq!(vtsc.height, 100.0);
        assert_eq!(vtsc.y, mtsc.bottom() + 20.0);
    }

    #[test]
    fn test_vision_only_fills_both_slots() {
        let l = curve_layout(BOX, false, true, false);
        assert_eq!(l.mtsc, None);
        assert_eq!(l.vtsc.map(|r| r.height), Some(150.0));
    }

    #[test]
    fn test_styles() {
        assert_eq!(advisory_style(Advisory::Map, false).0, colors::green(255));
        assert_eq!(advisory_style(Advisory::Map, true).0, colors::black(255), "Muted when vision controls");
        assert_eq!(advisory_style(Advisory::Vision, true).0, colors::red(255));
        assert_eq!(advisory_style(Advisory::Vision, false).1.size, 35.0);
    }
}
