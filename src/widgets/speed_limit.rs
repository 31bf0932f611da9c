//! Speed-limit signs and the source panel.
//!
//! The sign sits in the lower part of the MAX box. Two families:
//! - **US (MUTCD)**: white rounded rectangle with a black inner border and
//!   "SPEED / LIMIT" over the digits. With the offset shown, a compact
//!   "LIMIT" / digits / offset layout replaces it.
//! - **Vienna**: white disc with a red ring and the digits centered.
//!
//! A limit the driver has overridden is drawn at quarter opacity.
//!
//! # Pending Sign
//!
//! While a new limit awaits confirmation, a second sign of the same family
//! appears to the right of the current one. Its inner pen blinks red/black
//! at 1 Hz. It is not drawn while a curve-speed advisory is active, since
//! the advisory occupies the same space.

use core::fmt::Write;

use heapless::String;

use crate::{
    canvas::{Canvas, CornerRadii, FontSpec, RectF, ShapeStyle, Sprite, Stroke, TextStyle},
    colors::{self, Color, SIGN_RING_RED},
    config::{
        IMG_SIZE, OVERRIDDEN_SIGN_OPACITY, PENDING_SIGN_GAP, PENDING_SIGN_WIDTH, PENDING_SIGN_WIDTH_WIDE,
        SET_SPEED_HEIGHT, SIGN_MARGIN, SOURCE_PANEL_TOP_GAP, SOURCE_ROW_HEIGHT, SOURCE_ROW_SPACING, SOURCE_ROW_WIDTH,
        US_SIGN_INNER_INSET, US_SIGN_INNER_PEN, US_SIGN_INNER_RADIUS, US_SIGN_RADIUS, VIENNA_RING_INSET,
        VIENNA_RING_PEN,
    },
    state::readout_len,
    telemetry::SpeedLimitSource,
};

use super::{HudFrame, primitives::draw_panel};

/// Sign rectangle inside the MAX box.
pub fn sign_rect(set_speed_rect: RectF) -> RectF {
    set_speed_rect.adjusted(SIGN_MARGIN, SET_SPEED_HEIGHT, -SIGN_MARGIN, -SIGN_MARGIN)
}

/// Rectangle of the pending sign beside `sign`.
pub fn pending_sign_rect(sign: RectF, pending_text: &str, vienna: bool) -> RectF {
    let mut rect = sign.translated(sign.width + PENDING_SIGN_GAP, 0.0);
    if !vienna {
        rect.width = if readout_len(pending_text) >= 3 { PENDING_SIGN_WIDTH_WIDE } else { PENDING_SIGN_WIDTH };
    }
    rect
}

/// Vienna digits shrink for three-digit limits.
#[inline]
fn vienna_digit_font(text: &str) -> FontSpec {
    FontSpec::bold(if readout_len(text) >= 3 { 60.0 } else { 70.0 })
}

fn blink_color(frame: &HudFrame<'_>) -> Color {
    if frame.timers.pending_limit.is_highlighted(frame.now) { colors::red(255) } else { colors::black(255) }
}

fn pending_sign_allowed(frame: &HudFrame<'_>) -> bool {
    frame.state.speed_limit_changed && !frame.state.curve_advisory_active
}

// =============================================================================
// US Sign
// =============================================================================

fn draw_us_blank(canvas: &mut impl Canvas, rect: RectF, inner_pen: Color) {
    canvas.rounded_rect(rect, CornerRadii::uniform(US_SIGN_RADIUS), &ShapeStyle::filled(colors::white(255)));
    canvas.rounded_rect(
        rect.inset(US_SIGN_INNER_INSET),
        CornerRadii::uniform(US_SIGN_INNER_RADIUS),
        &ShapeStyle::outlined(Stroke::new(inner_pen, US_SIGN_INNER_PEN)),
    );
}

fn caption(canvas: &mut impl Canvas, rect: RectF, offset: f32, text: &str, font: FontSpec, color: Color) {
    canvas.text(rect.adjusted(0.0, offset, 0.0, 0.0), text, &TextStyle::top(font, color));
}

pub fn draw_us_sign(canvas: &mut impl Canvas, frame: &HudFrame<'_>, sign: RectF) {
    let state = frame.state;
    let black = colors::black(255);
    let caption_font = FontSpec::demi_bold(28.0);

    canvas.set_opacity(1.0);
    draw_us_blank(canvas, sign, black);

    canvas.set_opacity(if state.speed_limit_overridden { OVERRIDDEN_SIGN_OPACITY } else { 1.0 });
    if state.show_speed_limit_offset && !state.speed_limit_overridden {
        caption(canvas, sign, 22.0, "LIMIT", caption_font, black);
        caption(canvas, sign, 51.0, &state.strings.speed_limit, FontSpec::bold(70.0), black);
        caption(canvas, sign, 120.0, &state.strings.speed_limit_offset, FontSpec::demi_bold(50.0), black);
    } else {
        caption(canvas, sign, 22.0, "SPEED", caption_font, black);
        caption(canvas, sign, 51.0, "LIMIT", caption_font, black);
        caption(canvas, sign, 85.0, &state.strings.speed_limit, FontSpec::bold(70.0), black);
    }
    canvas.set_opacity(1.0);

    if pending_sign_allowed(frame) {
        let pending = &state.strings.pending_speed_limit;
        let rect = pending_sign_rect(sign, pending, false);
        let pen = blink_color(frame);
        draw_us_blank(canvas, rect, pen);
        caption(canvas, rect, 22.0, "PENDING", caption_font, pen);
        caption(canvas, rect, 51.0, "LIMIT", caption_font, pen);
        caption(canvas, rect, 85.0, pending, FontSpec::bold(70.0), pen);
    }
}

// =============================================================================
// Vienna Sign
// =============================================================================

fn draw_vienna_blank(canvas: &mut impl Canvas, rect: RectF) {
    canvas.ellipse(rect, &ShapeStyle::filled(colors::white(255)));
    canvas.ellipse(
        rect.inset(VIENNA_RING_INSET),
        &ShapeStyle::outlined(Stroke::new(SIGN_RING_RED, VIENNA_RING_PEN)),
    );
}

pub fn draw_vienna_sign(canvas: &mut impl Canvas, frame: &HudFrame<'_>, sign: RectF) {
    let state = frame.state;
    let black = colors::black(255);
    let digits = &state.strings.speed_limit;

    canvas.set_opacity(1.0);
    draw_vienna_blank(canvas, sign);

    canvas.set_opacity(if state.speed_limit_overridden { OVERRIDDEN_SIGN_OPACITY } else { 1.0 });
    if state.show_speed_limit_offset {
        canvas.text(sign.adjusted(0.0, -25.0, 0.0, 0.0), digits, &TextStyle::centered(vienna_digit_font(digits), black));
        caption(canvas, sign, 100.0, &state.strings.speed_limit_offset, FontSpec::demi_bold(40.0), black);
    } else {
        canvas.text(sign, digits, &TextStyle::centered(vienna_digit_font(digits), black));
    }
    canvas.set_opacity(1.0);

    if pending_sign_allowed(frame) {
        let pending = &state.strings.pending_speed_limit;
        let rect = pending_sign_rect(sign, pending, true);
        draw_vienna_blank(canvas, rect);
        canvas.text(rect, pending, &TextStyle::centered(vienna_digit_font(pending), blink_color(frame)));
    }
}

// =============================================================================
// Source Panel
// =============================================================================

pub type SourceText = String<48>;

/// Row text, e.g. `"Map Data - 65 mph"` or `"Dashboard - N/A"`.
pub fn source_row_text(source: SpeedLimitSource, value: f32, unit: &str) -> SourceText {
    let mut text = SourceText::new();
    if value > 1.0 {
        write!(text, "{} - {} {unit}", source.label(), value.round() as i32).ok();
    } else {
        write!(text, "{} - N/A", source.label()).ok();
    }
    text
}

/// Row rectangles, top to bottom, in [`SpeedLimitSource::ALL`] order.
pub fn source_row_rects(sign: RectF) -> [RectF; 4] {
    let first =
        RectF::new(sign.x - SIGN_MARGIN, sign.bottom() + SOURCE_PANEL_TOP_GAP, SOURCE_ROW_WIDTH, SOURCE_ROW_HEIGHT);
    core::array::from_fn(|i| first.translated(0.0, i as f32 * (SOURCE_ROW_HEIGHT + SOURCE_ROW_SPACING)))
}

pub fn draw_source_panel(canvas: &mut impl Canvas, frame: &HudFrame<'_>, sign: RectF) {
    let state = frame.state;
    let active = frame.snapshot.speed_limit.source;
    let unit = state.units.speed_unit();
    let icon_size = IMG_SIZE / 4.0;

    canvas.set_opacity(1.0);
    for (source, rect) in SpeedLimitSource::ALL.into_iter().zip(source_row_rects(sign)) {
        let (base, font) = if active == Some(source) {
            (colors::red(255), FontSpec::bold(35.0))
        } else {
            (colors::black(255), FontSpec::demi_bold(35.0))
        };
        draw_panel(canvas, rect, 24.0, base.with_alpha(166), Stroke::new(base, 10.0));

        let icon = RectF::new(rect.x + 20.0, rect.y + (rect.height - icon_size) / 2.0, icon_size, icon_size);
        canvas.sprite(Sprite::SourceIcon(source), icon);

        let text_rect = RectF::new(icon.right() + 10.0, rect.y, rect.width - icon_size - 30.0, rect.height);
        let text = source_row_text(source, state.source_limits.get(source), unit);
        canvas.text(text_rect, &text, &TextStyle::left(font, colors::white(255)));
    }
}

/// Draw whichever sign family is active, plus the source panel.
pub fn draw_speed_limit(canvas: &mut impl Canvas, frame: &HudFrame<'_>, set_speed_rect: RectF) {
    let state = frame.state;
    let sign = sign_rect(set_speed_rect);

    if state.has_us_speed_limit {
        draw_us_sign(canvas, frame, sign);
    }
    if state.has_eu_speed_limit {
        draw_vienna_sign(canvas, frame, sign);
    }
    if frame.settings.show_speed_limit_sources && (state.has_us_speed_limit || state.has_eu_speed_limit) {
        draw_source_panel(canvas, frame, sign);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::{
        canvas::{DrawCommand, RecordingCanvas},
        config::HudSettings,
        state::DerivedHudState,
        telemetry::{SceneGeometry, TelemetrySnapshot},
        timers::TimerState,
    };

    struct Fixture {
        snapshot: TelemetrySnapshot,
        scene: SceneGeometry,
        settings: HudSettings,
        state: DerivedHudState,
        timers: TimerState,
        now: Instant,
    }

    impl Fixture {
        fn new() -> Self {
            let mut state = DerivedHudState::new();
            state.has_us_speed_limit = true;
            state.strings.speed_limit.push_str("65").ok();
            state.strings.pending_speed_limit.push_str("100").ok();
            Self {
                snapshot: TelemetrySnapshot::default(),
                scene: SceneGeometry::default(),
                settings: HudSettings::default(),
                state,
                timers: TimerState::default(),
                now: Instant::now(),
            }
        }

        fn frame(&self) -> HudFrame<'_> {
            HudFrame {
                snapshot: &self.snapshot,
                scene: &self.scene,
                settings: &self.settings,
                state: &self.state,
                timers: &self.timers,
                now: self.now,
            }
        }
    }

    const SIGN: RectF = RectF::new(72.0, 249.0, 176.0, 186.0);

    #[test]
    fn test_sign_rect_inside_box() {
        assert_eq!(sign_rect(RectF::new(60.0, 45.0, 200.0, 402.0)), SIGN);
    }

    #[test]
    fn test_pending_rect_width() {
        assert_eq!(pending_sign_rect(SIGN, "100", false).width, 200.0);
        assert_eq!(pending_sign_rect(SIGN, "65", false).width, 175.0);
        assert_eq!(pending_sign_rect(SIGN, "65", false).x, 72.0 + 176.0 + 25.0);
        assert_eq!(pending_sign_rect(SIGN, "100", true).width, 176.0, "Vienna keeps its size");
    }

    #[test]
    fn test_us_sign_captions() {
        let fx = Fixture::new();
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        draw_us_sign(&mut canvas, &fx.frame(), SIGN);
        assert!(canvas.has_text("SPEED"));
        assert!(canvas.has_text("65"));
        assert!(!canvas.has_text("PENDING"), "No pending sign without a change");
    }

    #[test]
    fn test_us_sign_offset_layout() {
        let mut fx = Fixture::new();
        fx.state.show_speed_limit_offset = true;
        fx.state.strings.speed_limit_offset.push_str("+5").ok();
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        draw_us_sign(&mut canvas, &fx.frame(), SIGN);
        assert!(!canvas.has_text("SPEED"));
        assert!(canvas.has_text("+5"));
    }

    #[test]
    fn test_overridden_sign_faded() {
        let mut fx = Fixture::new();
        fx.state.speed_limit_overridden = true;
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        draw_us_sign(&mut canvas, &fx.frame(), SIGN);
        let (_, _, opacity) = canvas.find_text("65").unwrap();
        assert_eq!(opacity, OVERRIDDEN_SIGN_OPACITY);
    }

    #[test]
    fn test_pending_sign_blinks() {
        let mut fx = Fixture::new();
        fx.state.speed_limit_changed = true;
        fx.timers.pending_limit.update(true, fx.now);

        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        draw_us_sign(&mut canvas, &fx.frame(), SIGN);
        let (_, style, _) = canvas.find_text("PENDING").unwrap();
        assert_eq!(style.color, colors::red(255), "First half of the period is red");

        fx.now += Duration::from_millis(700);
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        draw_us_sign(&mut canvas, &fx.frame(), SIGN);
        let (_, style, _) = canvas.find_text("PENDING").unwrap();
        assert_eq!(style.color, colors::black(255));
    }

    #[test]
    fn test_pending_sign_yields_to_curve_advisory() {
        let mut fx = Fixture::new();
        fx.state.speed_limit_changed = true;
        fx.state.curve_advisory_active = true;
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        draw_us_sign(&mut canvas, &fx.frame(), SIGN);
        assert!(!canvas.has_text("PENDING"));

        fx.state.has_us_speed_limit = false;
        fx.state.has_eu_speed_limit = true;
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        draw_vienna_sign(&mut canvas, &fx.frame(), SIGN);
        let ellipses = canvas.commands().iter().filter(|c| matches!(c, DrawCommand::Ellipse { .. })).count();
        assert_eq!(ellipses, 2, "Only the current Vienna sign");
    }

    #[test]
    fn test_vienna_font_shrinks_for_three_digits() {
        assert_eq!(vienna_digit_font("100").size, 60.0);
        assert_eq!(vienna_digit_font("90").size, 70.0);
    }

    #[test]
    fn test_source_rows() {
        assert_eq!(source_row_text(SpeedLimitSource::MapData, 64.6, "mph").as_str(), "Map Data - 65 mph");
        assert_eq!(source_row_text(SpeedLimitSource::Dashboard, 0.5, "mph").as_str(), "Dashboard - N/A");

        let rows = source_row_rects(SIGN);
        assert_eq!(rows[0], RectF::new(60.0, 249.0 + 186.0 + 45.0, 500.0, 60.0));
        assert_eq!(rows[3].y - rows[2].y, 75.0);
    }

    #[test]
    fn test_active_source_highlighted() {
        let mut fx = Fixture::new();
        fx.settings.show_speed_limit_sources = true;
        fx.snapshot.speed_limit.source = Some(SpeedLimitSource::Navigation);
        let mut canvas = RecordingCanvas::new(2160.0, 1080.0);
        draw_speed_limit(&mut canvas, &fx.frame(), RectF::new(60.0, 45.0, 200.0, 402.0));

        let (_, style, _) = canvas.find_text("Navigation").unwrap();
        assert_eq!(style.font.weight, crate::canvas::FontWeight::Bold);
        let (_, style, _) = canvas.find_text("Upcoming").unwrap();
        assert_eq!(style.font.weight, crate::canvas::FontWeight::DemiBold);
        assert_eq!(canvas.sprites().count(), 4);
    }
}
