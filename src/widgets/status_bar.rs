//! Bottom status bar: status text crossfading into the current road name.
//!
//! The bar itself is a rounded rectangle hanging off the bottom edge so only
//! its top half shows. The text choice lives in [`crate::status`]; the
//! opacity handoff lives in [`crate::timers::StatusCrossfade`], which the
//! engine feeds through [`resolve_status`] and [`road_name`] before drawing.

use crate::{
    canvas::{Canvas, CornerRadii, FontSpec, RectF, ShapeStyle, TextStyle},
    colors,
    config::{HudSettings, STATUS_BAR_HEIGHT, STATUS_BAR_RADIUS},
    state::DerivedHudState,
    status::{StatusContext, StatusText, model_stop_time, status_message},
    telemetry::TelemetrySnapshot,
};

use super::HudFrame;

const STATUS_FONT: FontSpec = FontSpec::bold(40.0);

/// Bar rectangle; half of it sits below the screen.
pub fn status_bar_rect(width: f32, height: f32) -> RectF {
    RectF::new(-1.0, height - STATUS_BAR_HEIGHT, width + 2.0, STATUS_BAR_HEIGHT * 2.0)
}

/// Part of the bar above the screen edge, where the text is centered.
pub fn visible_strip(bar: RectF) -> RectF {
    RectF::new(bar.x, bar.y, bar.width, STATUS_BAR_HEIGHT)
}

/// Status text for this tick.
pub fn resolve_status(snapshot: &TelemetrySnapshot, state: &DerivedHudState, settings: &HudSettings) -> StatusText {
    let ctx = StatusContext {
        map_open: snapshot.map_open,
        always_on_lateral_active: snapshot.always_on_lateral_active,
        show_always_on_lateral: settings.show_always_on_lateral_status_bar,
        show_conditional: settings.show_conditional_status_bar,
        conditional_status: state.conditional_status,
        conditional_limit: snapshot.conditional_limit,
        conditional_limit_lead: snapshot.conditional_limit_lead,
        speed_unit: state.units.speed_unit(),
        model_stop_time: model_stop_time(snapshot.model_length, state.speed, state.units.speed_factor()),
    };
    status_message(&ctx)
}

/// Road name to hand over to, if the feature is on and the name is usable.
pub fn road_name<'a>(snapshot: &'a TelemetrySnapshot, settings: &HudSettings) -> Option<&'a str> {
    if !settings.road_name_ui {
        return None;
    }
    snapshot.road_name.as_deref().filter(|name| !name.is_empty() && *name != "null")
}

pub fn draw_status_bar(canvas: &mut impl Canvas, frame: &HudFrame<'_>) {
    if !frame.state.status_bar_visible {
        return;
    }
    let size = canvas.size();
    let bar = status_bar_rect(size.width, size.height);

    canvas.set_opacity(1.0);
    canvas.rounded_rect(bar, CornerRadii::uniform(STATUS_BAR_RADIUS), &ShapeStyle::filled(colors::black(150)));

    let text_rect = visible_strip(bar);
    let style = TextStyle::centered(STATUS_FONT, colors::white(255));
    let crossfade = &frame.timers.status_crossfade;

    canvas.set_opacity(crossfade.status_opacity());
    canvas.text(text_rect, crossfade.last_shown(), &style);

    if let Some(name) = road_name(frame.snapshot, frame.settings) {
        canvas.set_opacity(crossfade.road_name_opacity());
        canvas.text(text_rect, name, &style);
    }
    canvas.set_opacity(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_hangs_off_bottom() {
        let r = status_bar_rect(2160.0, 1080.0);
        assert_eq!(r, RectF::new(-1.0, 1030.0, 2162.0, 100.0));
        assert_eq!(visible_strip(r).bottom(), 1080.0, "Text strip ends at the screen edge");
    }

    #[test]
    fn test_road_name_filtering() {
        let settings = HudSettings { road_name_ui: true, ..HudSettings::default() };
        let mut snapshot = TelemetrySnapshot { road_name: Some("Main St".into()), ..TelemetrySnapshot::default() };
        assert_eq!(road_name(&snapshot, &settings), Some("Main St"));

        snapshot.road_name = Some("null".into());
        assert_eq!(road_name(&snapshot, &settings), None, "Literal null is treated as missing");
        snapshot.road_name = Some(String::new());
        assert_eq!(road_name(&snapshot, &settings), None);

        snapshot.road_name = Some("Main St".into());
        assert_eq!(road_name(&snapshot, &HudSettings::default()), None, "Feature off");
    }

    #[test]
    fn test_resolve_status_always_on_lateral() {
        let settings = HudSettings { show_always_on_lateral_status_bar: true, ..HudSettings::default() };
        let snapshot = TelemetrySnapshot { always_on_lateral_active: true, map_open: true, ..TelemetrySnapshot::default() };
        let state = DerivedHudState::new();
        assert_eq!(resolve_status(&snapshot, &state, &settings).as_str(), "Always On Lateral active");
    }
}
