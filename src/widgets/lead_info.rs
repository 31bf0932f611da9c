//! Insights bar across the top edge: current and peak acceleration.
//!
//! The peak is tracked by [`crate::timers::PeakAcceleration`] while the
//! system is engaged. It shows red while fresh and turns white once it has
//! not been beaten for a while. The map view drops the peak to save space.

use core::fmt::Write;

use heapless::String;

use crate::{
    canvas::{Canvas, CornerRadii, FontSpec, RectF, ShapeStyle, TextStyle},
    colors,
    config::STATUS_BAR_RADIUS,
    telemetry::Status,
    units::UnitConversions,
};

use super::HudFrame;

const INSIGHTS_FONT: FontSpec = FontSpec::bold(28.0);

/// Bar height; the top 60 px are off screen.
const INSIGHTS_HEIGHT: f32 = 100.0;
const INSIGHTS_OVERHANG: f32 = 60.0;

/// Vertical shift of the text below the bar center.
const TEXT_SHIFT: f32 = 27.0;

pub type InsightsText = String<48>;

/// Only these statuses can set a new acceleration peak.
pub const fn tracks_peak(status: Status) -> bool {
    matches!(status, Status::Engaged | Status::TrafficModeActive)
}

/// Acceleration rounded to hundredths, as tracked and shown.
pub fn rounded_acceleration(acceleration: f32) -> f32 {
    (acceleration * 100.0).round() / 100.0
}

/// Current-acceleration segment and, off the map view, the peak segment.
pub fn insights_text(acceleration: f32, peak: f32, conv: &UnitConversions, map_open: bool) -> (InsightsText, Option<InsightsText>) {
    let unit = conv.acceleration_unit;
    let mut current = InsightsText::new();
    write!(current, "Accel: {:.2}{unit}", acceleration * conv.acceleration).ok();

    let peak = (!map_open).then(|| {
        let mut text = InsightsText::new();
        write!(text, " - Max: {:.2}{unit}", peak * conv.acceleration).ok();
        text
    });
    (current, peak)
}

pub fn insights_rect(width: f32) -> RectF {
    RectF::new(-1.0, -INSIGHTS_OVERHANG, width + 2.0, INSIGHTS_HEIGHT)
}

pub fn draw_lead_info(canvas: &mut impl Canvas, frame: &HudFrame<'_>) {
    if !frame.settings.lead_metrics || frame.state.big_map_open {
        return;
    }
    let bar = insights_rect(canvas.size().width);
    canvas.set_opacity(1.0);
    canvas.rounded_rect(bar, CornerRadii::uniform(STATUS_BAR_RADIUS), &ShapeStyle::filled(colors::black(150)));

    let peak = &frame.timers.peak_acceleration;
    let (current, max) = insights_text(
        rounded_acceleration(frame.snapshot.acceleration),
        peak.max(),
        &frame.state.conversions,
        frame.state.map_open,
    );

    let current_size = canvas.text_size(INSIGHTS_FONT, &current);
    let max_width = max.as_ref().map_or(0.0, |m| canvas.text_size(INSIGHTS_FONT, m).width);
    let row = bar.translated(0.0, TEXT_SHIFT);
    let mut x = row.x + (row.width - current_size.width - max_width) / 2.0;

    let current_rect = RectF::new(x, row.y, current_size.width, row.height);
    canvas.text(current_rect, &current, &TextStyle::left(INSIGHTS_FONT, colors::white(255)));
    x += current_size.width;

    if let Some(max) = max {
        let color = if peak.is_stale() { colors::white(255) } else { colors::red(255) };
        canvas.text(RectF::new(x, row.y, max_width, row.height), &max, &TextStyle::left(INSIGHTS_FONT, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitSystem;

    #[test]
    fn test_insights_text_metric() {
        let conv = UnitConversions::new(UnitSystem::Metric, false);
        let (current, max) = insights_text(1.234, 2.5, &conv, false);
        assert_eq!(current.as_str(), "Accel: 1.23m/s²");
        assert_eq!(max.as_deref(), Some(" - Max: 2.50m/s²"));
    }

    #[test]
    fn test_map_view_drops_peak() {
        let conv = UnitConversions::new(UnitSystem::Imperial, false);
        let (current, max) = insights_text(1.0, 2.0, &conv, true);
        assert_eq!(current.as_str(), "Accel: 3.28ft/s²");
        assert_eq!(max, None);
    }

    #[test]
    fn test_peak_tracking_statuses() {
        assert!(tracks_peak(Status::Engaged));
        assert!(tracks_peak(Status::TrafficModeActive));
        assert!(!tracks_peak(Status::Disengaged));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(rounded_acceleration(0.126), 0.13);
        assert_eq!(rounded_acceleration(-0.004), 0.0);
    }
}
