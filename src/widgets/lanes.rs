//! Lane lines, road edges, driving path, adjacent lanes and path edges.
//!
//! All geometry arrives already projected to screen space in
//! [`SceneGeometry`]. This module only picks colors and draws.
//!
//! # Path Shading
//!
//! With experimental mode or the acceleration path enabled, the path
//! gradient follows the planned acceleration along the path:
//! ```text
//! hue        = clamp(60 + 35 * accel, 0, 120)     // red braking, green accelerating
//! saturation = min(|1.5 * accel|, 1)
//! lightness  = map(saturation, 0..1 -> 0.95..0.62)
//! alpha      = map(position, 0.375..0.75 -> 0.4..0.0)
//! ```
//! Near-zero acceleration falls back to the theme path color when custom
//! colors are in use. Otherwise the path is the stock green fade.
//!
//! There is no rainbow path (hue scrolled by ego speed); it carries no
//! telemetry and is not drawn.
//!
//! # Path Edges
//!
//! Edge color reflects the most important active mode, in priority order:
//! always-on lateral, conditional override, experimental, traffic mode,
//! navigate-on, theme color, stock green.

use core::fmt::Write;

use heapless::String;

use crate::{
    canvas::{Canvas, Fill, FontSpec, PointF, RectF, ShapeStyle, Sprite, TextStyle, VerticalGradient},
    colors::{self, Color, status_color},
    config::{HudSettings, IMG_SIZE},
    status::ConditionalStatus,
    telemetry::{Polygon, SceneGeometry, Status, TelemetrySnapshot, bounding_rect},
};

use super::{
    HudFrame,
    primitives::{fading_gradient, hsl_gradient},
};

/// Acceleration below which the path keeps the theme color.
const LOW_ACCEL: f32 = 0.25;

/// Linear map of `x` from `[x0, x1]` onto `[y0, y1]`, clamping `x` first.
fn map_val(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    let x = x.clamp(x0.min(x1), x0.max(x1));
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

// =============================================================================
// Colors
// =============================================================================

pub fn lane_line_color(settings: &HudSettings, probability: f32) -> Color {
    if settings.use_stock_colors {
        colors::white(0).with_alpha_f(probability.clamp(0.0, 0.7))
    } else {
        settings.lane_lines_color
    }
}

pub fn road_edge_color(std: f32) -> Color {
    Color::from_rgba_f(1.0, 0.0, 0.0, (1.0 - std).clamp(0.0, 1.0))
}

/// Stock green path fade.
pub fn stock_path_gradient(height: f32) -> VerticalGradient {
    VerticalGradient::full_height(height)
        .with_stop(0.0, Color::from_hsla(148.0 / 360.0, 0.94, 0.51, 0.4))
        .with_stop(0.5, Color::from_hsla(112.0 / 360.0, 1.0, 0.68, 0.35))
        .with_stop(1.0, Color::from_hsla(112.0 / 360.0, 1.0, 0.68, 0.0))
}

/// Color of one acceleration sample on the path.
pub fn acceleration_color(accel: f32, position: f32) -> Color {
    let hue = (60.0 + accel * 35.0).clamp(0.0, 120.0);
    // Whole degrees keep the number of distinct gradient colors small.
    let hue = ((hue * 100.0 + 0.5) as i32 / 100) as f32;
    let saturation = (accel * 1.5).abs().min(1.0);
    let lightness = map_val(saturation, 0.0, 1.0, 0.95, 0.62);
    let alpha = map_val(position, 0.75 / 2.0, 0.75, 0.4, 0.0);
    Color::from_hsla(hue / 360.0, saturation, lightness, alpha)
}

/// Path gradient following the planned acceleration.
///
/// The first half of `track` is the right side of the path, aligned with
/// `accel`. Points are walked from the bottom of the screen up; points off
/// screen are skipped.
pub fn acceleration_path_gradient(
    height: f32,
    track: &[PointF],
    accel: &[f32],
    settings: &HudSettings,
) -> VerticalGradient {
    let mut gradient = VerticalGradient::full_height(height);
    let max_len = (track.len() / 2).min(accel.len());

    let mut i = 0;
    while i < max_len {
        let point = track[max_len - i - 1];
        if point.y < 0.0 || point.y > height {
            i += 1;
            continue;
        }

        let position = (height - point.y) / height;
        if accel[i].abs() < LOW_ACCEL && !settings.use_stock_colors {
            let base = settings.path_color;
            gradient.set_color_at(0.0, base);
            gradient.set_color_at(0.5, base.with_alpha_f(0.5));
            gradient.set_color_at(1.0, base.with_alpha_f(0.1));
        } else {
            gradient.set_color_at(position, acceleration_color(accel[i], position));
            // Every other sample is enough, but never skip the last one.
            if i + 2 < max_len {
                i += 1;
            }
        }
        i += 1;
    }
    gradient
}

/// Base color of the path edges, or `None` for the stock gradient.
pub fn path_edge_color(snapshot: &TelemetrySnapshot, settings: &HudSettings) -> Option<Color> {
    let overridden = ConditionalStatus::from_code(snapshot.conditional_status).is_some_and(|s| s.is_override());

    if snapshot.always_on_lateral_active {
        Some(status_color(Status::AlwaysOnLateralActive))
    } else if overridden {
        Some(status_color(Status::ConditionalOverridden))
    } else if snapshot.experimental_mode {
        Some(status_color(Status::ExperimentalModeActive))
    } else if snapshot.traffic_mode_active {
        Some(status_color(Status::TrafficModeActive))
    } else if snapshot.navigate_on_openpilot {
        Some(status_color(Status::NavigationActive))
    } else if !settings.use_stock_colors {
        Some(settings.path_edges_color)
    } else {
        None
    }
}

pub fn path_edge_gradient(height: f32, base: Option<Color>) -> VerticalGradient {
    match base {
        Some(color) => fading_gradient(height, color),
        None => VerticalGradient::full_height(height)
            .with_stop(0.0, Color::from_hsla(148.0 / 360.0, 0.94, 0.51, 1.0))
            .with_stop(0.5, Color::from_hsla(112.0 / 360.0, 1.0, 0.68, 0.5))
            .with_stop(1.0, Color::from_hsla(112.0 / 360.0, 1.0, 0.68, 0.1)),
    }
}

/// Adjacent-lane hue: green at the detection width, red at half or double.
pub fn adjacent_lane_hue(lane_width: f32, detection_width: f32) -> f32 {
    if detection_width <= 0.0 {
        return 0.0;
    }
    120.0 * (1.0 - ((lane_width - detection_width).abs() / (detection_width / 2.0)).min(1.0))
}

// =============================================================================
// Drawing
// =============================================================================

fn fill_polygon(canvas: &mut impl Canvas, points: &Polygon, fill: Fill) {
    if points.len() >= 3 {
        canvas.polygon(points, &ShapeStyle { fill, stroke: None });
    }
}

fn draw_stopping_point(canvas: &mut impl Canvas, frame: &HudFrame<'_>) {
    let Some(&last) = frame.scene.track.last() else {
        return;
    };
    let sign = RectF::new(last.x - IMG_SIZE / 2.0, last.y - IMG_SIZE, IMG_SIZE, IMG_SIZE);
    canvas.sprite(Sprite::StopSign, sign);

    if frame.settings.show_stopping_point_metrics {
        let conv = &frame.state.conversions;
        let mut text: String<24> = String::new();
        let distance = (frame.snapshot.model_length * conv.distance).round() as i32;
        write!(text, "{distance}{}", conv.distance_unit(frame.snapshot.map_open)).ok();

        let font = FontSpec::demi_bold(35.0);
        let size = canvas.text_size(font, &text);
        let baseline = last.y - IMG_SIZE - 35.0;
        canvas.text(
            RectF::new(last.x - size.width / 2.0, baseline - size.height, size.width, size.height),
            &text,
            &TextStyle::baseline(font, colors::white(255)),
        );
    }
}

fn draw_adjacent_lane(canvas: &mut impl Canvas, frame: &HudFrame<'_>, lane: &Polygon, width: f32, blindspot: bool) {
    let height = canvas.size().height;
    let settings = frame.settings;
    let hue = if blindspot { 0.0 } else { adjacent_lane_hue(width, settings.lane_detection_width) };
    fill_polygon(canvas, lane, Fill::Gradient(hsl_gradient(height, hue, 0.75, 0.5, [0.6, 0.4, 0.2])));

    if settings.adjacent_path_metrics && !lane.is_empty() {
        let conv = &frame.state.conversions;
        let mut text: String<32> = String::new();
        if blindspot {
            text.push_str("Vehicle in blind spot").ok();
        } else {
            write!(text, "{:.2}{}", width * conv.distance, conv.distance_unit(frame.snapshot.map_open)).ok();
        }
        canvas.text(bounding_rect(lane), &text, &TextStyle::centered(FontSpec::demi_bold(30.0), colors::white(255)));
    }
}

pub fn draw_lanes(canvas: &mut impl Canvas, frame: &HudFrame<'_>) {
    let scene: &SceneGeometry = frame.scene;
    let settings = frame.settings;
    let snapshot = frame.snapshot;
    let height = canvas.size().height;
    canvas.set_opacity(1.0);

    for (line, &prob) in scene.lane_lines.iter().zip(&scene.lane_line_probs) {
        fill_polygon(canvas, line, Fill::Solid(lane_line_color(settings, prob)));
    }
    for (edge, &std) in scene.road_edges.iter().zip(&scene.road_edge_stds) {
        fill_polygon(canvas, edge, Fill::Solid(road_edge_color(std)));
    }

    let path = if snapshot.experimental_mode || settings.acceleration_path {
        acceleration_path_gradient(height, &scene.track, &scene.track_accel, settings)
    } else {
        stock_path_gradient(height)
    };
    fill_polygon(canvas, &scene.track, Fill::Gradient(path));

    let overridden = ConditionalStatus::from_code(snapshot.conditional_status).is_some_and(|s| s.is_override());
    if settings.show_stopping_point && snapshot.red_light && frame.state.speed > 1.0 && !overridden {
        draw_stopping_point(canvas, frame);
    }

    let car = &snapshot.car;
    if settings.blind_spot_path {
        let gradient = hsl_gradient(height, 0.0, 0.75, 0.5, [0.6, 0.4, 0.2]);
        if car.left_blindspot {
            fill_polygon(canvas, &scene.track_adjacent[4], Fill::Gradient(gradient.clone()));
        }
        if car.right_blindspot {
            fill_polygon(canvas, &scene.track_adjacent[5], Fill::Gradient(gradient));
        }
    }

    if (settings.adjacent_path || settings.adjacent_path_metrics)
        && frame.state.v_ego >= settings.minimum_lane_change_speed
    {
        draw_adjacent_lane(canvas, frame, &scene.track_adjacent[4], scene.lane_width_left, car.left_blindspot);
        draw_adjacent_lane(canvas, frame, &scene.track_adjacent[5], scene.lane_width_right, car.right_blindspot);
    }

    if scene.track.len() >= 3 {
        let edges = path_edge_gradient(height, path_edge_color(snapshot, settings));
        canvas.path(&[scene.track.as_slice(), scene.track_edge.as_slice()], &ShapeStyle::gradient(edges));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_line_alpha_capped() {
        let stock = HudSettings::default();
        let capped = lane_line_color(&stock, 1.0).a;
        assert!((178..=179).contains(&capped), "Probability capped at 0.7, got {capped}");
        assert_eq!(lane_line_color(&stock, -1.0).a, 0);
        let themed = HudSettings { use_stock_colors: false, lane_lines_color: colors::blue(200), ..stock };
        assert_eq!(lane_line_color(&themed, 0.1), colors::blue(200));
    }

    #[test]
    fn test_road_edge_alpha() {
        assert_eq!(road_edge_color(0.0), Color::rgba(255, 0, 0, 255));
        assert_eq!(road_edge_color(2.0).a, 0);
    }

    #[test]
    fn test_acceleration_hue_extremes() {
        let braking = acceleration_color(-3.0, 0.0);
        assert!(braking.r > braking.g, "Hard braking is red");
        let accelerating = acceleration_color(3.0, 0.0);
        assert!(accelerating.g > accelerating.r, "Hard acceleration is green");
        assert_eq!(acceleration_color(1.0, 0.75).a, 0, "Fully faded at the far end");
        assert_eq!(acceleration_color(1.0, 0.1).a, 102, "Alpha holds below the fade window");
    }

    #[test]
    fn test_acceleration_gradient_skips_offscreen_points() {
        let track = [
            PointF::new(0.0, 900.0),
            PointF::new(0.0, -50.0),
            PointF::new(0.0, 500.0),
            PointF::new(0.0, 500.0),
            PointF::new(0.0, 500.0),
            PointF::new(0.0, 500.0),
        ];
        let g = acceleration_path_gradient(1000.0, &track, &[1.0, 1.0, 1.0], &HudSettings::default());
        let positions: Vec<f32> = g.stops().iter().map(|(p, _)| *p).collect();
        assert!(positions.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(!positions.iter().any(|p| *p > 1.0), "Off-screen point ignored");
        assert!(!g.stops().is_empty());
    }

    #[test]
    fn test_low_acceleration_uses_theme_color() {
        let settings = HudSettings { use_stock_colors: false, path_color: colors::blue(255), ..HudSettings::default() };
        let track = [PointF::new(0.0, 500.0), PointF::new(0.0, 500.0)];
        let g = acceleration_path_gradient(1000.0, &track, &[0.1], &settings);
        assert_eq!(g.stops()[0].1, colors::blue(255));
        assert_eq!(g.stops().len(), 3);
    }

    #[test]
    fn test_path_edge_priority() {
        let settings = HudSettings::default();
        let mut snap = TelemetrySnapshot { experimental_mode: true, traffic_mode_active: true, ..Default::default() };
        assert_eq!(path_edge_color(&snap, &settings), Some(status_color(Status::ExperimentalModeActive)));

        snap.conditional_status = 3;
        assert_eq!(path_edge_color(&snap, &settings), Some(status_color(Status::ConditionalOverridden)));

        snap.always_on_lateral_active = true;
        assert_eq!(path_edge_color(&snap, &settings), Some(status_color(Status::AlwaysOnLateralActive)));

        assert_eq!(path_edge_color(&TelemetrySnapshot::default(), &settings), None, "Stock gradient");
    }

    #[test]
    fn test_adjacent_hue() {
        assert_eq!(adjacent_lane_hue(2.5, 2.5), 120.0);
        assert_eq!(adjacent_lane_hue(1.25, 2.5), 0.0);
        assert_eq!(adjacent_lane_hue(10.0, 2.5), 0.0);
        assert!((adjacent_lane_hue(3.125, 2.5) - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_map_val_clamps() {
        assert_eq!(map_val(2.0, 0.0, 1.0, 0.95, 0.62), 0.62);
        assert_eq!(map_val(0.0, 0.375, 0.75, 0.4, 0.0), 0.4);
    }
}
