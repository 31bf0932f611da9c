//! Driver-monitoring icon: face outline and head-pose arcs.
//!
//! The icon sits in the bottom corner on the driver's side. Its opacity
//! follows the smoothed monitoring activity, so it fades rather than cuts
//! when monitoring toggles.

use crate::{
    canvas::{Canvas, PointF, RectF, ShapeStyle, SizeF, Sprite, Stroke},
    colors::{self, Color},
    config::{BTN_SIZE, DRIVER_ICON_BUTTON_SHIFT, DRIVER_ICON_OFFSET, IMG_SIZE},
    telemetry::{DriverPose, FACE_KEYPOINTS},
};

use super::HudFrame;

/// Arc chord length.
const ARC_LENGTH: f32 = 133.0;
const ARC_WIDTH: f32 = 6.7;
/// Extra arc width at full pose deviation.
const ARC_WIDTH_EXTEND: f32 = 12.0;
const FACE_PEN: f32 = 5.2;

/// Icon center on screen.
pub fn icon_center(screen: SizeF, rhd: bool, map_button: bool, distance_button: bool, status_bar_height: f32) -> PointF {
    let mut x = if rhd { screen.width - DRIVER_ICON_OFFSET } else { DRIVER_ICON_OFFSET };
    if rhd && map_button {
        x -= DRIVER_ICON_BUTTON_SHIFT;
    } else if distance_button {
        x += DRIVER_ICON_BUTTON_SHIFT;
    }
    PointF::new(x, screen.height - (DRIVER_ICON_OFFSET + status_bar_height / 2.0))
}

/// Face outline opacity: 0.65 while monitoring, fading to 0.2.
pub fn face_opacity(fade: f32) -> f32 {
    0.2 + 0.45 * (1.0 - fade)
}

/// Keypoints projected around `center`, nearer points drawn larger.
pub fn face_outline(pose: &DriverPose, center: PointF) -> [PointF; FACE_KEYPOINTS] {
    pose.keypoints.map(|[x, y, z]| {
        let kp = (z - 8.0) / 120.0 + 1.0;
        PointF::new(x * kp + center.x, y * kp + center.y)
    })
}

/// Arc color: grey when disengaged, green when engaged.
pub fn arc_color(engaged: bool, fade: f32) -> Color {
    let e = if engaged { 1.0 } else { 0.0 };
    Color::from_rgba_f(0.545 - 0.445 * e, 0.545 + 0.4 * e, 0.545 - 0.285 * e, 0.4 * (1.0 - fade))
}

fn arc_width(diff: f32) -> f32 {
    ARC_WIDTH + ARC_WIDTH_EXTEND * (diff * 5.0).min(1.0)
}

/// One head-pose arc: bounding rect, start angle, span and pen width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseArc {
    pub rect: RectF,
    pub start_deg: f32,
    pub span_deg: f32,
    pub width: f32,
}

/// Yaw arc then pitch arc.
pub fn pose_arcs(pose: &DriverPose, center: PointF) -> [PoseArc; 2] {
    let half = ARC_LENGTH / 2.0;
    let dx = -pose.sins[1] * half;
    let dy = -pose.sins[0] * half;

    let yaw = PoseArc {
        rect: RectF::new((center.x + dx).min(center.x), center.y - half, dx.abs(), ARC_LENGTH),
        start_deg: if pose.sins[1] > 0.0 { 90.0 } else { -90.0 },
        span_deg: 180.0,
        width: arc_width(pose.diff[1]),
    };
    let pitch = PoseArc {
        rect: RectF::new(center.x - half, (center.y + dy).min(center.y), ARC_LENGTH, dy.abs()),
        start_deg: if pose.sins[0] > 0.0 { 0.0 } else { 180.0 },
        span_deg: 180.0,
        width: arc_width(pose.diff[0]),
    };
    [yaw, pitch]
}

pub fn draw_driver_state(canvas: &mut impl Canvas, frame: &HudFrame<'_>) {
    let state = frame.state;
    let driver = &frame.snapshot.driver;
    if state.hide_bottom_icons || !driver.fresh {
        return;
    }

    let settings = frame.settings;
    let center = icon_center(
        canvas.size(),
        state.dm_rhd,
        settings.map_button_visible,
        settings.onroad_distance_button,
        state.status_bar_height(),
    );
    let opacity = face_opacity(state.dm_fade);

    canvas.set_opacity(1.0);
    canvas.ellipse(RectF::centered_at(center, SizeF::new(BTN_SIZE, BTN_SIZE)), &ShapeStyle::filled(colors::black(70)));
    canvas.set_opacity(opacity);
    canvas.sprite(Sprite::DriverFace, RectF::centered_at(center, SizeF::new(IMG_SIZE, IMG_SIZE)));
    canvas.set_opacity(1.0);

    let face = face_outline(&driver.pose, center);
    canvas.polyline(&face, &Stroke::round(colors::white(255).with_alpha_f(opacity), FACE_PEN));

    let color = arc_color(frame.snapshot.engaged, state.dm_fade);
    for arc in pose_arcs(&driver.pose, center) {
        canvas.arc(arc.rect, arc.start_deg, arc.span_deg, &Stroke::round(color, arc.width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: SizeF = SizeF::new(2160.0, 1080.0);

    #[test]
    fn test_icon_follows_driver_side() {
        let lhd = icon_center(SCREEN, false, false, false, 0.0);
        assert_eq!(lhd, PointF::new(126.0, 1080.0 - 126.0));
        let rhd = icon_center(SCREEN, true, false, false, 0.0);
        assert_eq!(rhd.x, 2160.0 - 126.0);
    }

    #[test]
    fn test_icon_shifts_for_buttons() {
        assert_eq!(icon_center(SCREEN, true, true, true, 0.0).x, 2160.0 - 126.0 - 250.0, "Map button wins on the right");
        assert_eq!(icon_center(SCREEN, false, true, true, 0.0).x, 126.0 + 250.0);
        assert_eq!(icon_center(SCREEN, false, false, false, 50.0).y, 1080.0 - 151.0, "Lifted above the status bar");
    }

    #[test]
    fn test_face_opacity_bounds() {
        assert!((face_opacity(0.0) - 0.65).abs() < 1e-6);
        assert!((face_opacity(1.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_keypoint_depth_scale() {
        let mut pose = DriverPose::default();
        pose.keypoints[0] = [10.0, -10.0, 8.0];
        pose.keypoints[1] = [10.0, 0.0, 128.0];
        let face = face_outline(&pose, PointF::new(100.0, 100.0));
        assert_eq!(face[0], PointF::new(110.0, 90.0), "Depth 8 is unscaled");
        assert_eq!(face[1], PointF::new(120.0, 100.0), "Depth 128 doubles");
    }

    #[test]
    fn test_pose_arcs() {
        let pose = DriverPose { sins: [-0.2, 0.5, 0.0], diff: [1.0, 0.1, 0.0], ..DriverPose::default() };
        let [yaw, pitch] = pose_arcs(&pose, PointF::new(200.0, 200.0));

        assert!((yaw.rect.width - 33.25).abs() < 1e-4);
        assert!((yaw.rect.x - (200.0 - 33.25)).abs() < 1e-4, "Looking right opens the arc to the left");
        assert_eq!(yaw.start_deg, 90.0);
        assert!((yaw.width - (6.7 + 6.0)).abs() < 1e-4);

        assert_eq!(pitch.rect.y, 200.0);
        assert_eq!(pitch.start_deg, 180.0);
        assert!((pitch.width - 18.7).abs() < 1e-4, "Width extension is capped");
    }

    #[test]
    fn test_arc_color_engagement() {
        assert_eq!(arc_color(false, 0.0), Color::from_rgba_f(0.545, 0.545, 0.545, 0.4));
        let engaged = arc_color(true, 1.0);
        assert!(engaged.g > engaged.r);
        assert_eq!(engaged.a, 0, "Fully faded");
    }
}
