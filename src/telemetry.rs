//! Per-tick telemetry snapshot consumed by the engine.
//!
//! The snapshot is a plain value bag filled by whatever owns the telemetry
//! bus. Every source carries a liveness flag; the engine degrades to
//! sentinels and placeholders when a source is not live instead of failing.
//!
//! Units are SI throughout (m/s, m, m/s²) except the cruise targets, which
//! the controls stack reports in km/h.
//!
//! Screen-space geometry (lanes, path, lead anchor points) is not part of the
//! snapshot; it comes from the calibration layer as [`SceneGeometry`].

use std::str::FromStr;

use heapless::Vec;

use crate::{
    canvas::{PointF, RectF},
    error::ParseSourceError,
};

/// Maximum vertices in one projected polygon.
pub const MAX_POLYGON_POINTS: usize = 128;

/// Number of face keypoints in the driver monitoring outline.
pub const FACE_KEYPOINTS: usize = 17;

/// Screen-space polygon from the calibration layer.
pub type Polygon = Vec<PointF, MAX_POLYGON_POINTS>;

// =============================================================================
// Engagement
// =============================================================================

/// Overall engagement status of the driver-assistance system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Disengaged,
    Override,
    Engaged,
    AlwaysOnLateralActive,
    ConditionalOverridden,
    ExperimentalModeActive,
    NavigationActive,
    TrafficModeActive,
}

/// Size of the alert banner the controls stack is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AlertSize {
    #[default]
    None,
    Small,
    Mid,
    Full,
}

// =============================================================================
// Speed Limits
// =============================================================================

/// Sign family reported by navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SpeedLimitSign {
    /// US rectangular sign.
    #[default]
    Mutcd,
    /// EU round sign.
    Vienna,
}

/// Where the speed-limit controller took its current limit from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedLimitSource {
    Dashboard,
    MapData,
    Navigation,
    Upcoming,
}

impl SpeedLimitSource {
    /// All sources in panel order.
    pub const ALL: [Self; 4] = [Self::Dashboard, Self::MapData, Self::Navigation, Self::Upcoming];

    /// Label as shown on the source panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::MapData => "Map Data",
            Self::Navigation => "Navigation",
            Self::Upcoming => "Upcoming",
        }
    }
}

impl FromStr for SpeedLimitSource {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.label() == s)
            .ok_or_else(|| ParseSourceError(s.to_owned()))
    }
}

/// Per-source limits known to the speed-limit controller, in m/s.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SourceLimits {
    pub dashboard: f32,
    pub map_data: f32,
    pub navigation: f32,
    pub upcoming: f32,
}

impl SourceLimits {
    #[inline]
    pub const fn get(&self, source: SpeedLimitSource) -> f32 {
        match source {
            SpeedLimitSource::Dashboard => self.dashboard,
            SpeedLimitSource::MapData => self.map_data,
            SpeedLimitSource::Navigation => self.navigation,
            SpeedLimitSource::Upcoming => self.upcoming,
        }
    }
}

/// State published by the speed-limit controller.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SpeedLimitState {
    /// Resolved limit in m/s.
    pub limit: f32,
    pub overridden: bool,
    pub overridden_speed: f32,
    /// Offset the controller applies above the limit, in m/s.
    pub offset: f32,
    /// A new limit is waiting for driver confirmation.
    pub changed: bool,
    pub unconfirmed_limit: f32,
    pub source: Option<SpeedLimitSource>,
    pub sources: SourceLimits,
}

/// Curve-speed advisories, in m/s.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CurveSpeedState {
    /// Map-based turn speed controller.
    pub mtsc_enabled: bool,
    pub mtsc_speed: f32,
    /// Vision-based turn speed controller.
    pub vtsc_enabled: bool,
    pub vtsc_speed: f32,
    pub vtsc_controlling: bool,
    pub left_curve: bool,
}

// =============================================================================
// Vehicle and Controls
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ControlsState {
    /// Cruise target in km/h.
    pub v_cruise: f32,
    /// Cruise target as shown on the instrument cluster, km/h. Zero on older data.
    pub v_cruise_cluster: f32,
    pub alert_size: AlertSize,
    /// Height of the alert banner in pixels.
    pub alert_height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CarState {
    pub v_ego: f32,
    /// Speed as shown on the instrument cluster. Zero on older data.
    pub v_ego_cluster: f32,
    pub brake_lights: bool,
    pub brake_pressed: bool,
    pub standstill: bool,
    pub left_blinker: bool,
    pub right_blinker: bool,
    pub left_blindspot: bool,
    pub right_blindspot: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct NavInstruction {
    /// Limit in m/s.
    pub speed_limit: f32,
    pub speed_limit_sign: SpeedLimitSign,
}

// =============================================================================
// Driver Monitoring
// =============================================================================

/// Face keypoints and head pose from the driver camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverPose {
    /// Keypoints already rotated into the icon frame (x, y, depth).
    pub keypoints: [[f32; 3]; FACE_KEYPOINTS],
    /// Sines of pitch, yaw and roll.
    pub sins: [f32; 3],
    /// Per-axis deviation from the smoothed pose.
    pub diff: [f32; 3],
}

impl Default for DriverPose {
    fn default() -> Self {
        Self { keypoints: [[0.0; 3]; FACE_KEYPOINTS], sins: [0.0; 3], diff: [0.0; 3] }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DriverMonitoring {
    /// New driver-camera data arrived since the drive started.
    pub fresh: bool,
    pub active: bool,
    pub is_rhd: bool,
    pub pose: DriverPose,
}

// =============================================================================
// Radar Leads
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LeadData {
    pub status: bool,
    pub d_rel: f32,
    pub y_rel: f32,
    pub v_rel: f32,
    pub v_lead: f32,
}

/// The six tracked leads, in radar order.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LeadSet {
    pub one: LeadData,
    pub two: LeadData,
    pub left: LeadData,
    pub right: LeadData,
    pub left_far: LeadData,
    pub right_far: LeadData,
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the overlay needs for one tick.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub controls_alive: bool,
    pub controls: ControlsState,
    pub car: CarState,
    pub status: Status,
    /// Tints the driver attention arcs.
    pub engaged: bool,
    pub long_control_stopping: bool,
    pub longitudinal_control: bool,

    pub nav_alive: bool,
    pub nav: NavInstruction,
    pub navigate_on_openpilot: bool,

    pub speed_limit: SpeedLimitState,
    pub curve_speed: CurveSpeedState,

    pub driver: DriverMonitoring,

    /// Radar data arrived since the drive started.
    pub radar_fresh: bool,
    pub leads: LeadSet,

    /// Current acceleration in m/s².
    pub acceleration: f32,
    pub always_on_lateral_active: bool,
    pub experimental_mode: bool,
    pub traffic_mode_active: bool,
    /// Conditional experimental mode cause code.
    pub conditional_status: u8,
    /// Speed thresholds used by the conditional status texts, in display units.
    pub conditional_limit: f32,
    pub conditional_limit_lead: f32,

    /// Frames since the drive started.
    pub started_frames: u32,
    pub map_open: bool,
    pub big_map: bool,
    pub road_name: Option<String>,
    /// Distance to the end of the model path, in metres.
    pub model_length: f32,
    pub red_light: bool,
}

impl TelemetrySnapshot {
    /// Big map only counts while a map is open at all.
    #[inline]
    pub const fn big_map_open(&self) -> bool {
        self.map_open && self.big_map
    }

    #[inline]
    pub const fn turn_signal_active(&self) -> bool {
        self.car.left_blinker || self.car.right_blinker
    }
}

// =============================================================================
// Projected Geometry
// =============================================================================

/// Screen-space vertex buffers from the calibration layer.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SceneGeometry {
    pub lane_lines: [Polygon; 4],
    pub lane_line_probs: [f32; 4],
    pub road_edges: [Polygon; 2],
    pub road_edge_stds: [f32; 2],
    /// Driving path. The first half of the points is the right side, aligned
    /// with [`Self::track_accel`].
    pub track: Polygon,
    pub track_edge: Polygon,
    /// Adjacent tracks; indices 4 and 5 are the left and right lanes.
    pub track_adjacent: [Polygon; 6],
    /// Planned acceleration along the path.
    pub track_accel: Vec<f32, 64>,
    /// Screen anchors of the six leads, in [`LeadSet`] order.
    pub lead_vertices: [PointF; 6],
    pub lane_width_left: f32,
    pub lane_width_right: f32,
    /// Draw world objects (lanes, leads) at all.
    pub world_objects_visible: bool,
}

/// Bounding box of a polygon, or an empty rect for no points.
pub fn bounding_rect(points: &[PointF]) -> RectF {
    let Some(first) = points.first() else {
        return RectF::default();
    };
    let (mut min, mut max) = (*first, *first);
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    RectF::new(min.x, min.y, max.x - min.x, max.y - min.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels_parse_back() {
        for source in SpeedLimitSource::ALL {
            assert_eq!(source.label().parse::<SpeedLimitSource>(), Ok(source));
        }
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert_eq!(
            "Radar".parse::<SpeedLimitSource>(),
            Err(ParseSourceError("Radar".into())),
            "Unknown labels must not map to a source"
        );
    }

    #[test]
    fn test_big_map_requires_open_map() {
        let snapshot = TelemetrySnapshot { big_map: true, ..Default::default() };
        assert!(!snapshot.big_map_open());
        let snapshot = TelemetrySnapshot { big_map: true, map_open: true, ..Default::default() };
        assert!(snapshot.big_map_open());
    }

    #[test]
    fn test_bounding_rect() {
        let pts = [PointF::new(10.0, 40.0), PointF::new(30.0, 20.0), PointF::new(20.0, 50.0)];
        assert_eq!(bounding_rect(&pts), RectF::new(10.0, 20.0, 20.0, 30.0));
        assert_eq!(bounding_rect(&[]), RectF::default());
    }
}
