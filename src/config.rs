//! Layout constants, timings and runtime settings.
//!
//! # Optimization: Pre-computed Layout Constants
//!
//! Every fixed position and size on the overlay is a `const`, so the composer
//! only does arithmetic for values that genuinely depend on the tick (box
//! widths that follow the limit text, positions that follow the display
//! size). Derived anchors like [`DRIVER_ICON_OFFSET`] are folded at compile
//! time.
//!
//! Orderings that the timers rely on (fade after hold, ramp segments in
//! order) are checked with `const _: () = assert!(...)` so a bad edit fails
//! the build instead of producing a glitchy transition.
//!
//! # Runtime Settings
//!
//! [`HudSettings`] holds the driver's toggles. It is validated once when the
//! engine is constructed; the per-tick path trusts it.

use std::time::Duration;

use crate::{
    colors::{self, Color},
    error::ConfigError,
    widgets::turn_signals::SignalTheme,
};

// =============================================================================
// Frame Pacing
// =============================================================================

/// Nominal UI refresh rate in Hz.
pub const UI_FREQ: f32 = 20.0;

/// Time constant of the frame-rate filter, in seconds.
pub const FPS_FILTER_RC: f32 = 3.0;

/// Filtered frame rate below which a warning is logged.
pub const SLOW_FPS: f32 = 15.0;

/// Draw cycles skipped while no new video frame is ready.
pub const FRAME_SKIP_LIMIT: u8 = 5;

/// Weight of each tick in the driver-monitor fade.
pub const DM_FADE_RATE: f32 = 0.2;

// =============================================================================
// Timed Transitions
// =============================================================================

/// Status text stays fully opaque this long after it changes.
pub const TEXT_DURATION: Duration = Duration::from_millis(5000);

/// Length of the status to road-name crossfade.
pub const FADE_DURATION: Duration = Duration::from_millis(1500);

/// Full period of the pending-limit blink.
pub const BLINK_PERIOD: Duration = Duration::from_millis(1000);

/// Portion of [`BLINK_PERIOD`] during which the pending sign pen is red.
pub const BLINK_ON: Duration = Duration::from_millis(500);

/// A peak acceleration goes stale after this long without a new peak.
pub const PEAK_ACCEL_HOLD: Duration = Duration::from_millis(5000);

/// Continuous driving time required before the standstill timer may run.
pub const STANDSTILL_MIN_STARTED: Duration = Duration::from_secs(10);

/// Standstill duration at which the readout replaces the speed digits.
pub const STANDSTILL_DISPLAY_AFTER: Duration = Duration::from_secs(1);

/// Standstill color ramp breakpoints, in seconds.
pub const STANDSTILL_HOLD_SECS: f32 = 60.0;
pub const STANDSTILL_MID_SECS: f32 = 90.0;
pub const STANDSTILL_END_SECS: f32 = 120.0;

const _: () = assert!(BLINK_ON.as_millis() < BLINK_PERIOD.as_millis());
const _: () = assert!(STANDSTILL_DISPLAY_AFTER.as_secs() < STANDSTILL_MIN_STARTED.as_secs());
const _: () = assert!(STANDSTILL_HOLD_SECS < STANDSTILL_MID_SECS);
const _: () = assert!(STANDSTILL_MID_SECS < STANDSTILL_END_SECS);

// =============================================================================
// Shared Layout
// =============================================================================

/// Border between the overlay content and the screen edge.
pub const UI_BORDER_SIZE: f32 = 30.0;

/// Height of the darkened band behind the set-speed box and speed readout.
pub const UI_HEADER_HEIGHT: f32 = 420.0;

/// Size of round on-screen buttons (driver monitor icon).
pub const BTN_SIZE: f32 = 192.0;

/// Size of icons drawn inside buttons.
pub const IMG_SIZE: f32 = BTN_SIZE / 4.0 * 3.0;

/// Height of the bottom status bar.
pub const STATUS_BAR_HEIGHT: f32 = 50.0;

/// Horizontal distance from the screen edge to the driver monitor icon center.
pub const DRIVER_ICON_OFFSET: f32 = UI_BORDER_SIZE + BTN_SIZE / 2.0;

/// Horizontal shift of the driver icon to make room for a neighboring button.
pub const DRIVER_ICON_BUTTON_SHIFT: f32 = 250.0;

// =============================================================================
// Set-Speed Box
// =============================================================================

pub const SET_SPEED_ORIGIN_X: f32 = 60.0;
pub const SET_SPEED_ORIGIN_Y: f32 = 45.0;

/// Base box size for imperial units with no sign.
pub const SET_SPEED_WIDTH: f32 = 172.0;
pub const SET_SPEED_HEIGHT: f32 = 204.0;

/// Box width for metric units or a Vienna sign.
pub const SET_SPEED_WIDTH_WIDE: f32 = 200.0;

/// Box width for a US sign with a three-digit limit.
pub const SET_SPEED_WIDTH_EXTRA_WIDE: f32 = 223.0;

pub const SET_SPEED_RADIUS: f32 = 32.0;

/// Bottom corner radius that hugs a round Vienna sign.
pub const SET_SPEED_VIENNA_BOTTOM_RADIUS: f32 = 100.0;

const _: () = assert!(SET_SPEED_WIDTH < SET_SPEED_WIDTH_WIDE);
const _: () = assert!(SET_SPEED_WIDTH_WIDE < SET_SPEED_WIDTH_EXTRA_WIDE);

// =============================================================================
// Speed-Limit Signs
// =============================================================================

/// Margin between the set-speed digits, the sign, and the box border.
pub const SIGN_MARGIN: f32 = 12.0;

/// Height of a US (MUTCD) sign.
pub const US_SIGN_HEIGHT: f32 = 186.0;

/// Diameter of a Vienna sign.
pub const VIENNA_SIGN_SIZE: f32 = 176.0;

pub const US_SIGN_RADIUS: f32 = 24.0;
pub const US_SIGN_INNER_RADIUS: f32 = 16.0;
pub const US_SIGN_INNER_INSET: f32 = 9.0;
pub const US_SIGN_INNER_PEN: f32 = 6.0;

pub const VIENNA_RING_INSET: f32 = 16.0;
pub const VIENNA_RING_PEN: f32 = 20.0;

/// Gap between the current sign and the pending sign beside it.
pub const PENDING_SIGN_GAP: f32 = 25.0;

/// Pending US sign width for short and three-digit limits.
pub const PENDING_SIGN_WIDTH: f32 = 175.0;
pub const PENDING_SIGN_WIDTH_WIDE: f32 = 200.0;

/// Opacity of a sign whose limit the driver has overridden.
pub const OVERRIDDEN_SIGN_OPACITY: f32 = 0.25;

/// Source panel rows below the sign.
pub const SOURCE_ROW_WIDTH: f32 = 500.0;
pub const SOURCE_ROW_HEIGHT: f32 = 60.0;
pub const SOURCE_ROW_SPACING: f32 = 15.0;
pub const SOURCE_PANEL_TOP_GAP: f32 = 45.0;

// =============================================================================
// Curve-Speed Advisory
// =============================================================================

/// Horizontal gap between the set-speed box and the curve icon.
pub const CURVE_ICON_GAP: f32 = 25.0;

/// Advisory box height when it is the only source, or the controlling one.
pub const CURVE_BOX_TALL: f32 = 100.0;
pub const CURVE_BOX_SHORT: f32 = 50.0;
pub const CURVE_BOX_RADIUS: f32 = 24.0;

/// Minimum gap in display units between cruise target and advisory speed.
pub const CURVE_MIN_MARGIN: f32 = 1.0;

// =============================================================================
// Status Bar and Turn Signals
// =============================================================================

pub const STATUS_BAR_RADIUS: f32 = 30.0;

/// Nominal size of a turn-signal sprite frame.
pub const SIGNAL_WIDTH: f32 = 360.0;
pub const SIGNAL_HEIGHT: f32 = 480.0;

// =============================================================================
// Runtime Settings
// =============================================================================

/// Driver toggles that change what the overlay draws.
#[derive(Clone, Debug, PartialEq)]
pub struct HudSettings {
    pub is_metric: bool,
    /// Show lead metrics in SI units regardless of [`Self::is_metric`].
    pub use_si_metrics: bool,
    /// Prefer raw wheel speed over the dashboard-reported speed.
    pub use_wheel_speed: bool,
    pub speed_limit_controller: bool,
    /// Force the Vienna sign when navigation does not report a sign family.
    pub use_vienna_sign: bool,

    pub hide_speed: bool,
    pub hide_max_speed: bool,
    pub hide_speed_limit: bool,
    pub hide_curve_speed_ui: bool,
    pub hide_lead_marker: bool,

    pub show_speed_limit_offset: bool,
    pub show_speed_limit_sources: bool,
    /// Muted theme: stock colors and shorter chevron ramps.
    pub use_stock_colors: bool,

    /// Chevron labels and the insights bar.
    pub lead_metrics: bool,
    pub show_always_on_lateral_status_bar: bool,
    pub show_conditional_status_bar: bool,
    pub road_name_ui: bool,
    pub show_standstill_timer: bool,
    pub show_stopping_point: bool,
    pub show_stopping_point_metrics: bool,
    pub acceleration_path: bool,

    pub map_button_visible: bool,
    pub onroad_distance_button: bool,

    pub adjacent_path: bool,
    pub adjacent_path_metrics: bool,
    pub blind_spot_path: bool,
    /// Lane width the adjacent-path hue is measured against, in metres.
    pub lane_detection_width: f32,
    /// Adjacent paths are only drawn at or above this speed, in m/s.
    pub minimum_lane_change_speed: f32,

    pub path_color: Color,
    pub path_edges_color: Color,
    pub lane_lines_color: Color,
    /// Primary lead chevron color when stock colors are off.
    pub lead_marker_color: Color,

    /// Custom turn-signal animation, if one is installed.
    pub turn_signal_theme: Option<SignalTheme>,

    pub ui_frequency: f32,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            is_metric: true,
            use_si_metrics: false,
            use_wheel_speed: false,
            speed_limit_controller: false,
            use_vienna_sign: false,
            hide_speed: false,
            hide_max_speed: false,
            hide_speed_limit: false,
            hide_curve_speed_ui: false,
            hide_lead_marker: false,
            show_speed_limit_offset: false,
            show_speed_limit_sources: false,
            use_stock_colors: true,
            lead_metrics: false,
            show_always_on_lateral_status_bar: false,
            show_conditional_status_bar: false,
            road_name_ui: false,
            show_standstill_timer: false,
            show_stopping_point: false,
            show_stopping_point_metrics: false,
            acceleration_path: false,
            map_button_visible: false,
            onroad_distance_button: false,
            adjacent_path: false,
            adjacent_path_metrics: false,
            blind_spot_path: false,
            lane_detection_width: 2.5,
            minimum_lane_change_speed: 20.0 / 3.6,
            path_color: colors::white(241),
            path_edges_color: colors::white(241),
            lane_lines_color: colors::white(241),
            lead_marker_color: colors::red(255),
            turn_signal_theme: None,
            ui_frequency: UI_FREQ,
        }
    }
}

impl HudSettings {
    /// Reject settings that would make the per-tick math meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ui_frequency.is_finite() && self.ui_frequency > 0.0) {
            return Err(ConfigError::InvalidUiFrequency(self.ui_frequency));
        }
        non_negative("lane_detection_width", self.lane_detection_width)?;
        non_negative("minimum_lane_change_speed", self.minimum_lane_change_speed)?;
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert_eq!(HudSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let settings = HudSettings { ui_frequency: 0.0, ..HudSettings::default() };
        assert_eq!(settings.validate(), Err(ConfigError::InvalidUiFrequency(0.0)));
    }

    #[test]
    fn test_nan_lane_width_rejected() {
        let settings = HudSettings { lane_detection_width: f32::NAN, ..HudSettings::default() };
        assert!(
            matches!(settings.validate(), Err(ConfigError::NotFinite { field: "lane_detection_width", .. })),
            "NaN lane width must be reported by field name"
        );
    }

    #[test]
    fn test_negative_lane_change_speed_rejected() {
        let settings = HudSettings { minimum_lane_change_speed: -1.0, ..HudSettings::default() };
        assert!(matches!(settings.validate(), Err(ConfigError::Negative { .. })));
    }

    #[test]
    fn test_driver_icon_offset() {
        assert!((DRIVER_ICON_OFFSET - 126.0).abs() < f32::EPSILON);
        assert!((IMG_SIZE - 144.0).abs() < f32::EPSILON);
    }
}
