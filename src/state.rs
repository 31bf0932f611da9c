//! Derived, display-ready state rebuilt from each telemetry snapshot.
//!
//! [`DerivedHudState`] is owned by the engine and updated in place once per
//! tick by [`DerivedHudState::update`]. It turns raw telemetry into what the
//! widgets draw: unit-converted speeds, readout strings, sign family, and
//! visibility flags. It also owns the few values that must persist across
//! ticks.
//!
//! # Persistent Values
//!
//! - **Cluster speed seen**: once the instrument cluster has reported a
//!   nonzero speed, the cluster speed is preferred forever. Older data never
//!   sets it, and falling back to wheel speed whenever it momentarily reads
//!   zero would make the readout flicker.
//! - **Previous set speed**: the curve-speed advisory only draws when the
//!   cruise target did not move since the last tick, so the advisory boxes
//!   do not jump around while the driver is still adjusting the target.
//! - **Driver-monitor fade**: a first-order step towards active/inactive
//!   each tick (see [`crate::filter::dm_fade_step`]).
//!
//! # Degradation
//!
//! The updater never fails. A dead controls feed shows the placeholder glyph
//! as cruise target and zero speed; a dead navigation feed means no
//! navigation limit and no navigation sign family.

use core::fmt::Write;

use heapless::String;

use crate::{
    config::{DM_FADE_RATE, HudSettings, STANDSTILL_MIN_STARTED, STATUS_BAR_HEIGHT},
    filter::dm_fade_step,
    status::ConditionalStatus,
    telemetry::{AlertSize, SourceLimits, SpeedLimitSign, Status, TelemetrySnapshot},
    units::{UnitConversions, UnitSystem},
    widgets::turn_signals::SignalStyle,
};

/// Cruise target reported when the controls feed is not alive.
pub const SET_SPEED_NA: f32 = 255.0;

/// Placeholder shown instead of digits.
pub const PLACEHOLDER: &str = "–";

/// Fixed-capacity readout string.
pub type Readout = String<24>;

// =============================================================================
// Readout Strings
// =============================================================================

/// Every numeric readout, formatted once per tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadoutStrings {
    pub set_speed: Readout,
    pub speed: Readout,
    pub speed_limit: Readout,
    pub pending_speed_limit: Readout,
    pub speed_limit_offset: Readout,
    pub mtsc_speed: Readout,
    pub vtsc_speed: Readout,
}

/// Rounded value, or the placeholder when it is not above 1.
fn value_or_placeholder(out: &mut Readout, value: f32, unit: &str) {
    out.clear();
    if value > 1.0 {
        write!(out, "{}{unit}", value.round() as i32).ok();
    } else {
        out.push_str(PLACEHOLDER).ok();
    }
}

/// Signed offset, or the placeholder when zero.
fn offset_readout(out: &mut Readout, offset: f32) {
    out.clear();
    let rounded = offset.round() as i32;
    if offset == 0.0 {
        out.push_str(PLACEHOLDER).ok();
    } else if offset > 0.0 {
        write!(out, "+{rounded}").ok();
    } else {
        write!(out, "{rounded}").ok();
    }
}

// =============================================================================
// Derived State
// =============================================================================

/// Display-ready state for one tick plus the values carried between ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedHudState {
    pub units: UnitSystem,
    pub conversions: UnitConversions,
    pub status: Status,

    /// Cruise target in display units, or [`SET_SPEED_NA`].
    pub set_speed: f32,
    pub is_cruise_set: bool,
    /// Current speed in display units.
    pub speed: f32,
    /// Raw speed in m/s.
    pub v_ego: f32,
    pub brake_lights: bool,
    pub stopping: bool,

    /// Speed limit in display units, with the visual offset removed.
    pub speed_limit: f32,
    pub speed_limit_offset: f32,
    pub show_speed_limit_offset: bool,
    pub speed_limit_changed: bool,
    pub speed_limit_overridden: bool,
    pub pending_speed_limit: f32,
    pub source_limits: SourceLimits,
    pub has_us_speed_limit: bool,
    pub has_eu_speed_limit: bool,

    pub mtsc_speed: f32,
    pub vtsc_speed: f32,
    /// The cruise target sits above an enabled curve advisory.
    pub curve_advisory_active: bool,
    /// Advisory is active and the cruise target held still since last tick.
    pub curve_advisory_visible: bool,

    pub map_open: bool,
    pub big_map_open: bool,
    pub hide_bottom_icons: bool,
    pub status_bar_visible: bool,
    pub standstill_timer_running: bool,

    pub dm_active: bool,
    pub dm_rhd: bool,
    pub dm_fade: f32,

    pub conditional_status: Option<ConditionalStatus>,
    pub strings: ReadoutStrings,

    v_ego_cluster_seen: bool,
    previous_set_speed: f32,
}

impl Default for DerivedHudState {
    fn default() -> Self {
        Self::new()
    }
}

impl DerivedHudState {
    pub fn new() -> Self {
        Self {
            units: UnitSystem::Metric,
            conversions: UnitConversions::default(),
            status: Status::Disengaged,
            set_speed: SET_SPEED_NA,
            is_cruise_set: false,
            speed: 0.0,
            v_ego: 0.0,
            brake_lights: false,
            stopping: false,
            speed_limit: 0.0,
            speed_limit_offset: 0.0,
            show_speed_limit_offset: false,
            speed_limit_changed: false,
            speed_limit_overridden: false,
            pending_speed_limit: 0.0,
            source_limits: SourceLimits::default(),
            has_us_speed_limit: false,
            has_eu_speed_limit: false,
            mtsc_speed: 0.0,
            vtsc_speed: 0.0,
            curve_advisory_active: false,
            curve_advisory_visible: false,
            map_open: false,
            big_map_open: false,
            hide_bottom_icons: false,
            status_bar_visible: false,
            standstill_timer_running: false,
            dm_active: false,
            dm_rhd: false,
            dm_fade: 0.0,
            conditional_status: None,
            strings: ReadoutStrings::default(),
            v_ego_cluster_seen: false,
            previous_set_speed: 0.0,
        }
    }

    /// The cluster has reported a nonzero speed at least once.
    #[inline]
    pub const fn v_ego_cluster_seen(&self) -> bool {
        self.v_ego_cluster_seen
    }

    /// Height the status bar occupies at the bottom of the screen.
    #[inline]
    pub const fn status_bar_height(&self) -> f32 {
        if self.status_bar_visible { STATUS_BAR_HEIGHT } else { 0.0 }
    }

    /// Rebuild everything from this tick's snapshot.
    pub fn update(&mut self, snapshot: &TelemetrySnapshot, settings: &HudSettings) {
        self.units = UnitSystem::from_metric_flag(settings.is_metric);
        self.conversions = UnitConversions::new(self.units, settings.use_si_metrics);
        self.status = snapshot.status;
        self.map_open = snapshot.map_open;
        self.big_map_open = snapshot.big_map_open();

        self.update_speeds(snapshot, settings);
        self.update_speed_limit(snapshot, settings);
        self.update_curve_speed(snapshot, settings);
        self.update_visibility(snapshot, settings);

        self.dm_active = snapshot.driver.active;
        self.dm_rhd = snapshot.driver.is_rhd;
        self.dm_fade = dm_fade_step(self.dm_fade, self.dm_active, DM_FADE_RATE);

        self.conditional_status = ConditionalStatus::from_code(snapshot.conditional_status);
        self.update_strings();
    }

    fn update_speeds(&mut self, snapshot: &TelemetrySnapshot, settings: &HudSettings) {
        let controls = &snapshot.controls;
        let car = &snapshot.car;

        // Older data leaves the cluster value at zero.
        let v_cruise = if controls.v_cruise_cluster == 0.0 { controls.v_cruise } else { controls.v_cruise_cluster };
        self.set_speed = if snapshot.controls_alive { v_cruise } else { SET_SPEED_NA };
        self.is_cruise_set = self.set_speed > 0.0 && self.set_speed as i32 != SET_SPEED_NA as i32;
        if self.is_cruise_set {
            self.set_speed = self.units.cruise_from_kph(self.set_speed);
        }

        self.v_ego_cluster_seen = self.v_ego_cluster_seen || car.v_ego_cluster != 0.0;
        self.v_ego = car.v_ego;
        let v_ego = if self.v_ego_cluster_seen && !settings.use_wheel_speed { car.v_ego_cluster } else { car.v_ego };
        let speed = if snapshot.controls_alive { v_ego.max(0.0) } else { 0.0 };
        self.speed = self.units.speed_from_ms(speed);

        self.brake_lights = car.brake_lights || car.brake_pressed;
        self.stopping = snapshot.long_control_stopping;
    }

    fn update_speed_limit(&mut self, snapshot: &TelemetrySnapshot, settings: &HudSettings) {
        let slc = &snapshot.speed_limit;
        let factor = self.units.speed_factor();

        let limit = if settings.speed_limit_controller {
            if slc.overridden { slc.overridden_speed } else { slc.limit }
        } else if snapshot.nav_alive {
            snapshot.nav.speed_limit
        } else {
            0.0
        };

        self.show_speed_limit_offset = settings.show_speed_limit_offset;
        self.speed_limit_offset = slc.offset * factor;
        self.speed_limit = limit * factor;
        if self.show_speed_limit_offset {
            self.speed_limit -= self.speed_limit_offset;
        }

        self.speed_limit_changed = slc.changed;
        self.speed_limit_overridden = slc.overridden;
        self.pending_speed_limit = slc.unconfirmed_limit * factor;
        self.source_limits = SourceLimits {
            dashboard: slc.sources.dashboard * factor,
            map_data: slc.sources.map_data * factor,
            navigation: slc.sources.navigation * factor,
            upcoming: slc.sources.upcoming * factor,
        };

        // A live navigation feed decides the sign family; the user's
        // preference only applies without one.
        let shown = !settings.hide_speed_limit;
        let (us, eu) = if snapshot.nav_alive {
            let sign = snapshot.nav.speed_limit_sign;
            (sign == SpeedLimitSign::Mutcd, sign == SpeedLimitSign::Vienna)
        } else {
            (!settings.use_vienna_sign, settings.use_vienna_sign)
        };
        self.has_us_speed_limit = shown && us;
        self.has_eu_speed_limit = shown && eu;
    }

    fn update_curve_speed(&mut self, snapshot: &TelemetrySnapshot, settings: &HudSettings) {
        let curve = &snapshot.curve_speed;
        let factor = self.units.speed_factor();
        self.mtsc_speed = curve.mtsc_speed * factor;
        self.vtsc_speed = curve.vtsc_speed * factor;

        let margin = crate::config::CURVE_MIN_MARGIN;
        let mtsc_below = curve.mtsc_enabled && self.set_speed - self.mtsc_speed > margin;
        let vtsc_below = curve.vtsc_enabled && self.set_speed - self.vtsc_speed > margin;
        self.curve_advisory_active = mtsc_below || vtsc_below;

        let wanted = !self.speed_limit_changed
            && self.is_cruise_set
            && self.curve_advisory_active
            && !settings.hide_curve_speed_ui;

        self.curve_advisory_visible = false;
        if wanted {
            if self.set_speed == self.previous_set_speed {
                self.curve_advisory_visible = true;
            } else {
                self.previous_set_speed = self.set_speed;
            }
        }
    }

    fn update_visibility(&mut self, snapshot: &TelemetrySnapshot, settings: &HudSettings) {
        let sweeping_signal = settings
            .turn_signal_theme
            .as_ref()
            .is_some_and(|theme| theme.is_animated() && theme.style != SignalStyle::Static);

        self.hide_bottom_icons = snapshot.controls.alert_size != AlertSize::None
            || (sweeping_signal && snapshot.turn_signal_active())
            || self.big_map_open;

        self.status_bar_visible = (settings.show_always_on_lateral_status_bar
            || settings.show_conditional_status_bar
            || settings.road_name_ui)
            && !self.big_map_open;

        let started_secs = snapshot.started_frames as f32 / settings.ui_frequency;
        self.standstill_timer_running = settings.show_standstill_timer
            && snapshot.car.standstill
            && started_secs >= STANDSTILL_MIN_STARTED.as_secs_f32()
            && !snapshot.map_open;
    }

    fn update_strings(&mut self) {
        let unit = self.units.speed_unit();
        let s = &mut self.strings;

        s.set_speed.clear();
        if self.is_cruise_set {
            write!(s.set_speed, "{}", self.set_speed.round() as i32).ok();
        } else {
            s.set_speed.push_str(PLACEHOLDER).ok();
        }

        s.speed.clear();
        write!(s.speed, "{}", self.speed.round() as i32).ok();

        value_or_placeholder(&mut s.speed_limit, self.speed_limit, "");
        value_or_placeholder(&mut s.pending_speed_limit, self.pending_speed_limit, "");
        offset_readout(&mut s.speed_limit_offset, self.speed_limit_offset);
        value_or_placeholder(&mut s.mtsc_speed, self.mtsc_speed, unit);
        value_or_placeholder(&mut s.vtsc_speed, self.vtsc_speed, unit);
    }
}

/// Number of characters in a readout, as the sign layouts count them.
#[inline]
pub fn readout_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        telemetry::{CarState, ControlsState, CurveSpeedState, NavInstruction, SpeedLimitState},
        units::{KM_TO_MILE, MS_TO_KPH},
    };

    fn alive(v_cruise: f32, v_ego: f32) -> TelemetrySnapshot {
        TelemetrySnapshot {
            controls_alive: true,
            controls: ControlsState { v_cruise, ..Default::default() },
            car: CarState { v_ego, ..Default::default() },
            ..Default::default()
        }
    }

    fn updated(snapshot: &TelemetrySnapshot, settings: &HudSettings) -> DerivedHudState {
        let mut state = DerivedHudState::new();
        state.update(snapshot, settings);
        state
    }

    #[test]
    fn test_dead_controls_show_placeholder_and_zero_speed() {
        let snapshot = TelemetrySnapshot { controls_alive: false, ..alive(100.0, 20.0) };
        let state = updated(&snapshot, &HudSettings::default());
        assert!(!state.is_cruise_set);
        assert_eq!(state.set_speed, SET_SPEED_NA);
        assert_eq!(state.strings.set_speed.as_str(), PLACEHOLDER);
        assert_eq!(state.strings.speed.as_str(), "0");
    }

    #[test]
    fn test_zero_cruise_shows_placeholder() {
        let state = updated(&alive(0.0, 0.0), &HudSettings::default());
        assert_eq!(state.strings.set_speed.as_str(), PLACEHOLDER);
    }

    #[test]
    fn test_cluster_cruise_preferred_when_nonzero() {
        let mut snapshot = alive(100.0, 0.0);
        snapshot.controls.v_cruise_cluster = 98.0;
        let state = updated(&snapshot, &HudSettings::default());
        assert_eq!(state.strings.set_speed.as_str(), "98");
    }

    #[test]
    fn test_imperial_cruise_converted() {
        let settings = HudSettings { is_metric: false, ..HudSettings::default() };
        let state = updated(&alive(100.0, 0.0), &settings);
        assert!((state.set_speed - 100.0 * KM_TO_MILE).abs() < 1e-3);
        assert_eq!(state.strings.set_speed.as_str(), "62");
    }

    #[test]
    fn test_cluster_speed_sticky() {
        let settings = HudSettings::default();
        let mut state = DerivedHudState::new();

        let mut snapshot = alive(100.0, 10.0);
        snapshot.car.v_ego_cluster = 11.0;
        state.update(&snapshot, &settings);
        assert!((state.speed - 11.0 * MS_TO_KPH).abs() < 1e-3, "Cluster speed preferred");

        snapshot.car.v_ego_cluster = 0.0;
        state.update(&snapshot, &settings);
        assert!(state.v_ego_cluster_seen(), "Flag must survive a zero reading");
        assert_eq!(state.speed, 0.0, "Cluster keeps priority even when it reads zero");
    }

    #[test]
    fn test_wheel_speed_override() {
        let settings = HudSettings { use_wheel_speed: true, ..HudSettings::default() };
        let mut snapshot = alive(100.0, 10.0);
        snapshot.car.v_ego_cluster = 11.0;
        let state = updated(&snapshot, &settings);
        assert!((state.speed - 36.0).abs() < 1e-3);
    }

    #[test]
    fn test_negative_speed_clamped() {
        let state = updated(&alive(100.0, -2.0), &HudSettings::default());
        assert_eq!(state.speed, 0.0);
    }

    #[test]
    fn test_nav_limit_and_sign_family() {
        let snapshot = TelemetrySnapshot {
            nav_alive: true,
            nav: NavInstruction { speed_limit: 25.0, speed_limit_sign: SpeedLimitSign::Vienna },
            ..alive(100.0, 0.0)
        };
        let settings = HudSettings { use_vienna_sign: false, ..HudSettings::default() };
        let state = updated(&snapshot, &settings);
        assert_eq!(state.strings.speed_limit.as_str(), "90");
        assert!(state.has_eu_speed_limit, "Live navigation decides the sign family");
        assert!(!state.has_us_speed_limit, "Never both sign families at once");
    }

    #[test]
    fn test_sign_preference_without_nav() {
        let settings = HudSettings { use_vienna_sign: true, ..HudSettings::default() };
        let state = updated(&alive(100.0, 0.0), &settings);
        assert!(state.has_eu_speed_limit);
        assert!(!state.has_us_speed_limit);
        assert_eq!(state.speed_limit, 0.0, "Dead navigation means no limit");

        let hidden = HudSettings { hide_speed_limit: true, ..settings };
        let state = updated(&alive(100.0, 0.0), &hidden);
        assert!(!state.has_eu_speed_limit && !state.has_us_speed_limit);
    }

    #[test]
    fn test_controller_limit_with_offset() {
        let snapshot = TelemetrySnapshot {
            speed_limit: SpeedLimitState { limit: 25.0, offset: 2.5, ..Default::default() },
            ..alive(100.0, 0.0)
        };
        let settings =
            HudSettings { speed_limit_controller: true, show_speed_limit_offset: true, ..HudSettings::default() };
        let state = updated(&snapshot, &settings);
        assert!((state.speed_limit - 81.0).abs() < 1e-3, "90 km/h minus 9 km/h offset");
        assert_eq!(state.strings.speed_limit_offset.as_str(), "+9");
    }

    #[test]
    fn test_overridden_limit_uses_override_speed() {
        let snapshot = TelemetrySnapshot {
            speed_limit: SpeedLimitState { limit: 25.0, overridden: true, overridden_speed: 30.0, ..Default::default() },
            ..alive(100.0, 0.0)
        };
        let settings = HudSettings { speed_limit_controller: true, ..HudSettings::default() };
        let state = updated(&snapshot, &settings);
        assert_eq!(state.strings.speed_limit.as_str(), "108");
    }

    #[test]
    fn test_curve_advisory_debounced() {
        let settings = HudSettings::default();
        let mut snapshot = alive(100.0, 20.0);
        snapshot.curve_speed = CurveSpeedState { mtsc_enabled: true, mtsc_speed: 20.0, ..Default::default() };

        let mut state = DerivedHudState::new();
        state.update(&snapshot, &settings);
        assert!(state.curve_advisory_active);
        assert!(!state.curve_advisory_visible, "First tick only records the cruise target");
        state.update(&snapshot, &settings);
        assert!(state.curve_advisory_visible, "Stable cruise target shows the advisory");

        snapshot.controls.v_cruise = 105.0;
        state.update(&snapshot, &settings);
        assert!(!state.curve_advisory_visible, "Moving cruise target hides it for a tick");
    }

    #[test]
    fn test_readout_placeholders() {
        let mut out = Readout::new();
        value_or_placeholder(&mut out, 1.0, "mph");
        assert_eq!(out.as_str(), PLACEHOLDER);
        value_or_placeholder(&mut out, 44.6, "mph");
        assert_eq!(out.as_str(), "45mph");
        offset_readout(&mut out, 0.0);
        assert_eq!(out.as_str(), PLACEHOLDER);
        offset_readout(&mut out, -5.0);
        assert_eq!(out.as_str(), "-5");
    }

    #[test]
    fn test_bottom_icons_hidden_by_alert_or_big_map() {
        let mut snapshot = alive(100.0, 0.0);
        snapshot.controls.alert_size = AlertSize::Mid;
        assert!(updated(&snapshot, &HudSettings::default()).hide_bottom_icons);

        let snapshot = TelemetrySnapshot { map_open: true, big_map: true, ..alive(100.0, 0.0) };
        assert!(updated(&snapshot, &HudSettings::default()).hide_bottom_icons);
        assert!(!updated(&alive(100.0, 0.0), &HudSettings::default()).hide_bottom_icons);
    }

    #[test]
    fn test_standstill_timer_needs_started_time() {
        let settings = HudSettings { show_standstill_timer: true, ..HudSettings::default() };
        let mut snapshot = alive(100.0, 0.0);
        snapshot.car.standstill = true;
        snapshot.started_frames = 100;
        assert!(!updated(&snapshot, &settings).standstill_timer_running, "5 s of driving is not enough");
        snapshot.started_frames = 200;
        assert!(updated(&snapshot, &settings).standstill_timer_running);
    }

    #[test]
    fn test_dm_fade_moves_each_tick() {
        let mut snapshot = alive(100.0, 0.0);
        snapshot.driver.active = false;
        let mut state = DerivedHudState::new();
        state.update(&snapshot, &HudSettings::default());
        assert!((state.dm_fade - 0.1).abs() < 1e-6);
    }
}
