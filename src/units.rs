//! Unit systems and display conversions.
//!
//! Telemetry arrives in SI units (m/s, m, m/s²). Every readout on the overlay
//! is converted once per tick into the driver's chosen unit system, and the
//! resulting factors are kept in [`UnitConversions`] so widgets never pick a
//! factor on their own.

/// Metres per second to kilometres per hour.
pub const MS_TO_KPH: f32 = 3.6;

/// Metres per second to miles per hour.
pub const MS_TO_MPH: f32 = 2.236_936;

/// Kilometres to miles.
pub const KM_TO_MILE: f32 = 0.621_371;

/// Metres to feet.
pub const METER_TO_FOOT: f32 = 3.280_84;

/// Unit system selected by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Build from the "is metric" toggle.
    #[inline]
    pub const fn from_metric_flag(is_metric: bool) -> Self {
        if is_metric { Self::Metric } else { Self::Imperial }
    }

    #[inline]
    pub const fn is_metric(self) -> bool {
        matches!(self, Self::Metric)
    }

    /// Factor from m/s to the display speed unit.
    #[inline]
    pub const fn speed_factor(self) -> f32 {
        match self {
            Self::Metric => MS_TO_KPH,
            Self::Imperial => MS_TO_MPH,
        }
    }

    /// Display label for the speed unit.
    #[inline]
    pub const fn speed_unit(self) -> &'static str {
        match self {
            Self::Metric => "km/h",
            Self::Imperial => "mph",
        }
    }

    /// Convert a speed in m/s to the display unit.
    #[inline]
    pub fn speed_from_ms(self, ms: f32) -> f32 {
        ms * self.speed_factor()
    }

    /// Convert a display-unit speed back to m/s.
    #[inline]
    pub fn speed_to_ms(self, display: f32) -> f32 {
        display / self.speed_factor()
    }

    /// Convert a cruise target that the controls stack reports in km/h.
    #[inline]
    pub fn cruise_from_kph(self, kph: f32) -> f32 {
        match self {
            Self::Metric => kph,
            Self::Imperial => kph * KM_TO_MILE,
        }
    }

    /// Inverse of [`Self::cruise_from_kph`].
    #[inline]
    pub fn cruise_to_kph(self, display: f32) -> f32 {
        match self {
            Self::Metric => display,
            Self::Imperial => display / KM_TO_MILE,
        }
    }
}

/// Per-quantity conversion factors and labels for secondary readouts.
///
/// The SI toggle only affects the lead-metrics readouts; the main speed
/// readout always follows [`UnitSystem`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitConversions {
    pub acceleration: f32,
    pub distance: f32,
    pub speed: f32,
    pub lead_speed: f32,
    pub acceleration_unit: &'static str,
    pub lead_speed_unit: &'static str,
    distance_unit_short: &'static str,
    distance_unit_long: &'static str,
}

impl UnitConversions {
    /// Conversions for a unit system, optionally forcing SI lead metrics.
    pub const fn new(units: UnitSystem, use_si: bool) -> Self {
        if units.is_metric() || use_si {
            Self {
                acceleration: 1.0,
                distance: 1.0,
                speed: units.speed_factor(),
                lead_speed: if use_si { 1.0 } else { MS_TO_KPH },
                acceleration_unit: "m/s²",
                lead_speed_unit: if use_si { "m/s" } else { "kph" },
                distance_unit_short: "m",
                distance_unit_long: "meters",
            }
        } else {
            Self {
                acceleration: METER_TO_FOOT,
                distance: METER_TO_FOOT,
                speed: MS_TO_MPH,
                lead_speed: MS_TO_MPH,
                acceleration_unit: "ft/s²",
                lead_speed_unit: "mph",
                distance_unit_short: "ft",
                distance_unit_long: "feet",
            }
        }
    }

    /// Distance label; the map view uses the short form to save space.
    #[inline]
    pub const fn distance_unit(&self, map_open: bool) -> &'static str {
        if map_open { self.distance_unit_short } else { self.distance_unit_long }
    }
}

impl Default for UnitConversions {
    fn default() -> Self {
        Self::new(UnitSystem::Metric, false)
    }
}
