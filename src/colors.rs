//! Color type and palette for the overlay.
//!
//! # Why Not `Rgb565`
//!
//! The overlay is composited on top of live video, so nearly every element
//! carries an alpha channel (translucent boxes, fading text, chevron fill that
//! ramps with closing risk). [`Color`] is a plain 8-bit RGBA value; the
//! embedded-graphics adapter converts it to the display's native format at
//! the last moment (see [`crate::canvas::DisplayCanvas`]).
//!
//! # Palette
//!
//! Helper constructors mirror the overlay's named colors and take the alpha
//! as a parameter, e.g. `black(166)` for the translucent set-speed box.
//! Status background colors are exposed through [`status_color`].

use embedded_graphics::pixelcolor::Rgb888;

use crate::telemetry::Status;

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque color from RGB components.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA components.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Color from floating point components in `[0.0, 1.0]`.
    pub fn from_rgba_f(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: unit_to_u8(r),
            g: unit_to_u8(g),
            b: unit_to_u8(b),
            a: unit_to_u8(a),
        }
    }

    /// Same color with a different alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Same color with alpha given as a fraction.
    #[inline]
    #[must_use]
    pub fn with_alpha_f(self, a: f32) -> Self {
        self.with_alpha(unit_to_u8(a))
    }

    /// Alpha as a fraction in `[0.0, 1.0]`.
    #[inline]
    pub fn alpha_f(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Color from hue/saturation/lightness/alpha, all in `[0.0, 1.0]`.
    ///
    /// Hue wraps, so `1.0` and `0.0` are the same red.
    pub fn from_hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::from_rgba_f(l, l, l, a);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Self::from_rgba_f(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
            a,
        )
    }

    /// Opaque RGB888 value with the alpha premultiplied against black.
    ///
    /// Displays without a readback path cannot blend with what is already
    /// on screen, so translucent fills darken instead.
    pub fn premultiplied(self, opacity: f32) -> Rgb888 {
        let k = self.alpha_f() * opacity.clamp(0.0, 1.0);
        Rgb888::new(
            (f32::from(self.r) * k).round() as u8,
            (f32::from(self.g) * k).round() as u8,
            (f32::from(self.b) * k).round() as u8,
        )
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[inline]
fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

// =============================================================================
// Named Colors
// =============================================================================

/// Fully transparent.
pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

/// White with the given alpha.
#[inline]
pub const fn white(alpha: u8) -> Color {
    Color::rgba(0xff, 0xff, 0xff, alpha)
}

/// Black with the given alpha.
#[inline]
pub const fn black(alpha: u8) -> Color {
    Color::rgba(0, 0, 0, alpha)
}

/// Warning red used for traffic mode, highlighted sources and pending signs.
#[inline]
pub const fn red(alpha: u8) -> Color {
    Color::rgba(201, 34, 49, alpha)
}

/// Engaged green used for the model-predicted curve advisory.
#[inline]
pub const fn green(alpha: u8) -> Color {
    Color::rgba(23, 134, 68, alpha)
}

/// Left adjacent lead marker color.
#[inline]
pub const fn blue(alpha: u8) -> Color {
    Color::rgba(0, 0, 255, alpha)
}

/// Pure red for the Vienna sign ring.
pub const SIGN_RING_RED: Color = Color::rgb(0xff, 0, 0);

/// Glow drawn behind every lead chevron.
pub const CHEVRON_GLOW: Color = Color::rgb(218, 202, 37);

// =============================================================================
// MAX Box Colors
// =============================================================================

/// MAX caption while engaged and under the first proximity stop.
pub const MAX_DEFAULT: Color = Color::rgb(0x80, 0xd8, 0xa6);
/// MAX caption at the second proximity stop (limit + 15).
pub const MAX_WARN: Color = Color::rgb(0xff, 0xe4, 0xbf);
/// MAX caption at the third proximity stop (limit + 25).
pub const MAX_OVER: Color = Color::rgb(0xff, 0xbf, 0xbf);

/// Set-speed digits while engaged and under the first proximity stop.
pub const SET_SPEED_DEFAULT: Color = Color::rgb(0xff, 0xff, 0xff);
/// Set-speed digits at the second proximity stop.
pub const SET_SPEED_WARN: Color = Color::rgb(0xff, 0x95, 0x00);
/// Set-speed digits at the third proximity stop.
pub const SET_SPEED_OVER: Color = Color::rgb(0xff, 0x00, 0x00);

/// MAX caption while the driver overrides.
pub const MAX_OVERRIDE: Color = Color::rgb(0x91, 0x9b, 0x95);
/// MAX caption when no cruise target is set.
pub const MAX_UNSET: Color = Color::rgb(0xa6, 0xa6, 0xa6);
/// Placeholder digits when no cruise target is set.
pub const SET_SPEED_UNSET: Color = Color::rgb(0x72, 0x72, 0x72);

// =============================================================================
// Current Speed Tints
// =============================================================================

/// Speed digits while the longitudinal controller is stopping.
pub const STOPPING_SPEED: Color = Color::rgba(0xde, 0x98, 0x00, 255);
/// Unit label while the longitudinal controller is stopping.
pub const STOPPING_UNIT: Color = Color::rgba(0xde, 0x98, 0x00, 200);
/// Speed digits while the brake lights are on.
pub const BRAKING_SPEED: Color = Color::rgba(0xde, 0x00, 0x00, 255);
/// Unit label while the brake lights are on.
pub const BRAKING_UNIT: Color = Color::rgba(0xde, 0x00, 0x00, 200);

// =============================================================================
// Status Colors
// =============================================================================

/// Background color associated with an engagement status.
///
/// These drive the path edges and the standstill color ramp.
pub const fn status_color(status: Status) -> Color {
    match status {
        Status::Disengaged => Color::rgba(0x17, 0x33, 0x49, 0xc8),
        Status::Override => Color::rgba(0x91, 0x9b, 0x95, 0xf1),
        Status::Engaged => Color::rgba(0x17, 0x86, 0x44, 0xf1),
        Status::AlwaysOnLateralActive => Color::rgba(0x0a, 0xba, 0xb5, 0xf1),
        Status::ConditionalOverridden => Color::rgba(0xff, 0xff, 0x00, 0xf1),
        Status::ExperimentalModeActive => Color::rgba(0xda, 0x6f, 0x25, 0xf1),
        Status::NavigationActive => Color::rgba(0x31, 0xa1, 0xee, 0xf1),
        Status::TrafficModeActive => Color::rgba(0xc9, 0x22, 0x31, 0xf1),
    }
}
