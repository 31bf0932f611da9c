//! Turn-signal sprite animation.
//!
//! A theme is a set of sprite frames plus a descriptor `"<style>_<period_ms>"`
//! naming how the frames move across the screen and how long each frame
//! shows. Loading the frames is the host's job; the overlay only needs the
//! frame count and sprite size.
//!
//! # Styles
//!
//! | Style            | Placement                                               |
//! |------------------|---------------------------------------------------------|
//! | `static`         | fixed pair either side of the screen center, near top   |
//! | `traditional`    | bottom edge, frames tile outward from the signal side   |
//! | `traditional_gif`| bottom edge, one sprite scrolls across the whole width  |
//!
//! A `traditional` theme made from an animated GIF is promoted to
//! `traditional_gif`, since GIF frames are full animations rather than tiles.
//!
//! # Blind Spot
//!
//! With a vehicle in the blind spot on the signalled side, the blind-spot
//! sprite replaces the animation frame. Static themes keep the signal
//! position; the sweeping styles pin it to the signalled edge.

use core::str::FromStr;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{
    canvas::{Canvas, RectF, SizeF, Sprite},
    error::ThemeError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalStyle {
    Static,
    Traditional,
    TraditionalGif,
}

impl FromStr for SignalStyle {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Self::Static),
            "traditional" => Ok(Self::Traditional),
            "traditional_gif" => Ok(Self::TraditionalGif),
            other => Err(ThemeError::UnknownStyle(other.to_owned())),
        }
    }
}

/// An installed turn-signal theme.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalTheme {
    pub style: SignalStyle,
    /// How long each frame shows.
    pub period: Duration,
    /// Frames per side.
    pub frame_count: usize,
    pub sprite_size: SizeF,
    /// The theme ships a blind-spot sprite pair.
    pub has_blindspot: bool,
}

impl SignalTheme {
    /// Build a theme from its descriptor and the frames the host loaded.
    pub fn from_descriptor(
        descriptor: &str,
        frame_count: usize,
        sprite_size: SizeF,
        is_gif: bool,
        has_blindspot: bool,
    ) -> Result<Self, ThemeError> {
        let (style, period) =
            descriptor.rsplit_once('_').ok_or_else(|| ThemeError::MissingPeriod(descriptor.to_owned()))?;
        let period_ms: u64 = period.parse().map_err(|_| ThemeError::InvalidPeriod(descriptor.to_owned()))?;
        if period_ms == 0 {
            return Err(ThemeError::InvalidPeriod(descriptor.to_owned()));
        }

        let mut style: SignalStyle = style.parse()?;
        if is_gif && style == SignalStyle::Traditional {
            style = SignalStyle::TraditionalGif;
        }

        Ok(Self { style, period: Duration::from_millis(period_ms), frame_count, sprite_size, has_blindspot })
    }

    /// A theme without frames never animates.
    #[inline]
    pub const fn is_animated(&self) -> bool {
        self.frame_count > 0
    }

    /// Horizontal travel per frame for scrolling themes on a screen `width` wide.
    pub fn movement(&self, width: f32) -> f32 {
        if self.style != SignalStyle::TraditionalGif || self.frame_count == 0 {
            return 0.0;
        }
        (width + self.sprite_size.width * 2.0) / self.frame_count as f32
    }
}

// =============================================================================
// Animator
// =============================================================================

/// Advances the frame index once per theme period while a signal plays.
///
/// The frame index survives a stop, so the next blink resumes where the
/// last one left off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnSignalAnimator {
    frame: usize,
    started: Option<Instant>,
    steps_applied: u64,
}

impl TurnSignalAnimator {
    pub const fn new() -> Self {
        Self { frame: 0, started: None, steps_applied: 0 }
    }

    #[inline]
    pub const fn frame(&self) -> usize {
        self.frame
    }

    #[inline]
    pub const fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Run or stop the animation for this tick.
    pub fn update(&mut self, theme: &SignalTheme, running: bool, now: Instant) {
        if !running || !theme.is_animated() {
            if self.started.take().is_some() {
                debug!(frame = self.frame, "turn signal animation stopped");
            }
            return;
        }

        let Some(started) = self.started else {
            debug!(style = ?theme.style, "turn signal animation started");
            self.started = Some(now);
            self.steps_applied = 0;
            return;
        };

        let period = theme.period.as_millis().max(1);
        let steps = (now.saturating_duration_since(started).as_millis() / period) as u64;
        let pending = steps.saturating_sub(self.steps_applied);
        if pending > 0 {
            self.frame = ((self.frame as u64 + pending) % theme.frame_count as u64) as usize;
            self.steps_applied = steps;
        }
    }
}

/// Whether the signal animation plays this tick.
///
/// Static themes step aside while a map is open or the standstill timer is
/// counting, since they share the top of the screen with the map and the
/// standstill readout.
pub fn should_animate(
    theme: &SignalTheme,
    signal_active: bool,
    big_map_open: bool,
    map_open: bool,
    standstill_counting: bool,
) -> bool {
    theme.is_animated()
        && signal_active
        && !big_map_open
        && ((!map_open && !standstill_counting) || theme.style != SignalStyle::Static)
}

/// Inputs to [`signal_placement`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalLayout {
    pub screen: SizeF,
    pub frame: usize,
    pub left: bool,
    pub blindspot: bool,
    pub alert_height: f32,
    pub status_bar_height: f32,
}

/// Sprite and destination rect for the current frame.
pub fn signal_placement(theme: &SignalTheme, layout: &SignalLayout) -> (Sprite, RectF) {
    let SizeF { width: w, height: h } = theme.sprite_size;
    let screen = layout.screen;
    let frame = layout.frame as f32;
    let left = layout.left;
    let bottom_y = screen.height - h - layout.alert_height.max(layout.status_bar_height);

    let (x, y) = match theme.style {
        SignalStyle::Static => {
            let center = screen.width / 2.0;
            (if left { center * 0.75 - w } else { center * 1.25 }, h / 2.0)
        }
        SignalStyle::Traditional => (if left { screen.width - (frame + 1.0) * w } else { frame * w }, bottom_y),
        SignalStyle::TraditionalGif => {
            let step = theme.movement(screen.width);
            (if left { screen.width - frame * step + w } else { frame * step - w }, bottom_y)
        }
    };

    if layout.blindspot && theme.has_blindspot {
        let x = match theme.style {
            SignalStyle::Static => x,
            _ if left => screen.width - w,
            _ => 0.0,
        };
        return (Sprite::BlindSpot { left }, RectF::new(x, y, w, h));
    }

    (Sprite::TurnSignal { frame: layout.frame, left }, RectF::new(x, y, w, h))
}

/// Draw the current signal frame.
pub fn draw_turn_signal(canvas: &mut impl Canvas, theme: &SignalTheme, layout: &SignalLayout) {
    let (sprite, rect) = signal_placement(theme, layout);
    canvas.set_opacity(1.0);
    canvas.sprite(sprite, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: SizeF = SizeF::new(2160.0, 1080.0);

    fn theme(style: SignalStyle) -> SignalTheme {
        SignalTheme {
            style,
            period: Duration::from_millis(100),
            frame_count: 4,
            sprite_size: SizeF::new(360.0, 480.0),
            has_blindspot: true,
        }
    }

    fn layout(left: bool, frame: usize) -> SignalLayout {
        SignalLayout { screen: SCREEN, frame, left, blindspot: false, alert_height: 0.0, status_bar_height: 0.0 }
    }

    #[test]
    fn test_descriptor_parsing() {
        let t = SignalTheme::from_descriptor("traditional_150", 6, SizeF::new(10.0, 10.0), false, false).unwrap();
        assert_eq!(t.style, SignalStyle::Traditional);
        assert_eq!(t.period, Duration::from_millis(150));

        let gif = SignalTheme::from_descriptor("traditional_150", 6, SizeF::new(10.0, 10.0), true, false).unwrap();
        assert_eq!(gif.style, SignalStyle::TraditionalGif, "GIF themes scroll instead of tiling");
    }

    #[test]
    fn test_bad_descriptors_rejected() {
        let size = SizeF::new(1.0, 1.0);
        assert_eq!(
            SignalTheme::from_descriptor("static", 1, size, false, false),
            Err(ThemeError::MissingPeriod("static".into()))
        );
        assert_eq!(
            SignalTheme::from_descriptor("static_abc", 1, size, false, false),
            Err(ThemeError::InvalidPeriod("static_abc".into()))
        );
        assert_eq!(
            SignalTheme::from_descriptor("static_0", 1, size, false, false),
            Err(ThemeError::InvalidPeriod("static_0".into()))
        );
        assert_eq!(
            SignalTheme::from_descriptor("wavy_100", 1, size, false, false),
            Err(ThemeError::UnknownStyle("wavy".into()))
        );
    }

    #[test]
    fn test_animator_advances_per_period_and_wraps() {
        let t = theme(SignalStyle::Traditional);
        let t0 = Instant::now();
        let mut a = TurnSignalAnimator::new();
        a.update(&t, true, t0);
        assert_eq!(a.frame(), 0);
        a.update(&t, true, t0 + Duration::from_millis(250));
        assert_eq!(a.frame(), 2, "Two full periods elapsed");
        a.update(&t, true, t0 + Duration::from_millis(500));
        assert_eq!(a.frame(), 1, "Frame index wraps modulo the frame count");
    }

    #[test]
    fn test_animator_resumes_frame_after_stop() {
        let t = theme(SignalStyle::Traditional);
        let t0 = Instant::now();
        let mut a = TurnSignalAnimator::new();
        a.update(&t, true, t0);
        a.update(&t, true, t0 + Duration::from_millis(100));
        a.update(&t, false, t0 + Duration::from_millis(150));
        assert!(!a.is_running());
        a.update(&t, true, t0 + Duration::from_millis(10_000));
        assert_eq!(a.frame(), 1, "Restart keeps the last frame");
    }

    #[test]
    fn test_zero_frame_theme_never_animates() {
        let t = SignalTheme { frame_count: 0, ..theme(SignalStyle::Static) };
        let t0 = Instant::now();
        let mut a = TurnSignalAnimator::new();
        a.update(&t, true, t0);
        a.update(&t, true, t0 + Duration::from_secs(1));
        assert_eq!(a.frame(), 0);
        assert!(!should_animate(&t, true, false, false, false));
    }

    #[test]
    fn test_static_theme_yields_to_map_and_standstill() {
        let t = theme(SignalStyle::Static);
        assert!(should_animate(&t, true, false, false, false));
        assert!(!should_animate(&t, true, false, true, false), "Map open hides static signals");
        assert!(!should_animate(&t, true, false, false, true), "A counting standstill timer hides static signals");
        assert!(should_animate(&theme(SignalStyle::Traditional), true, false, true, true));
        assert!(!should_animate(&theme(SignalStyle::Traditional), true, true, false, false));
    }

    #[test]
    fn test_traditional_tiles_from_signal_side() {
        let t = theme(SignalStyle::Traditional);
        let (_, left) = signal_placement(&t, &layout(true, 1));
        assert_eq!(left.x, 2160.0 - 720.0);
        assert_eq!(left.y, 1080.0 - 480.0);
        let (sprite, right) = signal_placement(&t, &layout(false, 1));
        assert_eq!(right.x, 360.0);
        assert_eq!(sprite, Sprite::TurnSignal { frame: 1, left: false });
    }

    #[test]
    fn test_bottom_styles_clear_alert_or_status_bar() {
        let t = theme(SignalStyle::Traditional);
        let l = SignalLayout { alert_height: 271.0, status_bar_height: 50.0, ..layout(true, 0) };
        assert_eq!(signal_placement(&t, &l).1.y, 1080.0 - 480.0 - 271.0);
    }

    #[test]
    fn test_static_pair_around_center() {
        let t = theme(SignalStyle::Static);
        assert_eq!(signal_placement(&t, &layout(true, 0)).1, RectF::new(810.0 - 360.0, 240.0, 360.0, 480.0));
        assert_eq!(signal_placement(&t, &layout(false, 0)).1.x, 1350.0);
    }

    #[test]
    fn test_gif_scrolls_across_width() {
        let t = theme(SignalStyle::TraditionalGif);
        let step = (2160.0 + 720.0) / 4.0;
        assert_eq!(signal_placement(&t, &layout(false, 2)).1.x, 2.0 * step - 360.0);
        assert_eq!(signal_placement(&t, &layout(true, 2)).1.x, 2160.0 - 2.0 * step + 360.0);
    }

    #[test]
    fn test_blindspot_substitutes_sprite() {
        let t = theme(SignalStyle::Traditional);
        let l = SignalLayout { blindspot: true, ..layout(true, 3) };
        let (sprite, rect) = signal_placement(&t, &l);
        assert_eq!(sprite, Sprite::BlindSpot { left: true });
        assert_eq!(rect.x, 2160.0 - 360.0, "Pinned to the signalled edge");

        let st = theme(SignalStyle::Static);
        let (_, static_rect) = signal_placement(&st, &SignalLayout { blindspot: true, ..layout(true, 0) });
        assert_eq!(static_rect, signal_placement(&st, &layout(true, 0)).1, "Static keeps its position");

        let bare = SignalTheme { has_blindspot: false, ..t };
        assert!(matches!(signal_placement(&bare, &l).0, Sprite::TurnSignal { .. }));
    }
}
