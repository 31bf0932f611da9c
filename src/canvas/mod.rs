//! Abstract 2-D drawing surface the overlay renders into.
//!
//! The composer never talks to a graphics library directly. It issues calls
//! against [`Canvas`], which covers exactly what the overlay needs: rounded
//! rectangles with per-corner radii, ellipses, polygons and compound paths,
//! elliptical arcs, aligned text with metrics, external sprites, and a global
//! opacity.
//!
//! Two implementations ship with the crate:
//! - [`RecordingCanvas`] captures every call with the opacity in force, for
//!   tests and for replaying a frame elsewhere.
//! - [`DisplayCanvas`] rasterizes onto any embedded-graphics `DrawTarget`.
//!
//! # Coordinates
//!
//! Floating point pixels, origin at the top left, y down. Arc angles are in
//! degrees with 0 at three o'clock and positive values turning
//! counter-clockwise on screen.

mod display;
mod recording;

pub use display::DisplayCanvas;
pub use recording::{DrawCommand, RecordingCanvas};

use core::ops::{Add, Sub};

use heapless::Vec;

use crate::{colors::Color, telemetry::SpeedLimitSource};

/// Maximum color stops in one gradient.
pub const MAX_GRADIENT_STOPS: usize = 64;

// =============================================================================
// Geometry
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for PointF {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointF {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SizeF {
    pub width: f32,
    pub height: f32,
}

impl SizeF {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn from_origin(origin: PointF, size: SizeF) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Rectangle of `size` centered on `center`.
    #[inline]
    pub fn centered_at(center: PointF, size: SizeF) -> Self {
        Self::new(center.x - size.width / 2.0, center.y - size.height / 2.0, size.width, size.height)
    }

    #[inline]
    pub const fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> PointF {
        PointF::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub const fn size(&self) -> SizeF {
        SizeF::new(self.width, self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Move each edge by the given amount (positive moves right/down).
    #[must_use]
    pub fn adjusted(&self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(self.x + left, self.y + top, self.width - left + right, self.height - top + bottom)
    }

    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shrink by `inset` on every side.
    #[must_use]
    pub fn inset(&self, inset: f32) -> Self {
        self.adjusted(inset, inset, -inset, -inset)
    }

    /// Same rect with its bottom edge moved to `bottom`, keeping the height.
    #[must_use]
    pub fn with_bottom(&self, bottom: f32) -> Self {
        Self::new(self.x, bottom - self.height, self.width, self.height)
    }
}

// =============================================================================
// Styles
// =============================================================================

/// Vertical linear gradient. Stop position 0 is at `start_y`, 1 at `end_y`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct VerticalGradient {
    pub start_y: f32,
    pub end_y: f32,
    stops: Vec<(f32, Color), MAX_GRADIENT_STOPS>,
}

impl VerticalGradient {
    pub const fn new(start_y: f32, end_y: f32) -> Self {
        Self { start_y, end_y, stops: Vec::new() }
    }

    /// Gradient spanning the full height of a canvas, bottom to top.
    pub const fn full_height(height: f32) -> Self {
        Self::new(height, 0.0)
    }

    /// Set the color at `position`, replacing an existing stop at the same
    /// position. Positions outside `[0, 1]` are clamped. Stops past capacity
    /// are dropped.
    pub fn set_color_at(&mut self, position: f32, color: Color) {
        let position = position.clamp(0.0, 1.0);
        match self.stops.iter().position(|(p, _)| *p >= position) {
            Some(i) if (self.stops[i].0 - position).abs() <= f32::EPSILON => self.stops[i].1 = color,
            Some(i) => {
                self.stops.insert(i, (position, color)).ok();
            }
            None => {
                self.stops.push((position, color)).ok();
            }
        }
    }

    #[must_use]
    pub fn with_stop(mut self, position: f32, color: Color) -> Self {
        self.set_color_at(position, color);
        self
    }

    pub fn stops(&self) -> &[(f32, Color)] {
        &self.stops
    }

    /// Interpolated color at gradient position `t`.
    pub fn color_at(&self, t: f32) -> Color {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return crate::colors::TRANSPARENT;
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let ((p0, c0), (p1, c1)) = (pair[0], pair[1]);
            if t <= p1 {
                let span = p1 - p0;
                let k = if span > 0.0 { (t - p0) / span } else { 1.0 };
                return crate::animations::lerp_color(c0, c1, k);
            }
        }
        last.1
    }

    /// Color at a screen y coordinate.
    pub fn color_at_y(&self, y: f32) -> Color {
        let span = self.end_y - self.start_y;
        if span.abs() <= f32::EPSILON {
            return self.color_at(0.0);
        }
        self.color_at((y - self.start_y) / span)
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Fill {
    #[default]
    None,
    Solid(Color),
    Gradient(VerticalGradient),
}

/// Pen used for outlines, polylines and arcs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub round_cap: bool,
}

impl Stroke {
    #[inline]
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width, round_cap: false }
    }

    #[inline]
    pub const fn round(color: Color, width: f32) -> Self {
        Self { color, width, round_cap: true }
    }
}

/// Fill plus optional outline for closed shapes.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ShapeStyle {
    pub fill: Fill,
    pub stroke: Option<Stroke>,
}

impl ShapeStyle {
    pub const fn filled(color: Color) -> Self {
        Self { fill: Fill::Solid(color), stroke: None }
    }

    pub const fn outlined(stroke: Stroke) -> Self {
        Self { fill: Fill::None, stroke: Some(stroke) }
    }

    pub const fn filled_outlined(color: Color, stroke: Stroke) -> Self {
        Self { fill: Fill::Solid(color), stroke: Some(stroke) }
    }

    pub const fn gradient(gradient: VerticalGradient) -> Self {
        Self { fill: Fill::Gradient(gradient), stroke: None }
    }
}

/// Per-corner radii of a rounded rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub const fn uniform(r: f32) -> Self {
        Self { top_left: r, top_right: r, bottom_right: r, bottom_left: r }
    }

    pub const fn top_bottom(top: f32, bottom: f32) -> Self {
        Self { top_left: top, top_right: top, bottom_right: bottom, bottom_left: bottom }
    }
}

// =============================================================================
// Text
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    DemiBold,
    Bold,
}

/// Requested font: pixel size and weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub weight: FontWeight,
}

impl FontSpec {
    pub const fn normal(size: f32) -> Self {
        Self { size, weight: FontWeight::Normal }
    }

    pub const fn demi_bold(size: f32) -> Self {
        Self { size, weight: FontWeight::DemiBold }
    }

    pub const fn bold(size: f32) -> Self {
        Self { size, weight: FontWeight::Bold }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
    /// Text baseline sits on the bottom edge of the rect.
    Baseline,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontSpec,
    pub color: Color,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

impl TextStyle {
    /// Centered both ways inside the rect.
    pub const fn centered(font: FontSpec, color: Color) -> Self {
        Self { font, color, h_align: HAlign::Center, v_align: VAlign::Center }
    }

    /// Horizontally centered, sitting on the rect's bottom edge.
    pub const fn baseline(font: FontSpec, color: Color) -> Self {
        Self { font, color, h_align: HAlign::Center, v_align: VAlign::Baseline }
    }

    /// Left aligned, vertically centered.
    pub const fn left(font: FontSpec, color: Color) -> Self {
        Self { font, color, h_align: HAlign::Left, v_align: VAlign::Center }
    }

    /// Horizontally centered, hanging from the rect's top edge.
    pub const fn top(font: FontSpec, color: Color) -> Self {
        Self { font, color, h_align: HAlign::Center, v_align: VAlign::Top }
    }
}

// =============================================================================
// Sprites
// =============================================================================

/// External image assets. Loading them is the host's job; the overlay only
/// decides which one goes where.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sprite {
    TurnSignal { frame: usize, left: bool },
    BlindSpot { left: bool },
    SourceIcon(SpeedLimitSource),
    CurveSpeed { left: bool },
    StopSign,
    DriverFace,
}

// =============================================================================
// Canvas Capability
// =============================================================================

/// Drawing surface. All calls are infallible; a surface that cannot draw a
/// shape skips it.
pub trait Canvas {
    fn size(&self) -> SizeF;

    /// Global opacity applied to every following call.
    fn set_opacity(&mut self, opacity: f32);

    fn opacity(&self) -> f32;

    /// Rendered size of `text` in `font`.
    fn text_size(&self, font: FontSpec, text: &str) -> SizeF;

    fn fill_rect(&mut self, rect: RectF, fill: &Fill);

    fn rounded_rect(&mut self, rect: RectF, radii: CornerRadii, style: &ShapeStyle);

    fn ellipse(&mut self, rect: RectF, style: &ShapeStyle);

    fn polygon(&mut self, points: &[PointF], style: &ShapeStyle);

    fn polyline(&mut self, points: &[PointF], stroke: &Stroke);

    /// Compound path filled with the even-odd rule.
    fn path(&mut self, polygons: &[&[PointF]], style: &ShapeStyle);

    /// Elliptical arc inscribed in `rect`.
    fn arc(&mut self, rect: RectF, start_deg: f32, span_deg: f32, stroke: &Stroke);

    fn text(&mut self, rect: RectF, text: &str, style: &TextStyle);

    fn sprite(&mut self, sprite: Sprite, rect: RectF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{black, white};

    #[test]
    fn test_adjusted_moves_edges() {
        let r = RectF::new(60.0, 45.0, 200.0, 402.0);
        let sign = r.adjusted(12.0, 204.0, -12.0, -12.0);
        assert_eq!(sign, RectF::new(72.0, 249.0, 176.0, 186.0), "Sign rect inside the set-speed box");
    }

    #[test]
    fn test_rect_edges() {
        let r = RectF::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), PointF::new(25.0, 40.0));
        assert_eq!(r.with_bottom(100.0).y, 60.0);
    }

    #[test]
    fn test_gradient_stop_replaced_at_same_position() {
        let mut g = VerticalGradient::full_height(100.0);
        g.set_color_at(0.5, white(255));
        g.set_color_at(0.0, black(255));
        g.set_color_at(0.5, black(10));
        assert_eq!(g.stops().len(), 2, "Same position replaces the stop");
        assert_eq!(g.stops()[0].0, 0.0, "Stops stay sorted");
        assert_eq!(g.stops()[1].1, black(10));
    }

    #[test]
    fn test_gradient_color_at_y() {
        let g = VerticalGradient::full_height(100.0).with_stop(0.0, black(255)).with_stop(1.0, white(255));
        assert_eq!(g.color_at_y(100.0), black(255), "Bottom of the screen is position 0");
        assert_eq!(g.color_at_y(0.0), white(255), "Top of the screen is position 1");
        let mid = g.color_at_y(50.0);
        assert!(mid.r > 100 && mid.r < 155, "Midpoint is blended, got {}", mid.r);
    }

    #[test]
    fn test_empty_gradient_is_transparent() {
        assert_eq!(VerticalGradient::new(0.0, 1.0).color_at(0.3).a, 0);
    }
}
