//! embedded-graphics adapter for the [`Canvas`] capability.
//!
//! # Optimization: Scanline Polygons
//!
//! embedded-graphics has no general polygon primitive. Lane and path
//! polygons are long concave strips, so a triangle fan would fill the wrong
//! area. Polygons and compound paths are instead filled with an even-odd
//! scanline pass that emits one 1px-high `Rectangle` per span. Gradients fall
//! out of the same pass: each scanline samples the gradient once.
//!
//! Scanlines are clipped to the target's bounding box before any work is
//! done, so off-screen geometry from the calibration layer costs nothing.
//!
//! # Alpha
//!
//! Targets are write-only, so alpha cannot blend with the video underneath.
//! Colors are premultiplied against black instead (see
//! [`Color::premultiplied`]); fully transparent calls are skipped.
//!
//! # Fonts
//!
//! Requested point sizes map onto the nearest ProFont face. Weight is
//! ignored; ProFont has a single weight. The faces only carry ASCII, so
//! text is transliterated first: dashes become `-`, `²` becomes `^2` and
//! anything else unknown becomes `?`.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{
        CornerRadii as EgCornerRadii, Ellipse, Polyline, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle,
        RoundedRectangle, StrokeAlignment,
    },
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use heapless::{String, Vec};
use profont::{PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT};

use super::{
    Canvas, CornerRadii, Fill, FontSpec, HAlign, PointF, RectF, ShapeStyle, SizeF, Sprite, Stroke, TextStyle,
    VAlign,
};
use crate::{
    colors::{Color, white},
    telemetry::MAX_POLYGON_POINTS,
};

/// Segments used to approximate an elliptical arc.
const ARC_SEGMENTS: usize = 32;

/// Maximum edge crossings on one scanline.
const MAX_CROSSINGS: usize = 2 * MAX_POLYGON_POINTS;

/// Longest text drawn in one call; the rest is cut.
const MAX_TEXT_LEN: usize = 96;

type AsciiText = String<MAX_TEXT_LEN>;

/// `text` restricted to glyphs the mono fonts carry.
fn ascii_glyphs(text: &str) -> AsciiText {
    let mut out = AsciiText::new();
    for c in text.chars() {
        let pushed = match c {
            c if c.is_ascii() => out.push(c),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{b2}' => out.push_str("^2"),
            _ => out.push('?'),
        };
        if pushed.is_err() {
            break;
        }
    }
    out
}

/// Canvas that draws onto an embedded-graphics target.
pub struct DisplayCanvas<'a, D> {
    target: &'a mut D,
    opacity: f32,
}

impl<'a, D> DisplayCanvas<'a, D> {
    pub const fn new(target: &'a mut D) -> Self {
        Self { target, opacity: 1.0 }
    }
}

impl<D, C> DisplayCanvas<'_, D>
where
    D: DrawTarget<Color = C>,
    C: PixelColor + From<Rgb888>,
{
    /// Native color for `color` at the current opacity, or `None` if invisible.
    fn native(&self, color: Color) -> Option<C> {
        if color.a == 0 || self.opacity <= 0.0 {
            return None;
        }
        Some(C::from(color.premultiplied(self.opacity)))
    }

    fn fill_color(&self, fill: &Fill, rect: RectF) -> Option<C> {
        match fill {
            Fill::None => None,
            Fill::Solid(color) => self.native(*color),
            Fill::Gradient(gradient) => self.native(gradient.color_at_y(rect.center().y)),
        }
    }

    fn primitive_style(&self, style: &ShapeStyle, rect: RectF) -> Option<PrimitiveStyle<C>> {
        let fill = self.fill_color(&style.fill, rect);
        let stroke = style.stroke.and_then(|s| self.native(s.color).map(|c| (c, s.width)));
        if fill.is_none() && stroke.is_none() {
            return None;
        }

        let mut builder = PrimitiveStyleBuilder::new().stroke_alignment(StrokeAlignment::Center);
        if let Some(c) = fill {
            builder = builder.fill_color(c);
        }
        if let Some((c, width)) = stroke {
            builder = builder.stroke_color(c).stroke_width(stroke_px(width));
        }
        Some(builder.build())
    }

    /// Even-odd scanline fill over one or more closed polygons.
    fn fill_polygons(&mut self, polygons: &[&[PointF]], fill: &Fill) {
        let bounds = self.target.bounding_box();
        let Some(bottom_right) = bounds.bottom_right() else {
            return;
        };

        let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
        for p in polygons.iter().flat_map(|poly| poly.iter()) {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        if min_y > max_y {
            return;
        }

        let y_start = (min_y.floor() as i32).max(bounds.top_left.y);
        let y_end = (max_y.ceil() as i32).min(bottom_right.y);
        let x_min = bounds.top_left.x;
        let x_max = bottom_right.x;

        for y in y_start..=y_end {
            let color = match fill {
                Fill::None => return,
                Fill::Solid(color) => self.native(*color),
                Fill::Gradient(gradient) => self.native(gradient.color_at_y(y as f32 + 0.5)),
            };
            let Some(color) = color else {
                continue;
            };

            let crossings = scanline_crossings(polygons, y as f32 + 0.5);
            for span in crossings.chunks_exact(2) {
                let x0 = (span[0].round() as i32).max(x_min);
                let x1 = (span[1].round() as i32).min(x_max + 1);
                if x1 <= x0 {
                    continue;
                }
                Rectangle::new(Point::new(x0, y), Size::new((x1 - x0) as u32, 1))
                    .into_styled(PrimitiveStyle::with_fill(color))
                    .draw(self.target)
                    .ok();
            }
        }
    }

    fn draw_polyline(&mut self, points: &[PointF], closed: bool, stroke: &Stroke) {
        let Some(color) = self.native(stroke.color) else {
            return;
        };
        let mut pts: Vec<Point, { MAX_POLYGON_POINTS + 1 }> = Vec::new();
        for p in points {
            pts.push(to_point(*p)).ok();
        }
        if closed && let Some(first) = pts.first().copied() {
            pts.push(first).ok();
        }
        if pts.len() < 2 {
            return;
        }
        Polyline::new(&pts)
            .into_styled(PrimitiveStyle::with_stroke(color, stroke_px(stroke.width)))
            .draw(self.target)
            .ok();
    }
}

impl<D, C> Canvas for DisplayCanvas<'_, D>
where
    D: DrawTarget<Color = C>,
    C: PixelColor + From<Rgb888>,
{
    fn size(&self) -> SizeF {
        let size = self.target.bounding_box().size;
        SizeF::new(size.width as f32, size.height as f32)
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn text_size(&self, font: FontSpec, text: &str) -> SizeF {
        let face = mono_font_for(font);
        let advance = face.character_size.width + face.character_spacing;
        let chars = ascii_glyphs(text).len() as u32;
        SizeF::new((chars * advance) as f32, face.character_size.height as f32)
    }

    fn fill_rect(&mut self, rect: RectF, fill: &Fill) {
        let corners = [
            PointF::new(rect.left(), rect.top()),
            PointF::new(rect.right(), rect.top()),
            PointF::new(rect.right(), rect.bottom()),
            PointF::new(rect.left(), rect.bottom()),
        ];
        self.fill_polygons(&[&corners], fill);
    }

    fn rounded_rect(&mut self, rect: RectF, radii: CornerRadii, style: &ShapeStyle) {
        let Some(primitive) = self.primitive_style(style, rect) else {
            return;
        };
        let corner = |r: f32| Size::new_equal(r.max(0.0).round() as u32);
        let radii = EgCornerRadii {
            top_left: corner(radii.top_left),
            top_right: corner(radii.top_right),
            bottom_right: corner(radii.bottom_right),
            bottom_left: corner(radii.bottom_left),
        };
        RoundedRectangle::new(to_rectangle(rect), radii)
            .into_styled(primitive)
            .draw(self.target)
            .ok();
    }

    fn ellipse(&mut self, rect: RectF, style: &ShapeStyle) {
        let Some(primitive) = self.primitive_style(style, rect) else {
            return;
        };
        let r = to_rectangle(rect);
        Ellipse::new(r.top_left, r.size).into_styled(primitive).draw(self.target).ok();
    }

    fn polygon(&mut self, points: &[PointF], style: &ShapeStyle) {
        self.fill_polygons(&[points], &style.fill);
        if let Some(stroke) = style.stroke {
            self.draw_polyline(points, true, &stroke);
        }
    }

    fn polyline(&mut self, points: &[PointF], stroke: &Stroke) {
        self.draw_polyline(points, false, stroke);
    }

    fn path(&mut self, polygons: &[&[PointF]], style: &ShapeStyle) {
        self.fill_polygons(polygons, &style.fill);
        if let Some(stroke) = style.stroke {
            for poly in polygons {
                self.draw_polyline(poly, true, &stroke);
            }
        }
    }

    fn arc(&mut self, rect: RectF, start_deg: f32, span_deg: f32, stroke: &Stroke) {
        if rect.is_empty() || span_deg == 0.0 {
            return;
        }
        let center = rect.center();
        let (rx, ry) = (rect.width / 2.0, rect.height / 2.0);
        let mut points: Vec<PointF, { ARC_SEGMENTS + 1 }> = Vec::new();
        for i in 0..=ARC_SEGMENTS {
            let deg = start_deg + span_deg * i as f32 / ARC_SEGMENTS as f32;
            let rad = deg.to_radians();
            // Screen y grows downward, so positive angles subtract.
            points.push(PointF::new(center.x + rx * rad.cos(), center.y - ry * rad.sin())).ok();
        }
        self.draw_polyline(&points, false, stroke);
    }

    fn text(&mut self, rect: RectF, text: &str, style: &TextStyle) {
        let Some(color) = self.native(style.color) else {
            return;
        };
        let character_style = MonoTextStyle::new(mono_font_for(style.font), color);

        let (alignment, x) = match style.h_align {
            HAlign::Left => (Alignment::Left, rect.left()),
            HAlign::Center => (Alignment::Center, rect.center().x),
            HAlign::Right => (Alignment::Right, rect.right()),
        };
        let (baseline, y) = match style.v_align {
            VAlign::Top => (Baseline::Top, rect.top()),
            VAlign::Center => (Baseline::Middle, rect.center().y),
            VAlign::Bottom => (Baseline::Bottom, rect.bottom()),
            VAlign::Baseline => (Baseline::Alphabetic, rect.bottom()),
        };
        let text_style = TextStyleBuilder::new().alignment(alignment).baseline(baseline).build();

        let text = ascii_glyphs(text);
        Text::with_text_style(&text, to_point(PointF::new(x, y)), character_style, text_style)
            .draw(self.target)
            .ok();
    }

    fn sprite(&mut self, _sprite: Sprite, rect: RectF) {
        // Assets are not available on bare targets; mark where they would go.
        let Some(color) = self.native(white(128)) else {
            return;
        };
        to_rectangle(rect)
            .into_styled(PrimitiveStyle::with_stroke(color, 2))
            .draw(self.target)
            .ok();
    }
}

/// Sorted x coordinates where the scanline at `y` crosses polygon edges.
fn scanline_crossings(polygons: &[&[PointF]], y: f32) -> Vec<f32, MAX_CROSSINGS> {
    let mut xs: Vec<f32, MAX_CROSSINGS> = Vec::new();
    for poly in polygons {
        let n = poly.len();
        if n < 3 {
            continue;
        }
        for i in 0..n {
            let a = poly[i];
            let b = poly[(i + 1) % n];
            if (a.y <= y) == (b.y <= y) {
                continue;
            }
            let t = (y - a.y) / (b.y - a.y);
            xs.push(t.mul_add(b.x - a.x, a.x)).ok();
        }
    }
    xs.sort_unstable_by(f32::total_cmp);
    xs
}

/// ProFont face closest to the requested pixel size.
fn mono_font_for(font: FontSpec) -> &'static MonoFont<'static> {
    match font.size {
        s if s < 30.0 => &FONT_10X20,
        s if s < 45.0 => &PROFONT_12_POINT,
        s if s < 70.0 => &PROFONT_14_POINT,
        s if s < 100.0 => &PROFONT_18_POINT,
        _ => &PROFONT_24_POINT,
    }
}

#[inline]
fn to_point(p: PointF) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

#[inline]
fn to_rectangle(rect: RectF) -> Rectangle {
    Rectangle::new(
        to_point(PointF::new(rect.x, rect.y)),
        Size::new(rect.width.max(0.0).round() as u32, rect.height.max(0.0).round() as u32),
    )
}

#[inline]
fn stroke_px(width: f32) -> u32 {
    width.max(1.0).round() as u32
}
