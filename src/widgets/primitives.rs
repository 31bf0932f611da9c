//! Shape helpers shared across widgets.

use crate::{
    canvas::{Canvas, CornerRadii, RectF, ShapeStyle, Stroke, VerticalGradient},
    colors::Color,
};

/// Rounded box with a fill and a pen, the shape every panel on the overlay
/// uses.
pub fn draw_panel(canvas: &mut impl Canvas, rect: RectF, radius: f32, fill: Color, pen: Stroke) {
    canvas.rounded_rect(rect, CornerRadii::uniform(radius), &ShapeStyle::filled_outlined(fill, pen));
}

/// Three-stop fade used by paths and path edges: `base` at the bottom, half
/// alpha halfway up, a tenth at the top.
pub fn fading_gradient(height: f32, base: Color) -> VerticalGradient {
    VerticalGradient::full_height(height)
        .with_stop(0.0, base)
        .with_stop(0.5, base.with_alpha_f(0.5))
        .with_stop(1.0, base.with_alpha_f(0.1))
}

/// Three-stop gradient with explicit alphas on a single HSL hue.
pub fn hsl_gradient(height: f32, hue_deg: f32, saturation: f32, lightness: f32, alphas: [f32; 3]) -> VerticalGradient {
    let color = |a| Color::from_hsla(hue_deg / 360.0, saturation, lightness, a);
    VerticalGradient::full_height(height)
        .with_stop(0.0, color(alphas[0]))
        .with_stop(0.5, color(alphas[1]))
        .with_stop(1.0, color(alphas[2]))
}
