//! Canvas that records draw calls instead of rasterizing them.

use super::{Canvas, CornerRadii, Fill, FontSpec, PointF, RectF, ShapeStyle, SizeF, Sprite, Stroke, TextStyle};

/// Width of one glyph relative to the font size.
const GLYPH_ASPECT: f32 = 0.55;

/// One recorded call, with the global opacity that was in force.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: RectF, fill: Fill, opacity: f32 },
    RoundedRect { rect: RectF, radii: CornerRadii, style: ShapeStyle, opacity: f32 },
    Ellipse { rect: RectF, style: ShapeStyle, opacity: f32 },
    Polygon { points: Vec<PointF>, style: ShapeStyle, opacity: f32 },
    Polyline { points: Vec<PointF>, stroke: Stroke, opacity: f32 },
    Path { polygons: Vec<Vec<PointF>>, style: ShapeStyle, opacity: f32 },
    Arc { rect: RectF, start_deg: f32, span_deg: f32, stroke: Stroke, opacity: f32 },
    Text { rect: RectF, text: String, style: TextStyle, opacity: f32 },
    Sprite { sprite: Sprite, rect: RectF, opacity: f32 },
}

/// Records every call. Text metrics are approximated as a monospaced face.
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    size: SizeF,
    opacity: f32,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { size: SizeF::new(width, height), opacity: 1.0, commands: Vec::new() }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget recorded calls, keeping the size. Opacity resets to 1.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.opacity = 1.0;
    }

    /// Every text call in draw order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, &TextStyle, f32)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, style, opacity, .. } => Some((text.as_str(), style, *opacity)),
            _ => None,
        })
    }

    /// First text call whose string contains `needle`.
    pub fn find_text(&self, needle: &str) -> Option<(&str, &TextStyle, f32)> {
        self.texts().find(|(text, _, _)| text.contains(needle))
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.find_text(needle).is_some()
    }

    /// Every sprite call in draw order.
    pub fn sprites(&self) -> impl Iterator<Item = (Sprite, RectF)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Sprite { sprite, rect, .. } => Some((*sprite, *rect)),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> SizeF {
        self.size
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn text_size(&self, font: FontSpec, text: &str) -> SizeF {
        let chars = text.chars().count() as f32;
        SizeF::new(chars * font.size * GLYPH_ASPECT, font.size)
    }

    fn fill_rect(&mut self, rect: RectF, fill: &Fill) {
        self.commands.push(DrawCommand::FillRect { rect, fill: fill.clone(), opacity: self.opacity });
    }

    fn rounded_rect(&mut self, rect: RectF, radii: CornerRadii, style: &ShapeStyle) {
        self.commands.push(DrawCommand::RoundedRect { rect, radii, style: style.clone(), opacity: self.opacity });
    }

    fn ellipse(&mut self, rect: RectF, style: &ShapeStyle) {
        self.commands.push(DrawCommand::Ellipse { rect, style: style.clone(), opacity: self.opacity });
    }

    fn polygon(&mut self, points: &[PointF], style: &ShapeStyle) {
        self.commands.push(DrawCommand::Polygon { points: points.to_vec(), style: style.clone(), opacity: self.opacity });
    }

    fn polyline(&mut self, points: &[PointF], stroke: &Stroke) {
        self.commands.push(DrawCommand::Polyline { points: points.to_vec(), stroke: *stroke, opacity: self.opacity });
    }

    fn path(&mut self, polygons: &[&[PointF]], style: &ShapeStyle) {
        self.commands.push(DrawCommand::Path {
            polygons: polygons.iter().map(|p| p.to_vec()).collect(),
            style: style.clone(),
            opacity: self.opacity,
        });
    }

    fn arc(&mut self, rect: RectF, start_deg: f32, span_deg: f32, stroke: &Stroke) {
        self.commands.push(DrawCommand::Arc { rect, start_deg, span_deg, stroke: *stroke, opacity: self.opacity });
    }

    fn text(&mut self, rect: RectF, text: &str, style: &TextStyle) {
        self.commands.push(DrawCommand::Text { rect, text: text.to_owned(), style: *style, opacity: self.opacity });
    }

    fn sprite(&mut self, sprite: Sprite, rect: RectF) {
        self.commands.push(DrawCommand::Sprite { sprite, rect, opacity: self.opacity });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::white;

    #[test]
    fn test_records_opacity_in_force() {
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        let style = TextStyle::centered(FontSpec::bold(40.0), white(255));
        canvas.set_opacity(0.25);
        canvas.text(RectF::new(0.0, 0.0, 10.0, 10.0), "a", &style);
        canvas.set_opacity(1.0);
        canvas.text(RectF::new(0.0, 0.0, 10.0, 10.0), "b", &style);

        let opacities: Vec<f32> = canvas.texts().map(|(_, _, o)| o).collect();
        assert_eq!(opacities, vec![0.25, 1.0]);
    }

    #[test]
    fn test_text_metrics_scale_with_length() {
        let canvas = RecordingCanvas::new(100.0, 100.0);
        let short = canvas.text_size(FontSpec::bold(40.0), "45");
        let long = canvas.text_size(FontSpec::bold(40.0), "120");
        assert!(long.width > short.width, "Three digits are wider than two");
        assert_eq!(short.height, 40.0);
    }

    #[test]
    fn test_opacity_clamped_and_reset_on_clear() {
        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        canvas.set_opacity(3.0);
        assert_eq!(canvas.opacity(), 1.0);
        canvas.set_opacity(0.5);
        canvas.clear();
        assert_eq!(canvas.opacity(), 1.0);
        assert!(canvas.commands().is_empty());
    }
}
