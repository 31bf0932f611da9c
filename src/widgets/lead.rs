//! Lead-vehicle chevrons and their metrics labels.
//!
//! Each tracked lead is a chevron over a slightly larger yellow glow,
//! anchored at the lead's projected screen position.
//!
//! # Fill Opacity
//!
//! Two ramps are summed and clamped to `[0, 255]`:
//! ```text
//! alpha  = 255 * (1 - d / lead_buff)            // only while d < lead_buff
//! alpha += 255 * (-v_rel / speed_buff)          // only while closing
//! ```
//! Adjacent leads and the stock theme use tighter buffers (40 m, 10 m/s)
//! than a themed primary lead (100 m, 25 m/s). For adjacent leads the
//! lateral offset is added to the distance.
//!
//! # Size
//!
//! `clamp(750 / (d / 3 + 30), min, max) * 2.35`, with `[15, 30]` for the
//! primary lead and `[5, 20]` for adjacent ones. The anchor is clamped to
//! stay on screen horizontally and above the bottom margin.
//!
//! # Label Collisions
//!
//! Only the primary lead records where its label went. An adjacent lead's
//! label is dropped when it lands within one label width and height of the
//! recorded primary label. Adjacent leads draw before the primary one, so
//! they are compared against the primary label from the previous tick.

use core::fmt::Write;

use heapless::String;

use crate::{
    canvas::{Canvas, FontSpec, PointF, RectF, ShapeStyle, SizeF, TextStyle},
    colors::{self, CHEVRON_GLOW, Color},
    telemetry::LeadData,
};

use super::HudFrame;

const LABEL_FONT: FontSpec = FontSpec::normal(35.0);

/// Gap between the chevron base and the label's text box.
const LABEL_GAP: f32 = 5.0;

// =============================================================================
// Geometry
// =============================================================================

/// Chevron geometry and fill for one lead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeadMarker {
    /// Chevron tip after clamping.
    pub anchor: PointF,
    pub size: f32,
    pub fill_alpha: u8,
    pub glow: [PointF; 3],
    pub chevron: [PointF; 3],
    /// Distance used for the ramps, including lateral offset for adjacent leads.
    pub distance: f32,
}

/// Closing-risk fill opacity.
pub fn fill_alpha(distance: f32, v_rel: f32, lead_buff: f32, speed_buff: f32) -> u8 {
    if distance >= lead_buff {
        return 0;
    }
    let mut alpha = 255.0 * (1.0 - distance / lead_buff);
    if v_rel < 0.0 {
        alpha += 255.0 * (-v_rel / speed_buff);
    }
    alpha.clamp(0.0, 255.0) as u8
}

pub fn lead_marker(lead: &LeadData, vertex: PointF, screen: SizeF, stock_colors: bool, adjacent: bool) -> LeadMarker {
    let tight = stock_colors || adjacent;
    let speed_buff = if tight { 10.0 } else { 25.0 };
    let lead_buff = if tight { 40.0 } else { 100.0 };
    let distance = lead.d_rel + if adjacent { lead.y_rel.abs() } else { 0.0 };

    let (min_size, max_size) = if adjacent { (5.0, 20.0) } else { (15.0, 30.0) };
    let sz = ((25.0 * 30.0) / (distance / 3.0 + 30.0)).clamp(min_size, max_size) * 2.35;

    let x = vertex.x.clamp(0.0, (screen.width - sz / 2.0).max(0.0));
    let y = (screen.height - sz * 0.6).min(vertex.y);

    let g_xo = sz / 5.0;
    let g_yo = sz / 10.0;
    let glow = [
        PointF::new(x + sz * 1.35 + g_xo, y + sz + g_yo),
        PointF::new(x, y - g_yo),
        PointF::new(x - sz * 1.35 - g_xo, y + sz + g_yo),
    ];
    let chevron = [PointF::new(x + sz * 1.25, y + sz), PointF::new(x, y), PointF::new(x - sz * 1.25, y + sz)];

    LeadMarker {
        anchor: PointF::new(x, y),
        size: sz,
        fill_alpha: fill_alpha(distance, lead.v_rel, lead_buff, speed_buff),
        glow,
        chevron,
        distance,
    }
}

/// Label text box below a chevron for text of `text_size`.
pub fn label_rect(marker: &LeadMarker, text_size: SizeF) -> RectF {
    let middle_x = (marker.chevron[2].x + marker.chevron[0].x) / 2.0;
    let baseline = marker.chevron[0].y + text_size.height + LABEL_GAP;
    RectF::new(middle_x - text_size.width / 2.0, baseline - text_size.height, text_size.width, text_size.height)
}

// =============================================================================
// Label Tracking
// =============================================================================

/// Where the primary lead's label was last drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LeadLabelTracker {
    primary: Option<RectF>,
}

impl LeadLabelTracker {
    pub const fn new() -> Self {
        Self { primary: None }
    }

    pub const fn primary(&self) -> Option<RectF> {
        self.primary
    }

    pub fn record_primary(&mut self, label: RectF) {
        self.primary = Some(label);
    }

    /// No primary lead this tick.
    pub fn clear(&mut self) {
        self.primary = None;
    }

    /// An adjacent label may be drawn unless it sits within one box
    /// width and height of the recorded primary label.
    pub fn admits(&self, label: RectF) -> bool {
        let Some(primary) = self.primary else {
            return true;
        };
        (label.right() - primary.right()).abs() >= label.width
            || (label.bottom() - primary.bottom()).abs() >= label.height
    }
}

/// Metrics label: distance, lead speed and, for the primary lead, headway.
/// `distance` is the marker's own distance, so adjacent labels include the
/// lateral offset.
pub fn lead_label(frame: &HudFrame<'_>, lead: &LeadData, distance: f32, adjacent: bool) -> String<64> {
    let conv = &frame.state.conversions;
    let distance_unit = conv.distance_unit(frame.snapshot.map_open);
    let mut text = String::new();
    write!(
        text,
        "{} {distance_unit} | {} {}",
        (distance * conv.distance).round() as i32,
        (lead.v_lead * conv.lead_speed).round() as i32,
        conv.lead_speed_unit,
    )
    .ok();
    if !adjacent {
        write!(text, " | {:.1} s", distance / frame.state.v_ego.max(1.0)).ok();
    }
    text
}

// =============================================================================
// Drawing
// =============================================================================

fn draw_lead(
    canvas: &mut impl Canvas,
    frame: &HudFrame<'_>,
    tracker: &mut LeadLabelTracker,
    lead: &LeadData,
    vertex: PointF,
    color: Color,
    adjacent: bool,
) {
    let stock = frame.settings.use_stock_colors;
    let marker = lead_marker(lead, vertex, canvas.size(), stock, adjacent);

    canvas.polygon(&marker.glow, &ShapeStyle::filled(CHEVRON_GLOW));
    let fill = if stock { colors::red(marker.fill_alpha) } else { color.with_alpha(marker.fill_alpha) };
    canvas.polygon(&marker.chevron, &ShapeStyle::filled(fill));

    if !frame.settings.lead_metrics {
        return;
    }
    let text = lead_label(frame, lead, marker.distance, adjacent);
    let rect = label_rect(&marker, canvas.text_size(LABEL_FONT, &text));
    if !adjacent {
        tracker.record_primary(rect);
    }
    if !adjacent || tracker.admits(rect) {
        canvas.text(rect, &text, &TextStyle::baseline(LABEL_FONT, colors::white(255)));
    }
}

pub fn draw_leads(canvas: &mut impl Canvas, frame: &HudFrame<'_>, tracker: &mut LeadLabelTracker) {
    let leads = &frame.snapshot.leads;
    let vertices = &frame.scene.lead_vertices;
    canvas.set_opacity(1.0);

    let adjacent = [
        (&leads.left, vertices[2], colors::blue(255)),
        (&leads.right, vertices[3], colors::red(255)),
        (&leads.left_far, vertices[4], colors::green(255)),
        (&leads.right_far, vertices[5], colors::white(255)),
    ];
    for (lead, vertex, color) in adjacent {
        if lead.status {
            draw_lead(canvas, frame, tracker, lead, vertex, color, true);
        }
    }

    let marker_color = frame.settings.lead_marker_color;
    if leads.two.status {
        draw_lead(canvas, frame, tracker, &leads.two, vertices[1], marker_color, false);
    } else if leads.one.status {
        draw_lead(canvas, frame, tracker, &leads.one, vertices[0], marker_color, false);
    } else {
        tracker.clear();
    }
}
