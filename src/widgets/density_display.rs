//! Density display painting for node boxes and edges.
//!
//! Paints a retained [`NodeView`] as a box with its label, axes, tick marks
//! and density curve, and an [`EdgeView`] as a line with an arrow head.
//! Everything is positioned relative to a canvas origin so the caller can pan.

use egui::{Align2, Color32, FontId, Pos2, Stroke, Vec2};

use crate::app::theme;
use crate::graph::Point;
use crate::render::{EdgeView, NodeView, AXIS_WIDTH, LABEL_HEIGHT};

/// Styling for node boxes.
#[derive(Clone)]
pub struct DensityStyle {
    /// Curve line thickness.
    pub line_thickness: f32,
    /// Whether to fill below the curve.
    pub filled: bool,
    /// Alpha of the fill under the curve.
    pub fill_alpha: u8,
    /// Label font size.
    pub label_size: f32,
    /// Tick label font size.
    pub tick_size: f32,
}

impl Default for DensityStyle {
    fn default() -> Self {
        Self {
            line_thickness: 1.5,
            filled: true,
            fill_alpha: 40,
            label_size: 13.0,
            tick_size: 10.0,
        }
    }
}

/// Arrow head length in pixels.
const ARROW_SIZE: f32 = 9.0;

/// Canvas position of a layout point.
pub fn to_screen(origin: Pos2, point: Point) -> Pos2 {
    origin + Vec2::new(point.x as f32, point.y as f32)
}

/// Short label for an axis tick.
pub fn format_tick(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').to_string()
    }
}

/// Triangle of an arrow head pointing at `tip`, coming from `from`.
pub fn arrow_head(from: Pos2, tip: Pos2, size: f32) -> Option<[Pos2; 3]> {
    let dir = (tip - from).normalized();
    if !dir.x.is_finite() || !dir.y.is_finite() || dir == Vec2::ZERO {
        return None;
    }
    let back = tip - dir * size;
    let side = dir.rot90() * (size * 0.5);
    Some([tip, back + side, back - side])
}

/// Paint a node box with its density curve.
pub fn paint_node(painter: &egui::Painter, origin: Pos2, view: &NodeView, style: &DensityStyle, hovered: bool) {
    let top_left = to_screen(origin, view.origin());
    let rect = egui::Rect::from_min_size(
        top_left,
        Vec2::new(view.bounds.width as f32, view.bounds.height as f32),
    );
    let color = if view.observed {
        theme::curve::OBSERVED
    } else {
        theme::curve::FREE
    };

    // Body
    painter.rect_filled(rect, theme::ROUNDING_SMALL, theme::node::BODY);
    let border = if hovered {
        theme::node::BORDER_HOVERED
    } else {
        theme::node::BORDER
    };
    painter.rect_stroke(rect, theme::ROUNDING_SMALL, Stroke::new(1.0, border));

    // Label
    let label = if view.observed {
        format!("{} = {:.2}", view.name, view.mean)
    } else {
        view.name.clone()
    };
    painter.text(
        Pos2::new(rect.center().x, top_left.y + LABEL_HEIGHT as f32 / 2.0),
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(style.label_size),
        if view.observed { color } else { theme::text::PRIMARY },
    );

    let plot_origin = top_left + Vec2::new(AXIS_WIDTH as f32, LABEL_HEIGHT as f32);
    let plot_size = Vec2::new(view.frame.plot_width() as f32, view.frame.plot_height() as f32);
    paint_axes(painter, plot_origin, plot_size, view, style);

    let points: Vec<Pos2> = view.curve_pixels().map(|p| to_screen(plot_origin, p)).collect();
    if points.len() < 2 {
        return;
    }

    if style.filled {
        let fill = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), style.fill_alpha);
        let baseline = plot_origin.y + plot_size.y;
        for pair in points.windows(2) {
            painter.add(egui::Shape::convex_polygon(
                vec![
                    pair[0],
                    pair[1],
                    Pos2::new(pair[1].x, baseline),
                    Pos2::new(pair[0].x, baseline),
                ],
                fill,
                Stroke::NONE,
            ));
        }
    }

    painter.add(egui::Shape::line(points, Stroke::new(style.line_thickness, color)));
}

fn paint_axes(painter: &egui::Painter, plot_origin: Pos2, plot_size: Vec2, view: &NodeView, style: &DensityStyle) {
    let stroke = Stroke::new(1.0, theme::node::AXIS);
    let bottom_left = plot_origin + Vec2::new(0.0, plot_size.y);

    painter.line_segment([bottom_left, bottom_left + Vec2::new(plot_size.x, 0.0)], stroke);
    painter.line_segment([plot_origin, bottom_left], stroke);

    for &tick in &view.x_ticks {
        let x = bottom_left.x + view.x_scale.map(tick) as f32;
        painter.line_segment([Pos2::new(x, bottom_left.y), Pos2::new(x, bottom_left.y + 4.0)], stroke);
        painter.text(
            Pos2::new(x, bottom_left.y + 6.0),
            Align2::CENTER_TOP,
            format_tick(tick),
            FontId::proportional(style.tick_size),
            theme::text::SECONDARY,
        );
    }

    // Peak density next to the y-axis
    let (_, peak) = view.y_scale.domain();
    painter.text(
        plot_origin - Vec2::new(4.0, 0.0),
        Align2::RIGHT_CENTER,
        format!("{:.2}", peak),
        FontId::proportional(style.tick_size),
        theme::text::SECONDARY,
    );
}

/// Paint an edge as a line with an arrow head at the child end.
pub fn paint_edge(painter: &egui::Painter, origin: Pos2, view: &EdgeView) {
    let from = to_screen(origin, view.segment.start());
    let tip = to_screen(origin, view.segment.end());
    if view.segment.is_degenerate() {
        return;
    }

    painter.line_segment([from, tip], Stroke::new(1.5, theme::EDGE));
    if let Some(head) = arrow_head(from, tip, ARROW_SIZE) {
        painter.add(egui::Shape::convex_polygon(head.to_vec(), theme::EDGE, Stroke::NONE));
    }
}
