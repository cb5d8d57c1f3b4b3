//! Theme definitions for the network viewer
//!
//! Provides color constants, styling utilities, and theme configuration
//! for a dark, plot-friendly look.

use eframe::egui::{self, Color32, Rounding, Stroke, Vec2};

/// Background colors
pub mod background {
    use super::Color32;

    /// Canvas background - deep dark blue
    pub const MAIN: Color32 = Color32::from_rgb(26, 26, 46);

    /// Grid line color - subtle
    pub const GRID: Color32 = Color32::from_rgb(36, 36, 58);

    /// Toolbar and status bar background
    pub const PANEL: Color32 = Color32::from_rgb(35, 35, 55);

    /// Widget background (buttons, inputs)
    pub const WIDGET: Color32 = Color32::from_rgb(45, 45, 70);

    /// Widget background when hovered
    pub const WIDGET_HOVERED: Color32 = Color32::from_rgb(55, 55, 85);

    /// Widget background when active/pressed
    pub const WIDGET_ACTIVE: Color32 = Color32::from_rgb(65, 65, 100);
}

/// Node box colors
pub mod node {
    use super::Color32;

    /// Box body
    pub const BODY: Color32 = Color32::from_rgb(20, 22, 30);

    /// Box outline
    pub const BORDER: Color32 = Color32::from_rgb(60, 65, 85);

    /// Box outline while hovered
    pub const BORDER_HOVERED: Color32 = Color32::from_rgb(110, 115, 140);

    /// Axis lines and ticks
    pub const AXIS: Color32 = Color32::from_rgb(90, 95, 115);
}

/// Density curve colors
pub mod curve {
    use super::Color32;

    /// Free variable - blue
    pub const FREE: Color32 = Color32::from_rgb(66, 165, 245);

    /// Observed variable - orange
    pub const OBSERVED: Color32 = Color32::from_rgb(255, 183, 77);
}

/// Edge color
pub const EDGE: Color32 = Color32::from_rgb(150, 150, 170);

/// Text colors
pub mod text {
    use super::Color32;

    /// Primary text - bright white
    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);

    /// Secondary text - dimmed
    pub const SECONDARY: Color32 = Color32::from_rgb(160, 160, 175);

    /// Disabled text
    pub const DISABLED: Color32 = Color32::from_rgb(100, 100, 115);
}

/// UI accent colors
pub mod accent {
    use super::Color32;

    /// Primary accent - blue
    pub const PRIMARY: Color32 = Color32::from_rgb(66, 165, 245);

    /// Success/active - green
    pub const SUCCESS: Color32 = Color32::from_rgb(129, 199, 132);

    /// Warning - orange
    pub const WARNING: Color32 = Color32::from_rgb(255, 183, 77);

    /// Error - red
    pub const ERROR: Color32 = Color32::from_rgb(239, 83, 80);
}

/// Grid spacing for the background pattern
pub const GRID_SPACING: f32 = 20.0;

/// Standard rounding for UI elements
pub const ROUNDING: Rounding = Rounding {
    nw: 6.0,
    ne: 6.0,
    sw: 6.0,
    se: 6.0,
};

/// Smaller rounding for compact elements
pub const ROUNDING_SMALL: Rounding = Rounding {
    nw: 4.0,
    ne: 4.0,
    sw: 4.0,
    se: 4.0,
};

/// Apply the dark theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let visuals = &mut style.visuals;
    visuals.dark_mode = true;

    visuals.window_fill = background::PANEL;
    visuals.window_stroke = Stroke::new(1.0, node::BORDER);
    visuals.window_rounding = ROUNDING;
    visuals.panel_fill = background::MAIN;

    let widgets = &mut visuals.widgets;
    for (state, fill, stroke) in [
        (&mut widgets.noninteractive, background::WIDGET, Stroke::new(1.0, text::SECONDARY)),
        (&mut widgets.inactive, background::WIDGET, Stroke::new(1.0, text::PRIMARY)),
        (&mut widgets.hovered, background::WIDGET_HOVERED, Stroke::new(1.0, text::PRIMARY)),
        (&mut widgets.active, background::WIDGET_ACTIVE, Stroke::new(1.5, accent::PRIMARY)),
        (&mut widgets.open, background::WIDGET_ACTIVE, Stroke::new(1.0, text::PRIMARY)),
    ] {
        state.bg_fill = fill;
        state.fg_stroke = stroke;
        state.rounding = ROUNDING_SMALL;
    }

    visuals.selection.bg_fill = accent::PRIMARY.gamma_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent::PRIMARY);
    visuals.extreme_bg_color = Color32::from_rgb(20, 20, 35);

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);
    style.spacing.button_padding = Vec2::new(12.0, 6.0);

    ctx.set_style(style);
}

/// Draw a grid background that scrolls with `offset`.
pub fn draw_grid_background(painter: &egui::Painter, rect: egui::Rect, offset: Vec2) {
    painter.rect_filled(rect, 0.0, background::MAIN);
    let stroke = Stroke::new(1.0, background::GRID);

    let mut x = rect.left() + offset.x.rem_euclid(GRID_SPACING);
    while x <= rect.right() {
        painter.line_segment([egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())], stroke);
        x += GRID_SPACING;
    }

    let mut y = rect.top() + offset.y.rem_euclid(GRID_SPACING);
    while y <= rect.bottom() {
        painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], stroke);
        y += GRID_SPACING;
    }
}
