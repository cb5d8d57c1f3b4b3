//! Main application struct for the network viewer
//!
//! Contains the VizApp which implements eframe::App, paints the retained
//! scene, and turns pointer gestures into controller calls.

use std::path::Path;

use eframe::egui::{self, Align, Layout, Pos2, RichText, Sense, Vec2};

use super::theme;
use crate::graph::{NodeUid, Point};
use crate::inference::LinearGaussianNetwork;
use crate::layout::LayeredLayout;
use crate::persistence::{load_from_file, NetworkFile, NetworkFileError};
use crate::render::{Scene, LABEL_HEIGHT};
use crate::viz::{draw, DrawConfig, InteractionController, VisualizationGraph};
use crate::widgets::{paint_edge, paint_node, DensityStyle};

/// Controller type driven by the app.
pub type AppController = InteractionController<LinearGaussianNetwork, Scene>;

/// Build, lay out and draw a network definition.
pub fn open_network(file: &NetworkFile) -> Result<(AppController, DrawConfig), NetworkFileError> {
    let network = file.build_network()?;
    let graph = VisualizationGraph::from_graph(network)?;
    let config = file.draw_config();
    let controller = draw(&config, graph, &mut LayeredLayout::new(), Scene::new());
    Ok((controller, config))
}

/// A node being dragged, with the grab point relative to its corner.
struct DragState {
    uid: NodeUid,
    grab: Point,
}

/// Main application state for the network viewer
pub struct VizApp {
    /// Controller for the open network
    controller: Option<AppController>,

    /// Name of the open network
    network_name: String,

    /// Canvas pan offset
    pan: Vec2,

    /// Node currently being dragged
    drag: Option<DragState>,

    /// Node styling
    style: DensityStyle,

    /// Last error message to display
    error_message: Option<String>,

    /// Whether theme has been applied
    theme_applied: bool,
}

impl VizApp {
    /// Create the app showing `file`.
    pub fn new(file: &NetworkFile) -> Self {
        let mut app = Self {
            controller: None,
            network_name: String::new(),
            pan: Vec2::ZERO,
            drag: None,
            style: DensityStyle::default(),
            error_message: None,
            theme_applied: false,
        };
        app.load(file);
        app
    }

    fn load(&mut self, file: &NetworkFile) {
        match open_network(file) {
            Ok((controller, _config)) => {
                tracing::info!(network = %file.name, "network loaded");
                self.controller = Some(controller);
                self.network_name = file.name.clone();
                self.pan = Vec2::ZERO;
                self.drag = None;
                self.error_message = None;
            }
            Err(e) => {
                tracing::warn!(network = %file.name, "failed to open network: {}", e);
                self.error_message = Some(e.to_string());
            }
        }
    }

    fn load_path(&mut self, path: &Path) {
        match load_from_file(path) {
            Ok(file) => self.load(&file),
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read network file: {}", e);
                self.error_message = Some(e.to_string());
            }
        }
    }

    /// Draw the top toolbar
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) -> ToolbarActions {
        let mut actions = ToolbarActions::default();

        ui.horizontal(|ui| {
            ui.add_space(8.0);

            ui.label(RichText::new("LCG VIZ")
                .size(18.0)
                .color(theme::text::PRIMARY)
                .strong());

            ui.add_space(20.0);
            ui.separator();
            ui.add_space(20.0);

            if ui.button("📂 Open").clicked() {
                actions.open = true;
            }
            if ui.button("⟲ Reset view").clicked() {
                actions.reset_view = true;
            }

            if let Some(controller) = &mut self.controller {
                ui.add_space(20.0);
                ui.separator();
                ui.add_space(20.0);

                ui.label(RichText::new("Samples").color(theme::text::SECONDARY));
                let mut samples = controller.samples();
                if ui
                    .add(egui::DragValue::new(&mut samples).range(100..=200_000).speed(100.0))
                    .changed()
                {
                    controller.set_samples(samples);
                }
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(RichText::new(&self.network_name)
                    .color(theme::text::SECONDARY)
                    .small());
            });
        });

        actions
    }

    /// Paint the scene and collect pointer gestures
    fn draw_main_area(&mut self, ui: &mut egui::Ui) -> Vec<CanvasAction> {
        let mut actions = Vec::new();
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        theme::draw_grid_background(&painter, rect, self.pan);

        let Some(controller) = &self.controller else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No network loaded",
                egui::FontId::proportional(24.0),
                theme::text::DISABLED,
            );
            return actions;
        };
        let scene = controller.target();
        let origin = rect.min + self.pan;
        let to_graph = |p: Pos2| Point::new((p.x - origin.x) as f64, (p.y - origin.y) as f64);

        let hovered = response
            .hover_pos()
            .and_then(|p| scene.node_at(to_graph(p)))
            .map(|view| view.uid.clone());

        for edge in scene.edges() {
            paint_edge(&painter, origin, edge);
        }
        for view in scene.nodes_in_z_order() {
            paint_node(&painter, origin, view, &self.style, hovered.as_ref() == Some(&view.uid));
        }

        // Pointer gestures
        if response.drag_started() {
            let grabbed = response
                .interact_pointer_pos()
                .map(to_graph)
                .and_then(|pointer| scene.node_at(pointer).map(|view| (pointer, view)));
            self.drag = grabbed.map(|(pointer, view)| {
                let corner = view.origin();
                actions.push(CanvasAction::Raise(view.uid.clone()));
                DragState {
                    uid: view.uid.clone(),
                    grab: Point::new(pointer.x - corner.x, pointer.y - corner.y),
                }
            });
        }

        if response.dragged() {
            match (&self.drag, response.interact_pointer_pos()) {
                (Some(drag), Some(p)) => {
                    let pointer = to_graph(p);
                    actions.push(CanvasAction::DragTo(
                        drag.uid.clone(),
                        pointer.x - drag.grab.x,
                        pointer.y - drag.grab.y,
                    ));
                }
                (None, _) => self.pan += response.drag_delta(),
                _ => {}
            }
        }

        if response.drag_stopped() {
            self.drag = None;
        }

        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos().map(to_graph) {
                if let Some(view) = scene.node_at(pointer) {
                    let corner = view.origin();
                    let local = Point::new(pointer.x - corner.x, pointer.y - corner.y);
                    actions.push(CanvasAction::Raise(view.uid.clone()));
                    if local.y < LABEL_HEIGHT {
                        actions.push(CanvasAction::Unobserve(view.uid.clone()));
                    } else if let Some(px) = view.frame.axis_x(local) {
                        actions.push(CanvasAction::ObserveAt(view.uid.clone(), px));
                    }
                }
            }
        }

        actions
    }

    /// Draw the bottom status bar
    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);

            if let Some(ref error) = self.error_message {
                ui.label(RichText::new(format!("⚠ {}", error))
                    .color(theme::accent::ERROR)
                    .small());
            } else if let Some(controller) = &self.controller {
                let observed = controller
                    .model()
                    .nodes()
                    .iter()
                    .filter(|node| node.observed())
                    .count();
                ui.label(RichText::new(format!(
                    "{} variables • {} observed • click an axis to observe, a label to release",
                    controller.model().node_count(),
                    observed
                ))
                .color(theme::text::SECONDARY)
                .small());
            } else {
                ui.label(RichText::new("Ready")
                    .color(theme::text::SECONDARY)
                    .small());
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(RichText::new(concat!("lcg_viz v", env!("CARGO_PKG_VERSION")))
                    .color(theme::text::DISABLED)
                    .small());
            });
        });
    }

    fn apply(&mut self, action: CanvasAction) {
        let Some(controller) = &mut self.controller else {
            return;
        };
        let result = match action {
            CanvasAction::Raise(uid) => controller.raise(&uid),
            CanvasAction::DragTo(uid, x, y) => controller.drag_to(&uid, x, y),
            CanvasAction::ObserveAt(uid, px) => controller.observe_at(&uid, px).map(|_| ()),
            CanvasAction::Unobserve(uid) => controller.unobserve(&uid),
        };
        if let Err(e) = result {
            self.error_message = Some(e.to_string());
        }
    }
}

/// Actions collected from the toolbar for deferred execution
#[derive(Default)]
struct ToolbarActions {
    open: bool,
    reset_view: bool,
}

/// Canvas gestures, applied after painting
enum CanvasAction {
    Raise(NodeUid),
    DragTo(NodeUid, f64, f64),
    ObserveAt(NodeUid, f64),
    Unobserve(NodeUid),
}

impl eframe::App for VizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme on first frame
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        let toolbar_actions = egui::TopBottomPanel::top("toolbar")
            .frame(egui::Frame::none()
                .fill(theme::background::PANEL)
                .inner_margin(egui::Margin::symmetric(0.0, 8.0)))
            .show(ctx, |ui| {
                self.draw_toolbar(ui)
            })
            .inner;

        egui::TopBottomPanel::bottom("status_bar")
            .frame(egui::Frame::none()
                .fill(theme::background::PANEL)
                .inner_margin(egui::Margin::symmetric(0.0, 4.0)))
            .show(ctx, |ui| {
                self.draw_status_bar(ui);
            });

        let canvas_actions = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.draw_main_area(ui)
            })
            .inner;

        // Handle deferred actions (to avoid borrow checker issues)
        for action in canvas_actions {
            self.apply(action);
        }
        if toolbar_actions.reset_view {
            self.pan = Vec2::ZERO;
        }
        if toolbar_actions.open {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Network", &["json"])
                .pick_file()
            {
                self.load_path(&path);
            }
        }
    }
}
