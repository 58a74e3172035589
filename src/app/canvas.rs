use code_graph_viewer::session::Event;
use code_graph_viewer::session::viewport::wheel_zoom_factor;
use eframe::egui::{
    self, Align2, Color32, FontId, PointerButton, Rect, Sense, Stroke, Ui, Vec2, vec2,
};

use super::render_utils::{
    blend_color, circle_visible, draw_background, fade_color, layout_to_screen,
    screen_to_container, segment_visible,
};
use super::{Gesture, Viewer};

const FADED_OPACITY: f32 = 0.15;
const LABEL_COLOR: Color32 = Color32::from_gray(225);
const OUTLINE_COLOR: Color32 = Color32::from_rgba_premultiplied(12, 12, 12, 190);
const EMPHASIS_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

impl Viewer {
    fn node_under(&self, container_point: Vec2) -> Option<usize> {
        let point = self.view.transform().invert(container_point);
        self.view.scene().node_at(point, |_| true)
    }

    fn edge_under(&self, container_point: Vec2) -> Option<usize> {
        let point = self.view.transform().invert(container_point);
        self.view
            .scene()
            .edge_at(point, |edge| self.view.edge_appearance(edge).visible)
    }

    /// Draws the scene and turns pointer input on the canvas into session
    /// events. Returns the canvas rect, which is the container region.
    pub(super) fn draw_canvas(&mut self, ui: &mut Ui) -> Rect {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.view.transform());

        self.handle_zoom(ui, rect, &response);
        self.handle_pointer(rect, &response);
        self.paint_scene(&painter, rect);

        let hovered_node = response
            .hover_pos()
            .and_then(|pos| self.node_under(screen_to_container(rect, pos)));
        if let Some(node) = hovered_node {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            response.on_hover_text_at_pointer(self.view.document().nodes[node].id.as_str());
        }

        rect
    }

    fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let anchor = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.events.push(Event::Zoomed {
            anchor: screen_to_container(rect, anchor),
            factor: wheel_zoom_factor(scroll),
        });
    }

    fn handle_pointer(&mut self, rect: Rect, response: &egui::Response) {
        let pointer = response
            .interact_pointer_pos()
            .map(|pos| screen_to_container(rect, pos));

        if response.drag_started_by(PointerButton::Primary)
            && let Some(pointer) = pointer
        {
            self.gesture = match self.node_under(pointer) {
                Some(node) => {
                    self.events.push(Event::DragStarted { node, pointer });
                    Gesture::DraggingNode
                }
                None => Gesture::Panning,
            };
        } else if response.drag_started() {
            self.gesture = Gesture::Panning;
        }

        if response.dragged() {
            match self.gesture {
                Gesture::DraggingNode => {
                    if let Some(pointer) = pointer {
                        self.events.push(Event::DragMoved { pointer });
                    }
                }
                Gesture::Panning => self.events.push(Event::Panned {
                    delta: response.drag_delta(),
                }),
                Gesture::Idle => {}
            }
        }

        if response.drag_stopped() {
            if self.gesture == Gesture::DraggingNode {
                self.events.push(Event::DragEnded);
            }
            self.gesture = Gesture::Idle;
        }

        if response.clicked_by(PointerButton::Primary)
            && let Some(pointer) = pointer
        {
            let event = if let Some(node) = self.node_under(pointer) {
                Event::NodeClicked { node }
            } else if let Some(edge) = self.edge_under(pointer) {
                Event::EdgeClicked { edge }
            } else {
                Event::BackgroundClicked
            };
            self.events.push(event);
        }
    }

    fn paint_scene(&self, painter: &egui::Painter, rect: Rect) {
        let transform = self.view.transform();
        let scene = self.view.scene();

        for line in &scene.edges {
            let appearance = self.view.edge_appearance(line.link);
            if !appearance.visible {
                continue;
            }

            let start = layout_to_screen(rect, transform, line.from);
            let end = layout_to_screen(rect, transform, line.to);
            let mut width = line.width * transform.scale;
            if !segment_visible(rect, start, end, width) {
                continue;
            }

            let mut color = line.stroke;
            if appearance.emphasized {
                width *= 1.6;
                color = blend_color(color, Color32::WHITE, 0.2);
            }
            if appearance.faded {
                color = fade_color(color, FADED_OPACITY);
            }
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        let font = FontId::proportional((11.0 * transform.scale).clamp(6.0, 28.0));
        for marker in &scene.nodes {
            let appearance = self.view.node_appearance(marker.node);
            let center = layout_to_screen(rect, transform, marker.position);
            let radius = marker.radius * transform.scale;
            let label_offset = marker.label_offset * transform.scale;
            if !circle_visible(rect, center, radius + label_offset) {
                continue;
            }

            let opacity = if appearance.faded { FADED_OPACITY } else { 1.0 };
            painter.circle_filled(center, radius, fade_color(marker.fill, opacity));

            let outline = if appearance.emphasized {
                Stroke::new(2.0, EMPHASIS_COLOR)
            } else {
                Stroke::new(1.0, fade_color(OUTLINE_COLOR, opacity))
            };
            painter.circle_stroke(center, radius, outline);

            painter.text(
                center + vec2(0.0, label_offset),
                Align2::CENTER_BOTTOM,
                &marker.label,
                font.clone(),
                fade_color(LABEL_COLOR, opacity),
            );
        }
    }
}
