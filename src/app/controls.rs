use code_graph_viewer::session::Event;
use eframe::egui::{self, Context, Rect, RichText, vec2};

use super::Viewer;

const CONTROLS_MARGIN: f32 = 10.0;
const SEARCH_WIDTH: f32 = 180.0;

impl Viewer {
    /// Edge-kind filters, the name search and a view reset, floating over
    /// the top-left corner of the canvas. Returns the area it covered this frame.
    pub(super) fn draw_controls(&mut self, ctx: &Context, canvas: Rect) -> Rect {
        let filters = self.view.filters().to_vec();

        let response = egui::Area::new(egui::Id::new(("graph_controls", self.view.id())))
            .order(egui::Order::Foreground)
            .fixed_pos(canvas.left_top() + vec2(CONTROLS_MARGIN, CONTROLS_MARGIN))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(RichText::new("Edge Kinds").strong());
                    for (kind, filter) in filters.iter().enumerate() {
                        let mut checked = filter.checked;
                        if ui.checkbox(&mut checked, filter.kind.as_str()).changed() {
                            self.events.push(Event::FilterToggled { kind, checked });
                        }
                    }

                    ui.separator();

                    let search = ui.add(
                        egui::TextEdit::singleline(&mut self.search_input)
                            .hint_text("Search nodes...")
                            .desired_width(SEARCH_WIDTH),
                    );
                    if search.changed() {
                        self.events.push(Event::SearchInput {
                            text: self.search_input.clone(),
                        });
                    }

                    if ui.button("Reset view").clicked() {
                        self.events.push(Event::ViewReset);
                    }
                });
            });

        response.response.rect
    }
}
