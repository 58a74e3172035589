use code_graph_viewer::document::{Block, MetricDescription, Segment, metric_description};
use code_graph_viewer::session::Event;
use code_graph_viewer::session::panels::{
    EvidenceContent, FunctionList, NodeDetailContent, PanelKind,
};
use eframe::egui::{self, Color32, Context, Grid, Rect, RichText, ScrollArea, Ui, vec2};

use super::Viewer;

const PANEL_WIDTH: f32 = 320.0;
const PANEL_MARGIN: f32 = 10.0;
const CC_WARNING_COLOR: Color32 = Color32::from_rgb(230, 90, 80);
const MI_WARNING_COLOR: Color32 = Color32::from_rgb(235, 160, 60);

fn panel_header(ui: &mut Ui, title: &str, kind: PanelKind, events: &mut Vec<Event>) {
    ui.horizontal(|ui| {
        ui.heading(title);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("\u{00d7}").clicked() {
                events.push(Event::PanelCloseClicked(kind));
            }
        });
    });
    ui.separator();
}

fn draw_evidence(ui: &mut Ui, content: &EvidenceContent, events: &mut Vec<Event>) {
    panel_header(ui, &content.title, PanelKind::Evidence, events);
    ui.label(content.kind_line.as_str());
    ui.add_space(6.0);
    for entry in &content.entries {
        ui.label(RichText::new(entry.as_str()).monospace());
    }
}

fn column_header(ui: &mut Ui, label: &str, key: &str) {
    let response = ui.label(RichText::new(label).strong());
    if let Some(description) = metric_description(key) {
        response.on_hover_text(description.title);
    }
}

fn warning_cell(ui: &mut Ui, value: &str, warning: Option<Color32>) {
    match warning {
        Some(color) => ui.label(RichText::new(value).color(color)),
        None => ui.label(value),
    };
}

fn draw_functions(
    ui: &mut Ui,
    functions: &FunctionList,
    expanded: bool,
    events: &mut Vec<Event>,
) {
    ui.add_space(8.0);
    ui.label(RichText::new(functions.heading()).strong());

    Grid::new("node_detail_functions")
        .striped(true)
        .num_columns(5)
        .show(ui, |ui| {
            ui.label(RichText::new("Name").strong());
            ui.label(RichText::new("Line").strong());
            column_header(ui, "LOC", "loc");
            column_header(ui, "CC", "cc");
            column_header(ui, "MI", "mi");
            ui.end_row();

            for row in functions.visible_rows(expanded) {
                ui.label(RichText::new(row.name.as_str()).monospace());
                ui.label(row.line.as_str());
                ui.label(row.loc.as_str());
                warning_cell(ui, &row.cc, row.cc_warning.then_some(CC_WARNING_COLOR));
                warning_cell(ui, &row.mi, row.mi_warning.then_some(MI_WARNING_COLOR));
                ui.end_row();
            }
        });

    if let Some(label) = functions.toggle_label(expanded)
        && ui.button(label).clicked()
    {
        events.push(Event::FunctionsToggleClicked);
    }
}

fn draw_node_detail(
    ui: &mut Ui,
    content: &NodeDetailContent,
    functions_expanded: bool,
    events: &mut Vec<Event>,
) {
    panel_header(ui, &content.title, PanelKind::NodeDetail, events);

    Grid::new("node_detail_info").num_columns(2).show(ui, |ui| {
        for (label, value) in &content.info {
            ui.label(RichText::new(*label).strong());
            ui.label(value.as_str());
            ui.end_row();
        }
    });

    ui.add_space(8.0);
    ui.label(RichText::new("Metrics").strong());
    Grid::new("node_detail_metrics").num_columns(3).show(ui, |ui| {
        for row in &content.metrics {
            ui.label(row.label.as_str());
            ui.label(row.value.as_str());
            if row.help.is_some() && ui.small_button("?").clicked() {
                events.push(Event::MetricInfoClicked {
                    key: row.key.clone(),
                });
            }
            ui.end_row();
        }
    });

    if let Some(functions) = &content.functions {
        draw_functions(ui, functions, functions_expanded, events);
    }

    if !content.connections.is_empty() {
        ui.add_space(8.0);
        ui.label(RichText::new(content.connections_heading()).strong());
        for (entry, connection) in content.connections.iter().enumerate() {
            ui.horizontal(|ui| {
                if ui.link(connection.label.as_str()).clicked() {
                    events.push(Event::ConnectionClicked { entry });
                }
                ui.weak(format!("({})", connection.kind));
            });
        }
    }
}

fn draw_description(ui: &mut Ui, description: &MetricDescription) {
    for (index, block) in description.body.iter().enumerate() {
        match block {
            Block::Paragraph(segments) => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for segment in segments.iter() {
                        let text = match *segment {
                            Segment::Text(text) => RichText::new(text),
                            Segment::Strong(text) => RichText::new(text).strong(),
                            Segment::Emphasis(text) => RichText::new(text).italics(),
                            Segment::Code(text) => RichText::new(text).code(),
                        };
                        ui.label(text);
                    }
                });
            }
            Block::Benchmarks(rows) => {
                Grid::new(("metric_benchmarks", index))
                    .striped(true)
                    .num_columns(2)
                    .show(ui, |ui| {
                        ui.label(RichText::new("Range").strong());
                        ui.label(RichText::new("Meaning").strong());
                        ui.end_row();
                        for (range, meaning) in rows.iter() {
                            ui.label(*range);
                            ui.label(*meaning);
                            ui.end_row();
                        }
                    });
            }
        }
        ui.add_space(6.0);
    }
}

impl Viewer {
    /// Draws whichever inspector is open along the right edge of the canvas.
    pub(super) fn draw_panels(&mut self, ctx: &Context, canvas: Rect) -> Option<Rect> {
        let active = self.view.active_panel()?;
        let view = &self.view;
        let events = &mut self.events;

        let max_height = (canvas.height() - 2.0 * PANEL_MARGIN).max(120.0);
        let position = canvas.right_top() + vec2(-(PANEL_WIDTH + PANEL_MARGIN), PANEL_MARGIN);

        let response = egui::Area::new(egui::Id::new(("graph_panel", view.id())))
            .order(egui::Order::Foreground)
            .fixed_pos(position)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(PANEL_WIDTH);
                    ScrollArea::vertical()
                        .max_height(max_height)
                        .auto_shrink([false, true])
                        .show(ui, |ui| match active {
                            PanelKind::Evidence => {
                                if let Some(content) = view.evidence().content() {
                                    draw_evidence(ui, content, events);
                                }
                            }
                            PanelKind::NodeDetail => {
                                let detail = view.node_detail();
                                if let Some(content) = detail.content() {
                                    draw_node_detail(
                                        ui,
                                        content,
                                        detail.functions_expanded(),
                                        events,
                                    );
                                }
                            }
                        });
                });
            });

        Some(response.response.rect)
    }

    pub(super) fn draw_metric_modal(&mut self, ctx: &Context) {
        let Some(description) = self.view.node_detail().modal() else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new(("metric_modal", self.view.id()))).show(
            ctx,
            |ui| {
                ui.set_max_width(420.0);
                let mut closed = false;
                ui.horizontal(|ui| {
                    ui.heading(description.title);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        closed = ui.small_button("\u{00d7}").clicked();
                    });
                });
                ui.separator();
                draw_description(ui, description);
                closed
            },
        );

        if modal.inner {
            self.events.push(Event::ModalCloseClicked);
        } else if modal.backdrop_response.clicked() {
            self.events.push(Event::ModalBackdropClicked);
        }
    }
}
