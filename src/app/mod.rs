use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use anyhow::Context as _;
use code_graph_viewer::session::Event;
use code_graph_viewer::{
    Container, GraphDocument, GraphView, RenderOptions, parse_document, render,
};
use eframe::egui::{self, Align, Context, Layout, RichText};

mod canvas;
mod controls;
mod panels;
mod render_utils;

pub const TOP_BAR_HEIGHT: f32 = 32.0;

type LoadResult = Result<Arc<GraphDocument>, String>;

pub struct ViewerApp {
    source: PathBuf,
    options: RenderOptions,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<Viewer>),
    Error(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Gesture {
    #[default]
    Idle,
    DraggingNode,
    Panning,
}

/// Host side of one render session: the container it is mounted in, input
/// state egui keeps between frames, and the events collected this frame.
struct Viewer {
    container: Container,
    view: GraphView,
    search_input: String,
    gesture: Gesture,
    events: Vec<Event>,
}

impl Viewer {
    fn new(document: Arc<GraphDocument>, options: RenderOptions) -> Self {
        let mut container = Container::new();
        let view = render(&mut container, document, options);
        Self {
            container,
            view,
            search_input: String::new(),
            gesture: Gesture::Idle,
            events: Vec::new(),
        }
    }

    fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_reloading: bool) {
        egui::TopBottomPanel::top("top_bar")
            .exact_height(TOP_BAR_HEIGHT)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let document = self.view.document();
                    ui.heading("code-graph-viewer");
                    ui.separator();
                    if let Some(repo) = document.meta.repo() {
                        ui.label(format!("repo: {repo}"));
                    }
                    if let Some(generated_at) = document.meta.generated_at() {
                        ui.label(format!("generated: {generated_at}"));
                    }
                    ui.label(format!("nodes: {}", document.nodes.len()));
                    ui.label(format!("links: {}", self.view.graph().links.len()));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let reload = ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
                        if reload.clicked() {
                            *reload_requested = true;
                        }
                    });
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = self.draw_canvas(ui);
                let controls_rect = self.draw_controls(ctx, rect);
                let panel_rect = self.draw_panels(ctx, rect);
                self.draw_metric_modal(ctx);
                self.collect_container_click(ctx, controls_rect, panel_rect);
            });

        if ctx.input(|input| input.key_pressed(egui::Key::Escape)) {
            self.events.push(Event::KeyPressed(egui::Key::Escape));
        }

        let now = Instant::now();
        let had_events = !self.events.is_empty();
        for event in self.events.drain(..) {
            self.view.dispatch(event, now);
        }
        let searched = self.view.poll(now);
        let moved = self.view.advance();

        if moved || self.view.is_animating() || had_events || searched {
            ctx.request_repaint();
        } else if let Some(deadline) = self.view.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    /// Clicks inside the controls land in the container but outside every
    /// panel, which closes any open panel.
    fn collect_container_click(
        &mut self,
        ctx: &Context,
        controls: egui::Rect,
        panel: Option<egui::Rect>,
    ) {
        if self.view.node_detail().modal().is_some() {
            return;
        }

        let Some(pos) = ctx.input(|input| {
            input
                .pointer
                .primary_clicked()
                .then(|| input.pointer.interact_pos())
                .flatten()
        }) else {
            return;
        };

        let in_controls = controls.contains(pos);
        let in_panel = panel.is_some_and(|rect| rect.contains(pos));
        if in_controls && !in_panel {
            self.events.push(Event::ContainerClicked);
        }
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.view.destroy(&mut self.container);
    }
}

fn load_document(path: &Path) -> anyhow::Result<Arc<GraphDocument>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let validated = parse_document(&raw)
        .with_context(|| format!("invalid graph document {}", path.display()))?;

    if !validated.warnings.is_empty() {
        tracing::info!(
            warnings = validated.warnings.len(),
            "graph document loaded with warnings"
        );
    }
    Ok(Arc::new(validated.document))
}

impl ViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: PathBuf, options: RenderOptions) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_document(&source).map_err(|error| {
                tracing::error!("{error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready(&self, document: Arc<GraphDocument>) -> AppState {
        AppState::Ready(Box::new(Viewer::new(document, self.options)))
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph document...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.label(
                        RichText::new(format!("Error: {error}"))
                            .monospace()
                            .color(egui::Color32::from_rgb(204, 0, 0)),
                    );
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(viewer) => {
                let mut reload_requested = false;
                viewer.show(ctx, &mut reload_requested, self.reload_rx.is_some());

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.source.clone());
            return;
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(document) => self.ready(document),
                Err(error) => AppState::Error(error),
            };
        }
    }
}
