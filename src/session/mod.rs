//! One interactive view of a graph document.
//!
//! [`render`] mounts a session into a [`Container`] and returns the
//! [`GraphView`] that owns all of its state. The host feeds it input as
//! [`Event`]s, calls [`GraphView::advance`] once per frame and
//! [`GraphView::poll`] to fire the search debounce. [`GraphView::destroy`]
//! reverses every side effect; afterwards the view ignores all input.

pub mod drag;
pub mod graph;
pub mod layout;
pub mod overlay;
pub mod panels;
pub mod scene;
pub mod search;
pub mod viewport;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use eframe::egui::{Key, Vec2, vec2};

use crate::document::GraphDocument;

use drag::DragController;
use graph::SessionGraph;
use layout::Simulation;
use overlay::{Appearance, KindFilter, OverlayState};
use panels::{EvidencePanel, NodeDetailPanel, PanelCoordinator, PanelKind};
use scene::Scene;
use search::{Debouncer, SEARCH_DEBOUNCE};
use viewport::{Transform, Viewport};

pub const DEFAULT_WIDTH: f32 = 960.0;
pub const DEFAULT_HEIGHT: f32 = 600.0;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderOptions {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl RenderOptions {
    pub fn size(&self) -> Vec2 {
        vec2(
            self.width.unwrap_or(DEFAULT_WIDTH),
            self.height.unwrap_or(DEFAULT_HEIGHT),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Scroll,
    Auto,
}

/// Element groups a session mounts into its container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    Canvas,
    Controls,
    EvidencePanel,
    NodeDetailPanel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mounted {
    pub session: u64,
    pub element: Element,
}

/// Host region a session renders into.
#[derive(Debug, Default)]
pub struct Container {
    pub position: Position,
    pub overflow: Overflow,
    mounted: Vec<Mounted>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted(&self) -> &[Mounted] {
        &self.mounted
    }

    fn mount(&mut self, session: u64, element: Element) {
        self.mounted.push(Mounted { session, element });
    }

    fn unmount_session(&mut self, session: u64) {
        self.mounted.retain(|mounted| mounted.session != session);
    }
}

/// Input delivered by the host. Pointer positions are container
/// coordinates; node and edge indices are session indices.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    NodeClicked { node: usize },
    EdgeClicked { edge: usize },
    /// Click on the empty canvas.
    BackgroundClicked,
    /// Click inside the container but outside the canvas and every panel.
    ContainerClicked,
    PanelCloseClicked(PanelKind),
    FilterToggled { kind: usize, checked: bool },
    SearchInput { text: String },
    KeyPressed(Key),
    DragStarted { node: usize, pointer: Vec2 },
    DragMoved { pointer: Vec2 },
    DragEnded,
    Zoomed { anchor: Vec2, factor: f32 },
    Panned { delta: Vec2 },
    /// Back to the identity transform.
    ViewReset,
    MetricInfoClicked { key: String },
    ModalCloseClicked,
    ModalBackdropClicked,
    FunctionsToggleClicked,
    /// Entry of the node-detail connection list.
    ConnectionClicked { entry: usize },
}

pub struct GraphView {
    id: u64,
    document: Arc<GraphDocument>,
    graph: SessionGraph,
    simulation: Simulation,
    viewport: Viewport,
    drag: DragController,
    overlay: OverlayState,
    search: Debouncer<String>,
    search_text: String,
    panels: PanelCoordinator,
    evidence: EvidencePanel,
    node_detail: NodeDetailPanel,
    scene: Scene,
    destroyed: bool,
}

/// Starts a session for `document` inside `container`.
///
/// A container left at `Static` position becomes `Relative` and a `Visible`
/// overflow becomes `Hidden`; explicit host choices are kept.
pub fn render(
    container: &mut Container,
    document: Arc<GraphDocument>,
    options: RenderOptions,
) -> GraphView {
    if container.position == Position::Static {
        container.position = Position::Relative;
    }
    if container.overflow == Overflow::Visible {
        container.overflow = Overflow::Hidden;
    }

    let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    let size = options.size();
    let graph = SessionGraph::build(&document);

    let simulation = Simulation::new(
        document.nodes.len(),
        graph
            .links
            .iter()
            .map(|link| (link.source, link.target))
            .collect(),
        size * 0.5,
    );
    let overlay = OverlayState::new(document.nodes.len(), graph.links.len(), &graph.edge_kinds);
    let mut scene = Scene::build(&document, &graph);
    scene.sync_positions(&graph, simulation.nodes());

    for element in [
        Element::Canvas,
        Element::Controls,
        Element::EvidencePanel,
        Element::NodeDetailPanel,
    ] {
        container.mount(id, element);
    }

    tracing::info!(
        session = id,
        nodes = document.nodes.len(),
        links = graph.links.len(),
        width = size.x,
        height = size.y,
        "graph rendered"
    );

    GraphView {
        id,
        document,
        graph,
        simulation,
        viewport: Viewport::default(),
        drag: DragController::default(),
        overlay,
        search: Debouncer::new(SEARCH_DEBOUNCE),
        search_text: String::new(),
        panels: PanelCoordinator::default(),
        evidence: EvidencePanel::default(),
        node_detail: NodeDetailPanel::default(),
        scene,
        destroyed: false,
    }
}

impl GraphView {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn document(&self) -> &GraphDocument {
        &self.document
    }

    pub fn graph(&self) -> &SessionGraph {
        &self.graph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn transform(&self) -> Transform {
        self.viewport.transform()
    }

    pub fn filters(&self) -> &[KindFilter] {
        self.overlay.filters()
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn node_appearance(&self, node: usize) -> Appearance {
        self.overlay.node(node).appearance()
    }

    pub fn edge_appearance(&self, edge: usize) -> Appearance {
        self.overlay.edge(edge).appearance()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn active_panel(&self) -> Option<PanelKind> {
        self.panels.active()
    }

    pub fn evidence(&self) -> &EvidencePanel {
        &self.evidence
    }

    pub fn node_detail(&self) -> &NodeDetailPanel {
        &self.node_detail
    }

    pub fn dragged_node(&self) -> Option<usize> {
        self.drag.active_node()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the solver still wants frames.
    pub fn is_animating(&self) -> bool {
        !self.destroyed && self.simulation.is_running()
    }

    /// When the pending search evaluation is due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.destroyed {
            return None;
        }
        self.search.deadline()
    }

    /// Runs one frame of the solver if it is still hot. Returns whether the
    /// scene moved.
    pub fn advance(&mut self) -> bool {
        if self.destroyed || !self.simulation.step() {
            return false;
        }
        self.scene.sync_positions(&self.graph, self.simulation.nodes());
        true
    }

    /// Forces one solver iteration regardless of temperature.
    pub fn tick(&mut self) {
        if self.destroyed {
            return;
        }
        self.simulation.tick();
        self.scene.sync_positions(&self.graph, self.simulation.nodes());
    }

    /// Applies the debounced search once its quiet period has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(query) = self.search.poll(now) else {
            return false;
        };

        let names = self.document.nodes.iter().map(|node| node.name.as_str());
        self.overlay.apply_search(names, &query);
        tracing::debug!(session = self.id, query = query.trim(), "search applied");
        true
    }

    pub fn dispatch(&mut self, event: Event, now: Instant) {
        if self.destroyed {
            return;
        }

        match event {
            Event::NodeClicked { node } => self.select_node(node),
            Event::EdgeClicked { edge } => self.open_evidence(edge),
            Event::BackgroundClicked => {
                self.overlay.clear_highlight();
                self.panels.close_all();
            }
            Event::ContainerClicked => self.panels.close_all(),
            Event::PanelCloseClicked(kind) => self.panels.close(kind),
            Event::FilterToggled { kind, checked } => {
                self.overlay.set_kind_visible(&self.graph.links, kind, checked);
            }
            Event::SearchInput { text } => {
                self.search.schedule(text.clone(), now);
                self.search_text = text;
            }
            Event::KeyPressed(Key::Escape) => self.node_detail.close_modal(),
            Event::KeyPressed(_) => {}
            Event::DragStarted { node, pointer } => {
                let pointer = self.viewport.transform().invert(pointer);
                self.drag.start(&mut self.simulation, node, pointer);
            }
            Event::DragMoved { pointer } => {
                let pointer = self.viewport.transform().invert(pointer);
                self.drag.drag_to(&mut self.simulation, pointer);
            }
            Event::DragEnded => self.drag.end(&mut self.simulation),
            Event::Zoomed { anchor, factor } => {
                self.viewport.zoom_at(anchor, factor);
                self.scene.transform = self.viewport.transform();
            }
            Event::Panned { delta } => {
                self.viewport.pan_by(delta);
                self.scene.transform = self.viewport.transform();
            }
            Event::ViewReset => {
                self.viewport.reset();
                self.scene.transform = self.viewport.transform();
            }
            Event::MetricInfoClicked { key } => {
                self.node_detail.open_modal(&key);
            }
            Event::ModalCloseClicked | Event::ModalBackdropClicked => {
                self.node_detail.close_modal();
            }
            Event::FunctionsToggleClicked => self.node_detail.toggle_functions(),
            Event::ConnectionClicked { entry } => {
                let target = self
                    .node_detail
                    .content()
                    .and_then(|content| content.connections.get(entry))
                    .map(|connection| connection.node);
                if let Some(node) = target {
                    self.select_node(node);
                }
            }
        }
    }

    /// Stops the solver, drops pending work and unmounts every element.
    /// Container styling is left as `render` set it.
    pub fn destroy(&mut self, container: &mut Container) {
        if self.destroyed {
            return;
        }

        self.simulation.stop();
        self.search.cancel();
        self.drag.cancel();
        self.panels.close_all();
        self.evidence.clear();
        self.node_detail.clear();
        container.unmount_session(self.id);
        self.destroyed = true;

        tracing::info!(session = self.id, "graph destroyed");
    }

    fn select_node(&mut self, node: usize) {
        if node >= self.document.nodes.len() {
            return;
        }
        self.overlay.highlight(&self.graph.links, node);
        if self.node_detail.show(&self.document, &self.graph, node) {
            self.panels.open(PanelKind::NodeDetail);
        }
    }

    fn open_evidence(&mut self, edge: usize) {
        if self.overlay.edge(edge).hidden {
            return;
        }
        if self.evidence.show(&self.document, &self.graph, edge) {
            self.panels.open(PanelKind::Evidence);
        }
    }
}
