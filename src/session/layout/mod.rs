//! Continuous force-directed layout.
//!
//! Each tick applies link attraction, many-body repulsion, centering and
//! collision avoidance as velocity changes, then integrates positions. The
//! solver cools along an alpha schedule and stops once alpha drops below
//! [`ALPHA_MIN`]; any restart resumes it.

mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use forces::{ChargeParams, Collider, accumulate_charge_for_node, jiggle};
use quadtree::QuadTree;

pub const LINK_DISTANCE: f32 = 100.0;
pub const CHARGE_STRENGTH: f32 = -200.0;
pub const COLLISION_RADIUS: f32 = 20.0;
pub const ALPHA_MIN: f32 = 0.001;
pub const DRAG_ALPHA_TARGET: f32 = 0.3;

const VELOCITY_DECAY: f32 = 0.4;
const BARNES_HUT_THETA: f32 = 0.9;
const INITIAL_RADIUS: f32 = 10.0;

/// Mutable simulation state for one node. `pinned` overrides the solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimNode {
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
}

pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<(usize, usize)>,
    link_strengths: Vec<f32>,
    link_bias: Vec<f32>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    alpha_decay: f32,
    running: bool,
    ticks: u64,
    scratch: Scratch,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    deltas: Vec<Vec2>,
    radii: Vec<f32>,
}

impl Simulation {
    /// Places `node_count` nodes on a phyllotaxis spiral around `center`.
    /// Link endpoints must be valid node indices.
    pub fn new(node_count: usize, links: Vec<(usize, usize)>, center: Vec2) -> Self {
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        let nodes = (0..node_count)
            .map(|index| {
                let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
                let angle = index as f32 * golden_angle;
                SimNode {
                    position: center + vec2(radius * angle.cos(), radius * angle.sin()),
                    velocity: Vec2::ZERO,
                    pinned: None,
                }
            })
            .collect::<Vec<_>>();

        let mut degree = vec![0usize; node_count];
        for &(source, target) in &links {
            degree[source] += 1;
            degree[target] += 1;
        }

        let link_strengths = links
            .iter()
            .map(|&(source, target)| 1.0 / degree[source].min(degree[target]).max(1) as f32)
            .collect();
        let link_bias = links
            .iter()
            .map(|&(source, target)| {
                degree[source] as f32 / (degree[source] + degree[target]).max(1) as f32
            })
            .collect();

        Self {
            nodes,
            links,
            link_strengths,
            link_bias,
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
            running: true,
            ticks: 0,
            scratch: Scratch {
                radii: vec![COLLISION_RADIUS; node_count],
                ..Scratch::default()
            },
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&SimNode> {
        self.nodes.get(index)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn restart(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = Some(position);
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = None;
        }
    }

    /// Advances one frame if the solver is running. Returns whether a tick
    /// happened; the solver stops itself once cooled.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.tick();
        if self.alpha < ALPHA_MIN {
            self.running = false;
            tracing::debug!(ticks = self.ticks, "layout settled");
        }
        true
    }

    /// One solver iteration regardless of the running state.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.ticks += 1;

        if self.nodes.is_empty() {
            return;
        }

        self.apply_links();
        self.apply_charge();
        self.apply_centering();
        self.apply_collisions();

        for node in &mut self.nodes {
            match node.pinned {
                Some(pinned) => {
                    node.position = pinned;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity *= 1.0 - VELOCITY_DECAY;
                    node.position += node.velocity;
                }
            }
        }
    }

    fn apply_links(&mut self) {
        for (index, &(source, target)) in self.links.iter().enumerate() {
            if source == target {
                continue;
            }

            let source_node = self.nodes[source];
            let target_node = self.nodes[target];
            let mut delta = (target_node.position + target_node.velocity)
                - (source_node.position + source_node.velocity);
            if delta == Vec2::ZERO {
                delta = jiggle(source, target);
            }

            let distance = delta.length();
            let pull =
                ((distance - LINK_DISTANCE) / distance) * self.alpha * self.link_strengths[index];
            let correction = delta * pull;
            let bias = self.link_bias[index];

            self.nodes[target].velocity -= correction * bias;
            self.nodes[source].velocity += correction * (1.0 - bias);
        }
    }

    fn apply_charge(&mut self) {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));

        let Some(tree) = QuadTree::build(&scratch.positions, &scratch.radii) else {
            return;
        };

        let params = ChargeParams {
            scaled_strength: CHARGE_STRENGTH * self.alpha,
            theta: BARNES_HUT_THETA,
        };
        for (index, node) in self.nodes.iter_mut().enumerate() {
            accumulate_charge_for_node(
                &tree,
                tree.root(),
                index,
                &scratch.positions,
                params,
                &mut node.velocity,
            );
        }
    }

    fn apply_centering(&mut self) {
        let mut centroid = Vec2::ZERO;
        for node in &self.nodes {
            centroid += node.position;
        }
        centroid /= self.nodes.len() as f32;

        let shift = self.center - centroid;
        if shift.length_sq() > 0.0 {
            for node in &mut self.nodes {
                node.position += shift;
            }
        }
    }

    fn apply_collisions(&mut self) {
        let node_count = self.nodes.len();
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position + node.velocity));
        scratch.deltas.clear();
        scratch.deltas.resize(node_count, Vec2::ZERO);

        let Some(tree) = QuadTree::build(&scratch.positions, &scratch.radii) else {
            return;
        };

        let collider = Collider {
            tree: &tree,
            positions: &scratch.positions,
            radii: &scratch.radii,
            strength: 1.0,
        };
        collider.accumulate(tree.root(), tree.root(), true, &mut scratch.deltas);

        for (node, delta) in self.nodes.iter_mut().zip(&scratch.deltas) {
            node.velocity += *delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(count: usize) -> Simulation {
        let links = (1..count).map(|index| (index - 1, index)).collect();
        Simulation::new(count, links, vec2(480.0, 300.0))
    }

    fn run_until_settled(simulation: &mut Simulation) -> usize {
        let mut steps = 0;
        while simulation.step() {
            steps += 1;
            assert!(steps < 10_000, "simulation never settled");
        }
        steps
    }

    #[test]
    fn cools_and_stops_on_its_own() {
        let mut simulation = chain(6);
        let steps = run_until_settled(&mut simulation);
        assert!(steps > 250 && steps < 400);
        assert!(!simulation.is_running());
        assert!(!simulation.step());
    }

    #[test]
    fn centroid_tracks_the_viewport_center() {
        let mut simulation = chain(8);
        run_until_settled(&mut simulation);

        let mut centroid = Vec2::ZERO;
        for node in simulation.nodes() {
            centroid += node.position;
        }
        centroid /= simulation.nodes().len() as f32;
        assert!((centroid - vec2(480.0, 300.0)).length() < 5.0);
    }

    #[test]
    fn settled_nodes_keep_their_distance() {
        let mut simulation = Simulation::new(12, Vec::new(), vec2(0.0, 0.0));
        run_until_settled(&mut simulation);

        let nodes = simulation.nodes();
        for (index, a) in nodes.iter().enumerate() {
            for b in &nodes[index + 1..] {
                assert!((a.position - b.position).length() > COLLISION_RADIUS);
            }
        }
    }

    #[test]
    fn linked_pairs_approach_the_link_distance() {
        let mut simulation = Simulation::new(2, vec![(0, 1)], vec2(0.0, 0.0));
        run_until_settled(&mut simulation);
        let distance = (simulation.nodes()[0].position - simulation.nodes()[1].position).length();
        assert!(distance > 60.0 && distance < 200.0, "distance was {distance}");
    }

    #[test]
    fn pinned_nodes_hold_position_but_still_push_neighbors() {
        let mut simulation = chain(3);
        let anchor = vec2(100.0, 100.0);
        simulation.pin(1, anchor);

        let before = simulation.nodes()[0].position;
        for _ in 0..20 {
            simulation.tick();
        }
        assert_eq!(simulation.nodes()[1].position, anchor);
        assert_eq!(simulation.nodes()[1].velocity, Vec2::ZERO);
        assert_ne!(simulation.nodes()[0].position, before);

        simulation.unpin(1);
        simulation.tick();
        assert_ne!(simulation.nodes()[1].position, anchor);
    }

    #[test]
    fn alpha_target_keeps_the_solver_warm() {
        let mut simulation = chain(4);
        run_until_settled(&mut simulation);

        simulation.set_alpha_target(DRAG_ALPHA_TARGET);
        simulation.restart();
        for _ in 0..2_000 {
            assert!(simulation.step());
        }
        assert!(simulation.alpha() > 0.29);

        simulation.set_alpha_target(0.0);
        run_until_settled(&mut simulation);
        assert!(simulation.alpha() < ALPHA_MIN);
    }
}
