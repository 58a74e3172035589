use eframe::egui::{Color32, Vec2};

use crate::document::GraphDocument;
use crate::scales;

use super::graph::SessionGraph;
use super::layout::SimNode;
use super::viewport::Transform;

/// Gap between a node circle and the top of its label.
const LABEL_GAP: f32 = 12.0;

/// Extra slack around a line when picking edges, in layout units.
const EDGE_PICK_SLACK: f32 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeMarker {
    pub node: usize,
    pub position: Vec2,
    pub radius: f32,
    pub fill: Color32,
    pub label: String,
    /// Vertical offset of the label below the marker center.
    pub label_offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeLine {
    pub link: usize,
    pub from: Vec2,
    pub to: Vec2,
    pub stroke: Color32,
    pub width: f32,
}

/// Drawn elements of one session, in layout coordinates, plus the single
/// transform applied to the whole group.
#[derive(Debug)]
pub struct Scene {
    pub transform: Transform,
    pub nodes: Vec<NodeMarker>,
    pub edges: Vec<EdgeLine>,
}

impl Scene {
    pub fn build(document: &GraphDocument, graph: &SessionGraph) -> Self {
        let mut node_colors = scales::node_color_scale();
        let mut edge_colors = scales::link_color_scale();
        let radius_scale = scales::radius_scale();
        let weight_scale = scales::weight_scale();

        let edges = graph
            .links
            .iter()
            .enumerate()
            .map(|(index, link)| {
                let record = &document.links[link.record];
                EdgeLine {
                    link: index,
                    from: Vec2::ZERO,
                    to: Vec2::ZERO,
                    stroke: edge_colors.color(&record.kind),
                    width: weight_scale.width(record.weight),
                }
            })
            .collect();

        let nodes = document
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let radius = radius_scale.radius(node.metrics.loc);
                NodeMarker {
                    node: index,
                    position: Vec2::ZERO,
                    radius,
                    fill: node_colors.color(&node.kind),
                    label: node.name.clone(),
                    label_offset: radius + LABEL_GAP,
                }
            })
            .collect();

        Self {
            transform: Transform::IDENTITY,
            nodes,
            edges,
        }
    }

    /// Moves every marker and line endpoint to the current solver state.
    pub fn sync_positions(&mut self, graph: &SessionGraph, positions: &[SimNode]) {
        for (marker, state) in self.nodes.iter_mut().zip(positions) {
            marker.position = state.position;
        }
        for (line, link) in self.edges.iter_mut().zip(&graph.links) {
            line.from = positions[link.source].position;
            line.to = positions[link.target].position;
        }
    }

    /// Topmost marker under `point` (layout coordinates). Later markers are
    /// drawn above earlier ones.
    pub fn node_at(&self, point: Vec2, pickable: impl Fn(usize) -> bool) -> Option<usize> {
        self.nodes
            .iter()
            .rev()
            .filter(|marker| pickable(marker.node))
            .find(|marker| (marker.position - point).length() <= marker.radius)
            .map(|marker| marker.node)
    }

    /// Closest line within its half width plus slack of `point`.
    pub fn edge_at(&self, point: Vec2, pickable: impl Fn(usize) -> bool) -> Option<usize> {
        self.edges
            .iter()
            .filter(|line| pickable(line.link))
            .filter_map(|line| {
                let distance = distance_to_segment(point, line.from, line.to);
                (distance <= line.width * 0.5 + EDGE_PICK_SLACK).then_some((line.link, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(link, _)| link)
    }
}

fn distance_to_segment(point: Vec2, from: Vec2, to: Vec2) -> f32 {
    let segment = to - from;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - from).length();
    }
    let t = ((point - from).dot(segment) / length_sq).clamp(0.0, 1.0);
    (point - (from + segment * t)).length()
}
