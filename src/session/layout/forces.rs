use eframe::egui::{Vec2, vec2};

use super::quadtree::{Cell, QuadTree};

const DISTANCE_MIN_SQ: f32 = 1.0;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Charge strength already scaled by the current alpha.
    pub(super) scaled_strength: f32,
    pub(super) theta: f32,
}

/// Deterministic stand-in for a random nudge when two points coincide.
pub(super) fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-6
}

fn charge_between(point: Vec2, other: Vec2, index: usize, other_index: usize, scaled: f32) -> Vec2 {
    let mut delta = other - point;
    if delta == Vec2::ZERO {
        delta = jiggle(index, other_index);
    }
    let mut distance_sq = delta.length_sq();
    if distance_sq < DISTANCE_MIN_SQ {
        distance_sq = (DISTANCE_MIN_SQ * distance_sq).sqrt();
    }
    delta * (scaled / distance_sq)
}

/// Many-body velocity contribution on `index`, approximating distant cells
/// by their centroid (Barnes-Hut).
pub(super) fn accumulate_charge_for_node(
    tree: &QuadTree,
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other_index in tree.points(cell) {
            if other_index == index {
                continue;
            }
            *velocity += charge_between(
                point,
                positions[other_index],
                index,
                other_index,
                params.scaled_strength,
            );
        }
        return;
    }

    let delta = cell.center_of_mass - point;
    let distance_sq = delta.length_sq().max(DISTANCE_MIN_SQ);
    let distance = distance_sq.sqrt();
    let can_approximate =
        !cell.bounds.contains(point) && (cell.bounds.side_length() / distance) < params.theta;

    if can_approximate {
        *velocity += delta * ((params.scaled_strength * cell.mass) / distance_sq);
        return;
    }

    for child in tree.children(cell).into_iter().flatten() {
        accumulate_charge_for_node(tree, child, index, positions, params, velocity);
    }
}

fn resolve_overlap(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    let mut delta = positions[from] - positions[to];
    if delta == Vec2::ZERO {
        delta = jiggle(from, to);
    }

    let min_distance = radii[from] + radii[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let push = delta * (((min_distance - distance) / distance) * strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = to_sq / (from_sq + to_sq);

    deltas[from] += push * share;
    deltas[to] -= push * (1.0 - share);
}

/// Separates every pair of points closer than the sum of their radii.
pub(super) struct Collider<'a> {
    pub(super) tree: &'a QuadTree,
    pub(super) positions: &'a [Vec2],
    pub(super) radii: &'a [f32],
    pub(super) strength: f32,
}

impl Collider<'_> {
    /// Visits only cell pairs whose widest points could still reach each
    /// other. `same` means `a` and `b` are the same cell.
    pub(super) fn accumulate(&self, a: &Cell, b: &Cell, same: bool, deltas: &mut [Vec2]) {
        let reach = a.max_radius + b.max_radius;
        if a.bounds.gap_sq(b.bounds) >= reach * reach {
            return;
        }

        if a.is_leaf() && b.is_leaf() {
            let from_points = self.tree.points(a);
            for (offset, &from) in from_points.iter().enumerate() {
                let to_points = if same {
                    &from_points[offset + 1..]
                } else {
                    self.tree.points(b)
                };
                for &to in to_points {
                    resolve_overlap(from, to, self.positions, self.radii, self.strength, deltas);
                }
            }
            return;
        }

        if same {
            let children = self.tree.children(a);
            for (first, child_a) in children.iter().enumerate() {
                let Some(child_a) = child_a else {
                    continue;
                };
                self.accumulate(child_a, child_a, true, deltas);
                for child_b in children[first + 1..].iter().flatten() {
                    self.accumulate(child_a, child_b, false, deltas);
                }
            }
            return;
        }

        let split_a = !a.is_leaf() && (b.is_leaf() || a.bounds.half_extent >= b.bounds.half_extent);
        if split_a {
            for child in self.tree.children(a).into_iter().flatten() {
                self.accumulate(child, b, false, deltas);
            }
        } else {
            for child in self.tree.children(b).into_iter().flatten() {
                self.accumulate(a, child, false, deltas);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_pushes_points_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadTree::build(&positions, &[]).unwrap();
        let mut velocity = Vec2::ZERO;
        accumulate_charge_for_node(
            &tree,
            tree.root(),
            0,
            &positions,
            ChargeParams {
                scaled_strength: -200.0,
                theta: 0.9,
            },
            &mut velocity,
        );
        assert!(velocity.x < 0.0);
        assert!(velocity.y.abs() < 1e-6);
    }

    #[test]
    fn overlapping_pairs_are_separated_symmetrically() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(500.0, 500.0)];
        let radii = vec![20.0; 3];
        let tree = QuadTree::build(&positions, &radii).unwrap();
        let mut deltas = vec![Vec2::ZERO; 3];
        let collider = Collider {
            tree: &tree,
            positions: &positions,
            radii: &radii,
            strength: 1.0,
        };
        collider.accumulate(tree.root(), tree.root(), true, &mut deltas);
        assert!(deltas[0].x < 0.0);
        assert!(deltas[1].x > 0.0);
        assert!((deltas[0].x + deltas[1].x).abs() < 1e-4);
        assert_eq!(deltas[2], Vec2::ZERO);
    }

    #[test]
    fn a_wide_point_reaches_across_cells() {
        let mut positions = (0..12)
            .map(|index| vec2(index as f32 * 100.0, 0.0))
            .collect::<Vec<_>>();
        positions.push(vec2(560.0, 40.0));
        let mut radii = vec![5.0; 13];
        radii[12] = 80.0;
        let tree = QuadTree::build(&positions, &radii).unwrap();
        let mut deltas = vec![Vec2::ZERO; 13];
        let collider = Collider {
            tree: &tree,
            positions: &positions,
            radii: &radii,
            strength: 1.0,
        };
        collider.accumulate(tree.root(), tree.root(), true, &mut deltas);

        assert!(deltas[12].y > 0.0);
        assert!(deltas[5].y < 0.0 || deltas[6].y < 0.0);
        assert_eq!(deltas[0], Vec2::ZERO);
    }
}
