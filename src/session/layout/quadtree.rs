use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    /// Square around `points`, padded by one unit. `None` for no points or
    /// any non-finite coordinate.
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (mut min, mut max) = (first, first);
        for &point in points {
            if !point.x.is_finite() || !point.y.is_finite() {
                return None;
            }
            min = min.min(point);
            max = max.max(point);
        }

        let extent = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: extent * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared gap between two squares; zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = Vec2::splat(self.half_extent + other.half_extent);
        ((self.center - other.center).abs() - reach)
            .max(Vec2::ZERO)
            .length_sq()
    }

    /// Bit 0 set for the right half, bit 1 for the lower half.
    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let toward = |bit: usize| if quadrant & bit == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(toward(1), toward(2)),
            half_extent: quarter,
        }
    }
}

pub(super) struct Cell {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    /// Largest collision radius of any point below this cell.
    pub(super) max_radius: f32,
    start: usize,
    end: usize,
    children: [Option<usize>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Region quadtree stored as a flat arena. The points below any cell are a
/// contiguous run of `order`, so cells only keep a range into it.
pub(super) struct QuadTree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

impl QuadTree {
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let bounds = QuadBounds::enclosing(positions)?;
        let mut tree = Self {
            cells: Vec::new(),
            order: (0..positions.len()).collect(),
        };
        tree.subdivide(bounds, 0, positions.len(), 0, positions, radii);
        Some(tree)
    }

    pub(super) fn root(&self) -> &Cell {
        &self.cells[0]
    }

    /// Every point index below `cell`.
    pub(super) fn points(&self, cell: &Cell) -> &[usize] {
        &self.order[cell.start..cell.end]
    }

    pub(super) fn children(&self, cell: &Cell) -> [Option<&Cell>; 4] {
        cell.children.map(|child| child.map(|id| &self.cells[id]))
    }

    fn subdivide(
        &mut self,
        bounds: QuadBounds,
        start: usize,
        end: usize,
        depth: usize,
        positions: &[Vec2],
        radii: &[f32],
    ) -> usize {
        let mut center_of_mass = Vec2::ZERO;
        let mut max_radius = 0.0_f32;
        for &index in &self.order[start..end] {
            center_of_mass += positions[index];
            max_radius = max_radius.max(radii.get(index).copied().unwrap_or(0.0));
        }
        let mass = (end - start) as f32;
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let id = self.cells.len();
        self.cells.push(Cell {
            bounds,
            center_of_mass,
            mass,
            max_radius,
            start,
            end,
            children: [None; 4],
        });

        if depth >= MAX_DEPTH || end - start <= LEAF_CAPACITY {
            return id;
        }

        self.order[start..end].sort_by_key(|&index| bounds.quadrant(positions[index]));

        let mut from = start;
        for quadrant in 0..4 {
            let mut to = from;
            while to < end && bounds.quadrant(positions[self.order[to]]) == quadrant {
                to += 1;
            }
            if to > from {
                let child =
                    self.subdivide(bounds.child(quadrant), from, to, depth + 1, positions, radii);
                self.cells[id].children[quadrant] = Some(child);
            }
            from = to;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_points(tree: &QuadTree, cell: &Cell, out: &mut Vec<usize>) {
        if cell.is_leaf() {
            out.extend_from_slice(tree.points(cell));
            return;
        }
        for child in tree.children(cell).into_iter().flatten() {
            leaf_points(tree, child, out);
        }
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = (0..100)
            .map(|index| vec2((index % 10) as f32 * 13.0, (index / 10) as f32 * 7.0))
            .collect::<Vec<_>>();
        let tree = QuadTree::build(&positions, &[]).unwrap();

        let mut seen = Vec::new();
        leaf_points(&tree, tree.root(), &mut seen);
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        assert_eq!(tree.root().mass, 100.0);
        assert!(!tree.root().is_leaf());
    }

    #[test]
    fn child_cells_contain_their_points() {
        let positions = (0..40)
            .map(|index| vec2((index * 37 % 200) as f32, (index * 53 % 120) as f32))
            .collect::<Vec<_>>();
        let tree = QuadTree::build(&positions, &[]).unwrap();

        for child in tree.children(tree.root()).into_iter().flatten() {
            for &index in tree.points(child) {
                assert!(child.bounds.contains(positions[index]));
            }
        }
    }

    #[test]
    fn cells_track_the_largest_radius_below_them() {
        let positions = (0..20)
            .map(|index| vec2(index as f32 * 10.0, 0.0))
            .collect::<Vec<_>>();
        let mut radii = vec![5.0; 20];
        radii[17] = 30.0;
        let tree = QuadTree::build(&positions, &radii).unwrap();

        assert_eq!(tree.root().max_radius, 30.0);
        let without_large = tree
            .children(tree.root())
            .into_iter()
            .flatten()
            .filter(|cell| !tree.points(cell).contains(&17))
            .collect::<Vec<_>>();
        assert!(!without_large.is_empty());
        assert!(without_large.iter().all(|cell| cell.max_radius == 5.0));
    }

    #[test]
    fn coincident_points_stop_at_the_depth_limit() {
        let positions = vec![vec2(3.0, 3.0); 20];
        let tree = QuadTree::build(&positions, &[]).unwrap();
        let mut seen = Vec::new();
        leaf_points(&tree, tree.root(), &mut seen);
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn empty_or_non_finite_input_builds_nothing() {
        assert!(QuadTree::build(&[], &[]).is_none());
        assert!(QuadTree::build(&[vec2(f32::NAN, 0.0)], &[]).is_none());
    }

    #[test]
    fn gap_is_zero_for_touching_squares() {
        let a = QuadBounds {
            center: vec2(0.0, 0.0),
            half_extent: 5.0,
        };
        let b = QuadBounds {
            center: vec2(10.0, 0.0),
            half_extent: 5.0,
        };
        let c = QuadBounds {
            center: vec2(20.0, 20.0),
            half_extent: 5.0,
        };
        assert_eq!(a.gap_sq(b), 0.0);
        assert_eq!(a.gap_sq(c), 200.0);
    }
}
