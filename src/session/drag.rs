use eframe::egui::Vec2;

use super::layout::{DRAG_ALPHA_TARGET, Simulation};

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveDrag {
    node: usize,
    /// Node position minus pointer position at grab time.
    grab_offset: Vec2,
}

/// One drag gesture at a time: idle -> active -> idle.
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    pub fn active_node(&self) -> Option<usize> {
        self.active.map(|drag| drag.node)
    }

    /// Seizes `node` and pins it where it currently is. `pointer` is in
    /// layout coordinates.
    pub fn start(&mut self, simulation: &mut Simulation, node: usize, pointer: Vec2) {
        let Some(position) = simulation.node(node).map(|state| state.position) else {
            return;
        };

        if let Some(previous) = self.active.take() {
            simulation.unpin(previous.node);
        } else {
            simulation.set_alpha_target(DRAG_ALPHA_TARGET);
            simulation.restart();
        }

        simulation.pin(node, position);
        self.active = Some(ActiveDrag {
            node,
            grab_offset: position - pointer,
        });
    }

    pub fn drag_to(&mut self, simulation: &mut Simulation, pointer: Vec2) {
        if let Some(drag) = self.active {
            simulation.pin(drag.node, pointer + drag.grab_offset);
        }
    }

    /// Releases the pinned node back to the solver and lets it cool.
    pub fn end(&mut self, simulation: &mut Simulation) {
        if let Some(drag) = self.active.take() {
            simulation.unpin(drag.node);
            simulation.set_alpha_target(0.0);
        }
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn settled() -> Simulation {
        let mut simulation = Simulation::new(3, vec![(0, 1), (1, 2)], vec2(0.0, 0.0));
        while simulation.step() {}
        simulation
    }

    #[test]
    fn drag_reheats_pins_and_releases() {
        let mut simulation = settled();
        let mut drag = DragController::default();
        assert!(!simulation.is_running());

        let grabbed_at = simulation.nodes()[1].position;
        drag.start(&mut simulation, 1, grabbed_at + vec2(2.0, 0.0));
        assert!(simulation.is_running());
        assert_eq!(simulation.alpha_target(), DRAG_ALPHA_TARGET);
        assert_eq!(simulation.nodes()[1].pinned, Some(grabbed_at));
        assert_eq!(drag.active_node(), Some(1));

        drag.drag_to(&mut simulation, vec2(52.0, 40.0));
        simulation.step();
        assert_eq!(simulation.nodes()[1].position, vec2(50.0, 40.0));

        drag.end(&mut simulation);
        assert_eq!(drag.active_node(), None);
        assert_eq!(simulation.nodes()[1].pinned, None);
        assert_eq!(simulation.alpha_target(), 0.0);
    }

    #[test]
    fn moves_and_ends_without_a_gesture_are_ignored() {
        let mut simulation = settled();
        let mut drag = DragController::default();
        drag.drag_to(&mut simulation, vec2(10.0, 10.0));
        drag.end(&mut simulation);
        assert!(simulation.nodes().iter().all(|node| node.pinned.is_none()));
        assert!(!simulation.is_running());
    }

    #[test]
    fn unknown_nodes_cannot_be_grabbed() {
        let mut simulation = settled();
        let mut drag = DragController::default();
        drag.start(&mut simulation, 99, Vec2::ZERO);
        assert_eq!(drag.active_node(), None);
        assert!(!simulation.is_running());
    }
}
