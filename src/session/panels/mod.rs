//! Detail inspectors. Both panels are single instances that are refilled on
//! demand; the coordinator decides which one, if any, is open.

mod evidence;
mod node_detail;

pub use evidence::{EvidenceContent, EvidencePanel};
pub use node_detail::{
    ConnectionEntry, FUNCTION_VISIBLE_LIMIT, FunctionList, FunctionRow, MetricRow,
    NodeDetailContent, NodeDetailPanel,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Evidence,
    NodeDetail,
}

/// Owner of the "active panel" value. Opening one kind implicitly closes
/// the other.
#[derive(Debug, Default)]
pub struct PanelCoordinator {
    active: Option<PanelKind>,
}

impl PanelCoordinator {
    pub fn active(&self) -> Option<PanelKind> {
        self.active
    }

    pub fn open(&mut self, kind: PanelKind) {
        if self.active != Some(kind) {
            tracing::debug!(?kind, "panel opened");
        }
        self.active = Some(kind);
    }

    pub fn close(&mut self, kind: PanelKind) {
        if self.active == Some(kind) {
            self.active = None;
        }
    }

    pub fn close_all(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_one_kind_closes_the_other() {
        let mut panels = PanelCoordinator::default();
        panels.open(PanelKind::NodeDetail);
        panels.open(PanelKind::Evidence);

        assert_eq!(panels.active(), Some(PanelKind::Evidence));
    }

    #[test]
    fn closing_an_inactive_kind_is_a_no_op() {
        let mut panels = PanelCoordinator::default();
        panels.open(PanelKind::Evidence);
        panels.close(PanelKind::NodeDetail);
        assert_eq!(panels.active(), Some(PanelKind::Evidence));

        panels.close_all();
        assert_eq!(panels.active(), None);
    }
}
