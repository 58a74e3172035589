use crate::document::GraphDocument;
use crate::session::graph::SessionGraph;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvidenceContent {
    /// `"<source name> → <target name>"`.
    pub title: String,
    pub kind_line: String,
    /// One `file:line` entry per evidence record, in document order.
    pub entries: Vec<String>,
}

/// Inspector for the provenance records of one edge.
#[derive(Debug, Default)]
pub struct EvidencePanel {
    link: Option<usize>,
    content: Option<EvidenceContent>,
}

impl EvidencePanel {
    /// Session link index the panel was last filled for.
    pub fn link(&self) -> Option<usize> {
        self.link
    }

    pub fn content(&self) -> Option<&EvidenceContent> {
        self.content.as_ref()
    }

    /// Refills the panel for session link `link`. Returns false for an
    /// unknown link, leaving the previous content in place.
    pub fn show(&mut self, document: &GraphDocument, graph: &SessionGraph, link: usize) -> bool {
        let Some(sim_link) = graph.links.get(link) else {
            return false;
        };
        let record = &document.links[sim_link.record];
        let source = &document.nodes[sim_link.source];
        let target = &document.nodes[sim_link.target];

        self.link = Some(link);
        self.content = Some(EvidenceContent {
            title: format!("{} \u{2192} {}", source.name, target.name),
            kind_line: format!("Kind: {}", record.kind),
            entries: record
                .evidence
                .iter()
                .map(|evidence| format!("{}:{}", evidence.file, evidence.line))
                .collect(),
        });
        true
    }

    pub fn clear(&mut self) {
        self.link = None;
        self.content = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::sample_document;

    #[test]
    fn lists_evidence_in_order() {
        let document = sample_document();
        let graph = SessionGraph::build(&document);
        let mut panel = EvidencePanel::default();

        assert!(panel.show(&document, &graph, 1));
        let content = panel.content().unwrap();
        assert_eq!(content.title, "main.gd \u{2192} Enemy.tscn");
        assert_eq!(content.kind_line, "Kind: instance");
        assert_eq!(content.entries, vec!["main.gd:10", "main.gd:22"]);
    }

    #[test]
    fn unknown_links_keep_the_previous_content() {
        let document = sample_document();
        let graph = SessionGraph::build(&document);
        let mut panel = EvidencePanel::default();

        panel.show(&document, &graph, 2);
        assert!(!panel.show(&document, &graph, 3));
        assert_eq!(panel.link(), Some(2));
        assert!(panel.content().unwrap().entries.is_empty());
    }
}
