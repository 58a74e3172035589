use std::collections::HashMap;

use crate::document::GraphDocument;

/// A document link whose endpoints both resolved to nodes of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    /// Index into `GraphDocument::links`.
    pub record: usize,
    /// Index into `SessionGraph::edge_kinds`.
    pub kind: usize,
}

impl SimLink {
    pub fn new(source: usize, target: usize, record: usize, kind: usize) -> Self {
        Self {
            source,
            target,
            record,
            kind,
        }
    }

    pub fn touches(&self, node: usize) -> bool {
        self.source == node || self.target == node
    }

    /// The endpoint opposite `node`, if the link is incident to it.
    pub fn other(&self, node: usize) -> Option<usize> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Index-based view of a document for one session. Nodes keep the document
/// order, so node `i` of the session is `document.nodes[i]`.
#[derive(Debug)]
pub struct SessionGraph {
    pub index_by_id: HashMap<String, usize>,
    pub links: Vec<SimLink>,
    /// Distinct link kinds in first-seen order over `links`.
    pub edge_kinds: Vec<String>,
    pub dangling: usize,
}

impl SessionGraph {
    pub fn build(document: &GraphDocument) -> Self {
        let index_by_id = document
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let mut edge_kinds: Vec<String> = Vec::new();
        let mut links = Vec::with_capacity(document.links.len());
        let mut dangling = 0;

        for (record, link) in document.links.iter().enumerate() {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&link.source_id),
                index_by_id.get(&link.target_id),
            ) else {
                dangling += 1;
                continue;
            };

            let kind = match edge_kinds.iter().position(|known| *known == link.kind) {
                Some(kind) => kind,
                None => {
                    edge_kinds.push(link.kind.clone());
                    edge_kinds.len() - 1
                }
            };
            links.push(SimLink::new(source, target, record, kind));
        }

        if dangling > 0 {
            tracing::debug!(dangling, "excluded links with unresolved endpoints");
        }

        Self {
            index_by_id,
            links,
            edge_kinds,
            dangling,
        }
    }

    /// Links incident to `node` in materialized order.
    pub fn incident(&self, node: usize) -> impl Iterator<Item = (usize, &SimLink)> {
        self.links
            .iter()
            .enumerate()
            .filter(move |(_, link)| link.touches(node))
    }
}
