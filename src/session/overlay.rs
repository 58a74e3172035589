//! Per-element visual flags for the kind filter, neighbor highlight and
//! search. Each overlay owns its own flags and never writes another's.

use std::collections::HashSet;

use super::graph::SimLink;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlayFlags {
    pub hidden: bool,
    pub highlighted: bool,
    pub dimmed: bool,
    pub search_dimmed: bool,
}

/// What the render layer draws for one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Appearance {
    pub visible: bool,
    pub faded: bool,
    pub emphasized: bool,
}

impl OverlayFlags {
    pub fn appearance(self) -> Appearance {
        Appearance {
            visible: !self.hidden,
            faded: !self.hidden && (self.dimmed || self.search_dimmed),
            emphasized: self.highlighted,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindFilter {
    pub kind: String,
    pub checked: bool,
}

pub struct OverlayState {
    node_flags: Vec<OverlayFlags>,
    edge_flags: Vec<OverlayFlags>,
    filters: Vec<KindFilter>,
    focus: Option<usize>,
}

impl OverlayState {
    /// Everything visible and unflagged; one checked filter per edge kind.
    pub fn new(node_count: usize, edge_count: usize, edge_kinds: &[String]) -> Self {
        Self {
            node_flags: vec![OverlayFlags::default(); node_count],
            edge_flags: vec![OverlayFlags::default(); edge_count],
            filters: edge_kinds
                .iter()
                .map(|kind| KindFilter {
                    kind: kind.clone(),
                    checked: true,
                })
                .collect(),
            focus: None,
        }
    }

    pub fn node(&self, index: usize) -> OverlayFlags {
        self.node_flags.get(index).copied().unwrap_or_default()
    }

    pub fn edge(&self, index: usize) -> OverlayFlags {
        self.edge_flags.get(index).copied().unwrap_or_default()
    }

    pub fn filters(&self) -> &[KindFilter] {
        &self.filters
    }

    /// Node whose neighborhood is currently highlighted.
    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Shows or hides every edge of one kind. While a highlight is active
    /// the neighborhood of the focused node is recomputed over the edges
    /// that are now visible; otherwise the highlight flags are left alone.
    pub fn set_kind_visible(&mut self, links: &[SimLink], kind: usize, checked: bool) {
        let Some(filter) = self.filters.get_mut(kind) else {
            return;
        };
        filter.checked = checked;

        for (link, flags) in links.iter().zip(self.edge_flags.iter_mut()) {
            if link.kind == kind {
                flags.hidden = !checked;
            }
        }

        if let Some(focus) = self.focus {
            self.highlight(links, focus);
        }
    }

    /// Highlights `node` and its neighbors over visible edges and dims the
    /// rest. Hidden edges keep whatever highlight flags they had.
    pub fn highlight(&mut self, links: &[SimLink], node: usize) {
        if node >= self.node_flags.len() {
            return;
        }

        let mut neighborhood = HashSet::from([node]);
        for (index, link) in links.iter().enumerate() {
            if self.edge_flags[index].hidden || !link.touches(node) {
                continue;
            }
            neighborhood.insert(link.source);
            neighborhood.insert(link.target);
        }

        for (index, flags) in self.node_flags.iter_mut().enumerate() {
            let related = neighborhood.contains(&index);
            flags.highlighted = related;
            flags.dimmed = !related;
        }

        for (link, flags) in links.iter().zip(self.edge_flags.iter_mut()) {
            if flags.hidden {
                continue;
            }
            let incident = link.touches(node);
            flags.highlighted = incident;
            flags.dimmed = !incident;
        }

        self.focus = Some(node);
    }

    pub fn clear_highlight(&mut self) {
        for flags in self.node_flags.iter_mut().chain(self.edge_flags.iter_mut()) {
            flags.highlighted = false;
            flags.dimmed = false;
        }
        self.focus = None;
    }

    /// Dims every node whose name does not contain `query`, ignoring case
    /// and surrounding whitespace. An empty query clears search dimming.
    pub fn apply_search<'a>(&mut self, names: impl IntoIterator<Item = &'a str>, query: &str) {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            for flags in &mut self.node_flags {
                flags.search_dimmed = false;
            }
            return;
        }

        for (flags, name) in self.node_flags.iter_mut().zip(names) {
            flags.search_dimmed = !name.to_lowercase().contains(&query);
        }
    }
}
