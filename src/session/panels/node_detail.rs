use crate::document::{
    FunctionMetrics, GraphDocument, MetricDescription, format_metric_label, format_metric_value,
    metric_description,
};
use crate::session::graph::SessionGraph;

/// Functions shown before the list is expanded.
pub const FUNCTION_VISIBLE_LIMIT: usize = 5;

const CC_WARNING_ABOVE: f64 = 10.0;
const MI_WARNING_BELOW: f64 = 65.0;

#[derive(Clone, Debug, PartialEq)]
pub struct MetricRow {
    pub key: String,
    pub label: String,
    pub value: String,
    /// Present when the metric has a long-form description.
    pub help: Option<&'static MetricDescription>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionRow {
    pub name: String,
    pub line: String,
    pub loc: String,
    pub cc: String,
    pub mi: String,
    pub cc_warning: bool,
    pub mi_warning: bool,
}

impl FunctionRow {
    fn from_metrics(function: &FunctionMetrics) -> Self {
        Self {
            name: function.name.clone(),
            line: format!("L{}", function.line),
            loc: format_metric_value(Some(function.loc)),
            cc: format_metric_value(Some(function.cc)),
            mi: format_metric_value(function.mi),
            cc_warning: function.cc > CC_WARNING_ABOVE,
            mi_warning: function.mi.is_some_and(|mi| mi < MI_WARNING_BELOW),
        }
    }
}

/// Functions ordered by complexity, most complex first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionList {
    rows: Vec<FunctionRow>,
}

impl FunctionList {
    fn new(functions: &[FunctionMetrics]) -> Option<Self> {
        if functions.is_empty() {
            return None;
        }
        let mut sorted = functions.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| b.cc.total_cmp(&a.cc));
        Some(Self {
            rows: sorted.into_iter().map(FunctionRow::from_metrics).collect(),
        })
    }

    pub fn heading(&self) -> String {
        format!("Functions ({})", self.rows.len())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_overflow(&self) -> bool {
        self.rows.len() > FUNCTION_VISIBLE_LIMIT
    }

    pub fn visible_rows(&self, expanded: bool) -> &[FunctionRow] {
        if expanded || !self.has_overflow() {
            &self.rows
        } else {
            &self.rows[..FUNCTION_VISIBLE_LIMIT]
        }
    }

    /// Label of the expand/collapse control, if the list overflows.
    pub fn toggle_label(&self, expanded: bool) -> Option<String> {
        if !self.has_overflow() {
            return None;
        }
        Some(if expanded {
            "Show less".to_owned()
        } else {
            format!("Show all ({})", self.rows.len())
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionEntry {
    /// Session index of the node at the other end.
    pub node: usize,
    pub link: usize,
    pub outgoing: bool,
    /// Arrow plus the other node's name, e.g. `→ player.gd`.
    pub label: String,
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetailContent {
    pub title: String,
    pub info: Vec<(&'static str, String)>,
    pub metrics: Vec<MetricRow>,
    pub functions: Option<FunctionList>,
    pub connections: Vec<ConnectionEntry>,
}

impl NodeDetailContent {
    pub fn connections_heading(&self) -> String {
        format!("Connections ({})", self.connections.len())
    }

    fn build(document: &GraphDocument, graph: &SessionGraph, node: usize) -> Option<Self> {
        let record = document.nodes.get(node)?;

        let mut info = vec![
            ("ID", record.id.clone()),
            ("Kind", record.kind.clone()),
            ("Language", record.language.clone()),
        ];
        if !record.tags.is_empty() {
            info.push(("Tags", record.tags.join(", ")));
        }

        let metrics = record
            .metrics
            .scalar_entries()
            .into_iter()
            .map(|(key, value)| MetricRow {
                key: key.to_owned(),
                label: format_metric_label(key),
                value: format_metric_value(value),
                help: metric_description(key),
            })
            .collect();

        let connections = graph
            .incident(node)
            .filter_map(|(index, link)| {
                let other = link.other(node)?;
                let outgoing = link.source == node;
                let arrow = if outgoing { '\u{2192}' } else { '\u{2190}' };
                Some(ConnectionEntry {
                    node: other,
                    link: index,
                    outgoing,
                    label: format!("{arrow} {}", document.nodes[other].name),
                    kind: document.links[link.record].kind.clone(),
                })
            })
            .collect();

        Some(Self {
            title: record.name.clone(),
            info,
            metrics,
            functions: record
                .metrics
                .functions
                .as_deref()
                .and_then(FunctionList::new),
            connections,
        })
    }
}

/// Inspector for one node, with its stacked metric-description modal.
#[derive(Debug, Default)]
pub struct NodeDetailPanel {
    node: Option<usize>,
    content: Option<NodeDetailContent>,
    functions_expanded: bool,
    modal: Option<&'static MetricDescription>,
}

impl NodeDetailPanel {
    pub fn node(&self) -> Option<usize> {
        self.node
    }

    pub fn content(&self) -> Option<&NodeDetailContent> {
        self.content.as_ref()
    }

    pub fn functions_expanded(&self) -> bool {
        self.functions_expanded
    }

    /// Refills the panel for `node`; the function list starts collapsed.
    pub fn show(&mut self, document: &GraphDocument, graph: &SessionGraph, node: usize) -> bool {
        let Some(content) = NodeDetailContent::build(document, graph, node) else {
            return false;
        };
        self.node = Some(node);
        self.content = Some(content);
        self.functions_expanded = false;
        true
    }

    pub fn toggle_functions(&mut self) {
        let overflows = self
            .content
            .as_ref()
            .and_then(|content| content.functions.as_ref())
            .is_some_and(FunctionList::has_overflow);
        if overflows {
            self.functions_expanded = !self.functions_expanded;
        }
    }

    pub fn modal(&self) -> Option<&'static MetricDescription> {
        self.modal
    }

    /// Opens the description for `key`, replacing any open modal.
    pub fn open_modal(&mut self, key: &str) -> bool {
        match metric_description(key) {
            Some(description) => {
                self.modal = Some(description);
                true
            }
            None => false,
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    pub fn clear(&mut self) {
        self.node = None;
        self.content = None;
        self.functions_expanded = false;
        self.modal = None;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::document::{fixtures::sample_document, validate};

    fn document_with_functions(count: usize) -> GraphDocument {
        let functions = (0..count)
            .map(|index| {
                let mi = if index == 0 {
                    Value::Null
                } else {
                    json!(60 + index)
                };
                json!({
                    "name": format!("fn_{index}"),
                    "line": index * 10 + 1,
                    "cc": index + 8,
                    "loc": 12,
                    "mi": mi
                })
            })
            .collect::<Vec<_>>();

        let raw = json!({
            "schema_version": "1.0",
            "meta": {},
            "nodes": [{
                "id": "a",
                "kind": "script",
                "language": "gdscript",
                "name": "a.gd",
                "metrics": { "loc": 80, "cc": null, "mi": 70, "functions": functions },
                "tags": []
            }],
            "links": []
        });
        validate(&raw).unwrap().document
    }

    fn show(document: &GraphDocument, node: usize) -> NodeDetailPanel {
        let graph = SessionGraph::build(document);
        let mut panel = NodeDetailPanel::default();
        assert!(panel.show(document, &graph, node));
        panel
    }

    #[test]
    fn info_and_metric_rows() {
        let document = sample_document();
        let panel = show(&document, 0);
        let content = panel.content().unwrap();

        assert_eq!(content.title, "main.gd");
        assert_eq!(
            content.info,
            vec![
                ("ID", "res://main.gd".to_owned()),
                ("Kind", "script".to_owned()),
                ("Language", "gdscript".to_owned()),
                ("Tags", "entry".to_owned()),
            ]
        );

        let labels = content
            .metrics
            .iter()
            .map(|row| (row.label.as_str(), row.value.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(labels, vec![("LOC", "100"), ("CC", "5"), ("MI", "70")]);
        assert!(content.metrics.iter().all(|row| row.help.is_some()));
        assert!(content.functions.is_none());
    }

    #[test]
    fn null_metrics_render_as_dashes() {
        let document = sample_document();
        let panel = show(&document, 2);
        let content = panel.content().unwrap();
        assert!(content.metrics.iter().all(|row| row.value == "\u{2014}"));
        assert_eq!(content.info.len(), 3);
    }

    #[test]
    fn connections_carry_direction_and_kind() {
        let document = sample_document();
        let panel = show(&document, 1);
        let content = panel.content().unwrap();

        assert_eq!(content.connections_heading(), "Connections (2)");
        assert_eq!(content.connections[0].label, "\u{2190} main.gd");
        assert_eq!(content.connections[0].kind, "preload");
        assert!(!content.connections[0].outgoing);
        assert_eq!(content.connections[1].label, "\u{2192} hud.gd");
        assert_eq!(content.connections[1].node, 3);
    }

    #[test]
    fn functions_sort_by_complexity_and_collapse_past_five() {
        let document = document_with_functions(7);
        let mut panel = show(&document, 0);
        let functions = panel.content().unwrap().functions.clone().unwrap();

        assert_eq!(functions.heading(), "Functions (7)");
        let visible = functions.visible_rows(panel.functions_expanded());
        assert_eq!(visible.len(), FUNCTION_VISIBLE_LIMIT);
        assert_eq!(visible[0].name, "fn_6");
        assert_eq!(visible[0].line, "L61");
        assert!(visible[0].cc_warning);
        assert_eq!(
            functions.toggle_label(false).as_deref(),
            Some("Show all (7)")
        );

        panel.toggle_functions();
        assert!(panel.functions_expanded());
        assert_eq!(functions.visible_rows(true).len(), 7);
        assert_eq!(functions.toggle_label(true).as_deref(), Some("Show less"));

        let last = &functions.visible_rows(true)[6];
        assert_eq!(last.name, "fn_0");
        assert_eq!(last.mi, "\u{2014}");
        assert!(!last.mi_warning && !last.cc_warning);
    }

    #[test]
    fn short_function_lists_have_no_toggle() {
        let document = document_with_functions(3);
        let mut panel = show(&document, 0);
        let functions = panel.content().unwrap().functions.clone().unwrap();

        assert_eq!(functions.toggle_label(false), None);
        assert_eq!(functions.visible_rows(false).len(), 3);
        assert!(functions.visible_rows(false)[1].mi_warning);
        panel.toggle_functions();
        assert!(!panel.functions_expanded());
    }

    #[test]
    fn reopening_collapses_the_function_list() {
        let document = document_with_functions(6);
        let graph = SessionGraph::build(&document);
        let mut panel = NodeDetailPanel::default();
        panel.show(&document, &graph, 0);
        panel.toggle_functions();
        panel.show(&document, &graph, 0);
        assert!(!panel.functions_expanded());
    }

    #[test]
    fn a_second_modal_replaces_the_first() {
        let mut panel = NodeDetailPanel::default();
        assert!(panel.open_modal("cc"));
        assert!(panel.open_modal("mi_min"));
        assert_eq!(panel.modal().map(|modal| modal.key), Some("mi_min"));

        assert!(!panel.open_modal("churn"));
        assert_eq!(panel.modal().map(|modal| modal.key), Some("mi_min"));

        panel.close_modal();
        assert!(panel.modal().is_none());
    }
}
