mod format;
mod validate;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

pub use format::{
    Block, MetricDescription, Segment, format_metric_label, format_metric_value, metric_description,
};
pub use validate::{
    SUPPORTED_VERSIONS, SchemaError, SchemaWarning, Validated, parse_document, validate,
};

/// A validated graph of source files (nodes) and their relationships (links).
///
/// Immutable once validated; render sessions share it behind an `Arc`.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphDocument {
    pub schema_version: String,
    pub meta: GraphMeta,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct GraphMeta {
    pub fields: Map<String, Value>,
}

impl GraphMeta {
    pub fn repo(&self) -> Option<&str> {
        self.fields.get("repo").and_then(Value::as_str)
    }

    pub fn generated_at(&self) -> Option<&str> {
        self.fields.get("generated_at").and_then(Value::as_str)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: String,
    pub language: String,
    pub name: String,
    pub metrics: Metrics,
    pub tags: Vec<String>,
}

/// Scalar aggregates for a node. `None` means "not computed".
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub loc: Option<f64>,
    #[serde(default)]
    pub cc: Option<f64>,
    #[serde(default)]
    pub mi: Option<f64>,
    #[serde(default)]
    pub max_cc: Option<f64>,
    #[serde(default)]
    pub median_cc: Option<f64>,
    #[serde(default)]
    pub mi_min: Option<f64>,
    #[serde(default)]
    pub mi_median: Option<f64>,
    #[serde(default)]
    pub functions: Option<Vec<FunctionMetrics>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Metrics {
    /// Scalar metrics in display order: the three core keys always, the
    /// optional aggregates when computed, then any extra numeric or null keys.
    pub fn scalar_entries(&self) -> Vec<(&str, Option<f64>)> {
        let mut entries = vec![("loc", self.loc), ("cc", self.cc), ("mi", self.mi)];

        let optional = [
            ("max_cc", self.max_cc),
            ("median_cc", self.median_cc),
            ("mi_min", self.mi_min),
            ("mi_median", self.mi_median),
        ];
        entries.extend(optional.into_iter().filter(|(_, value)| value.is_some()));

        for (key, value) in &self.extra {
            match value {
                Value::Null => entries.push((key.as_str(), None)),
                Value::Number(number) => entries.push((key.as_str(), number.as_f64())),
                _ => {}
            }
        }

        entries
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FunctionMetrics {
    pub name: String,
    pub line: u32,
    pub cc: f64,
    pub loc: f64,
    #[serde(default)]
    pub mi: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Link {
    #[serde(rename = "source")]
    pub source_id: String,
    #[serde(rename = "target")]
    pub target_id: String,
    pub kind: String,
    pub weight: f64,
    pub evidence: Vec<Evidence>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Evidence {
    pub file: String,
    pub line: u32,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    pub(crate) fn sample_json() -> Value {
        json!({
            "schema_version": "1.0",
            "meta": { "repo": "test-repo", "generated_at": "2025-01-01T00:00:00Z" },
            "nodes": [
                {
                    "id": "res://main.gd",
                    "kind": "script",
                    "language": "gdscript",
                    "name": "main.gd",
                    "metrics": { "loc": 100, "cc": 5, "mi": 70 },
                    "tags": ["entry"]
                },
                {
                    "id": "res://player.gd",
                    "kind": "script",
                    "language": "gdscript",
                    "name": "player.gd",
                    "metrics": { "loc": 200, "cc": 10, "mi": 60 },
                    "tags": []
                },
                {
                    "id": "res://enemy.tscn",
                    "kind": "scene",
                    "language": "tscn",
                    "name": "Enemy.tscn",
                    "metrics": { "loc": null, "cc": null, "mi": null },
                    "tags": []
                },
                {
                    "id": "res://hud.gd",
                    "kind": "script",
                    "language": "gdscript",
                    "name": "hud.gd",
                    "metrics": { "loc": 40, "cc": 2, "mi": 88 },
                    "tags": ["ui"]
                }
            ],
            "links": [
                {
                    "source": "res://main.gd",
                    "target": "res://player.gd",
                    "kind": "preload",
                    "weight": 1,
                    "evidence": [{ "file": "main.gd", "line": 3 }]
                },
                {
                    "source": "res://main.gd",
                    "target": "res://enemy.tscn",
                    "kind": "instance",
                    "weight": 4,
                    "evidence": [
                        { "file": "main.gd", "line": 10 },
                        { "file": "main.gd", "line": 22 }
                    ]
                },
                {
                    "source": "res://player.gd",
                    "target": "res://hud.gd",
                    "kind": "calls",
                    "weight": 2,
                    "evidence": []
                },
                {
                    "source": "res://hud.gd",
                    "target": "res://missing.gd",
                    "kind": "calls",
                    "weight": 1,
                    "evidence": []
                }
            ]
        })
    }

    pub(crate) fn sample_document() -> super::GraphDocument {
        match super::validate(&sample_json()) {
            Ok(validated) => validated.document,
            Err(error) => panic!("fixture must validate: {error}"),
        }
    }
}
