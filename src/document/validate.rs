use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use super::GraphDocument;

pub const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Structural problems that stop a document from rendering at all.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Graph data must be a non-null object")]
    NotAnObject,

    #[error("Missing or invalid schema_version")]
    MissingVersion,

    #[error("Unsupported schema_version \"{found}\". Supported: {}", SUPPORTED_VERSIONS.join(", "))]
    UnsupportedVersion { found: String },

    #[error("meta must be a non-null object")]
    InvalidMeta,

    #[error("{collection} must be an array")]
    NotAnArray { collection: &'static str },

    #[error("{collection}[{index}] must have {expected} \"{field}\"")]
    InvalidField {
        collection: &'static str,
        index: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("Duplicate node IDs detected")]
    DuplicateNodeIds,

    #[error("malformed graph document: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Consistency problems that are reported but do not block rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaWarning {
    FunctionsNotArray { index: usize },
    MetricNotNumeric { index: usize, key: &'static str },
    MalformedFunction { index: usize, function: usize },
    DanglingSource { id: String },
    DanglingTarget { id: String },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FunctionsNotArray { index } => {
                write!(f, "nodes[{index}].metrics.functions should be an array")
            }
            Self::MetricNotNumeric { index, key } => {
                write!(f, "nodes[{index}].metrics.{key} should be a number or null")
            }
            Self::MalformedFunction { index, function } => write!(
                f,
                "nodes[{index}].metrics.functions[{function}] needs a string name, \
                 an integer line and numeric cc and loc"
            ),
            Self::DanglingSource { id } => {
                write!(f, "link source \"{id}\" does not match any node id")
            }
            Self::DanglingTarget { id } => {
                write!(f, "link target \"{id}\" does not match any node id")
            }
        }
    }
}

#[derive(Debug)]
pub struct Validated {
    pub document: GraphDocument,
    pub warnings: Vec<SchemaWarning>,
}

#[derive(Clone, Copy)]
enum Expect {
    String,
    Number,
    Array,
    Object,
}

impl Expect {
    fn matches(self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::String, Some(Value::String(_))) => true,
            (Self::Number, Some(Value::Number(_))) => true,
            (Self::Array, Some(Value::Array(_))) => true,
            (Self::Object, Some(Value::Object(_))) => true,
            _ => false,
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Number => "a number",
            Self::Array => "an array",
            Self::Object => "a non-null object",
        }
    }
}

const NODE_FIELDS: [(&str, Expect); 6] = [
    ("id", Expect::String),
    ("name", Expect::String),
    ("kind", Expect::String),
    ("language", Expect::String),
    ("metrics", Expect::Object),
    ("tags", Expect::Array),
];

/// Metric keys decoded as optional numbers.
const SCALAR_METRICS: [&str; 7] = [
    "loc",
    "cc",
    "mi",
    "max_cc",
    "median_cc",
    "mi_min",
    "mi_median",
];

const LINK_FIELDS: [(&str, Expect); 5] = [
    ("source", Expect::String),
    ("target", Expect::String),
    ("kind", Expect::String),
    ("weight", Expect::Number),
    ("evidence", Expect::Array),
];

pub fn parse_document(raw: &str) -> Result<Validated, SchemaError> {
    let value: Value = serde_json::from_str(raw).map_err(SchemaError::Json)?;
    validate(&value)
}

/// Checks an untyped document against the graph shape and converts it.
///
/// Fails on the first structural violation. Dangling link endpoints and
/// malformed optional metrics are only warned about: a non-numeric scalar
/// metric is dropped, a malformed function entry is dropped from its list,
/// and a non-array `functions` value is dropped entirely.
pub fn validate(raw: &Value) -> Result<Validated, SchemaError> {
    let object = raw.as_object().ok_or(SchemaError::NotAnObject)?;

    let version = object
        .get("schema_version")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingVersion)?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(SchemaError::UnsupportedVersion {
            found: version.to_owned(),
        });
    }

    if !matches!(object.get("meta"), Some(Value::Object(_))) {
        return Err(SchemaError::InvalidMeta);
    }

    let mut warnings = Vec::new();

    let nodes = object
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or(SchemaError::NotAnArray {
            collection: "nodes",
        })?;
    let mut cleaned_metrics = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        check_fields(node.as_object(), "nodes", index, &NODE_FIELDS)?;

        if let Some(metrics) = node.get("metrics").and_then(Value::as_object)
            && let Some(cleaned) = clean_metrics(index, metrics, &mut warnings)
        {
            cleaned_metrics.push((index, cleaned));
        }
    }

    let links = object
        .get("links")
        .and_then(Value::as_array)
        .ok_or(SchemaError::NotAnArray {
            collection: "links",
        })?;
    for (index, link) in links.iter().enumerate() {
        check_fields(link.as_object(), "links", index, &LINK_FIELDS)?;
    }

    let mut node_ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if let Some(id) = node.get("id").and_then(Value::as_str)
            && !node_ids.insert(id)
        {
            return Err(SchemaError::DuplicateNodeIds);
        }
    }

    for link in links {
        if let Some(source) = link.get("source").and_then(Value::as_str)
            && !node_ids.contains(source)
        {
            report(
                &mut warnings,
                SchemaWarning::DanglingSource {
                    id: source.to_owned(),
                },
            );
        }
        if let Some(target) = link.get("target").and_then(Value::as_str)
            && !node_ids.contains(target)
        {
            report(
                &mut warnings,
                SchemaWarning::DanglingTarget {
                    id: target.to_owned(),
                },
            );
        }
    }

    let document = if cleaned_metrics.is_empty() {
        GraphDocument::deserialize_value(raw)?
    } else {
        let mut cleaned = raw.clone();
        if let Some(nodes) = cleaned.get_mut("nodes").and_then(Value::as_array_mut) {
            for (index, metrics) in cleaned_metrics {
                if let Some(node) = nodes.get_mut(index).and_then(Value::as_object_mut) {
                    node.insert("metrics".to_owned(), Value::Object(metrics));
                }
            }
        }
        GraphDocument::deserialize_value(&cleaned)?
    };

    Ok(Validated { document, warnings })
}

fn report(warnings: &mut Vec<SchemaWarning>, warning: SchemaWarning) {
    tracing::warn!(%warning, "graph document warning");
    warnings.push(warning);
}

/// Returns a copy of `metrics` without the optional values the decoder
/// would reject, or `None` when everything is usable as-is.
fn clean_metrics(
    index: usize,
    metrics: &Map<String, Value>,
    warnings: &mut Vec<SchemaWarning>,
) -> Option<Map<String, Value>> {
    let mut cleaned: Option<Map<String, Value>> = None;

    for key in SCALAR_METRICS {
        if metrics
            .get(key)
            .is_some_and(|value| !value.is_number() && !value.is_null())
        {
            report(warnings, SchemaWarning::MetricNotNumeric { index, key });
            cleaned.get_or_insert_with(|| metrics.clone()).remove(key);
        }
    }

    match metrics.get("functions") {
        None => {}
        Some(Value::Array(functions)) => {
            if functions.iter().all(is_valid_function) {
                return cleaned;
            }
            let mut kept = Vec::with_capacity(functions.len());
            for (function, entry) in functions.iter().enumerate() {
                if is_valid_function(entry) {
                    kept.push(entry.clone());
                } else {
                    report(
                        warnings,
                        SchemaWarning::MalformedFunction { index, function },
                    );
                }
            }
            cleaned
                .get_or_insert_with(|| metrics.clone())
                .insert("functions".to_owned(), Value::Array(kept));
        }
        Some(_) => {
            report(warnings, SchemaWarning::FunctionsNotArray { index });
            cleaned
                .get_or_insert_with(|| metrics.clone())
                .remove("functions");
        }
    }

    cleaned
}

fn is_valid_function(entry: &Value) -> bool {
    let Some(function) = entry.as_object() else {
        return false;
    };
    let line_fits = function
        .get("line")
        .and_then(Value::as_u64)
        .is_some_and(|line| u32::try_from(line).is_ok());

    function.get("name").is_some_and(Value::is_string)
        && line_fits
        && function.get("cc").is_some_and(Value::is_number)
        && function.get("loc").is_some_and(Value::is_number)
        && function
            .get("mi")
            .is_none_or(|mi| mi.is_number() || mi.is_null())
}

fn check_fields(
    entry: Option<&Map<String, Value>>,
    collection: &'static str,
    index: usize,
    fields: &[(&'static str, Expect)],
) -> Result<(), SchemaError> {
    for &(field, expect) in fields {
        let value = entry.and_then(|entry| entry.get(field));
        if !expect.matches(value) {
            return Err(SchemaError::InvalidField {
                collection,
                index,
                field,
                expected: expect.phrase(),
            });
        }
    }
    Ok(())
}

impl GraphDocument {
    fn deserialize_value(value: &Value) -> Result<Self, SchemaError> {
        <Self as serde::Deserialize>::deserialize(value).map_err(SchemaError::Decode)
    }
}
