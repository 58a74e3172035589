//! Interactive force-directed viewer for codebase dependency graphs.
//!
//! The library holds the headless core: the graph document and its schema
//! validator, the visual scales, and the interactive session (layout solver,
//! viewport, drag, overlay flags and detail panels). The binary hosts a
//! session inside an eframe window.

pub mod document;
pub mod scales;
pub mod session;

pub use document::{GraphDocument, SchemaError, Validated, parse_document, validate};
pub use session::{Container, Event, GraphView, RenderOptions, render};
