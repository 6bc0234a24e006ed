//! Tabular-to-RDF mapping engine
//!
//! This crate maps table rows and records into RDF statements under a
//! user-authored mapping tree, streaming the statements to a serializer
//! while bounding memory on large inputs.
//!
//! # Key pieces
//!
//! - **Mapping tree** ([`transform`]): resource nodes with property edges
//!   down to literal or resource leaves, plus base IRI and prefix
//!   declarations; serializes to a JSON document that round-trips.
//! - **Statement producer** ([`produce`]): walks one root node over one
//!   row or record and returns its statements; absent cell values
//!   contribute nothing and are not errors.
//! - **Bounded sink** ([`sink`]): stages statements and hands them to the
//!   external serializer once a flush threshold is reached, bounding peak
//!   memory on arbitrarily large tables.
//! - **Traversal drivers** ([`visit`]): row-at-a-time export and
//!   record-at-a-time preview with an optional result limit, sharing one
//!   visitation contract with inspectable stop reasons.
//! - **Change tracking** ([`change`]): undo/redo snapshot pairs applied
//!   to a guarded per-project slot, persisted as a stable three-line
//!   record.
//!
//! # Usage
//!
//! Build an [`RdfTransform`], `validate()` it, then run
//! [`visit::export_rows`] or [`visit::preview_records`] with a
//! [`sink::StatementSink`] over your serializer.

pub mod change;
pub mod error;
pub mod produce;
pub mod sink;
pub mod statement;
pub mod table;
pub mod transform;
pub mod visit;
pub mod vocab;

pub use change::{TransformChange, TransformSlot};
pub use error::{ChangeError, ResolutionError, SinkError, TransformError};
pub use produce::statements_for_root;
pub use sink::{MemorySerializer, StatementSerializer, StatementSink, DEFAULT_FLUSH_THRESHOLD};
pub use statement::{Statement, Term};
pub use table::{CellValue, Record, Row, ValueSource};
pub use transform::{LiteralNode, Node, PropertyEdge, RdfTransform, ResourceNode, ValueMapping};
pub use visit::{
    export_rows, preview_records, ExportAborted, ExportReport, Flow, RecordVisitor, RowVisitor,
    StopReason,
};
