//! Traversal drivers over rows and records
//!
//! Both drivers share one visitation contract: a visit returns
//! [`Flow::Continue`] or [`Flow::Stop`] with an inspectable reason, and
//! any resolution or sink failure aborts with an error before the current
//! unit stages anything. The row driver is unbounded (full export); the
//! record driver adds an optional result limit for bounded previews.

mod record;
mod row;

pub use record::RecordVisitor;
pub use row::RowVisitor;

use thiserror::Error;

use crate::error::TransformError;
use crate::sink::{StatementSerializer, StatementSink};
use crate::table::{Record, Row};
use crate::transform::RdfTransform;

/// Outcome of one row or record visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep visiting
    Continue,
    /// Stop visiting; the reason is inspectable by the caller
    Stop(StopReason),
}

/// Why a driver refused further visits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The record driver reached its configured result limit
    LimitReached,
}

/// A traversal aborted by a resolution or sink failure
///
/// Carries the index of the row or record where the abort happened so the
/// caller can report a single error summary.
#[derive(Debug, Error)]
#[error("export aborted at unit {index}: {source}")]
pub struct ExportAborted {
    /// Zero-based index of the failing row or record
    pub index: usize,
    #[source]
    pub source: TransformError,
}

/// Summary of a completed traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    /// Rows or records fully processed
    pub visited: usize,
    /// Whether a preview limit cut the traversal short
    pub truncated: bool,
}

/// Export every row of a table through the sink
///
/// Calls the serializer's `begin` once, visits each row, and always
/// performs a final flush (plus `end`) on success. On failure returns the
/// index of the row that aborted the export.
pub fn export_rows<S, I>(
    transform: &RdfTransform,
    rows: I,
    sink: StatementSink<S>,
) -> Result<(ExportReport, S), ExportAborted>
where
    S: StatementSerializer,
    I: IntoIterator<Item = Row>,
{
    let mut visitor = RowVisitor::new(transform, sink);
    visitor
        .begin()
        .map_err(|source| ExportAborted { index: 0, source })?;
    for (index, row) in rows.into_iter().enumerate() {
        match visitor.visit(&row) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop(_)) => break,
            Err(source) => return Err(ExportAborted { index, source }),
        }
    }
    let visited = visitor.visited();
    let serializer = visitor.finish().map_err(|source| ExportAborted {
        index: visited.saturating_sub(1),
        source,
    })?;
    Ok((
        ExportReport {
            visited,
            truncated: false,
        },
        serializer,
    ))
}

/// Preview up to `limit` records through the sink
///
/// A limit of zero means unbounded. Hitting the limit is a success with
/// `truncated: true` in the report, not an error.
pub fn preview_records<S, I>(
    transform: &RdfTransform,
    records: I,
    sink: StatementSink<S>,
    limit: usize,
) -> Result<(ExportReport, S), ExportAborted>
where
    S: StatementSerializer,
    I: IntoIterator<Item = Record>,
{
    let mut visitor = RecordVisitor::new(transform, sink, limit);
    visitor
        .begin()
        .map_err(|source| ExportAborted { index: 0, source })?;
    for (index, record) in records.into_iter().enumerate() {
        match visitor.visit(&record) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop(StopReason::LimitReached)) => break,
            Err(source) => return Err(ExportAborted { index, source }),
        }
    }
    let visited = visitor.visited();
    let truncated = visitor.truncated();
    let serializer = visitor.finish().map_err(|source| ExportAborted {
        index: visited.saturating_sub(1),
        source,
    })?;
    Ok((ExportReport { visited, truncated }, serializer))
}
