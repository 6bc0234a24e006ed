//! Record-granularity traversal driver with an optional preview limit

use tracing::debug;

use crate::error::TransformError;
use crate::produce::statements_for_root;
use crate::sink::{StatementSerializer, StatementSink};
use crate::table::Record;
use crate::transform::RdfTransform;

use super::{Flow, StopReason};

/// Visits a table one logical record at a time
///
/// Shares the row visitor's staging and flush discipline, with the value
/// source spanning all rows of the record. A positive limit bounds the
/// number of records processed: once reached, further visits are refused
/// without processing. Zero means unbounded.
pub struct RecordVisitor<'a, S: StatementSerializer> {
    transform: &'a RdfTransform,
    sink: StatementSink<S>,
    limit: usize,
    visited: usize,
    truncated: bool,
}

impl<'a, S: StatementSerializer> RecordVisitor<'a, S> {
    /// Create a record visitor; `limit == 0` means unbounded
    pub fn new(transform: &'a RdfTransform, sink: StatementSink<S>, limit: usize) -> Self {
        Self {
            transform,
            sink,
            limit,
            visited: 0,
            truncated: false,
        }
    }

    /// Signal the start of the serializer lifecycle
    pub fn begin(&mut self) -> Result<(), TransformError> {
        self.sink.begin()?;
        Ok(())
    }

    /// Visit one record, or refuse it once the limit is reached
    pub fn visit(&mut self, record: &Record) -> Result<Flow, TransformError> {
        if self.limit > 0 && self.visited >= self.limit {
            self.truncated = true;
            return Ok(Flow::Stop(StopReason::LimitReached));
        }
        debug!(visited = self.visited, rows = record.rows().len(), "visiting record");
        for root in self.transform.roots() {
            let statements = statements_for_root(self.transform, root, record)?;
            self.sink.extend(statements);
            if self.sink.over_threshold() {
                self.sink.flush()?;
            }
        }
        self.visited += 1;
        Ok(Flow::Continue)
    }

    /// Records fully processed so far
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Whether the limit refused at least one record
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Unconditional final flush followed by the serializer's `end`
    pub fn finish(self) -> Result<S, TransformError> {
        Ok(self.sink.finish()?)
    }
}
