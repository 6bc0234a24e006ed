//! Row-granularity traversal driver

use crate::error::TransformError;
use crate::produce::statements_for_root;
use crate::sink::{StatementSerializer, StatementSink};
use crate::table::Row;
use crate::transform::RdfTransform;

use super::Flow;

/// Visits a table one row at a time, staging statements per root node
///
/// The flush threshold is checked after each root's contribution, never
/// mid-subject, so one subject's statements land in one delivery. Any
/// failure aborts before the current root stages anything.
pub struct RowVisitor<'a, S: StatementSerializer> {
    transform: &'a RdfTransform,
    sink: StatementSink<S>,
    visited: usize,
}

impl<'a, S: StatementSerializer> RowVisitor<'a, S> {
    /// Create a row visitor over a mapping and a sink
    pub fn new(transform: &'a RdfTransform, sink: StatementSink<S>) -> Self {
        Self {
            transform,
            sink,
            visited: 0,
        }
    }

    /// Signal the start of the serializer lifecycle
    pub fn begin(&mut self) -> Result<(), TransformError> {
        self.sink.begin()?;
        Ok(())
    }

    /// Visit one row: produce and stage statements for every root
    pub fn visit(&mut self, row: &Row) -> Result<Flow, TransformError> {
        for root in self.transform.roots() {
            let statements = statements_for_root(self.transform, root, row)?;
            self.sink.extend(statements);
            if self.sink.over_threshold() {
                self.sink.flush()?;
            }
        }
        self.visited += 1;
        Ok(Flow::Continue)
    }

    /// Rows fully processed so far
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Unconditional final flush followed by the serializer's `end`
    pub fn finish(self) -> Result<S, TransformError> {
        Ok(self.sink.finish()?)
    }
}
