//! Bounded statement staging and the serializer boundary
//!
//! Produced statements accumulate in a [`StatementSink`] until the staged
//! count crosses the flush threshold, at which point they are handed to
//! the external serializer in insertion order and the stage is cleared.
//! The threshold bounds peak memory on arbitrarily large tables.

use tracing::trace;

use crate::error::SinkError;
use crate::statement::Statement;

/// Default flush threshold in staged statements
///
/// Small enough to bound peak memory on multi-million-row tables.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 2048;

/// The external serializer boundary
///
/// Lifecycle: `begin` once, then any number of `serialize` calls grouped
/// into batches terminated by `flush`, then `end` once. The engine always
/// performs a final flush before `end` so staged statements are not lost.
pub trait StatementSerializer {
    /// Called once before any statement
    fn begin(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Called once per statement, in insertion order
    fn serialize(&mut self, statement: &Statement) -> Result<(), SinkError>;

    /// Batch boundary: all statements handed over since the previous
    /// flush (or `begin`) form one delivery
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Called once after the final flush
    fn end(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// In-memory staging area in front of a serializer
#[derive(Debug)]
pub struct StatementSink<S: StatementSerializer> {
    serializer: S,
    staged: Vec<Statement>,
    threshold: usize,
}

impl<S: StatementSerializer> StatementSink<S> {
    /// Create a sink with the default flush threshold
    pub fn new(serializer: S) -> Self {
        Self::with_threshold(serializer, DEFAULT_FLUSH_THRESHOLD)
    }

    /// Create a sink with an explicit flush threshold (clamped to >= 1)
    pub fn with_threshold(serializer: S, threshold: usize) -> Self {
        Self {
            serializer,
            staged: Vec::new(),
            threshold: threshold.max(1),
        }
    }

    /// Stage one statement
    pub fn append(&mut self, statement: Statement) {
        self.staged.push(statement);
    }

    /// Stage a batch of statements, preserving order
    pub fn extend(&mut self, statements: Vec<Statement>) {
        self.staged.extend(statements);
    }

    /// Number of staged statements
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Whether the stage is empty
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Configured flush threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether the staged count has reached the threshold
    pub fn over_threshold(&self) -> bool {
        self.staged.len() >= self.threshold
    }

    /// Signal the start of the serializer lifecycle
    pub fn begin(&mut self) -> Result<(), SinkError> {
        self.serializer.begin()
    }

    /// Hand all staged statements to the serializer and clear the stage
    ///
    /// An empty stage is a no-op: nothing reaches the serializer and the
    /// call never fails. On a mid-flush failure the error propagates and
    /// the staged contents are lost; there is no partial recovery.
    pub fn flush(&mut self) -> Result<(), SinkError> {
        if self.staged.is_empty() {
            return Ok(());
        }
        trace!(count = self.staged.len(), "flushing staged statements");
        // Drain clears the stage even when a serialize call fails partway.
        for statement in self.staged.drain(..) {
            self.serializer.serialize(&statement)?;
        }
        self.serializer.flush()
    }

    /// Final flush followed by the serializer's `end`
    ///
    /// Consumes the sink and returns the serializer.
    pub fn finish(mut self) -> Result<S, SinkError> {
        self.flush()?;
        self.serializer.end()?;
        Ok(self.serializer)
    }

    /// Borrow the underlying serializer
    pub fn serializer(&self) -> &S {
        &self.serializer
    }
}

/// A serializer that collects statements in memory
///
/// Records each flush delivery as a separate batch. Used to back bounded
/// previews and as a test double at the serializer boundary.
#[derive(Debug, Default)]
pub struct MemorySerializer {
    pending: Vec<Statement>,
    batches: Vec<Vec<Statement>>,
    started: bool,
    ended: bool,
}

impl MemorySerializer {
    /// Create an empty collecting serializer
    pub fn new() -> Self {
        Self::default()
    }

    /// Flush deliveries received so far, in order
    pub fn batches(&self) -> &[Vec<Statement>] {
        &self.batches
    }

    /// All statements received, across batches, in order
    pub fn statements(&self) -> Vec<&Statement> {
        self.batches.iter().flatten().collect()
    }

    /// Number of flush deliveries received
    pub fn flush_count(&self) -> usize {
        self.batches.len()
    }

    /// Whether `begin` was called
    pub fn started(&self) -> bool {
        self.started
    }

    /// Whether `end` was called
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl StatementSerializer for MemorySerializer {
    fn begin(&mut self) -> Result<(), SinkError> {
        self.started = true;
        Ok(())
    }

    fn serialize(&mut self, statement: &Statement) -> Result<(), SinkError> {
        self.pending.push(statement.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.batches.push(std::mem::take(&mut self.pending));
        Ok(())
    }

    fn end(&mut self) -> Result<(), SinkError> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Term;

    fn stmt(n: usize) -> Statement {
        Statement::new(
            format!("http://example.org/{n}"),
            "http://example.org/p",
            Term::string(format!("v{n}")),
        )
    }

    #[test]
    fn test_monotonic_staging() {
        let mut sink = StatementSink::new(MemorySerializer::new());
        for n in 0..5 {
            sink.append(stmt(n));
            assert_eq!(sink.len(), n + 1);
        }
    }

    #[test]
    fn test_empty_flush_is_noop() {
        let mut sink = StatementSink::new(MemorySerializer::new());
        sink.flush().unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.serializer().flush_count(), 0);
    }

    #[test]
    fn test_flush_preserves_order_and_clears() {
        let mut sink = StatementSink::new(MemorySerializer::new());
        sink.extend(vec![stmt(0), stmt(1), stmt(2)]);
        sink.flush().unwrap();
        assert!(sink.is_empty());
        let batches = sink.serializer().batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec![stmt(0), stmt(1), stmt(2)]);
    }

    #[test]
    fn test_threshold_crossing() {
        let mut sink = StatementSink::with_threshold(MemorySerializer::new(), 2);
        sink.append(stmt(0));
        assert!(!sink.over_threshold());
        sink.append(stmt(1));
        assert!(sink.over_threshold());
    }

    #[test]
    fn test_finish_flushes_and_ends() {
        let mut sink = StatementSink::new(MemorySerializer::new());
        sink.begin().unwrap();
        sink.append(stmt(0));
        let serializer = sink.finish().unwrap();
        assert!(serializer.started());
        assert!(serializer.ended());
        assert_eq!(serializer.flush_count(), 1);
    }

    #[test]
    fn test_failed_flush_loses_stage() {
        struct FailingSerializer {
            after: usize,
            seen: usize,
        }
        impl StatementSerializer for FailingSerializer {
            fn serialize(&mut self, _statement: &Statement) -> Result<(), SinkError> {
                if self.seen >= self.after {
                    return Err(SinkError::Rejected("full".into()));
                }
                self.seen += 1;
                Ok(())
            }
        }

        let mut sink = StatementSink::new(FailingSerializer { after: 1, seen: 0 });
        sink.extend(vec![stmt(0), stmt(1), stmt(2)]);
        assert!(sink.flush().is_err());
        assert!(sink.is_empty());
    }
}
