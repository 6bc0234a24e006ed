//! Undo/redo change tracking for the mapping configuration
//!
//! A [`TransformChange`] pairs the configuration before and after one
//! edit. Applying writes the new configuration into the per-project
//! [`TransformSlot`] while capturing whatever was there as the previous
//! snapshot; reverting writes the previous snapshot back, or clears the
//! slot entirely when there was no prior mapping. The pair persists as a
//! stable three-line text record so the host can replay historical logs.

use std::io::{BufRead, Write};
use std::sync::{Mutex, PoisonError};

use tracing::error;

use crate::error::ChangeError;
use crate::transform::RdfTransform;

/// End-of-change marker line in the persisted record
const TERMINATOR: &str = "/ec/";

/// Guarded per-project configuration cell
///
/// Holds the project's current mapping, if any. Every operation spans its
/// read-then-write under one lock acquisition, so undo/redo racing an
/// autosave cannot observe a half-updated slot. The mutual-exclusion
/// discipline is this type's contract, not the caller's.
#[derive(Debug, Default)]
pub struct TransformSlot {
    inner: Mutex<Option<RdfTransform>>,
}

impl TransformSlot {
    /// Create an empty slot (no mapping defined)
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the slot's current mapping
    pub fn get(&self) -> Option<RdfTransform> {
        self.lock().clone()
    }

    /// Whether the slot holds no mapping
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// Swap in a new value, returning the old one, atomically
    pub fn replace(&self, value: Option<RdfTransform>) -> Option<RdfTransform> {
        std::mem::replace(&mut self.lock(), value)
    }

    /// Remove the mapping entirely
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<RdfTransform>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A (previous, current) configuration snapshot pair for one edit
///
/// Either snapshot may be absent, representing "no mapping defined".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformChange {
    current: Option<RdfTransform>,
    previous: Option<RdfTransform>,
}

impl TransformChange {
    /// Create a change record from its snapshots
    pub fn new(current: Option<RdfTransform>, previous: Option<RdfTransform>) -> Self {
        Self { current, previous }
    }

    /// The post-edit snapshot
    pub fn current(&self) -> Option<&RdfTransform> {
        self.current.as_ref()
    }

    /// The pre-edit snapshot
    pub fn previous(&self) -> Option<&RdfTransform> {
        self.previous.as_ref()
    }

    /// Apply the edit to the slot
    ///
    /// Captures the slot's current mapping as the previous snapshot, then
    /// writes the current snapshot in. Re-invocation re-captures from
    /// whatever the slot holds now (last-writer-wins on the previous
    /// pointer).
    pub fn apply(&mut self, slot: &TransformSlot) {
        self.previous = slot.replace(self.current.clone());
    }

    /// Undo the edit against the slot
    ///
    /// With no previous snapshot the slot is cleared entirely, back to
    /// "never had a mapping"; otherwise the previous snapshot is written
    /// back.
    pub fn revert(&self, slot: &TransformSlot) {
        match &self.previous {
            None => slot.clear(),
            Some(previous) => {
                slot.replace(Some(previous.clone()));
            }
        }
    }

    /// Persist the change as a three-line text record, best effort
    ///
    /// Runs during autosave: a failure is logged and swallowed, never
    /// surfaced to the user.
    pub fn save<W: Write>(&self, writer: &mut W) {
        if let Err(err) = self.write_record(writer) {
            error!(%err, "failed to write mapping change record");
        }
    }

    fn write_record<W: Write>(&self, writer: &mut W) -> Result<(), ChangeError> {
        writer.write_all(b"new=")?;
        if let Some(current) = &self.current {
            writer.write_all(serde_json::to_string(current)?.as_bytes())?;
        }
        writer.write_all(b"\n")?;
        writer.write_all(b"old=")?;
        if let Some(previous) = &self.previous {
            writer.write_all(serde_json::to_string(previous)?.as_bytes())?;
        }
        writer.write_all(b"\n")?;
        writer.write_all(TERMINATOR.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Reconstruct a change record from its persisted form
    ///
    /// Runs during recovery: every malformed input is a hard failure,
    /// since a silently wrong reconstruction is worse than stopping. A
    /// field that is absent or has an empty value yields an absent
    /// snapshot.
    pub fn load<R: BufRead>(reader: R) -> Result<Self, ChangeError> {
        let mut current = None;
        let mut previous = None;
        let mut terminated = false;

        for line in reader.lines() {
            let line = line?;
            if line == TERMINATOR {
                terminated = true;
                break;
            }
            let Some((field, value)) = line.split_once('=') else {
                return Err(ChangeError::MalformedLine(line));
            };
            if value.is_empty() {
                continue;
            }
            match field {
                "new" => current = Some(serde_json::from_str(value)?),
                "old" => previous = Some(serde_json::from_str(value)?),
                _ => {}
            }
        }

        if !terminated {
            return Err(ChangeError::MissingTerminator);
        }
        Ok(Self { current, previous })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(base: &str) -> RdfTransform {
        RdfTransform::new(base).with_prefix("ex", "http://example.org/")
    }

    #[test]
    fn test_apply_captures_previous() {
        let slot = TransformSlot::new();
        slot.replace(Some(mapping("http://example.org/a")));

        let mut change = TransformChange::new(Some(mapping("http://example.org/b")), None);
        change.apply(&slot);

        assert_eq!(change.previous(), Some(&mapping("http://example.org/a")));
        assert_eq!(slot.get(), Some(mapping("http://example.org/b")));
    }

    #[test]
    fn test_revert_restores_previous() {
        let slot = TransformSlot::new();
        slot.replace(Some(mapping("http://example.org/a")));

        let mut change = TransformChange::new(Some(mapping("http://example.org/b")), None);
        change.apply(&slot);
        change.revert(&slot);

        assert_eq!(slot.get(), Some(mapping("http://example.org/a")));
    }

    #[test]
    fn test_revert_first_apply_clears_slot() {
        let slot = TransformSlot::new();

        let mut change = TransformChange::new(Some(mapping("http://example.org/b")), None);
        change.apply(&slot);
        assert!(!slot.is_empty());

        change.revert(&slot);
        // Back to "never had a mapping", not an empty-but-present one.
        assert!(slot.is_empty());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_reapply_recaptures_previous() {
        let slot = TransformSlot::new();
        let mut change = TransformChange::new(Some(mapping("http://example.org/b")), None);
        change.apply(&slot);
        // The slot now holds b; a second apply captures b as previous.
        change.apply(&slot);
        assert_eq!(change.previous(), Some(&mapping("http://example.org/b")));
    }

    #[test]
    fn test_save_load_round_trip() {
        let change = TransformChange::new(
            Some(mapping("http://example.org/b")),
            Some(mapping("http://example.org/a")),
        );
        let mut buffer = Vec::new();
        change.save(&mut buffer);

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("new={"));
        assert!(text.ends_with("/ec/\n"));

        let loaded = TransformChange::load(&buffer[..]).unwrap();
        assert_eq!(loaded, change);
    }

    #[test]
    fn test_save_load_absent_snapshots() {
        let change = TransformChange::new(None, None);
        let mut buffer = Vec::new();
        change.save(&mut buffer);
        assert_eq!(String::from_utf8(buffer.clone()).unwrap(), "new=\nold=\n/ec/\n");

        let loaded = TransformChange::load(&buffer[..]).unwrap();
        assert_eq!(loaded.current(), None);
        assert_eq!(loaded.previous(), None);
    }

    #[test]
    fn test_load_malformed_line() {
        let text = b"new=\nbogus line\n/ec/\n";
        assert!(matches!(
            TransformChange::load(&text[..]),
            Err(ChangeError::MalformedLine(_))
        ));
    }

    #[test]
    fn test_load_missing_terminator() {
        let text = b"new=\nold=\n";
        assert!(matches!(
            TransformChange::load(&text[..]),
            Err(ChangeError::MissingTerminator)
        ));
    }

    #[test]
    fn test_load_bad_snapshot_json() {
        let text = b"new={not json\nold=\n/ec/\n";
        assert!(matches!(
            TransformChange::load(&text[..]),
            Err(ChangeError::Snapshot(_))
        ));
    }

    #[test]
    fn test_save_swallows_write_failure() {
        struct FailingWriter;
        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let change = TransformChange::new(None, None);
        // Must not panic or surface the failure.
        change.save(&mut FailingWriter);
    }
}
