//! Row, record, and cell value types
//!
//! The host's table storage is an external collaborator; the engine only
//! needs sequential iteration and named cell lookup. [`ValueSource`]
//! abstracts over "current row" and "current record" so the statement
//! producer can walk either with one contract.

use std::collections::BTreeMap;

use crate::vocab::xsd;

/// A typed table cell value
///
/// Typed values keep their XSD datatype when turned into literals;
/// plain text stays untyped. A text cell that is empty or
/// whitespace-only is absent and contributes no statement.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// ISO 8601 date (`YYYY-MM-DD`)
    Date(String),
    /// ISO 8601 date-time
    DateTime(String),
}

impl CellValue {
    /// Create a text cell value
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Lexical form of the value
    pub fn lexical(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Date(s) | CellValue::DateTime(s) => s.clone(),
        }
    }

    /// Intrinsic XSD datatype, if the value is typed
    pub fn datatype(&self) -> Option<&'static str> {
        match self {
            CellValue::Text(_) => None,
            CellValue::Integer(_) => Some(xsd::INTEGER),
            CellValue::Float(_) => Some(xsd::DOUBLE),
            CellValue::Boolean(_) => Some(xsd::BOOLEAN),
            CellValue::Date(_) => Some(xsd::DATE),
            CellValue::DateTime(_) => Some(xsd::DATE_TIME),
        }
    }

    /// Whether the value counts as absent for statement production
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }
}

/// Named cell lookup over one row or one multi-row record
///
/// `bindings()` is the number of physical rows bound: one for a row, the
/// row count for a record. The producer resolves row-derived values once
/// per binding.
pub trait ValueSource {
    /// Number of physical rows bound by this source
    fn bindings(&self) -> usize;

    /// Cell value for `column` in binding `binding`, if present
    fn cell(&self, column: &str, binding: usize) -> Option<&CellValue>;
}

/// A single physical table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell value
    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// Build a row from column/value pairs
    pub fn from_pairs<I, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, CellValue)>,
        C: Into<String>,
    {
        let mut row = Row::new();
        for (column, value) in pairs {
            row.set(column, value);
        }
        row
    }

    /// Look up a cell by column name
    pub fn cell(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

impl ValueSource for Row {
    fn bindings(&self) -> usize {
        1
    }

    fn cell(&self, column: &str, binding: usize) -> Option<&CellValue> {
        if binding != 0 {
            return None;
        }
        self.cells.get(column)
    }
}

/// A logical record: one or more contiguous rows treated as one unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    rows: Vec<Row>,
}

impl Record {
    /// Create a record from its rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// The record's rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl ValueSource for Record {
    fn bindings(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, column: &str, binding: usize) -> Option<&CellValue> {
        self.rows.get(binding)?.cell(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_forms() {
        assert_eq!(CellValue::Integer(42).lexical(), "42");
        assert_eq!(CellValue::Boolean(true).lexical(), "true");
        assert_eq!(CellValue::text("Ann").lexical(), "Ann");
    }

    #[test]
    fn test_datatypes() {
        assert_eq!(CellValue::Integer(1).datatype(), Some(xsd::INTEGER));
        assert_eq!(CellValue::Date("2024-01-01".into()).datatype(), Some(xsd::DATE));
        assert_eq!(CellValue::text("Ann").datatype(), None);
    }

    #[test]
    fn test_absent_values() {
        assert!(CellValue::text("").is_absent());
        assert!(CellValue::text("   ").is_absent());
        assert!(!CellValue::text("x").is_absent());
        assert!(!CellValue::Integer(0).is_absent());
    }

    #[test]
    fn test_row_source() {
        let row = Row::from_pairs([("id", CellValue::text("1"))]);
        assert_eq!(row.bindings(), 1);
        assert_eq!(
            ValueSource::cell(&row, "id", 0),
            Some(&CellValue::text("1"))
        );
        assert_eq!(ValueSource::cell(&row, "id", 1), None);
        assert_eq!(ValueSource::cell(&row, "other", 0), None);
    }

    #[test]
    fn test_record_source_spans_rows() {
        let record = Record::new(vec![
            Row::from_pairs([("name", CellValue::text("Ann"))]),
            Row::from_pairs([("name", CellValue::text("Bob"))]),
        ]);
        assert_eq!(record.bindings(), 2);
        assert_eq!(
            record.cell("name", 1),
            Some(&CellValue::text("Bob"))
        );
        assert_eq!(record.cell("name", 2), None);
    }
}
