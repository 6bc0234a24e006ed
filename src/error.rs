//! Error types for the mapping engine

use thiserror::Error;

/// Identifier or prefix resolution errors
///
/// Raised while validating a mapping tree or while resolving authored
/// identifiers during statement production. An absent cell value is not a
/// resolution error; it simply produces no statement.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// An authored identifier uses a prefix that is not declared
    #[error("unknown prefix '{prefix}' in '{value}'")]
    UnknownPrefix { prefix: String, value: String },

    /// The mapping's base IRI is not an absolute IRI
    #[error("base IRI '{0}' is not absolute")]
    RelativeBase(String),
}

/// Staging or serializer failures during a flush
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O failure from the external serializer
    #[error("serializer I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The serializer rejected the staged statements
    #[error("serializer rejected statements: {0}")]
    Rejected(String),
}

/// Failures while persisting or recovering a mapping change record
#[derive(Debug, Error)]
pub enum ChangeError {
    /// I/O failure reading or writing the change record
    #[error("change record I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// A line in the change record is not `field=value`
    #[error("malformed change record line: {0:?}")]
    MalformedLine(String),

    /// The change record ended before its `/ec/` terminator
    #[error("change record missing terminator line")]
    MissingTerminator,

    /// A snapshot field held invalid mapping JSON
    #[error("invalid mapping snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Umbrella error returned by the traversal drivers
///
/// Either failure aborts the current row or record; no partial statement
/// set for that unit is emitted.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
