//! Error types for the netCDF writer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for frame and container operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested open mode or operation is not implemented
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Name is empty or contains characters the container cannot store
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// Dimension, variable or attribute name already defined
    #[error("Name already in use: {0}")]
    NameInUse(String),

    /// Structural change attempted after the header was written
    #[error("Operation requires define mode")]
    NotInDefineMode,

    /// Data access attempted before the header was written
    #[error("Operation not allowed in define mode")]
    InDefineMode,

    /// Only one unlimited dimension may exist per file
    #[error("Unlimited dimension already defined")]
    UnlimitedInUse,

    /// Dimension id unknown, or record dimension not in the leading position
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Variable id unknown
    #[error("Invalid variable id: {0}")]
    InvalidVariable(usize),

    /// Variable name not present in the file
    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    /// Hyperslab start index lies outside a fixed dimension
    #[error("Index exceeds dimension bound: start {start} on axis {axis} (length {len})")]
    IndexOutOfBounds { axis: usize, start: usize, len: usize },

    /// Hyperslab start + count lies outside a fixed dimension
    #[error("Start + count exceeds dimension bound on axis {axis}: {start} + {count} > {len}")]
    EdgeExceeds { axis: usize, start: usize, count: usize, len: usize },

    /// Byte buffer does not match the declared shape and element size
    #[error("Data size mismatch: expected {expected} bytes, got {actual}")]
    DataSizeMismatch { expected: usize, actual: usize },

    /// Value does not fit the selected on-disk format
    #[error("Format limit exceeded: {0}")]
    FormatLimit(String),

    /// Attribute whose type is undefined reached the writer
    #[error("Attribute {0:?} has undefined data type")]
    UndefinedAttributeType(String),

    /// String attribute exceeds the configured string size
    #[error("String attribute {name:?} is {len} bytes, maximum is {max}")]
    AttributeTooLong { name: String, len: usize, max: usize },

    /// Frame does not match the schema fixed when the file was opened
    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    /// Frame is structurally invalid
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Write or close attempted without an open file
    #[error("No file is open")]
    NotOpen,

    /// File is not a valid netCDF classic file
    #[error("Invalid netCDF file: {0}")]
    InvalidFormat(String),

    /// File is truncated or corrupted
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    Mmap(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Create an unsupported-operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create an invalid file format error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a schema mismatch error.
    pub fn mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::SchemaMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result type alias for writer operations.
pub type Result<T> = std::result::Result<T, Error>;
