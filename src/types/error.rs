use thiserror::Error;

use crate::types::Key;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Field '{field}' is too long: {actual} bytes (max: {max})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' contains a NUL byte")]
    FieldContainsNul { field: &'static str },

    #[error("ID must be non-negative, got {0}")]
    NegativeId(i64),

    #[error("ID {0} does not fit in 32 bits")]
    IdOutOfRange(i64),

    #[error("Duplicate key: {0}")]
    DuplicateKey(Key),

    #[error("Table full (capacity: {capacity} rows)")]
    TableFull { capacity: usize },

    #[error("Corrupted database: {reason}")]
    CorruptedDatabase { reason: String },

    #[error("Invalid node kind: {0}")]
    InvalidNodeKind(u8),

    #[error("Cursor is past the end of the table")]
    CursorExhausted,
}

impl DatabaseError {
    /// Validation and capacity errors leave the table untouched; the session can continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DatabaseError::FieldTooLong { .. }
                | DatabaseError::FieldContainsNul { .. }
                | DatabaseError::NegativeId(_)
                | DatabaseError::IdOutOfRange(_)
                | DatabaseError::DuplicateKey(_)
                | DatabaseError::TableFull { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
