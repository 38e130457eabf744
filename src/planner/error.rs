use crate::types::error::DatabaseError;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PrepareError {
    #[error("Unrecognized keyword at start of '{0}'.")]
    UnrecognizedStatement(String),
    #[error("Unrecognized command '{0}'")]
    UnrecognizedCommand(String),
    #[error("Syntax error. Could not parse statement.")]
    Syntax,
    #[error("ID must be positive.")]
    NegativeId,
    #[error("String is too long.")]
    StringTooLong,
}

impl From<DatabaseError> for PrepareError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NegativeId(_) => PrepareError::NegativeId,
            DatabaseError::FieldTooLong { .. } => PrepareError::StringTooLong,
            _ => PrepareError::Syntax,
        }
    }
}
