use crate::{planner::error::PrepareError, types::row::Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

impl Statement {
    /// Turns one input line into a validated statement.
    ///
    /// `insert <id> <username> <email>` and `select` (trailing tokens ignored) are accepted.
    pub fn prepare(input: &str) -> Result<Statement, PrepareError> {
        let mut tokens = input.split_whitespace();
        match tokens.next() {
            Some("insert") => Self::prepare_insert(tokens),
            Some("select") => Ok(Statement::Select),
            _ => Err(PrepareError::UnrecognizedStatement(input.to_string())),
        }
    }

    fn prepare_insert<'a>(
        mut tokens: impl Iterator<Item = &'a str>,
    ) -> Result<Statement, PrepareError> {
        let (Some(id), Some(username), Some(email), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(PrepareError::Syntax);
        };

        let id: i64 = id.parse().map_err(|_| PrepareError::Syntax)?;
        let row = Row::new(id, username, email)?;
        Ok(Statement::Insert(row))
    }
}
