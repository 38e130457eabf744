use crate::planner::error::PrepareError;

// Non-SQL statements like .exit are called "meta-commands".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    BTree,
    Constants,
}

impl MetaCommand {
    pub fn is_meta(input: &str) -> bool {
        input.starts_with('.')
    }

    pub fn parse(input: &str) -> Result<MetaCommand, PrepareError> {
        match input.trim() {
            ".exit" => Ok(MetaCommand::Exit),
            ".btree" => Ok(MetaCommand::BTree),
            ".constants" => Ok(MetaCommand::Constants),
            _ => Err(PrepareError::UnrecognizedCommand(input.to_string())),
        }
    }
}
