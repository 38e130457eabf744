pub mod executor;
pub mod planner;
pub mod storage;
pub mod types;
pub mod utils;

pub use storage::{config::TableConfig, config::TableMode, cursor::Cursor, table::Table};
pub use types::{error::DatabaseError, row::Row};
