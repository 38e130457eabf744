use std::path::PathBuf;

use tempfile::{Builder, TempDir};

use crate::{
    storage::{config::TableConfig, table::Table},
    types::error::DatabaseError,
};

/// A database file inside its own temporary directory, removed on drop.
pub struct TempDatabase {
    _dir: TempDir,
    pub path: PathBuf,
    pub table: Option<Table>,
}

impl TempDatabase {
    pub fn new() -> Self {
        Self::with_prefix("leafdb_test")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        let dir = Builder::new()
            .prefix(prefix)
            .tempdir()
            .expect("failed to create temporary directory");
        let path = dir.path().join(format!("{}.db", prefix));
        Self {
            _dir: dir,
            path,
            table: None,
        }
    }

    pub fn open_table(&mut self) -> Result<&mut Table, DatabaseError> {
        self.open_table_with_config(TableConfig::default())
    }

    pub fn open_table_with_config(
        &mut self,
        config: TableConfig,
    ) -> Result<&mut Table, DatabaseError> {
        let table = Table::open_with_config(&self.path, config)?;
        Ok(self.table.insert(table))
    }

    /// Closes the open table, flushing it to disk.
    pub fn close_table(&mut self) -> Result<(), DatabaseError> {
        match self.table.take() {
            Some(mut table) => table.close(),
            None => Ok(()),
        }
    }

    pub fn get_table(&mut self) -> Option<&mut Table> {
        self.table.as_mut()
    }
}

impl Default for TempDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        if let Some(mut table) = self.table.take() {
            let _ = table.close();
        }
    }
}
