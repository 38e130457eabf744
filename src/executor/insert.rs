use crate::{
    storage::table::Table,
    types::{error::DatabaseError, row::Row},
};

/// Trait for inserting rows into a table
pub trait Inserter {
    /// Insert a single row into the table
    fn insert(&mut self, row: Row) -> Result<(), DatabaseError>;

    /// Insert rows in order, stopping at the first one that fails
    fn insert_batch(&mut self, rows: Vec<Row>) -> Result<(), DatabaseError>;
}

/// Inserter bound to one open table; counts the rows it has written.
pub struct TableInserter<'a> {
    table: &'a mut Table,
    rows_inserted: usize,
}

impl<'a> TableInserter<'a> {
    pub fn new(table: &'a mut Table) -> Self {
        Self {
            table,
            rows_inserted: 0,
        }
    }

    pub fn rows_inserted(&self) -> usize {
        self.rows_inserted
    }
}

impl Inserter for TableInserter<'_> {
    fn insert(&mut self, row: Row) -> Result<(), DatabaseError> {
        self.table.insert(&row)?;
        self.rows_inserted += 1;
        Ok(())
    }

    fn insert_batch(&mut self, rows: Vec<Row>) -> Result<(), DatabaseError> {
        for row in rows {
            self.insert(row)?;
        }
        Ok(())
    }
}
