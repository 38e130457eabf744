use crate::{
    storage::{config::TableMode, table::Table},
    types::{
        PageId, ROW_SIZE, ROWS_PER_PAGE,
        error::{DatabaseError, Result},
        page::leaf_value_range,
        row::Row,
    },
};

/// A position in the table: (page, cell) in tree mode, a row number in flat mode.
///
/// The cursor borrows the table mutably because reading a cell may fault its page
/// into the cache. It never changes the table's structure.
pub struct Cursor<'a> {
    table: &'a mut Table,
    page_num: PageId,
    cell_num: u32,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub(crate) fn at(
        table: &'a mut Table,
        page_num: PageId,
        cell_num: u32,
        end_of_table: bool,
    ) -> Self {
        Self {
            table,
            page_num,
            cell_num,
            end_of_table,
        }
    }

    /// Cursor on the first row; already at the end if the table is empty.
    pub fn start(table: &'a mut Table) -> Result<Self> {
        let page_num = table.root_page_num();
        let row_count = Self::row_count(table)?;
        Ok(Self::at(table, page_num, 0, row_count == 0))
    }

    /// Cursor one past the last row.
    pub fn end(table: &'a mut Table) -> Result<Self> {
        let row_count = Self::row_count(table)?;
        let page_num = match table.mode() {
            TableMode::Tree => table.root_page_num(),
            TableMode::Flat => (row_count as usize / ROWS_PER_PAGE) as PageId,
        };
        Ok(Self::at(table, page_num, row_count, true))
    }

    fn row_count(table: &mut Table) -> Result<u32> {
        match table.mode() {
            TableMode::Tree => Ok(table.root_leaf()?.cell_count()),
            TableMode::Flat => Ok(table.num_rows()),
        }
    }

    pub fn page_num(&self) -> PageId {
        self.page_num
    }

    pub fn cell_num(&self) -> u32 {
        self.cell_num
    }

    pub fn is_end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// Serialized row bytes at the current position.
    pub fn value(&mut self) -> Result<&[u8]> {
        if self.end_of_table {
            return Err(DatabaseError::CursorExhausted);
        }
        match self.table.mode() {
            TableMode::Tree => {
                let range = leaf_value_range(self.cell_num as usize);
                let page = self.table.get_page(self.page_num)?;
                Ok(&page[range])
            }
            TableMode::Flat => {
                let byte_offset = (self.cell_num as usize % ROWS_PER_PAGE) * ROW_SIZE;
                let page = self.table.get_page(self.page_num)?;
                Ok(&page[byte_offset..byte_offset + ROW_SIZE])
            }
        }
    }

    pub fn row(&mut self) -> Result<Row> {
        Row::deserialize(self.value()?)
    }

    pub fn advance(&mut self) -> Result<()> {
        if self.end_of_table {
            return Ok(());
        }
        self.cell_num += 1;
        let row_count = Self::row_count(self.table)?;
        if self.table.mode() == TableMode::Flat {
            self.page_num = (self.cell_num as usize / ROWS_PER_PAGE) as PageId;
        }
        if self.cell_num >= row_count {
            self.end_of_table = true;
        }
        Ok(())
    }

    /// Moves back to the first row.
    pub fn rewind(&mut self) -> Result<()> {
        let row_count = Self::row_count(self.table)?;
        self.page_num = self.table.root_page_num();
        self.cell_num = 0;
        self.end_of_table = row_count == 0;
        Ok(())
    }
}
