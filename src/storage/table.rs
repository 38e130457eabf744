use std::{fmt::Write as _, path::Path};

use tracing::{debug, warn};

use crate::{
    executor::scan::{ScanIterator, TableScanner},
    storage::{
        config::{TableConfig, TableMode},
        cursor::Cursor,
        pager::Pager,
    },
    types::{
        Key, PAGE_SIZE, PageId, ROW_SIZE, ROWS_PER_PAGE,
        error::{DatabaseError, Result},
        page::{LEAF_NODE_MAX_CELLS, LeafNode, NodeKind, PageBuf},
        row::Row,
    },
};

/// The single table stored in a database file. Owns the pager for its whole lifetime.
pub struct Table {
    pager: Pager,
    config: TableConfig,
    root_page_num: PageId,
    num_rows: u32,
}

impl Table {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, TableConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: TableConfig) -> Result<Self> {
        let mut pager = Pager::with_config(path, &config)?;

        if pager.num_pages() > pager.max_pages() {
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!(
                    "file holds {} pages, more than the limit of {}",
                    pager.num_pages(),
                    pager.max_pages()
                ),
            });
        }

        let num_rows = match config.mode {
            TableMode::Flat => flat_row_count(pager.file_length()),
            TableMode::Tree => Self::open_root_leaf(&mut pager)?,
        };

        debug!(
            path = %pager.path().display(),
            mode = ?config.mode,
            num_rows,
            "opened table"
        );

        Ok(Self {
            pager,
            config,
            root_page_num: 0,
            num_rows,
        })
    }

    fn open_root_leaf(pager: &mut Pager) -> Result<u32> {
        if pager.file_length() % PAGE_SIZE as u64 != 0 {
            warn!(
                file_length = pager.file_length(),
                "file is not a whole number of pages"
            );
            return Err(DatabaseError::CorruptedDatabase {
                reason: "Db file is not a whole number of pages".to_string(),
            });
        }

        let is_new = pager.num_pages() == 0;
        let mut root = LeafNode::new(pager.get_page(0)?);
        if is_new {
            root.initialize();
            root.set_root(true);
            return Ok(0);
        }

        match root.node_kind()? {
            NodeKind::Leaf => {}
            NodeKind::Internal => {
                return Err(DatabaseError::CorruptedDatabase {
                    reason: "root page is an internal node; only a single leaf is supported"
                        .to_string(),
                });
            }
        }
        let cell_count = root.cell_count();
        if cell_count as usize > LEAF_NODE_MAX_CELLS {
            warn!(cell_count, "root leaf cell count exceeds capacity");
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!(
                    "root leaf claims {} cells, capacity is {}",
                    cell_count, LEAF_NODE_MAX_CELLS
                ),
            });
        }
        Ok(cell_count)
    }

    pub fn mode(&self) -> TableMode {
        self.config.mode
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn root_page_num(&self) -> PageId {
        self.root_page_num
    }

    pub fn num_rows(&self) -> u32 {
        self.num_rows
    }

    /// Maximum number of rows the table can hold.
    pub fn capacity(&self) -> usize {
        match self.config.mode {
            TableMode::Flat => ROWS_PER_PAGE * self.pager.max_pages() as usize,
            TableMode::Tree => LEAF_NODE_MAX_CELLS,
        }
    }

    pub fn is_full(&self) -> bool {
        self.num_rows as usize >= self.capacity()
    }

    pub fn get_page(&mut self, page_num: PageId) -> Result<&mut PageBuf> {
        self.pager.get_page(page_num)
    }

    /// Byte range holding flat-mode row `row_num`.
    pub fn row_slot(&mut self, row_num: u32) -> Result<&mut [u8]> {
        let row_num = row_num as usize;
        let page_num = (row_num / ROWS_PER_PAGE) as PageId;
        let byte_offset = (row_num % ROWS_PER_PAGE) * ROW_SIZE;
        let page = self.pager.get_page(page_num)?;
        Ok(&mut page[byte_offset..byte_offset + ROW_SIZE])
    }

    pub(crate) fn root_leaf(&mut self) -> Result<LeafNode<&mut PageBuf>> {
        let page = self.pager.get_page(self.root_page_num)?;
        Ok(LeafNode::new(page))
    }

    /// Inserts `row`. Fails without touching the table if the key is already present
    /// (tree mode) or there is no room left.
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        match self.config.mode {
            TableMode::Flat => self.insert_flat(row)?,
            TableMode::Tree => self.insert_keyed(row)?,
        }
        self.num_rows += 1;
        Ok(())
    }

    fn insert_flat(&mut self, row: &Row) -> Result<()> {
        if self.is_full() {
            debug!(id = row.id(), "insert rejected, table full");
            return Err(DatabaseError::TableFull {
                capacity: self.capacity(),
            });
        }
        let row_num = self.num_rows;
        row.serialize(self.row_slot(row_num)?);
        Ok(())
    }

    fn insert_keyed(&mut self, row: &Row) -> Result<()> {
        let key = row.id();
        let capacity = self.capacity();
        let mut leaf = self.root_leaf()?;

        let index = match leaf.find_index(key) {
            Ok(_) => {
                debug!(key, "insert rejected, duplicate key");
                return Err(DatabaseError::DuplicateKey(key));
            }
            Err(index) => index,
        };
        if leaf.is_full() {
            debug!(key, "insert rejected, leaf full");
            return Err(DatabaseError::TableFull { capacity });
        }

        leaf.insert_cell(index, key, row);
        Ok(())
    }

    /// Cursor at `key`, or at the position `key` would be inserted if absent.
    pub fn find(&mut self, key: Key) -> Result<Cursor<'_>> {
        match self.config.mode {
            TableMode::Tree => {
                let root = self.root_page_num;
                let leaf = self.root_leaf()?;
                let count = leaf.cell_count();
                let cell_num = match leaf.find_index(key) {
                    Ok(index) | Err(index) => index as u32,
                };
                Ok(Cursor::at(self, root, cell_num, cell_num >= count))
            }
            TableMode::Flat => {
                let mut cursor = Cursor::start(self)?;
                while !cursor.is_end_of_table() {
                    if cursor.row()?.id() == key {
                        break;
                    }
                    cursor.advance()?;
                }
                Ok(cursor)
            }
        }
    }

    pub fn get(&mut self, key: Key) -> Result<Option<Row>> {
        let mut cursor = self.find(key)?;
        if cursor.is_end_of_table() {
            return Ok(None);
        }
        let row = cursor.row()?;
        Ok((row.id() == key).then_some(row))
    }

    /// Every row, in key order (tree mode) or insertion order (flat mode).
    pub fn scan(&mut self) -> Result<Vec<Row>> {
        ScanIterator::new(TableScanner::new(self)?).collect()
    }

    pub fn describe_tree(&mut self) -> Result<String> {
        let mut out = String::new();
        match self.config.mode {
            TableMode::Tree => {
                let leaf = self.root_leaf()?;
                let count = leaf.cell_count() as usize;
                let _ = writeln!(out, "- leaf (size {})", count);
                for index in 0..count {
                    let _ = writeln!(out, "  - {}", leaf.key(index));
                }
            }
            TableMode::Flat => {
                let _ = writeln!(
                    out,
                    "- flat (rows {}, pages {})",
                    self.num_rows,
                    (self.num_rows as usize).div_ceil(ROWS_PER_PAGE)
                );
            }
        }
        Ok(out)
    }

    /// Flushes every page this session touched and closes the file. A failed flush does
    /// not stop the handle from being released; the first error is returned afterwards.
    pub fn close(&mut self) -> Result<()> {
        let mut first_error = None;
        for (page_num, byte_count) in self.flush_plan() {
            if let Err(e) = self.pager.flush(page_num, byte_count) {
                warn!(page = page_num, error = %e, "flush failed during close");
                first_error.get_or_insert(e);
            }
        }

        let closed = self.pager.close();
        debug!(num_rows = self.num_rows, "closed table");
        match first_error {
            Some(e) => Err(e),
            None => closed,
        }
    }

    fn flush_plan(&self) -> Vec<(PageId, usize)> {
        match self.config.mode {
            TableMode::Tree => self
                .pager
                .materialized_pages()
                .map(|page_num| (page_num, PAGE_SIZE))
                .collect(),
            TableMode::Flat => {
                let num_rows = self.num_rows as usize;
                let full_pages = num_rows / ROWS_PER_PAGE;
                let mut plan: Vec<(PageId, usize)> = (0..full_pages as PageId)
                    .filter(|&page_num| self.pager.is_materialized(page_num))
                    .map(|page_num| (page_num, PAGE_SIZE))
                    .collect();

                // The final page only holds the rows written so far.
                let additional_rows = num_rows % ROWS_PER_PAGE;
                let tail = full_pages as PageId;
                if additional_rows > 0 && self.pager.is_materialized(tail) {
                    plan.push((tail, additional_rows * ROW_SIZE));
                }
                plan
            }
        }
    }
}

/// Full pages each hold `ROWS_PER_PAGE` rows; a partial tail page holds whole rows only.
fn flat_row_count(file_length: u64) -> u32 {
    let full_pages = file_length / PAGE_SIZE as u64;
    let tail_bytes = file_length % PAGE_SIZE as u64;
    (full_pages * ROWS_PER_PAGE as u64 + tail_bytes / ROW_SIZE as u64) as u32
}
