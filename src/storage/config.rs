use serde::{Deserialize, Serialize};

use crate::types::TABLE_MAX_PAGES;

/// How rows are laid out in the pages of the table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TableMode {
    /// Pages are headerless arrays of rows in insertion order; row position is purely positional.
    Flat,
    /// Page 0 is a leaf node keyed by row id; rows come back in key order.
    #[default]
    Tree,
}

/// Settings fixed for the lifetime of an open table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub mode: TableMode,
    /// Upper bound on page numbers the pager will hand out. Clamped to `TABLE_MAX_PAGES`.
    pub max_pages: u32,
    /// Call `sync_all` on the file before releasing it at close.
    pub sync_on_close: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            mode: TableMode::Tree,
            max_pages: TABLE_MAX_PAGES,
            sync_on_close: true,
        }
    }
}

impl TableConfig {
    pub fn flat() -> Self {
        Self::default().with_mode(TableMode::Flat)
    }

    pub fn with_mode(mut self, mode: TableMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.clamp(1, TABLE_MAX_PAGES);
        self
    }

    pub fn with_sync_on_close(mut self, sync_on_close: bool) -> Self {
        self.sync_on_close = sync_on_close;
        self
    }
}
