use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::{
    Key, PAGE_SIZE, PageId, ROW_SIZE,
    error::{DatabaseError, Result},
    row::Row,
};

/// One page of the database file, kept in memory exactly as it sits on disk.
pub type PageBuf = [u8; PAGE_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Internal = 1,
    Leaf = 2,
}

impl NodeKind {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(NodeKind::Internal),
            2 => Ok(NodeKind::Leaf),
            _ => Err(DatabaseError::InvalidNodeKind(value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            NodeKind::Internal => 1,
            NodeKind::Leaf => 2,
        }
    }
}

/*
 * Leaf Page Layout on Disk
 * ┌─────────────────────────────────────────────────────────────────┐
 * │  COMMON HEADER (6 bytes)                                        │
 * │  kind(1) | is_root(1) | parent(4)                               │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  LEAF HEADER (4 bytes)                                          │
 * │  cell_count(4)                                                  │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  CELLS, ascending by key                                        │
 * │  [key(4) | row(293)] [key(4) | row(293)] ...                    │
 * ├─────────────────────────────────────────────────────────────────┤
 * │  unused tail                                                    │
 * └─────────────────────────────────────────────────────────────────┘
 */

// Common node header
pub const NODE_KIND_SIZE: usize = size_of::<u8>();
pub const NODE_KIND_OFFSET: usize = 0;
pub const IS_ROOT_SIZE: usize = size_of::<u8>();
pub const IS_ROOT_OFFSET: usize = NODE_KIND_OFFSET + NODE_KIND_SIZE;
pub const PARENT_POINTER_SIZE: usize = size_of::<PageId>();
pub const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_KIND_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

// Leaf node header
pub const LEAF_NODE_NUM_CELLS_SIZE: usize = size_of::<u32>();
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE;

// Leaf node body
pub const LEAF_NODE_KEY_SIZE: usize = size_of::<Key>();
pub const LEAF_NODE_KEY_OFFSET: usize = 0;
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_VALUE_OFFSET: usize = LEAF_NODE_KEY_OFFSET + LEAF_NODE_KEY_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

/// Layout constants in the order the shell prints them.
pub fn describe_constants() -> Vec<(&'static str, usize)> {
    vec![
        ("ROW_SIZE", ROW_SIZE),
        ("COMMON_NODE_HEADER_SIZE", COMMON_NODE_HEADER_SIZE),
        ("LEAF_NODE_HEADER_SIZE", LEAF_NODE_HEADER_SIZE),
        ("LEAF_NODE_CELL_SIZE", LEAF_NODE_CELL_SIZE),
        ("LEAF_NODE_SPACE_FOR_CELLS", LEAF_NODE_SPACE_FOR_CELLS),
        ("LEAF_NODE_MAX_CELLS", LEAF_NODE_MAX_CELLS),
    ]
}

/// Byte range of cell `index` within a leaf page.
///
/// # Panics
///
/// Panics if `index` is not below `LEAF_NODE_MAX_CELLS`.
pub fn leaf_cell_range(index: usize) -> Range<usize> {
    assert!(
        index < LEAF_NODE_MAX_CELLS,
        "cell index {} out of bounds (max: {})",
        index,
        LEAF_NODE_MAX_CELLS
    );
    let start = LEAF_NODE_HEADER_SIZE + index * LEAF_NODE_CELL_SIZE;
    start..start + LEAF_NODE_CELL_SIZE
}

pub fn leaf_value_range(index: usize) -> Range<usize> {
    let cell = leaf_cell_range(index);
    cell.start + LEAF_NODE_VALUE_OFFSET..cell.end
}

/// Typed view of a leaf node over a borrowed page buffer.
///
/// The view owns no state of its own: every accessor reads or writes the
/// underlying bytes at a fixed offset, so two views over the same page always agree.
pub struct LeafNode<B> {
    buf: B,
}

impl<B: AsRef<[u8]>> LeafNode<B> {
    pub fn new(buf: B) -> Self {
        assert_eq!(
            buf.as_ref().len(),
            PAGE_SIZE,
            "leaf node view needs a full page"
        );
        Self { buf }
    }

    fn bytes(&self) -> &[u8] {
        self.buf.as_ref()
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes()[offset..offset + 4]);
        u32::from_be_bytes(raw)
    }

    pub fn node_kind(&self) -> Result<NodeKind> {
        NodeKind::from_u8(self.bytes()[NODE_KIND_OFFSET])
    }

    pub fn is_root(&self) -> bool {
        self.bytes()[IS_ROOT_OFFSET] != 0
    }

    pub fn parent(&self) -> PageId {
        self.read_u32(PARENT_POINTER_OFFSET)
    }

    pub fn cell_count(&self) -> u32 {
        self.read_u32(LEAF_NODE_NUM_CELLS_OFFSET)
    }

    pub fn is_full(&self) -> bool {
        self.cell_count() as usize >= LEAF_NODE_MAX_CELLS
    }

    pub fn cell(&self, index: usize) -> &[u8] {
        &self.bytes()[leaf_cell_range(index)]
    }

    pub fn key(&self, index: usize) -> Key {
        let start = leaf_cell_range(index).start + LEAF_NODE_KEY_OFFSET;
        self.read_u32(start)
    }

    pub fn value(&self, index: usize) -> &[u8] {
        &self.bytes()[leaf_value_range(index)]
    }

    pub fn max_key(&self) -> Option<Key> {
        match self.cell_count() as usize {
            0 => None,
            n => Some(self.key(n - 1)),
        }
    }

    /// Binary search over the stored keys: `Ok(index)` when present, otherwise
    /// `Err(index)` of the first key greater than `key`.
    pub fn find_index(&self, key: Key) -> std::result::Result<usize, usize> {
        let mut low = 0;
        let mut high = self.cell_count() as usize;
        while low < high {
            let mid = (low + high) / 2;
            let key_at_mid = self.key(mid);
            if key == key_at_mid {
                return Ok(mid);
            }
            if key < key_at_mid {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        Err(low)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> LeafNode<B> {
    fn bytes_mut(&mut self) -> &mut [u8] {
        self.buf.as_mut()
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.bytes_mut()[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }

    pub fn initialize(&mut self) {
        self.set_node_kind(NodeKind::Leaf);
        self.set_root(false);
        self.set_parent(0);
        self.set_cell_count(0);
    }

    pub fn set_node_kind(&mut self, kind: NodeKind) {
        self.bytes_mut()[NODE_KIND_OFFSET] = kind.as_u8();
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.bytes_mut()[IS_ROOT_OFFSET] = u8::from(is_root);
    }

    pub fn set_parent(&mut self, parent: PageId) {
        self.write_u32(PARENT_POINTER_OFFSET, parent);
    }

    pub fn set_cell_count(&mut self, count: u32) {
        self.write_u32(LEAF_NODE_NUM_CELLS_OFFSET, count);
    }

    pub fn set_key(&mut self, index: usize, key: Key) {
        let start = leaf_cell_range(index).start + LEAF_NODE_KEY_OFFSET;
        self.write_u32(start, key);
    }

    pub fn value_mut(&mut self, index: usize) -> &mut [u8] {
        let range = leaf_value_range(index);
        &mut self.bytes_mut()[range]
    }

    /// Opens a gap at `index` by shifting the higher cells one slot right, then
    /// writes `(key, row)` into it. Ordering and capacity are the caller's job.
    pub fn insert_cell(&mut self, index: usize, key: Key, row: &Row) {
        let count = self.cell_count() as usize;
        assert!(count < LEAF_NODE_MAX_CELLS, "insert into a full leaf");
        assert!(index <= count, "insert index {} past cell count {}", index, count);

        if index < count {
            let start = leaf_cell_range(index).start;
            let end = leaf_cell_range(count - 1).end;
            self.bytes_mut()
                .copy_within(start..end, start + LEAF_NODE_CELL_SIZE);
        }

        self.set_key(index, key);
        row.serialize(self.value_mut(index));
        self.set_cell_count(count as u32 + 1);
    }
}
