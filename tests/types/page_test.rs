use leafdb::types::{
    PAGE_SIZE, ROW_SIZE,
    error::DatabaseError,
    page::{
        IS_ROOT_OFFSET, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
        LEAF_NODE_NUM_CELLS_OFFSET, LeafNode, NODE_KIND_OFFSET, NodeKind, PARENT_POINTER_OFFSET,
        describe_constants,
    },
    row::Row,
};

fn create_user_row(id: u32) -> Row {
    Row::new(id as i64, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
}

fn new_leaf_page() -> [u8; PAGE_SIZE] {
    let mut page = [0u8; PAGE_SIZE];
    LeafNode::new(&mut page).initialize();
    page
}

#[test]
fn test_initialize_writes_header() {
    let mut page = [0xFFu8; PAGE_SIZE];
    let mut node = LeafNode::new(&mut page);
    node.initialize();

    assert_eq!(node.node_kind().unwrap(), NodeKind::Leaf);
    assert!(!node.is_root());
    assert_eq!(node.parent(), 0);
    assert_eq!(node.cell_count(), 0);

    assert_eq!(page[NODE_KIND_OFFSET], NodeKind::Leaf.as_u8());
    assert_eq!(page[IS_ROOT_OFFSET], 0);
    assert_eq!(&page[LEAF_NODE_NUM_CELLS_OFFSET..LEAF_NODE_NUM_CELLS_OFFSET + 4], &[0, 0, 0, 0]);
}

#[test]
fn test_header_fields_are_big_endian() {
    let mut page = new_leaf_page();
    let mut node = LeafNode::new(&mut page);
    node.set_root(true);
    node.set_parent(0x0A0B_0C0D);
    node.set_cell_count(3);

    assert_eq!(page[IS_ROOT_OFFSET], 1);
    assert_eq!(&page[PARENT_POINTER_OFFSET..PARENT_POINTER_OFFSET + 4], &[0x0A, 0x0B, 0x0C, 0x0D]);
    assert_eq!(&page[LEAF_NODE_NUM_CELLS_OFFSET..LEAF_NODE_NUM_CELLS_OFFSET + 4], &[0, 0, 0, 3]);
}

#[test]
fn test_invalid_node_kind() {
    let page = [0u8; PAGE_SIZE];
    let node = LeafNode::new(&page);
    assert!(matches!(node.node_kind(), Err(DatabaseError::InvalidNodeKind(0))));
    assert!(NodeKind::from_u8(1).is_ok());
    assert!(NodeKind::from_u8(9).is_err());
}

#[test]
fn test_insert_cell_keeps_keys_sorted() {
    let mut page = new_leaf_page();
    let mut node = LeafNode::new(&mut page);

    for key in [30u32, 10, 20, 40, 5] {
        let index = node.find_index(key).unwrap_err();
        node.insert_cell(index, key, &create_user_row(key));
    }

    assert_eq!(node.cell_count(), 5);
    let keys: Vec<u32> = (0..5).map(|i| node.key(i)).collect();
    assert_eq!(keys, vec![5, 10, 20, 30, 40]);
    assert_eq!(node.max_key(), Some(40));

    for index in 0..5 {
        let row = Row::deserialize(node.value(index)).unwrap();
        assert_eq!(row, create_user_row(node.key(index)));
    }
}

#[test]
fn test_cell_offsets() {
    let mut page = new_leaf_page();
    let mut node = LeafNode::new(&mut page);
    node.insert_cell(0, 7, &create_user_row(7));
    node.insert_cell(1, 8, &create_user_row(8));

    assert_eq!(node.cell(1).len(), LEAF_NODE_CELL_SIZE);
    assert_eq!(node.value(1).len(), ROW_SIZE);

    let second = LEAF_NODE_HEADER_SIZE + LEAF_NODE_CELL_SIZE;
    assert_eq!(&page[second..second + 4], &8u32.to_be_bytes());
}

#[test]
fn test_find_index() {
    let mut page = new_leaf_page();
    let mut node = LeafNode::new(&mut page);
    for (index, key) in [2u32, 4, 6].into_iter().enumerate() {
        node.insert_cell(index, key, &create_user_row(key));
    }

    assert_eq!(node.find_index(4), Ok(1));
    assert_eq!(node.find_index(1), Err(0));
    assert_eq!(node.find_index(5), Err(2));
    assert_eq!(node.find_index(7), Err(3));
}

#[test]
fn test_fill_leaf_to_capacity() {
    let mut page = new_leaf_page();
    let mut node = LeafNode::new(&mut page);
    for key in 0..LEAF_NODE_MAX_CELLS as u32 {
        assert!(!node.is_full());
        node.insert_cell(key as usize, key, &create_user_row(key));
    }
    assert!(node.is_full());
}

#[test]
#[should_panic(expected = "insert into a full leaf")]
fn test_insert_into_full_leaf_panics() {
    let mut page = new_leaf_page();
    let mut node = LeafNode::new(&mut page);
    node.set_cell_count(LEAF_NODE_MAX_CELLS as u32);
    node.insert_cell(0, 1, &create_user_row(1));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_cell_index_out_of_bounds_panics() {
    let page = new_leaf_page();
    LeafNode::new(&page).key(LEAF_NODE_MAX_CELLS);
}

#[test]
fn test_describe_constants() {
    let constants = describe_constants();
    assert_eq!(constants[0], ("ROW_SIZE", 293));
    assert_eq!(constants.last(), Some(&("LEAF_NODE_MAX_CELLS", 13)));
}
