use leafdb::{
    storage::{config::TableConfig, cursor::Cursor},
    types::{ROWS_PER_PAGE, error::DatabaseError, row::Row},
    utils::mock::TempDatabase,
};

fn create_user_row(id: u32) -> Row {
    Row::new(id as i64, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
}

#[test]
fn test_start_on_empty_table_is_end() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("cursor_empty");
    let table = temp_db.open_table()?;

    let mut cursor = Cursor::start(table)?;
    assert!(cursor.is_end_of_table());
    assert!(matches!(cursor.value(), Err(DatabaseError::CursorExhausted)));
    Ok(())
}

#[test]
fn test_advance_visits_every_row() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("cursor_advance");
    let table = temp_db.open_table()?;
    for id in [5, 1, 3] {
        table.insert(&create_user_row(id))?;
    }

    let mut cursor = Cursor::start(table)?;
    let mut ids = Vec::new();
    for _ in 0..3 {
        assert!(!cursor.is_end_of_table());
        ids.push(cursor.row()?.id());
        cursor.advance()?;
    }

    assert_eq!(ids, vec![1, 3, 5]);
    assert!(cursor.is_end_of_table());
    assert!(matches!(cursor.row(), Err(DatabaseError::CursorExhausted)));

    // advancing past the end stays put
    cursor.advance()?;
    assert!(cursor.is_end_of_table());
    assert_eq!(cursor.cell_num(), 3);
    Ok(())
}

#[test]
fn test_end_cursor() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("cursor_end");
    let table = temp_db.open_table()?;
    table.insert(&create_user_row(1))?;
    table.insert(&create_user_row(2))?;

    let cursor = Cursor::end(table)?;
    assert!(cursor.is_end_of_table());
    assert_eq!(cursor.cell_num(), 2);
    assert_eq!(cursor.page_num(), 0);
    Ok(())
}

#[test]
fn test_rewind() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("cursor_rewind");
    let table = temp_db.open_table()?;
    table.insert(&create_user_row(1))?;

    let mut cursor = Cursor::start(table)?;
    cursor.advance()?;
    assert!(cursor.is_end_of_table());

    cursor.rewind()?;
    assert!(!cursor.is_end_of_table());
    assert_eq!(cursor.row()?, create_user_row(1));
    Ok(())
}

#[test]
fn test_value_is_serialized_row() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("cursor_value");
    let table = temp_db.open_table()?;
    let row = create_user_row(42);
    table.insert(&row)?;

    let mut cursor = Cursor::start(table)?;
    assert_eq!(cursor.value()?, &row.to_bytes()[..]);
    Ok(())
}

#[test]
fn test_flat_cursor_crosses_pages() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("cursor_flat");
    let table = temp_db.open_table_with_config(TableConfig::flat())?;
    let row_count = ROWS_PER_PAGE as u32 + 1;
    for id in 0..row_count {
        table.insert(&create_user_row(id))?;
    }

    let mut cursor = Cursor::start(table)?;
    for _ in 0..ROWS_PER_PAGE {
        assert_eq!(cursor.page_num(), 0);
        cursor.advance()?;
    }
    assert_eq!(cursor.page_num(), 1);
    assert_eq!(cursor.row()?.id(), ROWS_PER_PAGE as u32);

    cursor.advance()?;
    assert!(cursor.is_end_of_table());
    Ok(())
}

#[test]
fn test_flat_end_cursor_page() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("cursor_flat_end");
    let table = temp_db.open_table_with_config(TableConfig::flat())?;
    for id in 0..ROWS_PER_PAGE as u32 {
        table.insert(&create_user_row(id))?;
    }

    let cursor = Cursor::end(table)?;
    assert_eq!(cursor.page_num(), 1);
    assert_eq!(cursor.cell_num(), ROWS_PER_PAGE as u32);
    Ok(())
}
