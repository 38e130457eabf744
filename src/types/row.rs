use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{
    COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE,
    ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE,
    error::{DatabaseError, Result},
};

/*
 * Row Layout (293 bytes, big-endian)
 * ┌──────────┬──────────────────────────┬──────────────────────────────┐
 * │ id (4)   │ username (32 + NUL pad)  │ email (255 + NUL pad)        │
 * └──────────┴──────────────────────────┴──────────────────────────────┘
 */

/// A fixed-schema row. Text columns are validated against their capacities on every
/// write, so a `Row` in hand always fits in `ROW_SIZE` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    id: u32,
    username: String,
    email: String,
}

impl Row {
    pub fn new(id: i64, username: &str, email: &str) -> Result<Self> {
        let mut row = Row::default();
        row.set_id(id)?;
        row.set_username(username)?;
        row.set_email(email)?;
        Ok(row)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_id(&mut self, value: i64) -> Result<()> {
        if value < 0 {
            return Err(DatabaseError::NegativeId(value));
        }
        self.id = u32::try_from(value).map_err(|_| DatabaseError::IdOutOfRange(value))?;
        Ok(())
    }

    pub fn set_username(&mut self, text: &str) -> Result<()> {
        validate_text("username", text, COLUMN_USERNAME_SIZE)?;
        self.username = text.to_string();
        Ok(())
    }

    pub fn set_email(&mut self, text: &str) -> Result<()> {
        validate_text("email", text, COLUMN_EMAIL_SIZE)?;
        self.email = text.to_string();
        Ok(())
    }

    /// Writes the row into `dest`, which must be exactly `ROW_SIZE` bytes.
    pub fn serialize(&self, dest: &mut [u8]) {
        assert_eq!(
            dest.len(),
            ROW_SIZE,
            "row destination must be {} bytes, got {}",
            ROW_SIZE,
            dest.len()
        );

        dest[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_be_bytes());
        write_padded(
            &mut dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            self.username.as_bytes(),
        );
        write_padded(
            &mut dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE],
            self.email.as_bytes(),
        );
    }

    pub fn to_bytes(&self) -> [u8; ROW_SIZE] {
        let mut buffer = [0u8; ROW_SIZE];
        self.serialize(&mut buffer);
        buffer
    }

    pub fn deserialize(src: &[u8]) -> Result<Self> {
        if src.len() != ROW_SIZE {
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!("row slot is {} bytes, expected {}", src.len(), ROW_SIZE),
            });
        }

        let mut id_bytes = [0u8; ID_SIZE];
        id_bytes.copy_from_slice(&src[ID_OFFSET..ID_OFFSET + ID_SIZE]);

        Ok(Row {
            id: u32::from_be_bytes(id_bytes),
            username: read_padded(
                "username",
                &src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            )?,
            email: read_padded("email", &src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE])?,
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn validate_text(field: &'static str, text: &str, max: usize) -> Result<()> {
    if text.len() > max {
        return Err(DatabaseError::FieldTooLong {
            field,
            max,
            actual: text.len(),
        });
    }
    // NUL terminates the column on disk
    if text.as_bytes().contains(&0) {
        return Err(DatabaseError::FieldContainsNul { field });
    }
    Ok(())
}

fn write_padded(dest: &mut [u8], bytes: &[u8]) {
    dest[..bytes.len()].copy_from_slice(bytes);
    dest[bytes.len()..].fill(0);
}

fn read_padded(field: &'static str, src: &[u8]) -> Result<String> {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8(src[..end].to_vec()).map_err(|e| DatabaseError::CorruptedDatabase {
        reason: format!("{} column is not valid UTF-8: {}", field, e),
    })
}
