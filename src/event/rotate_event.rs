use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RotateEvent {
    pub binlog_filename: String,
    pub binlog_position: u64,
}

impl RotateEvent {
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        let binlog_position = cursor.read_uint_le(8)?;
        let binlog_filename = String::from_utf8(cursor.read_rest().to_vec())?
            .trim_end_matches('\0')
            .to_string();
        Ok(Self {
            binlog_filename,
            binlog_position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let mut data = 4u64.to_le_bytes().to_vec();
        data.extend_from_slice(b"mysql-bin.000002");
        let event = RotateEvent::parse(&mut Cursor::new(data.as_slice())).unwrap();
        assert_eq!(event.binlog_filename, "mysql-bin.000002");
        assert_eq!(event.binlog_position, 4);
    }
}
