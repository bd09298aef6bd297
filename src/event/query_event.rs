use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct QueryEvent {
    pub thread_id: u32,
    pub exec_time: u32,
    pub error_code: u16,
    pub status_vars: Vec<u8>,
    pub schema: String,
    pub query: String,
}

impl QueryEvent {
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        let thread_id = cursor.read_uint_le(4)? as u32;
        let exec_time = cursor.read_uint_le(4)? as u32;
        let schema_length = cursor.read_byte()? as usize;
        let error_code = cursor.read_uint_le(2)? as u16;
        let status_vars_length = cursor.read_uint_le(2)? as usize;
        let status_vars = cursor.read_bytes(status_vars_length)?;

        let schema = String::from_utf8_lossy(cursor.read_slice(schema_length)?).to_string();
        cursor.skip(1)?;

        // statement text is not guaranteed to be utf8
        let query = String::from_utf8_lossy(cursor.read_rest()).to_string();

        Ok(Self {
            thread_id,
            exec_time,
            error_code,
            status_vars,
            schema,
            query,
        })
    }
}
