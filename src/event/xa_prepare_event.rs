use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct XaPrepareEvent {
    pub one_phase: bool,
    pub format_id: i32,
    pub gtrid: Vec<u8>,
    pub bqual: Vec<u8>,
}

impl XaPrepareEvent {
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        let one_phase = cursor.read_byte()? != 0;
        let format_id = cursor.read_int_le(4)? as i32;
        let gtrid_length = cursor.read_uint_le(4)? as usize;
        let bqual_length = cursor.read_uint_le(4)? as usize;
        let gtrid = cursor.read_bytes(gtrid_length)?;
        let bqual = cursor.read_bytes(bqual_length)?;
        Ok(Self {
            one_phase,
            format_id,
            gtrid,
            bqual,
        })
    }
}
