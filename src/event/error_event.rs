use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

/// Error packet sent by the server in place of an event.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub code: u16,
    pub sql_state: Option<String>,
    pub message: String,
}

impl ErrorEvent {
    /// Parses the packet body following the 0xFF status byte.
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        let code = cursor.read_uint_le(2)? as u16;
        let mut sql_state = None;
        if cursor.remaining() >= 6 && cursor.get_ref()[cursor.position() as usize] == b'#' {
            cursor.skip(1)?;
            sql_state = Some(cursor.read_string(5)?);
        }
        let message = String::from_utf8_lossy(cursor.read_rest()).to_string();
        Ok(Self {
            code,
            sql_state,
            message,
        })
    }

    pub fn into_error(self) -> BinlogError {
        BinlogError::ServerError {
            code: self.code,
            sql_state: self.sql_state.unwrap_or_default(),
            message: self.message,
        }
    }
}
