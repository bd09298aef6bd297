use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

/// Original statement of the rows events that follow, sent when
/// `binlog_rows_query_log_events` is on.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RowsQueryEvent {
    pub query: String,
}

impl RowsQueryEvent {
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        // the length byte is truncated to 255, the text runs to the end of the event
        cursor.skip(1)?;
        let query = String::from_utf8_lossy(cursor.read_rest()).to_string();
        Ok(Self { query })
    }
}
