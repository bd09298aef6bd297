use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{
    binlog_error::BinlogError, column::codec::CodecTable, ext::bit_set::BitSet,
    ext::cursor_ext::CursorExt, replication_state::ReplicationState,
};

use super::{
    event_type::EventType,
    row_event::RowEvent,
    row_set::{CellValue, RowSet},
    rows_event::{included_column_names, lookup_table_map, RowsEventPrefix, RowsEventVersion},
};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeleteRowsEvent {
    pub table_id: u64,
    pub flags: u16,
    pub schema_name: String,
    pub table_name: String,
    pub included_columns: BitSet,
    pub rows: RowSet,
}

impl DeleteRowsEvent {
    pub fn parse(
        cursor: &mut Cursor<&[u8]>,
        event_type: EventType,
        state: &ReplicationState,
        codecs: &CodecTable,
    ) -> Result<Self, BinlogError> {
        let prefix = RowsEventPrefix::parse(cursor, RowsEventVersion::of(event_type))?;
        let table_map_event = lookup_table_map(state, prefix.table_id)?;

        let mut rows = Vec::new();
        while cursor.remaining() > 0 {
            let row = RowEvent::parse(cursor, table_map_event, &prefix.included_columns, codecs)
                .map_err(|e| e.with_event_context(event_type, Some(prefix.table_id)))?;
            rows.push(row.column_values.into_iter().map(CellValue::Value).collect());
        }

        Ok(Self {
            table_id: prefix.table_id,
            flags: prefix.flags,
            schema_name: table_map_event.schema_name.clone(),
            table_name: table_map_event.table_name.clone(),
            rows: RowSet {
                column_names: included_column_names(table_map_event, &prefix.included_columns),
                rows,
            },
            included_columns: prefix.included_columns,
        })
    }
}
